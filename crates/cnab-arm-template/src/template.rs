//! ARM deployment template model.
//!
//! Serialize-only: the compiler builds these values and hands them to
//! [`crate::serialize`]. Keyed sections are [`BTreeMap`]s so the rendered
//! document has a stable key order.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::CompileError;

pub const SCHEMA: &str =
    "https://schema.management.azure.com/schemas/2015-01-01/deploymentTemplate.json#";
pub const CONTENT_VERSION: &str = "1.0.0.0";
pub const LOGS_OUTPUT_NAME: &str = "CNAB Package Action Logs Command";

pub const STORAGE_ACCOUNT_TYPE: &str = "Microsoft.Storage/storageAccounts";
pub const CONTAINER_GROUP_TYPE: &str = "Microsoft.ContainerInstance/containerGroups";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    #[serde(rename = "$schema")]
    pub schema: String,
    pub content_version: String,
    pub parameters: BTreeMap<String, Parameter>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub variables: BTreeMap<String, String>,
    pub resources: Vec<Resource>,
    pub outputs: BTreeMap<String, Output>,
}

/// Template parameter types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterType {
    String,
    SecureString,
    Int,
    Bool,
    Object,
    Array,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Metadata {
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    #[serde(rename = "type")]
    pub parameter_type: ParameterType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_values: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_value: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_value: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
}

impl Parameter {
    pub fn new(parameter_type: ParameterType) -> Self {
        Self {
            parameter_type,
            default_value: None,
            allowed_values: None,
            metadata: None,
            min_value: None,
            max_value: None,
            min_length: None,
            max_length: None,
        }
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn with_allowed_values<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.allowed_values = Some(values.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.metadata = Some(Metadata {
            description: description.into(),
        });
        self
    }

    pub fn description(&self) -> Option<&str> {
        self.metadata.as_ref().map(|m| m.description.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(rename = "type")]
    pub resource_type: String,
    pub name: String,
    pub api_version: String,
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<Sku>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
    pub properties: ResourceProperties,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sku {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResourceProperties {
    StorageAccount(StorageProperties),
    ContainerGroup(ContainerGroupProperties),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StorageProperties {
    pub encryption: Encryption,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Encryption {
    pub key_source: String,
    pub services: EncryptionServices,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EncryptionServices {
    pub file: EncryptionService,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EncryptionService {
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerGroupProperties {
    pub containers: Vec<Container>,
    pub os_type: String,
    pub restart_policy: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Container {
    pub name: String,
    pub properties: ContainerProperties,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerProperties {
    pub image: String,
    pub resources: ContainerResources,
    pub environment_variables: Vec<EnvironmentVariable>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContainerResources {
    pub requests: ResourceRequests,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceRequests {
    pub cpu: String,
    pub memory_in_gb: String,
}

/// A container environment variable.
///
/// Carries exactly one of `value` or `secureValue`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvironmentVariable {
    pub name: String,
    #[serde(flatten)]
    pub value: EnvValue,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum EnvValue {
    #[serde(rename = "value")]
    Plain(String),
    #[serde(rename = "secureValue")]
    Secure(String),
}

impl EnvironmentVariable {
    pub fn plain(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: EnvValue::Plain(value.into()),
        }
    }

    pub fn secure(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: EnvValue::Secure(value.into()),
        }
    }

    pub fn is_secure(&self) -> bool {
        matches!(self.value, EnvValue::Secure(_))
    }

    /// The expression or literal, whichever side it is carried on.
    pub fn expression(&self) -> &str {
        match &self.value {
            EnvValue::Plain(v) | EnvValue::Secure(v) => v,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Output {
    #[serde(rename = "type")]
    pub output_type: String,
    pub value: String,
}

/// A template-language reference to a parameter or variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reference {
    Parameter(String),
    Variable(String),
}

impl Reference {
    pub fn parameter(key: impl Into<String>) -> Self {
        Self::Parameter(key.into())
    }

    pub fn variable(key: impl Into<String>) -> Self {
        Self::Variable(key.into())
    }

    /// The bare function call, for embedding in a larger expression.
    pub fn call(&self) -> String {
        match self {
            Self::Parameter(key) => format!("parameters('{key}')"),
            Self::Variable(key) => format!("variables('{key}')"),
        }
    }
}

impl std::fmt::Display for Reference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.call())
    }
}

/// Escape a literal so the template engine does not evaluate it as an
/// expression.
pub fn literal(value: &str) -> String {
    if value.starts_with('[') {
        format!("[{value}")
    } else {
        value.to_owned()
    }
}

impl Template {
    /// An empty template with only the fixed header fields set.
    pub fn empty() -> Self {
        Self {
            schema: SCHEMA.to_owned(),
            content_version: CONTENT_VERSION.to_owned(),
            parameters: BTreeMap::new(),
            variables: BTreeMap::new(),
            resources: Vec::new(),
            outputs: BTreeMap::new(),
        }
    }

    /// The single worker container inside the container group.
    pub fn worker_container(&self) -> Option<&Container> {
        self.resources
            .iter()
            .find_map(|r| match &r.properties {
                ResourceProperties::ContainerGroup(group) => group.containers.first(),
                ResourceProperties::StorageAccount(_) => None,
            })
    }

    fn worker_container_mut(&mut self) -> Option<&mut Container> {
        self.resources
            .iter_mut()
            .find_map(|r| match &mut r.properties {
                ResourceProperties::ContainerGroup(group) => group.containers.first_mut(),
                ResourceProperties::StorageAccount(_) => None,
            })
    }

    pub fn environment_variables(&self) -> &[EnvironmentVariable] {
        match self.worker_container() {
            Some(container) => &container.properties.environment_variables,
            None => &[],
        }
    }

    pub fn environment_variable(&self, name: &str) -> Option<&EnvironmentVariable> {
        self.environment_variables().iter().find(|e| e.name == name)
    }

    /// Append an environment variable to the worker container.
    pub fn push_environment_variable(
        &mut self,
        variable: EnvironmentVariable,
    ) -> Result<(), CompileError> {
        let container = self
            .worker_container_mut()
            .ok_or(CompileError::MissingContainer)?;
        container.properties.environment_variables.push(variable);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn environment_variable_serializes_one_value_side() {
        let plain = serde_json::to_value(EnvironmentVariable::plain("A", "1")).unwrap();
        assert_eq!(plain, json!({ "name": "A", "value": "1" }));

        let secure = serde_json::to_value(EnvironmentVariable::secure("B", "2")).unwrap();
        assert_eq!(secure, json!({ "name": "B", "secureValue": "2" }));
    }

    #[test]
    fn parameter_omits_unset_fields() {
        let param = Parameter::new(ParameterType::SecureString).with_default("");
        let value = serde_json::to_value(param).unwrap();
        assert_eq!(value, json!({ "type": "securestring", "defaultValue": "" }));
    }

    #[test]
    fn reference_renders_expression() {
        assert_eq!(Reference::parameter("foo").to_string(), "[parameters('foo')]");
        assert_eq!(Reference::variable("cnab_foo").to_string(), "[variables('cnab_foo')]");
        assert_eq!(Reference::parameter("foo").call(), "parameters('foo')");
    }

    #[test]
    fn literal_escapes_leading_bracket() {
        assert_eq!(literal("[not an expression]"), "[[not an expression]");
        assert_eq!(literal("plain"), "plain");
    }

    #[test]
    fn empty_template_has_no_container() {
        let mut template = Template::empty();
        assert!(template.environment_variables().is_empty());
        assert!(matches!(
            template.push_environment_variable(EnvironmentVariable::plain("A", "1")),
            Err(CompileError::MissingContainer)
        ));
    }

    #[test]
    fn empty_variables_are_omitted() {
        let value = serde_json::to_value(Template::empty()).unwrap();
        assert!(value.get("variables").is_none());
        assert_eq!(value["$schema"], SCHEMA);
        assert_eq!(value["contentVersion"], CONTENT_VERSION);
    }
}
