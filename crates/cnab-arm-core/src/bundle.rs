//! CNAB bundle metadata (`bundle.json`).
//!
//! Only the parts of the published bundle format that the template compiler
//! reads are modelled; unknown fields are ignored. Every keyed section is a
//! [`BTreeMap`] so iteration is lexicographic by key regardless of the order
//! the document was written in.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Actions every bundle supports without declaring them.
pub const BUILTIN_ACTIONS: &[&str] = &["install", "upgrade", "uninstall"];

/// A parsed `bundle.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bundle {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub invocation_images: Vec<InvocationImage>,
    /// Custom actions beyond install/upgrade/uninstall.
    #[serde(default)]
    pub actions: BTreeMap<String, Action>,
    #[serde(default)]
    pub parameters: BTreeMap<String, ParameterSpec>,
    #[serde(default)]
    pub credentials: BTreeMap<String, CredentialSpec>,
    #[serde(default)]
    pub definitions: BTreeMap<String, Definition>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationImage {
    /// `docker`, `oci`, ... Only `docker` images resolve an identity.
    pub image_type: String,
    /// Image reference, e.g. `registry.example.com/acme/widget:1.2.3`.
    pub image: String,
    #[serde(default, alias = "digest", skip_serializing_if = "Option::is_none")]
    pub content_digest: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    #[serde(default)]
    pub modifies: bool,
    #[serde(default)]
    pub stateless: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterSpec {
    /// Key into [`Bundle::definitions`].
    pub definition: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Destination path inside the invocation image. When set, the
    /// credential is file content rather than a plain secret string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env: Option<String>,
    #[serde(default)]
    pub required: bool,
}

impl CredentialSpec {
    pub fn is_file(&self) -> bool {
        self.path.as_deref().is_some_and(|p| !p.is_empty())
    }
}

/// JSON schema types a definition may declare.
///
/// Anything else is rejected while the bundle is parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "Value")]
pub enum SchemaType {
    Boolean,
    Integer,
    String,
    Object,
    Array,
}

impl SchemaType {
    pub fn parse(name: &str) -> crate::Result<Self> {
        match name {
            "boolean" => Ok(Self::Boolean),
            "integer" => Ok(Self::Integer),
            "string" => Ok(Self::String),
            "object" => Ok(Self::Object),
            "array" => Ok(Self::Array),
            other => Err(crate::Error::UnsupportedType {
                type_name: other.to_owned(),
            }),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::String => "string",
            Self::Object => "object",
            Self::Array => "array",
        }
    }
}

impl TryFrom<Value> for SchemaType {
    type Error = crate::Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        match value {
            Value::String(name) => Self::parse(&name),
            other => Err(crate::Error::UnsupportedType {
                type_name: other.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for SchemaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A reusable typed schema fragment referenced by parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Definition {
    #[serde(rename = "type")]
    pub schema_type: SchemaType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, rename = "enum", skip_serializing_if = "Option::is_none")]
    pub allowed_values: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclusive_minimum: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclusive_maximum: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    #[serde(default)]
    pub write_only: bool,
}

impl Definition {
    /// A bare definition of the given type with no constraints.
    pub fn of(schema_type: SchemaType) -> Self {
        Self {
            schema_type,
            description: None,
            default: None,
            allowed_values: None,
            minimum: None,
            maximum: None,
            exclusive_minimum: None,
            exclusive_maximum: None,
            min_length: None,
            max_length: None,
            write_only: false,
        }
    }
}

impl Bundle {
    /// Load and parse a bundle file.
    pub fn load(path: &Path) -> crate::Result<Self> {
        if !path.exists() {
            return Err(crate::Error::BundleNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path).map_err(|e| crate::Error::BundleRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let bundle = Self::from_json(&content).map_err(|e| crate::Error::BundleParse {
            path: path.to_path_buf(),
            source: e,
        })?;

        tracing::debug!(
            path = %path.display(),
            name = %bundle.name,
            parameters = bundle.parameters.len(),
            credentials = bundle.credentials.len(),
            "bundle loaded"
        );
        Ok(bundle)
    }

    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    /// Custom action names in sorted order, excluding the built-ins.
    pub fn custom_actions(&self) -> impl Iterator<Item = &str> {
        self.actions
            .keys()
            .map(String::as_str)
            .filter(|name| !BUILTIN_ACTIONS.contains(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_type_parses_known_names() {
        assert_eq!(SchemaType::parse("boolean").unwrap(), SchemaType::Boolean);
        assert_eq!(SchemaType::parse("integer").unwrap(), SchemaType::Integer);
        assert_eq!(SchemaType::parse("string").unwrap(), SchemaType::String);
        assert_eq!(SchemaType::parse("object").unwrap(), SchemaType::Object);
        assert_eq!(SchemaType::parse("array").unwrap(), SchemaType::Array);
    }

    #[test]
    fn schema_type_rejects_number() {
        let err = SchemaType::parse("number").unwrap_err();
        assert!(matches!(
            err,
            crate::Error::UnsupportedType { ref type_name } if type_name == "number"
        ));
    }

    #[test]
    fn schema_type_rejects_type_arrays() {
        let err = SchemaType::try_from(serde_json::json!(["string", "null"])).unwrap_err();
        assert!(err.to_string().contains("unsupported schema type"));
    }

    #[test]
    fn credential_with_empty_path_is_not_a_file() {
        let cred = CredentialSpec {
            path: Some(String::new()),
            ..Default::default()
        };
        assert!(!cred.is_file());
    }

    #[test]
    fn custom_actions_skip_builtins() {
        let mut bundle = Bundle::default();
        bundle.actions.insert("status".to_owned(), Action::default());
        bundle.actions.insert("install".to_owned(), Action::default());
        bundle.actions.insert("dry-run".to_owned(), Action::default());

        let actions: Vec<&str> = bundle.custom_actions().collect();
        assert_eq!(actions, vec!["dry-run", "status"]);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn schema_type_parse_never_panics(s in "\\PC*") {
                let _ = SchemaType::parse(&s);
            }

            #[test]
            fn schema_type_name_roundtrip(
                ty in prop_oneof![
                    Just(SchemaType::Boolean),
                    Just(SchemaType::Integer),
                    Just(SchemaType::String),
                    Just(SchemaType::Object),
                    Just(SchemaType::Array),
                ],
            ) {
                prop_assert_eq!(SchemaType::parse(ty.as_str()).unwrap(), ty);
            }
        }
    }
}
