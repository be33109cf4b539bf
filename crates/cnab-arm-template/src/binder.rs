use std::collections::BTreeSet;

use cnab_arm_core::{Bundle, CredentialSpec, EnvironmentVariableNames, ParameterSpec};

use crate::error::{CompileError, SettingKind};
use crate::scaffold::ExposureLayer;
use crate::template::{EnvironmentVariable, Parameter, ParameterType, Reference, Template};
use crate::types::map_definition;

/// Key owned by the installer; never exposed by the template.
pub const RESERVED_KEY: &str = "porter-debug";

/// Description hint appended to file-backed credentials.
pub const FILE_CREDENTIAL_HINT: &str = "(Enter base64 encoded representation of file)";

/// Binds bundle parameters and credentials onto a scaffold.
///
/// Keys are visited in sorted order. Each key yields at most one template
/// parameter and exactly one worker environment variable.
pub struct Binder<'a> {
    bundle: &'a Bundle,
    names: &'a EnvironmentVariableNames,
    layer: &'a dyn ExposureLayer,
}

impl<'a> Binder<'a> {
    pub fn new(
        bundle: &'a Bundle,
        names: &'a EnvironmentVariableNames,
        layer: &'a dyn ExposureLayer,
    ) -> Self {
        Self {
            bundle,
            names,
            layer,
        }
    }

    /// Run the parameters pass then the credentials pass.
    pub fn bind(&self, template: &mut Template) -> Result<(), CompileError> {
        // Parameters the scaffold declared before any bundle key was bound.
        let scaffold: BTreeSet<String> = template.parameters.keys().cloned().collect();

        self.bind_parameters(template, &scaffold)?;
        self.bind_credentials(template, &scaffold)?;
        Ok(())
    }

    fn bind_parameters(
        &self,
        template: &mut Template,
        scaffold: &BTreeSet<String>,
    ) -> Result<(), CompileError> {
        for (key, spec) in &self.bundle.parameters {
            if key == RESERVED_KEY {
                tracing::debug!(key = %key, "reserved key skipped");
                continue;
            }
            validate_name(SettingKind::Parameter, key)?;

            let (declaration, secure) = self.parameter_declaration(key, spec)?;
            let reference = self.resolve(template, scaffold, key, declaration);

            let name = self.names.parameter(key);
            tracing::debug!(key = %key, env = %name, reference = %reference, "parameter bound");
            let variable = if secure {
                EnvironmentVariable::secure(name, reference.to_string())
            } else {
                EnvironmentVariable::plain(name, reference.to_string())
            };
            template.push_environment_variable(variable)?;
        }
        Ok(())
    }

    fn bind_credentials(
        &self,
        template: &mut Template,
        scaffold: &BTreeSet<String>,
    ) -> Result<(), CompileError> {
        for (key, spec) in &self.bundle.credentials {
            if key == RESERVED_KEY {
                tracing::debug!(key = %key, "reserved key skipped");
                continue;
            }
            validate_name(SettingKind::Credential, key)?;

            let reference = self.resolve(template, scaffold, key, credential_declaration(spec));

            let name = if spec.is_file() {
                self.names.credential_file(key)
            } else {
                self.names.credential(key)
            };
            tracing::debug!(key = %key, env = %name, file = spec.is_file(), "credential bound");
            template.push_environment_variable(EnvironmentVariable::secure(
                name,
                reference.to_string(),
            ))?;
        }
        Ok(())
    }

    fn parameter_declaration(
        &self,
        key: &str,
        spec: &ParameterSpec,
    ) -> Result<(Parameter, bool), CompileError> {
        let definition = self.bundle.definitions.get(&spec.definition).ok_or_else(|| {
            CompileError::UndefinedDefinition {
                key: key.to_owned(),
                definition: spec.definition.clone(),
            }
        })?;
        let parameter = map_definition(key, definition, spec.required, spec.description.as_deref())?;
        Ok((parameter, definition.write_only))
    }

    /// Pick what the key's environment variable refers to, declaring a new
    /// parameter only when nothing suitable exists yet.
    fn resolve(
        &self,
        template: &mut Template,
        scaffold: &BTreeSet<String>,
        key: &str,
        declaration: Parameter,
    ) -> Reference {
        if let Some(reference) = self.layer.redirect(template, key) {
            return reference;
        }
        if !scaffold.contains(key) {
            template.parameters.insert(key.to_owned(), declaration);
        }
        Reference::parameter(key)
    }
}

fn validate_name(kind: SettingKind, key: &str) -> Result<(), CompileError> {
    if key.contains('-') {
        return Err(CompileError::InvalidName {
            kind,
            key: key.to_owned(),
        });
    }
    Ok(())
}

fn credential_declaration(spec: &CredentialSpec) -> Parameter {
    let mut description = spec.description.clone().unwrap_or_default();
    if spec.is_file() {
        if !description.is_empty() {
            description.push(' ');
        }
        description.push_str(FILE_CREDENTIAL_HINT);
    }

    let mut parameter = Parameter::new(ParameterType::SecureString);
    if !description.is_empty() {
        parameter = parameter.with_description(description);
    }
    if !spec.required {
        parameter = parameter.with_default("");
    }
    parameter
}
