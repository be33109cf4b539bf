//! Environment-variable names shared with the installer running inside the
//! worker container.
//!
//! The installer maps these names back to `--param` / `--cred` flags, so the
//! compiler and the installer must agree on every string here.

/// The full set of environment-variable names the worker container carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentVariableNames {
    pub parameter_prefix: String,
    pub credential_prefix: String,
    /// Must not be a prefix of `credential_prefix`; classification checks it first.
    pub credential_file_prefix: String,
    pub action: String,
    pub installation_name: String,
    pub bundle_name: String,
    pub bundle_tag: String,
    pub azure_location: String,
    pub azure_client_id: String,
    pub azure_client_secret: String,
    pub azure_subscription_id: String,
    pub azure_tenant_id: String,
    pub state_storage_account_name: String,
    pub state_storage_account_key: String,
    pub state_storage_account_resource_group: String,
    pub state_fileshare: String,
    pub verbose: String,
}

impl Default for EnvironmentVariableNames {
    fn default() -> Self {
        Self {
            parameter_prefix: "CNAB_PARAM_".to_owned(),
            credential_prefix: "CNAB_CRED_".to_owned(),
            credential_file_prefix: "CNAB_CRED_FILE_".to_owned(),
            action: "CNAB_ACTION".to_owned(),
            installation_name: "CNAB_INSTALLATION_NAME".to_owned(),
            bundle_name: "CNAB_BUNDLE_NAME".to_owned(),
            bundle_tag: "CNAB_BUNDLE_TAG".to_owned(),
            azure_location: "CNAB_AZURE_LOCATION".to_owned(),
            azure_client_id: "CNAB_AZURE_CLIENT_ID".to_owned(),
            azure_client_secret: "CNAB_AZURE_CLIENT_SECRET".to_owned(),
            azure_subscription_id: "CNAB_AZURE_SUBSCRIPTION_ID".to_owned(),
            azure_tenant_id: "CNAB_AZURE_TENANT_ID".to_owned(),
            state_storage_account_name: "CNAB_AZURE_STATE_STORAGE_ACCOUNT_NAME".to_owned(),
            state_storage_account_key: "CNAB_AZURE_STATE_STORAGE_ACCOUNT_KEY".to_owned(),
            state_storage_account_resource_group: "CNAB_AZURE_STATE_STORAGE_ACCOUNT_RESOURCE_GROUP"
                .to_owned(),
            state_fileshare: "CNAB_AZURE_STATE_FILESHARE".to_owned(),
            verbose: "VERBOSE".to_owned(),
        }
    }
}

/// What a bundle-derived environment variable carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    Parameter,
    Credential,
    /// Base64-encoded file content.
    CredentialFile,
}

impl EnvironmentVariableNames {
    pub fn parameter(&self, key: &str) -> String {
        format!("{}{key}", self.parameter_prefix)
    }

    pub fn credential(&self, key: &str) -> String {
        format!("{}{key}", self.credential_prefix)
    }

    pub fn credential_file(&self, key: &str) -> String {
        format!("{}{key}", self.credential_file_prefix)
    }

    /// Recover the bundle key behind a prefixed variable name.
    ///
    /// Returns `None` for fixed infrastructure variables and for bare
    /// prefixes with no key.
    pub fn classify<'a>(&self, name: &'a str) -> Option<(BindingKind, &'a str)> {
        let (kind, key) = if let Some(key) = name.strip_prefix(&self.credential_file_prefix) {
            (BindingKind::CredentialFile, key)
        } else if let Some(key) = name.strip_prefix(&self.credential_prefix) {
            (BindingKind::Credential, key)
        } else if let Some(key) = name.strip_prefix(&self.parameter_prefix) {
            (BindingKind::Parameter, key)
        } else {
            return None;
        };

        (!key.is_empty()).then_some((kind, key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_prefers_file_prefix() {
        let names = EnvironmentVariableNames::default();
        assert_eq!(
            names.classify("CNAB_CRED_FILE_kubeconfig"),
            Some((BindingKind::CredentialFile, "kubeconfig"))
        );
        assert_eq!(
            names.classify("CNAB_CRED_token"),
            Some((BindingKind::Credential, "token"))
        );
        assert_eq!(
            names.classify("CNAB_PARAM_port"),
            Some((BindingKind::Parameter, "port"))
        );
    }

    #[test]
    fn classify_ignores_infrastructure_names() {
        let names = EnvironmentVariableNames::default();
        assert_eq!(names.classify("CNAB_ACTION"), None);
        assert_eq!(names.classify("VERBOSE"), None);
        assert_eq!(names.classify("CNAB_PARAM_"), None);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn classify_never_panics(s in "\\PC*") {
                let _ = EnvironmentVariableNames::default().classify(&s);
            }

            #[test]
            fn bound_names_classify_back_to_their_key(key in "[a-zA-Z_][a-zA-Z0-9_]{0,30}") {
                let names = EnvironmentVariableNames::default();
                let parameter_name = names.parameter(&key);
                let credential_file_name = names.credential_file(&key);
                prop_assert_eq!(
                    names.classify(&parameter_name),
                    Some((BindingKind::Parameter, key.as_str()))
                );
                prop_assert_eq!(
                    names.classify(&credential_file_name),
                    Some((BindingKind::CredentialFile, key.as_str()))
                );
            }
        }
    }
}
