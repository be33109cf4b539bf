//! Fixed template skeleton: storage account, container group, log output.
//!
//! Every infrastructure setting is described once as a [`Setting`]. An
//! [`ExposureLayer`] decides how it surfaces in the template:
//!
//! - [`AdvancedLayer`] declares each setting as a parameter.
//! - [`SimplifiedLayer`] turns settings with a computed value into variables
//!   and leaves only the rest (the service principal) as parameters.
//!
//! [`ScaffoldBuilder::build`] is shared by both layers.

use cnab_arm_core::{BUILTIN_ACTIONS, DriverConfig, EnvironmentVariableNames, ExposureMode};

use crate::identity::BundleIdentity;
use crate::template::{
    Container, ContainerGroupProperties, ContainerProperties, ContainerResources,
    CONTAINER_GROUP_TYPE, Encryption, EncryptionService, EncryptionServices, EnvironmentVariable,
    LOGS_OUTPUT_NAME, Output, Parameter, ParameterType, Reference, Resource, ResourceProperties,
    ResourceRequests, STORAGE_ACCOUNT_TYPE, Sku, StorageProperties, Template, literal,
};

pub const LOCATION: &str = "location";
pub const CONTAINER_GROUP_NAME: &str = "containerGroupName";
pub const CONTAINER_NAME: &str = "containerName";
pub const ACTION: &str = "cnab_action";
pub const INSTALLATION_NAME: &str = "cnab_installation_name";
pub const AZURE_LOCATION: &str = "cnab_azure_location";
pub const AZURE_CLIENT_ID: &str = "cnab_azure_client_id";
pub const AZURE_CLIENT_SECRET: &str = "cnab_azure_client_secret";
pub const AZURE_SUBSCRIPTION_ID: &str = "cnab_azure_subscription_id";
pub const AZURE_TENANT_ID: &str = "cnab_azure_tenant_id";
pub const STATE_STORAGE_ACCOUNT_NAME: &str = "cnab_azure_state_storage_account_name";
pub const STATE_STORAGE_ACCOUNT_KEY: &str = "cnab_azure_state_storage_account_key";
pub const STATE_STORAGE_ACCOUNT_RESOURCE_GROUP: &str =
    "cnab_azure_state_storage_account_resource_group";
pub const STATE_FILESHARE: &str = "cnab_azure_state_fileshare";
pub const BUNDLE_NAME: &str = "cnab_bundle_name";
pub const BUNDLE_TAG: &str = "cnab_bundle_tag";
pub const VERBOSE: &str = "cnab_verbose";

/// Prefix that links a bundle key to a scaffold variable in simplified mode.
pub const VARIABLE_PREFIX: &str = "cnab_";

/// Regions where container instances can be created.
// TODO: derive from the Container Instances availability API instead of a fixed list.
pub const ALLOWED_LOCATIONS: &[&str] = &[
    "westus",
    "eastus",
    "westeurope",
    "westus2",
    "northeurope",
    "southeastasia",
    "eastus2",
    "centralus",
    "australiaeast",
    "uksouth",
    "southcentralus",
    "centralindia",
    "southindia",
    "northcentralus",
    "eastasia",
    "canadacentral",
    "japaneast",
];

const CPU_CORES: &str = "1.0";
const MEMORY_IN_GB: &str = "1.5";

/// One infrastructure setting of the scaffold.
#[derive(Debug, Clone)]
pub struct Setting {
    pub key: &'static str,
    /// Declaration used when the setting is a parameter.
    pub parameter: Parameter,
    /// Variable value used by the simplified layer. `None` keeps the
    /// setting a parameter in every mode.
    pub computed: Option<String>,
}

impl Setting {
    fn new(key: &'static str, parameter: Parameter, computed: Option<String>) -> Self {
        Self {
            key,
            parameter,
            computed,
        }
    }
}

/// How scaffold settings and bundle keys surface in the template.
pub trait ExposureLayer {
    fn mode(&self) -> ExposureMode;

    /// Add `setting` to the template and return a reference to it.
    fn declare(&self, template: &mut Template, setting: Setting) -> Reference;

    /// A scaffold declaration a bundle key should bind to instead of
    /// declaring its own parameter.
    fn redirect(&self, template: &Template, key: &str) -> Option<Reference>;
}

pub struct AdvancedLayer;

pub struct SimplifiedLayer;

impl ExposureLayer for AdvancedLayer {
    fn mode(&self) -> ExposureMode {
        ExposureMode::Advanced
    }

    fn declare(&self, template: &mut Template, setting: Setting) -> Reference {
        template
            .parameters
            .insert(setting.key.to_owned(), setting.parameter);
        Reference::parameter(setting.key)
    }

    fn redirect(&self, _template: &Template, _key: &str) -> Option<Reference> {
        None
    }
}

impl ExposureLayer for SimplifiedLayer {
    fn mode(&self) -> ExposureMode {
        ExposureMode::Simplified
    }

    fn declare(&self, template: &mut Template, setting: Setting) -> Reference {
        match setting.computed {
            Some(value) => {
                template.variables.insert(setting.key.to_owned(), value);
                Reference::variable(setting.key)
            }
            None => AdvancedLayer.declare(template, setting),
        }
    }

    fn redirect(&self, template: &Template, key: &str) -> Option<Reference> {
        let variable = format!("{VARIABLE_PREFIX}{key}");
        template
            .variables
            .contains_key(&variable)
            .then(|| Reference::variable(variable))
    }
}

/// The layer implementing `mode`.
pub fn layer_for(mode: ExposureMode) -> &'static dyn ExposureLayer {
    match mode {
        ExposureMode::Advanced => &AdvancedLayer,
        ExposureMode::Simplified => &SimplifiedLayer,
    }
}

/// Builds the fixed part of the template for one bundle.
pub struct ScaffoldBuilder<'a> {
    identity: &'a BundleIdentity,
    driver: &'a DriverConfig,
    names: &'a EnvironmentVariableNames,
    custom_actions: Vec<String>,
}

impl<'a> ScaffoldBuilder<'a> {
    pub fn new(
        identity: &'a BundleIdentity,
        driver: &'a DriverConfig,
        names: &'a EnvironmentVariableNames,
    ) -> Self {
        Self {
            identity,
            driver,
            names,
            custom_actions: Vec::new(),
        }
    }

    /// Extra actions offered besides install/upgrade/uninstall.
    pub fn with_actions<I, S>(mut self, actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.custom_actions = actions.into_iter().map(Into::into).collect();
        self
    }

    pub fn build(&self, layer: &dyn ExposureLayer) -> Template {
        let mut template = Template::empty();
        let mut declare = |setting: Setting| layer.declare(&mut template, setting);

        let location = declare(self.location());
        let container_group_name = declare(self.container_group_name());
        let container_name = declare(self.container_name());

        let names = self.names;
        let mut environment = Vec::new();
        let mut bind = |env_name: &str, setting: Setting, secure: bool| {
            let stringify = setting.parameter.parameter_type != ParameterType::String
                && setting.parameter.parameter_type != ParameterType::SecureString;
            let reference = declare(setting);
            let expression = match &reference {
                Reference::Parameter(_) if stringify => format!("[string({})]", reference.call()),
                _ => reference.to_string(),
            };
            environment.push(if secure {
                EnvironmentVariable::secure(env_name, expression)
            } else {
                EnvironmentVariable::plain(env_name, expression)
            });
            reference
        };

        bind(&names.action, self.action(), false);
        bind(&names.installation_name, self.installation_name(), false);
        bind(&names.azure_location, self.azure_location(), false);
        bind(&names.azure_client_id, self.client_id(), false);
        bind(&names.azure_client_secret, self.client_secret(), true);
        bind(&names.azure_subscription_id, self.subscription_id(), false);
        bind(&names.azure_tenant_id, self.tenant_id(), false);
        let account_name = bind(
            &names.state_storage_account_name,
            self.state_storage_account_name(),
            false,
        );
        bind(
            &names.state_storage_account_key,
            self.state_storage_account_key(),
            true,
        );
        let resource_group = bind(
            &names.state_storage_account_resource_group,
            self.state_storage_account_resource_group(),
            false,
        );
        bind(&names.state_fileshare, self.state_fileshare(), false);
        bind(&names.bundle_name, self.bundle_name(), false);
        bind(&names.bundle_tag, self.bundle_tag(), false);
        bind(&names.verbose, self.verbose(), false);

        template.resources = vec![
            storage_account(&account_name, &resource_group, &location),
            container_group(
                &container_group_name,
                &container_name,
                &location,
                &account_name,
                self.driver.image_reference(),
                environment,
            ),
        ];
        template.outputs.insert(
            LOGS_OUTPUT_NAME.to_owned(),
            Output {
                output_type: "string".to_owned(),
                value: format!(
                    "[concat('az container logs -g ',resourceGroup().name,' -n ',{},' --container-name ',{},' --follow')]",
                    container_group_name.call(),
                    container_name.call(),
                ),
            },
        );

        tracing::debug!(
            mode = %layer.mode(),
            parameters = template.parameters.len(),
            variables = template.variables.len(),
            "scaffold built"
        );

        template
    }

    // ── Settings ──

    fn location(&self) -> Setting {
        Setting::new(
            LOCATION,
            location_parameter("The location in which the resources will be created."),
            Some("[resourceGroup().location]".to_owned()),
        )
    }

    fn container_group_name(&self) -> Setting {
        Setting::new(
            CONTAINER_GROUP_NAME,
            Parameter::new(ParameterType::String)
                .with_default("[concat('cg-',uniqueString(resourceGroup().id, newGuid()))]")
                .with_description("Name for the container group"),
            Some("[concat('cg-',uniqueString(resourceGroup().id, deployment().name))]".to_owned()),
        )
    }

    fn container_name(&self) -> Setting {
        Setting::new(
            CONTAINER_NAME,
            Parameter::new(ParameterType::String)
                .with_default("[concat('cn-',uniqueString(resourceGroup().id, newGuid()))]")
                .with_description("Name for the container"),
            Some("[concat('cn-',uniqueString(resourceGroup().id, deployment().name))]".to_owned()),
        )
    }

    fn action(&self) -> Setting {
        let actions = BUILTIN_ACTIONS
            .iter()
            .map(|a| (*a).to_owned())
            .chain(self.custom_actions.iter().cloned());
        Setting::new(
            ACTION,
            Parameter::new(ParameterType::String)
                .with_default("install")
                .with_allowed_values(actions)
                .with_description(
                    "The name of the action to be performed on the application instance.",
                ),
            Some("install".to_owned()),
        )
    }

    fn installation_name(&self) -> Setting {
        let name = literal(&self.identity.name);
        Setting::new(
            INSTALLATION_NAME,
            Parameter::new(ParameterType::String)
                .with_default(name.clone())
                .with_description("The name of the application instance."),
            Some(name),
        )
    }

    fn azure_location(&self) -> Setting {
        Setting::new(
            AZURE_LOCATION,
            location_parameter(
                "The location which the cnab-azure driver will use to create container instances.",
            ),
            Some("[resourceGroup().location]".to_owned()),
        )
    }

    fn client_id(&self) -> Setting {
        Setting::new(
            AZURE_CLIENT_ID,
            Parameter::new(ParameterType::String).with_description(
                "AAD Client ID of the service principal the driver uses to create container instances.",
            ),
            None,
        )
    }

    fn client_secret(&self) -> Setting {
        Setting::new(
            AZURE_CLIENT_SECRET,
            Parameter::new(ParameterType::SecureString).with_description(
                "AAD Client Secret of the service principal the driver uses to create container instances.",
            ),
            None,
        )
    }

    fn subscription_id(&self) -> Setting {
        let current = "[subscription().subscriptionId]";
        Setting::new(
            AZURE_SUBSCRIPTION_ID,
            Parameter::new(ParameterType::String)
                .with_default(current)
                .with_description(
                    "The subscription in which container instances are created, by default the subscription of this deployment.",
                ),
            Some(current.to_owned()),
        )
    }

    fn tenant_id(&self) -> Setting {
        let current = "[subscription().tenantId]";
        Setting::new(
            AZURE_TENANT_ID,
            Parameter::new(ParameterType::String)
                .with_default(current)
                .with_description(
                    "The AAD tenant of the service principal, by default the tenant of this deployment.",
                ),
            Some(current.to_owned()),
        )
    }

    fn state_storage_account_name(&self) -> Setting {
        let generated = "[concat('cnabstate',uniqueString(resourceGroup().id))]";
        Setting::new(
            STATE_STORAGE_ACCOUNT_NAME,
            Parameter::new(ParameterType::String)
                .with_default(generated)
                .with_description(
                    "The storage account name for the account for the CNAB state to be stored in, by default this will be in the current resource group and will be created if it does not exist",
                ),
            Some(generated.to_owned()),
        )
    }

    fn state_storage_account_key(&self) -> Setting {
        Setting::new(
            STATE_STORAGE_ACCOUNT_KEY,
            Parameter::new(ParameterType::SecureString)
                .with_default("")
                .with_description(
                    "The storage account key for the account for the CNAB state to be stored in, if this is left blank it will be looked up at runtime",
                ),
            Some(String::new()),
        )
    }

    fn state_storage_account_resource_group(&self) -> Setting {
        let current = "[resourceGroup().name]";
        Setting::new(
            STATE_STORAGE_ACCOUNT_RESOURCE_GROUP,
            Parameter::new(ParameterType::String)
                .with_default(current)
                .with_description(
                    "The resource group name for the storage account for the CNAB state to be stored in, by default this will be in the current resource group, if this is changed to a different resource group the storage account is expected to already exist",
                ),
            Some(current.to_owned()),
        )
    }

    fn state_fileshare(&self) -> Setting {
        Setting::new(
            STATE_FILESHARE,
            Parameter::new(ParameterType::String)
                .with_default("")
                .with_description(
                    "The file share name in the storage account for the CNAB state to be stored in",
                ),
            Some(String::new()),
        )
    }

    fn bundle_name(&self) -> Setting {
        let name = literal(&self.identity.name);
        Setting::new(
            BUNDLE_NAME,
            Parameter::new(ParameterType::String)
                .with_default(name.clone())
                .with_description("The name of the bundle."),
            Some(name),
        )
    }

    fn bundle_tag(&self) -> Setting {
        let tag = literal(&self.identity.tag);
        Setting::new(
            BUNDLE_TAG,
            Parameter::new(ParameterType::String)
                .with_default(tag.clone())
                .with_description("The registry reference of the bundle to execute."),
            Some(tag),
        )
    }

    fn verbose(&self) -> Setting {
        Setting::new(
            VERBOSE,
            Parameter::new(ParameterType::Bool)
                .with_default(false)
                .with_description("Emit verbose output from the driver."),
            Some("false".to_owned()),
        )
    }
}

fn location_parameter(description: &str) -> Parameter {
    Parameter::new(ParameterType::String)
        .with_default("[resourceGroup().location]")
        .with_allowed_values(ALLOWED_LOCATIONS.iter().copied())
        .with_description(description)
}

/// Created only when the state resource group is the deployment's own.
fn storage_account(
    account_name: &Reference,
    resource_group: &Reference,
    location: &Reference,
) -> Resource {
    Resource {
        condition: Some(format!(
            "[equals({},resourceGroup().name)]",
            resource_group.call()
        )),
        resource_type: STORAGE_ACCOUNT_TYPE.to_owned(),
        name: account_name.to_string(),
        api_version: "2019-04-01".to_owned(),
        location: location.to_string(),
        sku: Some(Sku {
            name: "Standard_LRS".to_owned(),
        }),
        kind: Some("StorageV2".to_owned()),
        depends_on: Vec::new(),
        properties: ResourceProperties::StorageAccount(StorageProperties {
            encryption: Encryption {
                key_source: "Microsoft.Storage".to_owned(),
                services: EncryptionServices {
                    file: EncryptionService { enabled: true },
                },
            },
        }),
    }
}

fn container_group(
    group_name: &Reference,
    container_name: &Reference,
    location: &Reference,
    account_name: &Reference,
    image: String,
    environment_variables: Vec<EnvironmentVariable>,
) -> Resource {
    Resource {
        condition: None,
        resource_type: CONTAINER_GROUP_TYPE.to_owned(),
        name: group_name.to_string(),
        api_version: "2018-10-01".to_owned(),
        location: location.to_string(),
        sku: None,
        kind: None,
        depends_on: vec![account_name.to_string()],
        properties: ResourceProperties::ContainerGroup(ContainerGroupProperties {
            containers: vec![Container {
                name: container_name.to_string(),
                properties: ContainerProperties {
                    image,
                    resources: ContainerResources {
                        requests: ResourceRequests {
                            cpu: CPU_CORES.to_owned(),
                            memory_in_gb: MEMORY_IN_GB.to_owned(),
                        },
                    },
                    environment_variables,
                },
            }],
            os_type: "Linux".to_owned(),
            restart_policy: "Never".to_owned(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> BundleIdentity {
        BundleIdentity {
            name: "widget".to_owned(),
            tag: "registry.example.com/acme/widget/bundle:1.2.3".to_owned(),
        }
    }

    fn build(mode: ExposureMode) -> Template {
        let identity = identity();
        let driver = DriverConfig::default();
        let names = EnvironmentVariableNames::default();
        ScaffoldBuilder::new(&identity, &driver, &names)
            .with_actions(["status"])
            .build(layer_for(mode))
    }

    #[test]
    fn advanced_declares_every_setting_as_parameter() {
        let template = build(ExposureMode::Advanced);

        assert!(template.variables.is_empty());
        for key in [
            LOCATION,
            CONTAINER_GROUP_NAME,
            CONTAINER_NAME,
            ACTION,
            INSTALLATION_NAME,
            AZURE_LOCATION,
            AZURE_CLIENT_ID,
            AZURE_CLIENT_SECRET,
            AZURE_SUBSCRIPTION_ID,
            AZURE_TENANT_ID,
            STATE_STORAGE_ACCOUNT_NAME,
            STATE_STORAGE_ACCOUNT_KEY,
            STATE_STORAGE_ACCOUNT_RESOURCE_GROUP,
            STATE_FILESHARE,
            BUNDLE_NAME,
            BUNDLE_TAG,
            VERBOSE,
        ] {
            let parameter = template
                .parameters
                .get(key)
                .unwrap_or_else(|| panic!("missing parameter {key}"));
            assert!(parameter.description().is_some(), "{key} has no description");
        }
    }

    #[test]
    fn simplified_keeps_only_service_principal_parameters() {
        let template = build(ExposureMode::Simplified);

        let keys: Vec<&str> = template.parameters.keys().map(String::as_str).collect();
        assert_eq!(keys, vec![AZURE_CLIENT_ID, AZURE_CLIENT_SECRET]);
        assert_eq!(template.variables[AZURE_LOCATION], "[resourceGroup().location]");
        assert_eq!(
            template.variables[AZURE_SUBSCRIPTION_ID],
            "[subscription().subscriptionId]"
        );
        assert_eq!(template.variables[INSTALLATION_NAME], "widget");
    }

    #[test]
    fn environment_follows_fixed_order() {
        let template = build(ExposureMode::Advanced);
        let names: Vec<&str> = template
            .environment_variables()
            .iter()
            .map(|e| e.name.as_str())
            .collect();
        assert_eq!(
            names,
            vec![
                "CNAB_ACTION",
                "CNAB_INSTALLATION_NAME",
                "CNAB_AZURE_LOCATION",
                "CNAB_AZURE_CLIENT_ID",
                "CNAB_AZURE_CLIENT_SECRET",
                "CNAB_AZURE_SUBSCRIPTION_ID",
                "CNAB_AZURE_TENANT_ID",
                "CNAB_AZURE_STATE_STORAGE_ACCOUNT_NAME",
                "CNAB_AZURE_STATE_STORAGE_ACCOUNT_KEY",
                "CNAB_AZURE_STATE_STORAGE_ACCOUNT_RESOURCE_GROUP",
                "CNAB_AZURE_STATE_FILESHARE",
                "CNAB_BUNDLE_NAME",
                "CNAB_BUNDLE_TAG",
                "VERBOSE",
            ]
        );
    }

    #[test]
    fn secrets_use_secure_value() {
        for mode in [ExposureMode::Advanced, ExposureMode::Simplified] {
            let template = build(mode);
            for name in [
                "CNAB_AZURE_CLIENT_SECRET",
                "CNAB_AZURE_STATE_STORAGE_ACCOUNT_KEY",
            ] {
                assert!(template.environment_variable(name).unwrap().is_secure());
            }
            assert!(!template.environment_variable("CNAB_ACTION").unwrap().is_secure());
        }
    }

    #[test]
    fn verbose_is_stringified_only_as_parameter() {
        let advanced = build(ExposureMode::Advanced);
        assert_eq!(
            advanced.environment_variable("VERBOSE").unwrap().expression(),
            "[string(parameters('cnab_verbose'))]"
        );

        let simplified = build(ExposureMode::Simplified);
        assert_eq!(
            simplified.environment_variable("VERBOSE").unwrap().expression(),
            "[variables('cnab_verbose')]"
        );
    }

    #[test]
    fn action_allows_builtins_then_custom_actions() {
        let template = build(ExposureMode::Advanced);
        let allowed = template.parameters[ACTION].allowed_values.clone().unwrap();
        assert_eq!(
            allowed,
            vec!["install", "upgrade", "uninstall", "status"]
                .into_iter()
                .map(serde_json::Value::from)
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn storage_account_precedes_container_group() {
        let template = build(ExposureMode::Advanced);

        assert_eq!(template.resources.len(), 2);
        let storage = &template.resources[0];
        let group = &template.resources[1];
        assert_eq!(storage.resource_type, STORAGE_ACCOUNT_TYPE);
        assert_eq!(
            storage.condition.as_deref(),
            Some(
                "[equals(parameters('cnab_azure_state_storage_account_resource_group'),resourceGroup().name)]"
            )
        );
        assert_eq!(group.resource_type, CONTAINER_GROUP_TYPE);
        assert_eq!(group.depends_on, vec![storage.name.clone()]);
    }

    #[test]
    fn simplified_resources_reference_variables() {
        let template = build(ExposureMode::Simplified);
        let group = &template.resources[1];
        assert_eq!(group.name, "[variables('containerGroupName')]");
        assert_eq!(group.location, "[variables('location')]");
        assert!(
            template.outputs[LOGS_OUTPUT_NAME]
                .value
                .contains("variables('containerName')")
        );
    }

    #[test]
    fn worker_container_uses_driver_image_and_fixed_requests() {
        let template = build(ExposureMode::Advanced);
        let container = template.worker_container().unwrap();
        assert_eq!(
            container.properties.image,
            "cnabquickstarts.azurecr.io/cnabarmdriver:latest"
        );
        assert_eq!(container.properties.resources.requests.cpu, "1.0");
        assert_eq!(container.properties.resources.requests.memory_in_gb, "1.5");
    }

    #[test]
    fn bracketed_bundle_name_is_escaped() {
        let identity = BundleIdentity {
            name: "[odd]".to_owned(),
            tag: "registry.example.com/odd/bundle".to_owned(),
        };
        let driver = DriverConfig::default();
        let names = EnvironmentVariableNames::default();
        let template = ScaffoldBuilder::new(&identity, &driver, &names).build(&SimplifiedLayer);
        assert_eq!(template.variables[BUNDLE_NAME], "[[odd]");
    }
}
