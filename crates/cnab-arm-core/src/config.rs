use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// File name of the optional project configuration.
pub const CONFIG_FILE_NAME: &str = "cnab-arm.toml";

/// cnab-arm.toml configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConverterConfig {
    #[serde(default)]
    pub generate: GenerateConfig,
    #[serde(default)]
    pub driver: DriverConfig,
}

/// How template settings are exposed to whoever deploys the template.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExposureMode {
    /// Every setting is a template parameter.
    #[default]
    Advanced,
    /// Infrastructure settings are computed variables; only bundle
    /// settings and the service principal are parameters.
    Simplified,
}

impl ExposureMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Advanced => "advanced",
            Self::Simplified => "simplified",
        }
    }
}

impl std::fmt::Display for ExposureMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateConfig {
    /// Bundle file to generate the template for
    #[serde(default = "default_bundle")]
    pub bundle: PathBuf,
    /// Destination of the generated template
    #[serde(default = "default_output")]
    pub output: PathBuf,
    /// Replace the destination if it already exists
    #[serde(default)]
    pub overwrite: bool,
    /// Tab-indent the generated JSON
    #[serde(default)]
    pub indent: bool,
    #[serde(default)]
    pub mode: ExposureMode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverConfig {
    /// Worker image repository (without tag)
    #[serde(default = "default_driver_image")]
    pub image: String,
    /// Worker image tag
    #[serde(default = "default_driver_version")]
    pub version: String,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            bundle: default_bundle(),
            output: default_output(),
            overwrite: false,
            indent: false,
            mode: ExposureMode::default(),
        }
    }
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            image: default_driver_image(),
            version: default_driver_version(),
        }
    }
}

impl DriverConfig {
    /// Full image reference stamped into the worker container.
    pub fn image_reference(&self) -> String {
        format!("{}:{}", self.image, self.version)
    }
}

impl ConverterConfig {
    /// Load from cnab-arm.toml in the given directory, or return defaults if not found.
    pub fn load(project_dir: &std::path::Path) -> crate::Result<Self> {
        let config_path = project_dir.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            let content =
                std::fs::read_to_string(&config_path).map_err(|e| crate::Error::ConfigLoad {
                    path: config_path.clone(),
                    source: e,
                })?;
            toml::from_str(&content).map_err(|e| crate::Error::ConfigParse {
                path: config_path,
                source: e,
            })
        } else {
            Ok(Self::default())
        }
    }
}

fn default_bundle() -> PathBuf {
    PathBuf::from("bundle.json")
}

fn default_output() -> PathBuf {
    PathBuf::from("azuredeploy.json")
}

fn default_driver_image() -> String {
    "cnabquickstarts.azurecr.io/cnabarmdriver".to_owned()
}

fn default_driver_version() -> String {
    "latest".to_owned()
}
