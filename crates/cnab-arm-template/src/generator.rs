use cnab_arm_core::{Bundle, DriverConfig, EnvironmentVariableNames, ExposureMode};

use crate::binder::Binder;
use crate::error::CompileError;
use crate::identity::BundleIdentity;
use crate::scaffold::{ScaffoldBuilder, layer_for};
use crate::serialize;
use crate::template::Template;

/// Compiles one bundle into a deployment template.
///
/// Pure: no I/O happens here. Reading the bundle and writing the result
/// are left to the caller.
pub struct TemplateGenerator<'a> {
    bundle: &'a Bundle,
    driver: &'a DriverConfig,
    mode: ExposureMode,
    names: EnvironmentVariableNames,
}

impl<'a> TemplateGenerator<'a> {
    pub fn new(bundle: &'a Bundle, driver: &'a DriverConfig, mode: ExposureMode) -> Self {
        Self {
            bundle,
            driver,
            mode,
            names: EnvironmentVariableNames::default(),
        }
    }

    /// Override the environment variable naming table.
    pub fn with_names(mut self, names: EnvironmentVariableNames) -> Self {
        self.names = names;
        self
    }

    pub fn compile(&self) -> Result<Template, CompileError> {
        let identity = BundleIdentity::resolve(self.bundle)?;
        let layer = layer_for(self.mode);

        let mut template = ScaffoldBuilder::new(&identity, self.driver, &self.names)
            .with_actions(self.bundle.custom_actions())
            .build(layer);
        Binder::new(self.bundle, &self.names, layer).bind(&mut template)?;

        tracing::info!(
            bundle = %self.bundle.name,
            mode = %self.mode,
            parameters = template.parameters.len(),
            variables = template.variables.len(),
            environment = template.environment_variables().len(),
            "template compiled"
        );

        Ok(template)
    }

    /// Compile and serialize in one step.
    pub fn render(&self, indent: bool) -> Result<Vec<u8>, CompileError> {
        let template = self.compile()?;
        serialize::to_bytes(&template, indent)
    }
}
