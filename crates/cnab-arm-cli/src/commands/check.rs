use std::path::PathBuf;

use cnab_arm_core::{BindingKind, Bundle, EnvironmentVariableNames};
use cnab_arm_template::TemplateGenerator;
use cnab_arm_template::scaffold::BUNDLE_TAG;

use super::{load_config, resolve_mode};

pub async fn check(bundle: Option<PathBuf>, simplify: bool) -> anyhow::Result<()> {
    let config = load_config()?;
    let bundle_path = bundle.unwrap_or(config.generate.bundle);
    let mode = resolve_mode(simplify, config.generate.mode);

    let bundle = Bundle::load(&bundle_path)?;
    let template = TemplateGenerator::new(&bundle, &config.driver, mode).compile()?;

    let bundle_tag = template
        .parameters
        .get(BUNDLE_TAG)
        .and_then(|p| p.default_value.as_ref())
        .and_then(serde_json::Value::as_str)
        .or_else(|| template.variables.get(BUNDLE_TAG).map(String::as_str))
        .unwrap_or("-");

    let names = EnvironmentVariableNames::default();
    let (mut parameters, mut credentials, mut files) = (0, 0, 0);
    for variable in template.environment_variables() {
        match names.classify(&variable.name) {
            Some((BindingKind::Parameter, _)) => parameters += 1,
            Some((BindingKind::Credential, _)) => credentials += 1,
            Some((BindingKind::CredentialFile, _)) => files += 1,
            None => {}
        }
    }

    println!("Bundle:      {}", bundle.name);
    println!("Mode:        {mode}");
    println!("Bundle tag:  {bundle_tag}");
    println!("Parameters:  {}", template.parameters.len());
    println!("Variables:   {}", template.variables.len());
    println!(
        "Environment: {} ({parameters} parameters, {credentials} credentials, {files} file credentials)",
        template.environment_variables().len()
    );
    println!("Worker:      {}", config.driver.image_reference());
    Ok(())
}
