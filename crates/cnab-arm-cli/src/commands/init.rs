use std::path::Path;

use cnab_arm_core::CONFIG_FILE_NAME;

const DEFAULT_CONFIG: &str = r#"[generate]
# bundle = "bundle.json"
# output = "azuredeploy.json"
# overwrite = false
# indent = false
# mode = "advanced"      # or "simplified"

[driver]
# image = "cnabquickstarts.azurecr.io/cnabarmdriver"
# version = "latest"
"#;

/// Write a commented cnab-arm.toml into the working directory.
pub async fn init_config() -> anyhow::Result<()> {
    let path = Path::new(CONFIG_FILE_NAME);
    if path.exists() {
        eprintln!("{CONFIG_FILE_NAME} already exists, skipping");
        return Ok(());
    }

    std::fs::write(path, DEFAULT_CONFIG)?;
    println!("Created {CONFIG_FILE_NAME}");
    println!();
    println!("Next steps:");
    println!();
    println!("  1. Adjust the settings you need in {CONFIG_FILE_NAME}");
    println!("  2. Generate the template:");
    println!("     cnab-arm generate");
    Ok(())
}
