use std::path::PathBuf;

use cnab_arm_core::{Bundle, ConverterConfig};
use cnab_arm_template::{TemplateGenerator, check_destination, write_template};

use super::{load_config, resolve_mode};

/// Command-line overrides for `[generate]` and `[driver]`.
pub struct GenerateOptions {
    pub bundle: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub overwrite: bool,
    pub indent: bool,
    pub simplify: bool,
    pub driver_version: Option<String>,
}

impl GenerateOptions {
    /// Lay the flags over the file configuration. Flags only ever switch
    /// booleans on; unset paths keep the configured value.
    fn apply(self, config: &mut ConverterConfig) {
        let generate = &mut config.generate;
        if let Some(bundle) = self.bundle {
            generate.bundle = bundle;
        }
        if let Some(output) = self.output {
            generate.output = output;
        }
        generate.overwrite |= self.overwrite;
        generate.indent |= self.indent;
        generate.mode = resolve_mode(self.simplify, generate.mode);
        if let Some(version) = self.driver_version {
            config.driver.version = version;
        }
    }
}

pub async fn generate(options: GenerateOptions) -> anyhow::Result<()> {
    let mut config = load_config()?;
    options.apply(&mut config);
    let settings = &config.generate;

    if settings.bundle == settings.output {
        anyhow::bail!(
            "output file {} is the bundle file; choose another --file",
            settings.output.display()
        );
    }
    check_destination(&settings.output, settings.overwrite)?;

    let bundle = Bundle::load(&settings.bundle)?;
    tracing::info!(
        bundle = %settings.bundle.display(),
        output = %settings.output.display(),
        mode = %settings.mode,
        indent = settings.indent,
        "generating template"
    );

    let content =
        TemplateGenerator::new(&bundle, &config.driver, settings.mode).render(settings.indent)?;
    write_template(&settings.output, &content)?;

    println!(
        "Generated {} from {} ({})",
        settings.output.display(),
        settings.bundle.display(),
        settings.mode
    );
    Ok(())
}
