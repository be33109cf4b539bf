mod check;
mod generate;
mod init;

use std::path::Path;

use cnab_arm_core::{ConverterConfig, ExposureMode};

pub use check::check;
pub use generate::{GenerateOptions, generate};
pub use init::init_config;

/// Load cnab-arm.toml from the working directory.
pub(crate) fn load_config() -> anyhow::Result<ConverterConfig> {
    Ok(ConverterConfig::load(Path::new("."))?)
}

/// `--simplify` forces simplified mode; otherwise the configured mode applies.
pub(crate) fn resolve_mode(simplify: bool, configured: ExposureMode) -> ExposureMode {
    if simplify {
        ExposureMode::Simplified
    } else {
        configured
    }
}
