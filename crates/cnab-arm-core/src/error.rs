use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to load config from {path}")]
    ConfigLoad {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config at {path}")]
    ConfigParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    // ── Bundle loading ──
    #[error("bundle file not found at {path}")]
    BundleNotFound { path: PathBuf },

    #[error("failed to read bundle from {path}")]
    BundleRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse bundle at {path}")]
    BundleParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error(
        "unsupported schema type {type_name}; expected one of boolean, integer, string, object, array"
    )]
    UnsupportedType { type_name: String },
}
