//! Writing the rendered template to disk.

use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("file {path} already exists; use --overwrite to replace it")]
    Conflict { path: PathBuf },
    #[error("failed to create directory {path}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write {path}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Fail unless `path` is free or may be replaced.
///
/// Called before compiling so a conflict never costs a compile.
pub fn check_destination(path: &Path, overwrite: bool) -> Result<(), OutputError> {
    if path.exists() && !overwrite {
        return Err(OutputError::Conflict {
            path: path.to_path_buf(),
        });
    }
    Ok(())
}

/// Write `content` to `path`, creating missing parent directories.
pub fn write_template(path: &Path, content: &[u8]) -> Result<(), OutputError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| OutputError::CreateDir {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    std::fs::write(path, content).map_err(|e| OutputError::Write {
        path: path.to_path_buf(),
        source: e,
    })?;

    tracing::debug!(path = %path.display(), bytes = content.len(), "template written");
    Ok(())
}
