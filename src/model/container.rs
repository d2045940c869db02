//! Persistence of models as single files

use super::SourceModel;
use crate::error::ModelError;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Structured-array store models are written to and read from
pub trait ModelContainer: Send + Sync {
    /// Write `model` to `path`, fully replacing whatever was there
    fn write(&self, model: &SourceModel, path: &Path) -> Result<(), ModelError>;

    fn read(&self, path: &Path) -> Result<SourceModel, ModelError>;
}

/// MessagePack container. Writes go to a temporary sibling that is renamed into place,
/// so readers never observe a half-written model.
#[derive(Debug, Clone, Copy, Default)]
pub struct MsgPackContainer;

impl ModelContainer for MsgPackContainer {
    fn write(&self, model: &SourceModel, path: &Path) -> Result<(), ModelError> {
        model.validate()?;

        let write_failed = |e: io::Error| ModelError::WriteFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        };

        let bytes =
            rmp_serde::to_vec_named(model).map_err(|e| ModelError::EncodeFailed(e.to_string()))?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_failed)?;
        }

        let staging = staging_path(path);
        if let Err(e) = fs::write(&staging, &bytes).and_then(|()| atomic_rename(&staging, path)) {
            let _ = fs::remove_file(&staging);
            return Err(write_failed(e));
        }

        tracing::debug!("Wrote {} bytes to {:?}", bytes.len(), path);
        Ok(())
    }

    fn read(&self, path: &Path) -> Result<SourceModel, ModelError> {
        let bytes = fs::read(path).map_err(|e| ModelError::ReadFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let model: SourceModel =
            rmp_serde::from_slice(&bytes).map_err(|e| ModelError::DecodeFailed(e.to_string()))?;
        model.validate()?;
        Ok(model)
    }
}

fn staging_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.{}.tmp", name, uuid::Uuid::new_v4().simple()))
}

/// On Windows `fs::rename` refuses to replace an existing file
fn atomic_rename(src: &Path, dst: &Path) -> io::Result<()> {
    #[cfg(windows)]
    {
        if dst.exists() {
            fs::remove_file(dst)?;
        }
    }
    fs::rename(src, dst)
}
