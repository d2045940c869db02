//! Symlink resolution for repository entries

use crate::error::ResolveError;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Resolves a path to the real location it refers to
pub trait SymlinkResolver: Send + Sync {
    /// Return the fully resolved path, or `DanglingSymlink` when a link in the chain
    /// points at something that does not exist.
    fn resolve(&self, path: &Path) -> Result<PathBuf, ResolveError>;
}

/// Resolver backed by the real filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct FsSymlinkResolver;

impl SymlinkResolver for FsSymlinkResolver {
    fn resolve(&self, path: &Path) -> Result<PathBuf, ResolveError> {
        resolve_symlink(path)
    }
}

/// Resolve `path` through every symlink it traverses.
pub fn resolve_symlink(path: &Path) -> Result<PathBuf, ResolveError> {
    match fs::canonicalize(path) {
        Ok(resolved) => Ok(resolved),
        // canonicalize reports NotFound both for a missing path and for a link whose
        // target is gone; only the latter is a dangling link
        Err(e) if e.kind() == ErrorKind::NotFound && is_symlink(path) => {
            Err(ResolveError::DanglingSymlink(path.display().to_string()))
        }
        Err(source) => Err(ResolveError::ResolveFailed {
            path: path.display().to_string(),
            source,
        }),
    }
}

fn is_symlink(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok_and(|metadata| metadata.file_type().is_symlink())
}
