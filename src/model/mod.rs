//! The "source" model: one repository's files, their raw bytes and their UASTs
//!
//! Columns are index-aligned: entry `i` of `filenames`, `sources` and `uasts` all
//! describe the same file.

mod builder;
mod container;
mod packed;

pub use builder::ModelBuilder;
pub use container::{ModelContainer, MsgPackContainer};
pub use packed::PackedArray;

use crate::error::ModelError;
use crate::parser::Uast;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Kind tag stored in every model this crate produces
pub const MODEL_NAME: &str = "source";

/// Schema version of the artifact
pub const MODEL_VERSION: [u32; 3] = [1, 0, 0];

/// Metadata block shared by all models
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelMeta {
    pub model: String,
    /// Models this one was derived from; always empty for source models
    pub dependencies: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub uuid: uuid::Uuid,
    pub version: [u32; 3],
}

impl ModelMeta {
    /// Fresh metadata stamped with the current time
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            dependencies: Vec::new(),
            created_at: Utc::now(),
            uuid: uuid::Uuid::new_v4(),
            version: MODEL_VERSION,
        }
    }
}

/// One repository's extracted sources and syntax trees
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceModel {
    pub meta: ModelMeta,
    /// Identifier exactly as handed to the transform
    pub repository: String,
    pub filenames: Vec<String>,
    pub sources: PackedArray,
    /// MessagePack-encoded [`Uast`] per file
    pub uasts: PackedArray,
}

/// Borrowed view of one aligned entry
#[derive(Debug, Clone, Copy)]
pub struct SourceEntry<'a> {
    pub filename: &'a str,
    pub source: &'a [u8],
    pub uast: &'a [u8],
}

impl SourceEntry<'_> {
    pub fn decode_uast(&self) -> Result<Uast, ModelError> {
        Uast::from_bytes(self.uast)
    }
}

impl SourceModel {
    /// Load a model written by [`MsgPackContainer`]
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        MsgPackContainer.read(path)
    }

    pub fn save(&self, path: &Path) -> Result<(), ModelError> {
        MsgPackContainer.write(self, path)
    }

    pub fn len(&self) -> usize {
        self.filenames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filenames.is_empty()
    }

    /// Check the kind tag, column alignment and packed-array integrity
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.meta.model != MODEL_NAME {
            return Err(ModelError::WrongModelKind {
                expected: MODEL_NAME.to_string(),
                actual: self.meta.model.clone(),
            });
        }
        if self.filenames.len() != self.sources.len() || self.filenames.len() != self.uasts.len()
        {
            return Err(ModelError::Misaligned {
                filenames: self.filenames.len(),
                sources: self.sources.len(),
                uasts: self.uasts.len(),
            });
        }
        self.sources.validate()?;
        self.uasts.validate()?;
        Ok(())
    }

    pub fn entry(&self, index: usize) -> Result<SourceEntry<'_>, ModelError> {
        let out_of_range = || ModelError::IndexOutOfRange {
            index,
            len: self.len(),
        };
        Ok(SourceEntry {
            filename: self.filenames.get(index).ok_or_else(out_of_range)?,
            source: self.sources.get(index).ok_or_else(out_of_range)?,
            uast: self.uasts.get(index).ok_or_else(out_of_range)?,
        })
    }

    /// Decode the tree of entry `index`
    pub fn uast(&self, index: usize) -> Result<Uast, ModelError> {
        self.entry(index)?.decode_uast()
    }

    pub fn iter(&self) -> impl Iterator<Item = SourceEntry<'_>> {
        self.filenames
            .iter()
            .zip(self.sources.iter())
            .zip(self.uasts.iter())
            .map(|((filename, source), uast)| SourceEntry {
                filename,
                source,
                uast,
            })
    }

    pub fn total_source_bytes(&self) -> usize {
        self.sources.data().len()
    }
}

impl fmt::Display for SourceModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "model:        {}", self.meta.model)?;
        writeln!(
            f,
            "version:      {}",
            self.meta
                .version
                .iter()
                .map(u32::to_string)
                .collect::<Vec<_>>()
                .join(".")
        )?;
        writeln!(f, "uuid:         {}", self.meta.uuid)?;
        writeln!(f, "created_at:   {}", self.meta.created_at.to_rfc3339())?;
        writeln!(f, "repository:   {}", self.repository.trim_end())?;
        writeln!(f, "files:        {}", self.len())?;
        write!(f, "source bytes: {}", self.total_source_bytes())
    }
}
