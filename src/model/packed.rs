//! Length-prefixed packing of variable-size byte entries into one buffer

use crate::error::ModelError;
use serde::{Deserialize, Serialize};

/// Concatenated entries plus the byte length of each one
///
/// The length table always covers `data` exactly: every constructor, including
/// deserialization, rejects a table that does not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PackedParts")]
pub struct PackedArray {
    #[serde(with = "serde_bytes")]
    data: Vec<u8>,
    lengths: Vec<u32>,
    /// Start of every entry plus the end of the last one
    #[serde(skip)]
    offsets: Vec<usize>,
}

/// Wire form, checked before it becomes a [`PackedArray`]
#[derive(Deserialize)]
struct PackedParts {
    #[serde(with = "serde_bytes")]
    data: Vec<u8>,
    lengths: Vec<u32>,
}

impl TryFrom<PackedParts> for PackedArray {
    type Error = ModelError;

    fn try_from(parts: PackedParts) -> Result<Self, Self::Error> {
        Self::from_parts(parts.data, parts.lengths)
    }
}

impl Default for PackedArray {
    fn default() -> Self {
        Self {
            data: Vec::new(),
            lengths: Vec::new(),
            offsets: vec![0],
        }
    }
}

impl PackedArray {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild an array from its buffer and length table
    pub fn from_parts(data: Vec<u8>, lengths: Vec<u32>) -> Result<Self, ModelError> {
        let mut offsets = Vec::with_capacity(lengths.len() + 1);
        let mut end = 0usize;
        offsets.push(end);
        for &len in &lengths {
            end = end.saturating_add(len as usize);
            offsets.push(end);
        }

        if end != data.len() {
            return Err(ModelError::CorruptPackedArray(format!(
                "lengths sum to {} bytes but data holds {}",
                end,
                data.len()
            )));
        }

        Ok(Self {
            data,
            lengths,
            offsets,
        })
    }

    /// Pack a sequence of entries
    pub fn merge<I, B>(items: I) -> Result<Self, ModelError>
    where
        I: IntoIterator<Item = B>,
        B: AsRef<[u8]>,
    {
        let mut packed = Self::new();
        for item in items {
            packed.push(item.as_ref())?;
        }
        Ok(packed)
    }

    pub fn push(&mut self, entry: &[u8]) -> Result<(), ModelError> {
        let len = u32::try_from(entry.len()).map_err(|_| {
            ModelError::CorruptPackedArray(format!(
                "entry of {} bytes does not fit a u32 length",
                entry.len()
            ))
        })?;
        self.data.extend_from_slice(entry);
        self.lengths.push(len);
        self.offsets.push(self.data.len());
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.lengths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lengths.is_empty()
    }

    /// The concatenated entries
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn lengths(&self) -> &[u32] {
        &self.lengths
    }

    /// Check that the length table covers `data` exactly
    pub fn validate(&self) -> Result<(), ModelError> {
        let total: u64 = self.lengths.iter().map(|&l| u64::from(l)).sum();
        if total != self.data.len() as u64 || self.offsets.len() != self.lengths.len() + 1 {
            return Err(ModelError::CorruptPackedArray(format!(
                "lengths sum to {} bytes but data holds {}",
                total,
                self.data.len()
            )));
        }
        Ok(())
    }

    /// Borrow entry `index`
    pub fn get(&self, index: usize) -> Option<&[u8]> {
        let start = *self.offsets.get(index)?;
        let end = *self.offsets.get(index + 1)?;
        self.data.get(start..end)
    }

    pub fn iter(&self) -> impl Iterator<Item = &[u8]> {
        self.offsets
            .windows(2)
            .map(|w| self.data.get(w[0]..w[1]).unwrap_or_default())
    }

    /// Unpack into owned entries, rejecting a corrupt length table
    pub fn split(&self) -> Result<Vec<Vec<u8>>, ModelError> {
        self.validate()?;
        Ok(self.iter().map(<[u8]>::to_vec).collect())
    }
}
