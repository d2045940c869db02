use super::{MODEL_NAME, ModelMeta, PackedArray, SourceModel};
use crate::error::{ModelError, Repo2SourceError};
use crate::indexer::CandidateFile;
use crate::parser::ParseOutcome;

/// Accumulates parsed files into an in-memory [`SourceModel`]
#[derive(Debug, Default)]
pub struct ModelBuilder {
    filenames: Vec<String>,
    sources: PackedArray,
    uasts: PackedArray,
    skipped_oversize: usize,
}

impl ModelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one file's outcome into the model. A failed parse aborts the build.
    pub fn accumulate(
        &mut self,
        candidate: &CandidateFile,
        outcome: ParseOutcome,
    ) -> Result<(), Repo2SourceError> {
        match outcome {
            ParseOutcome::Success { uast, source } => {
                // any error here discards the whole builder, so columns need no rollback
                let encoded = uast.to_bytes()?;
                self.sources.push(&source)?;
                self.uasts.push(&encoded)?;
                self.filenames.push(candidate.relative_path.clone());
                Ok(())
            }
            ParseOutcome::SkippedOversize => {
                self.skipped_oversize += 1;
                Ok(())
            }
            ParseOutcome::Failed(e) => Err(e.into()),
        }
    }

    pub fn len(&self) -> usize {
        self.filenames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filenames.is_empty()
    }

    pub fn skipped_oversize(&self) -> usize {
        self.skipped_oversize
    }

    /// Stamp metadata and check the model is complete
    pub fn finalize(self, repository: &str) -> Result<SourceModel, ModelError> {
        if self.filenames.is_empty() {
            return Err(ModelError::Empty);
        }

        let model = SourceModel {
            meta: ModelMeta::new(MODEL_NAME),
            repository: repository.to_string(),
            filenames: self.filenames,
            sources: self.sources,
            uasts: self.uasts,
        };
        model.validate()?;
        Ok(model)
    }
}
