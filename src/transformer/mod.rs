//! Repository-to-model orchestration
//!
//! For each repository: compute the sharded destination, skip it if a model already
//! exists (unless overwriting), then stream candidates from the [`FileSelector`] through
//! the [`ParseInvoker`] into a [`ModelBuilder`]. A model is only written once it has
//! been fully built and validated, so a failing repository never leaves a file behind.

use crate::config::Config;
use crate::error::{Repo2SourceError, SelectionError};
use crate::indexer::{CandidateFile, ExtensionDetector, FileSelector, LanguageDetector, SelectionStats};
use crate::model::{ModelBuilder, ModelContainer, MsgPackContainer};
use crate::parser::{HttpParseClient, ParseInvoker, ParseService};
use crate::resolve::{FsSymlinkResolver, SymlinkResolver};
use crate::sharding::{sharded_path, trim_identifier};
use anyhow::Result;
use futures::stream::{self, StreamExt};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// Candidates buffered between the blocking walk and the parse loop
const SELECTION_BUFFER: usize = 64;

/// What happened to one repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransformOutcome {
    /// A model with `files` entries was written to `path`
    Written { path: PathBuf, files: usize },
    /// A model already existed at `path` and overwriting is disabled
    SkippedExisting { path: PathBuf },
    /// No usable source files; nothing was written
    Empty,
}

/// Per-batch tally of [`TransformOutcome`]s and failures
#[derive(Debug, Clone, Default)]
pub struct TransformReport {
    pub written: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
    pub empty: Vec<String>,
    /// (repository, error message)
    pub failed: Vec<(String, String)>,
}

impl TransformReport {
    pub fn record(&mut self, repository: &str, result: Result<TransformOutcome, Repo2SourceError>) {
        match result {
            Ok(TransformOutcome::Written { path, .. }) => self.written.push(path),
            Ok(TransformOutcome::SkippedExisting { path }) => self.skipped.push(path),
            Ok(TransformOutcome::Empty) => self.empty.push(repository.to_string()),
            Err(e) => self.failed.push((repository.to_string(), e.to_string())),
        }
    }

    pub fn total(&self) -> usize {
        self.written.len() + self.skipped.len() + self.empty.len() + self.failed.len()
    }

    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}

impl fmt::Display for TransformReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} repositories: {} written, {} skipped, {} empty, {} failed",
            self.total(),
            self.written.len(),
            self.skipped.len(),
            self.empty.len(),
            self.failed.len()
        )
    }
}

/// Turns repositories into "source" models
#[derive(Clone)]
pub struct Transformer {
    config: Arc<Config>,
    resolver: Arc<dyn SymlinkResolver>,
    detector: Arc<dyn LanguageDetector>,
    parser: Arc<dyn ParseService>,
    container: Arc<dyn ModelContainer>,
    parse_timeout: Duration,
}

impl Transformer {
    /// Create a transformer talking to the parser service configured in `config`
    pub fn new(config: Config) -> Result<Self> {
        let parser = HttpParseClient::new(&config.parser.endpoint)?;
        Ok(Self::with_parser(config, Arc::new(parser)))
    }

    /// Create a transformer with an explicit parser service
    pub fn with_parser(config: Config, parser: Arc<dyn ParseService>) -> Self {
        let detector = ExtensionDetector::with_exclusions(config.selection.exclude_patterns.clone());
        let parse_timeout = config.parser.timeout();
        Self {
            config: Arc::new(config),
            resolver: Arc::new(FsSymlinkResolver),
            detector: Arc::new(detector),
            parser,
            container: Arc::new(MsgPackContainer),
            parse_timeout,
        }
    }

    pub fn with_resolver(mut self, resolver: Arc<dyn SymlinkResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn with_detector(mut self, detector: Arc<dyn LanguageDetector>) -> Self {
        self.detector = detector;
        self
    }

    pub fn with_container(mut self, container: Arc<dyn ModelContainer>) -> Self {
        self.container = container;
        self
    }

    /// Override the per-file timeout, mostly for tests that need sub-second limits
    pub fn with_parse_timeout(mut self, timeout: Duration) -> Self {
        self.parse_timeout = timeout;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Models this one is derived from. Source models are built from raw repositories.
    pub fn dependencies(&self) -> Vec<String> {
        Vec::new()
    }

    /// Destination of the model for `repository` under `output`
    pub fn prepare_filename(&self, repository: &str, output: &Path) -> PathBuf {
        sharded_path(repository, output, self.config.output.shard_depth)
    }

    /// Transform every repository, up to `workers.num_workers` at a time.
    ///
    /// A failing repository is recorded in the report and does not affect the others.
    pub async fn transform(&self, repositories: &[String], output: &Path) -> TransformReport {
        let workers = self.config.workers.num_workers.max(1);
        tracing::info!(
            "Transforming {} repositories into {:?} with {} workers",
            repositories.len(),
            output,
            workers
        );

        let results: Vec<(String, Result<TransformOutcome, Repo2SourceError>)> =
            stream::iter(repositories.iter().cloned())
                .map(|repository| async move {
                    let result = self.transform_repository(&repository, output).await;
                    (repository, result)
                })
                .buffer_unordered(workers)
                .collect()
                .await;

        let mut report = TransformReport::default();
        for (repository, result) in results {
            if let Err(e) = &result {
                tracing::warn!("Failed to transform {}: {}", trim_identifier(&repository), e);
            }
            report.record(&repository, result);
        }

        tracing::info!("{}", report);
        report
    }

    /// Transform one repository into its sharded location under `output`,
    /// writing the model only if every file parsed
    pub async fn transform_repository(
        &self,
        repository: &str,
        output: &Path,
    ) -> Result<TransformOutcome, Repo2SourceError> {
        let destination = self.prepare_filename(repository, output);
        self.transform_to_file(repository, &destination).await
    }

    /// Transform one repository into the model file `destination`.
    ///
    /// Follows the same skip, overwrite and all-or-nothing rules as
    /// [`transform_repository`](Self::transform_repository).
    pub async fn transform_to_file(
        &self,
        repository: &str,
        destination: &Path,
    ) -> Result<TransformOutcome, Repo2SourceError> {
        let start = Instant::now();
        let destination = destination.to_path_buf();

        // a failed stat must not be mistaken for "no model yet"
        if !self.config.output.overwrite_existing && tokio::fs::try_exists(&destination).await? {
            tracing::info!("Model {:?} already exists, skipping", destination);
            return Ok(TransformOutcome::SkippedExisting { path: destination });
        }

        let root = PathBuf::from(trim_identifier(repository));
        tracing::info!("Transforming {:?}", root);

        let max_file_size = self.config.selection.max_file_size;
        let selector = FileSelector::new(&root, max_file_size)
            .with_resolver(self.resolver.clone())
            .with_detector(self.detector.clone());

        // The walk is blocking, so it runs on its own thread and hands candidates over
        // one at a time. Dropping the receiver stops it at the next send.
        let (tx, mut rx) = mpsc::channel::<Result<CandidateFile, SelectionError>>(SELECTION_BUFFER);
        let walk = tokio::task::spawn_blocking(move || -> Result<SelectionStats, SelectionError> {
            let mut selection = selector.select()?;
            for item in selection.by_ref() {
                if tx.blocking_send(item).is_err() {
                    break;
                }
            }
            Ok(selection.stats())
        });

        let invoker = ParseInvoker::new(self.parser.clone(), self.parse_timeout, max_file_size);
        let mut builder = ModelBuilder::new();

        while let Some(item) = rx.recv().await {
            let candidate = item?;
            let source = tokio::fs::read(&candidate.absolute_path).await.map_err(|e| {
                SelectionError::FileReadFailed {
                    file: candidate.relative_path.clone(),
                    reason: e.to_string(),
                }
            })?;

            let outcome = invoker.invoke(&candidate, source).await;
            builder.accumulate(&candidate, outcome)?;
        }

        let stats = walk
            .await
            .map_err(|e| Repo2SourceError::other(format!("File selection task failed: {}", e)))??;
        tracing::debug!(
            "Selection of {:?}: {} seen, {} selected, {} oversize, {} not source",
            root,
            stats.seen,
            stats.selected,
            stats.oversize,
            stats.unrecognized
        );

        if builder.is_empty() {
            tracing::warn!("No usable source files in {:?}, nothing written", root);
            return Ok(TransformOutcome::Empty);
        }

        let model = builder.finalize(repository)?;
        let files = model.len();

        let container = self.container.clone();
        let path = destination.clone();
        tokio::task::spawn_blocking(move || container.write(&model, &path))
            .await
            .map_err(|e| Repo2SourceError::other(format!("Model write task failed: {}", e)))??;

        tracing::info!(
            "Wrote {} files from {:?} to {:?} in {:.2?}",
            files,
            root,
            destination,
            start.elapsed()
        );

        Ok(TransformOutcome::Written {
            path: destination,
            files,
        })
    }
}
