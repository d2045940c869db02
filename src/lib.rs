//! # repo2source - Repository to source-model extraction
//!
//! Turns locally checked-out repositories into "source" models: one file per
//! repository holding every source file's path, raw bytes and UAST (language-agnostic
//! syntax tree), as produced by an external parser service.
//!
//! ## Overview
//!
//! A run is all-or-nothing per repository. A dangling symlink, a file the parser cannot
//! handle, or a repository with no usable sources leaves no model behind, and a model
//! that already exists is left untouched unless overwriting is enabled. Models are laid
//! out in a sharded directory tree derived from the repository identifier.
//!
//! ## Architecture
//!
//! ```text
//!  repository ──► FileSelector ──► ParseInvoker ──► ModelBuilder ──► ModelContainer
//!                 (walk, resolve,   (timeout,        (aligned          (atomic write to
//!                  size, language)   ParseService)    columns)          sharded path)
//! ```
//!
//! ## Modules
//!
//! - [`transformer`]: Per-repository orchestration and batch fan-out
//! - [`indexer`]: Repository walk and source-file detection
//! - [`resolve`]: Symlink resolution
//! - [`parser`]: Parser service abstraction, HTTP client and UAST type
//! - [`model`]: The source model, its builder and container
//! - [`sharding`]: Identifier normalization and output layout
//! - [`config`]: Configuration management with environment variable support
//! - [`error`]: Error types
//! - [`paths`]: Platform-specific directories
//!
//! ## Usage Example
//!
//! ```no_run
//! use repo2source::config::Config;
//! use repo2source::transformer::Transformer;
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let transformer = Transformer::new(Config::new()?)?;
//!     let repositories = vec!["/data/repos/project".to_string()];
//!     let report = transformer.transform(&repositories, Path::new("/data/models")).await;
//!     println!("{}", report);
//!     Ok(())
//! }
//! ```

/// Configuration management with environment variable overrides
pub mod config;

/// Error types and utilities
pub mod error;

/// Repository walking and source-file detection
pub mod indexer;

/// Source models, their builder and on-disk container
pub mod model;

/// Parser service client and UAST representation
pub mod parser;

/// Platform-specific config locations
pub mod paths;

/// Symlink resolution for repository entries
pub mod resolve;

/// Deterministic output paths for models
pub mod sharding;

/// Repository-to-model orchestration
pub mod transformer;

pub use config::Config;
pub use error::Repo2SourceError;
pub use model::SourceModel;
pub use transformer::{TransformOutcome, TransformReport, Transformer};
