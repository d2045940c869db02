//! Candidate file produced by the selector

use std::path::PathBuf;

/// A repository file that passed selection and is ready to be parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFile {
    /// Path relative to the repository root, `/`-separated
    pub relative_path: String,
    /// Real location after symlink resolution
    pub absolute_path: PathBuf,
    pub size: u64,
    /// Language hint for the parser
    pub language: String,
}
