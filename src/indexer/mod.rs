//! Repository file discovery and source-file detection
//!
//! Walks a repository depth-first, resolves every entry through a
//! [`SymlinkResolver`](crate::resolve::SymlinkResolver), and yields the files a
//! [`LanguageDetector`] recognizes as source code within the size limit.

mod candidate;
mod file_selector;
mod language;

pub use candidate::CandidateFile;
pub use file_selector::{FileSelector, Selection, SelectionStats};
pub use language::{DEFAULT_EXCLUDE_PATTERNS, ExtensionDetector, LanguageDetector, detect_language};
