//! Source-file detection: which files are worth sending to the parser, and in what language

use globset::{Glob, GlobSet, GlobSetBuilder};

/// Vendored and generated paths that never count as repository source
pub const DEFAULT_EXCLUDE_PATTERNS: &[&str] = &[
    "**/vendor/**",
    "**/node_modules/**",
    "**/third_party/**",
    "**/bower_components/**",
    "**/*.min.js",
    "**/*.generated.*",
    "**/*_pb2.py",
    "**/*.pb.go",
];

/// Decides whether a file is source code and which language hint to pass to the parser
pub trait LanguageDetector: Send + Sync {
    /// `relative_path` uses `/` separators; `head` holds the first bytes of the file.
    /// Returns `None` for anything that is not a source file.
    fn detect(&self, relative_path: &str, head: &[u8]) -> Option<String>;
}

/// Detect programming language from file extension
///
/// Names are lowercase, the form the parser service expects as a language hint.
pub fn detect_language(extension: &str) -> Option<String> {
    let lang = match extension.to_lowercase().as_str() {
        "py" => "python",
        "java" => "java",
        "js" | "mjs" | "cjs" | "jsx" => "javascript",
        "ts" | "tsx" => "typescript",
        "go" => "go",
        "rb" => "ruby",
        "php" => "php",
        "c" | "h" => "c",
        "cpp" | "cc" | "cxx" | "hpp" | "hh" => "cpp",
        "cs" => "csharp",
        "rs" => "rust",
        "sh" | "bash" => "bash",
        "kt" | "kts" => "kotlin",
        "scala" => "scala",
        "swift" => "swift",
        _ => return None,
    };

    Some(lang.to_string())
}

/// Extension-based detector that also rejects vendored, generated and binary files
pub struct ExtensionDetector {
    exclusions: GlobSet,
}

impl ExtensionDetector {
    pub fn new() -> Self {
        Self::with_exclusions(DEFAULT_EXCLUDE_PATTERNS.iter().map(|p| p.to_string()))
    }

    /// Build a detector with a custom exclusion list. Invalid globs are logged and skipped.
    pub fn with_exclusions(patterns: impl IntoIterator<Item = String>) -> Self {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            match Glob::new(&pattern) {
                Ok(glob) => {
                    builder.add(glob);
                }
                Err(e) => {
                    tracing::warn!("Ignoring invalid exclude pattern '{}': {}", pattern, e);
                }
            }
        }

        let exclusions = builder.build().unwrap_or_else(|e| {
            tracing::warn!("Failed to compile exclude patterns: {}", e);
            GlobSet::empty()
        });

        Self { exclusions }
    }

    pub fn is_excluded(&self, relative_path: &str) -> bool {
        self.exclusions.is_match(relative_path)
    }
}

impl Default for ExtensionDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageDetector for ExtensionDetector {
    fn detect(&self, relative_path: &str, head: &[u8]) -> Option<String> {
        if self.is_excluded(relative_path) {
            return None;
        }
        // NUL bytes never appear in text sources
        if head.contains(&0) {
            return None;
        }
        let extension = relative_path.rsplit_once('.').map(|(_, ext)| ext)?;
        if extension.contains('/') {
            return None;
        }
        detect_language(extension)
    }
}
