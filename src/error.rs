/// Centralized error types for repo2source using thiserror
///
/// Every condition that aborts a repository's transform has a named variant here so
/// batch callers can log it and move on to the next repository.
use std::time::Duration;
use thiserror::Error;

/// Main error type for the extraction pipeline
#[derive(Error, Debug)]
pub enum Repo2SourceError {
    #[error("Symlink resolution error: {0}")]
    Resolve(#[from] ResolveError),

    #[error("File selection error: {0}")]
    Selection(#[from] SelectionError),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

/// Errors raised while resolving a path to its real location
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("Dangling symlink: {0}")]
    DanglingSymlink(String),

    #[error("Failed to resolve '{path}': {source}")]
    ResolveFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised while walking a repository for candidate files
#[derive(Error, Debug)]
pub enum SelectionError {
    #[error("Repository root not found: {0}")]
    RootNotFound(String),

    #[error("Repository root is not a directory: {0}")]
    NotADirectory(String),

    #[error("Failed to walk directory: {0}")]
    WalkFailed(String),

    #[error("Failed to read file '{file}': {reason}")]
    FileReadFailed { file: String, reason: String },

    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

/// Failures of the remote parser, all fatal for the repository being transformed
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Parser returned no UAST for '{file}': {reason}")]
    EmptyResponse { file: String, reason: String },

    #[error("Failed to decode parser response for '{file}': {reason}")]
    Decode { file: String, reason: String },

    #[error("Parser transport failure for '{file}': {reason}")]
    Transport { file: String, reason: String },

    #[error("Parsing '{file}' timed out after {timeout:?}")]
    Timeout { file: String, timeout: Duration },
}

/// Errors related to building, encoding and decoding models
#[derive(Error, Debug)]
pub enum ModelError {
    #[error(
        "Model columns are misaligned: {filenames} filenames, {sources} sources, {uasts} uasts"
    )]
    Misaligned {
        filenames: usize,
        sources: usize,
        uasts: usize,
    },

    #[error("Model has no entries")]
    Empty,

    #[error("Packed array is corrupted: {0}")]
    CorruptPackedArray(String),

    #[error("Entry {index} is out of range for a model with {len} entries")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Expected a '{expected}' model, found '{actual}'")]
    WrongModelKind { expected: String, actual: String },

    #[error("Failed to encode model: {0}")]
    EncodeFailed(String),

    #[error("Failed to decode model: {0}")]
    DecodeFailed(String),

    #[error("Failed to write model to '{path}': {reason}")]
    WriteFailed { path: String, reason: String },

    #[error("Failed to read model from '{path}': {reason}")]
    ReadFailed { path: String, reason: String },
}

/// Errors related to configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration file: {0}")]
    LoadFailed(String),

    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),

    #[error("Invalid configuration value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("Failed to save configuration: {0}")]
    SaveFailed(String),

    #[error("Configuration file not found: {0}")]
    FileNotFound(String),
}

// Conversion from anyhow::Error to Repo2SourceError
impl From<anyhow::Error> for Repo2SourceError {
    fn from(err: anyhow::Error) -> Self {
        Repo2SourceError::Other(format!("{:#}", err))
    }
}

impl Repo2SourceError {
    /// Create a new error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Repo2SourceError::Other(msg.into())
    }

    /// True when the repository contained a link whose target does not exist
    pub fn is_dangling_symlink(&self) -> bool {
        matches!(
            self,
            Repo2SourceError::Resolve(ResolveError::DanglingSymlink(_))
                | Repo2SourceError::Selection(SelectionError::Resolve(
                    ResolveError::DanglingSymlink(_)
                ))
        )
    }

    /// Check if this is a user error (bad input or configuration) vs system error
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Repo2SourceError::Config(_)
                | Repo2SourceError::Selection(SelectionError::RootNotFound(_))
                | Repo2SourceError::Selection(SelectionError::NotADirectory(_))
        )
    }

    /// Check if a later rerun of the same repository could succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Repo2SourceError::Parse(ParseError::Transport { .. })
                | Repo2SourceError::Parse(ParseError::Timeout { .. })
                | Repo2SourceError::Io(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Repo2SourceError::Resolve(ResolveError::DanglingSymlink("/repo/link".into()));
        assert_eq!(
            err.to_string(),
            "Symlink resolution error: Dangling symlink: /repo/link"
        );
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Repo2SourceError = io_err.into();
        assert!(matches!(err, Repo2SourceError::Io(_)));
    }

    #[test]
    fn test_error_from_anyhow() {
        let err: Repo2SourceError = anyhow::anyhow!("test error").into();
        assert!(matches!(err, Repo2SourceError::Other(_)));
    }

    #[test]
    fn test_dangling_symlink_through_selection() {
        let err: Repo2SourceError =
            SelectionError::from(ResolveError::DanglingSymlink("a".into())).into();
        assert!(err.is_dangling_symlink());
        // transparent: no extra prefix from the selection layer
        assert_eq!(err.to_string(), "File selection error: Dangling symlink: a");
    }

    #[test]
    fn test_is_user_error() {
        let user_err = Repo2SourceError::Selection(SelectionError::RootNotFound("x".into()));
        assert!(user_err.is_user_error());

        let system_err = Repo2SourceError::Io(std::io::Error::other("test"));
        assert!(!system_err.is_user_error());
    }

    #[test]
    fn test_is_retryable() {
        let retryable = Repo2SourceError::Parse(ParseError::Timeout {
            file: "a.py".into(),
            timeout: Duration::from_secs(5),
        });
        assert!(retryable.is_retryable());

        let not_retryable = Repo2SourceError::Parse(ParseError::EmptyResponse {
            file: "a.py".into(),
            reason: "status error".into(),
        });
        assert!(!not_retryable.is_retryable());
    }

    #[test]
    fn test_parse_timeout_display() {
        let err = ParseError::Timeout {
            file: "main.go".into(),
            timeout: Duration::from_secs(50),
        };
        assert_eq!(err.to_string(), "Parsing 'main.go' timed out after 50s");
    }

    #[test]
    fn test_model_error_misaligned() {
        let err = ModelError::Misaligned {
            filenames: 2,
            sources: 2,
            uasts: 1,
        };
        assert_eq!(
            err.to_string(),
            "Model columns are misaligned: 2 filenames, 2 sources, 1 uasts"
        );
    }

    #[test]
    fn test_config_error_invalid_value() {
        let err = ConfigError::InvalidValue {
            key: "workers.num_workers".to_string(),
            reason: "must be greater than 0".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid configuration value for 'workers.num_workers': must be greater than 0"
        );
    }
}
