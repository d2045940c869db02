//! Parser service abstraction and the per-file invoker
//!
//! The parser itself is an external service. [`ParseService`] is the seam it plugs
//! into; [`ParseInvoker`] bounds every call with a timeout and turns the result into a
//! [`ParseOutcome`].

mod http_client;
mod uast;

pub use http_client::HttpParseClient;
pub use uast::{Position, Uast};

use crate::error::ParseError;
use crate::indexer::CandidateFile;
use std::sync::Arc;
use std::time::Duration;

/// One file submitted for parsing
#[derive(Debug, Clone, Copy)]
pub struct ParseRequest<'a> {
    pub filename: &'a str,
    pub language: &'a str,
    pub content: &'a [u8],
}

/// Remote service turning source bytes into a UAST
#[async_trait::async_trait]
pub trait ParseService: Send + Sync {
    /// Parse one file. A response without a tree is an error, never an empty success.
    async fn parse(&self, request: ParseRequest<'_>) -> Result<Uast, ParseError>;

    /// Where requests go, for logging
    fn endpoint(&self) -> &str;
}

/// Result of pushing one candidate through the parser
#[derive(Debug)]
pub enum ParseOutcome {
    Success { uast: Uast, source: Vec<u8> },
    SkippedOversize,
    Failed(ParseError),
}

/// Calls a [`ParseService`] with a per-call timeout and a size guard
#[derive(Clone)]
pub struct ParseInvoker {
    service: Arc<dyn ParseService>,
    timeout: Duration,
    max_file_size: u64,
}

impl ParseInvoker {
    pub fn new(service: Arc<dyn ParseService>, timeout: Duration, max_file_size: u64) -> Self {
        Self {
            service,
            timeout,
            max_file_size,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Parse `source`, the current contents of `candidate`.
    ///
    /// The size is checked again here because the file may have grown since it was
    /// selected.
    pub async fn invoke(&self, candidate: &CandidateFile, source: Vec<u8>) -> ParseOutcome {
        if source.len() as u64 > self.max_file_size {
            tracing::debug!(
                "Skipping {}: {} bytes exceeds the limit at read time",
                candidate.relative_path,
                source.len()
            );
            return ParseOutcome::SkippedOversize;
        }

        match self
            .parse(&candidate.relative_path, &candidate.language, &source)
            .await
        {
            Ok(uast) => ParseOutcome::Success { uast, source },
            Err(e) => ParseOutcome::Failed(e),
        }
    }

    /// Single bounded call to the service
    pub async fn parse(
        &self,
        filename: &str,
        language: &str,
        content: &[u8],
    ) -> Result<Uast, ParseError> {
        let request = ParseRequest {
            filename,
            language,
            content,
        };

        match tokio::time::timeout(self.timeout, self.service.parse(request)).await {
            Ok(result) => result,
            Err(_) => Err(ParseError::Timeout {
                file: filename.to_string(),
                timeout: self.timeout,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    struct FixedParser(Uast);

    #[async_trait::async_trait]
    impl ParseService for FixedParser {
        async fn parse(&self, _request: ParseRequest<'_>) -> Result<Uast, ParseError> {
            Ok(self.0.clone())
        }

        fn endpoint(&self) -> &str {
            "fixed"
        }
    }

    struct SlowParser;

    #[async_trait::async_trait]
    impl ParseService for SlowParser {
        async fn parse(&self, _request: ParseRequest<'_>) -> Result<Uast, ParseError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(Uast::new("Late"))
        }

        fn endpoint(&self) -> &str {
            "slow"
        }
    }

    struct EmptyParser;

    #[async_trait::async_trait]
    impl ParseService for EmptyParser {
        async fn parse(&self, request: ParseRequest<'_>) -> Result<Uast, ParseError> {
            Err(ParseError::EmptyResponse {
                file: request.filename.to_string(),
                reason: "no tree".to_string(),
            })
        }

        fn endpoint(&self) -> &str {
            "empty"
        }
    }

    fn candidate(name: &str) -> CandidateFile {
        CandidateFile {
            relative_path: name.to_string(),
            absolute_path: PathBuf::from("/repo").join(name),
            size: 5,
            language: "python".to_string(),
        }
    }

    #[tokio::test]
    async fn test_invoke_success_keeps_source() {
        let invoker = ParseInvoker::new(
            Arc::new(FixedParser(Uast::new("Module"))),
            Duration::from_secs(5),
            1024,
        );
        match invoker.invoke(&candidate("a.py"), b"x = 1".to_vec()).await {
            ParseOutcome::Success { uast, source } => {
                assert_eq!(uast.internal_type, "Module");
                assert_eq!(source, b"x = 1");
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_invoke_oversize_at_read_time() {
        let invoker = ParseInvoker::new(
            Arc::new(FixedParser(Uast::new("Module"))),
            Duration::from_secs(5),
            3,
        );
        let outcome = invoker.invoke(&candidate("a.py"), b"x = 1".to_vec()).await;
        assert!(matches!(outcome, ParseOutcome::SkippedOversize));
    }

    #[tokio::test]
    async fn test_invoke_timeout_is_classified() {
        let invoker = ParseInvoker::new(Arc::new(SlowParser), Duration::from_millis(50), 1024);
        let outcome = invoker.invoke(&candidate("slow.py"), b"x".to_vec()).await;
        match outcome {
            ParseOutcome::Failed(ParseError::Timeout { file, timeout }) => {
                assert_eq!(file, "slow.py");
                assert_eq!(timeout, Duration::from_millis(50));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_invoke_passes_service_failure_through() {
        let invoker = ParseInvoker::new(Arc::new(EmptyParser), Duration::from_secs(1), 1024);
        let outcome = invoker.invoke(&candidate("a.py"), b"x".to_vec()).await;
        assert!(matches!(
            outcome,
            ParseOutcome::Failed(ParseError::EmptyResponse { .. })
        ));
    }
}
