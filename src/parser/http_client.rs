//! JSON-over-HTTP client for the parser service

use super::{ParseRequest, ParseService, Uast};
use crate::error::ParseError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

const PARSE_ROUTE: &str = "/v1/parse";

#[derive(Serialize)]
struct WireRequest<'a> {
    filename: &'a str,
    language: &'a str,
    content: Cow<'a, str>,
}

#[derive(Deserialize)]
struct WireResponse {
    #[serde(default)]
    status: String,
    #[serde(default)]
    errors: Vec<String>,
    #[serde(default)]
    uast: Option<Uast>,
}

/// Parser service reached over HTTP
pub struct HttpParseClient {
    client: reqwest::Client,
    endpoint: String,
    parse_url: String,
}

impl HttpParseClient {
    /// Create a client for `endpoint`; a bare `host:port` is treated as plain HTTP.
    pub fn new(endpoint: &str) -> Result<Self> {
        let endpoint = endpoint.trim().trim_end_matches('/');
        let endpoint = if endpoint.contains("://") {
            endpoint.to_string()
        } else {
            format!("http://{}", endpoint)
        };

        let client = reqwest::Client::builder()
            .build()
            .context("Failed to build HTTP client for the parser service")?;

        tracing::debug!("Parser service endpoint: {}", endpoint);

        Ok(Self {
            parse_url: format!("{}{}", endpoint, PARSE_ROUTE),
            client,
            endpoint,
        })
    }
}

#[async_trait::async_trait]
impl ParseService for HttpParseClient {
    async fn parse(&self, request: ParseRequest<'_>) -> Result<Uast, ParseError> {
        let file = request.filename;
        let transport = |reason: String| ParseError::Transport {
            file: file.to_string(),
            reason,
        };

        let body = WireRequest {
            filename: request.filename,
            language: request.language,
            content: String::from_utf8_lossy(request.content),
        };

        let response = self
            .client
            .post(&self.parse_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| transport(e.to_string()))?;

        let status = response.status();
        let payload = response
            .bytes()
            .await
            .map_err(|e| transport(e.to_string()))?;

        if !status.is_success() {
            return Err(transport(format!(
                "parser service returned HTTP {}",
                status.as_u16()
            )));
        }

        let decoded: WireResponse =
            serde_json::from_slice(&payload).map_err(|e| ParseError::Decode {
                file: file.to_string(),
                reason: e.to_string(),
            })?;

        match decoded.uast {
            Some(uast) => {
                if !decoded.status.is_empty() && decoded.status != "ok" {
                    tracing::debug!(
                        "Parser reported status '{}' for {} but returned a tree",
                        decoded.status,
                        file
                    );
                }
                Ok(uast)
            }
            None => {
                let reason = if decoded.errors.is_empty() {
                    format!("status '{}'", decoded.status)
                } else {
                    decoded.errors.join("; ")
                };
                Err(ParseError::EmptyResponse {
                    file: file.to_string(),
                    reason,
                })
            }
        }
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}
