//! Thin Discord REST client
//!
//! Handles bot authentication, audit-log reasons and a single retry on
//! HTTP 429 responses.

use std::time::Duration;

use rankup_common::DiscordConfig;
use rankup_core::DomainError;
use reqwest::header::{HeaderMap, AUTHORIZATION, RETRY_AFTER};
use reqwest::{Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

/// Header carrying the reason shown in the guild audit log
pub const AUDIT_LOG_REASON: &str = "x-audit-log-reason";

/// Longest Retry-After we are willing to wait in-line
const MAX_RETRY_WAIT: Duration = Duration::from_secs(5);

/// Errors raised while talking to the Discord API
#[derive(Debug, Error)]
pub enum DiscordClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Discord returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Rate limited by Discord, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u128 },
}

impl From<DiscordClientError> for DomainError {
    fn from(err: DiscordClientError) -> Self {
        DomainError::PlatformError(err.to_string())
    }
}

/// Discord REST client bound to one bot token
#[derive(Clone)]
pub struct DiscordClient {
    http: reqwest::Client,
    api_base: String,
    auth_header: String,
}

impl DiscordClient {
    /// Create a client from the Discord configuration section
    pub fn new(config: &DiscordConfig) -> Result<Self, DiscordClientError> {
        Self::with_base(
            &config.token,
            &config.api_base,
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    /// Create a client against an arbitrary API base (tests, proxies)
    pub fn with_base(
        token: &str,
        api_base: &str,
        timeout: Duration,
    ) -> Result<Self, DiscordClientError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            auth_header: format!("Bot {token}"),
        })
    }

    /// Absolute URL for an API path
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.api_base, path.trim_start_matches('/'))
    }

    /// GET a JSON document
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, DiscordClientError> {
        let response = self.send(Method::GET, path, None, None).await?;
        Ok(response.json().await?)
    }

    /// Send a request, retrying once when Discord asks us to slow down
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        reason: Option<&str>,
    ) -> Result<Response, DiscordClientError> {
        let url = self.url(path);
        let mut retried = false;

        loop {
            let mut request = self
                .http
                .request(method.clone(), &url)
                .header(AUTHORIZATION, &self.auth_header);
            if let Some(reason) = reason {
                request = request.header(AUDIT_LOG_REASON, encode_audit_reason(reason));
            }
            if let Some(body) = body {
                request = request.json(body);
            }

            let response = request.send().await?;
            let status = response.status();
            debug!(%method, path, status = status.as_u16(), "Discord request");

            if status == StatusCode::TOO_MANY_REQUESTS {
                let wait = retry_after(response.headers());
                if retried || wait > MAX_RETRY_WAIT {
                    return Err(DiscordClientError::RateLimited {
                        retry_after_ms: wait.as_millis(),
                    });
                }
                warn!(path, wait_ms = wait.as_millis() as u64, "Rate limited, retrying once");
                tokio::time::sleep(wait).await;
                retried = true;
                continue;
            }

            if status.is_success() {
                return Ok(response);
            }

            let body = response.text().await.unwrap_or_default();
            return Err(DiscordClientError::Status {
                status: status.as_u16(),
                body,
            });
        }
    }
}

impl std::fmt::Debug for DiscordClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscordClient")
            .field("api_base", &self.api_base)
            .finish()
    }
}

/// Wait requested by a 429 response; one second when the header is absent
fn retry_after(headers: &HeaderMap) -> Duration {
    headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|secs| secs.is_finite() && *secs >= 0.0)
        .map_or(Duration::from_secs(1), Duration::from_secs_f64)
}

/// Percent-encode an audit-log reason (Discord expects URL encoding)
fn encode_audit_reason(reason: &str) -> String {
    let mut out = String::with_capacity(reason.len());
    for byte in reason.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.' | b'~') {
            out.push(byte as char);
        } else {
            out.push_str(&format!("%{byte:02X}"));
        }
    }
    out
}
