//! Test helpers for integration tests
//!
//! Serves the gateway router over the in-memory harness and wraps a
//! `reqwest` client around it.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use rankup_gateway::{create_app, AppState};
use rankup_service::{ResetScheduler, SchedulerConfig};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::fixtures::Harness;

/// Token used by servers started with [`TestServer::start_with_token`]
pub const TEST_TOKEN: &str = "test-command-token";

/// Gateway bound to an ephemeral local port
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: Client,
    pub scheduler: Arc<ResetScheduler>,
    token: Option<String>,
    _handle: JoinHandle<()>,
}

impl TestServer {
    /// Serve the harness without a command token
    pub async fn start(harness: &Harness) -> Result<Self> {
        Self::spawn(harness, None).await
    }

    /// Serve the harness with [`TEST_TOKEN`] required on command routes
    pub async fn start_with_token(harness: &Harness) -> Result<Self> {
        Self::spawn(harness, Some(TEST_TOKEN.to_string())).await
    }

    async fn spawn(harness: &Harness, token: Option<String>) -> Result<Self> {
        let scheduler =
            ResetScheduler::new_shared(harness.ctx.clone(), SchedulerConfig::default());
        let state =
            AppState::new(harness.ctx.clone(), Arc::clone(&scheduler)).with_command_token(token.clone());
        let app = create_app(state, Duration::from_secs(5));

        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let addr = listener.local_addr()?;

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;

        Ok(Self {
            addr,
            client,
            scheduler,
            token,
            _handle: handle,
        })
    }

    /// Get base URL for the server
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url(), path)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// GET without credentials
    pub async fn get_anonymous(&self, path: &str) -> Result<Response> {
        Ok(self.client.get(self.url(path)).send().await?)
    }

    pub async fn get(&self, path: &str) -> Result<Response> {
        Ok(self.authorized(self.client.get(self.url(path))).send().await?)
    }

    pub async fn post<T: Serialize>(&self, path: &str, body: &T) -> Result<Response> {
        Ok(self
            .authorized(self.client.post(self.url(path)))
            .json(body)
            .send()
            .await?)
    }

    /// POST with no body
    pub async fn post_empty(&self, path: &str) -> Result<Response> {
        Ok(self.authorized(self.client.post(self.url(path))).send().await?)
    }

    pub async fn put<T: Serialize>(&self, path: &str, body: &T) -> Result<Response> {
        Ok(self
            .authorized(self.client.put(self.url(path)))
            .json(body)
            .send()
            .await?)
    }

    pub async fn delete(&self, path: &str) -> Result<Response> {
        Ok(self.authorized(self.client.delete(self.url(path))).send().await?)
    }
}

/// Assert response status and parse JSON body
pub async fn assert_json<T: DeserializeOwned>(
    response: Response,
    expected_status: StatusCode,
) -> Result<T> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        anyhow::bail!("Expected status {expected_status}, got {status}. Body: {body}");
    }
    Ok(response.json().await?)
}

/// Assert response status without parsing body
pub async fn assert_status(response: Response, expected_status: StatusCode) -> Result<()> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        anyhow::bail!("Expected status {expected_status}, got {status}. Body: {body}");
    }
    Ok(())
}

/// Assert an error status and return the `error.code` field
pub async fn assert_error_code(response: Response, expected_status: StatusCode) -> Result<String> {
    let body: serde_json::Value = assert_json(response, expected_status).await?;
    body["error"]["code"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| anyhow::anyhow!("missing error.code in {body}"))
}

/// Let spawned tasks run without advancing paused time
pub async fn settle() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}
