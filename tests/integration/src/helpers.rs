//! Test helpers for integration tests
//!
//! Provides utilities for spawning test servers and making HTTP requests.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Result;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use temple_api::{create_app, create_app_state, serve};
use temple_common::AppConfig;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Actor sent on staff requests
pub const STAFF: &str = "staff-1";

/// Test server instance that manages lifecycle
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: Client,
    _handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a new test server on the memory backend
    pub async fn start() -> Result<Self> {
        Self::start_with_config(test_config()?).await
    }

    /// Start a test server with custom config
    pub async fn start_with_config(config: AppConfig) -> Result<Self> {
        let state = create_app_state(config).await?;
        let app = create_app(state)?;

        // Port 0 lets the OS pick a free port
        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let addr = listener.local_addr()?;

        let handle = tokio::spawn(async move {
            serve(listener, app).await.ok();
        });

        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;

        Ok(Self {
            addr,
            client,
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

    /// Make a GET request
    pub async fn get(&self, path: &str) -> Result<Response> {
        Ok(self.client.get(self.url(path)).send().await?)
    }

    /// Make a GET request as staff
    pub async fn get_staff(&self, path: &str) -> Result<Response> {
        send(staff(self.client.get(self.url(path)))).await
    }

    /// Make a POST request with JSON body and no actor
    pub async fn post<T: Serialize>(&self, path: &str, body: &T) -> Result<Response> {
        Ok(self.client.post(self.url(path)).json(body).send().await?)
    }

    /// Make a POST request without a body and no actor
    pub async fn post_empty(&self, path: &str) -> Result<Response> {
        Ok(self.client.post(self.url(path)).send().await?)
    }

    /// Make a POST request as staff
    pub async fn post_staff<T: Serialize>(&self, path: &str, body: &T) -> Result<Response> {
        send(staff(self.client.post(self.url(path))).json(body)).await
    }

    /// Make a POST request without a body as staff
    pub async fn post_staff_empty(&self, path: &str) -> Result<Response> {
        send(staff(self.client.post(self.url(path)))).await
    }

    /// Make a PATCH request as staff
    pub async fn patch_staff<T: Serialize>(&self, path: &str, body: &T) -> Result<Response> {
        send(staff(self.client.patch(self.url(path))).json(body)).await
    }

    /// Make a PUT request as staff
    pub async fn put_staff<T: Serialize>(&self, path: &str, body: &T) -> Result<Response> {
        send(staff(self.client.put(self.url(path))).json(body)).await
    }
}

fn staff(request: RequestBuilder) -> RequestBuilder {
    request.header("x-actor-id", STAFF)
}

async fn send(request: RequestBuilder) -> Result<Response> {
    Ok(request.send().await?)
}

/// Memory backend, OS-assigned port and a rate limit tests never reach
pub fn test_config() -> Result<AppConfig> {
    let vars: HashMap<&str, &str> = HashMap::from([
        ("APP_ENV", "development"),
        ("STORAGE_BACKEND", "memory"),
        ("API_PORT", "0"),
        ("RATE_LIMIT_REQUESTS_PER_SECOND", "10000"),
        ("RATE_LIMIT_BURST", "10000"),
    ]);
    AppConfig::from_lookup(|key| vars.get(key).map(|v| (*v).to_string()))
        .map_err(|e| anyhow::anyhow!("Config error: {}", e))
}

/// Assert response status and parse JSON body
pub async fn assert_json<T: DeserializeOwned>(
    response: Response,
    expected_status: StatusCode,
) -> Result<T> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        anyhow::bail!(
            "Expected status {}, got {}. Body: {}",
            expected_status,
            status,
            body
        );
    }
    Ok(response.json().await?)
}

/// Assert an error response and return its `error.code`
pub async fn assert_error(response: Response, expected_status: StatusCode) -> Result<String> {
    let body: serde_json::Value = assert_json(response, expected_status).await?;
    body["error"]["code"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| anyhow::anyhow!("Missing error code in {}", body))
}
