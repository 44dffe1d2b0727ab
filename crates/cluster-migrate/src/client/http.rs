//! reqwest-backed admin client.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use crate::client::{AdminClient, AdminResponse};
use crate::endpoint::Endpoint;
use crate::error::{Error, Result};
use crate::record::Record;

/// Default request timeout for admin API calls.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(10_000);

/// Creates an HTTP client that bounds every request by `timeout` and keeps
/// no idle connection between requests.
///
/// # Errors
///
/// Returns [`Error::Config`] if the client cannot be built.
pub fn create_http_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout)
        .pool_max_idle_per_host(0)
        .build()
        .map_err(|e| Error::Config(format!("cannot build HTTP client: {e}")))
}

/// Admin client speaking plain HTTP to one endpoint.
pub struct HttpAdminClient {
    endpoint: Endpoint,
    base_url: String,
    client: Client,
    timeout: Duration,
}

impl HttpAdminClient {
    /// Creates a client for `endpoint` with the given request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(endpoint: Endpoint, timeout: Duration) -> Result<Self> {
        Ok(Self {
            base_url: endpoint.base_url(),
            endpoint,
            client: create_http_client(timeout)?,
            timeout,
        })
    }

    fn url(&self, path_and_query: &str) -> String {
        if path_and_query.starts_with('/') {
            format!("{}{}", self.base_url, path_and_query)
        } else {
            format!("{}/{}", self.base_url, path_and_query)
        }
    }

    fn transport_error(&self, method: &'static str, path: &str, e: &reqwest::Error) -> Error {
        let message = if e.is_timeout() {
            format!("timed out after {}ms", self.timeout.as_millis())
        } else if e.is_connect() {
            format!("cannot connect to {}: {e}", self.endpoint)
        } else {
            e.to_string()
        };
        Error::Transport {
            method,
            path: path.to_string(),
            message,
        }
    }

    async fn read(
        &self,
        method: &'static str,
        path: &str,
        response: reqwest::Response,
    ) -> Result<AdminResponse> {
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| self.transport_error(method, path, &e))?;
        debug!("{} {}{} -> {}", method, self.endpoint, path, status);
        Ok(AdminResponse { status, body })
    }
}

#[async_trait]
impl AdminClient for HttpAdminClient {
    fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    async fn get(&self, path_and_query: &str) -> Result<AdminResponse> {
        let response = self
            .client
            .get(self.url(path_and_query))
            .send()
            .await
            .map_err(|e| self.transport_error("GET", path_and_query, &e))?;

        self.read("GET", path_and_query, response).await
    }

    async fn post(&self, path: &str, record: &Record) -> Result<AdminResponse> {
        let response = self
            .client
            .post(self.url(path))
            .json(record)
            .send()
            .await
            .map_err(|e| self.transport_error("POST", path, &e))?;

        self.read("POST", path, response).await
    }
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod tests;
