//! Admin API transport.
//!
//! The [`AdminClient`] trait is the seam between the migration engine and
//! the network: one call issues exactly one request and returns the raw
//! status and body. No retry, no pooling, no interpretation of the status.

pub mod http;

use async_trait::async_trait;

use crate::endpoint::Endpoint;
use crate::error::{Error, Result};
use crate::record::Record;

pub use http::HttpAdminClient;

/// Raw response of one admin API request.
#[derive(Debug, Clone)]
pub struct AdminResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body.
    pub body: String,
}

impl AdminResponse {
    /// Creates a response.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Decodes the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedResponse`] if the body does not decode.
    pub fn json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        serde_json::from_str(&self.body).map_err(|e| Error::MalformedResponse {
            path: path.to_string(),
            message: e.to_string(),
        })
    }

    /// Fails with [`Error::UnexpectedStatus`] unless the status is `expected`.
    ///
    /// # Errors
    ///
    /// Returns an error on any other status.
    pub fn expect_status(self, method: &'static str, path: &str, expected: u16) -> Result<Self> {
        if self.status == expected {
            Ok(self)
        } else {
            Err(self.into_status_error(method, path))
        }
    }

    /// Converts this response into an [`Error::UnexpectedStatus`].
    #[must_use]
    pub fn into_status_error(self, method: &'static str, path: &str) -> Error {
        Error::UnexpectedStatus {
            method,
            path: path.to_string(),
            status: self.status,
            body: truncate_body(self.body),
        }
    }
}

const MAX_ERROR_BODY: usize = 512;

fn truncate_body(mut body: String) -> String {
    if body.len() > MAX_ERROR_BODY {
        let mut cut = MAX_ERROR_BODY;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
        body.push_str("...");
    }
    body
}

/// Client for one cluster's admin API.
///
/// Implement this trait to drive the migration against something other than
/// a live HTTP server.
#[async_trait]
pub trait AdminClient: Send + Sync {
    /// The endpoint this client talks to.
    fn endpoint(&self) -> &Endpoint;

    /// Issues `GET path_and_query`.
    async fn get(&self, path_and_query: &str) -> Result<AdminResponse>;

    /// Issues `POST path` with `record` as the JSON body.
    async fn post(&self, path: &str, record: &Record) -> Result<AdminResponse>;
}
