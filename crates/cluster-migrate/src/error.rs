//! Error types for cluster-migrate.
//!
//! Every variant is fatal to a migration run. A 409 on write is not an
//! error; it surfaces as [`crate::transfer::TransferOutcome::AlreadyExists`].
//! Error codes follow the pattern `MIG-XXX`.

use thiserror::Error;

/// Result type alias for migration operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can abort a migration.
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed `host:port` address (MIG-001).
    #[error("[MIG-001] Invalid address '{0}': expected host:port")]
    InvalidAddress(String),

    /// Source and destination run different versions (MIG-002).
    #[error("[MIG-002] Incompatible clusters: source runs {source_version}, destination runs {destination_version}")]
    IncompatibleClusters {
        /// Version reported by the source.
        source_version: String,
        /// Version reported by the destination.
        destination_version: String,
    },

    /// Source and destination expose different plugin sets (MIG-003).
    #[error(
        "[MIG-003] Incompatible plugins: missing on destination {missing_on_destination:?}, missing on source {missing_on_source:?}"
    )]
    IncompatiblePlugins {
        /// Plugins available on the source only.
        missing_on_destination: Vec<String>,
        /// Plugins available on the destination only.
        missing_on_source: Vec<String>,
    },

    /// Connect, timeout or IO failure on a request (MIG-004).
    #[error("[MIG-004] Transport failure on {method} {path}: {message}")]
    Transport {
        /// HTTP method of the failed request.
        method: &'static str,
        /// Request path.
        path: String,
        /// Underlying failure.
        message: String,
    },

    /// Status other than the one the operation expects (MIG-005).
    #[error("[MIG-005] Unexpected status {status} on {method} {path}: {body}")]
    UnexpectedStatus {
        /// HTTP method.
        method: &'static str,
        /// Request path.
        path: String,
        /// Response status code.
        status: u16,
        /// Response body, for diagnostics.
        body: String,
    },

    /// Response body is not the expected JSON document (MIG-006).
    #[error("[MIG-006] Malformed response from {path}: {message}")]
    MalformedResponse {
        /// Request path.
        path: String,
        /// Decoding failure.
        message: String,
    },

    /// The `next` chain points back at an already fetched page (MIG-007).
    #[error("[MIG-007] Cyclic pagination in {collection}: page '{page}' was already fetched")]
    CyclicPagination {
        /// Collection being traversed.
        collection: String,
        /// Page reference seen twice.
        page: String,
    },

    /// A `next` reference that cannot be parsed as a URL (MIG-008).
    #[error("[MIG-008] Invalid next page reference '{0}'")]
    InvalidNextUrl(String),

    /// A parent record without an `id` where one is required (MIG-009).
    #[error("[MIG-009] Record in {collection} has no id")]
    MissingId {
        /// Collection the record was read from.
        collection: String,
    },

    /// A record could not be written to the destination (MIG-010).
    #[error("[MIG-010] Failed to transfer record {id} to {path}")]
    Transfer {
        /// Destination collection path.
        path: String,
        /// Identifier of the record.
        id: String,
        /// Cause.
        #[source]
        source: Box<Error>,
    },

    /// Configuration error (MIG-011).
    #[error("[MIG-011] Configuration error: {0}")]
    Config(String),

    /// IO error (MIG-012).
    #[error("[MIG-012] IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error (MIG-013).
    #[error("[MIG-013] YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    /// Returns the innermost error, looking through [`Error::Transfer`].
    #[must_use]
    pub fn root(&self) -> &Error {
        match self {
            Error::Transfer { source, .. } => source.root(),
            other => other,
        }
    }
}
