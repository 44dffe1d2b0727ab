//! Replay of one record against a destination collection.

use tracing::{debug, info};

use crate::client::AdminClient;
use crate::error::{Error, Result};
use crate::record::Record;

/// Status returned when a record is created.
pub const STATUS_CREATED: u16 = 201;
/// Status returned when a record with the same identity already exists.
pub const STATUS_CONFLICT: u16 = 409;

/// Non-fatal outcome of a transfer. Fatal outcomes are returned as `Err`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferOutcome {
    /// The destination created the record.
    Created,
    /// The destination already holds the record; skipped.
    AlreadyExists,
}

/// Creates `record` at `path` on the destination with exactly one `POST`.
///
/// # Errors
///
/// Returns [`Error::Transfer`] wrapping the cause on any status other than
/// 201 or 409, or on a transport failure.
pub async fn transfer(
    client: &dyn AdminClient,
    path: &str,
    record: &Record,
) -> Result<TransferOutcome> {
    let wrap = |source: Error| Error::Transfer {
        path: path.to_string(),
        id: record.display_id(),
        source: Box::new(source),
    };

    let response = client.post(path, record).await.map_err(wrap)?;

    match response.status {
        STATUS_CREATED => {
            debug!("Created {} {}", path, record.display_id());
            Ok(TransferOutcome::Created)
        }
        STATUS_CONFLICT => {
            info!(
                "Skipping {} {}: already exists on destination",
                path,
                record.display_id()
            );
            Ok(TransferOutcome::AlreadyExists)
        }
        _ => Err(wrap(response.into_status_error("POST", path))),
    }
}
