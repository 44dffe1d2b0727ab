//! Lazy traversal of a cursor-paginated collection.
//!
//! A collection is fetched page by page: each page carries `data` and an
//! optional `next` reference. The reader yields records one at a time and
//! only fetches the following page once the current one is exhausted, so
//! memory stays bounded by the page size.

use reqwest::Url;
use std::collections::{HashSet, VecDeque};
use tracing::debug;

use crate::client::AdminClient;
use crate::error::{Error, Result};
use crate::record::{Page, Record};

/// Forward-only, non-restartable record sequence over one collection.
///
/// At most one page of records is held at a time. Cycle detection keeps the
/// reference of every page fetched so far, so that set grows by one short
/// string per page for the lifetime of the traversal.
pub struct CollectionReader<'a> {
    client: &'a dyn AdminClient,
    collection: String,
    /// Page to fetch once `buffer` is drained. `None` once the chain ended.
    pending: Option<String>,
    buffer: VecDeque<Record>,
    /// Path-and-query of every page requested in this traversal.
    fetched: HashSet<String>,
    pages_fetched: u64,
    records_read: u64,
}

impl<'a> CollectionReader<'a> {
    /// Creates a reader starting at `path`. No request is issued until the
    /// first call to [`CollectionReader::next_record`].
    pub fn new(client: &'a dyn AdminClient, path: impl Into<String>) -> Self {
        let collection = path.into();
        Self {
            client,
            pending: Some(collection.clone()),
            collection,
            buffer: VecDeque::new(),
            fetched: HashSet::new(),
            pages_fetched: 0,
            records_read: 0,
        }
    }

    /// Collection path this reader started at.
    #[must_use]
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Number of pages fetched so far.
    #[must_use]
    pub fn pages_fetched(&self) -> u64 {
        self.pages_fetched
    }

    /// Number of records yielded so far.
    #[must_use]
    pub fn records_read(&self) -> u64 {
        self.records_read
    }

    /// Yields the next record, fetching the next page when needed.
    ///
    /// Returns `Ok(None)` once the last page is exhausted. After an error the
    /// reader is finished and keeps returning `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, non-200 status, malformed page,
    /// unparsable `next` reference, or a `next` chain that revisits a page.
    pub async fn next_record(&mut self) -> Result<Option<Record>> {
        loop {
            if let Some(record) = self.buffer.pop_front() {
                self.records_read += 1;
                return Ok(Some(record));
            }

            let Some(page_ref) = self.pending.take() else {
                return Ok(None);
            };

            let page = self.fetch_page(&page_ref).await?;

            let next_ref = match &page.next {
                Some(next) => path_and_query(&page_ref, next)?,
                None => None,
            };
            if let Some(next_ref) = next_ref {
                if self.fetched.contains(&next_ref) {
                    return Err(Error::CyclicPagination {
                        collection: self.collection.clone(),
                        page: next_ref,
                    });
                }
                self.pending = Some(next_ref);
            }

            self.buffer.extend(page.data);
        }
    }

    /// Drains the remaining records into a vector.
    ///
    /// # Errors
    ///
    /// Returns the first error encountered while reading.
    pub async fn collect_all(mut self) -> Result<Vec<Record>> {
        let mut records = Vec::new();
        while let Some(record) = self.next_record().await? {
            records.push(record);
        }
        Ok(records)
    }

    async fn fetch_page(&mut self, page_ref: &str) -> Result<Page> {
        self.fetched.insert(page_ref.to_string());
        self.pages_fetched += 1;

        let response = self
            .client
            .get(page_ref)
            .await?
            .expect_status("GET", page_ref, 200)?;
        let page: Page = response.json(page_ref)?;

        debug!(
            "Fetched page {} of {} ({} records, next: {})",
            self.pages_fetched,
            self.collection,
            page.data.len(),
            page.next.as_deref().unwrap_or("none")
        );

        Ok(page)
    }
}

/// Reduces a `next` reference to the path and query string to request.
///
/// `next` may be an absolute URL, an absolute path, or a reference relative
/// to `current`, the path and query of the page that carried it. An empty
/// `next` means there is no following page.
///
/// # Errors
///
/// Returns [`Error::InvalidNextUrl`] if the reference cannot be parsed.
pub fn path_and_query(current: &str, next: &str) -> Result<Option<String>> {
    let invalid = || Error::InvalidNextUrl(next.to_string());
    if next.trim().is_empty() {
        return Ok(None);
    }

    // Only the path and query survive; the origin is a placeholder.
    let base = Url::parse("http://admin.invalid/")
        .and_then(|origin| origin.join(current))
        .map_err(|_| invalid())?;
    let url = base.join(next).map_err(|_| invalid())?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid());
    }

    Ok(Some(match url.query() {
        Some(query) => format!("{}?{}", url.path(), query),
        None => url.path().to_string(),
    }))
}

#[cfg(test)]
#[path = "reader_tests.rs"]
mod tests;
