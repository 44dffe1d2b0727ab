//! Configuration types for cluster-migrate.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::endpoint::Endpoint;
use crate::plan::{default_collections, CollectionSpec, MigrationPlan};

/// Main migration configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationConfig {
    /// Source admin API. The CLI `--from` flag overrides it.
    #[serde(default)]
    pub source: Option<Endpoint>,
    /// Destination admin API. The CLI `--to` flag overrides it.
    #[serde(default)]
    pub destination: Option<Endpoint>,
    /// Migration options.
    #[serde(default)]
    pub options: MigrationOptions,
    /// Collections to migrate, in order.
    #[serde(default = "default_collections")]
    pub collections: Vec<CollectionSpec>,
}

/// Migration options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationOptions {
    /// Timeout for every admin API request, in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Require identical versions on both clusters.
    #[serde(default = "default_true")]
    pub check_version: bool,
    /// Dry run mode (read the source, write nothing).
    #[serde(default)]
    pub dry_run: bool,
}

impl Default for MigrationOptions {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            check_version: true,
            dry_run: false,
        }
    }
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            source: None,
            destination: None,
            options: MigrationOptions::default(),
            collections: default_collections(),
        }
    }
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_true() -> bool {
    true
}

impl MigrationOptions {
    /// Request timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl MigrationConfig {
    /// Load configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Builds the migration plan from the collection table.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection table is invalid.
    pub fn plan(&self) -> crate::error::Result<MigrationPlan> {
        MigrationPlan::from_collections(&self.collections)
    }

    /// Validate the configuration.
    ///
    /// Endpoints are optional here since the CLI may supply them; a
    /// configuration used for a run must have both.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.options.timeout_ms == 0 {
            return Err(crate::error::Error::Config(
                "timeout_ms must be greater than 0".to_string(),
            ));
        }
        if let (Some(source), Some(destination)) = (&self.source, &self.destination) {
            if source == destination {
                return Err(crate::error::Error::Config(format!(
                    "source and destination are the same endpoint ({source})"
                )));
            }
        }
        self.plan()?;
        Ok(())
    }

    /// Source and destination, failing if either is missing.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::Error::Config`] if an endpoint is missing.
    pub fn endpoints(&self) -> crate::error::Result<(Endpoint, Endpoint)> {
        match (&self.source, &self.destination) {
            (Some(source), Some(destination)) => Ok((source.clone(), destination.clone())),
            (None, _) => Err(crate::error::Error::Config(
                "source endpoint is required (--from host:port)".to_string(),
            )),
            (_, None) => Err(crate::error::Error::Config(
                "destination endpoint is required (--to host:port)".to_string(),
            )),
        }
    }
}
