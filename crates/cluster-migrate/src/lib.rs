// Migration tool - pedantic lints relaxed for CLI ergonomics
#![allow(clippy::pedantic)]

//! # cluster-migrate
//!
//! `cluster-migrate` is a CLI tool and library for copying the full state of
//! one API-gateway cluster into another through their HTTP admin APIs.
//!
//! ## What is migrated
//!
//! | Step | Collection | Notes |
//! |------|------------|-------|
//! | 1 | `/apis/` | |
//! | 2 | `/consumers/` | |
//! | 3-8 | `/consumers/{id}/<relation>/` | `acls`, `basic-auth`, `key-auth`, `hmac-auth`, `jwt`, `oauth2` |
//! | 9 | `/plugins/` | after APIs and consumers, which plugins may reference |
//! | 10 | `/oauth2_tokens/` | after the `oauth2` credentials |
//!
//! Records are copied verbatim. A `409 Conflict` from the destination means
//! the record is already there and is skipped, so an interrupted migration
//! can simply be run again. Any other failure stops the run.
//!
//! ## Quick Start
//!
//! ```bash
//! cluster-migrate --from 10.0.0.1:8001 --to 10.0.0.2:8001
//!
//! # Read everything, write nothing
//! cluster-migrate --from 10.0.0.1:8001 --to 10.0.0.2:8001 --dry-run
//! ```
//!
//! ## Configuration Example
//!
//! ```yaml
//! source: 10.0.0.1:8001
//! destination: 10.0.0.2:8001
//!
//! options:
//!   timeout_ms: 10000
//!   check_version: true
//!
//! collections:
//!   - path: /apis/
//!   - path: /consumers/
//!     relations: [acls, key-auth]
//! ```

#![warn(missing_docs)]

pub mod client;
pub mod compat;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod pipeline;
pub mod plan;
pub mod reader;
pub mod record;
pub mod transfer;

pub use client::{AdminClient, AdminResponse, HttpAdminClient};
pub use compat::{check, check_plugins, ensure_compatible, NodeInfo};
pub use config::{MigrationConfig, MigrationOptions};
pub use endpoint::Endpoint;
pub use error::{Error, Result};
pub use pipeline::{MigrationStats, Pipeline};
pub use plan::{CollectionSpec, MigrationPlan, PlanStep, Relation};
pub use reader::CollectionReader;
pub use record::{Page, Record};
pub use transfer::{transfer, TransferOutcome};
