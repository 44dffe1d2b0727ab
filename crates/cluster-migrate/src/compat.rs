//! Pre-migration compatibility gate.
//!
//! Both clusters must run the same version and expose the same set of
//! available plugins before any record moves.

use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeSet;
use tracing::info;

use crate::client::AdminClient;
use crate::error::{Error, Result};

/// Metadata reported by `GET /` on an admin API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeInfo {
    /// Software version.
    pub version: String,
    /// Names of the plugins available on the node.
    pub plugins: BTreeSet<String>,
}

#[derive(Debug, Deserialize)]
struct RootDocument {
    version: String,
    plugins: PluginsSection,
}

#[derive(Debug, Deserialize)]
struct PluginsSection {
    available_on_server: Value,
}

impl NodeInfo {
    fn from_root(root: RootDocument) -> Result<Self> {
        let plugins: BTreeSet<String> = match root.plugins.available_on_server {
            // name -> true | false | {metadata}
            Value::Object(map) => map
                .into_iter()
                .filter(|(_, v)| !matches!(v, Value::Bool(false)))
                .map(|(name, _)| name)
                .collect(),
            Value::Array(names) => names
                .into_iter()
                .map(|v| match v {
                    Value::String(name) => Ok(name),
                    other => Err(Error::MalformedResponse {
                        path: "/".to_string(),
                        message: format!("plugin name is not a string: {other}"),
                    }),
                })
                .collect::<Result<_>>()?,
            other => {
                return Err(Error::MalformedResponse {
                    path: "/".to_string(),
                    message: format!("unexpected plugins.available_on_server: {other}"),
                })
            }
        };

        Ok(Self {
            version: root.version,
            plugins,
        })
    }
}

/// Fetches a node's root metadata with a single `GET /`.
///
/// # Errors
///
/// Returns an error if the request fails, the status is not 200, or the
/// body lacks `version` / `plugins.available_on_server`.
pub async fn fetch_node_info(client: &dyn AdminClient) -> Result<NodeInfo> {
    let response = client.get("/").await?.expect_status("GET", "/", 200)?;
    let root: RootDocument = response.json("/")?;
    NodeInfo::from_root(root)
}

/// Checks that both nodes run exactly the same version.
///
/// # Errors
///
/// Returns [`Error::IncompatibleClusters`] on mismatch.
pub fn check(source: &NodeInfo, destination: &NodeInfo) -> Result<String> {
    if source.version == destination.version {
        Ok(source.version.clone())
    } else {
        Err(Error::IncompatibleClusters {
            source_version: source.version.clone(),
            destination_version: destination.version.clone(),
        })
    }
}

/// Checks that both nodes expose the same set of available plugins.
///
/// # Errors
///
/// Returns [`Error::IncompatiblePlugins`] listing the differences.
pub fn check_plugins(source: &NodeInfo, destination: &NodeInfo) -> Result<BTreeSet<String>> {
    if source.plugins == destination.plugins {
        return Ok(source.plugins.clone());
    }

    Err(Error::IncompatiblePlugins {
        missing_on_destination: source
            .plugins
            .difference(&destination.plugins)
            .cloned()
            .collect(),
        missing_on_source: destination
            .plugins
            .difference(&source.plugins)
            .cloned()
            .collect(),
    })
}

/// Probes both admin APIs once and runs the plugin check, plus the version
/// check when `check_version` is set.
///
/// Returns the source node's metadata.
///
/// # Errors
///
/// Returns the first probe or comparison failure.
pub async fn ensure_compatible(
    source: &dyn AdminClient,
    destination: &dyn AdminClient,
    check_version: bool,
) -> Result<NodeInfo> {
    let source_info = fetch_node_info(source).await?;
    let destination_info = fetch_node_info(destination).await?;

    if check_version {
        check(&source_info, &destination_info)?;
    }
    let plugins = check_plugins(&source_info, &destination_info)?;

    info!(
        "Clusters compatible: version {} / {}, {} plugins available",
        source_info.version,
        destination_info.version,
        plugins.len()
    );

    Ok(source_info)
}
