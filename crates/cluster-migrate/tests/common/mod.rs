//! In-memory admin API used by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use cluster_migrate::{AdminClient, AdminResponse, Endpoint, Record, Result};

#[derive(Default)]
struct State {
    collections: BTreeMap<String, Vec<Record>>,
    log: Vec<String>,
    /// (path, record id, status) to answer instead of creating.
    post_failure: Option<(String, String, u16)>,
    /// Collections whose `next` points back at their first page.
    cyclic: Vec<String>,
}

/// A cluster holding collections in memory and paginating them with
/// `?offset=N` cursors. Clones share state, so a test can keep a handle on
/// a cluster it handed to a pipeline.
#[derive(Clone)]
pub struct MemoryCluster {
    endpoint: Endpoint,
    version: String,
    plugins: Vec<String>,
    page_size: usize,
    state: Arc<Mutex<State>>,
}

impl MemoryCluster {
    pub fn new(address: &str, version: &str, plugins: &[&str], page_size: usize) -> Self {
        Self {
            endpoint: Endpoint::new(address, 8001).unwrap(),
            version: version.to_string(),
            plugins: plugins.iter().map(|p| (*p).to_string()).collect(),
            page_size,
            state: Arc::new(Mutex::new(State::default())),
        }
    }

    pub fn insert(&self, collection: &str, records: Vec<Value>) {
        let mut state = self.state.lock().unwrap();
        let entry = state.collections.entry(collection.to_string()).or_default();
        entry.extend(records.into_iter().map(|v| serde_json::from_value(v).unwrap()));
    }

    pub fn records(&self, collection: &str) -> Vec<Record> {
        let state = self.state.lock().unwrap();
        state.collections.get(collection).cloned().unwrap_or_default()
    }

    pub fn ids(&self, collection: &str) -> Vec<String> {
        self.records(collection).iter().map(Record::display_id).collect()
    }

    pub fn total_records(&self) -> usize {
        let state = self.state.lock().unwrap();
        state.collections.values().map(Vec::len).sum()
    }

    pub fn fail_post(&self, path: &str, id: &str, status: u16) {
        self.state.lock().unwrap().post_failure = Some((path.to_string(), id.to_string(), status));
    }

    pub fn make_cyclic(&self, collection: &str) {
        self.state.lock().unwrap().cyclic.push(collection.to_string());
    }

    /// Every request received, as `"GET /path?query"` or `"POST /path id"`.
    pub fn log(&self) -> Vec<String> {
        self.state.lock().unwrap().log.clone()
    }

    pub fn posts(&self) -> Vec<String> {
        self.log()
            .into_iter()
            .filter(|entry| entry.starts_with("POST "))
            .collect()
    }

    pub fn clear_log(&self) {
        self.state.lock().unwrap().log.clear();
    }

    fn root(&self) -> AdminResponse {
        let plugins: serde_json::Map<String, Value> = self
            .plugins
            .iter()
            .map(|name| (name.clone(), Value::Bool(true)))
            .collect();
        let body = json!({
            "version": self.version,
            "plugins": {"available_on_server": plugins},
        });
        AdminResponse::new(200, body.to_string())
    }
}

#[async_trait]
impl AdminClient for MemoryCluster {
    fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    async fn get(&self, path_and_query: &str) -> Result<AdminResponse> {
        let mut state = self.state.lock().unwrap();
        state.log.push(format!("GET {path_and_query}"));

        if path_and_query == "/" {
            drop(state);
            return Ok(self.root());
        }

        let (path, offset) = match path_and_query.split_once("?offset=") {
            Some((path, offset)) => (path, offset.parse::<usize>().unwrap()),
            None => (path_and_query, 0),
        };

        let records = state.collections.get(path).cloned().unwrap_or_default();
        let end = (offset + self.page_size).min(records.len());
        let data = records[offset.min(end)..end].to_vec();

        let mut body = json!({ "data": data, "total": records.len() });
        if state.cyclic.iter().any(|c| c == path) {
            body["next"] = json!(format!("http://{}{}", self.endpoint, path));
        } else if end < records.len() {
            body["next"] = json!(format!("http://{}{}?offset={}", self.endpoint, path, end));
        }

        Ok(AdminResponse::new(200, body.to_string()))
    }

    async fn post(&self, path: &str, record: &Record) -> Result<AdminResponse> {
        let mut state = self.state.lock().unwrap();
        let id = record.display_id();
        state.log.push(format!("POST {path} {id}"));

        if let Some((fail_path, fail_id, status)) = &state.post_failure {
            if fail_path == path && *fail_id == id {
                return Ok(AdminResponse::new(*status, r#"{"message":"An unexpected error occurred"}"#));
            }
        }

        let collection = state.collections.entry(path.to_string()).or_default();
        if collection.iter().any(|existing| existing.id() == record.id()) {
            return Ok(AdminResponse::new(409, format!(r#"{{"id":"already exists with value '{id}'"}}"#)));
        }

        collection.push(record.clone());
        Ok(AdminResponse::new(201, serde_json::to_string(record).unwrap()))
    }
}
