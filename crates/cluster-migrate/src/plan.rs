//! Migration plan: which collections are copied, and in which order.
//!
//! The plan is built once from a table of collections and their relation
//! names, and never changes during a run.

use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};

/// Consumer credential types and other consumer-owned sub-collections.
pub const CONSUMER_RELATIONS: &[&str] = &[
    "acls",
    "basic-auth",
    "key-auth",
    "hmac-auth",
    "jwt",
    "oauth2",
];

/// A top-level collection and the relations its records own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionSpec {
    /// Collection path, e.g. `/consumers/`.
    pub path: String,
    /// Relation names, migrated per parent record after the collection.
    #[serde(default)]
    pub relations: Vec<String>,
}

impl CollectionSpec {
    /// A collection without relations.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            relations: Vec::new(),
        }
    }

    /// A collection with relations.
    pub fn with_relations(path: impl Into<String>, relations: &[&str]) -> Self {
        Self {
            path: path.into(),
            relations: relations.iter().map(|r| (*r).to_string()).collect(),
        }
    }
}

/// Default collection table: APIs, consumers with their credentials,
/// plugins (which may reference either), then OAuth2 tokens.
#[must_use]
pub fn default_collections() -> Vec<CollectionSpec> {
    vec![
        CollectionSpec::new("/apis/"),
        CollectionSpec::with_relations("/consumers/", CONSUMER_RELATIONS),
        CollectionSpec::new("/plugins/"),
        CollectionSpec::new("/oauth2_tokens/"),
    ]
}

/// Sub-collection owned by a parent record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    /// Relation name, e.g. `acls`.
    pub name: String,
}

impl Relation {
    /// Path of this relation under `parent_id` in `collection`.
    ///
    /// `parent_id` is percent-encoded as a single path segment, so `/`, `?`
    /// or `#` in an id cannot change which resource is addressed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the path cannot be assembled.
    pub fn path_for(&self, collection: &str, parent_id: &str) -> Result<String> {
        let invalid = || {
            Error::Config(format!(
                "cannot build '{}' path for '{parent_id}' under '{collection}'",
                self.name
            ))
        };

        let mut url = Url::parse("http://admin.invalid/").map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|()| invalid())?
            .clear()
            .extend(collection.split('/').filter(|segment| !segment.is_empty()))
            .push(parent_id)
            .push(&self.name)
            .push("");
        Ok(url.path().to_string())
    }
}

/// One step of the plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanStep {
    /// Top-level collection path.
    pub collection: String,
    /// When set, the step migrates this relation of every record in
    /// `collection` instead of the records themselves.
    pub relation: Option<Relation>,
}

impl fmt::Display for PlanStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.relation {
            Some(relation) => write!(f, "{}{{id}}/{}/", self.collection, relation.name),
            None => write!(f, "{}", self.collection),
        }
    }
}

/// Ordered, immutable list of steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationPlan {
    steps: Vec<PlanStep>,
}

impl MigrationPlan {
    /// Expands a collection table: each collection yields its own step,
    /// immediately followed by one step per relation in listed order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the table is empty, a path does not
    /// start and end with `/`, or a relation name is empty or contains `/`.
    pub fn from_collections(collections: &[CollectionSpec]) -> Result<Self> {
        if collections.is_empty() {
            return Err(Error::Config("no collections to migrate".to_string()));
        }

        let mut steps = Vec::new();
        for spec in collections {
            validate_path(&spec.path)?;
            steps.push(PlanStep {
                collection: spec.path.clone(),
                relation: None,
            });

            for name in &spec.relations {
                validate_relation(name)?;
                steps.push(PlanStep {
                    collection: spec.path.clone(),
                    relation: Some(Relation { name: name.clone() }),
                });
            }
        }

        Ok(Self { steps })
    }

    /// The default plan.
    ///
    /// # Errors
    ///
    /// Never fails for the built-in table; the signature mirrors
    /// [`MigrationPlan::from_collections`].
    pub fn standard() -> Result<Self> {
        Self::from_collections(&default_collections())
    }

    /// Steps in execution order.
    #[must_use]
    pub fn steps(&self) -> &[PlanStep] {
        &self.steps
    }

    /// Number of steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the plan has no steps.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

fn validate_path(path: &str) -> Result<()> {
    if path.len() < 2 || !path.starts_with('/') || !path.ends_with('/') || path.contains('?') {
        return Err(Error::Config(format!(
            "collection path '{path}' must start and end with '/'"
        )));
    }
    Ok(())
}

fn validate_relation(name: &str) -> Result<()> {
    if name.is_empty() || name.contains('/') || name.contains('?') {
        return Err(Error::Config(format!("invalid relation name '{name}'")));
    }
    Ok(())
}
