//! Document store port and its engines.
//!
//! A store keeps schemaless documents (flat maps of typed field values) in
//! named collections and offers per-document CRUD plus conjunctive equality
//! scans.

pub mod memory;
pub mod query;
pub mod sqlite;

pub use memory::MemoryDocumentStore;
pub use query::{build_query, Filter, Query, REFERENCE_FIELD};
pub use sqlite::SqliteDocumentStore;

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::{DocumentRef, DomainError};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Length of generated document ids.
pub const AUTO_ID_LENGTH: usize = 20;

/// A single typed field value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum FieldValue {
    String(String),
    Reference(DocumentRef),
    Timestamp(DateTime<Utc>),
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::String(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::String(value)
    }
}

impl From<DocumentRef> for FieldValue {
    fn from(value: DocumentRef) -> Self {
        FieldValue::Reference(value)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(value: DateTime<Utc>) -> Self {
        FieldValue::Timestamp(value)
    }
}

pub type Document = BTreeMap<String, FieldValue>;

/// A stored document together with the id it lives under.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub id: String,
    pub fields: Document,
}

/// Handle on a named collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionRef {
    name: String,
}

impl CollectionRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn doc(&self, id: impl Into<String>) -> DocumentRef {
        DocumentRef::new(self.name.clone(), id)
    }

    /// Unfiltered scan over the whole collection.
    pub fn query(&self) -> Query {
        Query::new(self.name.clone())
    }
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Malformed document {0}: {1}")]
    MalformedDocument(String, String),

    #[error("Background task failed: {0}")]
    Task(String),
}

impl From<StoreError> for DomainError {
    fn from(err: StoreError) -> Self {
        DomainError::RepositoryError(err.to_string())
    }
}

/// Storage engine contract. Individual calls are atomic per document; nothing
/// spans calls.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Persists `fields` under a freshly generated id.
    async fn create(&self, collection: &CollectionRef, fields: Document) -> Result<Snapshot, StoreError>;

    async fn get(&self, reference: &DocumentRef) -> Result<Option<Snapshot>, StoreError>;

    /// Merges `fields` into the stored document, returning the merged result,
    /// or `None` when nothing is stored at `reference`.
    async fn update(&self, reference: &DocumentRef, fields: Document) -> Result<Option<Snapshot>, StoreError>;

    /// Removing an absent document is not an error.
    async fn delete(&self, reference: &DocumentRef) -> Result<(), StoreError>;

    async fn find(&self, query: &Query) -> Result<Vec<Snapshot>, StoreError>;
}

/// Random alphanumeric document id.
pub fn auto_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(AUTO_ID_LENGTH)
        .map(char::from)
        .collect()
}
