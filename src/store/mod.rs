// src/store/mod.rs

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreStore;
pub use memory::MemoryStore;

/// Raw document body: field name → plain JSON value.
pub type Fields = Map<String, Value>;

// ─── Collections ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Clients,
    Employees,
    Incomes,
    Expenses,
}

impl Collection {
    /// Collection name as it exists in the hosted store.
    pub fn name(self) -> &'static str {
        match self {
            Collection::Clients => "ClientData",
            Collection::Employees => "EmployeeData",
            Collection::Incomes => "IncomeData",
            Collection::Expenses => "ExpenseData",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ─── Documents ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: Fields,
}

impl Document {
    pub fn new(id: impl Into<String>, fields: Fields) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }
}

// ─── Errors ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("document store unavailable: {0}")]
    Unavailable(String),

    #[error("document {collection}/{id} does not exist")]
    Missing { collection: Collection, id: String },

    #[error("malformed store response: {0}")]
    Decode(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

// ─── Client seam ──────────────────────────────────────────────────────────────

/// Schemaless collection/document store. The application talks to the hosted
/// database only through this trait so tests can swap in [`MemoryStore`].
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Returns `Ok(None)` when the document does not exist.
    async fn get(&self, collection: Collection, id: &str) -> StoreResult<Option<Document>>;

    /// Every document of the collection, in store order.
    async fn list(&self, collection: Collection) -> StoreResult<Vec<Document>>;

    /// Inserts a document and returns the store-assigned id.
    async fn add(&self, collection: Collection, fields: Fields) -> StoreResult<String>;

    /// Replaces the body of an existing document.
    async fn update(&self, collection: Collection, id: &str, fields: Fields) -> StoreResult<()>;

    /// Writes only the given fields of an existing document; every other
    /// stored field is left untouched.
    async fn update_fields(
        &self,
        collection: Collection,
        id: &str,
        fields: Fields,
    ) -> StoreResult<()>;

    async fn delete(&self, collection: Collection, id: &str) -> StoreResult<()>;

    /// Cheap liveness check used by the health endpoint.
    async fn probe(&self) -> StoreResult<()>;
}
