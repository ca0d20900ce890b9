// src/store/memory.rs

use super::{Collection, Document, DocumentStore, Fields, StoreError, StoreResult};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Get,
    List,
    Add,
    Update,
    Delete,
}

#[derive(Default)]
struct Inner {
    collections: HashMap<Collection, Vec<Document>>,
    offline: bool,
    faults: HashSet<(Operation, Collection, String)>,
}

/// In-process store. Documents keep insertion order, like a freshly listed
/// hosted collection. Used for local runs and as the test double.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a document under a caller-chosen id, replacing any previous body.
    pub async fn insert(&self, collection: Collection, id: &str, fields: Fields) {
        let mut inner = self.inner.write().await;
        let docs = inner.collections.entry(collection).or_default();
        match docs.iter_mut().find(|d| d.id == id) {
            Some(existing) => existing.fields = fields,
            None => docs.push(Document::new(id, fields)),
        }
    }

    /// Every subsequent call fails with `Unavailable` until switched back.
    pub async fn set_offline(&self, offline: bool) {
        self.inner.write().await.offline = offline;
    }

    /// Makes one operation on one document fail. `List` and `Add` faults are
    /// keyed by an empty id.
    pub async fn fail_on(&self, op: Operation, collection: Collection, id: &str) {
        self.inner
            .write()
            .await
            .faults
            .insert((op, collection, id.to_string()));
    }

    pub async fn count(&self, collection: Collection) -> usize {
        self.inner
            .read()
            .await
            .collections
            .get(&collection)
            .map_or(0, Vec::len)
    }

    fn check(inner: &Inner, op: Operation, collection: Collection, id: &str) -> StoreResult<()> {
        if inner.offline {
            return Err(StoreError::Unavailable("memory store is offline".to_string()));
        }
        if inner.faults.contains(&(op, collection, id.to_string())) {
            debug!("Injected {:?} fault on {}/{}", op, collection, id);
            return Err(StoreError::Unavailable(format!(
                "injected {:?} failure on {}/{}",
                op, collection, id
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, collection: Collection, id: &str) -> StoreResult<Option<Document>> {
        let inner = self.inner.read().await;
        Self::check(&inner, Operation::Get, collection, id)?;
        Ok(inner
            .collections
            .get(&collection)
            .and_then(|docs| docs.iter().find(|d| d.id == id))
            .cloned())
    }

    async fn list(&self, collection: Collection) -> StoreResult<Vec<Document>> {
        let inner = self.inner.read().await;
        Self::check(&inner, Operation::List, collection, "")?;
        Ok(inner.collections.get(&collection).cloned().unwrap_or_default())
    }

    async fn add(&self, collection: Collection, fields: Fields) -> StoreResult<String> {
        let mut inner = self.inner.write().await;
        Self::check(&inner, Operation::Add, collection, "")?;
        let id = Uuid::new_v4().simple().to_string();
        inner
            .collections
            .entry(collection)
            .or_default()
            .push(Document::new(id.clone(), fields));
        Ok(id)
    }

    async fn update(&self, collection: Collection, id: &str, fields: Fields) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        Self::check(&inner, Operation::Update, collection, id)?;
        let doc = inner
            .collections
            .get_mut(&collection)
            .and_then(|docs| docs.iter_mut().find(|d| d.id == id))
            .ok_or_else(|| StoreError::Missing {
                collection,
                id: id.to_string(),
            })?;
        doc.fields = fields;
        Ok(())
    }

    async fn update_fields(
        &self,
        collection: Collection,
        id: &str,
        fields: Fields,
    ) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        Self::check(&inner, Operation::Update, collection, id)?;
        let doc = inner
            .collections
            .get_mut(&collection)
            .and_then(|docs| docs.iter_mut().find(|d| d.id == id))
            .ok_or_else(|| StoreError::Missing {
                collection,
                id: id.to_string(),
            })?;
        doc.fields.extend(fields);
        Ok(())
    }

    async fn delete(&self, collection: Collection, id: &str) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        Self::check(&inner, Operation::Delete, collection, id)?;
        if let Some(docs) = inner.collections.get_mut(&collection) {
            docs.retain(|d| d.id != id);
        }
        Ok(())
    }

    async fn probe(&self) -> StoreResult<()> {
        let inner = self.inner.read().await;
        if inner.offline {
            return Err(StoreError::Unavailable("memory store is offline".to_string()));
        }
        Ok(())
    }
}
