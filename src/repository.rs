// src/repository.rs

use crate::{
    errors::{AppError, AppResult},
    models::{Client, Employee, Expense, Income, document::Record},
    store::{DocumentStore, Fields},
};
use std::sync::Arc;
use tracing::debug;

/// Typed access to the four collections. The store handle is injected so the
/// same repository runs against the hosted database or an in-memory double.
#[derive(Clone)]
pub struct Repository {
    store: Arc<dyn DocumentStore>,
}

impl Repository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    pub async fn list<T: Record>(&self) -> AppResult<Vec<T>> {
        let docs = self.store.list(T::COLLECTION).await?;
        Ok(docs.into_iter().map(T::from_document).collect())
    }

    pub async fn get<T: Record>(&self, id: &str) -> AppResult<T> {
        self.store
            .get(T::COLLECTION, id)
            .await?
            .map(T::from_document)
            .ok_or_else(|| AppError::NotFound(format!("{} {} not found", T::COLLECTION, id)))
    }

    /// Writes a new record and returns the store-assigned id. Any id already
    /// on the record is ignored.
    pub async fn create<T: Record>(&self, record: &T) -> AppResult<String> {
        let id = self.store.add(T::COLLECTION, record.to_fields()).await?;
        debug!("Created {}/{}", T::COLLECTION, id);
        Ok(id)
    }

    /// Full replace of every mutable field; the id is preserved.
    pub async fn update<T: Record>(&self, id: &str, record: &T) -> AppResult<()> {
        self.store.update(T::COLLECTION, id, record.to_fields()).await?;
        debug!("Updated {}/{}", T::COLLECTION, id);
        Ok(())
    }

    /// Writes only the given fields; the rest of the stored body is kept as is.
    pub async fn update_fields<T: Record>(&self, id: &str, fields: Fields) -> AppResult<()> {
        self.store.update_fields(T::COLLECTION, id, fields).await?;
        debug!("Patched {}/{}", T::COLLECTION, id);
        Ok(())
    }

    pub async fn delete<T: Record>(&self, id: &str) -> AppResult<()> {
        self.store.delete(T::COLLECTION, id).await?;
        debug!("Deleted {}/{}", T::COLLECTION, id);
        Ok(())
    }

    // ─── Named accessors ──────────────────────────────────────────────────────

    pub async fn list_clients(&self) -> AppResult<Vec<Client>> {
        self.list().await
    }

    pub async fn list_employees(&self) -> AppResult<Vec<Employee>> {
        self.list().await
    }

    pub async fn list_incomes(&self) -> AppResult<Vec<Income>> {
        self.list().await
    }

    pub async fn list_expenses(&self) -> AppResult<Vec<Expense>> {
        self.list().await
    }

    pub async fn get_client(&self, id: &str) -> AppResult<Client> {
        self.get(id).await
    }

    pub async fn get_employee(&self, id: &str) -> AppResult<Employee> {
        self.get(id).await
    }

    pub async fn get_income(&self, id: &str) -> AppResult<Income> {
        self.get(id).await
    }

    pub async fn get_expense(&self, id: &str) -> AppResult<Expense> {
        self.get(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Collection, MemoryStore};
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn repo() -> (MemoryStore, Repository) {
        let store = MemoryStore::new();
        let repo = Repository::new(Arc::new(store.clone()));
        (store, repo)
    }

    #[tokio::test]
    async fn create_then_get_round_trips_through_the_store() {
        let (_, repo) = repo();
        let income = Income {
            client_id: Some("c1".into()),
            client_name: Some("Acme".into()),
            amount: dec!(3000),
            ..Default::default()
        };
        let id = repo.create(&income).await.unwrap();

        let stored = repo.get_income(&id).await.unwrap();
        assert_eq!(stored.id, id);
        assert_eq!(stored.amount, dec!(3000));
        assert_eq!(stored.client_name.as_deref(), Some("Acme"));
    }

    #[tokio::test]
    async fn missing_record_is_not_found() {
        let (_, repo) = repo();
        let err = repo.get_client("ghost").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn update_replaces_the_whole_body() {
        let (store, repo) = repo();
        store
            .insert(
                Collection::Clients,
                "c1",
                json!({"name": "Acme", "notes": "call monday", "totalPayment": 100})
                    .as_object()
                    .cloned()
                    .unwrap(),
            )
            .await;

        let replacement = Client {
            name: Some("Acme Ltd".into()),
            total_payment: dec!(200),
            ..Default::default()
        };
        repo.update("c1", &replacement).await.unwrap();

        let client = repo.get_client("c1").await.unwrap();
        assert_eq!(client.id, "c1");
        assert_eq!(client.name.as_deref(), Some("Acme Ltd"));
        assert_eq!(client.notes, None);
        assert_eq!(client.total_payment, dec!(200));
    }

    #[tokio::test]
    async fn store_outage_surfaces_as_unavailable() {
        let (store, repo) = repo();
        store.set_offline(true).await;
        let err = repo.list_expenses().await.unwrap_err();
        assert!(matches!(err, AppError::StoreUnavailable(_)));
    }
}
