// src/services/integrity.rs

use crate::{
    errors::{AppError, AppResult},
    models::{
        CascadeAction, CascadeReport, CascadeStep, Client, Employee, Expense, Income, StepStatus,
        document::{Record, put_set},
    },
    repository::Repository,
    store::Fields,
};
use futures::future::join_all;
use rust_decimal::Decimal;
use tracing::{info, warn};

pub const INITIAL_PAYMENT: &str = "Initial Payment";

/// One dependent write issued by a cascade.
enum Task {
    DeleteIncome(String),
    DeleteExpense(String),
    Unassign { client: Client, employee_id: String },
}

/// Keeps the weak references between collections consistent on create and
/// delete. Cascades are best effort: dependents run concurrently, the owner
/// is deleted only when all of them succeeded, and nothing is rolled back.
#[derive(Clone)]
pub struct Coordinator {
    repo: Repository,
}

impl Coordinator {
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Writes the client and, when it arrives with a positive paid amount,
    /// the matching "Initial Payment" income.
    pub async fn create_client(&self, client: &Client) -> AppResult<String> {
        let id = self.repo.create(client).await?;

        if client.paid_amount > Decimal::ZERO {
            let payment = Income {
                id: String::new(),
                client_id: Some(id.clone()),
                client_name: client.name.clone(),
                amount: client.paid_amount,
                description: Some(INITIAL_PAYMENT.to_string()),
                date: client.added_date,
            };
            if let Err(e) = self.repo.create(&payment).await {
                warn!("Client {} created but its initial payment was not: {}", id, e);
                return Err(e);
            }
            info!("Recorded initial payment of {} for client {}", client.paid_amount, id);
        }

        Ok(id)
    }

    /// Fills in both halves of the income's client reference. An id wins over
    /// a name; a name resolves to the first client carrying it.
    pub async fn resolve_client(&self, mut income: Income) -> AppResult<Income> {
        let client = match income.client_id.as_deref() {
            Some(id) => self.repo.get_client(id).await?,
            None => {
                let name = income.client_name.clone().unwrap_or_default();
                self.repo
                    .list_clients()
                    .await?
                    .into_iter()
                    .find(|c| c.name.as_deref() == Some(name.as_str()))
                    .ok_or_else(|| AppError::NotFound(format!("Client '{}' not found", name)))?
            }
        };
        income.client_id = Some(client.id);
        income.client_name = client.name;
        Ok(income)
    }

    /// Deletes the client's incomes (by id or name) and expenses (by name),
    /// then the client.
    pub async fn delete_client(&self, client: &Client) -> AppResult<CascadeReport> {
        let (incomes, expenses) =
            tokio::try_join!(self.repo.list_incomes(), self.repo.list_expenses())?;

        let tasks = incomes
            .into_iter()
            .filter(|i| i.references(client))
            .map(|i| Task::DeleteIncome(i.id))
            .chain(
                expenses
                    .into_iter()
                    .filter(|e| e.is_for_client(client))
                    .map(|e| Task::DeleteExpense(e.id)),
            )
            .collect();

        self.cascade::<Client>("client", &client.id, tasks).await
    }

    /// Deletes the employee's expenses, strips the employee from every client
    /// it is assigned to, then deletes the employee.
    pub async fn delete_employee(&self, employee: &Employee) -> AppResult<CascadeReport> {
        let (clients, expenses) =
            tokio::try_join!(self.repo.list_clients(), self.repo.list_expenses())?;

        let tasks = expenses
            .into_iter()
            .filter(|e| e.is_for_employee(employee))
            .map(|e| Task::DeleteExpense(e.id))
            .chain(
                clients
                    .into_iter()
                    .filter(|c| c.has_employee(&employee.id))
                    .map(|client| Task::Unassign {
                        client,
                        employee_id: employee.id.clone(),
                    }),
            )
            .collect();

        self.cascade::<Employee>("employee", &employee.id, tasks).await
    }

    async fn cascade<T: Record>(
        &self,
        entity: &str,
        id: &str,
        tasks: Vec<Task>,
    ) -> AppResult<CascadeReport> {
        let mut steps = join_all(tasks.into_iter().map(|t| self.execute(t))).await;

        let collection = T::COLLECTION.name();
        let owner = if steps.iter().all(CascadeStep::is_done) {
            match self.repo.delete::<T>(id).await {
                Ok(()) => step(collection, id, CascadeAction::Delete, StepStatus::Done, None),
                Err(e) => {
                    warn!("Deleting {} {} failed: {}", entity, id, e);
                    let error = Some(e.to_string());
                    step(collection, id, CascadeAction::Delete, StepStatus::Failed, error)
                }
            }
        } else {
            step(collection, id, CascadeAction::Delete, StepStatus::Skipped, None)
        };
        steps.push(owner);

        let report = CascadeReport {
            entity: entity.to_string(),
            entity_id: id.to_string(),
            steps,
        };

        if report.succeeded() {
            info!(
                "Deleted {} {} with {} dependent write(s)",
                entity,
                id,
                report.steps.len() - 1
            );
            Ok(report)
        } else {
            warn!(
                "Cascade for {} {} incomplete: {} step(s) failed, {} left in place",
                entity,
                id,
                report.failed_steps().count(),
                entity
            );
            Err(AppError::PartialCascade(report))
        }
    }

    async fn execute(&self, task: Task) -> CascadeStep {
        let (collection, id, action, result) = match task {
            Task::DeleteIncome(id) => {
                let result = self.repo.delete::<Income>(&id).await;
                (Income::COLLECTION, id, CascadeAction::Delete, result)
            }
            Task::DeleteExpense(id) => {
                let result = self.repo.delete::<Expense>(&id).await;
                (Expense::COLLECTION, id, CascadeAction::Delete, result)
            }
            Task::Unassign {
                client,
                employee_id,
            } => {
                let mut fields = Fields::new();
                let remaining = client.assignments_without(&employee_id);
                put_set(&mut fields, "assignedEmployees", &remaining);
                let result = self.repo.update_fields::<Client>(&client.id, fields).await;
                (
                    Client::COLLECTION,
                    client.id,
                    CascadeAction::UnassignEmployee,
                    result,
                )
            }
        };

        match result {
            Ok(()) => step(collection.name(), &id, action, StepStatus::Done, None),
            Err(e) => {
                warn!("Cascade step {:?} on {}/{} failed: {}", action, collection, id, e);
                step(
                    collection.name(),
                    &id,
                    action,
                    StepStatus::Failed,
                    Some(e.to_string()),
                )
            }
        }
    }
}

fn step(
    collection: &str,
    id: &str,
    action: CascadeAction,
    status: StepStatus,
    error: Option<String>,
) -> CascadeStep {
    CascadeStep {
        collection: collection.to_string(),
        document_id: id.to_string(),
        action,
        status,
        error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Collection, DocumentStore, MemoryStore, memory::Operation};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use serde_json::{Value, json};
    use std::sync::Arc;

    fn setup() -> (MemoryStore, Repository, Coordinator) {
        let store = MemoryStore::new();
        let repo = Repository::new(Arc::new(store.clone()));
        (store, repo.clone(), Coordinator::new(repo))
    }

    async fn seed(store: &MemoryStore, collection: Collection, id: &str, body: Value) {
        store
            .insert(collection, id, body.as_object().cloned().unwrap())
            .await;
    }

    async fn seed_acme(store: &MemoryStore) {
        seed(store, Collection::Clients, "c1", json!({"name": "Acme", "totalPayment": 10000})).await;
        seed(store, Collection::Clients, "c2", json!({"name": "Globex"})).await;
        seed(store, Collection::Incomes, "i1", json!({"clientId": "c1", "clientName": "Acme", "amount": 3000})).await;
        seed(store, Collection::Incomes, "i2", json!({"clientName": "Acme", "amount": 2000})).await;
        seed(store, Collection::Incomes, "i3", json!({"clientId": "c2", "clientName": "Globex", "amount": 700})).await;
        seed(store, Collection::Expenses, "x1", json!({"type": "Client", "clientName": "Acme", "amount": 500})).await;
        seed(store, Collection::Expenses, "x2", json!({"type": "Other", "amount": 90})).await;
    }

    #[tokio::test]
    async fn deleting_a_client_removes_its_incomes_and_expenses() {
        let (store, repo, coordinator) = setup();
        seed_acme(&store).await;
        let acme = repo.get_client("c1").await.unwrap();

        let report = coordinator.delete_client(&acme).await.unwrap();

        assert!(report.succeeded());
        assert_eq!(report.steps.len(), 4);
        let owner = report.steps.last().unwrap();
        assert_eq!(owner.collection, "ClientData");
        assert_eq!(owner.document_id, "c1");

        let incomes: Vec<String> = repo.list_incomes().await.unwrap().into_iter().map(|i| i.id).collect();
        let expenses: Vec<String> = repo.list_expenses().await.unwrap().into_iter().map(|e| e.id).collect();
        assert_eq!(incomes, vec!["i3"]);
        assert_eq!(expenses, vec!["x2"]);
        assert!(matches!(repo.get_client("c1").await, Err(AppError::NotFound(_))));
        assert!(repo.get_client("c2").await.is_ok());
    }

    #[tokio::test]
    async fn failed_dependent_keeps_the_client() {
        let (store, repo, coordinator) = setup();
        seed_acme(&store).await;
        store.fail_on(Operation::Delete, Collection::Incomes, "i2").await;
        let acme = repo.get_client("c1").await.unwrap();

        let err = coordinator.delete_client(&acme).await.unwrap_err();
        let AppError::PartialCascade(report) = err else {
            panic!("expected a partial cascade");
        };

        let failed: Vec<&str> = report.failed_steps().map(|s| s.document_id.as_str()).collect();
        assert_eq!(failed, vec!["i2"]);
        assert_eq!(report.steps.last().unwrap().status, StepStatus::Skipped);

        // The other dependents are gone; nothing is rolled back.
        assert!(repo.get_client("c1").await.is_ok());
        assert!(matches!(repo.get_income("i1").await, Err(AppError::NotFound(_))));
        assert!(repo.get_income("i2").await.is_ok());
        assert!(matches!(repo.get_expense("x1").await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn failed_owner_delete_is_reported() {
        let (store, repo, coordinator) = setup();
        seed_acme(&store).await;
        store.fail_on(Operation::Delete, Collection::Clients, "c1").await;
        let acme = repo.get_client("c1").await.unwrap();

        let err = coordinator.delete_client(&acme).await.unwrap_err();
        let AppError::PartialCascade(report) = err else {
            panic!("expected a partial cascade");
        };
        let owner = report.steps.last().unwrap();
        assert_eq!(owner.status, StepStatus::Failed);
        assert!(owner.error.is_some());
        assert_eq!(store.count(Collection::Incomes).await, 1);
    }

    #[tokio::test]
    async fn listing_failure_aborts_before_any_write() {
        let (store, repo, coordinator) = setup();
        seed_acme(&store).await;
        store.fail_on(Operation::List, Collection::Expenses, "").await;
        let acme = repo.get_client("c1").await.unwrap();

        let err = coordinator.delete_client(&acme).await.unwrap_err();
        assert!(matches!(err, AppError::StoreUnavailable(_)));
        assert_eq!(store.count(Collection::Incomes).await, 3);
        assert_eq!(store.count(Collection::Clients).await, 2);
    }

    #[tokio::test]
    async fn deleting_an_employee_unassigns_and_removes_expenses() {
        let (store, repo, coordinator) = setup();
        seed(&store, Collection::Employees, "e1", json!({"name": "Ravi"})).await;
        seed(&store, Collection::Employees, "e2", json!({"name": "Mina"})).await;
        seed(&store, Collection::Clients, "c1", json!({"name": "Acme", "assignedEmployees": ["e1", "e2"]})).await;
        seed(&store, Collection::Clients, "c2", json!({"name": "Globex", "assignedEmployees": ["e1"]})).await;
        seed(&store, Collection::Clients, "c3", json!({"name": "Initech", "assignedEmployees": ["e2"]})).await;
        seed(&store, Collection::Expenses, "x1", json!({"type": "Employee", "employeeName": "Ravi", "amount": 40})).await;
        seed(&store, Collection::Expenses, "x2", json!({"type": "Employee", "employeeName": "Mina", "amount": 60})).await;
        let ravi = repo.get_employee("e1").await.unwrap();

        let report = coordinator.delete_employee(&ravi).await.unwrap();

        let unassigned = report
            .steps
            .iter()
            .filter(|s| s.action == CascadeAction::UnassignEmployee)
            .count();
        assert_eq!(unassigned, 2);
        assert_eq!(repo.get_client("c1").await.unwrap().assigned_employees, vec!["e2"]);
        assert!(repo.get_client("c2").await.unwrap().assigned_employees.is_empty());
        assert_eq!(repo.get_client("c3").await.unwrap().assigned_employees, vec!["e2"]);
        assert_eq!(repo.list_expenses().await.unwrap().len(), 1);
        assert!(matches!(repo.get_employee("e1").await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn unassigning_leaves_the_rest_of_the_client_untouched() {
        let (store, repo, coordinator) = setup();
        seed(&store, Collection::Employees, "e1", json!({"name": "Ravi"})).await;
        seed(
            &store,
            Collection::Clients,
            "c1",
            json!({
                "name": "Acme",
                "assignedEmployees": ["e1", "e2"],
                "totalPayment": "10,000",
                "addedDate": "17/05/2024",
                "gst": "29ABCDE",
            }),
        )
        .await;
        let ravi = repo.get_employee("e1").await.unwrap();

        coordinator.delete_employee(&ravi).await.unwrap();

        let stored = store.get(Collection::Clients, "c1").await.unwrap().unwrap();
        assert_eq!(
            Value::Object(stored.fields),
            json!({
                "name": "Acme",
                "assignedEmployees": ["e2"],
                "totalPayment": "10,000",
                "addedDate": "17/05/2024",
                "gst": "29ABCDE",
            })
        );
    }

    #[tokio::test]
    async fn failed_unassign_keeps_the_employee() {
        let (store, repo, coordinator) = setup();
        seed(&store, Collection::Employees, "e1", json!({"name": "Ravi"})).await;
        seed(&store, Collection::Clients, "c1", json!({"name": "Acme", "assignedEmployees": ["e1"]})).await;
        seed(&store, Collection::Clients, "c2", json!({"name": "Globex", "assignedEmployees": ["e1", "e3"]})).await;
        seed(&store, Collection::Expenses, "x1", json!({"type": "Employee", "employeeName": "Ravi", "amount": 40})).await;
        store.fail_on(Operation::Update, Collection::Clients, "c1").await;
        let ravi = repo.get_employee("e1").await.unwrap();

        let err = coordinator.delete_employee(&ravi).await.unwrap_err();
        let AppError::PartialCascade(report) = err else {
            panic!("expected a partial cascade");
        };

        let failed: Vec<&CascadeStep> = report.failed_steps().collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].document_id, "c1");
        assert_eq!(failed[0].action, CascadeAction::UnassignEmployee);
        let owner = report.steps.last().unwrap();
        assert_eq!(owner.collection, "EmployeeData");
        assert_eq!(owner.status, StepStatus::Skipped);

        assert!(repo.get_employee("e1").await.is_ok());
        assert!(repo.get_client("c1").await.unwrap().has_employee("e1"));
        assert_eq!(repo.get_client("c2").await.unwrap().assigned_employees, vec!["e3"]);
        assert!(repo.list_expenses().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn employee_with_no_dependents_is_deleted_alone() {
        let (store, repo, coordinator) = setup();
        seed(&store, Collection::Employees, "e1", json!({"name": "Ravi"})).await;
        let ravi = repo.get_employee("e1").await.unwrap();

        let report = coordinator.delete_employee(&ravi).await.unwrap();
        assert_eq!(report.steps.len(), 1);
        assert_eq!(store.count(Collection::Employees).await, 0);
    }

    #[tokio::test]
    async fn new_client_with_paid_amount_gets_an_initial_payment() {
        let (_, repo, coordinator) = setup();
        let client = Client {
            name: Some("Acme".into()),
            total_payment: dec!(10000),
            paid_amount: dec!(2500),
            added_date: NaiveDate::from_ymd_opt(2024, 3, 1),
            ..Default::default()
        };

        let id = coordinator.create_client(&client).await.unwrap();

        let incomes = repo.list_incomes().await.unwrap();
        assert_eq!(incomes.len(), 1);
        let payment = &incomes[0];
        assert_eq!(payment.client_id.as_deref(), Some(id.as_str()));
        assert_eq!(payment.client_name.as_deref(), Some("Acme"));
        assert_eq!(payment.amount, dec!(2500));
        assert_eq!(payment.description.as_deref(), Some(INITIAL_PAYMENT));
        assert_eq!(payment.date, client.added_date);
    }

    #[tokio::test]
    async fn new_client_without_paid_amount_writes_no_income() {
        let (store, _, coordinator) = setup();
        let client = Client {
            name: Some("Acme".into()),
            ..Default::default()
        };
        coordinator.create_client(&client).await.unwrap();
        assert_eq!(store.count(Collection::Clients).await, 1);
        assert_eq!(store.count(Collection::Incomes).await, 0);
    }

    #[tokio::test]
    async fn income_reference_resolves_from_either_half() {
        let (store, _, coordinator) = setup();
        seed_acme(&store).await;

        let by_name = coordinator
            .resolve_client(Income {
                client_name: Some("Globex".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_name.client_id.as_deref(), Some("c2"));

        let by_id = coordinator
            .resolve_client(Income {
                client_id: Some("c1".into()),
                client_name: Some("stale".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_id.client_name.as_deref(), Some("Acme"));

        let unknown = coordinator
            .resolve_client(Income {
                client_name: Some("Nobody".into()),
                ..Default::default()
            })
            .await;
        assert!(matches!(unknown, Err(AppError::NotFound(_))));
    }
}
