use crate::{
    config::Config, repository::Repository, services::integrity::Coordinator,
    services::validation::DateWindow, store::DocumentStore,
};
use chrono::Utc;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub repo: Repository,
    pub coordinator: Coordinator,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(store: Arc<dyn DocumentStore>, config: Config) -> Self {
        let repo = Repository::new(store);
        Self {
            coordinator: Coordinator::new(repo.clone()),
            repo,
            config: Arc::new(config),
        }
    }

    /// Dates accepted on forms submitted right now.
    pub fn date_window(&self) -> DateWindow {
        DateWindow::new(self.config.earliest_record_date, Utc::now().date_naive())
    }
}
