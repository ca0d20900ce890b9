use anyhow::{Context, bail};
use chrono::NaiveDate;
use dotenvy::dotenv;
use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct FirestoreSettings {
    pub project_id: String,
    pub database: String,
    pub base_url: String,
    pub api_key: Option<String>,
    pub auth_token: Option<String>,
}

#[derive(Debug, Clone)]
pub enum StoreBackend {
    Firestore(FirestoreSettings),
    Memory,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub store: StoreBackend,
    pub store_timeout: Duration,
    /// Lower bound of the date window accepted on every form.
    pub earliest_record_date: NaiveDate,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv().ok();

        let store = match var_or("STORE_BACKEND", "firestore").to_lowercase().as_str() {
            "memory" => StoreBackend::Memory,
            "firestore" => StoreBackend::Firestore(FirestoreSettings {
                project_id: env::var("FIRESTORE_PROJECT_ID")
                    .context("FIRESTORE_PROJECT_ID must be set when STORE_BACKEND=firestore")?,
                database: var_or("FIRESTORE_DATABASE", "(default)"),
                base_url: var_or("FIRESTORE_BASE_URL", "https://firestore.googleapis.com/v1"),
                api_key: optional_var("FIRESTORE_API_KEY"),
                auth_token: optional_var("FIRESTORE_AUTH_TOKEN"),
            }),
            other => bail!("STORE_BACKEND must be 'firestore' or 'memory', got '{}'", other),
        };

        Ok(Self {
            server_host: var_or("SERVER_HOST", "127.0.0.1"),
            server_port: var_or("SERVER_PORT", "3000")
                .parse()
                .context("SERVER_PORT must be a valid port number")?,
            store,
            store_timeout: Duration::from_secs(
                var_or("STORE_TIMEOUT_SECS", "10")
                    .parse()
                    .context("STORE_TIMEOUT_SECS must be a number")?,
            ),
            earliest_record_date: NaiveDate::parse_from_str(
                &var_or("EARLIEST_RECORD_DATE", "2024-01-01"),
                "%Y-%m-%d",
            )
            .context("EARLIEST_RECORD_DATE must be formatted YYYY-MM-DD")?,
        })
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn optional_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
impl Config {
    /// In-memory configuration used by handler tests.
    pub fn for_tests() -> Self {
        Self {
            server_host: "127.0.0.1".to_string(),
            server_port: 0,
            store: StoreBackend::Memory,
            store_timeout: Duration::from_secs(1),
            earliest_record_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        }
    }
}
