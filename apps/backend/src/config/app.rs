use std::env;
use std::str::FromStr;
use std::time::Duration;

use super::db::must_var;
use crate::error::AppError;

/// Where documents are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Sqlite,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "sqlite" => Ok(Self::Sqlite),
            "memory" => Ok(Self::Memory),
            other => Err(AppError::config(format!(
                "STORE_BACKEND must be postgres, sqlite or memory, got '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub jwt_secret: Vec<u8>,
    pub store_backend: StoreBackend,
    pub remote_functions_url: Option<String>,
    pub remote_timeout: Duration,
    pub store_timeout: Duration,
    pub commit_max_attempts: u32,
    pub blocked_name_words: String,
}

fn parsed<T: FromStr>(name: &str, default: T) -> Result<T, AppError> {
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|_| AppError::config(format!("Environment variable '{name}' is not valid"))),
        _ => Ok(default),
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let jwt_secret = must_var("BACKEND_JWT_SECRET")?;
        if jwt_secret.is_empty() {
            return Err(AppError::config("BACKEND_JWT_SECRET must not be empty"));
        }

        let store_backend = match env::var("STORE_BACKEND") {
            Ok(raw) => raw.parse()?,
            Err(_) => StoreBackend::Postgres,
        };

        Ok(Self {
            host: env::var("BACKEND_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parsed("BACKEND_PORT", 3001)?,
            jwt_secret: jwt_secret.into_bytes(),
            store_backend,
            remote_functions_url: env::var("REMOTE_FUNCTIONS_URL")
                .ok()
                .filter(|u| !u.trim().is_empty()),
            remote_timeout: Duration::from_millis(parsed("REMOTE_TIMEOUT_MS", 10_000)?),
            store_timeout: Duration::from_millis(parsed("STORE_TIMEOUT_MS", 5_000)?),
            commit_max_attempts: parsed("COMMIT_MAX_ATTEMPTS", 3)?,
            blocked_name_words: env::var("BLOCKED_NAME_WORDS").unwrap_or_default(),
        })
    }
}
