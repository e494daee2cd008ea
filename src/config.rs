use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_DATABASE: &str = "todos.db";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub port: u16,
    pub database: PathBuf,
    /// Prefix all routes are mounted under, e.g. `/api`. Empty for the root.
    pub base_path: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("TASKBOARD_PORT must be a port number, got {0:?}")]
    InvalidPort(String),
}

impl Config {
    /// Reads `TASKBOARD_PORT`, `TASKBOARD_DATABASE` and `TASKBOARD_BASE_PATH`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = match lookup("TASKBOARD_PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidPort(raw))?,
            None => DEFAULT_PORT,
        };

        let database = lookup("TASKBOARD_DATABASE")
            .filter(|path| !path.is_empty())
            .unwrap_or_else(|| DEFAULT_DATABASE.to_string())
            .into();

        let base_path = lookup("TASKBOARD_BASE_PATH")
            .map(|path| normalize_base_path(&path))
            .unwrap_or_default();

        Ok(Config {
            port,
            database,
            base_path,
        })
    }
}

pub fn normalize_base_path(path: &str) -> String {
    let path = path.trim().trim_end_matches('/');
    if path.is_empty() || path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    }
}
