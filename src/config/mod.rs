//! Service configuration
//!
//! One [`ServiceConfig`] is built at process start, from an optional JSON
//! file plus environment overrides, validated, and then shared read-only.
//!
//! Recognized environment variables:
//!
//! | Variable | Field |
//! |---|---|
//! | `DB_HOST`, `DB_PORT`, `DB_USER`, `DB_PASSWORD`, `DB_NAME` | `database.*` |
//! | `API_KEY`, `API_KEY_NAME` | `api.key`, `api.key_header` |
//! | `HTTP_HOST`, `HTTP_PORT` | `http.host`, `http.port` |
//!
//! A `.env` file in the working directory is read as well. Process variables
//! win over `.env` entries.

mod errors;

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub use errors::{ConfigError, ConfigResult};

use crate::http_server::HttpServerConfig;

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub http: HttpServerConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub api: ApiKeyConfig,

    #[serde(default)]
    pub store: StoreConfig,
}

/// PostgreSQL connection parameters
#[derive(Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub host: String,

    /// Default: 5432
    #[serde(default = "default_db_port")]
    pub port: u16,

    #[serde(default)]
    pub user: String,

    #[serde(default)]
    pub password: String,

    #[serde(default)]
    pub name: String,

    /// Upper bound on pooled connections (default: 10)
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Seconds to wait for a pooled connection (default: 5)
    #[serde(default = "default_acquire_timeout_secs")]
    pub acquire_timeout_secs: u64,
}

fn default_db_port() -> u16 {
    5432
}

fn default_max_connections() -> u32 {
    10
}

fn default_acquire_timeout_secs() -> u64 {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: default_db_port(),
            user: String::new(),
            password: String::new(),
            name: String::new(),
            max_connections: default_max_connections(),
            acquire_timeout_secs: default_acquire_timeout_secs(),
        }
    }
}

impl DatabaseConfig {
    /// Connection URL with the password masked, for logs
    pub fn redacted_url(&self) -> String {
        format!(
            "postgres://{}:***@{}:{}/{}",
            self.user, self.host, self.port, self.name
        )
    }
}

// Hand-written so the password never reaches a log line through `{:?}`
impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"***")
            .field("name", &self.name)
            .field("max_connections", &self.max_connections)
            .field("acquire_timeout_secs", &self.acquire_timeout_secs)
            .finish()
    }
}

/// API key check settings
#[derive(Clone, Serialize, Deserialize)]
pub struct ApiKeyConfig {
    /// Expected key value (required)
    #[serde(default)]
    pub key: String,

    /// Header carrying the key (default: "X-API-KEY")
    #[serde(default = "default_key_header")]
    pub key_header: String,
}

fn default_key_header() -> String {
    "X-API-KEY".to_string()
}

impl Default for ApiKeyConfig {
    fn default() -> Self {
        Self {
            key: String::new(),
            key_header: default_key_header(),
        }
    }
}

impl std::fmt::Debug for ApiKeyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKeyConfig")
            .field("key", &"***")
            .field("key_header", &self.key_header)
            .finish()
    }
}

/// Which entity store backs the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Postgres,
    Memory,
}

impl StoreBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreBackend::Postgres => "postgres",
            StoreBackend::Memory => "memory",
        }
    }
}

/// Store selection
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,

    /// JSON fixture for the memory backend
    #[serde(default)]
    pub fixture: Option<PathBuf>,
}

impl ServiceConfig {
    /// Load from the optional file, apply `.env` and process env, validate
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        let env = merged_env(Path::new(DOTENV_FILE), std::env::vars())?;
        Self::load_with_env(path, &env)
    }

    /// Same as [`ServiceConfig::load`] with an explicit environment
    pub fn load_with_env(path: Option<&Path>, env: &HashMap<String, String>) -> ConfigResult<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(env)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a JSON config file without env overrides or validation
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        serde_json::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Overlay recognized environment variables. Names are matched
    /// case-insensitively.
    pub fn apply_env(&mut self, env: &HashMap<String, String>) -> ConfigResult<()> {
        let env: HashMap<String, &String> = env
            .iter()
            .map(|(k, v)| (k.to_ascii_uppercase(), v))
            .collect();
        let get = |name: &str| env.get(name).map(|v| v.to_string());

        if let Some(v) = get("DB_HOST") {
            self.database.host = v;
        }
        if let Some(v) = get("DB_PORT") {
            self.database.port = parse_env("DB_PORT", &v)?;
        }
        if let Some(v) = get("DB_USER") {
            self.database.user = v;
        }
        if let Some(v) = get("DB_PASSWORD") {
            self.database.password = v;
        }
        if let Some(v) = get("DB_NAME") {
            self.database.name = v;
        }
        if let Some(v) = get("API_KEY") {
            self.api.key = v;
        }
        if let Some(v) = get("API_KEY_NAME") {
            self.api.key_header = v;
        }
        if let Some(v) = get("HTTP_HOST") {
            self.http.host = v;
        }
        if let Some(v) = get("HTTP_PORT") {
            self.http.port = parse_env("HTTP_PORT", &v)?;
        }

        Ok(())
    }

    /// Reject configurations the service cannot run with
    pub fn validate(&self) -> ConfigResult<()> {
        if self.api.key.is_empty() {
            return Err(ConfigError::Missing("api.key (API_KEY)"));
        }
        if self.api.key_header.is_empty()
            || axum::http::HeaderName::from_bytes(self.api.key_header.as_bytes()).is_err()
        {
            return Err(ConfigError::Invalid {
                field: "api.key_header",
                reason: format!("'{}' is not a valid header name", self.api.key_header),
            });
        }

        match self.store.backend {
            StoreBackend::Postgres => {
                let required = [
                    ("database.host (DB_HOST)", &self.database.host),
                    ("database.user (DB_USER)", &self.database.user),
                    ("database.password (DB_PASSWORD)", &self.database.password),
                    ("database.name (DB_NAME)", &self.database.name),
                ];
                for (field, value) in required {
                    if value.is_empty() {
                        return Err(ConfigError::Missing(field));
                    }
                }
                if self.database.max_connections == 0 {
                    return Err(ConfigError::Invalid {
                        field: "database.max_connections",
                        reason: "must be > 0".to_string(),
                    });
                }
                if self.database.acquire_timeout_secs == 0 {
                    return Err(ConfigError::Invalid {
                        field: "database.acquire_timeout_secs",
                        reason: "must be > 0".to_string(),
                    });
                }
            }
            StoreBackend::Memory => {
                if self.store.fixture.is_none() {
                    return Err(ConfigError::Missing("store.fixture"));
                }
            }
        }

        if self.http.port == 0 {
            return Err(ConfigError::Invalid {
                field: "http.port",
                reason: "must be > 0".to_string(),
            });
        }

        Ok(())
    }
}

/// Default dotenv location, relative to the working directory
pub const DOTENV_FILE: &str = ".env";

/// Entries of `dotenv_path` (if the file exists) overlaid by `process`.
/// Keys are upper-cased so a process variable wins regardless of case.
pub fn merged_env(
    dotenv_path: &Path,
    process: impl IntoIterator<Item = (String, String)>,
) -> ConfigResult<HashMap<String, String>> {
    let mut env = HashMap::new();

    if dotenv_path.is_file() {
        let read_error = |e: dotenvy::Error| ConfigError::Read {
            path: dotenv_path.display().to_string(),
            reason: e.to_string(),
        };
        for item in dotenvy::from_path_iter(dotenv_path).map_err(read_error)? {
            let (key, value) = item.map_err(read_error)?;
            env.insert(key.to_ascii_uppercase(), value);
        }
    }

    for (key, value) in process {
        env.insert(key.to_ascii_uppercase(), value);
    }
    Ok(env)
}

fn parse_env<T: std::str::FromStr>(name: &'static str, value: &str) -> ConfigResult<T> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        field: name,
        reason: format!("'{}' is not a valid number", value),
    })
}
