//! # Configuration
//!
//! Application settings loaded from a JSON file. Every field has a default,
//! so an empty object (or no file at all) is a valid configuration.
//!
//! ## Example
//!
//! ```json
//! {
//!   "database_path": "/var/lib/steelcalc/calculations.db",
//!   "busy_timeout_ms": 2000,
//!   "default_owner_id": 1
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};
use crate::record::OwnerId;

/// Environment variable overriding the database path
pub const DB_ENV_VAR: &str = "STEELCALC_DB";

/// Default database file name
pub const DEFAULT_DATABASE_PATH: &str = "steelcalc.db";

/// Default SQLite busy timeout
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5000;

fn default_database_path() -> PathBuf {
    PathBuf::from(DEFAULT_DATABASE_PATH)
}

fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

/// Settings for opening the calculation store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// SQLite database file
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    /// How long a writer waits on a locked database
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,

    /// Owner used when a command does not name one
    #[serde(default)]
    pub default_owner_id: Option<OwnerId>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            database_path: default_database_path(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            default_owner_id: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from a JSON file.
    pub fn load(path: &Path) -> CalcResult<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| CalcError::file_error("read config", path.display().to_string(), e.to_string()))?;
        Self::from_json(&text).map_err(|e| match e {
            CalcError::SerializationError { reason } => CalcError::SerializationError {
                reason: format!("Invalid config in {}: {}", path.display(), reason),
            },
            other => other,
        })
    }

    /// Parse configuration from JSON text
    pub fn from_json(text: &str) -> CalcResult<Self> {
        serde_json::from_str(text).map_err(CalcError::serialization)
    }

    /// Apply the `STEELCALC_DB` override, if set.
    pub fn with_env(self) -> Self {
        self.with_database_override(std::env::var_os(DB_ENV_VAR).map(PathBuf::from))
    }

    /// Replace the database path when an override is given
    pub fn with_database_override(mut self, path: Option<PathBuf>) -> Self {
        if let Some(path) = path.filter(|p| !p.as_os_str().is_empty()) {
            self.database_path = path;
        }
        self
    }

    /// Busy timeout as a [`Duration`]
    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.database_path, PathBuf::from("steelcalc.db"));
        assert_eq!(config.busy_timeout(), Duration::from_secs(5));
        assert!(config.default_owner_id.is_none());
    }

    #[test]
    fn test_empty_object_uses_defaults() {
        assert_eq!(AppConfig::from_json("{}").unwrap(), AppConfig::default());
    }

    #[test]
    fn test_partial_config() {
        let config = AppConfig::from_json(r#"{"default_owner_id": 7}"#).unwrap();
        assert_eq!(config.default_owner_id, Some(7));
        assert_eq!(config.busy_timeout_ms, DEFAULT_BUSY_TIMEOUT_MS);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"database_path": "/tmp/calc.db", "busy_timeout_ms": 250}}"#).unwrap();

        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.database_path, PathBuf::from("/tmp/calc.db"));
        assert_eq!(config.busy_timeout_ms, 250);
    }

    #[test]
    fn test_load_invalid_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "database_path = 'x'").unwrap();
        assert!(matches!(
            AppConfig::load(file.path()),
            Err(CalcError::SerializationError { .. })
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let err = AppConfig::load(Path::new("/nonexistent/steelcalc.json")).unwrap_err();
        assert_eq!(err.error_code(), "FILE_ERROR");
    }

    #[test]
    fn test_database_override() {
        let config = AppConfig::default().with_database_override(Some(PathBuf::from("other.db")));
        assert_eq!(config.database_path, PathBuf::from("other.db"));

        let config = AppConfig::default().with_database_override(Some(PathBuf::new()));
        assert_eq!(config.database_path, PathBuf::from(DEFAULT_DATABASE_PATH));

        let config = AppConfig::default().with_database_override(None);
        assert_eq!(config.database_path, PathBuf::from(DEFAULT_DATABASE_PATH));
    }
}
