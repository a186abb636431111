//! Configuration schema (rowmap.toml)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Which execution engine statements are sent to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    /// In-process tables, nothing persisted
    Memory,

    /// SQLite database, in a file or in memory
    Sqlite,
}

impl Default for EngineKind {
    fn default() -> Self {
        Self::Memory
    }
}

/// Execution engine configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Engine type
    #[serde(default)]
    pub kind: EngineKind,

    /// SQLite database file; an in-memory database when absent
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Directory CSV files are written to and read from
    #[serde(default = "default_csv_dir")]
    pub csv_dir: PathBuf,

    /// Command log file
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,

    /// Table name override; defaults to the pluralized record type name
    #[serde(default)]
    pub table_name: Option<String>,

    /// Execution engine
    #[serde(default)]
    pub engine: EngineConfig,
}

fn default_csv_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_log_file() -> PathBuf {
    PathBuf::from("database_log.txt")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            csv_dir: default_csv_dir(),
            log_file: default_log_file(),
            table_name: None,
            engine: EngineConfig::default(),
        }
    }
}

impl Config {
    /// Load config from TOML file
    ///
    /// Relative paths in the file are resolved against its directory.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        let mut config = Self::from_toml(&contents)?;

        if let Some(parent) = path.parent() {
            if config.csv_dir.is_relative() {
                config.csv_dir = parent.join(&config.csv_dir);
            }
            if config.log_file.is_relative() {
                config.log_file = parent.join(&config.log_file);
            }
            if let Some(db) = config.engine.path.as_mut() {
                if db.is_relative() {
                    *db = parent.join(&*db);
                }
            }
        }

        Ok(config)
    }

    /// Load config from TOML string
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml)
            .map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Save config to TOML file
    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let toml = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(path, toml)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }
}

/// Config error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.engine.kind, EngineKind::Memory);
        assert_eq!(config.log_file, PathBuf::from("database_log.txt"));
        assert!(config.table_name.is_none());
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let config = Config::from_toml(
            r#"
            table_name = "Fleet"

            [engine]
            kind = "sqlite"
            "#,
        )
        .unwrap();

        assert_eq!(config.table_name.as_deref(), Some("Fleet"));
        assert_eq!(config.engine.kind, EngineKind::Sqlite);
        assert!(config.engine.path.is_none());
        assert_eq!(config.csv_dir, PathBuf::from("."));
    }

    #[test]
    fn unknown_engine_is_a_parse_error() {
        let err = Config::from_toml("[engine]\nkind = \"oracle\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn config_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rowmap.toml");

        let mut config = Config::default();
        config.csv_dir = PathBuf::from("data");
        config.engine.kind = EngineKind::Sqlite;
        config.engine.path = Some(PathBuf::from("cars.db"));
        config.save_to_file(&path).unwrap();

        let loaded = Config::from_file(&path).unwrap();
        assert_eq!(loaded.csv_dir, dir.path().join("data"));
        assert_eq!(loaded.log_file, dir.path().join("database_log.txt"));
        assert_eq!(loaded.engine.kind, EngineKind::Sqlite);
        assert_eq!(loaded.engine.path, Some(dir.path().join("cars.db")));
    }
}
