//! Runtime configuration for hosts embedding the deviation store.
//!
//! Settings come from an optional TOML file; environment variables override
//! individual fields. Every field has a default, so an empty file is valid.
//!
//! ```toml
//! [database]
//! path = "/var/lib/deviations/deviations.sqlite3"
//!
//! [logging]
//! level = "info"
//! dir = "/var/log/deviations"
//! ```

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const ENV_DATABASE_PATH: &str = "DEVIATIONS_DATABASE_PATH";
pub const ENV_LOG_LEVEL: &str = "DEVIATIONS_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "DEVIATIONS_LOG_DIR";

const DEFAULT_DATABASE_FILE: &str = "deviations.sqlite3";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviationsConfig {
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite file; created on first open.
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_DATABASE_FILE),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// Absolute directory for rolling log files. File logging is off when
    /// unset.
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: crate::logging::default_log_level().to_string(),
            dir: None,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse(toml::de::Error),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config: {err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
        }
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(value: toml::de::Error) -> Self {
        Self::Parse(value)
    }
}

impl DeviationsConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    /// Reads and parses a TOML config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Loads the file when given (defaults otherwise), then applies process
    /// environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Overrides fields from `lookup`, which maps variable names to values.
    ///
    /// Empty values are ignored.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(path) = non_empty(ENV_DATABASE_PATH) {
            self.database.path = PathBuf::from(path);
        }
        if let Some(level) = non_empty(ENV_LOG_LEVEL) {
            self.logging.level = level;
        }
        if let Some(dir) = non_empty(ENV_LOG_DIR) {
            self.logging.dir = Some(PathBuf::from(dir));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, DeviationsConfig, ENV_DATABASE_PATH, ENV_LOG_DIR, ENV_LOG_LEVEL};
    use std::collections::HashMap;
    use std::io::Write;
    use std::path::PathBuf;

    #[test]
    fn empty_source_yields_defaults() {
        let config = DeviationsConfig::from_toml_str("").unwrap();
        assert_eq!(config, DeviationsConfig::default());
        assert_eq!(config.database.path, PathBuf::from("deviations.sqlite3"));
        assert!(config.logging.dir.is_none());
    }

    #[test]
    fn parses_partial_sections() {
        let config = DeviationsConfig::from_toml_str(
            r#"
            [database]
            path = "/tmp/store.sqlite3"

            [logging]
            level = "warn"
            "#,
        )
        .unwrap();

        assert_eq!(config.database.path, PathBuf::from("/tmp/store.sqlite3"));
        assert_eq!(config.logging.level, "warn");
        assert!(config.logging.dir.is_none());
    }

    #[test]
    fn rejects_malformed_toml() {
        let err = DeviationsConfig::from_toml_str("[database\npath = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn env_overrides_replace_non_empty_values_only() {
        let vars: HashMap<&str, &str> = HashMap::from([
            (ENV_DATABASE_PATH, "/data/deviations.sqlite3"),
            (ENV_LOG_LEVEL, "  "),
            (ENV_LOG_DIR, "/var/log/deviations"),
        ]);
        let mut config = DeviationsConfig::default();
        let default_level = config.logging.level.clone();

        config.apply_env_overrides(|key| vars.get(key).map(|value| value.to_string()));

        assert_eq!(
            config.database.path,
            PathBuf::from("/data/deviations.sqlite3")
        );
        assert_eq!(config.logging.level, default_level);
        assert_eq!(
            config.logging.dir,
            Some(PathBuf::from("/var/log/deviations"))
        );
    }

    #[test]
    fn from_file_reads_and_reports_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deviations.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "[logging]\nlevel = \"error\"").unwrap();

        let config = DeviationsConfig::from_file(&path).unwrap();
        assert_eq!(config.logging.level, "error");

        let err = DeviationsConfig::from_file(dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
