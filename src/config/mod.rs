use crate::errors::{AppError, AppResult};
use crate::models::Mode;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable overriding the configured document-store path.
pub const DB_ENV_VAR: &str = "TCXLOG_DB";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_database")]
    pub database: String,
    #[serde(default = "default_output")]
    pub output: String,
    #[serde(default)]
    pub default_mode: Mode,
    #[serde(default = "default_sample_interval")]
    pub sample_interval: usize,
    #[serde(default = "default_min_valid_lap_distance")]
    pub min_valid_lap_distance: f64,
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

fn default_database() -> String {
    Config::database_file().to_string_lossy().to_string()
}
fn default_output() -> String {
    "tcx_data.xlsx".to_string()
}
fn default_sample_interval() -> usize {
    60
}
fn default_min_valid_lap_distance() -> f64 {
    990.0
}
fn default_busy_timeout_ms() -> u64 {
    5000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: default_database(),
            output: default_output(),
            default_mode: Mode::default(),
            sample_interval: default_sample_interval(),
            min_valid_lap_distance: default_min_valid_lap_distance(),
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }
}

impl Config {
    /// `~/.tcxlog` (or `./.tcxlog` when no home directory is known)
    pub fn config_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".tcxlog")
    }

    pub fn config_file() -> PathBuf {
        Self::config_dir().join("tcxlog.conf")
    }

    pub fn database_file() -> PathBuf {
        Self::config_dir().join("tcxlog.sqlite")
    }

    /// Load the configuration file, or defaults if it does not exist.
    pub fn load() -> AppResult<Self> {
        Self::load_from(&Self::config_file())
    }

    pub fn load_from(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("cannot read {}: {e}", path.display())))?;
        serde_yaml::from_str(&content)
            .map_err(|e| AppError::Config(format!("cannot parse {}: {e}", path.display())))
    }

    /// Apply `--db` first, then the environment variable.
    pub fn apply_overrides(&mut self, cli_db: Option<&str>) {
        if let Some(db) = cli_db {
            self.database = db.to_string();
        } else if let Ok(db) = env::var(DB_ENV_VAR)
            && !db.trim().is_empty()
        {
            self.database = db;
        }
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }

    pub fn to_yaml(&self) -> AppResult<String> {
        serde_yaml::to_string(self).map_err(|e| AppError::Config(e.to_string()))
    }

    /// Create the config directory and write the config file (unless
    /// `is_test`). Returns the resolved database path.
    pub fn init_all(custom_db: Option<&Path>, is_test: bool) -> AppResult<PathBuf> {
        let dir = Self::config_dir();

        // DB name: user provided or default
        let db_path = match custom_db {
            Some(p) if p.is_absolute() || is_test => p.to_path_buf(),
            Some(p) => dir.join(p),
            None => Self::database_file(),
        };

        if !is_test {
            fs::create_dir_all(&dir)?;
            let config = Config {
                database: db_path.to_string_lossy().to_string(),
                ..Config::default()
            };
            let mut file = fs::File::create(Self::config_file())?;
            file.write_all(config.to_yaml()?.as_bytes())?;
        }

        if let Some(parent) = db_path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        Ok(db_path)
    }
}
