//! Global sartrack configuration.

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate, Utc};
use chrono_tz::Tz;
use config::{Environment, File};
use serde::{Deserialize, Serialize};

use crate::error::{SarError, SarResult};

pub const DEFAULT_UPCOMING_LIMIT: usize = 10;
pub const DEFAULT_DEADLINE_WINDOW_DAYS: i64 = 30;
pub const DEFAULT_LOG_FILTER: &str = "warn";

fn default_upcoming_limit() -> usize {
    DEFAULT_UPCOMING_LIMIT
}

fn default_deadline_window_days() -> i64 {
    DEFAULT_DEADLINE_WINDOW_DAYS
}

fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_string()
}

/// Configuration at ~/.config/sartrack/config.toml
///
/// Every key can be overridden with a `SARTRACK_` environment variable,
/// e.g. `SARTRACK_API_URL`.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Local JSON case file (local mode)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cases_file: Option<PathBuf>,

    /// Base URL of the SAR tracker backend (online mode)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    /// Bearer token sent to the backend
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,

    /// IANA zone used to decide what "today" is, e.g. "Europe/London"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,

    #[serde(default = "default_upcoming_limit")]
    pub upcoming_limit: usize,

    #[serde(default = "default_deadline_window_days")]
    pub deadline_window_days: i64,

    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            cases_file: None,
            api_url: None,
            api_token: None,
            timezone: None,
            upcoming_limit: DEFAULT_UPCOMING_LIMIT,
            deadline_window_days: DEFAULT_DEADLINE_WINDOW_DAYS,
            log_filter: default_log_filter(),
        }
    }
}

impl Config {
    pub fn config_path() -> SarResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| SarError::Config("Could not determine config directory".into()))?
            .join("sartrack");

        Ok(config_dir.join("config.toml"))
    }

    /// Load from the default config path, layered under the environment.
    pub fn load() -> SarResult<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load from `path` (which may not exist), layered under the environment.
    pub fn load_from(path: &Path) -> SarResult<Self> {
        config::Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(Environment::with_prefix("SARTRACK"))
            .build()
            .map_err(|e| SarError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| SarError::Config(e.to_string()))
    }

    /// `cases_file` with `~` expanded.
    pub fn cases_path(&self) -> Option<PathBuf> {
        self.cases_file.as_ref().map(|p| {
            let expanded = shellexpand::tilde(&p.to_string_lossy()).into_owned();
            PathBuf::from(expanded)
        })
    }

    pub fn tz(&self) -> SarResult<Option<Tz>> {
        match &self.timezone {
            Some(name) => name
                .parse::<Tz>()
                .map(Some)
                .map_err(|_| SarError::Config(format!("Unknown timezone '{}'", name))),
            None => Ok(None),
        }
    }

    /// The current calendar date in the configured zone (local zone if unset).
    ///
    /// This is the only place that reads the clock; everything downstream
    /// takes the date as a parameter.
    pub fn today(&self) -> SarResult<NaiveDate> {
        Ok(match self.tz()? {
            Some(tz) => Utc::now().with_timezone(&tz).date_naive(),
            None => Local::now().date_naive(),
        })
    }

    /// Save to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> SarResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| SarError::Config(e.to_string()))?;

        std::fs::write(path, content)
            .map_err(|e| SarError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> SarResult<()> {
        let contents = format!(
            "\
# sartrack configuration

# Local case file (JSON array, or {{ \"cases\": [...], \"reminders\": [...] }}):
# cases_file = \"~/sar/cases.json\"

# SAR tracker backend, used when no case file is given:
# api_url = \"http://localhost:8000\"
# api_token = \"...\"

# Time zone that decides what \"today\" is (defaults to the system zone):
# timezone = \"Europe/London\"

# upcoming_limit = {}
# deadline_window_days = {}
# log_filter = \"{}\"
",
            DEFAULT_UPCOMING_LIMIT, DEFAULT_DEADLINE_WINDOW_DAYS, DEFAULT_LOG_FILTER
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                SarError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| SarError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}
