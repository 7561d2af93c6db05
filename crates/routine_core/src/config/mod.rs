use crate::error::AppError;
use crate::model::DEFAULT_COLOR;
use crate::schedule::DueStatus;
use crate::storage::resolve_app_file;
use serde::Deserialize;
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = "config.json";
const CONFIG_ENV_VAR: &str = "ROUTINEAPP_CONFIG_PATH";
const DEFAULT_INTERVAL_DAYS: u32 = 2;
const RESET: &str = "\x1b[0m";

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Plain,
    Noir,
    Solarized,
}

impl Theme {
    /// Case, spacing and punctuation are ignored: `"Dark Mode"` and
    /// `"dark-mode"` both name [`Theme::Noir`].
    pub fn from_name(raw: &str) -> Result<Self, AppError> {
        let key: String = raw
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .map(|ch| ch.to_ascii_lowercase())
            .collect();
        match key.as_str() {
            "" | "default" | "plain" | "vanilla" | "light" => Ok(Theme::Plain),
            "noir" | "dark" | "darkmode" => Ok(Theme::Noir),
            "solarized" => Ok(Theme::Solarized),
            _ => Err(AppError::invalid_input(format!(
                "unknown theme '{}'",
                raw.trim()
            ))),
        }
    }

    pub fn palette(self) -> Palette {
        match self {
            Theme::Plain => Palette::default(),
            Theme::Noir => Palette {
                due: "\x1b[38;5;208m",
                done: "\x1b[38;5;114m",
                idle: "\x1b[38;5;250m",
            },
            Theme::Solarized => Palette {
                due: "\x1b[38;5;136m",
                done: "\x1b[38;5;64m",
                idle: "\x1b[38;5;245m",
            },
        }
    }
}

/// ANSI colors for status labels. Empty codes leave text untouched.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub due: &'static str,
    pub done: &'static str,
    pub idle: &'static str,
}

impl Palette {
    pub fn paint_status(&self, status: DueStatus) -> String {
        let code = match status {
            DueStatus::CompletedToday => self.done,
            DueStatus::DueToday => self.due,
            _ => self.idle,
        };
        let label = status.to_string();
        if code.is_empty() {
            label
        } else {
            format!("{code}{label}{RESET}")
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    theme: Option<String>,
    #[serde(default)]
    default_color: Option<String>,
    #[serde(default)]
    default_interval_days: Option<u32>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Config {
    pub theme: Theme,
    /// Color for routines added without `--color`.
    pub default_color: Option<String>,
    /// Cadence for interval routines added without an explicit count.
    pub default_interval_days: Option<u32>,
}

impl Config {
    pub fn default_color(&self) -> &str {
        self.default_color.as_deref().unwrap_or(DEFAULT_COLOR)
    }

    pub fn default_interval_days(&self) -> u32 {
        self.default_interval_days.unwrap_or(DEFAULT_INTERVAL_DAYS)
    }

    fn from_file(file: ConfigFile) -> Result<Self, AppError> {
        let theme = match file.theme.as_deref() {
            Some(name) => Theme::from_name(name)?,
            None => Theme::default(),
        };
        let default_color = file
            .default_color
            .as_deref()
            .map(crate::validate::color)
            .transpose()?;
        if file.default_interval_days == Some(0) {
            return Err(AppError::invalid_data(
                "default_interval_days must be at least 1",
            ));
        }
        Ok(Self {
            theme,
            default_color,
            default_interval_days: file.default_interval_days,
        })
    }
}

/// Result of a tolerant load: the config to use plus the problem that forced
/// a fallback to defaults, if any.
#[derive(Debug, Clone)]
pub struct ConfigLoad {
    pub config: Config,
    pub error: Option<AppError>,
}

/// Values given on the command line; each set field wins over the file.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub theme: Option<Theme>,
    pub default_color: Option<String>,
    pub default_interval_days: Option<u32>,
}

pub fn config_path() -> Result<PathBuf, AppError> {
    resolve_app_file(CONFIG_ENV_VAR, CONFIG_FILE_NAME)
}

pub fn load_config_with_fallback() -> ConfigLoad {
    let loaded = config_path().and_then(|path| read_config(&path));
    into_config_load(loaded)
}

fn into_config_load(loaded: Result<Config, AppError>) -> ConfigLoad {
    match loaded {
        Ok(config) => ConfigLoad {
            config,
            error: None,
        },
        Err(err) => {
            tracing::warn!(error = %err, "falling back to default config");
            ConfigLoad {
                config: Config::default(),
                error: Some(err),
            }
        }
    }
}

/// A missing file is not an error and yields the defaults.
fn read_config(path: &Path) -> Result<Config, AppError> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no config file");
        return Ok(Config::default());
    }
    let content = std::fs::read_to_string(path)
        .map_err(|err| AppError::io(format!("{}: {err}", path.display())))?;
    let file: ConfigFile = serde_json::from_str(&content).map_err(|err| {
        AppError::invalid_data(format!("invalid JSON in {}: {err}", path.display()))
    })?;
    Config::from_file(file)
}

pub fn merge_overrides(base: &Config, overrides: &ConfigOverrides) -> Config {
    Config {
        theme: overrides.theme.unwrap_or(base.theme),
        default_color: overrides
            .default_color
            .clone()
            .or_else(|| base.default_color.clone()),
        default_interval_days: overrides
            .default_interval_days
            .or(base.default_interval_days),
    }
}
