use clap::{Parser, Subcommand};
use routine_core::config::{ConfigOverrides, Theme};
use routine_core::error::AppError;
use routine_core::model::{Frequency, Weekday};
use std::collections::BTreeSet;
use time::Date;
use time::macros::format_description;

#[derive(Parser, Debug)]
#[command(name = "routine", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Reference day instead of the local date (format YYYY-MM-DD)
    #[arg(long, value_name = "DATE", global = true)]
    pub today: Option<String>,

    /// Override configuration values (format KEY=VALUE)
    #[arg(long = "config-override", value_name = "KEY=VALUE", global = true)]
    pub config_override: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add a new routine
    ///
    /// Example: routine add "Gym" --days mon,wed,fri
    /// Example: routine add "Water plants" --every 3 --color "#22C55E"
    Add {
        name: Option<String>,
        /// Weekdays the routine is due on (comma separated)
        #[arg(long, value_delimiter = ',', conflicts_with = "every")]
        days: Vec<String>,
        /// Repeat every N days after the last completion
        #[arg(long, value_name = "N")]
        every: Option<u32>,
        #[arg(long, value_name = "#RRGGBB")]
        color: Option<String>,
    },
    /// Edit a routine's name, schedule or color
    ///
    /// Example: routine edit routine-1 --name "Morning gym" --days tue,thu
    Edit {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long, value_delimiter = ',', conflicts_with = "every")]
        days: Vec<String>,
        #[arg(long, value_name = "N")]
        every: Option<u32>,
        #[arg(long, value_name = "#RRGGBB")]
        color: Option<String>,
    },
    /// Delete a routine
    ///
    /// Example: routine delete routine-1
    Delete { id: String },
    /// Show status and history of a routine
    ///
    /// Example: routine show routine-1
    Show { id: String },
    /// Mark a routine as done for today
    ///
    /// Example: routine done routine-1
    /// Example: routine done routine-1 --duration 25:00
    Done {
        id: String,
        /// Session length as SECONDS, MM:SS or HH:MM:SS
        #[arg(short = 'd', long, value_name = "DURATION")]
        duration: Option<String>,
    },
    /// List routines with their next due date
    ///
    /// Example: routine list
    List,
}

pub fn parse_weekdays(raw: &[String]) -> Result<BTreeSet<Weekday>, AppError> {
    raw.iter()
        .filter(|value| !value.trim().is_empty())
        .map(|value| value.parse::<Weekday>().map_err(AppError::invalid_input))
        .collect()
}

/// Builds a frequency from `--days` / `--every`. Returns `None` when neither
/// flag was given.
pub fn frequency_from_flags(
    days: &[String],
    every: Option<u32>,
) -> Result<Option<Frequency>, AppError> {
    if let Some(every) = every {
        return Ok(Some(Frequency::Interval { days: every }));
    }
    if days.is_empty() {
        return Ok(None);
    }
    Ok(Some(Frequency::Weekly {
        days: parse_weekdays(days)?,
    }))
}

pub fn parse_today(raw: &str) -> Result<Date, AppError> {
    Date::parse(raw.trim(), format_description!("[year]-[month]-[day]"))
        .map_err(|_| AppError::invalid_input("--today must be YYYY-MM-DD"))
}

/// Flag name used to identify config override arguments by the runtime.
pub const CONFIG_OVERRIDE_FLAG: &str = "--config-override";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOverrideTarget {
    Theme,
    DefaultColor,
    DefaultIntervalDays,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedConfigOverride {
    pub target: ConfigOverrideTarget,
    pub value: String,
}

/// Parse a raw `KEY=VALUE` override string into a structured target.
pub fn parse_config_override(raw: &str) -> Result<ParsedConfigOverride, String> {
    let trimmed = raw.trim();
    let (key_raw, value_raw) = trimmed
        .split_once('=')
        .ok_or_else(|| "override must be in KEY=VALUE format".to_string())?;

    let value = value_raw.trim().to_string();
    let field =
        canonicalize_flag_name(key_raw).ok_or_else(|| "override key cannot be empty".to_string())?;

    let target = match field.as_str() {
        "theme" => ConfigOverrideTarget::Theme,
        "default_color" | "color" => ConfigOverrideTarget::DefaultColor,
        "default_interval_days" | "interval_days" => ConfigOverrideTarget::DefaultIntervalDays,
        other => return Err(format!("unknown config field '{other}'")),
    };

    Ok(ParsedConfigOverride { target, value })
}

pub fn collect_overrides(raw: &[String]) -> Result<ConfigOverrides, AppError> {
    let mut overrides = ConfigOverrides::default();
    for entry in raw {
        let parsed = parse_config_override(entry)
            .map_err(|message| AppError::invalid_input(format!("{CONFIG_OVERRIDE_FLAG}: {message}")))?;
        match parsed.target {
            ConfigOverrideTarget::Theme => {
                overrides.theme = Some(Theme::from_name(&parsed.value)?);
            }
            ConfigOverrideTarget::DefaultColor => {
                overrides.default_color = Some(routine_core::validate::color(&parsed.value)?);
            }
            ConfigOverrideTarget::DefaultIntervalDays => {
                let days = parsed
                    .value
                    .parse::<u32>()
                    .ok()
                    .filter(|days| *days >= 1)
                    .ok_or_else(|| {
                        AppError::invalid_input(format!(
                            "{CONFIG_OVERRIDE_FLAG}: default_interval_days must be a positive integer"
                        ))
                    })?;
                overrides.default_interval_days = Some(days);
            }
        }
    }
    Ok(overrides)
}

/// `" Default-Color "` and `default_color` name the same field.
fn canonicalize_flag_name(name: &str) -> Option<String> {
    let words: Vec<String> = name
        .split(|ch: char| !ch.is_ascii_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_ascii_lowercase)
        .collect();
    (!words.is_empty()).then(|| words.join("_"))
}
