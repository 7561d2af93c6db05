use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::str::FromStr;
use time::Date;

time::serde::format_description!(completion_date, Date, "[year]-[month]-[day]");

/// Theme color for routines created without one.
pub const DEFAULT_COLOR: &str = "#3B82F6";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl Weekday {
    /// Display order used by list and detail views.
    pub const MONDAY_FIRST: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    /// Sunday = 0 through Saturday = 6.
    pub fn number(self) -> u8 {
        match self {
            Weekday::Sunday => 0,
            Weekday::Monday => 1,
            Weekday::Tuesday => 2,
            Weekday::Wednesday => 3,
            Weekday::Thursday => 4,
            Weekday::Friday => 5,
            Weekday::Saturday => 6,
        }
    }

    pub fn of(date: Date) -> Self {
        date.weekday().into()
    }

    pub fn short_name(self) -> &'static str {
        match self {
            Weekday::Sunday => "sun",
            Weekday::Monday => "mon",
            Weekday::Tuesday => "tue",
            Weekday::Wednesday => "wed",
            Weekday::Thursday => "thu",
            Weekday::Friday => "fri",
            Weekday::Saturday => "sat",
        }
    }
}

impl From<time::Weekday> for Weekday {
    fn from(value: time::Weekday) -> Self {
        match value {
            time::Weekday::Sunday => Weekday::Sunday,
            time::Weekday::Monday => Weekday::Monday,
            time::Weekday::Tuesday => Weekday::Tuesday,
            time::Weekday::Wednesday => Weekday::Wednesday,
            time::Weekday::Thursday => Weekday::Thursday,
            time::Weekday::Friday => Weekday::Friday,
            time::Weekday::Saturday => Weekday::Saturday,
        }
    }
}

impl FromStr for Weekday {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let lowered = raw.trim().to_ascii_lowercase();
        let day = match lowered.as_str() {
            "sun" | "sunday" => Weekday::Sunday,
            "mon" | "monday" => Weekday::Monday,
            "tue" | "tues" | "tuesday" => Weekday::Tuesday,
            "wed" | "wednesday" => Weekday::Wednesday,
            "thu" | "thurs" | "thursday" => Weekday::Thursday,
            "fri" | "friday" => Weekday::Friday,
            "sat" | "saturday" => Weekday::Saturday,
            _ => return Err(format!("unknown weekday '{}'", raw.trim())),
        };
        Ok(day)
    }
}

/// How a routine recurs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Frequency {
    /// Due on each listed weekday. An empty set is legal and never due.
    Weekly { days: BTreeSet<Weekday> },
    /// Due `days` after the most recent completion.
    Interval { days: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Completion {
    #[serde(with = "completion_date")]
    pub date: Date,
    /// Seconds spent on the session, when tracked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Routine {
    pub id: String,
    pub name: String,
    pub frequency: Frequency,
    /// Sorted descending by date.
    #[serde(default)]
    pub completions: Vec<Completion>,
    pub color: String,
}

impl Routine {
    pub fn last_completed(&self) -> Option<Date> {
        self.completions.iter().map(|completion| completion.date).max()
    }

    pub fn sort_completions(&mut self) {
        self.completions.sort_by(|a, b| b.date.cmp(&a.date));
    }
}
