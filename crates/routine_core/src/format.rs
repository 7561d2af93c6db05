use crate::error::AppError;
use crate::model::{Completion, Frequency, Weekday};

/// `HH:MM:SS` once a session passes an hour, `MM:SS` below that.
pub fn format_duration(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    if hours > 0 {
        format!("{hours:02}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes:02}:{seconds:02}")
    }
}

/// Parses `SECONDS`, `MM:SS` or `HH:MM:SS` into seconds.
pub fn parse_duration(raw: &str) -> Result<u64, AppError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::invalid_input("duration is required"));
    }

    let parts: Vec<&str> = trimmed.split(':').collect();
    if parts.len() > 3 {
        return Err(AppError::invalid_input(
            "duration must be SECONDS, MM:SS or HH:MM:SS",
        ));
    }

    let mut total: u64 = 0;
    for (index, part) in parts.iter().enumerate() {
        let value: u64 = part
            .trim()
            .parse()
            .map_err(|_| AppError::invalid_input(format!("invalid duration '{trimmed}'")))?;
        if index > 0 && value >= 60 {
            return Err(AppError::invalid_input(format!(
                "invalid duration '{trimmed}'"
            )));
        }
        total = total
            .checked_mul(60)
            .and_then(|shifted| shifted.checked_add(value))
            .ok_or_else(|| AppError::invalid_input("duration is too large"))?;
    }

    Ok(total)
}

pub fn frequency_label(frequency: &Frequency) -> String {
    match frequency {
        Frequency::Weekly { days } => {
            let ordered: Vec<&str> = Weekday::MONDAY_FIRST
                .iter()
                .filter(|day| days.contains(*day))
                .map(|day| day.short_name())
                .collect();
            if ordered.is_empty() {
                "no days selected".to_string()
            } else {
                ordered.join(", ")
            }
        }
        Frequency::Interval { days: 1 } => "every day".to_string(),
        Frequency::Interval { days } => format!("every {days} days"),
    }
}

pub fn completion_label(completion: &Completion) -> String {
    let day = Weekday::of(completion.date).short_name();
    let mut label = format!(
        "{} ({}{})",
        completion.date,
        day[..1].to_ascii_uppercase(),
        &day[1..]
    );
    if let Some(duration) = completion.duration {
        label.push_str(&format!(" ({})", format_duration(duration)));
    }
    label
}
