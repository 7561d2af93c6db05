use crate::error::AppError;
use crate::model::Frequency;

pub fn routine_name(raw: &str) -> Result<String, AppError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::invalid_input("name is required"));
    }
    Ok(trimmed.to_string())
}

pub fn frequency(frequency: &Frequency) -> Result<(), AppError> {
    match frequency {
        Frequency::Weekly { days } if days.is_empty() => {
            Err(AppError::invalid_input("select at least one day"))
        }
        Frequency::Interval { days } if *days < 1 => {
            Err(AppError::invalid_input("interval must be at least 1 day"))
        }
        _ => Ok(()),
    }
}

/// Accepts `#RRGGBB` and returns it uppercased.
pub fn color(raw: &str) -> Result<String, AppError> {
    let trimmed = raw.trim();
    let hex = trimmed
        .strip_prefix('#')
        .filter(|digits| digits.len() == 6 && digits.chars().all(|ch| ch.is_ascii_hexdigit()))
        .ok_or_else(|| AppError::invalid_input("color must be #RRGGBB"))?;
    Ok(format!("#{}", hex.to_ascii_uppercase()))
}
