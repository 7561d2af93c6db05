use crate::error::AppError;
use crate::model::{Completion, DEFAULT_COLOR, Frequency, Routine};
use crate::storage::resolve_app_file;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use time::Date;
use time::macros::format_description;

/// Version 1 stored completions as bare `YYYY-MM-DD` strings; version 2
/// stores `{date, duration?}` objects.
pub const SCHEMA_VERSION: u32 = 2;
const STORE_FILE_NAME: &str = "routines.json";
const STORE_ENV_VAR: &str = "ROUTINEAPP_STORE_PATH";

#[derive(Debug, Serialize)]
struct StoredRoutinesOut<'a> {
    schema_version: u32,
    routines: &'a [Routine],
}

#[derive(Debug, Deserialize)]
struct StoredRoutinesIn {
    schema_version: u32,
    #[serde(default)]
    routines: Vec<StoredRoutine>,
}

#[derive(Debug, Deserialize)]
struct StoredRoutine {
    id: String,
    name: String,
    frequency: Frequency,
    #[serde(default)]
    completions: Vec<StoredCompletion>,
    #[serde(default)]
    color: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StoredCompletion {
    Bare(String),
    Record {
        date: String,
        #[serde(default)]
        duration: Option<u64>,
    },
}

impl StoredCompletion {
    fn into_completion(self) -> Result<Completion, AppError> {
        let (raw_date, duration) = match self {
            StoredCompletion::Bare(date) => (date, None),
            // A stored zero means "not tracked".
            StoredCompletion::Record { date, duration } => {
                (date, duration.filter(|seconds| *seconds > 0))
            }
        };
        Ok(Completion {
            date: parse_stored_date(&raw_date)?,
            duration,
        })
    }
}

impl StoredRoutine {
    fn into_routine(self) -> Result<Routine, AppError> {
        let completions = self
            .completions
            .into_iter()
            .map(StoredCompletion::into_completion)
            .collect::<Result<Vec<_>, _>>()?;
        let mut routine = Routine {
            id: self.id,
            name: self.name,
            frequency: self.frequency,
            completions,
            color: self
                .color
                .filter(|color| !color.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_COLOR.to_string()),
        };
        routine.sort_completions();
        Ok(routine)
    }
}

fn parse_stored_date(raw: &str) -> Result<Date, AppError> {
    Date::parse(raw.trim(), format_description!("[year]-[month]-[day]"))
        .map_err(|_| AppError::invalid_data(format!("completion date '{raw}' must be YYYY-MM-DD")))
}

pub fn store_path() -> Result<PathBuf, AppError> {
    resolve_app_file(STORE_ENV_VAR, STORE_FILE_NAME)
}

pub fn load_routines(path: &Path) -> Result<Vec<Routine>, AppError> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "store missing, starting empty");
        return Ok(Vec::new());
    }

    let content = std::fs::read_to_string(path).map_err(|err| AppError::io(err.to_string()))?;
    let stored: StoredRoutinesIn =
        serde_json::from_str(&content).map_err(|err| AppError::invalid_data(err.to_string()))?;

    if !(1..=SCHEMA_VERSION).contains(&stored.schema_version) {
        return Err(AppError::invalid_data("schema_version mismatch"));
    }
    if stored.schema_version < SCHEMA_VERSION {
        tracing::debug!(
            from = stored.schema_version,
            to = SCHEMA_VERSION,
            "migrating stored routines"
        );
    }

    let routines = stored
        .routines
        .into_iter()
        .map(StoredRoutine::into_routine)
        .collect::<Result<Vec<_>, _>>()?;

    let mut seen = std::collections::HashSet::new();
    if let Some(duplicate) = routines.iter().find(|routine| !seen.insert(routine.id.as_str())) {
        return Err(AppError::invalid_data(format!(
            "duplicate routine id '{}'",
            duplicate.id
        )));
    }

    tracing::debug!(path = %path.display(), count = routines.len(), "loaded routines");
    Ok(routines)
}

pub fn save_routines(path: &Path, routines: &[Routine]) -> Result<(), AppError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|err| AppError::io(err.to_string()))?;
    }

    let stored = StoredRoutinesOut {
        schema_version: SCHEMA_VERSION,
        routines,
    };
    let content = serde_json::to_string_pretty(&stored)
        .map_err(|err| AppError::invalid_data(err.to_string()))?;
    std::fs::write(path, content).map_err(|err| AppError::io(err.to_string()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let permissions = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(path, permissions).map_err(|err| AppError::io(err.to_string()))?;
    }

    tracing::debug!(path = %path.display(), count = routines.len(), "saved routines");
    Ok(())
}
