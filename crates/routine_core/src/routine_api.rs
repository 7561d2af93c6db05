use crate::error::AppError;
use crate::model::{DEFAULT_COLOR, Frequency, Routine};
use crate::recorder::record_completion;
use crate::schedule::{DueStatus, RoutineStatus, compute_status, due_status_from};
use crate::storage::json_store;
use crate::validate;
use std::path::Path;
use time::{Date, OffsetDateTime, UtcOffset};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRoutine {
    pub name: String,
    pub frequency: Frequency,
    pub color: Option<String>,
}

/// Fields left as `None` keep their current value. Completions are never
/// touched by an edit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoutineEdit {
    pub name: Option<String>,
    pub frequency: Option<Frequency>,
    pub color: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RoutineOverview {
    pub routine: Routine,
    pub status: RoutineStatus,
    pub due: DueStatus,
}

impl RoutineOverview {
    fn build(routine: Routine, today: Date) -> Self {
        let status = compute_status(&routine, today);
        let due = due_status_from(&status, today);
        Self {
            routine,
            status,
            due,
        }
    }
}

/// The local calendar day, falling back to UTC when the offset is unknown.
pub fn today_local() -> Date {
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    OffsetDateTime::now_utc().to_offset(offset).date()
}

pub fn add_routine(new_routine: NewRoutine) -> Result<Routine, AppError> {
    let path = json_store::store_path()?;
    add_routine_with_path(&path, new_routine)
}

pub fn edit_routine(id: &str, edit: RoutineEdit) -> Result<Routine, AppError> {
    let path = json_store::store_path()?;
    edit_routine_with_path(&path, id, edit)
}

pub fn delete_routine(id: &str) -> Result<Routine, AppError> {
    let path = json_store::store_path()?;
    delete_routine_with_path(&path, id)
}

pub fn get_routine(id: &str, today: Date) -> Result<RoutineOverview, AppError> {
    let path = json_store::store_path()?;
    get_routine_with_path(&path, id, today)
}

pub fn list_routines(today: Date) -> Result<Vec<RoutineOverview>, AppError> {
    let path = json_store::store_path()?;
    list_routines_with_path(&path, today)
}

pub fn complete_routine(
    id: &str,
    today: Date,
    duration: Option<u64>,
) -> Result<RoutineOverview, AppError> {
    let path = json_store::store_path()?;
    complete_routine_with_path(&path, id, today, duration)
}

fn required_id(id: &str) -> Result<&str, AppError> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        return Err(AppError::invalid_input("id is required"));
    }
    Ok(trimmed)
}

fn not_found(id: &str) -> AppError {
    AppError::not_found(format!("routine '{id}' not found"))
}

fn add_routine_with_path(path: &Path, new_routine: NewRoutine) -> Result<Routine, AppError> {
    let name = validate::routine_name(&new_routine.name)?;
    validate::frequency(&new_routine.frequency)?;
    let color = validate::color(new_routine.color.as_deref().unwrap_or(DEFAULT_COLOR))?;

    let mut routines = json_store::load_routines(path)?;
    let mut id = format!("routine-{}", OffsetDateTime::now_utc().unix_timestamp_nanos());
    while routines.iter().any(|routine| routine.id == id) {
        id.push('x');
    }

    let routine = Routine {
        id,
        name,
        frequency: new_routine.frequency,
        completions: Vec::new(),
        color,
    };

    routines.push(routine.clone());
    json_store::save_routines(path, &routines)?;
    tracing::info!(routine_id = %routine.id, "added routine");

    Ok(routine)
}

fn edit_routine_with_path(path: &Path, id: &str, edit: RoutineEdit) -> Result<Routine, AppError> {
    let trimmed_id = required_id(id)?;
    let name = edit
        .name
        .as_deref()
        .map(validate::routine_name)
        .transpose()?;
    if let Some(frequency) = edit.frequency.as_ref() {
        validate::frequency(frequency)?;
    }
    let color = edit.color.as_deref().map(validate::color).transpose()?;

    let mut routines = json_store::load_routines(path)?;
    let routine = routines
        .iter_mut()
        .find(|routine| routine.id == trimmed_id)
        .ok_or_else(|| not_found(trimmed_id))?;

    if let Some(name) = name {
        routine.name = name;
    }
    if let Some(frequency) = edit.frequency {
        routine.frequency = frequency;
    }
    if let Some(color) = color {
        routine.color = color;
    }
    let updated = routine.clone();

    json_store::save_routines(path, &routines)?;
    tracing::info!(routine_id = %updated.id, "edited routine");

    Ok(updated)
}

fn delete_routine_with_path(path: &Path, id: &str) -> Result<Routine, AppError> {
    let trimmed_id = required_id(id)?;

    let mut routines = json_store::load_routines(path)?;
    let index = routines
        .iter()
        .position(|routine| routine.id == trimmed_id)
        .ok_or_else(|| not_found(trimmed_id))?;

    let removed = routines.remove(index);
    json_store::save_routines(path, &routines)?;
    tracing::info!(routine_id = %removed.id, "deleted routine");

    Ok(removed)
}

fn get_routine_with_path(path: &Path, id: &str, today: Date) -> Result<RoutineOverview, AppError> {
    let trimmed_id = required_id(id)?;

    json_store::load_routines(path)?
        .into_iter()
        .find(|routine| routine.id == trimmed_id)
        .map(|routine| RoutineOverview::build(routine, today))
        .ok_or_else(|| not_found(trimmed_id))
}

fn list_routines_with_path(path: &Path, today: Date) -> Result<Vec<RoutineOverview>, AppError> {
    Ok(json_store::load_routines(path)?
        .into_iter()
        .map(|routine| RoutineOverview::build(routine, today))
        .collect())
}

fn complete_routine_with_path(
    path: &Path,
    id: &str,
    today: Date,
    duration: Option<u64>,
) -> Result<RoutineOverview, AppError> {
    let trimmed_id = required_id(id)?;

    let mut routines = json_store::load_routines(path)?;
    let slot = routines
        .iter_mut()
        .find(|routine| routine.id == trimmed_id)
        .ok_or_else(|| not_found(trimmed_id))?;

    let updated = record_completion(slot, today, duration)?;
    *slot = updated.clone();
    json_store::save_routines(path, &routines)?;
    tracing::info!(routine_id = %updated.id, date = %today, "completed routine");

    Ok(RoutineOverview::build(updated, today))
}

#[cfg(test)]
mod tests {
    use super::{
        NewRoutine, RoutineEdit, add_routine_with_path, complete_routine_with_path,
        delete_routine_with_path, edit_routine_with_path, get_routine_with_path,
        list_routines_with_path,
    };
    use crate::model::{Completion, DEFAULT_COLOR, Frequency, Routine, Weekday};
    use crate::schedule::DueStatus;
    use crate::storage::json_store;
    use std::collections::BTreeSet;
    use std::path::PathBuf;
    use tempfile::TempDir;
    use time::macros::date;
    use time::{Date, Duration};

    const MONDAY: Date = date!(2025 - 03 - 03);

    fn store() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("routines.json");
        (dir, path)
    }

    fn weekly(days: &[Weekday]) -> Frequency {
        Frequency::Weekly {
            days: days.iter().copied().collect::<BTreeSet<_>>(),
        }
    }

    fn stored_routine(id: &str, frequency: Frequency, completions: Vec<Completion>) -> Routine {
        Routine {
            id: id.to_string(),
            name: "run".to_string(),
            frequency,
            completions,
            color: "#F59E0B".to_string(),
        }
    }

    #[test]
    fn add_routine_writes_to_store() {
        let (_dir, path) = store();
        let added = add_routine_with_path(
            &path,
            NewRoutine {
                name: "  stretch  ".to_string(),
                frequency: weekly(&[Weekday::Monday]),
                color: None,
            },
        )
        .unwrap();
        let loaded = json_store::load_routines(&path).unwrap();

        assert_eq!(added.name, "stretch");
        assert_eq!(added.color, DEFAULT_COLOR);
        assert!(added.id.starts_with("routine-"));
        assert!(added.completions.is_empty());
        assert_eq!(loaded, vec![added]);
    }

    #[test]
    fn add_routine_rejects_invalid_form() {
        let (_dir, path) = store();
        let blank = add_routine_with_path(
            &path,
            NewRoutine {
                name: "  ".to_string(),
                frequency: Frequency::Interval { days: 2 },
                color: None,
            },
        )
        .unwrap_err();
        let no_days = add_routine_with_path(
            &path,
            NewRoutine {
                name: "gym".to_string(),
                frequency: weekly(&[]),
                color: None,
            },
        )
        .unwrap_err();
        let zero = add_routine_with_path(
            &path,
            NewRoutine {
                name: "gym".to_string(),
                frequency: Frequency::Interval { days: 0 },
                color: Some("#22C55E".to_string()),
            },
        )
        .unwrap_err();

        assert_eq!(blank.code(), "invalid_input");
        assert_eq!(no_days.code(), "invalid_input");
        assert_eq!(zero.code(), "invalid_input");
        assert!(!path.exists());
    }

    #[test]
    fn edit_routine_preserves_completions() {
        let (_dir, path) = store();
        let completions = vec![Completion {
            date: MONDAY,
            duration: Some(60),
        }];
        json_store::save_routines(
            &path,
            &[stored_routine(
                "routine-1",
                weekly(&[Weekday::Monday]),
                completions.clone(),
            )],
        )
        .unwrap();

        let updated = edit_routine_with_path(
            &path,
            "routine-1",
            RoutineEdit {
                name: Some("long run".to_string()),
                frequency: Some(Frequency::Interval { days: 3 }),
                color: Some("#ec4899".to_string()),
            },
        )
        .unwrap();
        let loaded = json_store::load_routines(&path).unwrap();

        assert_eq!(updated.name, "long run");
        assert_eq!(updated.frequency, Frequency::Interval { days: 3 });
        assert_eq!(updated.color, "#EC4899");
        assert_eq!(updated.completions, completions);
        assert_eq!(loaded, vec![updated]);
    }

    #[test]
    fn edit_routine_rejects_missing_and_blank_ids() {
        let (_dir, path) = store();
        json_store::save_routines(&path, &[]).unwrap();

        let missing =
            edit_routine_with_path(&path, "routine-9", RoutineEdit::default()).unwrap_err();
        let blank = edit_routine_with_path(&path, "  ", RoutineEdit::default()).unwrap_err();

        assert_eq!(missing.code(), "not_found");
        assert_eq!(blank.code(), "invalid_input");
    }

    #[test]
    fn delete_routine_removes_only_target() {
        let (_dir, path) = store();
        json_store::save_routines(
            &path,
            &[
                stored_routine("routine-1", weekly(&[Weekday::Friday]), Vec::new()),
                stored_routine("routine-2", Frequency::Interval { days: 2 }, Vec::new()),
            ],
        )
        .unwrap();

        let removed = delete_routine_with_path(&path, "routine-1").unwrap();
        let loaded = json_store::load_routines(&path).unwrap();

        assert_eq!(removed.id, "routine-1");
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, "routine-2");
        assert_eq!(
            delete_routine_with_path(&path, "routine-1")
                .unwrap_err()
                .code(),
            "not_found"
        );
    }

    #[test]
    fn complete_routine_persists_and_reports_status() {
        let (_dir, path) = store();
        json_store::save_routines(
            &path,
            &[stored_routine(
                "routine-1",
                weekly(&[Weekday::Monday, Weekday::Wednesday]),
                Vec::new(),
            )],
        )
        .unwrap();

        let overview = complete_routine_with_path(&path, "routine-1", MONDAY, Some(125)).unwrap();
        let loaded = json_store::load_routines(&path).unwrap();

        assert_eq!(overview.due, DueStatus::CompletedToday);
        assert!(overview.status.is_completed_today);
        assert_eq!(
            overview.status.next_due_date,
            Some(MONDAY + Duration::days(2))
        );
        assert_eq!(
            loaded[0].completions,
            vec![Completion {
                date: MONDAY,
                duration: Some(125),
            }]
        );
    }

    #[test]
    fn complete_routine_twice_leaves_store_unchanged() {
        let (_dir, path) = store();
        json_store::save_routines(
            &path,
            &[stored_routine(
                "routine-1",
                Frequency::Interval { days: 1 },
                Vec::new(),
            )],
        )
        .unwrap();

        complete_routine_with_path(&path, "routine-1", MONDAY, None).unwrap();
        let before = std::fs::read_to_string(&path).unwrap();
        let err = complete_routine_with_path(&path, "routine-1", MONDAY, Some(30)).unwrap_err();
        let after = std::fs::read_to_string(&path).unwrap();

        assert_eq!(err.code(), "already_completed");
        assert_eq!(before, after);
    }

    #[test]
    fn list_routines_attaches_status() {
        let (_dir, path) = store();
        json_store::save_routines(
            &path,
            &[
                stored_routine(
                    "routine-1",
                    Frequency::Interval { days: 3 },
                    vec![Completion {
                        date: MONDAY - Duration::days(1),
                        duration: None,
                    }],
                ),
                stored_routine("routine-2", weekly(&[]), Vec::new()),
                stored_routine("routine-3", weekly(&[Weekday::Tuesday]), Vec::new()),
            ],
        )
        .unwrap();

        let listed = list_routines_with_path(&path, MONDAY).unwrap();
        let dues: Vec<DueStatus> = listed.iter().map(|overview| overview.due).collect();

        assert_eq!(
            dues,
            vec![
                DueStatus::DueInDays(2),
                DueStatus::Unscheduled,
                DueStatus::DueTomorrow,
            ]
        );
    }

    #[test]
    fn get_routine_returns_overview() {
        let (_dir, path) = store();
        json_store::save_routines(
            &path,
            &[stored_routine(
                "routine-1",
                Frequency::Interval { days: 3 },
                Vec::new(),
            )],
        )
        .unwrap();

        let overview = get_routine_with_path(&path, " routine-1 ", MONDAY).unwrap();
        assert_eq!(overview.routine.id, "routine-1");
        assert_eq!(overview.due, DueStatus::DueToday);
        assert_eq!(overview.status.progress_percent, 100.0);

        let err = get_routine_with_path(&path, "routine-2", MONDAY).unwrap_err();
        assert_eq!(err.code(), "not_found");
    }
}
