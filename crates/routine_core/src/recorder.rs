use crate::error::AppError;
use crate::model::{Completion, Routine};
use crate::schedule::is_completed_on;
use time::Date;

/// Returns a copy of `routine` with a completion for `today` appended and the
/// history re-sorted newest first. At most one completion per day is allowed.
pub fn record_completion(
    routine: &Routine,
    today: Date,
    duration: Option<u64>,
) -> Result<Routine, AppError> {
    if is_completed_on(routine, today) {
        return Err(AppError::AlreadyCompleted { date: today });
    }

    let mut updated = routine.clone();
    updated.completions.push(Completion {
        date: today,
        duration,
    });
    updated.sort_completions();

    tracing::debug!(
        routine_id = %updated.id,
        date = %today,
        duration = ?duration,
        "recorded completion"
    );

    Ok(updated)
}
