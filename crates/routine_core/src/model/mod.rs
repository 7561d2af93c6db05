mod routine;

pub use routine::{Completion, DEFAULT_COLOR, Frequency, Routine, Weekday};
