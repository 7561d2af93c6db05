//! Scheduling and completion tracking for recurring routines.
//!
//! [`compute_status`] and [`record_completion`] are the pure core; everything
//! under [`routine_api`] wires them to the JSON store.

pub mod config;
pub mod error;
pub mod format;
pub mod model;
pub mod recorder;
pub mod routine_api;
pub mod schedule;
pub mod storage;
pub mod validate;

pub use error::AppError;
pub use recorder::record_completion;
pub use schedule::{DueStatus, RoutineStatus, compute_status};
