//! Run-level errors.
//!
//! Only structural problems are errors. Placement shortfalls (an
//! unplaced lab, a subject below target, an empty day) are recorded in
//! the generation result and never abort a run.

use thiserror::Error;

use crate::models::GridError;
use crate::validation::ValidationError;

/// Fatal error of a generation run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScheduleError {
    /// The configuration failed structural validation; nothing was allocated.
    #[error("invalid configuration: {}", join(.0))]
    InvalidConfig(Vec<ValidationError>),
    /// A timetable write was rejected after passing placement checks.
    #[error(transparent)]
    Grid(#[from] GridError),
}

impl From<ValidationError> for ScheduleError {
    fn from(error: ValidationError) -> Self {
        ScheduleError::InvalidConfig(vec![error])
    }
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
