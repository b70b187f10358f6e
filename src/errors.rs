use thiserror::Error;

use crate::domain::MemberId;

/// Error type that captures failures at the engine's I/O-facing edges.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Invalid snapshot: {0}")]
    Validation(#[from] ValidationError),
    #[error("{0}")]
    Usage(String),
}

/// Raised while turning loosely typed input into strict domain values.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ValidationError {
    #[error("amount must be a finite, non-negative number (got {0})")]
    InvalidAmount(f64),
    #[error("{field} must not be empty")]
    EmptySet { field: &'static str },
    #[error("{field} must be within [{min}, {max}] (got {value})")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("frequency must be at least one day")]
    ZeroFrequency,
    #[error("assignee {0} is not part of the rotation")]
    AssigneeOutsideRotation(MemberId),
    #[error("rotation index {index} out of bounds (len {len})")]
    IndexOutOfBounds { index: usize, len: usize },
    #[error("{field} pushes the schedule past the supported date range")]
    DateOutOfRange { field: &'static str },
}

/// A rotation transition request that the current task state does not permit.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RotationError {
    #[error("{actor} is not the current assignee")]
    NotAssignee { actor: MemberId },
    #[error("{actor} already holds this task; complete it instead")]
    AlreadyAssignee { actor: MemberId },
    #[error("task cannot be completed more than {window_hours}h before it is due")]
    TooEarly { window_hours: i64 },
    #[error("task is not due yet")]
    NotDue,
    #[error("task is inactive")]
    TaskInactive,
    #[error("task has no members in its rotation")]
    EmptyRotation,
    #[error("next due date is past the supported date range")]
    ScheduleOverflow,
}
