use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::RotationTask;

/// Where a task instance stands relative to its due date.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TaskPhase {
    /// Before the due date.
    Scheduled,
    /// Between the due date and the end of the grace period, inclusive.
    Due,
    /// Past the grace period.
    Overdue,
    /// Deactivated; the due date is frozen.
    Paused,
}

impl TaskPhase {
    pub fn classify(task: &RotationTask, now: DateTime<Utc>) -> TaskPhase {
        if !task.is_active {
            return TaskPhase::Paused;
        }
        if now < task.due_at {
            TaskPhase::Scheduled
        } else {
            match task.grace_deadline() {
                Some(deadline) if now > deadline => TaskPhase::Overdue,
                _ => TaskPhase::Due,
            }
        }
    }

    /// Skip and takeover are only accepted once the task is due.
    pub fn is_actionable(self) -> bool {
        matches!(self, TaskPhase::Due | TaskPhase::Overdue)
    }
}

/// Minutes elapsed past due date plus grace, never negative. Zero when the
/// grace window has no representable end.
pub fn delay_minutes(task: &RotationTask, now: DateTime<Utc>) -> i64 {
    task.grace_deadline()
        .map_or(0, |deadline| (now - deadline).num_minutes().max(0))
}
