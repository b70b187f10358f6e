use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::ordering::{choose_next_assignee, FairnessContext};
use super::phase::{delay_minutes, TaskPhase};
use crate::config::EngineConfig;
use crate::domain::{CompletionRecord, MemberId, RotationTask};
use crate::errors::RotationError;
use crate::ledger::earned_credit;

/// Upper bound for the configured early-completion window (ten years).
const MAX_EARLY_WINDOW_HOURS: i64 = 87_600;

/// Proof that the caller's anti-automation gate accepted a skip request.
///
/// The engine never checks the challenge itself; it only refuses to skip
/// without this token.
#[derive(Debug)]
pub struct SkipClearance {
    _private: (),
}

impl SkipClearance {
    /// To be called by the gate once the challenge has been passed.
    pub fn granted() -> Self {
        Self { _private: () }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Transition {
    Completed,
    Skipped,
    TakenOver,
}

/// Result of an accepted transition: the next task state and, for completions
/// and takeovers, the record to persist.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionOutcome {
    pub transition: Transition,
    pub task: RotationTask,
    pub completion: Option<CompletionRecord>,
    pub previous_assignee: Option<MemberId>,
}

/// Rotation state machine. Holds only policy; every call is a pure function
/// of the prior task state.
#[derive(Debug, Clone)]
pub struct RotationScheduler {
    early_completion_window: Duration,
}

impl Default for RotationScheduler {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl RotationScheduler {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            early_completion_window: Duration::hours(
                config
                    .early_completion_window_hours
                    .clamp(0, MAX_EARLY_WINDOW_HOURS),
            ),
        }
    }

    pub fn phase(&self, task: &RotationTask, now: DateTime<Utc>) -> TaskPhase {
        TaskPhase::classify(task, now)
    }

    /// The current assignee finishes the chore. Accepted from
    /// `early_completion_window` before the due date onwards.
    pub fn complete(
        &self,
        task: &RotationTask,
        actor: &MemberId,
        now: DateTime<Utc>,
        ctx: &FairnessContext<'_>,
    ) -> Result<TransitionOutcome, RotationError> {
        ensure_runnable(task)?;
        ensure_assignee(task, actor)?;
        let opens_at = task.due_at.checked_sub_signed(self.early_completion_window);
        if opens_at.is_some_and(|opens_at| now < opens_at) {
            return Err(RotationError::TooEarly {
                window_hours: self.early_completion_window.num_hours(),
            });
        }
        let record = completion_record(task, actor, now);
        info!(task = %task.name, user = %actor, pimpers = record.pimpers_earned, "task completed");
        self.close_cycle(task, Transition::Completed, Some(record), ctx)
    }

    /// The current assignee passes on this cycle without credit. Only while
    /// the task is due or overdue.
    pub fn skip(
        &self,
        task: &RotationTask,
        actor: &MemberId,
        now: DateTime<Utc>,
        _clearance: SkipClearance,
        ctx: &FairnessContext<'_>,
    ) -> Result<TransitionOutcome, RotationError> {
        ensure_runnable(task)?;
        ensure_assignee(task, actor)?;
        if !TaskPhase::classify(task, now).is_actionable() {
            return Err(RotationError::NotDue);
        }
        info!(task = %task.name, user = %actor, "task skipped");
        self.close_cycle(task, Transition::Skipped, None, ctx)
    }

    /// Someone other than the assignee does a due chore. The taker earns the
    /// credit; the rotation advances exactly as for a completion by the
    /// assignee, so the assignee keeps their place.
    pub fn take_over(
        &self,
        task: &RotationTask,
        actor: &MemberId,
        now: DateTime<Utc>,
        ctx: &FairnessContext<'_>,
    ) -> Result<TransitionOutcome, RotationError> {
        ensure_runnable(task)?;
        if task.assignee_id.as_ref() == Some(actor) {
            return Err(RotationError::AlreadyAssignee {
                actor: actor.clone(),
            });
        }
        if !TaskPhase::classify(task, now).is_actionable() {
            return Err(RotationError::NotDue);
        }
        let record = completion_record(task, actor, now);
        info!(task = %task.name, user = %actor, "task taken over");
        self.close_cycle(task, Transition::TakenOver, Some(record), ctx)
    }

    /// Deactivation freezes the due date; reactivation resumes from it.
    pub fn set_active(&self, task: &RotationTask, active: bool) -> RotationTask {
        let mut next = task.clone();
        if next.is_active != active {
            debug!(task = %task.name, active, "task activity toggled");
        }
        next.is_active = active;
        next
    }

    fn close_cycle(
        &self,
        task: &RotationTask,
        transition: Transition,
        completion: Option<CompletionRecord>,
        ctx: &FairnessContext<'_>,
    ) -> Result<TransitionOutcome, RotationError> {
        let next_due_at = task.next_due_at().ok_or(RotationError::ScheduleOverflow)?;
        let next_assignee = match &completion {
            Some(record) if task.prioritize_low_pimpers => {
                let mut completions = ctx.completions.to_vec();
                completions.push(record.clone());
                let extended = FairnessContext {
                    completions: &completions,
                    ..*ctx
                };
                choose_next_assignee(task, &extended)
            }
            _ => choose_next_assignee(task, ctx),
        };

        let mut next = task.clone();
        next.due_at = next_due_at;
        next.assignee_id = next_assignee;
        debug!(
            task = %task.name,
            ?transition,
            next_assignee = ?next.assignee_id,
            due_at = %next.due_at,
            "rotation advanced"
        );
        Ok(TransitionOutcome {
            transition,
            task: next,
            completion,
            previous_assignee: task.assignee_id.clone(),
        })
    }
}

fn ensure_runnable(task: &RotationTask) -> Result<(), RotationError> {
    if !task.is_active {
        return Err(RotationError::TaskInactive);
    }
    if task.rotation_user_ids.is_empty() {
        return Err(RotationError::EmptyRotation);
    }
    Ok(())
}

fn ensure_assignee(task: &RotationTask, actor: &MemberId) -> Result<(), RotationError> {
    if task.assignee_id.as_ref() == Some(actor) {
        Ok(())
    } else {
        Err(RotationError::NotAssignee {
            actor: actor.clone(),
        })
    }
}

fn completion_record(task: &RotationTask, actor: &MemberId, now: DateTime<Utc>) -> CompletionRecord {
    let delay = delay_minutes(task, now);
    let pimpers = earned_credit(task.effort_pimpers, delay, task.delay_penalty_per_day);
    CompletionRecord::new(task.id, actor.clone(), now, delay, pimpers)
}
