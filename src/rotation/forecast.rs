use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::domain::{CompletionRecord, FairnessMode, MemberId, RotationTask};
use crate::ledger::{average_delay_minutes, effort::MINUTES_PER_DAY};

/// Projection for one rotation candidate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CandidateForecast {
    pub candidate_id: MemberId,
    pub turns_until_turn: usize,
    pub horizon_days: f64,
    pub projected_credit: f64,
}

/// Estimates the credit a member collects from other active chores before
/// their next turn on a given task.
#[derive(Debug, Clone, Copy)]
pub struct ForecastEngine<'a> {
    tasks: &'a [RotationTask],
}

impl<'a> ForecastEngine<'a> {
    pub fn new(tasks: &'a [RotationTask]) -> Self {
        Self { tasks }
    }

    /// Forward distance from the current assignee to `candidate` in `order`,
    /// wrapping. Zero for the assignee and for members outside the order.
    pub fn turns_until_turn(task: &RotationTask, candidate: &MemberId, order: &[MemberId]) -> usize {
        let len = order.len();
        let Some(target) = order.iter().position(|id| id == candidate) else {
            return 0;
        };
        let current = task
            .assignee_id
            .as_ref()
            .and_then(|assignee| order.iter().position(|id| id == assignee))
            .unwrap_or(0);
        (target + len - current) % len
    }

    /// Days until the candidate's turn, shortened by `horizon_reduction_days`
    /// and floored at zero.
    pub fn horizon_days(
        task: &RotationTask,
        candidate: &MemberId,
        order: &[MemberId],
        horizon_reduction_days: f64,
    ) -> f64 {
        let turns = Self::turns_until_turn(task, candidate, order);
        let horizon = turns as f64 * f64::from(task.frequency_days);
        let reduction = if horizon_reduction_days.is_finite() {
            horizon_reduction_days.max(0.0)
        } else {
            0.0
        };
        (horizon - reduction).max(0.0)
    }

    /// Expected credit from every other active task that includes the
    /// candidate: whole occurrences within the horizon times that task's
    /// credit, split evenly across its rotation.
    pub fn projected_credit(
        &self,
        task: &RotationTask,
        candidate: &MemberId,
        order: &[MemberId],
        horizon_reduction_days: f64,
    ) -> f64 {
        if Self::turns_until_turn(task, candidate, order) == 0 {
            return 0.0;
        }
        let horizon = Self::horizon_days(task, candidate, order, horizon_reduction_days);
        self.tasks
            .iter()
            .filter(|other| other.id != task.id && other.is_active && other.includes(candidate))
            .filter(|other| other.frequency_days > 0 && !other.rotation_user_ids.is_empty())
            .map(|other| {
                let occurrences = (horizon / f64::from(other.frequency_days)).floor();
                let contribution =
                    occurrences * other.effort_pimpers / other.rotation_user_ids.len() as f64;
                trace!(task = %other.name, candidate = %candidate, contribution, "forecast contribution");
                contribution
            })
            .sum()
    }

    /// Forecast for every rotation member of `task`, in rotation order.
    /// In `Expected` mode each horizon is shortened by the member's average
    /// historical delay.
    pub fn forecast(
        &self,
        task: &RotationTask,
        mode: FairnessMode,
        completions: &[CompletionRecord],
    ) -> Vec<CandidateForecast> {
        let order = &task.rotation_user_ids;
        order
            .iter()
            .map(|candidate| {
                let reduction = horizon_reduction_days(mode, completions, candidate);
                CandidateForecast {
                    candidate_id: candidate.clone(),
                    turns_until_turn: Self::turns_until_turn(task, candidate, order),
                    horizon_days: Self::horizon_days(task, candidate, order, reduction),
                    projected_credit: self.projected_credit(task, candidate, order, reduction),
                }
            })
            .collect()
    }
}

/// Days removed from the forecast horizon under a fairness mode.
pub fn horizon_reduction_days(
    mode: FairnessMode,
    completions: &[CompletionRecord],
    candidate: &MemberId,
) -> f64 {
    match mode {
        FairnessMode::Expected => average_delay_minutes(completions, candidate) / MINUTES_PER_DAY,
        FairnessMode::Actual | FairnessMode::Projection => 0.0,
    }
}
