//! Applies rotation transitions to an in-memory household snapshot.
//!
//! The scheduler itself is pure; these helpers look tasks up by ID, run the
//! transition, and write the accepted next state back so callers (and the
//! CLI) can work against a single `Household` value.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::domain::{Household, MemberId, RotationTask};
use crate::rotation::{
    preview, CandidateForecast, FairnessContext, ForecastEngine, RotationPreview,
    RotationScheduler, SkipClearance, TaskPhase, TransitionOutcome,
};

use super::{ServiceError, ServiceResult};

pub struct RotationService;

impl RotationService {
    pub fn complete(
        household: &mut Household,
        config: &EngineConfig,
        task_id: Uuid,
        actor: &MemberId,
        now: DateTime<Utc>,
    ) -> ServiceResult<TransitionOutcome> {
        let task = Self::task(household, task_id)?.clone();
        let outcome = {
            let ctx = FairnessContext::from_household(household, config);
            RotationScheduler::new(config).complete(&task, actor, now, &ctx)?
        };
        Self::commit(household, &outcome);
        Ok(outcome)
    }

    pub fn skip(
        household: &mut Household,
        config: &EngineConfig,
        task_id: Uuid,
        actor: &MemberId,
        now: DateTime<Utc>,
        clearance: SkipClearance,
    ) -> ServiceResult<TransitionOutcome> {
        let task = Self::task(household, task_id)?.clone();
        let outcome = {
            let ctx = FairnessContext::from_household(household, config);
            RotationScheduler::new(config).skip(&task, actor, now, clearance, &ctx)?
        };
        Self::commit(household, &outcome);
        Ok(outcome)
    }

    pub fn take_over(
        household: &mut Household,
        config: &EngineConfig,
        task_id: Uuid,
        actor: &MemberId,
        now: DateTime<Utc>,
    ) -> ServiceResult<TransitionOutcome> {
        let task = Self::task(household, task_id)?.clone();
        let outcome = {
            let ctx = FairnessContext::from_household(household, config);
            RotationScheduler::new(config).take_over(&task, actor, now, &ctx)?
        };
        Self::commit(household, &outcome);
        Ok(outcome)
    }

    pub fn set_active(
        household: &mut Household,
        config: &EngineConfig,
        task_id: Uuid,
        active: bool,
    ) -> ServiceResult<()> {
        let scheduler = RotationScheduler::new(config);
        let task = household
            .task_mut(task_id)
            .ok_or(ServiceError::TaskNotFound(task_id))?;
        *task = scheduler.set_active(task, active);
        Ok(())
    }

    pub fn phase(household: &Household, task_id: Uuid, now: DateTime<Utc>) -> ServiceResult<TaskPhase> {
        Ok(TaskPhase::classify(Self::task(household, task_id)?, now))
    }

    pub fn preview(
        household: &Household,
        config: &EngineConfig,
        task_id: Uuid,
    ) -> ServiceResult<RotationPreview> {
        let task = Self::task(household, task_id)?;
        let ctx = FairnessContext::from_household(household, config);
        Ok(preview(task, &ctx))
    }

    /// Forecast for every member of the task's rotation under its own fairness mode.
    pub fn forecast(household: &Household, task_id: Uuid) -> ServiceResult<Vec<CandidateForecast>> {
        let task = Self::task(household, task_id)?;
        Ok(ForecastEngine::new(&household.tasks).forecast(
            task,
            task.fairness_mode,
            &household.completions,
        ))
    }

    fn task(household: &Household, task_id: Uuid) -> ServiceResult<&RotationTask> {
        household
            .task(task_id)
            .ok_or(ServiceError::TaskNotFound(task_id))
    }

    fn commit(household: &mut Household, outcome: &TransitionOutcome) {
        if let Some(task) = household.task_mut(outcome.task.id) {
            *task = outcome.task.clone();
        }
        if let Some(record) = &outcome.completion {
            household.record_completion(record.clone());
        }
    }
}
