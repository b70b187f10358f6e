use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::core::memo::Memo;
use crate::domain::{Household, MemberId};
use crate::ledger::{EffortScore, SettlementPlan};
use crate::rotation::{preview, FairnessContext, RotationPreview, TaskPhase};

use super::{BalanceService, EffortService, ServiceError, ServiceResult};

/// Everything the household overview displays, computed in one pass.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HouseholdSummary {
    pub balances: BTreeMap<MemberId, f64>,
    pub settlement: SettlementPlan,
    pub effort: BTreeMap<MemberId, EffortScore>,
    pub rotations: Vec<TaskOverview>,
    /// IDs referenced by entries that no longer resolve to a member.
    pub unresolved_members: BTreeSet<MemberId>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskOverview {
    pub task_id: Uuid,
    pub name: String,
    pub assignee_id: Option<MemberId>,
    pub due_at: DateTime<Utc>,
    pub phase: TaskPhase,
    pub preview: RotationPreview,
}

pub struct SummaryService;

impl SummaryService {
    pub fn summarize(
        household: &Household,
        config: &EngineConfig,
        now: DateTime<Utc>,
    ) -> HouseholdSummary {
        let ctx = FairnessContext::from_household(household, config);
        let rotations = household
            .tasks
            .iter()
            .map(|task| TaskOverview {
                task_id: task.id,
                name: task.name.clone(),
                assignee_id: task.assignee_id.clone(),
                due_at: task.due_at,
                phase: TaskPhase::classify(task, now),
                preview: preview(task, &ctx),
            })
            .collect();

        let effort = EffortService::scores(household)
            .into_iter()
            .filter(|(id, _)| household.member(id).is_some())
            .collect();

        HouseholdSummary {
            balances: BalanceService::display_balances(household),
            settlement: BalanceService::settlement(household),
            effort,
            rotations,
            unresolved_members: BalanceService::unresolved_members(household),
        }
    }

    /// Same as `summarize`, reusing the previous result while the snapshot,
    /// config and clock reading are unchanged.
    pub fn summarize_memoized<'m>(
        memo: &'m mut Memo<HouseholdSummary>,
        household: &Household,
        config: &EngineConfig,
        now: DateTime<Utc>,
    ) -> ServiceResult<&'m HouseholdSummary> {
        memo.get_or_compute(&(household, config, now), || {
            Self::summarize(household, config, now)
        })
        .map_err(ServiceError::from)
    }
}
