use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::forecast::{horizon_reduction_days, ForecastEngine};
use crate::config::EngineConfig;
use crate::domain::{find_member, CompletionRecord, FairnessMode, Household, Member, MemberId, RotationTask};
use crate::ledger::{raw_credit, scaled_score};

/// Read-only view of the household used to score rotation candidates.
#[derive(Debug, Clone, Copy)]
pub struct FairnessContext<'a> {
    pub members: &'a [Member],
    pub tasks: &'a [RotationTask],
    pub completions: &'a [CompletionRecord],
    /// Divide scores by the member's laziness factor before ranking.
    pub order_by_scaled_score: bool,
}

impl<'a> FairnessContext<'a> {
    pub fn new(
        members: &'a [Member],
        tasks: &'a [RotationTask],
        completions: &'a [CompletionRecord],
    ) -> Self {
        Self {
            members,
            tasks,
            completions,
            order_by_scaled_score: false,
        }
    }

    pub fn from_household(household: &'a Household, config: &EngineConfig) -> Self {
        Self {
            members: &household.members,
            tasks: &household.tasks,
            completions: &household.completions,
            order_by_scaled_score: config.order_by_scaled_score,
        }
    }

    /// Members not found in the snapshot count as available.
    pub fn is_available(&self, id: &MemberId) -> bool {
        find_member(self.members, id).map_or(true, Member::is_available)
    }

    fn laziness_factor(&self, id: &MemberId) -> f64 {
        find_member(self.members, id).map_or(1.0, |member| member.laziness_factor)
    }
}

/// A rotation candidate with the figures used to rank it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RankedCandidate {
    pub member_id: MemberId,
    /// Index in the task's theoretical rotation order.
    pub position: usize,
    pub raw_credit: f64,
    pub projected_credit: f64,
    pub score: f64,
}

/// Candidates ranked ascending by the mode's score; ties keep list order.
/// Members on vacation are left out.
pub fn rank_candidates(
    task: &RotationTask,
    mode: FairnessMode,
    ctx: &FairnessContext<'_>,
) -> Vec<RankedCandidate> {
    let credit = raw_credit(ctx.completions);
    let engine = ForecastEngine::new(ctx.tasks);
    let order = &task.rotation_user_ids;

    let mut ranked: Vec<RankedCandidate> = order
        .iter()
        .enumerate()
        .filter(|(_, id)| ctx.is_available(id))
        .map(|(position, id)| {
            let raw = credit.get(id).copied().unwrap_or(0.0);
            let projected = match mode {
                FairnessMode::Actual => 0.0,
                FairnessMode::Projection | FairnessMode::Expected => {
                    let reduction = horizon_reduction_days(mode, ctx.completions, id);
                    engine.projected_credit(task, id, order, reduction)
                }
            };
            let mut score = raw + projected;
            if ctx.order_by_scaled_score {
                score = scaled_score(score, ctx.laziness_factor(id));
            }
            RankedCandidate {
                member_id: id.clone(),
                position,
                raw_credit: raw,
                projected_credit: projected,
                score,
            }
        })
        .collect();

    ranked.sort_by(|a, b| {
        a.score
            .total_cmp(&b.score)
            .then_with(|| a.position.cmp(&b.position))
    });
    ranked
}

pub fn rotation_order(
    task: &RotationTask,
    mode: FairnessMode,
    ctx: &FairnessContext<'_>,
) -> Vec<MemberId> {
    rank_candidates(task, mode, ctx)
        .into_iter()
        .map(|candidate| candidate.member_id)
        .collect()
}

/// Next member in rotation order after the current assignee, skipping
/// members on vacation while anyone else is available. Starts from the head
/// of the list when the assignee is unset or no longer in the rotation.
pub fn successor(task: &RotationTask, ctx: &FairnessContext<'_>) -> Option<MemberId> {
    let order = &task.rotation_user_ids;
    if order.is_empty() {
        return None;
    }
    let len = order.len();
    let start = task.assignee_index().map_or(0, |index| index + 1);
    (0..len)
        .map(|offset| &order[(start + offset) % len])
        .find(|id| ctx.is_available(id))
        .or_else(|| order.get(start % len))
        .cloned()
}

/// Who should hold the task after the current cycle closes.
///
/// With `prioritize_low_pimpers` the lowest-ranked candidate under the task's
/// fairness mode wins, passing over the outgoing assignee while anyone else is
/// eligible; otherwise the plain successor is used.
pub fn choose_next_assignee(task: &RotationTask, ctx: &FairnessContext<'_>) -> Option<MemberId> {
    if task.prioritize_low_pimpers {
        let outgoing = task.assignee_id.as_ref();
        let pick = rank_candidates(task, task.fairness_mode, ctx)
            .into_iter()
            .map(|candidate| candidate.member_id)
            .find(|id| Some(id) != outgoing);
        if pick.is_some() {
            return pick;
        }
    }
    successor(task, ctx)
}

/// What the UI shows next to a rotating chore.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RotationPreview {
    pub task_id: Uuid,
    pub next_assignee_id: Option<MemberId>,
    pub order_by_mode: BTreeMap<FairnessMode, Vec<MemberId>>,
}

pub fn preview(task: &RotationTask, ctx: &FairnessContext<'_>) -> RotationPreview {
    let order_by_mode = FairnessMode::ALL
        .iter()
        .map(|mode| (*mode, rotation_order(task, *mode, ctx)))
        .collect();
    RotationPreview {
        task_id: task.id,
        next_assignee_id: choose_next_assignee(task, ctx),
        order_by_mode,
    }
}
