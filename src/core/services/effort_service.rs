use std::collections::BTreeMap;

use crate::domain::{Household, MemberId};
use crate::ledger::{effort_scores, raw_credit, EffortScore};

pub struct EffortService;

impl EffortService {
    pub fn scores(household: &Household) -> BTreeMap<MemberId, EffortScore> {
        effort_scores(&household.completions, &household.members)
    }

    pub fn raw_credit(household: &Household) -> BTreeMap<MemberId, f64> {
        raw_credit(&household.completions)
    }

    /// Members ordered from least to most scaled credit, ties by ID.
    pub fn leaderboard(household: &Household) -> Vec<(MemberId, EffortScore)> {
        let mut entries: Vec<(MemberId, EffortScore)> = Self::scores(household)
            .into_iter()
            .filter(|(id, _)| household.member(id).is_some())
            .collect();
        entries.sort_by(|a, b| a.1.scaled.total_cmp(&b.1.scaled).then_with(|| a.0.cmp(&b.0)));
        entries
    }
}
