use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::LAZINESS_FLOOR;
use crate::domain::{CompletionRecord, Member, MemberId, SplitTransaction, TransactionKind};

pub const MINUTES_PER_DAY: f64 = 1440.0;

/// Accumulated effort for a single member.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct EffortScore {
    pub raw: f64,
    pub scaled: f64,
}

/// Sum of `pimpers_earned` per user. Entries with non-finite or negative
/// credit are skipped.
pub fn raw_credit(completions: &[CompletionRecord]) -> BTreeMap<MemberId, f64> {
    let mut credit: BTreeMap<MemberId, f64> = BTreeMap::new();
    for record in completions {
        if !record.pimpers_earned.is_finite() || record.pimpers_earned < 0.0 {
            warn!(completion = %record.id, "skipping completion with invalid credit");
            continue;
        }
        *credit.entry(record.user_id.clone()).or_insert(0.0) += record.pimpers_earned;
    }
    credit
}

/// Normalizes raw credit by the member's laziness factor.
///
/// The factor is household policy: `1.0` is neutral, lower values inflate the
/// score. Factors at or below zero are floored to `LAZINESS_FLOOR`; there is
/// no separate cap on the result.
pub fn scaled_score(raw: f64, laziness_factor: f64) -> f64 {
    raw / laziness_factor.max(LAZINESS_FLOOR)
}

/// Credit for a completion after the linear per-day lateness penalty,
/// floored at zero.
pub fn earned_credit(effort_pimpers: f64, delay_minutes: i64, delay_penalty_per_day: f64) -> f64 {
    let delay_days = delay_minutes.max(0) as f64 / MINUTES_PER_DAY;
    (effort_pimpers - delay_penalty_per_day * delay_days).max(0.0)
}

/// Raw and scaled score for every member, plus any user that appears only in
/// the completion history (scored with a neutral factor).
pub fn effort_scores(
    completions: &[CompletionRecord],
    members: &[Member],
) -> BTreeMap<MemberId, EffortScore> {
    let credit = raw_credit(completions);
    let mut scores: BTreeMap<MemberId, EffortScore> = members
        .iter()
        .map(|member| {
            let raw = credit.get(&member.id).copied().unwrap_or(0.0);
            (
                member.id.clone(),
                EffortScore {
                    raw,
                    scaled: scaled_score(raw, member.laziness_factor),
                },
            )
        })
        .collect();
    for (id, raw) in credit {
        scores.entry(id).or_insert(EffortScore {
            raw,
            scaled: scaled_score(raw, 1.0),
        });
    }
    scores
}

/// Mean delay in minutes over a user's completions; zero without history.
pub fn average_delay_minutes(completions: &[CompletionRecord], user: &MemberId) -> f64 {
    let (total, count) = completions
        .iter()
        .filter(|record| &record.user_id == user)
        .fold((0i64, 0u32), |(total, count), record| {
            (total + record.delay_minutes.max(0), count + 1)
        });
    if count == 0 {
        0.0
    } else {
        total as f64 / f64::from(count)
    }
}

/// Expresses a completion in the unified split shape: the completer "pays"
/// the earned credit on behalf of everyone sharing the chore.
pub fn effort_transaction<'a, I>(record: &CompletionRecord, beneficiaries: I) -> SplitTransaction
where
    I: IntoIterator<Item = &'a MemberId>,
{
    SplitTransaction {
        id: record.id,
        amount: record.pimpers_earned,
        payer_ids: std::iter::once(record.user_id.clone()).collect(),
        beneficiary_ids: beneficiaries.into_iter().cloned().collect(),
        timestamp: record.completed_at,
        kind: TransactionKind::Effort,
        description: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn record(user: &str, pimpers: f64, delay: i64) -> CompletionRecord {
        CompletionRecord::new(Uuid::new_v4(), MemberId::from(user), Utc::now(), delay, pimpers)
    }

    #[test]
    fn late_completion_is_penalized_per_day() {
        assert_eq!(earned_credit(4.0, 2880, 0.25), 3.5);
        assert_eq!(earned_credit(4.0, 0, 0.25), 4.0);
        assert_eq!(earned_credit(1.0, 14_400, 0.5), 0.0);
        assert_eq!(earned_credit(2.0, -30, 1.0), 2.0);
    }

    #[test]
    fn scaled_score_floors_the_factor() {
        assert_eq!(scaled_score(10.0, 0.5), 20.0);
        assert_eq!(scaled_score(10.0, 1.0), 10.0);
        assert!((scaled_score(10.0, 0.0) - 100_000.0).abs() < 1e-6);
        assert!((scaled_score(10.0, -3.0) - 100_000.0).abs() < 1e-6);
    }

    #[test]
    fn raw_credit_sums_per_user_and_skips_garbage() {
        let completions = vec![
            record("a", 2.0, 0),
            record("b", 1.5, 0),
            record("a", 3.0, 60),
            record("b", f64::NAN, 0),
            record("c", -1.0, 0),
        ];
        let credit = raw_credit(&completions);
        assert_eq!(credit[&MemberId::from("a")], 5.0);
        assert_eq!(credit[&MemberId::from("b")], 1.5);
        assert!(!credit.contains_key(&MemberId::from("c")));
    }

    #[test]
    fn effort_scores_cover_members_and_history() {
        let members = vec![
            Member::new("a", "Ada").with_laziness_factor(0.5).unwrap(),
            Member::new("b", "Bo"),
        ];
        let completions = vec![record("a", 10.0, 0), record("former", 4.0, 0)];
        let scores = effort_scores(&completions, &members);
        assert_eq!(scores[&MemberId::from("a")].scaled, 20.0);
        assert_eq!(scores[&MemberId::from("b")], EffortScore::default());
        assert_eq!(scores[&MemberId::from("former")].scaled, 4.0);
    }

    #[test]
    fn average_delay_ignores_other_users() {
        let completions = vec![record("a", 1.0, 120), record("a", 1.0, 0), record("b", 1.0, 999)];
        assert_eq!(average_delay_minutes(&completions, &MemberId::from("a")), 60.0);
        assert_eq!(average_delay_minutes(&completions, &MemberId::from("z")), 0.0);
    }

    #[test]
    fn effort_transaction_uses_completer_as_payer() {
        let completion = record("a", 3.0, 0);
        let rotation = vec![MemberId::from("a"), MemberId::from("b"), MemberId::from("c")];
        let txn = effort_transaction(&completion, &rotation);
        assert_eq!(txn.kind, TransactionKind::Effort);
        assert_eq!(txn.payer_ids.len(), 1);
        assert_eq!(txn.beneficiary_ids.len(), 3);
        let balances = crate::ledger::split::balances(&[txn], &rotation);
        assert_eq!(balances[&MemberId::from("a")], 2.0);
        assert_eq!(balances[&MemberId::from("b")], -1.0);
    }
}
