//! Money and effort balances for a household snapshot.

use std::collections::{BTreeMap, BTreeSet};

use crate::currency::Amount;
use crate::domain::{Household, MemberId, SplitTransaction, TransactionKind};
use crate::ledger::{self, effort_transaction, SettlementPlan};

pub struct BalanceService;

impl BalanceService {
    /// Money balances over every expense entry, including IDs of departed members.
    pub fn money_balances(household: &Household) -> BTreeMap<MemberId, f64> {
        let expenses: Vec<SplitTransaction> = household
            .transactions
            .iter()
            .filter(|txn| txn.kind == TransactionKind::Expense)
            .cloned()
            .collect();
        ledger::balances(&expenses, &household.member_ids())
    }

    /// Money balances restricted to members that can be displayed.
    pub fn display_balances(household: &Household) -> BTreeMap<MemberId, f64> {
        ledger::known_balances(&Self::money_balances(household), &household.members)
    }

    pub fn settlement(household: &Household) -> SettlementPlan {
        SettlementPlan::from_balances(&Self::money_balances(household))
    }

    /// Effort balances: each completion is spread over the rotation of the
    /// task it belongs to, plus any effort entries recorded directly.
    pub fn effort_balances(household: &Household) -> BTreeMap<MemberId, f64> {
        let mut entries: Vec<SplitTransaction> = household
            .transactions
            .iter()
            .filter(|txn| txn.kind == TransactionKind::Effort)
            .cloned()
            .collect();
        for record in &household.completions {
            match household.task(record.task_id) {
                Some(task) => entries.push(effort_transaction(record, &task.rotation_user_ids)),
                None => {
                    tracing::debug!(completion = %record.id, "completion for unknown task left out of effort balances")
                }
            }
        }
        ledger::balances(&entries, &household.member_ids())
    }

    /// Splits a common-area cost by each member's common-area factor.
    /// `None` when every factor is zero.
    pub fn common_area_split(household: &Household, amount: f64) -> Option<BTreeMap<MemberId, f64>> {
        let amount = Amount::from_major(amount)?;
        ledger::common_area_shares(amount, &household.members).map(|shares| {
            shares
                .into_iter()
                .map(|(id, share)| (id, share.to_major()))
                .collect()
        })
    }

    pub fn unresolved_members(household: &Household) -> BTreeSet<MemberId> {
        ledger::unresolved_members(&household.transactions, &household.members)
    }
}
