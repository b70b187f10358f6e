use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::DUST_EPSILON;
use crate::domain::MemberId;

/// A single point-to-point payment in a settlement plan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transfer {
    pub from: MemberId,
    pub to: MemberId,
    pub amount: f64,
}

/// Settlement plan together with the figures shown next to it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SettlementPlan {
    pub transfers: Vec<Transfer>,
    pub total_moved: f64,
    /// Largest absolute balance left once the plan is applied; always below the dust threshold.
    pub residual: f64,
}

impl SettlementPlan {
    pub fn from_balances(balances: &BTreeMap<MemberId, f64>) -> Self {
        let transfers = settle(balances);
        let total_moved = transfers.iter().map(|transfer| transfer.amount).sum();
        let residual = apply_transfers(balances, &transfers)
            .values()
            .fold(0.0_f64, |acc, value| acc.max(value.abs()));
        Self {
            transfers,
            total_moved,
            residual,
        }
    }

    pub fn is_settled(&self) -> bool {
        self.transfers.is_empty()
    }
}

struct Party<'a> {
    id: &'a MemberId,
    remaining: f64,
}

/// Larger magnitude first, then member ID ascending.
fn by_priority(a: &Party<'_>, b: &Party<'_>) -> Ordering {
    b.remaining
        .total_cmp(&a.remaining)
        .then_with(|| a.id.cmp(b.id))
}

/// Greedy debt simplification.
///
/// Repeatedly pairs the largest creditor with the largest debtor and moves the
/// smaller of the two magnitudes. Each step retires at least one party, so the
/// loop runs at most `creditors + debtors` times. The result is not guaranteed
/// to use the fewest possible transfers.
pub fn settle(balances: &BTreeMap<MemberId, f64>) -> Vec<Transfer> {
    let mut creditors: Vec<Party<'_>> = Vec::new();
    let mut debtors: Vec<Party<'_>> = Vec::new();
    for (id, balance) in balances {
        if !balance.is_finite() {
            continue;
        }
        if *balance > DUST_EPSILON {
            creditors.push(Party {
                id,
                remaining: *balance,
            });
        } else if *balance < -DUST_EPSILON {
            debtors.push(Party {
                id,
                remaining: -*balance,
            });
        }
    }

    let mut transfers = Vec::with_capacity(creditors.len() + debtors.len());
    while !creditors.is_empty() && !debtors.is_empty() {
        creditors.sort_by(by_priority);
        debtors.sort_by(by_priority);

        let amount = creditors[0].remaining.min(debtors[0].remaining);
        if amount > DUST_EPSILON {
            transfers.push(Transfer {
                from: debtors[0].id.clone(),
                to: creditors[0].id.clone(),
                amount,
            });
        }
        creditors[0].remaining -= amount;
        debtors[0].remaining -= amount;

        if creditors[0].remaining <= DUST_EPSILON {
            creditors.remove(0);
        }
        if debtors[0].remaining <= DUST_EPSILON {
            debtors.remove(0);
        }
    }

    debug!(
        transfers = transfers.len(),
        unmatched_creditors = creditors.len(),
        unmatched_debtors = debtors.len(),
        "settlement plan computed"
    );
    transfers
}

/// Applies transfers to balances: the receiver's claim shrinks, the sender's debt shrinks.
pub fn apply_transfers(
    balances: &BTreeMap<MemberId, f64>,
    transfers: &[Transfer],
) -> BTreeMap<MemberId, f64> {
    let mut result = balances.clone();
    for transfer in transfers {
        *result.entry(transfer.to.clone()).or_insert(0.0) -= transfer.amount;
        *result.entry(transfer.from.clone()).or_insert(0.0) += transfer.amount;
    }
    result
}
