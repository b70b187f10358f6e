use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, warn};

use crate::currency::Amount;
use crate::domain::{Member, MemberId, SplitTransaction};

/// Splits `amount` into equal shares, exact to the minor unit.
///
/// Members are de-duplicated and ordered by ID; the leftover units of the
/// division go one each to the first members in that order, so the shares
/// always add back up to `amount`.
pub fn split_evenly<'a, I>(amount: Amount, members: I) -> BTreeMap<MemberId, Amount>
where
    I: IntoIterator<Item = &'a MemberId>,
{
    let ids: BTreeSet<&MemberId> = members.into_iter().collect();
    if ids.is_empty() {
        return BTreeMap::new();
    }
    let count = ids.len() as i64;
    let total = amount.minor_units();
    let base = total.div_euclid(count);
    let remainder = total.rem_euclid(count);
    ids.into_iter()
        .enumerate()
        .map(|(index, id)| {
            let extra = i64::from((index as i64) < remainder);
            (id.clone(), Amount::from_minor(base + extra))
        })
        .collect()
}

/// Splits `amount` proportionally to non-negative weights using the largest
/// remainder method. Returns `None` when the total weight is zero, so callers
/// can surface the share as unavailable instead of dividing by zero.
pub fn split_weighted(
    amount: Amount,
    weights: &[(MemberId, f64)],
) -> Option<BTreeMap<MemberId, Amount>> {
    let mut merged: BTreeMap<&MemberId, f64> = BTreeMap::new();
    for (id, weight) in weights {
        let weight = if weight.is_finite() && *weight > 0.0 {
            *weight
        } else {
            0.0
        };
        *merged.entry(id).or_insert(0.0) += weight;
    }
    let total_weight: f64 = merged.values().sum();
    if total_weight <= 0.0 {
        return None;
    }

    let total = amount.minor_units();
    let sign = if total < 0 { -1 } else { 1 };
    let magnitude = total.abs();

    let mut shares: BTreeMap<MemberId, i64> = BTreeMap::new();
    let mut fractions: Vec<(f64, &MemberId)> = Vec::with_capacity(merged.len());
    let mut assigned = 0i64;
    for (id, weight) in &merged {
        let exact = magnitude as f64 * weight / total_weight;
        let floor = exact.floor() as i64;
        assigned += floor;
        shares.insert((*id).clone(), floor);
        fractions.push((exact - floor as f64, *id));
    }

    // Largest fractional part first, ID ascending on ties.
    fractions.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(b.1)));
    let leftover = (magnitude - assigned).max(0) as usize;
    for (_, id) in fractions.iter().cycle().take(leftover) {
        if let Some(share) = shares.get_mut(*id) {
            *share += 1;
        }
    }

    Some(
        shares
            .into_iter()
            .map(|(id, units)| (id, Amount::from_minor(sign * units)))
            .collect(),
    )
}

/// Splits a shared common-area cost by each member's `common_area_factor`.
pub fn common_area_shares(amount: Amount, members: &[Member]) -> Option<BTreeMap<MemberId, Amount>> {
    let weights: Vec<(MemberId, f64)> = members
        .iter()
        .map(|member| (member.id.clone(), member.common_area_factor))
        .collect();
    let shares = split_weighted(amount, &weights);
    if shares.is_none() {
        debug!("common-area weights sum to zero; share unavailable");
    }
    shares
}

/// Signed balances per member: paid share minus consumed share.
///
/// Each transaction is split exactly in minor units with `split_evenly`. The
/// part of the amount below one minor unit is spread evenly on top, so small
/// entries keep their full value when summed instead of being rounded one by
/// one.
///
/// Every ID in `member_ids` is present. IDs referenced by transactions but
/// unknown to `member_ids` are kept as well so the totals still net to zero.
pub fn balances(transactions: &[SplitTransaction], member_ids: &[MemberId]) -> BTreeMap<MemberId, f64> {
    let mut balances: BTreeMap<MemberId, f64> =
        member_ids.iter().map(|id| (id.clone(), 0.0)).collect();

    for txn in transactions {
        if !txn.has_valid_amount() {
            warn!(transaction = %txn.id, amount = txn.amount, "excluding transaction with invalid amount");
            continue;
        }
        let Some(units) = Amount::from_major(txn.amount) else {
            warn!(transaction = %txn.id, "excluding transaction with unrepresentable amount");
            continue;
        };
        if txn.payer_ids.is_empty() || txn.beneficiary_ids.is_empty() {
            debug!(transaction = %txn.id, "transaction without payers or beneficiaries contributes nothing");
            continue;
        }
        let residual = txn.amount - units.to_major();
        post_shares(&mut balances, units, residual, &txn.payer_ids, 1.0);
        post_shares(&mut balances, units, residual, &txn.beneficiary_ids, -1.0);
    }

    balances
}

fn post_shares(
    balances: &mut BTreeMap<MemberId, f64>,
    units: Amount,
    residual: f64,
    members: &BTreeSet<MemberId>,
    sign: f64,
) {
    let extra = residual / members.len() as f64;
    for (id, share) in split_evenly(units, members) {
        *balances.entry(id).or_insert(0.0) += sign * (share.to_major() + extra);
    }
}

/// IDs referenced by transactions that do not resolve to a known member.
pub fn unresolved_members(transactions: &[SplitTransaction], members: &[Member]) -> BTreeSet<MemberId> {
    let known: BTreeSet<&MemberId> = members.iter().map(|member| &member.id).collect();
    transactions
        .iter()
        .flat_map(|txn| txn.participants())
        .filter(|id| !known.contains(id))
        .cloned()
        .collect()
}

/// Drops entries that cannot be resolved to a display member.
pub fn known_balances(
    balances: &BTreeMap<MemberId, f64>,
    members: &[Member],
) -> BTreeMap<MemberId, f64> {
    balances
        .iter()
        .filter(|(id, _)| members.iter().any(|member| &member.id == *id))
        .map(|(id, value)| (id.clone(), *value))
        .collect()
}
