mod common;

use std::collections::BTreeMap;

use household_core::{
    core::services::BalanceService,
    currency::Amount,
    domain::{Household, Member, MemberId, SplitTransaction},
    ledger::{apply_transfers, balances, settle, split_evenly, DUST_EPSILON},
};

use common::{at, flat_share, ids};

#[test]
fn shared_dinner_balances_match_hand_calculation() {
    let household = flat_share();
    let balances = BalanceService::money_balances(&household);
    assert_eq!(balances[&MemberId::from("A")], 20.0);
    assert_eq!(balances[&MemberId::from("B")], -10.0);
    assert_eq!(balances[&MemberId::from("C")], -10.0);
}

#[test]
fn balances_always_sum_to_zero() {
    let members = ids(&["A", "B", "C", "D"]);
    let transactions = vec![
        SplitTransaction::try_new(10.0, ["A"], ["A", "B", "C"], at(1, 9)).unwrap(),
        SplitTransaction::try_new(7.77, ["B", "C"], ["A", "D"], at(2, 9)).unwrap(),
        SplitTransaction::try_new(0.01, ["D"], ["A", "B", "C"], at(3, 9)).unwrap(),
        SplitTransaction::try_new(123.45, ["C"], ["A", "B", "C", "D"], at(4, 9)).unwrap(),
    ];
    let result = balances(&transactions, &members);
    let total: f64 = result.values().sum();
    assert!(total.abs() < 1e-9, "balances drifted by {total}");
}

#[test]
fn odd_cents_land_on_lowest_ids() {
    let members = ids(&["C", "A", "B"]);
    let shares = split_evenly(Amount::from_minor(100), members.iter());
    assert_eq!(shares[&MemberId::from("A")], Amount::from_minor(34));
    assert_eq!(shares[&MemberId::from("B")], Amount::from_minor(33));
    assert_eq!(shares[&MemberId::from("C")], Amount::from_minor(33));
}

#[test]
fn settlement_clears_every_balance() {
    let mut input = BTreeMap::new();
    input.insert(MemberId::from("A"), 45.5);
    input.insert(MemberId::from("B"), -12.25);
    input.insert(MemberId::from("C"), -30.0);
    input.insert(MemberId::from("D"), 6.75);
    input.insert(MemberId::from("E"), -10.0);

    let transfers = settle(&input);
    assert!(transfers.len() <= input.len() - 1);
    for transfer in &transfers {
        assert!(transfer.amount > 0.0);
        assert_ne!(transfer.from, transfer.to);
    }
    let after = apply_transfers(&input, &transfers);
    for (id, value) in after {
        assert!(value.abs() < DUST_EPSILON, "{id} left with {value}");
    }
}

#[test]
fn settlement_is_reproducible() {
    let household = flat_share();
    let first = BalanceService::settlement(&household);
    let second = BalanceService::settlement(&household);
    assert_eq!(first, second);
    assert_eq!(first.transfers.len(), 2);
    assert_eq!(first.transfers[0].from, MemberId::from("B"));
    assert_eq!(first.transfers[1].from, MemberId::from("C"));
    assert!(first.transfers.iter().all(|t| t.to == MemberId::from("A")));
    assert!((first.total_moved - 20.0).abs() < 1e-9);
}

#[test]
fn departed_members_still_settle() {
    let mut household = Household::new("Moved out");
    household.add_member(Member::new("A", "Ada"));
    household.add_transaction(SplitTransaction::try_new(20.0, ["A"], ["A", "Z"], at(5, 12)).unwrap());

    let plan = BalanceService::settlement(&household);
    assert_eq!(plan.transfers.len(), 1);
    assert_eq!(plan.transfers[0].from, MemberId::from("Z"));
    assert!(BalanceService::display_balances(&household).contains_key(&MemberId::from("A")));
    assert!(!BalanceService::display_balances(&household).contains_key(&MemberId::from("Z")));
    assert!(BalanceService::unresolved_members(&household).contains(&MemberId::from("Z")));
}

#[test]
fn common_area_split_follows_factors() {
    let mut household = Household::new("Factors");
    household.add_member(Member::new("A", "Ada").with_common_area_factor(2.0).unwrap());
    household.add_member(Member::new("B", "Bo"));
    household.add_member(Member::new("C", "Cy").with_common_area_factor(1.0).unwrap());

    let shares = BalanceService::common_area_split(&household, 100.0).unwrap();
    assert_eq!(shares[&MemberId::from("A")], 50.0);
    assert_eq!(shares[&MemberId::from("B")], 25.0);
    assert_eq!(shares[&MemberId::from("C")], 25.0);
    assert!(BalanceService::common_area_split(&household, f64::NAN).is_none());
}
