#![doc(test(attr(deny(warnings))))]

//! Household Core computes fairness accounting for shared households: money
//! balances and greedy settlement plans for shared expenses, effort credit
//! for chores, and who should take a rotating chore next.
//!
//! Everything below `ledger` and `rotation` is a pure function of the
//! snapshot it is given; persistence and transport belong to the caller.

pub mod config;
pub mod core;
pub mod currency;
pub mod domain;
pub mod errors;
pub mod ledger;
pub mod rotation;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Household Core tracing initialized.");
    });
}
