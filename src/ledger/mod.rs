//! Money and effort ledgers: even/weighted splitting, balances, greedy
//! settlement, and effort credit.

pub mod effort;
pub mod settlement;
pub mod split;

/// Balances whose magnitude stays below this are treated as settled.
pub const DUST_EPSILON: f64 = 0.004;

/// Lower bound applied to laziness factors before dividing by them.
pub const LAZINESS_FLOOR: f64 = 0.0001;

pub use effort::{
    average_delay_minutes, earned_credit, effort_scores, effort_transaction, raw_credit,
    scaled_score, EffortScore,
};
pub use settlement::{apply_transfers, settle, SettlementPlan, Transfer};
pub use split::{
    balances, common_area_shares, known_balances, split_evenly, split_weighted, unresolved_members,
};
