//! Rotating chores: phase classification, the assignment state machine,
//! fairness ordering, and forward-looking credit forecasts.

pub mod forecast;
pub mod ordering;
pub mod phase;
pub mod scheduler;

pub use forecast::{CandidateForecast, ForecastEngine};
pub use ordering::{
    choose_next_assignee, preview, rank_candidates, rotation_order, successor, FairnessContext,
    RankedCandidate, RotationPreview,
};
pub use phase::TaskPhase;
pub use scheduler::{RotationScheduler, SkipClearance, Transition, TransitionOutcome};
