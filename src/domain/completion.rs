use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::common::{Identifiable, MemberId};

/// Immutable record of a chore completion; the source of truth for effort credit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompletionRecord {
    pub id: Uuid,
    pub task_id: Uuid,
    pub user_id: MemberId,
    pub completed_at: DateTime<Utc>,
    /// Minutes past due date plus grace period.
    #[serde(default)]
    pub delay_minutes: i64,
    /// Credit after the delay penalty.
    pub pimpers_earned: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
}

impl CompletionRecord {
    pub fn new(
        task_id: Uuid,
        user_id: MemberId,
        completed_at: DateTime<Utc>,
        delay_minutes: i64,
        pimpers_earned: f64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            task_id,
            user_id,
            completed_at,
            delay_minutes: delay_minutes.max(0),
            pimpers_earned,
            rating: None,
        }
    }

    /// Attaches a peer rating, clamped into `1..=5`.
    pub fn with_rating(mut self, rating: u8) -> Self {
        self.rating = Some(rating.clamp(1, 5));
        self
    }

    pub fn was_late(&self) -> bool {
        self.delay_minutes > 0
    }
}

impl Identifiable for CompletionRecord {
    fn id(&self) -> Uuid {
        self.id
    }
}
