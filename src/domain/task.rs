use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::common::{Displayable, Identifiable, MemberId};
use crate::errors::ValidationError;

/// Policy that decides which score orders rotation candidates.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum FairnessMode {
    /// Current raw credit.
    #[default]
    Actual,
    /// Raw credit plus credit expected from other chores until the member's turn.
    Projection,
    /// Projection with the horizon shortened by the member's average delay.
    Expected,
}

impl FairnessMode {
    pub const ALL: [FairnessMode; 3] = [
        FairnessMode::Actual,
        FairnessMode::Projection,
        FairnessMode::Expected,
    ];
}

impl fmt::Display for FairnessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FairnessMode::Actual => "actual",
            FairnessMode::Projection => "projection",
            FairnessMode::Expected => "expected",
        };
        f.write_str(label)
    }
}

/// A recurring chore that rotates through an ordered list of members.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RotationTask {
    pub id: Uuid,
    pub name: String,
    /// Theoretical rotation order.
    pub rotation_user_ids: Vec<MemberId>,
    pub assignee_id: Option<MemberId>,
    pub frequency_days: u32,
    /// Nominal credit for an on-time completion.
    pub effort_pimpers: f64,
    #[serde(default)]
    pub grace_period_minutes: i64,
    #[serde(default)]
    pub delay_penalty_per_day: f64,
    #[serde(default)]
    pub prioritize_low_pimpers: bool,
    #[serde(default)]
    pub fairness_mode: FairnessMode,
    #[serde(default = "RotationTask::default_active")]
    pub is_active: bool,
    pub due_at: DateTime<Utc>,
}

impl RotationTask {
    /// Creates an active task assigned to the first member of the rotation.
    pub fn new(
        name: impl Into<String>,
        rotation: Vec<MemberId>,
        frequency_days: u32,
        effort_pimpers: f64,
        due_at: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        if rotation.is_empty() {
            return Err(ValidationError::EmptySet {
                field: "rotation_user_ids",
            });
        }
        if frequency_days == 0 {
            return Err(ValidationError::ZeroFrequency);
        }
        if !effort_pimpers.is_finite() || effort_pimpers <= 0.0 {
            return Err(ValidationError::InvalidAmount(effort_pimpers));
        }
        let assignee_id = rotation.first().cloned();
        Ok(Self {
            id: Uuid::new_v4(),
            name: name.into(),
            rotation_user_ids: rotation,
            assignee_id,
            frequency_days,
            effort_pimpers,
            grace_period_minutes: 0,
            delay_penalty_per_day: 0.0,
            prioritize_low_pimpers: false,
            fairness_mode: FairnessMode::Actual,
            is_active: true,
            due_at,
        })
    }

    pub fn with_grace_period(mut self, minutes: i64) -> Self {
        self.grace_period_minutes = minutes.max(0);
        self
    }

    pub fn with_delay_penalty(mut self, per_day: f64) -> Result<Self, ValidationError> {
        if !per_day.is_finite() || per_day < 0.0 {
            return Err(ValidationError::InvalidAmount(per_day));
        }
        self.delay_penalty_per_day = per_day;
        Ok(self)
    }

    pub fn with_fairness_mode(mut self, mode: FairnessMode) -> Self {
        self.fairness_mode = mode;
        self
    }

    pub fn prioritizing_low_pimpers(mut self, enabled: bool) -> Self {
        self.prioritize_low_pimpers = enabled;
        self
    }

    pub fn with_assignee(mut self, assignee: impl Into<MemberId>) -> Result<Self, ValidationError> {
        let assignee = assignee.into();
        if !self.rotation_user_ids.contains(&assignee) {
            return Err(ValidationError::AssigneeOutsideRotation(assignee));
        }
        self.assignee_id = Some(assignee);
        Ok(self)
    }

    /// `None` when the stored minutes do not fit in a `Duration`.
    pub fn grace_period(&self) -> Option<Duration> {
        Duration::try_minutes(self.grace_period_minutes.max(0))
    }

    pub fn frequency(&self) -> Option<Duration> {
        Duration::try_days(i64::from(self.frequency_days))
    }

    /// End of the grace window; after this instant the task is overdue.
    /// `None` when the window runs past the representable calendar, in which
    /// case the task never becomes overdue.
    pub fn grace_deadline(&self) -> Option<DateTime<Utc>> {
        self.grace_period()
            .and_then(|grace| self.due_at.checked_add_signed(grace))
    }

    /// Due date of the following cycle, if it is representable.
    pub fn next_due_at(&self) -> Option<DateTime<Utc>> {
        self.frequency()
            .and_then(|frequency| self.due_at.checked_add_signed(frequency))
    }

    /// Re-checks what the constructor and builders enforce. Snapshots read
    /// from JSON bypass them, so callers run this at the boundary.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.rotation_user_ids.is_empty() {
            return Err(ValidationError::EmptySet {
                field: "rotation_user_ids",
            });
        }
        if self.frequency_days == 0 {
            return Err(ValidationError::ZeroFrequency);
        }
        if !self.effort_pimpers.is_finite() || self.effort_pimpers <= 0.0 {
            return Err(ValidationError::InvalidAmount(self.effort_pimpers));
        }
        if !self.delay_penalty_per_day.is_finite() || self.delay_penalty_per_day < 0.0 {
            return Err(ValidationError::InvalidAmount(self.delay_penalty_per_day));
        }
        if let Some(assignee) = &self.assignee_id {
            if !self.includes(assignee) {
                return Err(ValidationError::AssigneeOutsideRotation(assignee.clone()));
            }
        }
        if self.grace_deadline().is_none() {
            return Err(ValidationError::DateOutOfRange {
                field: "grace_period_minutes",
            });
        }
        if self.next_due_at().is_none() {
            return Err(ValidationError::DateOutOfRange {
                field: "frequency_days",
            });
        }
        Ok(())
    }

    pub fn position_of(&self, member: &MemberId) -> Option<usize> {
        self.rotation_user_ids.iter().position(|id| id == member)
    }

    pub fn includes(&self, member: &MemberId) -> bool {
        self.position_of(member).is_some()
    }

    pub fn assignee_index(&self) -> Option<usize> {
        self.assignee_id.as_ref().and_then(|id| self.position_of(id))
    }

    /// Moves the member at `from` so that it ends up at index `to`.
    pub fn move_member(&mut self, from: usize, to: usize) -> Result<(), ValidationError> {
        let len = self.rotation_user_ids.len();
        if from >= len {
            return Err(ValidationError::IndexOutOfBounds { index: from, len });
        }
        if to >= len {
            return Err(ValidationError::IndexOutOfBounds { index: to, len });
        }
        let member = self.rotation_user_ids.remove(from);
        self.rotation_user_ids.insert(to, member);
        Ok(())
    }

    /// Appends a member to the end of the rotation; no-op when already present.
    pub fn add_member(&mut self, member: impl Into<MemberId>) {
        let member = member.into();
        if !self.includes(&member) {
            self.rotation_user_ids.push(member);
        }
    }

    /// Removes a member from the rotation. When the member currently holds the
    /// task, it passes to the member that followed them.
    pub fn remove_member(&mut self, member: &MemberId) -> Result<(), ValidationError> {
        let Some(index) = self.position_of(member) else {
            return Ok(());
        };
        if self.rotation_user_ids.len() == 1 {
            return Err(ValidationError::EmptySet {
                field: "rotation_user_ids",
            });
        }
        self.rotation_user_ids.remove(index);
        if self.assignee_id.as_ref() == Some(member) {
            let next = index % self.rotation_user_ids.len();
            self.assignee_id = Some(self.rotation_user_ids[next].clone());
        }
        Ok(())
    }

    fn default_active() -> bool {
        true
    }
}

impl Identifiable for RotationTask {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Displayable for RotationTask {
    fn display_label(&self) -> String {
        format!("{} (every {}d)", self.name, self.frequency_days)
    }
}
