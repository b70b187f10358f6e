use serde::{Deserialize, Serialize};

use super::common::{Displayable, MemberId};
use crate::errors::ValidationError;

pub const FACTOR_MIN: f64 = 0.0;
pub const FACTOR_MAX: f64 = 2.0;

/// A household member as seen by the engine. Owned by the household
/// collaborator; the engine never mutates it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Member {
    pub id: MemberId,
    #[serde(default)]
    pub name: String,
    /// Normalizes raw effort into a scaled score. `1.0` is neutral.
    #[serde(default = "Member::neutral_factor")]
    pub laziness_factor: f64,
    #[serde(default)]
    pub vacation_mode: bool,
    /// Weight of this member in common-area cost splitting.
    #[serde(default = "Member::neutral_factor")]
    pub common_area_factor: f64,
}

impl Member {
    pub fn new(id: impl Into<MemberId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            laziness_factor: 1.0,
            vacation_mode: false,
            common_area_factor: 1.0,
        }
    }

    pub fn with_laziness_factor(mut self, factor: f64) -> Result<Self, ValidationError> {
        self.laziness_factor = check_factor("laziness_factor", factor)?;
        Ok(self)
    }

    pub fn with_common_area_factor(mut self, factor: f64) -> Result<Self, ValidationError> {
        self.common_area_factor = check_factor("common_area_factor", factor)?;
        Ok(self)
    }

    pub fn on_vacation(mut self, vacation: bool) -> Self {
        self.vacation_mode = vacation;
        self
    }

    pub fn is_available(&self) -> bool {
        !self.vacation_mode
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        check_factor("laziness_factor", self.laziness_factor)?;
        check_factor("common_area_factor", self.common_area_factor)?;
        Ok(())
    }

    fn neutral_factor() -> f64 {
        1.0
    }
}

impl Displayable for Member {
    /// The member's name, or the raw ID when no name was set.
    fn display_label(&self) -> String {
        if self.name.trim().is_empty() {
            self.id.to_string()
        } else {
            self.name.clone()
        }
    }
}

fn check_factor(field: &'static str, value: f64) -> Result<f64, ValidationError> {
    if value.is_finite() && (FACTOR_MIN..=FACTOR_MAX).contains(&value) {
        Ok(value)
    } else {
        Err(ValidationError::OutOfRange {
            field,
            value,
            min: FACTOR_MIN,
            max: FACTOR_MAX,
        })
    }
}

/// Looks up a member by ID in a snapshot slice.
pub fn find_member<'a>(members: &'a [Member], id: &MemberId) -> Option<&'a Member> {
    members.iter().find(|member| &member.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factors_outside_domain_are_rejected() {
        let err = Member::new("a", "Ada")
            .with_laziness_factor(2.5)
            .expect_err("factor above two");
        assert!(matches!(
            err,
            ValidationError::OutOfRange {
                field: "laziness_factor",
                ..
            }
        ));
        assert!(Member::new("a", "Ada")
            .with_common_area_factor(f64::NAN)
            .is_err());
        assert!(Member::new("a", "Ada").with_laziness_factor(0.0).is_ok());
    }

    #[test]
    fn missing_factors_default_to_neutral() {
        let member: Member = serde_json::from_str(r#"{"id":"m1"}"#).unwrap();
        assert_eq!(member.laziness_factor, 1.0);
        assert_eq!(member.common_area_factor, 1.0);
        assert!(member.is_available());
    }

    #[test]
    fn deserialized_factors_are_rechecked() {
        let member: Member =
            serde_json::from_str(r#"{"id":"m1","laziness_factor":7.0}"#).unwrap();
        assert!(matches!(
            member.validate(),
            Err(ValidationError::OutOfRange {
                field: "laziness_factor",
                ..
            })
        ));
        assert!(Member::new("m2", "Bo").validate().is_ok());
    }
}
