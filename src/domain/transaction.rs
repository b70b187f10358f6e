use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::common::{Identifiable, MemberId};
use crate::errors::ValidationError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum TransactionKind {
    /// A shared expense paid in money.
    #[default]
    Expense,
    /// Chore effort normalized into the split shape.
    Effort,
}

/// Unified shape for finance entries and chore-effort events: `amount` is
/// paid by the payers (evenly) on behalf of the beneficiaries (evenly).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SplitTransaction {
    pub id: Uuid,
    pub amount: f64,
    pub payer_ids: BTreeSet<MemberId>,
    pub beneficiary_ids: BTreeSet<MemberId>,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub kind: TransactionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl SplitTransaction {
    /// Builds a validated transaction. Use this at the boundary where amounts
    /// arrive from forms or JSON.
    pub fn try_new<P, B>(
        amount: f64,
        payers: P,
        beneficiaries: B,
        timestamp: DateTime<Utc>,
    ) -> Result<Self, ValidationError>
    where
        P: IntoIterator,
        P::Item: Into<MemberId>,
        B: IntoIterator,
        B::Item: Into<MemberId>,
    {
        if !amount.is_finite() || amount < 0.0 {
            return Err(ValidationError::InvalidAmount(amount));
        }
        let payer_ids: BTreeSet<MemberId> = payers.into_iter().map(Into::into).collect();
        if payer_ids.is_empty() {
            return Err(ValidationError::EmptySet { field: "payer_ids" });
        }
        let beneficiary_ids: BTreeSet<MemberId> =
            beneficiaries.into_iter().map(Into::into).collect();
        if beneficiary_ids.is_empty() {
            return Err(ValidationError::EmptySet {
                field: "beneficiary_ids",
            });
        }
        Ok(Self {
            id: Uuid::new_v4(),
            amount,
            payer_ids,
            beneficiary_ids,
            timestamp,
            kind: TransactionKind::Expense,
            description: None,
        })
    }

    pub fn with_kind(mut self, kind: TransactionKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// True when the amount can take part in aggregation.
    pub fn has_valid_amount(&self) -> bool {
        self.amount.is_finite() && self.amount >= 0.0
    }

    /// Every member ID this transaction touches, payers first.
    pub fn participants(&self) -> impl Iterator<Item = &MemberId> {
        self.payer_ids.iter().chain(self.beneficiary_ids.iter())
    }
}

impl Identifiable for SplitTransaction {
    fn id(&self) -> Uuid {
        self.id
    }
}
