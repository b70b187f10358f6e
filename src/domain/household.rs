use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use super::{
    common::{find_by_id, Displayable, Identifiable, MemberId},
    completion::CompletionRecord,
    member::Member,
    task::RotationTask,
    transaction::SplitTransaction,
};
use crate::errors::ValidationError;

const CURRENT_SCHEMA_VERSION: u8 = 1;

/// Immutable snapshot handed to the engine by the data layer.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Household {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default)]
    pub transactions: Vec<SplitTransaction>,
    #[serde(default)]
    pub tasks: Vec<RotationTask>,
    #[serde(default)]
    pub completions: Vec<CompletionRecord>,
    #[serde(default = "Household::schema_version_default")]
    pub schema_version: u8,
}

impl Household {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema_version: CURRENT_SCHEMA_VERSION,
            ..Self::default()
        }
    }

    pub fn add_member(&mut self, member: Member) -> MemberId {
        let id = member.id.clone();
        self.members.push(member);
        id
    }

    pub fn add_transaction(&mut self, transaction: SplitTransaction) -> Uuid {
        let id = transaction.id;
        self.transactions.push(transaction);
        id
    }

    pub fn add_task(&mut self, task: RotationTask) -> Uuid {
        let id = task.id;
        self.tasks.push(task);
        id
    }

    pub fn record_completion(&mut self, record: CompletionRecord) -> Uuid {
        let id = record.id;
        self.completions.push(record);
        id
    }

    pub fn member(&self, id: &MemberId) -> Option<&Member> {
        self.members.iter().find(|member| &member.id == id)
    }

    pub fn member_ids(&self) -> Vec<MemberId> {
        self.members.iter().map(|member| member.id.clone()).collect()
    }

    /// Display label for any member ID, falling back to the ID itself for
    /// people who have left the household.
    pub fn label_for(&self, id: &MemberId) -> String {
        self.member(id)
            .map(Displayable::display_label)
            .unwrap_or_else(|| id.to_string())
    }

    pub fn task(&self, id: Uuid) -> Option<&RotationTask> {
        find_by_id(&self.tasks, id)
    }

    pub fn task_mut(&mut self, id: Uuid) -> Option<&mut RotationTask> {
        self.tasks.iter_mut().find(|task| task.id() == id)
    }

    pub fn completion(&self, id: Uuid) -> Option<&CompletionRecord> {
        find_by_id(&self.completions, id)
    }

    /// Checks members and tasks of a snapshot that did not go through the
    /// builders. Transactions are left alone; invalid ones are skipped when
    /// balances are computed.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for member in &self.members {
            member.validate()?;
        }
        for task in &self.tasks {
            task.validate().map_err(|err| {
                warn!(task = %task.name, %err, "snapshot task rejected");
                err
            })?;
        }
        Ok(())
    }

    pub fn schema_version_default() -> u8 {
        CURRENT_SCHEMA_VERSION
    }
}
