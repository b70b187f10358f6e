//! Household domain models shared by the ledgers and the rotation scheduler.

pub mod common;
pub mod completion;
pub mod household;
pub mod member;
pub mod task;
pub mod transaction;

pub use common::{find_by_id, Displayable, Identifiable, MemberId};
pub use completion::CompletionRecord;
pub use household::Household;
pub use member::{find_member, Member};
pub use task::{FairnessMode, RotationTask};
pub use transaction::{SplitTransaction, TransactionKind};
