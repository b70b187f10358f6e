pub mod balance_service;
pub mod effort_service;
pub mod rotation_service;
pub mod summary_service;

pub use balance_service::BalanceService;
pub use effort_service::EffortService;
pub use rotation_service::RotationService;
pub use summary_service::{HouseholdSummary, SummaryService};

use uuid::Uuid;

use crate::errors::{EngineError, RotationError};

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Rotation(#[from] RotationError),
    #[error("Task not found: {0}")]
    TaskNotFound(Uuid),
}
