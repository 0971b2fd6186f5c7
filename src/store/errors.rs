//! Record store errors

use thiserror::Error;

use super::CarId;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// No car stored under the identifier
    #[error("Car {0} not found")]
    NotFound(CarId),

    /// Create called with no cars
    #[error("No cars to add")]
    EmptyBatch,

    /// Probing ran past the identifier space
    #[error("No free identifier at or above {0}")]
    IdsExhausted(CarId),

    /// A writer panicked while holding the lock
    #[error("Record store lock poisoned")]
    Poisoned,
}
