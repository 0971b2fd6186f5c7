//! Record Store
//!
//! Holds cars for the lifetime of the process. Nothing is persisted.

mod car_store;
mod errors;

pub use car_store::CarStore;
pub use errors::{StoreError, StoreResult};

/// Identifier of a stored car
pub type CarId = u64;
