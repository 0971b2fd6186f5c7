//! Schema Validator for car payloads
//!
//! Every write passes through [`CarValidator`] before it reaches the store.
//!
//! # Design Principles
//!
//! - Field table is declarative ([`CAR_FIELDS`])
//! - Lenient coercion, strict bounds
//! - Absent and null are distinct, so partial updates can be merged
//! - All violations are collected with their locations

mod errors;
mod types;
mod validator;

pub use errors::{LocSegment, SchemaError, SchemaResult, ValidationIssue};
pub use types::{
    Car, CarField, CarPatch, FieldDef, FieldType, CAR_FIELDS, DEFAULT_ENGINE, MAX_YEAR,
    MIN_YEAR,
};
pub use validator::{CarValidator, CreateRequest, MAX_READ_ID};
