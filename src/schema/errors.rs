//! Validation error types
//!
//! A failed validation carries every offending field, not just the first.
//! Each issue is located by a path such as `["body", 0, "year"]`.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;

/// One segment of an issue location
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum LocSegment {
    Key(String),
    Index(usize),
}

impl From<&str> for LocSegment {
    fn from(key: &str) -> Self {
        LocSegment::Key(key.to_string())
    }
}

impl From<usize> for LocSegment {
    fn from(index: usize) -> Self {
        LocSegment::Index(index)
    }
}

impl fmt::Display for LocSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocSegment::Key(key) => write!(f, "{}", key),
            LocSegment::Index(index) => write!(f, "{}", index),
        }
    }
}

/// A single field violation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub loc: Vec<LocSegment>,
    pub msg: String,
}

impl ValidationIssue {
    pub fn new(loc: Vec<LocSegment>, msg: impl Into<String>) -> Self {
        Self {
            loc,
            msg: msg.into(),
        }
    }

    /// Dotted rendering of the location, e.g. `body.0.year`
    pub fn path(&self) -> String {
        self.loc
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(".")
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path(), self.msg)
    }
}

/// Payload rejected by the validator
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{} validation error(s), first at {}", .issues.len(), first_path(.issues))]
pub struct SchemaError {
    pub issues: Vec<ValidationIssue>,
}

fn first_path(issues: &[ValidationIssue]) -> String {
    issues.first().map(ValidationIssue::path).unwrap_or_default()
}

impl SchemaError {
    pub fn new(issues: Vec<ValidationIssue>) -> Self {
        Self { issues }
    }

    /// Error with a single issue
    pub fn single(loc: Vec<LocSegment>, msg: impl Into<String>) -> Self {
        Self::new(vec![ValidationIssue::new(loc, msg)])
    }
}
