//! Car record types and the declarative field table
//!
//! Supported field types:
//! - text
//! - int (with inclusive bounds)
//! - float
//! - bool
//! - list of text

use serde::{Deserialize, Serialize};

/// Engine assigned to newly created cars that do not name one
pub const DEFAULT_ENGINE: &str = "V4";

/// Inclusive bounds on `year`
pub const MIN_YEAR: i64 = 1950;
pub const MAX_YEAR: i64 = 2022;

/// A stored car. Every attribute is optional.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Car {
    pub make: Option<String>,
    pub model: Option<String>,
    pub year: Option<i64>,
    pub price: Option<f64>,
    pub engine: Option<String>,
    pub autonomous: Option<bool>,
    pub sold: Option<Vec<String>>,
}

impl Car {
    /// Build a new car from a validated payload, applying create-time
    /// defaults to fields the caller left out.
    pub fn from_payload(patch: CarPatch) -> Self {
        let base = Car {
            engine: Some(DEFAULT_ENGINE.to_string()),
            ..Default::default()
        };
        base.apply(patch)
    }

    /// Overlay every field present in `patch`. Absent fields keep their
    /// current value; a present `null` clears the field.
    pub fn apply(self, patch: CarPatch) -> Self {
        Car {
            make: patch.make.unwrap_or(self.make),
            model: patch.model.unwrap_or(self.model),
            year: patch.year.unwrap_or(self.year),
            price: patch.price.unwrap_or(self.price),
            engine: patch.engine.unwrap_or(self.engine),
            autonomous: patch.autonomous.unwrap_or(self.autonomous),
            sold: patch.sold.unwrap_or(self.sold),
        }
    }
}

/// The fields a caller explicitly set on a car payload.
///
/// Outer `Option`: was the field present. Inner `Option`: was it null.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CarPatch {
    pub make: Option<Option<String>>,
    pub model: Option<Option<String>>,
    pub year: Option<Option<i64>>,
    pub price: Option<Option<f64>>,
    pub engine: Option<Option<String>>,
    pub autonomous: Option<Option<bool>>,
    pub sold: Option<Option<Vec<String>>>,
}

impl CarPatch {
    /// True when the caller set no recognised field
    pub fn is_empty(&self) -> bool {
        *self == CarPatch::default()
    }
}

/// Type of a declared field
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldType {
    Text,
    Int { min: Option<i64>, max: Option<i64> },
    Float,
    Bool,
    TextList,
}

impl FieldType {
    /// Returns the type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldType::Text => "string",
            FieldType::Int { .. } => "integer",
            FieldType::Float => "float",
            FieldType::Bool => "boolean",
            FieldType::TextList => "list",
        }
    }
}

/// A car attribute. Each variant names exactly one `Car` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CarField {
    Make,
    Model,
    Year,
    Price,
    Engine,
    Autonomous,
    Sold,
}

impl CarField {
    /// Wire name of the attribute
    pub fn name(self) -> &'static str {
        match self {
            CarField::Make => "make",
            CarField::Model => "model",
            CarField::Year => "year",
            CarField::Price => "price",
            CarField::Engine => "engine",
            CarField::Autonomous => "autonomous",
            CarField::Sold => "sold",
        }
    }
}

/// A declared payload field
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldDef {
    pub field: CarField,
    pub field_type: FieldType,
}

impl FieldDef {
    pub fn name(&self) -> &'static str {
        self.field.name()
    }
}

/// Field table for car payloads, in wire order
pub const CAR_FIELDS: &[FieldDef] = &[
    FieldDef { field: CarField::Make, field_type: FieldType::Text },
    FieldDef { field: CarField::Model, field_type: FieldType::Text },
    FieldDef {
        field: CarField::Year,
        field_type: FieldType::Int { min: Some(MIN_YEAR), max: Some(MAX_YEAR) },
    },
    FieldDef { field: CarField::Price, field_type: FieldType::Float },
    FieldDef { field: CarField::Engine, field_type: FieldType::Text },
    FieldDef { field: CarField::Autonomous, field_type: FieldType::Bool },
    FieldDef { field: CarField::Sold, field_type: FieldType::TextList },
];
