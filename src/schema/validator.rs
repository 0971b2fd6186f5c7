//! Car payload validator
//!
//! Validation semantics:
//! - Payload must be a JSON object
//! - Declared fields are type-checked and coerced; undeclared keys are ignored
//! - `null` is accepted for every field and recorded as an explicit clear
//! - `year`, when set, must lie in [1950, 2022]
//! - Every violation is reported, not just the first
//!
//! Coercion is lenient in the same places a form-posting client expects:
//! numeric strings become numbers, integral floats become integers,
//! numbers become text, and the usual true/false spellings become booleans.

use serde_json::{Map, Value};

use super::errors::{LocSegment, SchemaError, SchemaResult, ValidationIssue};
use super::types::{Car, CarField, CarPatch, FieldDef, FieldType, CAR_FIELDS};

/// Parsed create request: the cars to insert and the probe offset.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateRequest {
    pub cars: Vec<Car>,
    pub min_id: i64,
}

/// Largest identifier accepted by read paths
pub const MAX_READ_ID: u64 = 1000;

/// Stateless validator for car payloads.
#[derive(Debug, Clone, Copy, Default)]
pub struct CarValidator;

impl CarValidator {
    pub fn new() -> Self {
        Self
    }

    /// Validates a single car payload and returns the fields it set.
    ///
    /// `loc` is the location of the payload itself; issue locations extend it.
    pub fn validate_patch(&self, payload: &Value, loc: &[LocSegment]) -> SchemaResult<CarPatch> {
        let mut issues = Vec::new();
        let patch = self.collect_patch(payload, loc, &mut issues);
        if issues.is_empty() {
            Ok(patch)
        } else {
            Err(SchemaError::new(issues))
        }
    }

    /// Validates a create body.
    ///
    /// Accepted shapes:
    /// - `[car, ...]`
    /// - `{"body_cars": [car, ...], "min_id": n}` (`cars` is an alias of
    ///   `body_cars`, `min_id` defaults to 0)
    ///
    /// An empty car list is valid here; rejecting it is the caller's job.
    pub fn validate_create(&self, body: &Value) -> SchemaResult<CreateRequest> {
        let root: Vec<LocSegment> = vec!["body".into()];
        let mut issues = Vec::new();

        let (cars_value, cars_loc, min_id) = match body {
            Value::Array(_) => (body, root.clone(), 0),
            Value::Object(obj) => {
                let (key, cars_value) = match (obj.get("body_cars"), obj.get("cars")) {
                    (Some(v), _) => ("body_cars", v),
                    (None, Some(v)) => ("cars", v),
                    (None, None) => {
                        return Err(SchemaError::single(
                            extend(&root, "body_cars"),
                            "field required",
                        ))
                    }
                };
                let min_id = self.min_id(obj, &root, &mut issues);
                (cars_value, extend(&root, key), min_id)
            }
            _ => {
                return Err(SchemaError::single(root, "value is not a valid list"));
            }
        };

        let items = match cars_value {
            Value::Array(items) => items,
            _ => return Err(SchemaError::single(cars_loc, "value is not a valid list")),
        };

        let mut cars = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let item_loc = extend(&cars_loc, index);
            let patch = self.collect_patch(item, &item_loc, &mut issues);
            cars.push(Car::from_payload(patch));
        }

        if issues.is_empty() {
            Ok(CreateRequest { cars, min_id })
        } else {
            Err(SchemaError::new(issues))
        }
    }

    /// Parses an identifier taken from the request path.
    pub fn validate_path_id(&self, raw: &str) -> SchemaResult<u64> {
        let loc = path_id_loc();
        let n = raw
            .trim()
            .parse::<i128>()
            .map_err(|_| SchemaError::single(loc.clone(), "value is not a valid integer"))?;
        if n < 0 {
            return Err(SchemaError::single(
                loc,
                "ensure this value is greater than or equal to 0",
            ));
        }
        u64::try_from(n).map_err(|_| {
            SchemaError::single(
                loc,
                format!("ensure this value is less than or equal to {}", u64::MAX),
            )
        })
    }

    /// Checks a path identifier against the read-path bounds. Identifiers
    /// are unsigned, so only the upper bound needs checking.
    pub fn validate_read_id(&self, id: u64) -> SchemaResult<u64> {
        if id > MAX_READ_ID {
            return Err(SchemaError::single(
                path_id_loc(),
                format!("ensure this value is less than or equal to {}", MAX_READ_ID),
            ));
        }
        Ok(id)
    }

    fn min_id(&self, obj: &Map<String, Value>, root: &[LocSegment], issues: &mut Vec<ValidationIssue>) -> i64 {
        let loc = extend(root, "min_id");
        match obj.get("min_id") {
            None | Some(Value::Null) => 0,
            Some(value) => match coerce_int(value) {
                Some(n) => n,
                None => {
                    issues.push(ValidationIssue::new(loc, "value is not a valid integer"));
                    0
                }
            },
        }
    }

    fn collect_patch(
        &self,
        payload: &Value,
        loc: &[LocSegment],
        issues: &mut Vec<ValidationIssue>,
    ) -> CarPatch {
        let mut patch = CarPatch::default();

        let obj = match payload.as_object() {
            Some(obj) => obj,
            None => {
                issues.push(ValidationIssue::new(loc.to_vec(), "value is not a valid dict"));
                return patch;
            }
        };

        for def in CAR_FIELDS {
            let Some(raw) = obj.get(def.name()) else {
                continue;
            };
            let field_loc = extend(loc, def.name());
            if let Err(issue) = set_field(&mut patch, def, raw, &field_loc) {
                issues.push(issue);
            }
        }

        patch
    }
}

fn extend(loc: &[LocSegment], segment: impl Into<LocSegment>) -> Vec<LocSegment> {
    let mut out = loc.to_vec();
    out.push(segment.into());
    out
}

fn path_id_loc() -> Vec<LocSegment> {
    vec![LocSegment::from("path"), LocSegment::from("id")]
}

/// Coerces `raw` for one declared field and stores it on the patch.
fn set_field(
    patch: &mut CarPatch,
    def: &FieldDef,
    raw: &Value,
    loc: &[LocSegment],
) -> Result<(), ValidationIssue> {
    match def.field {
        CarField::Make => patch.make = Some(coerce_with(def, raw, loc, coerce_text)?),
        CarField::Model => patch.model = Some(coerce_with(def, raw, loc, coerce_text)?),
        CarField::Year => {
            let year = coerce_with(def, raw, loc, coerce_int)?;
            if let Some(n) = year {
                check_bounds(def.field_type, n, loc)?;
            }
            patch.year = Some(year);
        }
        CarField::Price => patch.price = Some(coerce_with(def, raw, loc, coerce_float)?),
        CarField::Engine => patch.engine = Some(coerce_with(def, raw, loc, coerce_text)?),
        CarField::Autonomous => {
            patch.autonomous = Some(coerce_with(def, raw, loc, coerce_bool)?)
        }
        CarField::Sold => patch.sold = Some(coerce_text_list(def, raw, loc)?),
    }
    Ok(())
}

/// `null` becomes `None`; anything else must coerce.
fn coerce_with<T>(
    def: &FieldDef,
    raw: &Value,
    loc: &[LocSegment],
    coerce: fn(&Value) -> Option<T>,
) -> Result<Option<T>, ValidationIssue> {
    if raw.is_null() {
        return Ok(None);
    }
    coerce(raw).map(Some).ok_or_else(|| invalid(def, loc))
}

fn invalid(def: &FieldDef, loc: &[LocSegment]) -> ValidationIssue {
    ValidationIssue::new(
        loc.to_vec(),
        format!("value is not a valid {}", def.field_type.type_name()),
    )
}

fn check_bounds(field_type: FieldType, n: i64, loc: &[LocSegment]) -> Result<(), ValidationIssue> {
    let FieldType::Int { min, max } = field_type else {
        return Ok(());
    };
    if let Some(min) = min {
        if n < min {
            return Err(ValidationIssue::new(
                loc.to_vec(),
                format!("ensure this value is greater than or equal to {}", min),
            ));
        }
    }
    if let Some(max) = max {
        if n > max {
            return Err(ValidationIssue::new(
                loc.to_vec(),
                format!("ensure this value is less than or equal to {}", max),
            ));
        }
    }
    Ok(())
}

fn coerce_text_list(
    def: &FieldDef,
    raw: &Value,
    loc: &[LocSegment],
) -> Result<Option<Vec<String>>, ValidationIssue> {
    if raw.is_null() {
        return Ok(None);
    }
    let items = raw.as_array().ok_or_else(|| invalid(def, loc))?;
    let mut out = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        match coerce_text(item) {
            Some(text) => out.push(text),
            None => {
                return Err(ValidationIssue::new(
                    extend(loc, index),
                    "value is not a valid string",
                ))
            }
        }
    }
    Ok(Some(out))
}

fn coerce_text(raw: &Value) -> Option<String> {
    match raw {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn coerce_int(raw: &Value) -> Option<i64> {
    match raw {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.is_finite() && f.abs() < i64::MAX as f64)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

fn coerce_float(raw: &Value) -> Option<f64> {
    match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

fn coerce_bool(raw: &Value) -> Option<bool> {
    match raw {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_i64() {
            Some(0) => Some(false),
            Some(1) => Some(true),
            _ => None,
        },
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "t" | "yes" | "y" | "on" | "1" => Some(true),
            "false" | "f" | "no" | "n" | "off" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}
