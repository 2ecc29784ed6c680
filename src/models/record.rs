use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::utils::constants::{
    CITY_COLUMN, COUNTRY_COLUMN, DATE_UTC_COLUMN, LOCATION_COLUMN, PARAMETER_COLUMN,
    PROJECTED_COLUMNS, UNIT_COLUMN, VALUE_COLUMN,
};

/// A single pollutant observation from a source file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub country: String,
    pub city: String,
    pub location: String,
    pub parameter: String,
    pub value: f64,
    pub unit: Option<String>,
    #[serde(rename = "date.utc")]
    pub timestamp: String,
}

/// Outcome of projecting one flattened JSON object onto [`RawRecord`]
#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    Record(RawRecord),
    /// The observation carries a null value and contributes nothing
    MissingValue,
    /// Country or city is null or absent, so the row has no grouping key
    MissingKey,
}

impl RawRecord {
    pub fn new(
        country: &str,
        city: &str,
        location: &str,
        parameter: &str,
        value: f64,
        timestamp: &str,
    ) -> Self {
        Self {
            country: country.to_string(),
            city: city.to_string(),
            location: location.to_string(),
            parameter: parameter.to_string(),
            value,
            unit: None,
            timestamp: timestamp.to_string(),
        }
    }

    pub fn with_unit(mut self, unit: &str) -> Self {
        self.unit = Some(unit.to_string());
        self
    }

    /// Build a record from a flattened object, keeping only the projected columns
    pub fn from_flat(fields: &Map<String, Value>) -> std::result::Result<Projection, String> {
        let value = match fields.get(VALUE_COLUMN) {
            None => return Err(format!("missing required field '{}'", VALUE_COLUMN)),
            Some(Value::Null) => return Ok(Projection::MissingValue),
            Some(Value::Number(n)) => n
                .as_f64()
                .ok_or_else(|| format!("'{}' is not representable as f64", VALUE_COLUMN))?,
            Some(other) => {
                return Err(format!(
                    "field '{}' must be a number, got {}",
                    VALUE_COLUMN,
                    type_name(other)
                ))
            }
        };

        let (country, city) = match (
            optional_string(fields, COUNTRY_COLUMN)?,
            optional_string(fields, CITY_COLUMN)?,
        ) {
            (Some(country), Some(city)) => (country, city),
            _ => return Ok(Projection::MissingKey),
        };

        // Unit is informational only; anything but a string is dropped
        let unit = match fields.get(UNIT_COLUMN) {
            Some(Value::String(s)) => Some(s.clone()),
            _ => None,
        };

        Ok(Projection::Record(Self {
            country,
            city,
            location: required_string(fields, LOCATION_COLUMN)?,
            parameter: required_string(fields, PARAMETER_COLUMN)?,
            value,
            unit,
            timestamp: required_string(fields, DATE_UTC_COLUMN)?,
        }))
    }
}

/// Flatten nested objects exactly one level deep into dotted keys.
///
/// `{"date": {"utc": "..", "local": ".."}}` becomes `{"date.utc": .., "date.local": ..}`.
/// Objects nested deeper are kept whole under their dotted key.
pub fn flatten_one_level(object: Map<String, Value>) -> Map<String, Value> {
    let mut flat = Map::new();

    for (key, value) in object {
        match value {
            Value::Object(children) => {
                for (child_key, child_value) in children {
                    flat.insert(format!("{}.{}", key, child_key), child_value);
                }
            }
            other => {
                flat.insert(key, other);
            }
        }
    }

    flat
}

/// Drop every field outside the projected column set
pub fn project_columns(mut fields: Map<String, Value>) -> Map<String, Value> {
    fields.retain(|key, _| PROJECTED_COLUMNS.contains(&key.as_str()));
    fields
}

fn required_string(
    fields: &Map<String, Value>,
    name: &str,
) -> std::result::Result<String, String> {
    match optional_string(fields, name)? {
        Some(s) if !s.is_empty() => Ok(s),
        _ => Err(format!("missing required field '{}'", name)),
    }
}

fn optional_string(
    fields: &Map<String, Value>,
    name: &str,
) -> std::result::Result<Option<String>, String> {
    match fields.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(format!(
            "field '{}' must be a string, got {}",
            name,
            type_name(other)
        )),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Records parsed from one source file
#[derive(Debug, Clone, Default)]
pub struct RecordBatch {
    pub source: String,
    pub records: Vec<RawRecord>,
    pub missing_values: usize,
    pub missing_keys: usize,
}

impl RecordBatch {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            records: Vec::new(),
            missing_values: 0,
            missing_keys: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
