use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Grouping key of the pivoted table
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HourlyKey {
    pub country: String,
    pub city: String,
    pub location: String,
    pub timestamp: String,
}

/// One wide-form row: every pollutant reading for a location at one instant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyWideRecord {
    pub country: String,
    pub city: String,
    pub location: String,
    #[serde(rename = "date.utc")]
    pub timestamp: String,
    /// Pollutant name to reading; an absent pollutant is a missing reading
    #[serde(default)]
    pub readings: BTreeMap<String, f64>,
}

impl HourlyWideRecord {
    pub fn from_key(key: HourlyKey, readings: BTreeMap<String, f64>) -> Self {
        Self {
            country: key.country,
            city: key.city,
            location: key.location,
            timestamp: key.timestamp,
            readings,
        }
    }

    pub fn reading(&self, parameter: &str) -> Option<f64> {
        self.readings.get(parameter).copied()
    }
}

/// Serialized body of an intermediate artifact
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HourlyTable {
    /// Union of pollutant columns seen in the chunk, sorted
    #[serde(default)]
    pub parameters: Vec<String>,
    #[serde(default)]
    pub rows: Vec<HourlyWideRecord>,
}

impl HourlyTable {
    pub fn new(parameters: Vec<String>, rows: Vec<HourlyWideRecord>) -> Self {
        Self { parameters, rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
