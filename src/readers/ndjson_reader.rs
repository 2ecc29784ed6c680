use crate::error::{ProcessingError, Result};
use crate::models::{flatten_one_level, project_columns, Projection, RawRecord, RecordBatch};
use crate::utils::compression::maybe_gunzip_reader;
use crate::utils::constants::DEFAULT_BUFFER_SIZE;
use serde_json::Value;
use std::io::{BufRead, BufReader};
use tracing::debug;

/// Parses newline-delimited JSON source files into record batches
pub struct NdjsonReader {
    buffer_size: usize,
}

impl NdjsonReader {
    pub fn new() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }

    /// Parse one fetched source object. Any malformed line fails the whole file.
    pub fn read_batch(&self, key: &str, bytes: &[u8]) -> Result<RecordBatch> {
        let reader = BufReader::with_capacity(self.buffer_size, maybe_gunzip_reader(bytes));
        let mut batch = RecordBatch::new(key);

        for (index, line_result) in reader.lines().enumerate() {
            let line_number = index + 1;
            let line = line_result.map_err(|e| {
                ProcessingError::parse(key, line_number, format!("unreadable content: {}", e))
            })?;

            // Skip empty lines
            if line.trim().is_empty() {
                continue;
            }

            match self.parse_line(&line).map_err(|message| {
                ProcessingError::parse(key, line_number, message)
            })? {
                Projection::Record(record) => batch.records.push(record),
                Projection::MissingValue => batch.missing_values += 1,
                Projection::MissingKey => batch.missing_keys += 1,
            }
        }

        debug!(
            "Parsed {} records from {} ({} without a value, {} without country or city)",
            batch.len(),
            key,
            batch.missing_values,
            batch.missing_keys
        );

        Ok(batch)
    }

    /// Parse a single JSON line into a projected record
    fn parse_line(&self, line: &str) -> std::result::Result<Projection, String> {
        let value: Value = serde_json::from_str(line).map_err(|e| format!("invalid JSON: {}", e))?;

        let object = match value {
            Value::Object(object) => object,
            _ => return Err("expected a JSON object".to_string()),
        };

        let fields = project_columns(flatten_one_level(object));
        RawRecord::from_flat(&fields)
    }
}

impl Default for NdjsonReader {
    fn default() -> Self {
        Self::new()
    }
}
