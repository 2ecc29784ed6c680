use thiserror::Error;

use crate::storage::StoreError;

pub type Result<T> = std::result::Result<T, ProcessingError>;

#[derive(Error, Debug)]
pub enum ProcessingError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Unable to list source files under '{prefix}': {message}")]
    Inventory { prefix: String, message: String },

    #[error("Unable to fetch '{key}': {message}")]
    Fetch { key: String, message: String },

    #[error("Malformed record in '{key}' at line {line}: {message}")]
    Parse {
        key: String,
        line: usize,
        message: String,
    },

    #[error("Aggregation error: {0}")]
    Aggregation(String),

    #[error("Unable to upload '{key}': {message}")]
    Upload { key: String, message: String },

    #[error("Failed to delete {} of {attempted} intermediate artifacts: {}", failed.len(), failed.join(", "))]
    Deletion {
        attempted: usize,
        failed: Vec<String>,
    },

    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV writing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Parquet write error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

impl ProcessingError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn inventory(prefix: impl Into<String>, source: StoreError) -> Self {
        Self::Inventory {
            prefix: prefix.into(),
            message: source.to_string(),
        }
    }

    pub fn fetch(key: impl Into<String>, message: impl ToString) -> Self {
        Self::Fetch {
            key: key.into(),
            message: message.to_string(),
        }
    }

    pub fn parse(key: impl Into<String>, line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            key: key.into(),
            line,
            message: message.into(),
        }
    }

    pub fn aggregation(message: impl Into<String>) -> Self {
        Self::Aggregation(message.into())
    }

    pub fn upload(key: impl Into<String>, source: StoreError) -> Self {
        Self::Upload {
            key: key.into(),
            message: source.to_string(),
        }
    }

    /// Whether the failure came from bad settings rather than from data or storage
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_) | Self::Validation(_))
    }
}

impl From<::config::ConfigError> for ProcessingError {
    fn from(error: ::config::ConfigError) -> Self {
        Self::Configuration(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deletion_error_lists_failed_keys() {
        let error = ProcessingError::Deletion {
            attempted: 3,
            failed: vec!["temp/a.json.gz".to_string(), "temp/b.json.gz".to_string()],
        };

        let message = error.to_string();
        assert!(message.contains("2 of 3"));
        assert!(message.contains("temp/a.json.gz, temp/b.json.gz"));
    }

    #[test]
    fn test_store_errors_keep_key_context() {
        let error = ProcessingError::upload(
            "out/temp/req-1.json.gz",
            StoreError::Unavailable("disk full".to_string()),
        );

        assert!(matches!(error, ProcessingError::Upload { ref key, .. } if key == "out/temp/req-1.json.gz"));
        assert!(error.to_string().contains("disk full"));
        assert!(!error.is_configuration());
        assert!(ProcessingError::configuration("chunk_size").is_configuration());
    }
}
