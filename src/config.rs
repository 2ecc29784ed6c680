use crate::error::{ProcessingError, Result};
use crate::utils::constants::{COMPRESSION_SNAPPY, ENV_PREFIX};
use crate::utils::dates::previous_utc_day;
use crate::writers::{parse_compression, OutputFormat};
use chrono::{NaiveDate, Utc};
use ::config::{Config, Environment, File};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use validator::Validate;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Run settings, loaded once at startup and passed to every stage
#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
pub struct PipelineConfig {
    #[validate(length(min = 1))]
    pub source_prefix: String,

    #[validate(length(min = 1))]
    pub output_prefix: String,

    #[validate(range(min = 1))]
    pub chunk_size: usize,

    pub log_level: String,

    #[serde(default = "default_store_root")]
    pub store_root: PathBuf,

    #[serde(default)]
    pub output_format: OutputFormat,

    #[serde(default = "default_parquet_compression")]
    pub parquet_compression: String,

    /// Day to process; yesterday in UTC when unset
    #[serde(default)]
    pub target_date: Option<NaiveDate>,

    /// Worker threads for the local `run` command
    #[serde(default)]
    pub max_workers: Option<usize>,
}

fn default_store_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_parquet_compression() -> String {
    COMPRESSION_SNAPPY.to_string()
}

fn check_log_level(level: &str) -> Result<()> {
    if LOG_LEVELS.contains(&level) {
        Ok(())
    } else {
        Err(ProcessingError::configuration(format!(
            "Unknown log level '{}' (expected one of {})",
            level,
            LOG_LEVELS.join(", ")
        )))
    }
}

impl PipelineConfig {
    /// Load from an optional config file overlaid with `OPENAQ_*` environment variables
    pub fn load(file: Option<&Path>) -> Result<Self> {
        Self::load_with_env(file, None)
    }

    /// As [`PipelineConfig::load`], reading variables from `env` instead of the process environment
    pub fn load_with_env(file: Option<&Path>, env: Option<HashMap<String, String>>) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = file {
            builder = builder.add_source(File::from(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .try_parsing(true)
                .source(env),
        );

        let mut config: PipelineConfig = builder.build()?.try_deserialize()?;
        config.log_level = config.log_level.to_lowercase();
        config.validate()?;
        check_log_level(&config.log_level)?;
        parse_compression(&config.parquet_compression)?;

        Ok(config)
    }

    pub fn with_target_date(mut self, date: Option<NaiveDate>) -> Self {
        if date.is_some() {
            self.target_date = date;
        }
        self
    }

    pub fn with_store_root(mut self, root: Option<PathBuf>) -> Self {
        if let Some(root) = root {
            self.store_root = root;
        }
        self
    }

    /// The configured day, or yesterday in UTC
    pub fn resolve_target_date(&self) -> NaiveDate {
        self.target_date
            .unwrap_or_else(|| previous_utc_day(Utc::now()))
    }

    pub fn workers(&self) -> usize {
        self.max_workers.unwrap_or_else(num_cpus::get).max(1)
    }
}
