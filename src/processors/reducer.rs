use crate::error::{ProcessingError, Result};
use crate::models::{ArtifactReference, ReduceOutput};
use crate::processors::aggregator::DailyAggregator;
use crate::readers::fetch_hourly_table;
use crate::storage::ObjectStore;
use crate::utils::keys::final_key;
use crate::writers::{encode_summary, OutputFormat};
use chrono::NaiveDate;
use tracing::{error, info};

/// Merges every intermediate artifact of a run into the final daily summary
pub struct ReduceAggregator {
    output_prefix: String,
    target_date: NaiveDate,
    output_format: OutputFormat,
    parquet_compression: String,
}

impl ReduceAggregator {
    pub fn new(output_prefix: impl Into<String>, target_date: NaiveDate) -> Self {
        Self {
            output_prefix: output_prefix.into(),
            target_date,
            output_format: OutputFormat::Csv,
            parquet_compression: "snappy".to_string(),
        }
    }

    pub fn with_output_format(mut self, output_format: OutputFormat) -> Self {
        self.output_format = output_format;
        self
    }

    pub fn with_parquet_compression(mut self, compression: impl Into<String>) -> Self {
        self.parquet_compression = compression.into();
        self
    }

    pub fn reduce(
        &self,
        store: &dyn ObjectStore,
        artifacts: &[ArtifactReference],
    ) -> Result<ReduceOutput> {
        let intermediate_refs: Vec<String> = artifacts
            .iter()
            .map(|a| a.processed_artifact_ref.clone())
            .collect();

        info!("Reducing {} intermediate results", intermediate_refs.len());

        let mut tables = Vec::with_capacity(intermediate_refs.len());
        for key in &intermediate_refs {
            tables.push(fetch_hourly_table(store, key)?);
        }

        let summary = DailyAggregator::new(self.target_date)
            .aggregate(&tables)
            .inspect_err(|e| error!("Unable to aggregate data for {}: {}", self.target_date, e))?;

        let output_key = final_key(&self.output_prefix, self.target_date, self.output_format);
        let body = encode_summary(self.output_format, &summary, &self.parquet_compression)?;
        store.put(&output_key, &body).map_err(|e| {
            error!("Unable to upload final result {}: {}", output_key, e);
            ProcessingError::upload(&output_key, e)
        })?;

        info!("Wrote {} daily rows to {}", summary.row_count(), output_key);

        Ok(ReduceOutput {
            final_artifact_ref: output_key,
            intermediate_refs,
            message: format!(
                "Successfully processed data for {}",
                self.target_date.format("%Y-%m-%d")
            ),
            row_count: summary.row_count(),
        })
    }
}
