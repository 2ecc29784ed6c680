pub mod artifact_writer;
pub mod csv_writer;
pub mod parquet_writer;

pub use artifact_writer::encode_hourly_table;
pub use csv_writer::CsvSummaryWriter;
pub use parquet_writer::{parse_compression, ParquetSummaryWriter};

use crate::error::Result;
use crate::models::SummaryTable;
use serde::{Deserialize, Serialize};

/// Encoding of the final artifact
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Csv,
    Parquet,
}

impl OutputFormat {
    /// File extension used in the final artifact key
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv.gz",
            OutputFormat::Parquet => "parquet",
        }
    }
}

/// Encode the daily summary in the requested format
pub fn encode_summary(
    format: OutputFormat,
    table: &SummaryTable,
    parquet_compression: &str,
) -> Result<Vec<u8>> {
    match format {
        OutputFormat::Csv => CsvSummaryWriter::new().encode(table),
        OutputFormat::Parquet => ParquetSummaryWriter::new()
            .with_compression(parquet_compression)?
            .encode(table),
    }
}
