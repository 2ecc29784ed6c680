use crate::error::{ProcessingError, Result};
use crate::models::SummaryTable;
use crate::utils::constants::{
    COMPRESSION_GZIP, COMPRESSION_LZ4, COMPRESSION_NONE, COMPRESSION_SNAPPY, COMPRESSION_ZSTD,
    DEFAULT_ROW_GROUP_SIZE,
};
use arrow::array::{ArrayRef, Date32Array, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::NaiveDate;
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, GzipLevel, ZstdLevel};
use parquet::file::properties::WriterProperties;
use std::sync::Arc;

/// Writes the daily summary as a Parquet object body
pub struct ParquetSummaryWriter {
    compression: Compression,
}

impl ParquetSummaryWriter {
    pub fn new() -> Self {
        Self {
            compression: Compression::SNAPPY,
        }
    }

    pub fn with_compression(mut self, compression: &str) -> Result<Self> {
        self.compression = parse_compression(compression)?;
        Ok(self)
    }

    /// Encode the table into an in-memory Parquet file
    pub fn encode(&self, table: &SummaryTable) -> Result<Vec<u8>> {
        let schema = self.create_schema(table);
        let batch = self.table_to_batch(table, schema.clone())?;

        let props = WriterProperties::builder()
            .set_compression(self.compression)
            .set_max_row_group_size(DEFAULT_ROW_GROUP_SIZE)
            .build();

        let mut writer = ArrowWriter::try_new(Vec::new(), schema, Some(props))?;
        writer.write(&batch)?;
        Ok(writer.into_inner()?)
    }

    /// Key columns followed by one nullable Float64 per pollutant statistic
    fn create_schema(&self, table: &SummaryTable) -> Arc<Schema> {
        let columns = table.columns();
        let mut fields = Vec::with_capacity(columns.len());

        for (index, name) in columns.into_iter().enumerate() {
            let field = match index {
                0 => Field::new(name, DataType::Date32, false),
                1..=3 => Field::new(name, DataType::Utf8, false),
                _ => Field::new(name, DataType::Float64, true),
            };
            fields.push(field);
        }

        Arc::new(Schema::new(fields))
    }

    fn table_to_batch(&self, table: &SummaryTable, schema: Arc<Schema>) -> Result<RecordBatch> {
        let rows = &table.rows;

        let dates: Vec<i32> = rows.iter().map(|r| days_since_epoch(r.date)).collect();
        let countries: Vec<&str> = rows.iter().map(|r| r.country.as_str()).collect();
        let cities: Vec<&str> = rows.iter().map(|r| r.city.as_str()).collect();
        let locations: Vec<&str> = rows.iter().map(|r| r.location.as_str()).collect();

        let mut arrays: Vec<ArrayRef> = vec![
            Arc::new(Date32Array::from(dates)),
            Arc::new(StringArray::from(countries)),
            Arc::new(StringArray::from(cities)),
            Arc::new(StringArray::from(locations)),
        ];

        // Transpose row cells into one column per statistic
        let cells: Vec<Vec<Option<f64>>> = rows.iter().map(|r| table.stat_cells(r)).collect();
        let stat_columns = table.pollutants.len() * 3;
        for column in 0..stat_columns {
            let values: Vec<Option<f64>> = cells.iter().map(|row| row[column]).collect();
            arrays.push(Arc::new(Float64Array::from(values)));
        }

        Ok(RecordBatch::try_new(schema, arrays)?)
    }
}

impl Default for ParquetSummaryWriter {
    fn default() -> Self {
        Self::new()
    }
}

fn days_since_epoch(date: NaiveDate) -> i32 {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or(NaiveDate::MIN);
    (date - epoch).num_days() as i32
}

/// Map a compression name onto a Parquet codec
pub fn parse_compression(compression: &str) -> Result<Compression> {
    let codec = match compression.to_lowercase().as_str() {
        COMPRESSION_SNAPPY => Compression::SNAPPY,
        COMPRESSION_GZIP => Compression::GZIP(GzipLevel::default()),
        COMPRESSION_LZ4 => Compression::LZ4,
        COMPRESSION_ZSTD => Compression::ZSTD(ZstdLevel::default()),
        COMPRESSION_NONE => Compression::UNCOMPRESSED,
        _ => {
            return Err(ProcessingError::configuration(format!(
                "Unsupported compression: {}",
                compression
            )))
        }
    };
    Ok(codec)
}
