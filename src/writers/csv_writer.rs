use crate::error::Result;
use crate::models::SummaryTable;
use crate::utils::compression::gzip;

/// Writes the daily summary as gzip-compressed CSV with a header row
pub struct CsvSummaryWriter;

impl CsvSummaryWriter {
    pub fn new() -> Self {
        Self
    }

    /// Encode to uncompressed CSV text
    pub fn to_csv(&self, table: &SummaryTable) -> Result<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());

        writer.write_record(table.columns())?;

        for row in &table.rows {
            let mut record = vec![
                row.date.format("%Y-%m-%d").to_string(),
                row.country.clone(),
                row.city.clone(),
                row.location.clone(),
            ];
            // Missing statistics are written as empty cells
            record.extend(
                table
                    .stat_cells(row)
                    .into_iter()
                    .map(|cell| cell.map(|v| v.to_string()).unwrap_or_default()),
            );
            writer.write_record(&record)?;
        }

        writer.flush()?;
        writer
            .into_inner()
            .map_err(|e| crate::error::ProcessingError::Io(e.into_error()))
    }

    /// Encode to gzip-compressed CSV, the final artifact body
    pub fn encode(&self, table: &SummaryTable) -> Result<Vec<u8>> {
        let csv = self.to_csv(table)?;
        Ok(gzip(&csv)?)
    }
}

impl Default for CsvSummaryWriter {
    fn default() -> Self {
        Self::new()
    }
}
