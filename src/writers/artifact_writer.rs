use crate::error::{ProcessingError, Result};
use crate::models::HourlyTable;
use crate::utils::compression::gzip;

/// Encode an hourly table as an intermediate artifact body (gzip-compressed JSON).
///
/// JSON has no encoding for NaN or infinity, so a non-finite cell is an error
/// rather than a silently nulled reading.
pub fn encode_hourly_table(table: &HourlyTable) -> Result<Vec<u8>> {
    for row in &table.rows {
        if let Some((parameter, value)) = row.readings.iter().find(|(_, v)| !v.is_finite()) {
            return Err(ProcessingError::aggregation(format!(
                "non-finite {} reading {} for {} at {}",
                parameter, value, row.location, row.timestamp
            )));
        }
    }

    let json = serde_json::to_vec(table)?;
    Ok(gzip(&json)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::HourlyWideRecord;
    use crate::readers::decode_hourly_table;
    use std::collections::BTreeMap;

    fn table_with(value: f64) -> HourlyTable {
        let mut readings = BTreeMap::new();
        readings.insert("o3".to_string(), value);
        HourlyTable::new(
            vec!["o3".to_string(), "pm25".to_string()],
            vec![HourlyWideRecord {
                country: "A".to_string(),
                city: "B".to_string(),
                location: "C".to_string(),
                timestamp: "2024-03-01T10:00:00Z".to_string(),
                readings,
            }],
        )
    }

    #[test]
    fn test_encoded_artifact_decodes_to_same_table() {
        let table = table_with(20.0);

        let bytes = encode_hourly_table(&table).unwrap();
        assert!(crate::utils::compression::is_gzip(&bytes));
        assert_eq!(decode_hourly_table("k", &bytes).unwrap(), table);
    }

    #[test]
    fn test_non_finite_cells_are_refused() {
        for value in [f64::INFINITY, f64::NEG_INFINITY, f64::NAN] {
            let err = encode_hourly_table(&table_with(value)).unwrap_err();
            assert!(matches!(err, ProcessingError::Aggregation(_)), "{:?}", err);
        }
    }
}
