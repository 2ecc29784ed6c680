use crate::error::{ProcessingError, Result};
use crate::models::HourlyTable;
use crate::storage::ObjectStore;
use crate::utils::compression::gunzip;
use tracing::{debug, error};

/// Decode an intermediate artifact body (gzip-compressed JSON)
pub fn decode_hourly_table(key: &str, bytes: &[u8]) -> Result<HourlyTable> {
    let json = gunzip(bytes)
        .map_err(|e| ProcessingError::fetch(key, format!("artifact is not valid gzip: {}", e)))?;
    serde_json::from_slice(&json)
        .map_err(|e| ProcessingError::fetch(key, format!("artifact is not a valid hourly table: {}", e)))
}

/// Fetch and decode one intermediate artifact
pub fn fetch_hourly_table(store: &dyn ObjectStore, key: &str) -> Result<HourlyTable> {
    let bytes = store.get(key).map_err(|e| {
        error!("Unable to download intermediate result: {}", key);
        ProcessingError::fetch(key, e)
    })?;

    let table = decode_hourly_table(key, &bytes).inspect_err(|e| {
        error!("Unable to decode intermediate result {}: {}", key, e);
    })?;

    debug!("Fetched {} hourly rows from {}", table.row_count(), key);
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryObjectStore;
    use crate::utils::compression::gzip;

    #[test]
    fn test_decode_rejects_plain_json() {
        let err = decode_hourly_table("etl/temp/x.json.gz", b"{\"rows\": []}").unwrap_err();
        assert!(matches!(err, ProcessingError::Fetch { .. }));
    }

    #[test]
    fn test_decode_rejects_wrong_shape() {
        let bytes = gzip(b"[1, 2, 3]").unwrap();
        let err = decode_hourly_table("etl/temp/x.json.gz", &bytes).unwrap_err();
        assert!(err.to_string().contains("not a valid hourly table"));
    }

    #[test]
    fn test_fetch_missing_artifact_is_fetch_error() {
        let store = MemoryObjectStore::new();
        let err = fetch_hourly_table(&store, "etl/temp/missing.json.gz").unwrap_err();
        match err {
            ProcessingError::Fetch { key, .. } => assert_eq!(key, "etl/temp/missing.json.gz"),
            other => panic!("unexpected error {:?}", other),
        }
    }
}
