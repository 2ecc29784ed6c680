use crate::error::{ProcessingError, Result};
use crate::models::{MapOutput, RecordBatch};
use crate::processors::pivot::pivot_records;
use crate::readers::NdjsonReader;
use crate::storage::ObjectStore;
use crate::utils::constants::MAP_COMPLETE_MESSAGE;
use crate::utils::keys::intermediate_key;
use crate::writers::encode_hourly_table;
use tracing::{debug, error, info};

/// Turns one chunk of source files into one intermediate artifact
pub struct MapTransformer {
    output_prefix: String,
    reader: NdjsonReader,
}

impl MapTransformer {
    pub fn new(output_prefix: impl Into<String>) -> Self {
        Self {
            output_prefix: output_prefix.into(),
            reader: NdjsonReader::new(),
        }
    }

    /// Fetch, parse, pivot and upload a chunk. Nothing is uploaded if any file fails.
    pub fn transform(
        &self,
        store: &dyn ObjectStore,
        chunk: &[String],
        request_id: &str,
    ) -> Result<MapOutput> {
        info!("Mapping {} source files", chunk.len());

        let mut batches = Vec::with_capacity(chunk.len());
        for key in chunk {
            batches.push(self.read_source(store, key)?);
        }

        let skipped: usize = batches.iter().map(|b| b.missing_values).sum();
        if skipped > 0 {
            info!("Skipped {} observations without a value", skipped);
        }
        let unkeyed: usize = batches.iter().map(|b| b.missing_keys).sum();
        if unkeyed > 0 {
            info!("Skipped {} observations without a country or city", unkeyed);
        }

        let table = pivot_records(batches.iter().flat_map(|b| b.records.iter()));

        let artifact_key = intermediate_key(&self.output_prefix, request_id);
        let body = encode_hourly_table(&table).inspect_err(|e| {
            error!("Unable to encode intermediate result {}: {}", artifact_key, e);
        })?;
        store.put(&artifact_key, &body).map_err(|e| {
            error!("Unable to upload intermediate result {}: {}", artifact_key, e);
            ProcessingError::upload(&artifact_key, e)
        })?;

        info!(
            "Uploaded {} hourly rows to {}",
            table.row_count(),
            artifact_key
        );

        Ok(MapOutput {
            processed_artifact_ref: artifact_key,
            row_count: table.row_count(),
            message: MAP_COMPLETE_MESSAGE.to_string(),
        })
    }

    fn read_source(&self, store: &dyn ObjectStore, key: &str) -> Result<RecordBatch> {
        let bytes = store.get(key).map_err(|e| {
            error!("Unable to download file: {}", key);
            ProcessingError::fetch(key, e)
        })?;
        debug!("Downloaded {} ({} bytes)", key, bytes.len());

        self.reader.read_batch(key, &bytes).inspect_err(|e| {
            error!("Unable to parse {}: {}", key, e);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::readers::decode_hourly_table;
    use crate::storage::MemoryObjectStore;
    use crate::utils::compression::gzip;

    fn line(location: &str, parameter: &str, value: f64, hour: u32) -> String {
        format!(
            r#"{{"location":"{}","parameter":"{}","date":{{"utc":"2024-03-01T{:02}:00:00.000Z"}},"value":{},"unit":"µg/m³","country":"GB","city":"London"}}"#,
            location, parameter, hour, value
        )
    }

    fn seed(store: &MemoryObjectStore) -> Vec<String> {
        let a = [line("Site A", "pm25", 10.0, 1), line("Site A", "o3", 20.0, 1)].join("\n");
        let b = [line("Site B", "pm25", 5.0, 1), line("Site A", "pm25", 30.0, 1)].join("\n");
        store.insert("src/2024-03-01/a.ndjson.gz", gzip(a.as_bytes()).unwrap());
        store.insert("src/2024-03-01/b.ndjson.gz", gzip(b.as_bytes()).unwrap());
        vec![
            "src/2024-03-01/a.ndjson.gz".to_string(),
            "src/2024-03-01/b.ndjson.gz".to_string(),
        ]
    }

    #[test]
    fn test_transform_uploads_pivoted_artifact() {
        let store = MemoryObjectStore::new();
        let chunk = seed(&store);

        let output = MapTransformer::new("etl")
            .transform(&store, &chunk, "req-1")
            .unwrap();

        assert_eq!(output.processed_artifact_ref, "etl/temp/req-1.json.gz");
        assert_eq!(output.row_count, 2);
        assert_eq!(output.message, "Mapper phase complete.");

        let table =
            decode_hourly_table("k", &store.get("etl/temp/req-1.json.gz").unwrap()).unwrap();
        assert_eq!(table.parameters, vec!["o3", "pm25"]);
        let site_a = &table.rows[0];
        assert_eq!(site_a.location, "Site A");
        assert_eq!(site_a.reading("pm25"), Some(20.0));
        assert_eq!(site_a.reading("o3"), Some(20.0));
    }

    #[test]
    fn test_null_city_contributes_no_row() {
        let store = MemoryObjectStore::new();
        let content = [
            line("Site A", "pm25", 10.0, 1),
            r#"{"location":"X","parameter":"pm25","date":{"utc":"2024-03-01T01:00:00.000Z"},"value":5,"country":"GB","city":null}"#.to_string(),
        ]
        .join("\n");
        store.insert("src/2024-03-01/c.ndjson", content.into_bytes());

        let output = MapTransformer::new("etl")
            .transform(&store, &["src/2024-03-01/c.ndjson".to_string()], "req-1")
            .unwrap();

        assert_eq!(output.row_count, 1);
        let table =
            decode_hourly_table("k", &store.get("etl/temp/req-1.json.gz").unwrap()).unwrap();
        assert_eq!(table.rows[0].location, "Site A");
    }

    #[test]
    fn test_huge_readings_survive_the_artifact() {
        let store = MemoryObjectStore::new();
        let huge = r#"{"location":"Site A","parameter":"pm25","date":{"utc":"2024-03-01T01:00:00.000Z"},"value":1e308,"country":"GB","city":"London"}"#;
        let content = [huge, huge].join("\n");
        store.insert("src/2024-03-01/huge.ndjson", content.into_bytes());

        MapTransformer::new("etl")
            .transform(&store, &["src/2024-03-01/huge.ndjson".to_string()], "req-1")
            .unwrap();

        let table =
            decode_hourly_table("k", &store.get("etl/temp/req-1.json.gz").unwrap()).unwrap();
        assert_eq!(table.rows[0].reading("pm25"), Some(1e308));
    }

    #[test]
    fn test_transform_is_deterministic() {
        let store = MemoryObjectStore::new();
        let chunk = seed(&store);
        let mapper = MapTransformer::new("etl");

        mapper.transform(&store, &chunk, "first").unwrap();
        mapper.transform(&store, &chunk, "second").unwrap();

        assert_eq!(
            store.get("etl/temp/first.json.gz").unwrap(),
            store.get("etl/temp/second.json.gz").unwrap()
        );
    }

    #[test]
    fn test_fetch_failure_uploads_nothing() {
        let store = MemoryObjectStore::new();
        let mut chunk = seed(&store);
        chunk.push("src/2024-03-01/missing.ndjson.gz".to_string());

        let err = MapTransformer::new("etl")
            .transform(&store, &chunk, "req-1")
            .unwrap_err();

        assert!(
            matches!(err, ProcessingError::Fetch { ref key, .. } if key == "src/2024-03-01/missing.ndjson.gz")
        );
        assert!(!store.contains("etl/temp/req-1.json.gz"));
    }

    #[test]
    fn test_parse_failure_uploads_nothing() {
        let store = MemoryObjectStore::new();
        let mut chunk = seed(&store);
        store.insert("src/2024-03-01/bad.ndjson", b"{\"location\": 1".to_vec());
        chunk.push("src/2024-03-01/bad.ndjson".to_string());

        let err = MapTransformer::new("etl")
            .transform(&store, &chunk, "req-1")
            .unwrap_err();

        assert!(matches!(err, ProcessingError::Parse { line: 1, .. }));
        assert!(!store.contains("etl/temp/req-1.json.gz"));
    }

    #[test]
    fn test_upload_failure_is_reported() {
        let store = MemoryObjectStore::new();
        let chunk = seed(&store);
        store.fail_on("etl/temp/req-1.json.gz");

        let err = MapTransformer::new("etl")
            .transform(&store, &chunk, "req-1")
            .unwrap_err();

        assert!(matches!(err, ProcessingError::Upload { .. }));
    }

    #[test]
    fn test_empty_chunk_uploads_zero_row_artifact() {
        let store = MemoryObjectStore::new();

        let output = MapTransformer::new("etl")
            .transform(&store, &[], "req-empty")
            .unwrap();

        assert_eq!(output.row_count, 0);
        let table =
            decode_hourly_table("k", &store.get("etl/temp/req-empty.json.gz").unwrap()).unwrap();
        assert!(table.is_empty());
    }
}
