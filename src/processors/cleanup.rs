use crate::error::{ProcessingError, Result};
use crate::models::{CleanupOutput, CleanupRequest};
use crate::storage::ObjectStore;
use tracing::{debug, error, info};

/// Deletes the intermediate artifacts of a finished run
pub struct CleanupSweeper {
    batch_size: Option<usize>,
}

impl CleanupSweeper {
    pub fn new() -> Self {
        Self { batch_size: None }
    }

    /// Cap batches below the store's own bulk-delete limit
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = Some(batch_size.max(1));
        self
    }

    pub fn sweep(&self, store: &dyn ObjectStore, request: &CleanupRequest) -> Result<CleanupOutput> {
        let keys = &request.intermediate_refs;
        let results = request
            .final_artifact_ref
            .as_ref()
            .map(|key| format!("Download results from {}", key));

        if keys.is_empty() {
            info!("No intermediate results to delete");
            return Ok(CleanupOutput {
                deleted: 0,
                message: cleanup_message(request, 0),
                results,
            });
        }

        let store_limit = store.max_delete_batch().max(1);
        let batch_size = self.batch_size.map_or(store_limit, |b| b.min(store_limit));

        let mut failed = Vec::new();
        let mut deleted = 0usize;

        for batch in keys.chunks(batch_size) {
            debug!("Deleting batch of {} intermediate results", batch.len());
            for outcome in store.delete_many(batch) {
                match outcome.result {
                    Ok(()) => deleted += 1,
                    Err(e) => {
                        error!("Unable to delete {}: {}", outcome.key, e);
                        failed.push(outcome.key);
                    }
                }
            }
        }

        if !failed.is_empty() {
            return Err(ProcessingError::Deletion {
                attempted: keys.len(),
                failed,
            });
        }

        info!("Deleted {} intermediate results", deleted);

        Ok(CleanupOutput {
            deleted,
            message: cleanup_message(request, deleted),
            results,
        })
    }
}

impl Default for CleanupSweeper {
    fn default() -> Self {
        Self::new()
    }
}

fn cleanup_message(request: &CleanupRequest, deleted: usize) -> String {
    match &request.message {
        Some(message) => format!("{}. Deleted {} intermediate results", message, deleted),
        None => format!("Deleted {} intermediate results", deleted),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryObjectStore;

    fn request(keys: &[String]) -> CleanupRequest {
        CleanupRequest {
            intermediate_refs: keys.to_vec(),
            final_artifact_ref: Some("etl/output/2024-03-01.csv.gz".to_string()),
            message: Some("Successfully processed data for 2024-03-01".to_string()),
        }
    }

    fn seeded(store: &MemoryObjectStore, count: usize) -> Vec<String> {
        (0..count)
            .map(|i| {
                let key = format!("etl/temp/{:03}.json.gz", i);
                store.insert(key.as_str(), b"x".to_vec());
                key
            })
            .collect()
    }

    #[test]
    fn test_sweep_deletes_only_given_keys_in_batches() {
        let store = MemoryObjectStore::new().with_max_delete_batch(2);
        let keys = seeded(&store, 5);
        store.insert("etl/output/2024-03-01.csv.gz", b"final".to_vec());

        let output = CleanupSweeper::new().sweep(&store, &request(&keys)).unwrap();

        assert_eq!(output.deleted, 5);
        assert_eq!(
            output.results.as_deref(),
            Some("Download results from etl/output/2024-03-01.csv.gz")
        );
        assert!(output.message.starts_with("Successfully processed data for 2024-03-01"));
        assert_eq!(store.keys(), vec!["etl/output/2024-03-01.csv.gz"]);
    }

    #[test]
    fn test_sweep_is_idempotent() {
        let store = MemoryObjectStore::new();
        let keys = seeded(&store, 3);
        let sweeper = CleanupSweeper::new();

        sweeper.sweep(&store, &request(&keys)).unwrap();
        let again = sweeper.sweep(&store, &request(&keys)).unwrap();

        assert_eq!(again.deleted, 3);
        assert!(store.is_empty());
    }

    #[test]
    fn test_partial_failure_lists_every_failed_key() {
        let store = MemoryObjectStore::new();
        let keys = seeded(&store, 4);
        store.fail_on(keys[1].as_str());
        store.fail_on(keys[3].as_str());

        let err = CleanupSweeper::new()
            .with_batch_size(3)
            .sweep(&store, &request(&keys))
            .unwrap_err();

        match err {
            ProcessingError::Deletion { attempted, failed } => {
                assert_eq!(attempted, 4);
                assert_eq!(failed, vec![keys[1].clone(), keys[3].clone()]);
            }
            other => panic!("unexpected error {:?}", other),
        }
        assert!(!store.contains(&keys[0]));
        assert!(!store.contains(&keys[2]));
    }

    #[test]
    fn test_empty_input_is_noop() {
        let store = MemoryObjectStore::new();
        store.insert("etl/temp/keep.json.gz", b"x".to_vec());

        let output = CleanupSweeper::new().sweep(&store, &request(&[])).unwrap();

        assert_eq!(output.deleted, 0);
        assert_eq!(store.len(), 1);
    }
}
