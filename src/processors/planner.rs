use crate::error::{ProcessingError, Result};
use crate::models::{Chunk, InventoryPlan};
use crate::storage::ObjectStore;
use crate::utils::constants::PLAN_COMPLETE_MESSAGE;
use crate::utils::keys::source_day_prefix;
use chrono::NaiveDate;
use tracing::{debug, error, info};

/// Lists one day of source files and partitions them into map chunks
pub struct InventoryPlanner {
    chunk_size: usize,
}

impl InventoryPlanner {
    pub fn new(chunk_size: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(ProcessingError::configuration(
                "chunk_size must be a positive integer",
            ));
        }
        Ok(Self { chunk_size })
    }

    /// List `{source_prefix}/{date}/` and split the keys into chunks, keeping listing order
    pub fn plan(
        &self,
        store: &dyn ObjectStore,
        source_prefix: &str,
        date: NaiveDate,
    ) -> Result<InventoryPlan> {
        let prefix = source_day_prefix(source_prefix, date);
        info!("Processing data for {}", date);

        let keys = store.list(&prefix).map_err(|e| {
            error!("Unable to list source files under {}: {}", prefix, e);
            ProcessingError::inventory(&prefix, e)
        })?;

        info!("Found {} files to process under {}", keys.len(), prefix);

        let chunks = partition(keys.clone(), self.chunk_size);
        debug!("Split into {} chunks of at most {}", chunks.len(), self.chunk_size);

        Ok(InventoryPlan {
            chunks,
            message: PLAN_COMPLETE_MESSAGE.to_string(),
            target_date: Some(date),
            file_count: keys.len(),
        })
    }
}

/// Split keys into consecutive chunks of at most `chunk_size`
pub fn partition(keys: Vec<String>, chunk_size: usize) -> Vec<Chunk> {
    keys.chunks(chunk_size.max(1))
        .map(|chunk| chunk.to_vec())
        .collect()
}
