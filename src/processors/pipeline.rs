use crate::config::PipelineConfig;
use crate::error::{ProcessingError, Result};
use crate::models::{
    ArtifactReference, CleanupOutput, CleanupRequest, InventoryPlan, MapOutput, ReduceOutput,
};
use crate::processors::{CleanupSweeper, InventoryPlanner, MapTransformer, ReduceAggregator};
use crate::storage::ObjectStore;
use crate::utils::progress::ProgressReporter;
use chrono::NaiveDate;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, info_span};
use uuid::Uuid;

/// Everything one local run produced, stage by stage
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub target_date: NaiveDate,
    pub plan: InventoryPlan,
    pub map_outputs: Vec<MapOutput>,
    pub reduce: ReduceOutput,
    pub cleanup: Option<CleanupOutput>,
}

/// Runs plan, map, reduce and cleanup in one process, mapping chunks on a rayon pool
pub struct LocalPipeline {
    max_workers: usize,
    keep_intermediate: bool,
    quiet: bool,
}

impl LocalPipeline {
    pub fn new(max_workers: usize) -> Self {
        Self {
            max_workers: max_workers.max(1),
            keep_intermediate: false,
            quiet: false,
        }
    }

    pub fn with_keep_intermediate(mut self, keep_intermediate: bool) -> Self {
        self.keep_intermediate = keep_intermediate;
        self
    }

    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    pub fn run(&self, store: &dyn ObjectStore, config: &PipelineConfig) -> Result<PipelineReport> {
        let target_date = config.resolve_target_date();

        let plan = {
            let request_id = new_request_id();
            let _span = info_span!("plan", request_id = %request_id).entered();
            InventoryPlanner::new(config.chunk_size)?.plan(store, &config.source_prefix, target_date)?
        };

        let map_outputs = self.map_chunks(store, config, &plan)?;

        let reduce = {
            let request_id = new_request_id();
            let _span = info_span!("reduce", request_id = %request_id).entered();
            let artifacts: Vec<ArtifactReference> =
                map_outputs.iter().map(ArtifactReference::from).collect();
            ReduceAggregator::new(&config.output_prefix, target_date)
                .with_output_format(config.output_format)
                .with_parquet_compression(&config.parquet_compression)
                .reduce(store, &artifacts)?
        };

        let cleanup = if self.keep_intermediate {
            info!("Keeping {} intermediate results", reduce.intermediate_refs.len());
            None
        } else {
            let request_id = new_request_id();
            let _span = info_span!("cleanup", request_id = %request_id).entered();
            Some(CleanupSweeper::new().sweep(store, &CleanupRequest::from(&reduce))?)
        };

        Ok(PipelineReport {
            target_date,
            plan,
            map_outputs,
            reduce,
            cleanup,
        })
    }

    /// Map every chunk in parallel; the first failure fails the run
    fn map_chunks(
        &self,
        store: &dyn ObjectStore,
        config: &PipelineConfig,
        plan: &InventoryPlan,
    ) -> Result<Vec<MapOutput>> {
        let progress = ProgressReporter::new(
            plan.chunks.len() as u64,
            &format!("Mapping {} chunks...", plan.chunks.len()),
            self.quiet,
        );

        // Configure Rayon thread pool
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.max_workers)
            .build()
            .map_err(|e| ProcessingError::configuration(e.to_string()))?;

        let mapper = MapTransformer::new(&config.output_prefix);

        let outputs: Result<Vec<MapOutput>> = pool.install(|| {
            plan.chunks
                .par_iter()
                .map(|chunk| {
                    let request_id = new_request_id();
                    let _span = info_span!("map", request_id = %request_id).entered();
                    let result = mapper.transform(store, chunk, &request_id);

                    progress.increment(1);

                    result
                })
                .collect()
        });

        let outputs = outputs?;
        progress.finish_with_message(&format!("Mapped {} chunks", outputs.len()));

        Ok(outputs)
    }
}

impl Default for LocalPipeline {
    fn default() -> Self {
        Self::new(num_cpus::get())
    }
}

pub fn new_request_id() -> String {
    Uuid::new_v4().to_string()
}
