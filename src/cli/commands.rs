use crate::cli::args::{Cli, Commands};
use crate::cli::logging::setup_logging;
use crate::config::PipelineConfig;
use crate::models::{ArtifactReference, Chunk, CleanupRequest};
use crate::processors::{
    new_request_id, CleanupSweeper, InventoryPlanner, LocalPipeline, MapTransformer,
    ReduceAggregator,
};
use crate::storage::FsObjectStore;
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;
use tracing::{info, info_span};

pub fn run(cli: Cli) -> Result<()> {
    let config = PipelineConfig::load(cli.config.as_deref())
        .context("Failed to load configuration")?
        .with_target_date(cli.date)
        .with_store_root(cli.store_root.clone());

    setup_logging(&config.log_level, cli.verbose)?;

    let store = FsObjectStore::new(&config.store_root);
    let target_date = config.resolve_target_date();

    match cli.command {
        Commands::Plan => {
            let request_id = new_request_id();
            let _span = info_span!("plan", request_id = %request_id).entered();

            let plan = InventoryPlanner::new(config.chunk_size)?.plan(
                &store,
                &config.source_prefix,
                target_date,
            )?;
            print_json(&plan)
        }

        Commands::Map { request_id, event } => {
            let request_id = request_id.unwrap_or_else(new_request_id);
            let _span = info_span!("map", request_id = %request_id).entered();

            let chunk: Chunk = read_event(event.as_deref())?;
            let output =
                MapTransformer::new(&config.output_prefix).transform(&store, &chunk, &request_id)?;
            print_json(&output)
        }

        Commands::Reduce { request_id, event } => {
            let request_id = request_id.unwrap_or_else(new_request_id);
            let _span = info_span!("reduce", request_id = %request_id).entered();

            let artifacts: Vec<ArtifactReference> = read_event(event.as_deref())?;
            let output = ReduceAggregator::new(&config.output_prefix, target_date)
                .with_output_format(config.output_format)
                .with_parquet_compression(&config.parquet_compression)
                .reduce(&store, &artifacts)?;
            print_json(&output)
        }

        Commands::Cleanup { request_id, event } => {
            let request_id = request_id.unwrap_or_else(new_request_id);
            let _span = info_span!("cleanup", request_id = %request_id).entered();

            let request: CleanupRequest = read_event(event.as_deref())?;
            let output = CleanupSweeper::new().sweep(&store, &request)?;
            print_json(&output)
        }

        Commands::Run {
            max_workers,
            keep_intermediate,
            quiet,
        } => {
            let workers = max_workers.unwrap_or_else(|| config.workers());
            info!(
                "Running pipeline for {} with {} workers under {}",
                target_date,
                workers,
                config.store_root.display()
            );

            let report = LocalPipeline::new(workers)
                .with_keep_intermediate(keep_intermediate)
                .with_quiet(quiet)
                .run(&store, &config.clone().with_target_date(Some(target_date)))?;
            print_json(&report)
        }
    }
}

/// Read a JSON payload from a file, or from stdin when absent or `-`
fn read_event<T: DeserializeOwned>(path: Option<&Path>) -> Result<T> {
    let reader: Box<dyn Read> = match path {
        Some(p) if p != Path::new("-") => Box::new(BufReader::new(
            File::open(p).with_context(|| format!("Failed to open event file {}", p.display()))?,
        )),
        _ => Box::new(io::stdin().lock()),
    };

    serde_json::from_reader(reader).context("Failed to parse event payload")
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MapOutput;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_read_event_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"processed_artifact_ref": "etl/temp/a.json.gz", "row_count": 2, "message": "Mapper phase complete."}}]"#
        )
        .unwrap();

        let refs: Vec<ArtifactReference> = read_event(Some(file.path())).unwrap();
        assert_eq!(refs.len(), 1);

        let outputs: Vec<MapOutput> = read_event(Some(file.path())).unwrap();
        assert_eq!(outputs[0].row_count, 2);
    }

    #[test]
    fn test_read_event_reports_bad_payload() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let err = read_event::<Chunk>(Some(file.path())).unwrap_err();
        assert!(err.to_string().contains("Failed to parse event payload"));
    }
}
