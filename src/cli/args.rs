use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "openaq-processor")]
#[command(about = "Map-reduce processor for daily OpenAQ air-quality data")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(short, long, global = true, help = "Configuration file (TOML, YAML or JSON)")]
    pub config: Option<PathBuf>,

    #[arg(
        long,
        global = true,
        value_parser = parse_date,
        help = "Day to process, YYYY-MM-DD [default: yesterday in UTC]"
    )]
    pub date: Option<NaiveDate>,

    #[arg(long, global = true, help = "Root directory of the object store")]
    pub store_root: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the day's source files and split them into chunks
    Plan,

    /// Transform one chunk of source files into an intermediate result
    Map {
        #[arg(long, help = "Invocation id naming the intermediate result [default: new UUID]")]
        request_id: Option<String>,

        #[arg(long, help = "JSON array of source keys, '-' for stdin [default: stdin]")]
        event: Option<PathBuf>,
    },

    /// Aggregate all intermediate results into the daily summary
    Reduce {
        #[arg(long, help = "Invocation id [default: new UUID]")]
        request_id: Option<String>,

        #[arg(long, help = "JSON array of map outputs, '-' for stdin [default: stdin]")]
        event: Option<PathBuf>,
    },

    /// Delete the intermediate results of a finished run
    Cleanup {
        #[arg(long, help = "Invocation id [default: new UUID]")]
        request_id: Option<String>,

        #[arg(long, help = "Reduce output JSON, '-' for stdin [default: stdin]")]
        event: Option<PathBuf>,
    },

    /// Run every stage locally, mapping chunks in parallel
    Run {
        #[arg(long, help = "Worker threads [default: number of CPUs]")]
        max_workers: Option<usize>,

        #[arg(long, default_value = "false")]
        keep_intermediate: bool,

        #[arg(short, long, default_value = "false", help = "Hide progress output")]
        quiet: bool,
    },
}

fn parse_date(value: &str) -> std::result::Result<NaiveDate, String> {
    crate::utils::dates::parse_target_date(value).map_err(|e| e.to_string())
}
