pub mod artifact_reader;
pub mod ndjson_reader;

pub use artifact_reader::{decode_hourly_table, fetch_hourly_table};
pub use ndjson_reader::NdjsonReader;
