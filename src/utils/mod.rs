pub mod compression;
pub mod constants;
pub mod dates;
pub mod keys;
pub mod progress;

pub use constants::*;
pub use dates::{parse_target_date, parse_utc_instant, previous_utc_day};
pub use keys::{final_key, intermediate_key, source_day_prefix};
pub use progress::ProgressReporter;
