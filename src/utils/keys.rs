use crate::utils::constants::{INTERMEDIATE_DIR, INTERMEDIATE_EXTENSION, OUTPUT_DIR};
use crate::writers::OutputFormat;
use chrono::NaiveDate;

fn trimmed(prefix: &str) -> &str {
    prefix.trim_end_matches('/')
}

fn join(prefix: &str, rest: &str) -> String {
    let prefix = trimmed(prefix);
    if prefix.is_empty() {
        rest.to_string()
    } else {
        format!("{}/{}", prefix, rest)
    }
}

/// Listing prefix holding one day of source files: `{source_prefix}/{YYYY-MM-DD}/`
pub fn source_day_prefix(source_prefix: &str, date: NaiveDate) -> String {
    join(source_prefix, &format!("{}/", date.format("%Y-%m-%d")))
}

/// Intermediate artifact key for one map invocation: `{output_prefix}/temp/{request_id}.json.gz`
pub fn intermediate_key(output_prefix: &str, request_id: &str) -> String {
    join(
        output_prefix,
        &format!(
            "{}/{}.{}",
            INTERMEDIATE_DIR, request_id, INTERMEDIATE_EXTENSION
        ),
    )
}

/// Final artifact key for a target day: `{output_prefix}/output/{YYYY-MM-DD}.{ext}`
pub fn final_key(output_prefix: &str, date: NaiveDate, format: OutputFormat) -> String {
    join(
        output_prefix,
        &format!(
            "{}/{}.{}",
            OUTPUT_DIR,
            date.format("%Y-%m-%d"),
            format.extension()
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    #[test]
    fn test_source_day_prefix() {
        assert_eq!(source_day_prefix("realtime", day()), "realtime/2024-03-01/");
        assert_eq!(source_day_prefix("realtime/", day()), "realtime/2024-03-01/");
        assert_eq!(source_day_prefix("", day()), "2024-03-01/");
    }

    #[test]
    fn test_intermediate_key_is_request_scoped() {
        assert_eq!(
            intermediate_key("etl", "req-42"),
            "etl/temp/req-42.json.gz"
        );
        assert_ne!(intermediate_key("etl", "a"), intermediate_key("etl", "b"));
    }

    #[test]
    fn test_final_key_uses_format_extension() {
        assert_eq!(
            final_key("etl", day(), OutputFormat::Csv),
            "etl/output/2024-03-01.csv.gz"
        );
        assert_eq!(
            final_key("etl/", day(), OutputFormat::Parquet),
            "etl/output/2024-03-01.parquet"
        );
    }
}
