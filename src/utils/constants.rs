/// Source record fields kept by the map stage
pub const COUNTRY_COLUMN: &str = "country";
pub const CITY_COLUMN: &str = "city";
pub const LOCATION_COLUMN: &str = "location";
pub const PARAMETER_COLUMN: &str = "parameter";
pub const VALUE_COLUMN: &str = "value";
pub const UNIT_COLUMN: &str = "unit";
pub const DATE_UTC_COLUMN: &str = "date.utc";

pub const PROJECTED_COLUMNS: [&str; 7] = [
    COUNTRY_COLUMN,
    CITY_COLUMN,
    LOCATION_COLUMN,
    PARAMETER_COLUMN,
    VALUE_COLUMN,
    UNIT_COLUMN,
    DATE_UTC_COLUMN,
];

/// Final output date column
pub const DATE_COLUMN: &str = "date";

/// Pollutants in the order their summary columns appear in the final output
pub const KNOWN_POLLUTANTS: [&str; 7] = ["bc", "co", "no2", "o3", "pm10", "pm25", "so2"];

/// Key layout below the output prefix
pub const INTERMEDIATE_DIR: &str = "temp";
pub const OUTPUT_DIR: &str = "output";
pub const INTERMEDIATE_EXTENSION: &str = "json.gz";

/// Environment variable prefix for configuration
pub const ENV_PREFIX: &str = "OPENAQ";

/// Processing defaults
pub const DEFAULT_DELETE_BATCH_SIZE: usize = 1000;
pub const DEFAULT_ROW_GROUP_SIZE: usize = 10000;
pub const DEFAULT_BUFFER_SIZE: usize = 8192 * 16; // 128KB

/// Gzip member header
pub const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Parquet compression options
pub const COMPRESSION_SNAPPY: &str = "snappy";
pub const COMPRESSION_GZIP: &str = "gzip";
pub const COMPRESSION_LZ4: &str = "lz4";
pub const COMPRESSION_ZSTD: &str = "zstd";
pub const COMPRESSION_NONE: &str = "none";

/// Stage completion messages carried in the control payloads
pub const PLAN_COMPLETE_MESSAGE: &str = "Init phase complete";
pub const MAP_COMPLETE_MESSAGE: &str = "Mapper phase complete.";
