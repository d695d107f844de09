/// Required observation columns
pub const COLUMN_STATION: &str = "station";
pub const COLUMN_VALID: &str = "valid";
pub const COLUMN_LONGITUDE: &str = "lon";
pub const COLUMN_LATITUDE: &str = "lat";
pub const COLUMN_TEMPERATURE: &str = "tmpf";

/// IEM marks missing values with a bare `M`
pub const MISSING_SENTINEL: &str = "M";
pub const COMMENT_CHAR: u8 = b'#';

/// Timestamp format of the `valid` column
pub const OBSERVATION_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Frame defaults (eclipse day, UTC)
pub const DEFAULT_START_TIME: &str = "2017-08-21 15:00";
pub const DEFAULT_END_TIME: &str = "2017-08-21 21:00";
pub const DEFAULT_STEP_MINUTES: i64 = 10;
pub const DEFAULT_SPAN_MINUTES: i64 = 60;
pub const DEFAULT_TOLERANCE_MINUTES: i64 = 10;
pub const DEFAULT_SNAPSHOT_TOLERANCE_MINUTES: i64 = 5;

/// Processing defaults
pub const DEFAULT_ROW_GROUP_SIZE: usize = 10000;
pub const DEFAULT_BUFFER_SIZE: usize = 8192 * 16; // 128KB

/// Configuration sources
pub const CONFIG_FILE_STEM: &str = "eclipse-obs";
pub const CONFIG_ENV_PREFIX: &str = "ECLIPSE_OBS";

/// Parquet compression options
pub const COMPRESSION_SNAPPY: &str = "snappy";
pub const COMPRESSION_GZIP: &str = "gzip";
pub const COMPRESSION_LZ4: &str = "lz4";
pub const COMPRESSION_ZSTD: &str = "zstd";
pub const COMPRESSION_NONE: &str = "none";
