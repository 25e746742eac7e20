/// Key columns of the input table
pub const STATION_COLUMN: &str = "station";
pub const YEAR_COLUMN: &str = "year";
pub const MONTH_COLUMN: &str = "month";
pub const DAY_COLUMN: &str = "day";
pub const HOUR_COLUMN: &str = "hour";

/// Measurement columns
pub const PM10: &str = "PM10";
pub const PM25: &str = "PM2.5";
pub const NO2: &str = "NO2";
pub const SO2: &str = "SO2";
pub const O3: &str = "O3";
pub const CO: &str = "CO";
pub const TEMP: &str = "TEMP";

/// Row-index headers written by dataframe exports; never measurements
pub const INDEX_COLUMNS: [&str; 3] = ["No", "index", "Unnamed: 0"];

/// Cell contents read as a missing reading
pub const MISSING_TOKENS: [&str; 5] = ["", "NA", "NaN", "nan", "null"];

/// Configuration
pub const DEFAULT_DATA_PATH: &str = "data/cleaned_data.csv";
pub const DEFAULT_CONFIG_NAME: &str = "airq";
pub const ENV_PREFIX: &str = "AIRQ";

/// Processing defaults
pub const DEFAULT_ROW_GROUP_SIZE: usize = 10000;
pub const DEFAULT_BUFFER_SIZE: usize = 8192 * 16; // 128KB

/// Days from 0001-01-01 to 1970-01-01, for Date32 conversion
pub const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Parquet compression options
pub const COMPRESSION_SNAPPY: &str = "snappy";
pub const COMPRESSION_GZIP: &str = "gzip";
pub const COMPRESSION_LZ4: &str = "lz4";
pub const COMPRESSION_ZSTD: &str = "zstd";
pub const COMPRESSION_NONE: &str = "none";
