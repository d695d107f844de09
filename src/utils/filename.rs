use chrono::{Datelike, Local};
use std::path::PathBuf;

/// Generate default delta-frame filename with format: temperature-change-{YYMMDD}.parquet
pub fn generate_default_delta_filename() -> PathBuf {
    dated_output_path("temperature-change")
}

/// Generate default snapshot-frame filename with format: temperature-snapshots-{YYMMDD}.parquet
pub fn generate_default_snapshot_filename() -> PathBuf {
    dated_output_path("temperature-snapshots")
}

fn dated_output_path(prefix: &str) -> PathBuf {
    let now = Local::now();
    let year = now.year() % 100; // Get last 2 digits of year
    let month = now.month();
    let day = now.day();

    let filename = format!("{}-{:02}{:02}{:02}.parquet", prefix, year, month, day);
    PathBuf::from("output").join(filename)
}
