use chrono::{Datelike, Local};
use std::path::PathBuf;

/// Generate default output filename with format:
/// airq-{station}-{granularity}-{YYMMDD}.{extension}
pub fn generate_default_output_filename(station: &str, granularity: &str, extension: &str) -> PathBuf {
    let now = Local::now();
    let year = now.year() % 100; // Get last 2 digits of year
    let month = now.month();
    let day = now.day();

    let filename = format!(
        "airq-{}-{}-{:02}{:02}{:02}.{}",
        slug(station),
        granularity,
        year,
        month,
        day,
        extension
    );
    PathBuf::from("output").join(filename)
}

/// Lowercase, with anything outside `[a-z0-9]` collapsed to `_`.
fn slug(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.trim().chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('_') {
            out.push('_');
        }
    }
    if out.is_empty() {
        out.push_str("station");
    }
    out
}
