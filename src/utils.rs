//! Utility functions for timestamps, log-friendly strings, and file system checks.
//!
//! - Wall-clock timestamps for `fetched_at` fields and snapshot filenames
//! - String truncation for logging response bodies
//! - Output directory validation

use chrono::{DateTime, Local, SecondsFormat};
use std::fs as stdfs;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument, warn};

/// Current local time as an ISO-8601 string with microseconds and offset.
///
/// Used to stamp `fetched_at` on every record at extraction time.
pub fn now_iso() -> String {
    iso_timestamp(&Local::now())
}

/// Format a timestamp the way every `fetched_at` field is written.
pub fn iso_timestamp(at: &DateTime<Local>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, false)
}

/// Default snapshot filename for a run started at `at`.
///
/// # Examples
///
/// ```ignore
/// // 2025-05-06 20:30:05 local
/// assert_eq!(snapshot_filename(&at), "2025-05-06_20-30-05.json");
/// ```
pub fn snapshot_filename(at: &DateTime<Local>) -> String {
    format!("{}.json", at.format("%Y-%m-%d_%H-%M-%S"))
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut to `max` bytes (backed off to a char boundary) with
/// an ellipsis and the number of dropped bytes appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}

const WRITE_MARKER: &str = "..__write_check__";

/// Remove the write-check marker; returns whether it was removed.
fn discard_write_marker(marker: &Path) -> bool {
    match stdfs::remove_file(marker) {
        Ok(()) => true,
        Err(e) => {
            warn!(path = %marker.display(), error = %e, "Failed to remove write-check marker");
            false
        }
    }
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory if needed, then creates and removes a marker file.
/// A marker that cannot be removed is logged and does not fail the check.
///
/// # Errors
///
/// Returns the I/O error if the directory cannot be created or written to.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn ensure_writable_dir(path: &Path) -> std::io::Result<()> {
    fs::create_dir_all(path).await?;
    // Try a small sync write using std fs (simpler error surface)
    let marker = path.join(WRITE_MARKER);
    stdfs::File::create(&marker)?;
    discard_write_marker(&marker);
    info!("Output directory is writable");
    Ok(())
}
