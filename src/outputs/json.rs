//! Snapshot assembly and JSON output.
//!
//! One snapshot is written per run:
//! ```text
//! out_dir/
//! ├── 2025-05-06_08-00-00.json
//! └── 2025-05-06_20-30-05.json
//! ```
//!
//! The file is pretty-printed with two-space indentation; non-ASCII text is
//! written as-is.

use crate::error::CollectError;
use crate::models::{CollectionResult, Snapshot, SnapshotMetadata};
use crate::utils::iso_timestamp;
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, instrument};

/// Wrap a collection result with its summary metadata.
///
/// `at` is the run timestamp; it is the only input besides `data`, so the
/// result is fully determined by the two.
///
/// # Arguments
///
/// * `data` - Per-source record lists, as returned by the collector
/// * `at` - Run time, written to `metadata.fetched_at`
///
/// # Returns
///
/// A [`Snapshot`] whose per-source counts and total match `data`.
pub fn build_snapshot(data: CollectionResult, at: DateTime<Local>) -> Snapshot {
    let sources: std::collections::BTreeMap<String, usize> = data
        .iter()
        .map(|(name, records)| (name.clone(), records.len()))
        .collect();
    let total_items = sources.values().sum();
    Snapshot {
        metadata: SnapshotMetadata {
            total_items,
            sources,
            fetched_at: iso_timestamp(&at),
        },
        data,
    }
}

/// Write a [`Snapshot`] to `out_dir/filename`, creating `out_dir` if needed.
///
/// # Returns
///
/// The path of the written file.
#[instrument(level = "info", skip_all, fields(out_dir = %out_dir.display(), %filename))]
pub async fn write_snapshot(
    snapshot: &Snapshot,
    out_dir: &Path,
    filename: &str,
) -> Result<PathBuf, CollectError> {
    let json = serde_json::to_string_pretty(snapshot)?;

    if let Err(e) = fs::create_dir_all(out_dir).await {
        error!(error = %e, "Failed to create output dir");
        return Err(e.into());
    }

    let path = out_dir.join(filename);
    info!(path = %path.display(), "Writing snapshot");
    fs::write(&path, json).await?;
    info!(
        path = %path.display(),
        total_items = snapshot.metadata.total_items,
        "Wrote snapshot"
    );

    Ok(path)
}
