pub mod ingest;
pub mod info;
pub mod list;
pub mod query;

use anyhow::{Context, Result};
use milepost::MemoryStore;
use std::path::PathBuf;

/// Load the milestone store from `--data` or `MILEPOST_DATA`.
pub(crate) fn load_store(data: Option<PathBuf>) -> Result<MemoryStore> {
    let path = data.context(
        "MILEPOST_DATA environment variable not set. Use --data or set MILEPOST_DATA",
    )?;
    MemoryStore::from_csv_path(&path)
        .with_context(|| format!("Failed to load milestones from {}", path.display()))
}

/// Format a meter mileage in chainage notation (e.g. `45K+200`).
pub(crate) fn format_chainage(mileage: u32) -> String {
    format!("{}K+{:03}", mileage / 1000, mileage % 1000)
}
