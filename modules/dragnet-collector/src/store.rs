use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use tracing::info;

use dragnet_common::MassiveSnapshot;

use crate::traits::SnapshotStore;

/// Writes each snapshot as pretty JSON under `dir`. The returned location is
/// the file path.
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

/// `massive_data_<first 8 chars of run id>_<UTC timestamp>.json`
pub fn snapshot_file_name(run_id: &str) -> String {
    let short: String = run_id.chars().take(8).collect();
    format!(
        "massive_data_{short}_{}.json",
        Utc::now().format("%Y%m%d_%H%M%S")
    )
}

#[async_trait]
impl SnapshotStore for JsonFileStore {
    async fn save(&self, snapshot: &MassiveSnapshot, run_id: &str) -> Result<String> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("creating {}", self.dir.display()))?;

        let path = self.dir.join(snapshot_file_name(run_id));
        let body = serde_json::to_vec_pretty(snapshot).context("serializing snapshot")?;
        tokio::fs::write(&path, &body)
            .await
            .with_context(|| format!("writing {}", path.display()))?;

        info!(path = %path.display(), bytes = body.len(), "Snapshot saved");
        Ok(path.display().to_string())
    }
}
