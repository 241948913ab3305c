use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;
use tracing::info;

use crate::app::analysis_use_case::RunSummary;
use crate::app::ports::SummarySinkPort;

/// Writes the run summary as pretty-printed JSON
pub struct JsonSummaryAdapter {
    path: PathBuf,
}

impl JsonSummaryAdapter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SummarySinkPort for JsonSummaryAdapter {
    fn write_summary(&self, summary: &RunSummary) -> Result<PathBuf> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(summary)?;
        fs::write(&self.path, &json)
            .with_context(|| format!("Failed to write summary {}", self.path.display()))?;

        info!("Run summary written to {}", self.path.display());
        crate::observability::metrics::export::file_written("summary", json.len() as u64);
        Ok(self.path.clone())
    }
}
