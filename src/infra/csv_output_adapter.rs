use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::app::ports::{DatasetSinkPort, ExportReceipt};
use crate::domain::{Dataset, RawEmployeeRecord, ScoredEmployeeRecord};

/// One CSV row of the final, scored dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCsvRow {
    #[serde(rename = "EmployeeID")]
    pub employee_id: u32,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Department")]
    pub department: String,
    #[serde(rename = "TasksCompleted")]
    pub tasks_completed: f64,
    #[serde(rename = "HoursWorked")]
    pub hours_worked: f64,
    #[serde(rename = "SatisfactionScore")]
    pub satisfaction_score: f64,
    #[serde(rename = "PerformanceKPI")]
    pub performance_kpi: f64,
    #[serde(rename = "KPI_normalized")]
    pub kpi_normalized: f64,
}

impl From<&ScoredEmployeeRecord> for ScoredCsvRow {
    fn from(r: &ScoredEmployeeRecord) -> Self {
        Self {
            employee_id: r.employee_id,
            name: r.name.clone(),
            department: r.department.clone(),
            tasks_completed: r.tasks_completed,
            hours_worked: r.hours_worked,
            satisfaction_score: r.satisfaction_score,
            performance_kpi: r.performance_kpi,
            kpi_normalized: r.kpi_normalized,
        }
    }
}

/// One CSV row of the raw dataset; missing values become empty cells
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawCsvRow {
    #[serde(rename = "EmployeeID")]
    pub employee_id: u32,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Department")]
    pub department: String,
    #[serde(rename = "TasksCompleted")]
    pub tasks_completed: Option<f64>,
    #[serde(rename = "HoursWorked")]
    pub hours_worked: f64,
    #[serde(rename = "SatisfactionScore")]
    pub satisfaction_score: Option<f64>,
}

impl From<&RawEmployeeRecord> for RawCsvRow {
    fn from(r: &RawEmployeeRecord) -> Self {
        Self {
            employee_id: r.employee_id,
            name: r.name.clone(),
            department: r.department.clone(),
            tasks_completed: r.tasks_completed,
            hours_worked: r.hours_worked,
            satisfaction_score: r.satisfaction_score,
        }
    }
}

/// Writes datasets as comma-separated tables with a header row
pub struct CsvDatasetAdapter {
    path: PathBuf,
}

impl CsvDatasetAdapter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Write the defect-bearing dataset straight from the synthesizer
    pub fn write_raw(&self, dataset: &Dataset<RawEmployeeRecord>) -> Result<ExportReceipt> {
        self.write_rows(dataset.iter().map(RawCsvRow::from), "raw_csv")
    }

    fn write_rows<T, I>(&self, rows: I, kind: &str) -> Result<ExportReceipt>
    where
        T: Serialize,
        I: IntoIterator<Item = T>,
    {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let mut writer = csv::Writer::from_path(&self.path)
            .with_context(|| format!("Failed to open {}", self.path.display()))?;
        let mut count = 0usize;
        for row in rows {
            writer.serialize(row)?;
            count += 1;
        }
        writer.flush()?;
        drop(writer);

        let (bytes, sha256) = digest_file(&self.path)?;
        info!("Wrote {} rows ({} bytes) to {}", count, bytes, self.path.display());
        crate::observability::metrics::export::file_written(kind, bytes);

        Ok(ExportReceipt {
            path: self.path.clone(),
            bytes,
            sha256,
        })
    }
}

impl DatasetSinkPort for CsvDatasetAdapter {
    fn write_dataset(&self, dataset: &Dataset<ScoredEmployeeRecord>) -> Result<ExportReceipt> {
        self.write_rows(dataset.iter().map(ScoredCsvRow::from), "csv")
    }
}

/// Read back a scored CSV export
pub fn read_scored(path: &Path) -> Result<Vec<ScoredCsvRow>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    let rows = reader
        .deserialize()
        .collect::<std::result::Result<Vec<ScoredCsvRow>, csv::Error>>()?;
    Ok(rows)
}

fn digest_file(path: &Path) -> Result<(u64, String)> {
    let bytes = fs::read(path)?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok((bytes.len() as u64, hex::encode(hasher.finalize())))
}
