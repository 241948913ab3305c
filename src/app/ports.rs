use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::app::analysis_use_case::RunSummary;
use crate::domain::{Dataset, ScoredEmployeeRecord};
use crate::pipeline::processing::{DepartmentKpi, KpiHistogram};

/// Renders the three report charts; each call returns the written file
pub trait ChartRendererPort {
    /// `sorted` is ordered by normalized KPI descending
    fn render_employee_chart(&self, sorted: &[ScoredEmployeeRecord]) -> Result<PathBuf>;
    fn render_department_chart(&self, departments: &[DepartmentKpi]) -> Result<PathBuf>;
    fn render_histogram(&self, histogram: &KpiHistogram) -> Result<PathBuf>;
}

/// Where a written export landed and what it contained
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportReceipt {
    pub path: PathBuf,
    pub bytes: u64,
    pub sha256: String,
}

pub trait DatasetSinkPort {
    fn write_dataset(&self, dataset: &Dataset<ScoredEmployeeRecord>) -> Result<ExportReceipt>;
}

pub trait SummarySinkPort {
    fn write_summary(&self, summary: &RunSummary) -> Result<PathBuf>;
}
