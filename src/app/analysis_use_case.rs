use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::app::ports::{ChartRendererPort, DatasetSinkPort, ExportReceipt, SummarySinkPort};
use crate::config::PipelineConfig;
use crate::infra::chart_adapter::SvgChartAdapter;
use crate::infra::csv_output_adapter::CsvDatasetAdapter;
use crate::infra::summary_output_adapter::JsonSummaryAdapter;
use crate::pipeline::processing::{CleaningReport, DefectLog, DepartmentKpi, KpiHistogram};
use crate::pipeline::{Pipeline, PipelineOutput};

/// Persisted description of one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub seed: u64,
    pub record_count: usize,
    pub best_employee: String,
    pub best_kpi: f64,
    pub worst_employee: String,
    pub worst_kpi: f64,
    pub departments: Vec<DepartmentKpi>,
    pub histogram: KpiHistogram,
    pub defects: DefectLog,
    pub cleaning: CleaningReport,
    pub csv_export: ExportReceipt,
    pub charts: Vec<PathBuf>,
}

/// Result of a complete run, as shown to the operator
#[derive(Debug, Clone, Serialize)]
pub struct PipelineResult {
    pub run_id: Uuid,
    pub record_count: usize,
    pub best_employee: String,
    pub worst_employee: String,
    pub csv_export: ExportReceipt,
    pub charts: Vec<PathBuf>,
    pub summary_path: PathBuf,
    pub duration_secs: f64,
}

/// Runs the pure pipeline, then hands its views to the chart, CSV and summary sinks
pub struct AnalysisUseCase {
    charts: Option<Box<dyn ChartRendererPort>>,
    dataset_sink: Box<dyn DatasetSinkPort>,
    summary_sink: Box<dyn SummarySinkPort>,
}

impl AnalysisUseCase {
    pub fn new(
        charts: Option<Box<dyn ChartRendererPort>>,
        dataset_sink: Box<dyn DatasetSinkPort>,
        summary_sink: Box<dyn SummarySinkPort>,
    ) -> Self {
        Self {
            charts,
            dataset_sink,
            summary_sink,
        }
    }

    /// Use case writing SVG charts, the CSV export and a JSON summary to disk
    pub fn with_file_outputs(config: &PipelineConfig, render_charts: bool) -> Self {
        let charts: Option<Box<dyn ChartRendererPort>> = if render_charts {
            Some(Box::new(SvgChartAdapter::new(&config.output_directory)))
        } else {
            None
        };
        Self::new(
            charts,
            Box::new(CsvDatasetAdapter::new(&config.csv_output_path)),
            Box::new(JsonSummaryAdapter::new(config.summary_path())),
        )
    }

    #[instrument(skip_all, fields(seed = config.seed, records = config.record_count))]
    pub fn run(&self, config: &PipelineConfig) -> Result<PipelineResult> {
        let started = Instant::now();
        let run_id = Uuid::new_v4();
        info!(%run_id, "Starting analysis run");

        let output = match Pipeline::run(config) {
            Ok(output) => output,
            Err(e) => {
                error!("Pipeline failed before export: {}", e);
                crate::observability::metrics::export::run_failed("core");
                return Err(e).context("KPI pipeline failed");
            }
        };

        let charts = self.render_charts(&output)?;

        let csv_export = self
            .dataset_sink
            .write_dataset(&output.dataset)
            .context("Failed to write dataset export")?;
        info!("💾 Saved dataset to {}", csv_export.path.display());

        let summary = RunSummary {
            run_id,
            generated_at: Utc::now(),
            seed: config.seed,
            record_count: output.dataset.len(),
            best_employee: output.report.best.name.clone(),
            best_kpi: output.report.best.performance_kpi,
            worst_employee: output.report.worst.name.clone(),
            worst_kpi: output.report.worst.performance_kpi,
            departments: output.report.departments.clone(),
            histogram: output.report.histogram.clone(),
            defects: output.defects.clone(),
            cleaning: output.cleaning.clone(),
            csv_export: csv_export.clone(),
            charts: charts.clone(),
        };
        let summary_path = self
            .summary_sink
            .write_summary(&summary)
            .context("Failed to write run summary")?;

        let duration_secs = started.elapsed().as_secs_f64();
        crate::observability::metrics::export::run_finished(duration_secs);
        info!("✅ Run {} finished in {:.3}s", run_id, duration_secs);

        Ok(PipelineResult {
            run_id,
            record_count: summary.record_count,
            best_employee: summary.best_employee,
            worst_employee: summary.worst_employee,
            csv_export,
            charts,
            summary_path,
            duration_secs,
        })
    }

    fn render_charts(&self, output: &PipelineOutput) -> Result<Vec<PathBuf>> {
        let Some(renderer) = &self.charts else {
            return Ok(Vec::new());
        };
        let report = &output.report;
        let charts = vec![
            renderer
                .render_employee_chart(&report.sorted)
                .context("Failed to render employee chart")?,
            renderer
                .render_department_chart(&report.departments)
                .context("Failed to render department chart")?,
            renderer
                .render_histogram(&report.histogram)
                .context("Failed to render KPI histogram")?,
        ];
        for chart in &charts {
            info!("📊 Chart saved to {}", chart.display());
        }
        Ok(charts)
    }
}
