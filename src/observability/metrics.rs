//! Stage metrics for the KPI pipeline
//!
//! Metrics are recorded through the `metrics` facade. When [`init`] has been
//! called a Prometheus recorder is installed and [`render`] returns the text
//! exposition; otherwise every call is a no-op.

use std::fmt;
use std::sync::OnceLock;
use tracing::{info, warn};

/// All metric names used by the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    // Synthesizer
    SynthesizeRecordsGenerated,
    SynthesizeDefectsInjected,

    // Cleaner
    CleanValuesImputed,
    CleanSignsCorrected,
    CleanImputedMean,

    // KPI engine
    KpiRecordsScored,
    KpiDegenerateNormalization,
    KpiValue,

    // Reporter
    ReportDepartmentsRanked,

    // Export
    ExportFilesWritten,
    ExportBytesWritten,
    PipelineRuns,
    PipelineFailures,
    PipelineDuration,
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::SynthesizeRecordsGenerated => "ekpi_synthesize_records_generated_total",
            MetricName::SynthesizeDefectsInjected => "ekpi_synthesize_defects_injected_total",
            MetricName::CleanValuesImputed => "ekpi_clean_values_imputed_total",
            MetricName::CleanSignsCorrected => "ekpi_clean_signs_corrected_total",
            MetricName::CleanImputedMean => "ekpi_clean_imputed_mean",
            MetricName::KpiRecordsScored => "ekpi_kpi_records_scored_total",
            MetricName::KpiDegenerateNormalization => "ekpi_kpi_degenerate_normalization_total",
            MetricName::KpiValue => "ekpi_kpi_value",
            MetricName::ReportDepartmentsRanked => "ekpi_report_departments_ranked",
            MetricName::ExportFilesWritten => "ekpi_export_files_written_total",
            MetricName::ExportBytesWritten => "ekpi_export_bytes_written",
            MetricName::PipelineRuns => "ekpi_pipeline_runs_total",
            MetricName::PipelineFailures => "ekpi_pipeline_failures_total",
            MetricName::PipelineDuration => "ekpi_pipeline_duration_seconds",
        }
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

static HANDLE: OnceLock<metrics_exporter_prometheus::PrometheusHandle> = OnceLock::new();

/// Install the Prometheus recorder. Safe to call more than once.
pub fn init() {
    if HANDLE.get().is_some() {
        return;
    }
    match metrics_exporter_prometheus::PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            let _ = HANDLE.set(handle);
            info!("Metrics recorder installed");
        }
        Err(e) => warn!("Failed to install Prometheus recorder: {}", e),
    }
}

/// Prometheus text exposition of everything recorded so far
pub fn render() -> Option<String> {
    HANDLE.get().map(|handle| handle.render())
}

// ============================================================================
// Synthesizer Metrics
// ============================================================================

pub mod synthesize {
    use super::MetricName;

    pub fn records_generated(count: usize) {
        ::metrics::counter!(MetricName::SynthesizeRecordsGenerated.as_str()).increment(count as u64);
    }

    pub fn defects_injected(defect: &str, count: usize) {
        ::metrics::counter!(
            MetricName::SynthesizeDefectsInjected.as_str(),
            "defect" => defect.to_string()
        )
        .increment(count as u64);
    }
}

// ============================================================================
// Cleaner Metrics
// ============================================================================

pub mod clean {
    use super::MetricName;

    pub fn values_imputed(column: &str, count: usize) {
        ::metrics::counter!(
            MetricName::CleanValuesImputed.as_str(),
            "column" => column.to_string()
        )
        .increment(count as u64);
    }

    pub fn signs_corrected(count: usize) {
        ::metrics::counter!(MetricName::CleanSignsCorrected.as_str()).increment(count as u64);
    }

    pub fn imputed_mean(column: &str, mean: f64) {
        ::metrics::gauge!(
            MetricName::CleanImputedMean.as_str(),
            "column" => column.to_string()
        )
        .set(mean);
    }
}

// ============================================================================
// KPI Engine Metrics
// ============================================================================

pub mod kpi {
    use super::MetricName;

    pub fn records_scored(count: usize) {
        ::metrics::counter!(MetricName::KpiRecordsScored.as_str()).increment(count as u64);
    }

    pub fn kpi_recorded(value: f64) {
        ::metrics::histogram!(MetricName::KpiValue.as_str()).record(value);
    }

    pub fn degenerate_normalization() {
        ::metrics::counter!(MetricName::KpiDegenerateNormalization.as_str()).increment(1);
    }
}

// ============================================================================
// Reporter Metrics
// ============================================================================

pub mod report {
    use super::MetricName;

    pub fn departments_ranked(count: usize) {
        ::metrics::gauge!(MetricName::ReportDepartmentsRanked.as_str()).set(count as f64);
    }
}

// ============================================================================
// Export and Run Metrics
// ============================================================================

pub mod export {
    use super::MetricName;

    pub fn file_written(kind: &str, bytes: u64) {
        ::metrics::counter!(
            MetricName::ExportFilesWritten.as_str(),
            "kind" => kind.to_string()
        )
        .increment(1);
        ::metrics::histogram!(
            MetricName::ExportBytesWritten.as_str(),
            "kind" => kind.to_string()
        )
        .record(bytes as f64);
    }

    pub fn run_finished(duration_secs: f64) {
        ::metrics::counter!(MetricName::PipelineRuns.as_str()).increment(1);
        ::metrics::histogram!(MetricName::PipelineDuration.as_str()).record(duration_secs);
    }

    pub fn run_failed(stage: &str) {
        ::metrics::counter!(
            MetricName::PipelineFailures.as_str(),
            "stage" => stage.to_string()
        )
        .increment(1);
    }
}
