pub mod processing;

use tracing::{info, instrument};

use crate::config::PipelineConfig;
use crate::domain::{Dataset, RawEmployeeRecord, ScoredEmployeeRecord};
use crate::error::Result;
use processing::{CleaningReport, DefectLog, PerformanceReport};

/// Everything the core pipeline produces for one run
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub defects: DefectLog,
    pub cleaning: CleaningReport,
    pub dataset: Dataset<ScoredEmployeeRecord>,
    pub report: PerformanceReport,
}

pub struct Pipeline;

impl Pipeline {
    /// Run synthesize → clean → kpi → rank. Any stage error aborts the run.
    #[instrument(skip(config), fields(seed = config.seed))]
    pub fn run(config: &PipelineConfig) -> Result<PipelineOutput> {
        info!("🚀 Starting KPI pipeline");
        let synthesis = processing::synthesize(config)?;
        let (cleaning, dataset, report) = Self::process(synthesis.dataset, config.histogram_bins)?;
        info!("✅ Pipeline produced {} scored records", dataset.len());

        Ok(PipelineOutput {
            defects: synthesis.defects,
            cleaning,
            dataset,
            report,
        })
    }

    /// Clean, score and rank an existing raw dataset
    pub fn process(
        raw: Dataset<RawEmployeeRecord>,
        histogram_bins: usize,
    ) -> Result<(CleaningReport, Dataset<ScoredEmployeeRecord>, PerformanceReport)> {
        let (clean, cleaning) = processing::clean(raw)?;
        let scored = processing::compute_kpis(clean)?;
        let report = processing::build_report(&scored, histogram_bins)?;
        Ok((cleaning, scored, report))
    }
}
