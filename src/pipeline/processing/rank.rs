use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{info, instrument};

use crate::domain::{Dataset, ScoredEmployeeRecord};
use crate::error::{PipelineError, Result};

/// Mean normalized KPI of one department
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepartmentKpi {
    pub department: String,
    pub employee_count: usize,
    pub mean_kpi_normalized: f64,
}

/// One equal-width bucket; `upper` is exclusive except for the last bucket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramBucket {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiHistogram {
    pub buckets: Vec<HistogramBucket>,
}

impl KpiHistogram {
    pub fn total(&self) -> usize {
        self.buckets.iter().map(|b| b.count).sum()
    }

    pub fn max_count(&self) -> usize {
        self.buckets.iter().map(|b| b.count).max().unwrap_or(0)
    }
}

/// Read-only views consumed by charts and the run summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceReport {
    pub best: ScoredEmployeeRecord,
    pub worst: ScoredEmployeeRecord,
    /// Records ordered by `kpi_normalized` descending, ties in dataset order
    pub sorted: Vec<ScoredEmployeeRecord>,
    /// Departments ordered by mean normalized KPI descending
    pub departments: Vec<DepartmentKpi>,
    pub histogram: KpiHistogram,
}

/// First record with the highest and first record with the lowest `performance_kpi`
pub fn best_and_worst(
    dataset: &Dataset<ScoredEmployeeRecord>,
) -> Result<(&ScoredEmployeeRecord, &ScoredEmployeeRecord)> {
    let mut iter = dataset.iter();
    let first = iter.next().ok_or(PipelineError::EmptyDataset)?;
    Ok(iter.fold((first, first), |(best, worst), r| {
        let best = if r.performance_kpi > best.performance_kpi { r } else { best };
        let worst = if r.performance_kpi < worst.performance_kpi { r } else { worst };
        (best, worst)
    }))
}

/// Stable sort by `kpi_normalized`, highest first
pub fn sort_by_normalized_desc(dataset: &Dataset<ScoredEmployeeRecord>) -> Vec<ScoredEmployeeRecord> {
    let mut sorted = dataset.records().to_vec();
    sorted.sort_by(|a, b| b.kpi_normalized.total_cmp(&a.kpi_normalized));
    sorted
}

/// Mean `kpi_normalized` per department, highest first; equal means stay alphabetical
pub fn department_means(dataset: &Dataset<ScoredEmployeeRecord>) -> Vec<DepartmentKpi> {
    let mut groups: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for record in dataset {
        let entry = groups.entry(record.department.as_str()).or_insert((0.0, 0));
        entry.0 += record.kpi_normalized;
        entry.1 += 1;
    }

    let mut departments: Vec<DepartmentKpi> = groups
        .into_iter()
        .map(|(department, (sum, count))| DepartmentKpi {
            department: department.to_string(),
            employee_count: count,
            mean_kpi_normalized: sum / count as f64,
        })
        .collect();
    departments.sort_by(|a, b| b.mean_kpi_normalized.total_cmp(&a.mean_kpi_normalized));
    departments
}

/// Bucket `kpi_normalized` into `bins` equal-width buckets over its observed range
pub fn kpi_histogram(dataset: &Dataset<ScoredEmployeeRecord>, bins: usize) -> Result<KpiHistogram> {
    if bins == 0 {
        return Err(PipelineError::InvalidConfig(
            "histogram needs at least one bucket".to_string(),
        ));
    }
    let values: Vec<f64> = dataset.iter().map(|r| r.kpi_normalized).collect();
    let first = *values.first().ok_or(PipelineError::EmptyDataset)?;
    let (mut lo, mut hi) = values
        .iter()
        .fold((first, first), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }

    let width = (hi - lo) / bins as f64;
    let mut buckets: Vec<HistogramBucket> = (0..bins)
        .map(|i| HistogramBucket {
            lower: lo + width * i as f64,
            upper: if i + 1 == bins { hi } else { lo + width * (i + 1) as f64 },
            count: 0,
        })
        .collect();

    for v in values {
        let mut idx = ((((v - lo) / (hi - lo)) * bins as f64) as usize).min(bins - 1);
        // the scaled index can land one bucket off the computed edges
        if v < buckets[idx].lower && idx > 0 {
            idx -= 1;
        } else if v >= buckets[idx].upper && idx + 1 < bins {
            idx += 1;
        }
        buckets[idx].count += 1;
    }

    Ok(KpiHistogram { buckets })
}

/// Build every reporting view over a scored dataset
#[instrument(skip(dataset), fields(records = dataset.len()))]
pub fn build_report(dataset: &Dataset<ScoredEmployeeRecord>, histogram_bins: usize) -> Result<PerformanceReport> {
    let (best, worst) = best_and_worst(dataset)?;
    let report = PerformanceReport {
        best: best.clone(),
        worst: worst.clone(),
        sorted: sort_by_normalized_desc(dataset),
        departments: department_means(dataset),
        histogram: kpi_histogram(dataset, histogram_bins)?,
    };

    info!("Best Employee: {} (KPI {:.4})", report.best.name, report.best.performance_kpi);
    info!("Worst Employee: {} (KPI {:.4})", report.worst.name, report.worst.performance_kpi);
    crate::observability::metrics::report::departments_ranked(report.departments.len());

    Ok(report)
}
