use tracing::{info, instrument, warn};

use crate::domain::{CleanEmployeeRecord, Dataset, ScoredEmployeeRecord};
use crate::error::{PipelineError, Result};

/// `(tasks_completed / hours_worked) * satisfaction_score`
///
/// Zero hours is rejected rather than producing an infinite or NaN score.
pub fn performance_kpi(record: &CleanEmployeeRecord) -> Result<f64> {
    if record.hours_worked == 0.0 {
        return Err(PipelineError::ZeroHoursWorked {
            employee_id: record.employee_id,
        });
    }
    Ok((record.tasks_completed / record.hours_worked) * record.satisfaction_score)
}

/// Min-max scale `values` to [0, 1] with one dataset-wide min and max.
///
/// When every value is equal the range is empty and all outputs are 0.0.
pub fn min_max_normalize(values: &[f64]) -> Vec<f64> {
    let Some((min, max)) = min_max(values) else {
        return Vec::new();
    };
    let span = max - min;
    if span == 0.0 {
        return vec![0.0; values.len()];
    }
    values.iter().map(|v| (v - min) / span).collect()
}

fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    let first = *values.first()?;
    Some(
        values
            .iter()
            .fold((first, first), |(lo, hi), &v| (lo.min(v), hi.max(v))),
    )
}

/// Score every record and attach its normalized KPI
#[instrument(skip(clean), fields(records = clean.len()))]
pub fn compute_kpis(clean: Dataset<CleanEmployeeRecord>) -> Result<Dataset<ScoredEmployeeRecord>> {
    if clean.is_empty() {
        return Err(PipelineError::EmptyDataset);
    }

    let kpis = clean
        .iter()
        .map(performance_kpi)
        .collect::<Result<Vec<f64>>>()?;

    let normalized = min_max_normalize(&kpis);
    if let Some((min, max)) = min_max(&kpis) {
        if min == max {
            warn!(
                "All {} records share KPI {:.4}; normalized KPI set to 0.0 for every record",
                kpis.len(),
                min
            );
            crate::observability::metrics::kpi::degenerate_normalization();
        } else {
            info!("KPI range: min {:.4}, max {:.4}", min, max);
        }
    }

    for kpi in &kpis {
        crate::observability::metrics::kpi::kpi_recorded(*kpi);
    }
    crate::observability::metrics::kpi::records_scored(kpis.len());

    Ok(clean
        .into_iter()
        .zip(kpis.into_iter().zip(normalized))
        .map(|(record, (kpi, norm))| record.into_scored(kpi, norm))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset(rows: &[(f64, f64, f64)]) -> Dataset<CleanEmployeeRecord> {
        rows.iter()
            .enumerate()
            .map(|(i, &(tasks, hours, satisfaction))| {
                CleanEmployeeRecord::new(i as u32 + 1, "IT", tasks, hours, satisfaction)
            })
            .collect()
    }

    #[test]
    fn test_three_record_scenario() {
        let scored = compute_kpis(dataset(&[(10.0, 10.0, 5.0), (20.0, 10.0, 5.0), (30.0, 10.0, 5.0)])).unwrap();
        let kpis: Vec<f64> = scored.iter().map(|r| r.performance_kpi).collect();
        let normalized: Vec<f64> = scored.iter().map(|r| r.kpi_normalized).collect();
        assert_eq!(kpis, vec![5.0, 10.0, 15.0]);
        assert_eq!(normalized, vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn test_degenerate_dataset_normalizes_to_zero() {
        let scored = compute_kpis(dataset(&[(7.0, 1.0, 1.0), (14.0, 2.0, 1.0), (21.0, 3.0, 1.0)])).unwrap();
        assert!(scored.iter().all(|r| r.performance_kpi == 7.0));
        assert!(scored.iter().all(|r| r.kpi_normalized == 0.0));
    }

    #[test]
    fn test_zero_hours_is_an_error() {
        let err = compute_kpis(dataset(&[(10.0, 10.0, 5.0), (10.0, 0.0, 5.0)])).unwrap_err();
        assert!(matches!(err, PipelineError::ZeroHoursWorked { employee_id: 2 }));
    }

    #[test]
    fn test_single_record_is_degenerate() {
        let scored = compute_kpis(dataset(&[(12.0, 40.0, 8.0)])).unwrap();
        assert_eq!(scored.records()[0].performance_kpi, 12.0 / 40.0 * 8.0);
        assert_eq!(scored.records()[0].kpi_normalized, 0.0);
    }

    #[test]
    fn test_empty_dataset_rejected() {
        assert!(matches!(
            compute_kpis(Dataset::new(Vec::new())),
            Err(PipelineError::EmptyDataset)
        ));
    }

    #[test]
    fn test_min_max_normalize_bounds() {
        let normalized = min_max_normalize(&[0.3, 2.7, 1.1, 2.7, 0.3]);
        assert_eq!(normalized[0], 0.0);
        assert_eq!(normalized[1], 1.0);
        assert!(normalized.iter().all(|v| (0.0..=1.0).contains(v)));
        assert!(min_max_normalize(&[]).is_empty());
    }
}
