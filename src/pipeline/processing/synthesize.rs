use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::config::{PipelineConfig, SampleRange};
use crate::constants::employee_name;
use crate::domain::{Dataset, RawEmployeeRecord};
use crate::error::Result;

/// Employee ids that received each injected defect, in selection order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefectLog {
    pub missing_tasks: Vec<u32>,
    pub missing_satisfaction: Vec<u32>,
    pub negative_hours: Vec<u32>,
}

impl DefectLog {
    pub fn total(&self) -> usize {
        self.missing_tasks.len() + self.missing_satisfaction.len() + self.negative_hours.len()
    }
}

/// Raw dataset together with the defects injected into it
#[derive(Debug, Clone, PartialEq)]
pub struct Synthesis {
    pub dataset: Dataset<RawEmployeeRecord>,
    pub defects: DefectLog,
}

/// Generate the raw employee dataset, defects included.
///
/// Columns are drawn one after another (departments, tasks, hours,
/// satisfaction) from a single seeded generator, followed by the three defect
/// selections. The same configuration always yields the same dataset.
#[instrument(skip(config), fields(seed = config.seed, records = config.record_count))]
pub fn synthesize(config: &PipelineConfig) -> Result<Synthesis> {
    config.validate()?;

    let n = config.record_count;
    let mut rng = StdRng::seed_from_u64(config.seed);

    let departments: Vec<&String> = (0..n)
        .map(|_| &config.departments[rng.gen_range(0..config.departments.len())])
        .collect();
    let tasks = sample_column(&mut rng, config.tasks_range, n);
    let hours = sample_column(&mut rng, config.hours_range, n);
    let satisfaction = sample_column(&mut rng, config.satisfaction_range, n);

    let mut records: Vec<RawEmployeeRecord> = departments
        .into_iter()
        .zip(tasks)
        .zip(hours)
        .zip(satisfaction)
        .enumerate()
        .map(|(i, (((department, tasks), hours), satisfaction))| {
            let employee_id = (i + 1) as u32;
            RawEmployeeRecord {
                employee_id,
                name: employee_name(employee_id),
                department: department.clone(),
                tasks_completed: Some(tasks as f64),
                hours_worked: hours as f64,
                satisfaction_score: Some(satisfaction as f64),
            }
        })
        .collect();

    let mut defects = DefectLog::default();

    for i in index::sample(&mut rng, n, config.missing_tasks_count).into_vec() {
        records[i].tasks_completed = None;
        defects.missing_tasks.push(records[i].employee_id);
    }
    for i in index::sample(&mut rng, n, config.missing_satisfaction_count).into_vec() {
        records[i].satisfaction_score = None;
        defects.missing_satisfaction.push(records[i].employee_id);
    }
    for i in index::sample(&mut rng, n, config.negative_hours_count).into_vec() {
        records[i].hours_worked = -records[i].hours_worked;
        defects.negative_hours.push(records[i].employee_id);
    }

    debug!(?defects, "Injected defects");
    info!(
        "Synthesized {} records with {} injected defects",
        records.len(),
        defects.total()
    );
    crate::observability::metrics::synthesize::records_generated(records.len());
    crate::observability::metrics::synthesize::defects_injected("missing_tasks", defects.missing_tasks.len());
    crate::observability::metrics::synthesize::defects_injected(
        "missing_satisfaction",
        defects.missing_satisfaction.len(),
    );
    crate::observability::metrics::synthesize::defects_injected("negative_hours", defects.negative_hours.len());

    Ok(Synthesis {
        dataset: Dataset::new(records),
        defects,
    })
}

fn sample_column(rng: &mut StdRng, range: SampleRange, n: usize) -> Vec<i64> {
    (0..n).map(|_| rng.gen_range(range.low..range.high)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn synthesize_default() -> Synthesis {
        synthesize(&PipelineConfig::default()).unwrap()
    }

    #[test]
    fn test_same_seed_is_bit_identical() {
        let first = synthesize_default();
        let second = synthesize_default();
        assert_eq!(first, second);
    }

    #[test]
    fn test_different_seed_changes_dataset() {
        let first = synthesize_default();
        let other = synthesize(&PipelineConfig {
            seed: 7,
            ..PipelineConfig::default()
        })
        .unwrap();
        assert_ne!(first.dataset, other.dataset);
    }

    #[test]
    fn test_ids_names_and_departments() {
        let synthesis = synthesize_default();
        let config = PipelineConfig::default();
        assert_eq!(synthesis.dataset.len(), 50);
        for (i, record) in synthesis.dataset.iter().enumerate() {
            assert_eq!(record.employee_id as usize, i + 1);
            assert_eq!(record.name, format!("Employee{}", i + 1));
            assert!(config.departments.contains(&record.department));
        }
    }

    #[test]
    fn test_values_fall_in_sampling_ranges() {
        let synthesis = synthesize_default();
        for record in synthesis.dataset.iter() {
            if let Some(tasks) = record.tasks_completed {
                assert!((10.0..35.0).contains(&tasks));
                assert_eq!(tasks.fract(), 0.0);
            }
            assert!((30.0..50.0).contains(&record.hours_worked.abs()));
            if let Some(score) = record.satisfaction_score {
                assert!((5.0..10.0).contains(&score));
            }
        }
    }

    #[test]
    fn test_defect_counts_and_distinct_indices() {
        let synthesis = synthesize_default();
        let records = synthesis.dataset.records();

        let missing_tasks = records.iter().filter(|r| r.tasks_completed.is_none()).count();
        let missing_satisfaction = records.iter().filter(|r| r.satisfaction_score.is_none()).count();
        let negative_hours = records.iter().filter(|r| r.hours_worked < 0.0).count();
        assert_eq!(missing_tasks, 7);
        assert_eq!(missing_satisfaction, 3);
        assert_eq!(negative_hours, 3);

        let distinct: HashSet<_> = synthesis.defects.missing_tasks.iter().collect();
        assert_eq!(distinct.len(), 7);
        assert_eq!(synthesis.defects.total(), 13);
    }

    #[test]
    fn test_defect_log_matches_records() {
        let synthesis = synthesize_default();
        for id in &synthesis.defects.negative_hours {
            let record = &synthesis.dataset.records()[*id as usize - 1];
            assert!(record.hours_worked < 0.0);
        }
        for id in &synthesis.defects.missing_satisfaction {
            let record = &synthesis.dataset.records()[*id as usize - 1];
            assert!(record.satisfaction_score.is_none());
        }
    }

    #[test]
    fn test_invalid_config_is_rejected_before_sampling() {
        let config = PipelineConfig {
            record_count: 2,
            ..PipelineConfig::default()
        };
        assert!(synthesize(&config).is_err());
    }

    #[test]
    fn test_zero_defects_leaves_dataset_intact() {
        let config = PipelineConfig {
            record_count: 5,
            missing_tasks_count: 0,
            missing_satisfaction_count: 0,
            negative_hours_count: 0,
            ..PipelineConfig::default()
        };
        let synthesis = synthesize(&config).unwrap();
        assert!(synthesis.dataset.iter().all(|r| r.tasks_completed.is_some()
            && r.satisfaction_score.is_some()
            && r.hours_worked > 0.0));
        assert_eq!(synthesis.defects, DefectLog::default());
    }
}
