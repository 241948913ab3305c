use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::constants::{COL_HOURS_WORKED, COL_SATISFACTION_SCORE, COL_TASKS_COMPLETED};
use crate::domain::{CleanEmployeeRecord, Dataset, RawEmployeeRecord};
use crate::error::{PipelineError, Result};

/// Kind of defect repaired by the cleaner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CleaningIssueType {
    /// Value was absent and filled with the column mean
    MissingValue,
    /// Value had its sign inverted and was replaced by its magnitude
    NegativeValue,
}

/// A single repair applied to one field of one record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleaningIssue {
    pub employee_id: u32,
    pub field: String,
    pub issue_type: CleaningIssueType,
    /// Value before repair; `None` when it was missing
    pub original: Option<f64>,
    pub repaired: f64,
}

/// What the cleaner changed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleaningReport {
    pub tasks_completed_mean: f64,
    pub satisfaction_score_mean: f64,
    pub issues: Vec<CleaningIssue>,
}

impl CleaningReport {
    pub fn count(&self, field: &str, issue_type: CleaningIssueType) -> usize {
        self.issues
            .iter()
            .filter(|i| i.field == field && i.issue_type == issue_type)
            .count()
    }
}

/// Fill every missing slot with the mean of the present values.
///
/// The mean is computed once before any slot is filled, so all missing
/// entries receive the same value. Running it again on a filled column is a
/// no-op.
pub fn impute_mean(column: &'static str, values: &mut [Option<f64>]) -> Result<f64> {
    let (sum, count) = values
        .iter()
        .flatten()
        .fold((0.0_f64, 0_usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        return Err(PipelineError::EmptyMean { column });
    }
    let mean = sum / count as f64;
    for slot in values.iter_mut().filter(|v| v.is_none()) {
        *slot = Some(mean);
    }
    Ok(mean)
}

/// Repair missing and sign-inverted values
#[instrument(skip(raw), fields(records = raw.len()))]
pub fn clean(raw: Dataset<RawEmployeeRecord>) -> Result<(Dataset<CleanEmployeeRecord>, CleaningReport)> {
    if raw.is_empty() {
        return Err(PipelineError::EmptyDataset);
    }

    let records = raw.into_records();
    let mut tasks: Vec<Option<f64>> = records.iter().map(|r| r.tasks_completed).collect();
    let mut satisfaction: Vec<Option<f64>> = records.iter().map(|r| r.satisfaction_score).collect();

    let tasks_mean = impute_mean(COL_TASKS_COMPLETED, &mut tasks)?;
    let satisfaction_mean = impute_mean(COL_SATISFACTION_SCORE, &mut satisfaction)?;
    debug!(tasks_mean, satisfaction_mean, "Computed imputation means");

    let mut issues = Vec::new();
    let mut cleaned = Vec::with_capacity(records.len());

    for ((record, tasks), satisfaction) in records.into_iter().zip(tasks).zip(satisfaction) {
        // impute_mean leaves no empty slots
        let tasks = tasks.unwrap_or(tasks_mean);
        let satisfaction = satisfaction.unwrap_or(satisfaction_mean);

        if record.tasks_completed.is_none() {
            issues.push(CleaningIssue {
                employee_id: record.employee_id,
                field: COL_TASKS_COMPLETED.to_string(),
                issue_type: CleaningIssueType::MissingValue,
                original: None,
                repaired: tasks,
            });
        }
        if record.satisfaction_score.is_none() {
            issues.push(CleaningIssue {
                employee_id: record.employee_id,
                field: COL_SATISFACTION_SCORE.to_string(),
                issue_type: CleaningIssueType::MissingValue,
                original: None,
                repaired: satisfaction,
            });
        }

        let hours = record.hours_worked.abs();
        if record.hours_worked < 0.0 {
            issues.push(CleaningIssue {
                employee_id: record.employee_id,
                field: COL_HOURS_WORKED.to_string(),
                issue_type: CleaningIssueType::NegativeValue,
                original: Some(record.hours_worked),
                repaired: hours,
            });
        }

        cleaned.push(CleanEmployeeRecord {
            employee_id: record.employee_id,
            name: record.name,
            department: record.department,
            tasks_completed: tasks,
            hours_worked: hours,
            satisfaction_score: satisfaction,
        });
    }

    let report = CleaningReport {
        tasks_completed_mean: tasks_mean,
        satisfaction_score_mean: satisfaction_mean,
        issues,
    };

    let imputed_tasks = report.count(COL_TASKS_COMPLETED, CleaningIssueType::MissingValue);
    let imputed_satisfaction = report.count(COL_SATISFACTION_SCORE, CleaningIssueType::MissingValue);
    let signs = report.count(COL_HOURS_WORKED, CleaningIssueType::NegativeValue);
    info!(
        "Cleaned {} records: {} tasks imputed, {} satisfaction imputed, {} hours sign-corrected",
        cleaned.len(),
        imputed_tasks,
        imputed_satisfaction,
        signs
    );
    crate::observability::metrics::clean::values_imputed(COL_TASKS_COMPLETED, imputed_tasks);
    crate::observability::metrics::clean::values_imputed(COL_SATISFACTION_SCORE, imputed_satisfaction);
    crate::observability::metrics::clean::signs_corrected(signs);
    crate::observability::metrics::clean::imputed_mean(COL_TASKS_COMPLETED, tasks_mean);
    crate::observability::metrics::clean::imputed_mean(COL_SATISFACTION_SCORE, satisfaction_mean);

    Ok((Dataset::new(cleaned), report))
}
