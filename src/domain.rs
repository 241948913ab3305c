//! Record shapes for each pipeline stage.
//!
//! Each stage owns a distinct record type so that "value is missing" or
//! "KPI not yet computed" is expressed in the type rather than as a sentinel
//! float. Stages consume the previous [`Dataset`] and return a new one.

use serde::{Deserialize, Serialize};

use crate::constants::employee_name;

/// Employee record as produced by the synthesizer, defects included
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEmployeeRecord {
    pub employee_id: u32,
    pub name: String,
    pub department: String,
    /// Absent when a missing-value defect was injected
    pub tasks_completed: Option<f64>,
    /// Negative when a sign defect was injected
    pub hours_worked: f64,
    pub satisfaction_score: Option<f64>,
}

/// Employee record after cleaning: every field present, hours non-negative
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanEmployeeRecord {
    pub employee_id: u32,
    pub name: String,
    pub department: String,
    pub tasks_completed: f64,
    pub hours_worked: f64,
    pub satisfaction_score: f64,
}

impl CleanEmployeeRecord {
    pub fn new(
        employee_id: u32,
        department: impl Into<String>,
        tasks_completed: f64,
        hours_worked: f64,
        satisfaction_score: f64,
    ) -> Self {
        Self {
            employee_id,
            name: employee_name(employee_id),
            department: department.into(),
            tasks_completed,
            hours_worked,
            satisfaction_score,
        }
    }

    /// Attach the derived KPI fields
    pub fn into_scored(self, performance_kpi: f64, kpi_normalized: f64) -> ScoredEmployeeRecord {
        ScoredEmployeeRecord {
            employee_id: self.employee_id,
            name: self.name,
            department: self.department,
            tasks_completed: self.tasks_completed,
            hours_worked: self.hours_worked,
            satisfaction_score: self.satisfaction_score,
            performance_kpi,
            kpi_normalized,
        }
    }
}

/// Employee record with its derived performance KPI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredEmployeeRecord {
    pub employee_id: u32,
    pub name: String,
    pub department: String,
    pub tasks_completed: f64,
    pub hours_worked: f64,
    pub satisfaction_score: f64,
    pub performance_kpi: f64,
    /// Min-max scaled KPI in [0, 1]
    pub kpi_normalized: f64,
}

/// Ordered collection of records; insertion order is employee id order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset<R> {
    records: Vec<R>,
}

impl<R> Dataset<R> {
    pub fn new(records: Vec<R>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, R> {
        self.records.iter()
    }

    pub fn into_records(self) -> Vec<R> {
        self.records
    }
}

impl<R> FromIterator<R> for Dataset<R> {
    fn from_iter<I: IntoIterator<Item = R>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<R> IntoIterator for Dataset<R> {
    type Item = R;
    type IntoIter = std::vec::IntoIter<R>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a, R> IntoIterator for &'a Dataset<R> {
    type Item = &'a R;
    type IntoIter = std::slice::Iter<'a, R>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_record_derives_name_from_id() {
        let record = CleanEmployeeRecord::new(7, "IT", 20.0, 40.0, 8.0);
        assert_eq!(record.name, "Employee7");
    }

    #[test]
    fn test_into_scored_keeps_clean_fields() {
        let scored = CleanEmployeeRecord::new(3, "HR", 30.0, 10.0, 5.0).into_scored(15.0, 1.0);
        assert_eq!(scored.employee_id, 3);
        assert_eq!(scored.department, "HR");
        assert_eq!(scored.tasks_completed, 30.0);
        assert_eq!(scored.performance_kpi, 15.0);
        assert_eq!(scored.kpi_normalized, 1.0);
    }

    #[test]
    fn test_dataset_preserves_insertion_order() {
        let dataset: Dataset<u32> = vec![3, 1, 2].into_iter().collect();
        assert_eq!(dataset.records(), &[3, 1, 2]);
        assert_eq!(dataset.len(), 3);
        assert!(!dataset.is_empty());
    }
}
