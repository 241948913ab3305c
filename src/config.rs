use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants;
use crate::error::{PipelineError, Result};

/// Half-open integer sampling range `[low, high)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleRange {
    pub low: i64,
    pub high: i64,
}

impl SampleRange {
    pub const fn new(low: i64, high: i64) -> Self {
        Self { low, high }
    }
}

impl From<(i64, i64)> for SampleRange {
    fn from((low, high): (i64, i64)) -> Self {
        Self { low, high }
    }
}

/// Every tunable of the pipeline, from dataset shape to output locations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub record_count: usize,
    pub departments: Vec<String>,
    pub missing_tasks_count: usize,
    pub missing_satisfaction_count: usize,
    pub negative_hours_count: usize,
    pub seed: u64,
    pub histogram_bins: usize,
    pub output_directory: PathBuf,
    pub csv_output_path: PathBuf,
    pub summary_file_name: String,
    // Tables last so the TOML rendering stays valid
    pub tasks_range: SampleRange,
    pub hours_range: SampleRange,
    pub satisfaction_range: SampleRange,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            record_count: constants::DEFAULT_RECORD_COUNT,
            departments: constants::default_departments(),
            missing_tasks_count: constants::DEFAULT_MISSING_TASKS_COUNT,
            missing_satisfaction_count: constants::DEFAULT_MISSING_SATISFACTION_COUNT,
            negative_hours_count: constants::DEFAULT_NEGATIVE_HOURS_COUNT,
            seed: constants::DEFAULT_SEED,
            histogram_bins: constants::DEFAULT_HISTOGRAM_BINS,
            output_directory: PathBuf::from(constants::DEFAULT_OUTPUT_DIRECTORY),
            csv_output_path: PathBuf::from(constants::DEFAULT_CSV_OUTPUT_PATH),
            summary_file_name: constants::DEFAULT_SUMMARY_FILE_NAME.to_string(),
            tasks_range: constants::DEFAULT_TASKS_RANGE.into(),
            hours_range: constants::DEFAULT_HOURS_RANGE.into(),
            satisfaction_range: constants::DEFAULT_SATISFACTION_RANGE.into(),
        }
    }
}

impl PipelineConfig {
    /// Load configuration from a TOML file, or defaults when no path is given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content = fs::read_to_string(path).map_err(|e| {
            PipelineError::InvalidConfig(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: PipelineConfig = toml::from_str(content)?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Apply `EMPLOYEE_KPI_*` overrides from the process environment
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides using an arbitrary variable lookup
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(constants::ENV_SEED) {
            self.seed = parse_override(constants::ENV_SEED, &raw)?;
        }
        if let Some(raw) = lookup(constants::ENV_RECORDS) {
            self.record_count = parse_override(constants::ENV_RECORDS, &raw)?;
        }
        if let Some(raw) = lookup(constants::ENV_OUTPUT_DIR) {
            self.output_directory = PathBuf::from(raw.trim());
        }
        if let Some(raw) = lookup(constants::ENV_CSV_PATH) {
            self.csv_output_path = PathBuf::from(raw.trim());
        }
        Ok(())
    }

    /// Reject configurations the synthesizer cannot honour
    pub fn validate(&self) -> Result<()> {
        if self.record_count == 0 {
            return Err(invalid("record_count must be at least 1"));
        }
        if u32::try_from(self.record_count).is_err() {
            return Err(invalid("record_count exceeds the employee id range"));
        }
        if self.departments.is_empty() {
            return Err(invalid("departments must not be empty"));
        }
        if self.departments.iter().any(|d| d.trim().is_empty()) {
            return Err(invalid("department names must not be blank"));
        }
        let mut seen = std::collections::BTreeSet::new();
        if let Some(duplicate) = self.departments.iter().find(|d| !seen.insert(d.trim())) {
            return Err(invalid(&format!("department '{}' is listed twice", duplicate)));
        }

        let defects = [
            ("missing_tasks_count", self.missing_tasks_count),
            ("missing_satisfaction_count", self.missing_satisfaction_count),
            ("negative_hours_count", self.negative_hours_count),
        ];
        for (name, count) in defects {
            if count > self.record_count {
                return Err(invalid(&format!(
                    "{} ({}) exceeds record_count ({})",
                    name, count, self.record_count
                )));
            }
        }

        let ranges = [
            ("tasks_range", self.tasks_range),
            ("hours_range", self.hours_range),
            ("satisfaction_range", self.satisfaction_range),
        ];
        for (name, range) in ranges {
            if range.low >= range.high {
                return Err(invalid(&format!(
                    "{} is empty: low {} must be below high {}",
                    name, range.low, range.high
                )));
            }
        }
        // sampled values must never need repair
        if self.tasks_range.low < 0 || self.satisfaction_range.low < 0 {
            return Err(invalid("tasks_range and satisfaction_range must not go below 0"));
        }
        if self.hours_range.low < 1 {
            return Err(invalid("hours_range.low must be at least 1"));
        }

        if self.histogram_bins == 0 {
            return Err(invalid("histogram_bins must be at least 1"));
        }
        Ok(())
    }

    pub fn summary_path(&self) -> PathBuf {
        self.output_directory.join(&self.summary_file_name)
    }
}

fn invalid(message: &str) -> PipelineError {
    PipelineError::InvalidConfig(message.to_string())
}

fn parse_override<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| invalid(&format!("{} has an unparseable value '{}'", key, raw)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_match_documented_values() {
        let config = PipelineConfig::default();
        assert_eq!(config.record_count, 50);
        assert_eq!(config.departments, vec!["Sales", "Marketing", "IT", "HR"]);
        assert_eq!(config.missing_tasks_count, 7);
        assert_eq!(config.missing_satisfaction_count, 3);
        assert_eq!(config.negative_hours_count, 3);
        assert_eq!(config.seed, 42);
        assert_eq!(config.output_directory, PathBuf::from("images"));
        assert_eq!(
            config.csv_output_path,
            PathBuf::from("employee_performance_with_KPI.csv")
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = PipelineConfig::from_toml_str("seed = 7\nrecord_count = 12\n").unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.record_count, 12);
        assert_eq!(config.missing_tasks_count, 7);
        assert_eq!(config.hours_range, SampleRange::new(30, 50));
    }

    #[test]
    fn test_toml_round_trip_of_ranges() {
        let config = PipelineConfig::from_toml_str(
            "[tasks_range]\nlow = 1\nhigh = 3\n",
        )
        .unwrap();
        assert_eq!(config.tasks_range, SampleRange::new(1, 3));

        let rendered = config.to_toml_string().unwrap();
        assert_eq!(PipelineConfig::from_toml_str(&rendered).unwrap(), config);
    }

    #[test]
    fn test_env_overrides_applied() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("EMPLOYEE_KPI_SEED", "99"),
            ("EMPLOYEE_KPI_RECORDS", " 20 "),
            ("EMPLOYEE_KPI_OUTPUT_DIR", "charts"),
        ]);
        let mut config = PipelineConfig::default();
        config
            .apply_overrides_from(|k| vars.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.seed, 99);
        assert_eq!(config.record_count, 20);
        assert_eq!(config.output_directory, PathBuf::from("charts"));
        assert_eq!(
            config.csv_output_path,
            PathBuf::from("employee_performance_with_KPI.csv")
        );
    }

    #[test]
    fn test_bad_env_override_is_config_error() {
        let mut config = PipelineConfig::default();
        let err = config
            .apply_overrides_from(|k| (k == "EMPLOYEE_KPI_SEED").then(|| "forty-two".to_string()))
            .unwrap_err();
        assert!(matches!(err, PipelineError::InvalidConfig(_)));
    }

    #[test]
    fn test_validate_rejects_oversized_defect_counts() {
        let config = PipelineConfig {
            record_count: 5,
            ..PipelineConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("missing_tasks_count"));
    }

    #[test]
    fn test_validate_rejects_empty_range_and_departments() {
        let config = PipelineConfig {
            hours_range: SampleRange::new(40, 40),
            ..PipelineConfig::default()
        };
        assert!(config.validate().is_err());

        let config = PipelineConfig {
            departments: Vec::new(),
            ..PipelineConfig::default()
        };
        assert!(config.validate().is_err());

        let config = PipelineConfig {
            record_count: 0,
            missing_tasks_count: 0,
            missing_satisfaction_count: 0,
            negative_hours_count: 0,
            ..PipelineConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_ranges_that_need_cleaning() {
        let config = PipelineConfig {
            hours_range: SampleRange::new(-5, 5),
            ..PipelineConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("hours_range"));

        let config = PipelineConfig {
            hours_range: SampleRange::new(0, 5),
            ..PipelineConfig::default()
        };
        assert!(config.validate().is_err());

        let config = PipelineConfig {
            tasks_range: SampleRange::new(-1, 10),
            ..PipelineConfig::default()
        };
        assert!(config.validate().is_err());

        let config = PipelineConfig {
            satisfaction_range: SampleRange::new(-3, 10),
            ..PipelineConfig::default()
        };
        assert!(config.validate().is_err());

        let config = PipelineConfig {
            hours_range: SampleRange::new(1, 2),
            tasks_range: SampleRange::new(0, 1),
            satisfaction_range: SampleRange::new(0, 1),
            ..PipelineConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_duplicate_departments() {
        let config = PipelineConfig {
            departments: vec!["HR".to_string(), "IT".to_string(), "HR".to_string()],
            ..PipelineConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("'HR' is listed twice"));
    }

    #[test]
    fn test_example_config_matches_defaults() {
        let config = PipelineConfig::from_toml_str(include_str!("../config.example.toml")).unwrap();
        assert_eq!(config, PipelineConfig::default());
    }

    #[test]
    fn test_load_without_path_uses_defaults() {
        assert_eq!(PipelineConfig::load(None).unwrap(), PipelineConfig::default());
    }

    #[test]
    fn test_load_missing_file_is_config_error() {
        let err = PipelineConfig::load(Some(Path::new("/nonexistent/employee_kpi.toml")))
            .unwrap_err();
        assert!(matches!(err, PipelineError::InvalidConfig(_)));
    }
}
