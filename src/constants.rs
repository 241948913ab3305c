/// Default values for every pipeline tunable and the fixed names used by the
/// export and chart sinks.

// Dataset shape
pub const DEFAULT_RECORD_COUNT: usize = 50;
pub const DEFAULT_SEED: u64 = 42;
pub const DEFAULT_DEPARTMENTS: [&str; 4] = ["Sales", "Marketing", "IT", "HR"];

// Injected defects
pub const DEFAULT_MISSING_TASKS_COUNT: usize = 7;
pub const DEFAULT_MISSING_SATISFACTION_COUNT: usize = 3;
pub const DEFAULT_NEGATIVE_HOURS_COUNT: usize = 3;

// Half-open sampling ranges [low, high)
pub const DEFAULT_TASKS_RANGE: (i64, i64) = (10, 35);
pub const DEFAULT_HOURS_RANGE: (i64, i64) = (30, 50);
pub const DEFAULT_SATISFACTION_RANGE: (i64, i64) = (5, 10);

// Outputs
pub const DEFAULT_OUTPUT_DIRECTORY: &str = "images";
pub const DEFAULT_CSV_OUTPUT_PATH: &str = "employee_performance_with_KPI.csv";
pub const DEFAULT_SUMMARY_FILE_NAME: &str = "kpi_summary.json";
pub const DEFAULT_HISTOGRAM_BINS: usize = 10;

pub const EMPLOYEE_CHART_FILE: &str = "employee_kpi_bar.svg";
pub const DEPARTMENT_CHART_FILE: &str = "department_kpi_bar.svg";
pub const HISTOGRAM_CHART_FILE: &str = "kpi_histogram.svg";
pub const METRICS_SNAPSHOT_FILE: &str = "metrics.prom";

// Column names shared by the cleaner's report and the CSV header
pub const COL_EMPLOYEE_ID: &str = "EmployeeID";
pub const COL_NAME: &str = "Name";
pub const COL_DEPARTMENT: &str = "Department";
pub const COL_TASKS_COMPLETED: &str = "TasksCompleted";
pub const COL_HOURS_WORKED: &str = "HoursWorked";
pub const COL_SATISFACTION_SCORE: &str = "SatisfactionScore";
pub const COL_PERFORMANCE_KPI: &str = "PerformanceKPI";
pub const COL_KPI_NORMALIZED: &str = "KPI_normalized";

// Environment overrides, applied after the config file
pub const ENV_SEED: &str = "EMPLOYEE_KPI_SEED";
pub const ENV_RECORDS: &str = "EMPLOYEE_KPI_RECORDS";
pub const ENV_OUTPUT_DIR: &str = "EMPLOYEE_KPI_OUTPUT_DIR";
pub const ENV_CSV_PATH: &str = "EMPLOYEE_KPI_CSV_PATH";

/// Display name for an employee id
pub fn employee_name(employee_id: u32) -> String {
    format!("Employee{employee_id}")
}

/// Default department set as owned strings
pub fn default_departments() -> Vec<String> {
    DEFAULT_DEPARTMENTS.iter().map(|d| d.to_string()).collect()
}
