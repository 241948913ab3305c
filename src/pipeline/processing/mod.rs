//! Pure stages of the KPI pipeline: synthesize → clean → kpi → rank.
//! None of these perform I/O.

pub mod clean;
pub mod kpi;
pub mod rank;
pub mod synthesize;

pub use clean::{clean, impute_mean, CleaningIssue, CleaningIssueType, CleaningReport};
pub use kpi::{compute_kpis, min_max_normalize, performance_kpi};
pub use rank::{build_report, DepartmentKpi, HistogramBucket, KpiHistogram, PerformanceReport};
pub use synthesize::{synthesize, DefectLog, Synthesis};
