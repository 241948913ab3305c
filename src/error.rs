use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("cannot impute column '{column}': no values are present")]
    EmptyMean { column: &'static str },

    #[error("employee {employee_id} has zero hours worked; KPI is undefined")]
    ZeroHoursWorked { employee_id: u32 },

    #[error("dataset is empty")]
    EmptyDataset,

    #[error("Configuration error: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("TOML serialization failed: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
