pub mod config;
pub mod constants;
pub mod domain;
pub mod error;
pub mod pipeline;

// Ports, use cases and their file-backed adapters
pub mod app;
pub mod infra;

pub mod observability;

pub use config::PipelineConfig;
pub use error::{PipelineError, Result};
pub use pipeline::{Pipeline, PipelineOutput};
