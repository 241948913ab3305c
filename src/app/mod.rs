pub mod analysis_use_case;
pub mod ports;
