pub mod chart_adapter;
pub mod csv_output_adapter;
pub mod summary_output_adapter;
