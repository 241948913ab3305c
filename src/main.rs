use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::fs;
use std::path::PathBuf;
use tracing::{error, info};

use employee_kpi::app::analysis_use_case::AnalysisUseCase;
use employee_kpi::constants;
use employee_kpi::infra::csv_output_adapter::CsvDatasetAdapter;
use employee_kpi::observability;
use employee_kpi::pipeline::processing::synthesize;
use employee_kpi::PipelineConfig;

#[derive(Parser)]
#[command(name = "employee_kpi")]
#[command(about = "Synthetic employee performance dataset: clean, score, rank and chart")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct DatasetArgs {
    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Random seed
    #[arg(long)]
    seed: Option<u64>,
    /// Number of employee records to generate
    #[arg(long)]
    records: Option<usize>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline and write charts, CSV export and summary
    Run {
        #[command(flatten)]
        dataset: DatasetArgs,
        /// Directory for charts and the run summary
        #[arg(long)]
        output_dir: Option<PathBuf>,
        /// Path of the CSV export
        #[arg(long)]
        csv_path: Option<PathBuf>,
        /// Skip chart rendering
        #[arg(long)]
        no_charts: bool,
        /// Write a Prometheus metrics snapshot next to the charts
        #[arg(long)]
        dump_metrics: bool,
    },
    /// Write only the raw, defect-bearing dataset as CSV
    Synthesize {
        #[command(flatten)]
        dataset: DatasetArgs,
        /// Output CSV path
        #[arg(long)]
        out: PathBuf,
    },
    /// Print the effective configuration as TOML
    ShowConfig {
        /// TOML configuration file
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

/// Config file, then environment, then command-line flags
fn resolve_config(args: &DatasetArgs) -> Result<PipelineConfig> {
    let mut config = PipelineConfig::load(args.config.as_deref())?;
    config.apply_env_overrides()?;
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(records) = args.records {
        config.record_count = records;
    }
    config.validate()?;
    Ok(config)
}

fn run(
    dataset: DatasetArgs,
    output_dir: Option<PathBuf>,
    csv_path: Option<PathBuf>,
    no_charts: bool,
    dump_metrics: bool,
) -> Result<()> {
    let mut config = resolve_config(&dataset)?;
    if let Some(dir) = output_dir {
        config.output_directory = dir;
    }
    if let Some(path) = csv_path {
        config.csv_output_path = path;
    }

    println!("🚀 Running employee KPI pipeline (seed {})...", config.seed);
    let use_case = AnalysisUseCase::with_file_outputs(&config, !no_charts);
    let result = use_case.run(&config)?;

    println!("Best Employee: {}", result.best_employee);
    println!("Worst Employee: {}", result.worst_employee);
    println!("\n📊 Run {}:", result.run_id);
    println!("   Records: {}", result.record_count);
    for chart in &result.charts {
        println!("   Chart: {}", chart.display());
    }
    println!("   Summary: {}", result.summary_path.display());
    println!(
        "Final dataset saved to '{}' (sha256 {})",
        result.csv_export.path.display(),
        result.csv_export.sha256
    );

    if dump_metrics {
        if let Some(snapshot) = observability::metrics::render() {
            fs::create_dir_all(&config.output_directory)?;
            let path = config.output_directory.join(constants::METRICS_SNAPSHOT_FILE);
            fs::write(&path, snapshot)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("   Metrics: {}", path.display());
        }
    }
    Ok(())
}

fn synthesize_only(dataset: DatasetArgs, out: PathBuf) -> Result<()> {
    let config = resolve_config(&dataset)?;
    let synthesis = synthesize(&config)?;
    let receipt = CsvDatasetAdapter::new(out).write_raw(&synthesis.dataset)?;
    info!(
        "Raw dataset with {} injected defects written",
        synthesis.defects.total()
    );
    println!(
        "💾 Raw dataset ({} records) saved to '{}'",
        synthesis.dataset.len(),
        receipt.path.display()
    );
    Ok(())
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    observability::init_logging();
    observability::metrics::init();

    let cli = Cli::parse();

    let outcome = match cli.command {
        Commands::Run {
            dataset,
            output_dir,
            csv_path,
            no_charts,
            dump_metrics,
        } => run(dataset, output_dir, csv_path, no_charts, dump_metrics),
        Commands::Synthesize { dataset, out } => synthesize_only(dataset, out),
        Commands::ShowConfig { config } => {
            let mut effective = PipelineConfig::load(config.as_deref())?;
            effective.apply_env_overrides()?;
            print!("{}", effective.to_toml_string()?);
            Ok(())
        }
    };

    if let Err(e) = &outcome {
        error!("employee_kpi failed: {:#}", e);
    }
    outcome
}
