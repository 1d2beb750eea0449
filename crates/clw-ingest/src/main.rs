//! CLW Ingest - championship lineage loader

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use clw_common::logging::{init_logging, LogConfig, LogLevel, LogOutput};
use clw_ingest::fetcher::{FetchConfig, PageFetcher};
use clw_ingest::pipeline::{IngestPipeline, LoadMode, PipelineConfig, RunReport};
use clw_ingest::registry::SourceRegistry;
use clw_ingest::store::LineageStore;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "clw-ingest")]
#[command(author, version, about = "Championship lineage ingestion tool")]
struct Cli {
    /// SQLite database path
    #[arg(long, default_value = "data/lineage.db")]
    db: PathBuf,

    /// How to persist the run
    #[arg(long, value_enum, default_value_t = Mode::Append)]
    mode: Mode,

    /// Source registry TOML (builtin registry when omitted)
    #[arg(long)]
    sources: Option<PathBuf>,

    /// Schema artifact executed once at run start (append mode)
    #[arg(long, default_value = "sql/schema.sql")]
    schema: PathBuf,

    /// Fact table name (defaults per mode: wwe_champs / champs)
    #[arg(long)]
    fact_table: Option<String>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum Mode {
    /// Append every source into one unified fact table
    Append,
    /// Rebuild dimension tables and a surrogate-keyed fact table from scratch
    Rebuild,
}

impl From<Mode> for LoadMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Append => LoadMode::Append,
            Mode::Rebuild => LoadMode::Rebuild,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    };

    // Environment variables take precedence over flags
    let log_config = LogConfig::builder()
        .level(log_level)
        .output(LogOutput::Both)
        .log_file_prefix("clw-ingest".to_string())
        .build()
        .with_env_overrides()?;

    init_logging(&log_config)?;

    let start = Instant::now();
    info!("Run started");

    match run(cli).await {
        Ok(report) => {
            let elapsed = start.elapsed().as_secs_f64();
            for (label, rows) in &report.loaded {
                info!(rows, "Loaded {}", label);
            }
            info!(
                sources = report.loaded.len(),
                rows = report.total_rows(),
                "Run completed in {:.1}s",
                elapsed
            );

            if report.all_succeeded() {
                Ok(())
            } else {
                for (label, cause) in &report.failed {
                    error!(source = %label, "Source failed: {}", cause);
                }
                anyhow::bail!("{} source(s) failed", report.failed.len());
            }
        },
        Err(e) => {
            error!("Run failed after {:.1}s: {:#}", start.elapsed().as_secs_f64(), e);
            Err(e)
        },
    }
}

async fn run(cli: Cli) -> Result<RunReport> {
    let registry = match &cli.sources {
        Some(path) => SourceRegistry::from_path(path)?,
        None => SourceRegistry::builtin(),
    };
    info!(sources = registry.len(), "Registry loaded");

    let mode = LoadMode::from(cli.mode);

    let schema_sql = match mode {
        LoadMode::Append => Some(
            std::fs::read_to_string(&cli.schema)
                .with_context(|| format!("reading schema artifact {}", cli.schema.display()))?,
        ),
        LoadMode::Rebuild => None,
    };

    let fact_table = cli.fact_table.unwrap_or_else(|| {
        match mode {
            LoadMode::Append => "wwe_champs",
            LoadMode::Rebuild => "champs",
        }
        .to_string()
    });

    let pipeline = IngestPipeline::new(
        registry,
        PageFetcher::new(FetchConfig::default())?,
        LineageStore::new(&cli.db),
        PipelineConfig {
            mode,
            fact_table,
            schema_sql,
        },
    );

    let report = pipeline.run().await?;
    Ok(report)
}
