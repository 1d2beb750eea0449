// Load orchestration: fetch -> locate -> normalize -> coerce -> persist.
//
// Sources run strictly sequentially in registry order. A structural failure
// in one source is recorded against its label and the run continues; only
// run-level steps (schema bootstrap, the final rebuild persist) abort.

use crate::coerce::coerce;
use crate::dimensions;
use crate::fetcher::PageFetcher;
use crate::locator::locate;
use crate::models::FactRow;
use crate::normalize::normalize;
use crate::registry::{SourceDescriptor, SourceRegistry};
use crate::store::{LineageStore, StoreError};
use crate::Result;
use tracing::{error, info};

/// How a run persists its rows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMode {
    /// One unified fact table with text dimension fields, created once from
    /// the schema artifact and appended per source
    Append,
    /// Dimension tables plus a surrogate-keyed fact table, all rebuilt from
    /// scratch every run
    Rebuild,
}

/// Run-level configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub mode: LoadMode,

    /// Fact table name (`wwe_champs` in the append design, `champs` in the
    /// rebuild design)
    pub fact_table: String,

    /// Schema-creation SQL supplied as configuration; required in append mode
    pub schema_sql: Option<String>,
}

/// Per-source outcome summary for one load run
#[derive(Debug, Default)]
pub struct RunReport {
    /// (label, persisted row count) per loaded source, in registry order
    pub loaded: Vec<(String, usize)>,
    /// (label, error) per failed source, in registry order
    pub failed: Vec<(String, String)>,
}

impl RunReport {
    pub fn total_rows(&self) -> usize {
        self.loaded.iter().map(|(_, n)| n).sum()
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }
}

/// The sequential ingestion pipeline
pub struct IngestPipeline {
    registry: SourceRegistry,
    fetcher: PageFetcher,
    store: LineageStore,
    config: PipelineConfig,
}

impl IngestPipeline {
    pub fn new(
        registry: SourceRegistry,
        fetcher: PageFetcher,
        store: LineageStore,
        config: PipelineConfig,
    ) -> Self {
        Self {
            registry,
            fetcher,
            store,
            config,
        }
    }

    /// Run one full load over every registered source
    pub async fn run(&self) -> Result<RunReport> {
        if self.config.mode == LoadMode::Append {
            let sql = self.config.schema_sql.as_deref().ok_or_else(|| {
                StoreError::Schema("append mode requires a schema artifact".to_string())
            })?;
            self.store.apply_schema(sql)?;
        }

        let total = self.registry.len();
        let mut report = RunReport::default();
        let mut accumulated: Vec<FactRow> = Vec::new();

        for (i, source) in self.registry.iter().enumerate() {
            info!("Processing {} ({} of {})", source.label, i + 1, total);

            let rows = match self.extract_source(source).await {
                Ok(rows) => rows,
                Err(e) => {
                    error!(source = %source.label, error = %e, "Failed to ingest source");
                    report.failed.push((source.label.clone(), e.to_string()));
                    continue;
                },
            };

            match self.config.mode {
                LoadMode::Append => {
                    match self.store.append_fact_rows(&self.config.fact_table, &rows) {
                        Ok(n) => {
                            info!(source = %source.label, rows = n, "Loaded source");
                            report.loaded.push((source.label.clone(), n));
                        },
                        Err(e) => {
                            error!(source = %source.label, error = %e, "Failed to persist source");
                            report.failed.push((source.label.clone(), e.to_string()));
                        },
                    }
                },
                LoadMode::Rebuild => {
                    info!(source = %source.label, rows = rows.len(), "Extracted source");
                    report.loaded.push((source.label.clone(), rows.len()));
                    accumulated.extend(rows);
                },
            }
        }

        if self.config.mode == LoadMode::Rebuild && !accumulated.is_empty() {
            let (dims, keyed) = dimensions::assign_keys(accumulated);

            self.store
                .replace_dimension("champions", "champion_id", "champion", &dims.champions)?;
            self.store.replace_dimension("events", "event_id", "event", &dims.events)?;
            self.store
                .replace_dimension("locations", "location_id", "location", &dims.locations)?;
            self.store.replace_fact_table(&self.config.fact_table, &keyed)?;

            info!(
                champions = dims.champions.len(),
                events = dims.events.len(),
                locations = dims.locations.len(),
                facts = keyed.len(),
                "Rebuilt warehouse tables"
            );
        }

        Ok(report)
    }

    /// The per-source extraction chain; every error here is structural and
    /// is isolated by the caller
    async fn extract_source(&self, source: &SourceDescriptor) -> Result<Vec<FactRow>> {
        let html = self.fetcher.fetch(&source.page).await?;
        let raw = locate(&html, &source.selector)?;
        let raw = normalize(raw, &source.fixups, &source.label)?;
        let facts = coerce(&raw, &source.label)?;
        Ok(facts)
    }
}
