//! CLW Ingest Library
//!
//! Extracts championship-lineage tables from wiki documents, normalizes
//! their heterogeneous schemas into one canonical relational shape, and
//! loads the result into a SQLite warehouse.
//!
//! # Pipeline
//!
//! ```text
//! fetcher -> locator -> normalize -> coerce -> dimensions -> store
//! ```
//!
//! The [`pipeline::IngestPipeline`] drives the chain per source in registry
//! order; per-source structural failures are reported and skipped rather
//! than aborting the run.
//!
//! # Example
//!
//! ```no_run
//! use clw_ingest::fetcher::{FetchConfig, PageFetcher};
//! use clw_ingest::pipeline::{IngestPipeline, LoadMode, PipelineConfig};
//! use clw_ingest::registry::SourceRegistry;
//! use clw_ingest::store::LineageStore;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let pipeline = IngestPipeline::new(
//!         SourceRegistry::builtin(),
//!         PageFetcher::new(FetchConfig::default())?,
//!         LineageStore::new("data/lineage.db"),
//!         PipelineConfig {
//!             mode: LoadMode::Rebuild,
//!             fact_table: "champs".to_string(),
//!             schema_sql: None,
//!         },
//!     );
//!     let report = pipeline.run().await?;
//!     println!("{} rows loaded", report.total_rows());
//!     Ok(())
//! }
//! ```

pub mod coerce;
pub mod dimensions;
pub mod fetcher;
pub mod locator;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod registry;
pub mod store;

use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, IngestError>;

/// Aggregated error type for one source's trip through the pipeline
#[derive(Debug, Error)]
pub enum IngestError {
    #[error(transparent)]
    Fetch(#[from] fetcher::FetchError),

    #[error(transparent)]
    Extraction(#[from] locator::ExtractionError),

    #[error(transparent)]
    Schema(#[from] normalize::SchemaError),

    #[error(transparent)]
    Store(#[from] store::StoreError),
}
