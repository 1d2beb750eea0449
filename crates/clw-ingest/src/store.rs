// Relational store layer (SQLite via rusqlite)
//
// The store holds only a database path: every operation opens its own
// connection, runs inside one transaction, and closes on return. A
// connection is never held across a network fetch.

use crate::models::{Dimension, FactRow, KeyedFactRow};
use rusqlite::{params, Connection};
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;

/// Error types for persistence
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("schema artifact error: {0}")]
    Schema(String),
}

/// Result type alias for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// SQLite-backed lineage store
pub struct LineageStore {
    db_path: PathBuf,
}

impl LineageStore {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        LineageStore {
            db_path: db_path.into(),
        }
    }

    /// Open a connection for one logical unit of work
    fn open(&self) -> Result<Connection> {
        if let Some(parent) = self.db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Ok(Connection::open(&self.db_path)?)
    }

    /// Execute the configuration-supplied schema artifact (append-design
    /// bootstrap). The SQL is data, not engine code.
    pub fn apply_schema(&self, sql: &str) -> Result<()> {
        let conn = self.open()?;
        conn.execute_batch(sql)?;
        info!("Applied schema artifact");
        Ok(())
    }

    /// Append fact rows with text dimension fields to an existing table
    pub fn append_fact_rows(&self, table: &str, rows: &[FactRow]) -> Result<usize> {
        let mut conn = self.open()?;
        let tx = conn.transaction()?;

        {
            let mut stmt = tx.prepare(&format!(
                "INSERT INTO {} (title_reign, champion, reign, date, days, days_recognized, \
                 event, location, notes, title) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                table
            ))?;

            for row in rows {
                stmt.execute(params![
                    row.title_reign,
                    row.champion,
                    row.reign,
                    row.date.map(|d| d.to_string()),
                    row.days,
                    row.days_recognized,
                    row.event,
                    row.location,
                    row.notes,
                    row.title,
                ])?;
            }
        }

        tx.commit()?;
        info!(table, rows = rows.len(), "Appended fact rows");
        Ok(rows.len())
    }

    /// Drop and recreate a dimension table with an integer primary key and
    /// unique name column
    pub fn replace_dimension(
        &self,
        table: &str,
        id_col: &str,
        name_col: &str,
        dims: &[Dimension],
    ) -> Result<usize> {
        let mut conn = self.open()?;
        let tx = conn.transaction()?;

        tx.execute_batch(&format!(
            "DROP TABLE IF EXISTS {table};\n\
             CREATE TABLE {table} (\n\
                 {id_col}   INTEGER PRIMARY KEY,\n\
                 {name_col} TEXT NOT NULL UNIQUE\n\
             );"
        ))?;

        {
            let mut stmt = tx.prepare(&format!(
                "INSERT INTO {table} ({id_col}, {name_col}) VALUES (?1, ?2)"
            ))?;
            for dim in dims {
                stmt.execute(params![dim.id, dim.name])?;
            }
        }

        tx.commit()?;
        info!(table, rows = dims.len(), "Replaced dimension table");
        Ok(dims.len())
    }

    /// Drop and recreate the fact table with surrogate-keyed rows.
    ///
    /// Primary key is the composite (title, title_reign): reign numbering
    /// restarts per title, so the ordinal alone is not unique table-wide.
    pub fn replace_fact_table(&self, table: &str, rows: &[KeyedFactRow]) -> Result<usize> {
        let mut conn = self.open()?;
        let tx = conn.transaction()?;

        tx.execute_batch(&format!(
            "DROP TABLE IF EXISTS {table};\n\
             CREATE TABLE {table} (\n\
                 title_reign     INTEGER NOT NULL,\n\
                 champion        INTEGER NOT NULL REFERENCES champions(champion_id),\n\
                 reign           INTEGER,\n\
                 date            TEXT,\n\
                 days            INTEGER,\n\
                 days_recognized INTEGER,\n\
                 event           INTEGER NOT NULL REFERENCES events(event_id),\n\
                 location        INTEGER NOT NULL REFERENCES locations(location_id),\n\
                 notes           TEXT,\n\
                 title           TEXT NOT NULL,\n\
                 PRIMARY KEY (title, title_reign)\n\
             );"
        ))?;

        {
            let mut stmt = tx.prepare(&format!(
                "INSERT INTO {} (title_reign, champion, reign, date, days, days_recognized, \
                 event, location, notes, title) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                table
            ))?;

            for row in rows {
                stmt.execute(params![
                    row.title_reign,
                    row.champion_id,
                    row.reign,
                    row.date.map(|d| d.to_string()),
                    row.days,
                    row.days_recognized,
                    row.event_id,
                    row.location_id,
                    row.notes,
                    row.title,
                ])?;
            }
        }

        tx.commit()?;
        info!(table, rows = rows.len(), "Replaced fact table");
        Ok(rows.len())
    }
}
