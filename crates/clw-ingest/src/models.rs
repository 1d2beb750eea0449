// Core table and row models for lineage ingestion

use chrono::NaiveDate;

// ============================================================================
// Canonical column names
// ============================================================================

pub const COL_TITLE_REIGN: &str = "title_reign";
pub const COL_CHAMPION: &str = "champion";
pub const COL_REIGN: &str = "reign";
pub const COL_DATE: &str = "date";
pub const COL_DAYS: &str = "days";
pub const COL_DAYS_RECOGNIZED: &str = "days_recognized";
pub const COL_EVENT: &str = "event";
pub const COL_LOCATION: &str = "location";
pub const COL_NOTES: &str = "notes";

/// Columns every normalized table must carry. `days_recognized` is optional
/// because several lineages were never tracked with a recognized-days column.
pub const REQUIRED_COLUMNS: &[&str] = &[
    COL_TITLE_REIGN,
    COL_CHAMPION,
    COL_REIGN,
    COL_DATE,
    COL_DAYS,
    COL_EVENT,
    COL_LOCATION,
    COL_NOTES,
];

// ============================================================================
// Raw table
// ============================================================================

/// A tabular block lifted out of a document, before any schema work.
///
/// Headers are lower-cased by the locator; every row is padded to the header
/// width so both extraction strategies hand downstream stages the same shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let mut table = RawTable { headers, rows };
        table.pad_rows();
        table
    }

    /// Index of a header column, if present
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Cell text at (row, column index); absent cells read as empty
    pub fn cell<'a>(&'a self, row: &'a [String], idx: usize) -> &'a str {
        row.get(idx).map(String::as_str).unwrap_or("")
    }

    /// Resize every row to exactly the header width
    pub fn pad_rows(&mut self) {
        let width = self.headers.len();
        for row in &mut self.rows {
            row.resize(width, String::new());
        }
    }
}

// ============================================================================
// Typed fact rows
// ============================================================================

/// One normalized reign record with text dimension fields.
///
/// `title_reign` is guaranteed numeric: rows whose reign-ordinal cell does
/// not parse are dropped by the filter, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactRow {
    pub title_reign: i64,
    pub reign: Option<i64>,
    pub champion: String,
    pub date: Option<NaiveDate>,
    pub days: Option<i64>,
    pub days_recognized: Option<i64>,
    pub event: String,
    pub location: String,
    pub notes: String,
    /// Logical title label from configuration, never read from the document
    pub title: String,
}

/// A fact row with champion/event/location rewritten to surrogate keys
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyedFactRow {
    pub title_reign: i64,
    pub reign: Option<i64>,
    pub champion_id: i64,
    pub date: Option<NaiveDate>,
    pub days: Option<i64>,
    pub days_recognized: Option<i64>,
    pub event_id: i64,
    pub location_id: i64,
    pub notes: String,
    pub title: String,
}

// ============================================================================
// Dimensions
// ============================================================================

/// One deduplicated lookup row: a repeating text value with its surrogate key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dimension {
    pub id: i64,
    pub name: String,
}

/// The three dimension tables derived from one load run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DimensionSet {
    pub champions: Vec<Dimension>,
    pub events: Vec<Dimension>,
    pub locations: Vec<Dimension>,
}
