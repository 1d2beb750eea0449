// Table location for wiki-style documents
//
// Two extraction strategies, tried in order, first success wins:
// 1. ParsedGrid: enumerate every <table>, pick by selector, expand the table
//    into a rectangular grid honoring rowspan/colspan, flatten multi-level
//    headers to the lowest header row.
// 2. Wikitable: naive traversal of the first table.wikitable, first row as
//    headers, no span handling.
//
// Both produce the same RawTable shape so downstream stages never know which
// strategy ran.

use crate::models::RawTable;
use scraper::{ElementRef, Html, Selector};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

/// Table position used when a source carries no override.
pub const DEFAULT_TABLE_INDEX: usize = 2;

/// Which tabular block inside a fetched document holds the lineage data
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableSelector {
    /// Positional index among all `<table>` elements in the document
    Index(usize),
    /// First table whose flattened header row contains the named column
    Header(String),
}

impl Default for TableSelector {
    fn default() -> Self {
        TableSelector::Index(DEFAULT_TABLE_INDEX)
    }
}

/// Error types for table location
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("document contains no tables")]
    NoTables,

    #[error("table index {index} out of range ({count} tables in document)")]
    IndexOutOfRange { index: usize, count: usize },

    #[error("no table with header column '{0}'")]
    NoHeaderMatch(String),

    #[error("malformed table: {0}")]
    MalformedTable(String),
}

/// Locate the lineage table in a rendered document.
///
/// Tries each strategy in order; a strategy that errors or yields a table
/// with no data rows hands over to the next one. When every strategy fails
/// the last error is returned.
pub fn locate(html: &str, selector: &TableSelector) -> Result<RawTable, ExtractionError> {
    let document = Html::parse_document(html);

    let mut last_error = ExtractionError::NoTables;
    for strategy in [Strategy::ParsedGrid, Strategy::Wikitable] {
        match strategy.extract(&document, selector) {
            Ok(table) if !table.rows.is_empty() => {
                debug!(
                    strategy = strategy.name(),
                    columns = table.headers.len(),
                    rows = table.rows.len(),
                    "Located table"
                );
                return Ok(table);
            },
            Ok(_) => {
                warn!(strategy = strategy.name(), "Strategy produced an empty table, falling back");
                last_error = ExtractionError::MalformedTable("table has no data rows".to_string());
            },
            Err(e) => {
                warn!(strategy = strategy.name(), error = %e, "Strategy failed, falling back");
                last_error = e;
            },
        }
    }

    Err(last_error)
}

#[derive(Debug, Clone, Copy)]
enum Strategy {
    ParsedGrid,
    Wikitable,
}

impl Strategy {
    fn name(self) -> &'static str {
        match self {
            Strategy::ParsedGrid => "parsed-grid",
            Strategy::Wikitable => "wikitable",
        }
    }

    fn extract(
        self,
        document: &Html,
        selector: &TableSelector,
    ) -> Result<RawTable, ExtractionError> {
        match self {
            Strategy::ParsedGrid => extract_parsed_grid(document, selector),
            Strategy::Wikitable => extract_wikitable(document),
        }
    }
}

// ============================================================================
// Primary strategy: parsed grid
// ============================================================================

fn extract_parsed_grid(
    document: &Html,
    selector: &TableSelector,
) -> Result<RawTable, ExtractionError> {
    let table_sel = Selector::parse("table").unwrap();
    let tables: Vec<ElementRef> = document.select(&table_sel).collect();

    if tables.is_empty() {
        return Err(ExtractionError::NoTables);
    }

    match selector {
        TableSelector::Index(index) => {
            let table = tables.get(*index).ok_or(ExtractionError::IndexOutOfRange {
                index: *index,
                count: tables.len(),
            })?;
            table_to_raw(*table)
        },
        TableSelector::Header(marker) => {
            for table in &tables {
                if let Ok(raw) = table_to_raw(*table) {
                    if raw.headers.iter().any(|h| h == marker) {
                        return Ok(raw);
                    }
                }
            }
            Err(ExtractionError::NoHeaderMatch(marker.clone()))
        },
    }
}

/// Expand one `<table>` into a RawTable.
///
/// Builds a rectangular grid where rowspan/colspan cells replicate their text
/// into every position they cover. The leading run of all-`<th>` rows is the
/// header block; the lowest row of that block becomes the flattened header
/// (grouping rows above it are dropped, rowspanned field names carry down).
fn table_to_raw(table: ElementRef) -> Result<RawTable, ExtractionError> {
    let tr_sel = Selector::parse("tr").unwrap();

    #[derive(Clone)]
    struct GridCell {
        text: String,
        header: bool,
    }

    let mut grid: Vec<Vec<Option<GridCell>>> = Vec::new();

    for (r, row_el) in table.select(&tr_sel).enumerate() {
        if grid.len() <= r {
            grid.resize(r + 1, Vec::new());
        }

        let mut c = 0usize;
        for cell_el in row_cells(row_el) {
            // Skip slots already claimed by a rowspan from an earlier row
            while grid[r].get(c).is_some_and(Option::is_some) {
                c += 1;
            }

            let cell = GridCell {
                text: cell_text(cell_el),
                header: cell_el.value().name() == "th",
            };
            let colspan = span_attr(cell_el, "colspan");
            let rowspan = span_attr(cell_el, "rowspan");

            for rr in r..r + rowspan {
                if grid.len() <= rr {
                    grid.resize(rr + 1, Vec::new());
                }
                for cc in c..c + colspan {
                    if grid[rr].len() <= cc {
                        grid[rr].resize(cc + 1, None);
                    }
                    grid[rr][cc] = Some(cell.clone());
                }
            }

            c += colspan;
        }
    }

    // Leading run of all-header rows forms the header block
    let header_depth = grid
        .iter()
        .take_while(|row| {
            !row.is_empty() && row.iter().flatten().all(|cell| cell.header)
        })
        .count();

    if header_depth == 0 {
        return Err(ExtractionError::MalformedTable("no header row".to_string()));
    }

    let headers: Vec<String> = grid[header_depth - 1]
        .iter()
        .map(|cell| {
            cell.as_ref()
                .map(|c| c.text.to_lowercase())
                .unwrap_or_default()
        })
        .collect();

    let rows: Vec<Vec<String>> = grid[header_depth..]
        .iter()
        .filter(|row| row.iter().flatten().any(|cell| !cell.text.is_empty()))
        .map(|row| {
            row.iter()
                .map(|cell| cell.as_ref().map(|c| c.text.clone()).unwrap_or_default())
                .collect()
        })
        .collect();

    Ok(RawTable::new(headers, rows))
}

// ============================================================================
// Fallback strategy: wikitable class traversal
// ============================================================================

/// Direct markup traversal of the canonical wiki table.
///
/// No span handling: each row is the text of its th/td cells in document
/// order, the first row is the header row.
fn extract_wikitable(document: &Html) -> Result<RawTable, ExtractionError> {
    let table_sel = Selector::parse("table.wikitable").unwrap();
    let tr_sel = Selector::parse("tr").unwrap();

    let table = document
        .select(&table_sel)
        .next()
        .ok_or(ExtractionError::NoTables)?;

    let mut rows: Vec<Vec<String>> = Vec::new();
    for row_el in table.select(&tr_sel) {
        let cells: Vec<String> = row_cells(row_el).map(cell_text).collect();
        if !cells.is_empty() {
            rows.push(cells);
        }
    }

    if rows.len() < 2 {
        return Err(ExtractionError::MalformedTable(
            "wikitable has no data rows".to_string(),
        ));
    }

    let headers: Vec<String> = rows.remove(0).iter().map(|h| h.to_lowercase()).collect();

    Ok(RawTable::new(headers, rows))
}

// ============================================================================
// Cell helpers
// ============================================================================

/// Direct th/td children of a row, excluding cells of any nested table
fn row_cells(row: ElementRef) -> impl Iterator<Item = ElementRef> {
    row.children().filter_map(ElementRef::wrap).filter(|el| {
        let name = el.value().name();
        name == "th" || name == "td"
    })
}

/// Whitespace-collapsed text content of a cell
fn cell_text(el: ElementRef) -> String {
    el.text().collect::<String>().split_whitespace().collect::<Vec<_>>().join(" ")
}

/// colspan/rowspan attribute, clamped to a sane range
fn span_attr(el: ElementRef, attr: &str) -> usize {
    el.value()
        .attr(attr)
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(1)
        .clamp(1, 64)
}
