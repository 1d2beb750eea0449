// Row filtering and type coercion: canonical RawTable -> typed fact rows.
//
// Per-cell problems never raise. A cell that does not parse becomes None and
// the row survives; the only hard failure is an empty result set, which
// signals a structural regression upstream.

use crate::models::{
    FactRow, RawTable, COL_CHAMPION, COL_DATE, COL_DAYS, COL_DAYS_RECOGNIZED, COL_EVENT,
    COL_LOCATION, COL_NOTES, COL_REIGN, COL_TITLE_REIGN,
};
use crate::normalize::SchemaError;
use chrono::NaiveDate;
use tracing::debug;

/// The single accepted date format: "Month DD, YYYY"
const DATE_FORMAT: &str = "%B %d, %Y";

/// Sentinel for reigns shorter than one day
const LESS_THAN_ONE_DAY: &str = "<1";

/// Filter and coerce a normalized table into typed fact rows.
///
/// A row is retained only if its reign-ordinal cell parses as a number;
/// section-break and footnote rows rendered inline by wikis fail this
/// predicate and are dropped.
pub fn coerce(table: &RawTable, label: &str) -> Result<Vec<FactRow>, SchemaError> {
    let col = |name: &str| {
        table.column(name).ok_or_else(|| SchemaError::MissingColumn {
            column: name.to_string(),
            source_name: label.to_string(),
        })
    };

    let title_reign = col(COL_TITLE_REIGN)?;
    let champion = col(COL_CHAMPION)?;
    let reign = col(COL_REIGN)?;
    let date = col(COL_DATE)?;
    let days = col(COL_DAYS)?;
    let event = col(COL_EVENT)?;
    let location = col(COL_LOCATION)?;
    let notes = col(COL_NOTES)?;
    // Optional: several lineages never carried a recognized-days column
    let days_recognized = table.column(COL_DAYS_RECOGNIZED);

    let mut facts = Vec::with_capacity(table.rows.len());
    let mut dropped = 0usize;

    for row in &table.rows {
        let Some(ordinal) = coerce_int(table.cell(row, title_reign)) else {
            dropped += 1;
            continue;
        };

        facts.push(FactRow {
            title_reign: ordinal,
            reign: coerce_int(table.cell(row, reign)),
            champion: table.cell(row, champion).trim().to_string(),
            date: coerce_date(table.cell(row, date)),
            days: coerce_int(table.cell(row, days)),
            days_recognized: days_recognized.and_then(|idx| coerce_int(table.cell(row, idx))),
            event: table.cell(row, event).trim().to_string(),
            location: table.cell(row, location).trim().to_string(),
            notes: table.cell(row, notes).trim().to_string(),
            title: label.to_string(),
        });
    }

    debug!(source = label, retained = facts.len(), dropped, "Coerced rows");

    if facts.is_empty() {
        return Err(SchemaError::EmptyResult {
            source_name: label.to_string(),
        });
    }

    Ok(facts)
}

/// Parse an integer cell.
///
/// The sentinel `"<1"` (a reign shorter than one day) is rewritten to 0
/// before parsing; anything else unparsable degrades to None.
fn coerce_int(cell: &str) -> Option<i64> {
    let cell = cell.trim();
    if cell == LESS_THAN_ONE_DAY {
        return Some(0);
    }
    cell.parse().ok()
}

/// Parse a date cell against the one fixed textual format.
///
/// Ongoing or undated reigns render as placeholder text and degrade to None.
fn coerce_date(cell: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(cell.trim(), DATE_FORMAT).ok()
}
