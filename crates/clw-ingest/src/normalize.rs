// Schema normalization: reconcile per-source column variations into the
// canonical layout before any typing happens.

use crate::models::{RawTable, COL_DAYS_RECOGNIZED, COL_NOTES, COL_TITLE_REIGN, REQUIRED_COLUMNS};
use crate::registry::ColumnFixup;
use thiserror::Error;
use tracing::debug;

/// Error types for schema normalization and row filtering
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("required column '{column}' missing from source '{source_name}'")]
    MissingColumn { column: String, source_name: String },

    #[error("fixup anchor column '{anchor}' missing from source '{source_name}'")]
    UnknownAnchor { anchor: String, source_name: String },

    #[error("no data rows survived filtering for source '{source_name}'")]
    EmptyResult { source_name: String },
}

/// Map an observed header spelling to its canonical column name.
///
/// The reign-ordinal and recognized-days headers each appear under more than
/// one spelling across sources; everything else is already canonical once
/// lower-cased.
fn canonical_name(header: &str) -> &str {
    match header {
        "no." | "no" => COL_TITLE_REIGN,
        "days recog." | "days recog" | "days recognized" => COL_DAYS_RECOGNIZED,
        other => other,
    }
}

/// Normalize a located table into canonical column shape.
///
/// Passes, in order: lower-case/trim headers, apply configured column
/// fixups, truncate trailing columns after `notes`, rename header synonyms.
/// Idempotent: normalizing an already-canonical table is a no-op.
pub fn normalize(
    mut table: RawTable,
    fixups: &[ColumnFixup],
    source: &str,
) -> Result<RawTable, SchemaError> {
    // 1. Lower-case and trim headers (the locator usually has already)
    for header in &mut table.headers {
        *header = header.trim().to_lowercase();
    }

    // 2. Column fixups: insert a null-filled column right after its anchor
    for fixup in fixups {
        let insert = fixup.insert.trim().to_lowercase();
        let anchor = fixup.after.trim().to_lowercase();

        // Already present (possibly under its canonical name): nothing to do
        let canonical = canonical_name(&insert).to_string();
        if table.column(&insert).is_some() || table.column(&canonical).is_some() {
            continue;
        }

        let at = table
            .column(&anchor)
            .or_else(|| table.column(canonical_name(&anchor)))
            .ok_or_else(|| SchemaError::UnknownAnchor {
                anchor: fixup.after.clone(),
                source_name: source.to_string(),
            })?;

        table.headers.insert(at + 1, insert);
        for row in &mut table.rows {
            if row.len() > at {
                row.insert(at + 1, String::new());
            }
        }
        debug!(column = %fixup.insert, source, "Inserted fixup column");
    }

    // 3. Truncate extraneous trailing columns (citations/references) after
    //    the canonical boundary column
    if let Some(boundary) = table.column(COL_NOTES) {
        table.headers.truncate(boundary + 1);
        for row in &mut table.rows {
            row.truncate(boundary + 1);
        }
    }

    // 4. Rename observed synonyms to canonical names
    for header in &mut table.headers {
        let canonical = canonical_name(header);
        if canonical != header {
            *header = canonical.to_string();
        }
    }

    table.pad_rows();

    // Canonical presence check
    for column in REQUIRED_COLUMNS {
        if table.column(column).is_none() {
            return Err(SchemaError::MissingColumn {
                column: column.to_string(),
                source_name: source.to_string(),
            });
        }
    }

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wiki_headers() -> Vec<String> {
        ["no.", "champion", "date", "event", "location", "reign", "days", "notes", "ref."]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn sample_row() -> Vec<String> {
        ["1", "Alice", "March 5, 2001", "Show", "NYC", "1", "21", "first", "[1]"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn test_truncates_after_notes_and_renames() {
        let table = RawTable::new(wiki_headers(), vec![sample_row()]);
        let normalized = normalize(table, &[], "test").unwrap();

        assert_eq!(
            normalized.headers,
            vec!["title_reign", "champion", "date", "event", "location", "reign", "days", "notes"]
        );
        assert_eq!(normalized.rows[0].len(), 8);
        assert_eq!(normalized.rows[0][7], "first");
    }

    #[test]
    fn test_fixup_inserts_null_column_after_anchor() {
        let fixups = vec![ColumnFixup {
            insert: "days recog.".to_string(),
            after: "days".to_string(),
        }];
        let table = RawTable::new(wiki_headers(), vec![sample_row()]);
        let normalized = normalize(table, &fixups, "test").unwrap();

        let days = normalized.column("days").unwrap();
        assert_eq!(normalized.column("days_recognized"), Some(days + 1));
        assert_eq!(normalized.rows[0][days + 1], "");
    }

    #[test]
    fn test_fixup_unknown_anchor() {
        let fixups = vec![ColumnFixup {
            insert: "days recog.".to_string(),
            after: "bogus".to_string(),
        }];
        let table = RawTable::new(wiki_headers(), vec![sample_row()]);
        let err = normalize(table, &fixups, "test").unwrap_err();

        assert!(matches!(err, SchemaError::UnknownAnchor { .. }));
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let fixups = vec![ColumnFixup {
            insert: "days recog.".to_string(),
            after: "days".to_string(),
        }];
        let table = RawTable::new(wiki_headers(), vec![sample_row()]);

        let once = normalize(table, &fixups, "test").unwrap();
        let twice = normalize(once.clone(), &fixups, "test").unwrap();

        assert_eq!(once, twice);
    }

    #[test]
    fn test_missing_required_column() {
        let headers = vec!["no.".to_string(), "champion".to_string(), "notes".to_string()];
        let table = RawTable::new(headers, vec![]);
        let err = normalize(table, &[], "wwe championship").unwrap_err();

        match err {
            SchemaError::MissingColumn { column, source_name: source } => {
                assert_eq!(column, "reign");
                assert_eq!(source, "wwe championship");
            },
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_mixed_case_headers_lowered() {
        let headers = vec![
            "No.".to_string(),
            "Champion".to_string(),
            "Date".to_string(),
            "Event".to_string(),
            "Location".to_string(),
            "Reign".to_string(),
            "Days".to_string(),
            "Notes".to_string(),
        ];
        let table = RawTable::new(headers, vec![]);
        let normalized = normalize(table, &[], "test").unwrap();

        assert_eq!(normalized.headers[0], "title_reign");
        assert_eq!(normalized.headers[1], "champion");
    }
}
