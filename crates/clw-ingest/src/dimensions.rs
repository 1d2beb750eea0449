// Dimension extraction and surrogate key assignment.
//
// Distinct champion/event/location values become lookup tables with
// consecutive ids assigned in first-occurrence order, and fact rows are
// rewritten to reference them by key. Exact string equality only; the
// assignment is deterministic for a given row order.

use crate::models::{Dimension, DimensionSet, FactRow, KeyedFactRow};
use std::collections::HashMap;

/// Interning accumulator for one dimension
#[derive(Default)]
struct Interner {
    rows: Vec<Dimension>,
    index: HashMap<String, i64>,
}

impl Interner {
    /// Id for a value, assigning the next consecutive id on first sight
    fn intern(&mut self, value: &str) -> i64 {
        if let Some(&id) = self.index.get(value) {
            return id;
        }
        let id = self.rows.len() as i64 + 1;
        self.rows.push(Dimension {
            id,
            name: value.to_string(),
        });
        self.index.insert(value.to_string(), id);
        id
    }
}

/// Derive the three dimension tables from the accumulated fact rows and
/// rewrite each row's text fields to surrogate keys.
pub fn assign_keys(rows: Vec<FactRow>) -> (DimensionSet, Vec<KeyedFactRow>) {
    let mut champions = Interner::default();
    let mut events = Interner::default();
    let mut locations = Interner::default();

    let keyed = rows
        .into_iter()
        .map(|row| KeyedFactRow {
            title_reign: row.title_reign,
            reign: row.reign,
            champion_id: champions.intern(&row.champion),
            date: row.date,
            days: row.days,
            days_recognized: row.days_recognized,
            event_id: events.intern(&row.event),
            location_id: locations.intern(&row.location),
            notes: row.notes,
            title: row.title,
        })
        .collect();

    let dimensions = DimensionSet {
        champions: champions.rows,
        events: events.rows,
        locations: locations.rows,
    };

    (dimensions, keyed)
}

/// Dimension tables alone, without rewriting the fact rows
pub fn extract(rows: &[FactRow]) -> DimensionSet {
    let (dimensions, _) = assign_keys(rows.to_vec());
    dimensions
}
