//! End-to-end pipeline tests against a mock wiki server
//!
//! These tests exercise the full chain — fetch, locate, normalize, coerce,
//! dimension assignment, persistence — in both load designs, without
//! touching the network or a real database file outside a tempdir.

use clw_ingest::fetcher::{FetchConfig, PageFetcher};
use clw_ingest::pipeline::{IngestPipeline, LoadMode, PipelineConfig};
use clw_ingest::registry::{SourceDescriptor, SourceRegistry};
use clw_ingest::store::LineageStore;
use rusqlite::Connection;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SCHEMA_SQL: &str = include_str!("../../../sql/schema.sql");

/// A rendered wiki page: two decoy tables, then the lineage table with a
/// two-row header and a trailing citation column.
fn lineage_page(body_rows: &str) -> String {
    format!(
        r#"<html><body>
        <table><tr><th>nav</th></tr><tr><td>x</td></tr></table>
        <table><tr><th>infobox</th></tr><tr><td>y</td></tr></table>
        <table class="wikitable">
        <tr>
            <th rowspan="2">No.</th>
            <th rowspan="2">Champion</th>
            <th colspan="3">Championship change</th>
            <th colspan="2">Reign statistics</th>
            <th rowspan="2">Notes</th>
            <th rowspan="2">Ref.</th>
        </tr>
        <tr><th>Date</th><th>Event</th><th>Location</th><th>Reign</th><th>Days</th></tr>
        {body_rows}
        </table>
        </body></html>"#
    )
}

const PAGE_A_ROWS: &str = r#"
    <tr><td>1</td><td>John Doe</td><td>March 5, 2001</td><td>Big Show</td>
        <td>New York City</td><td>1</td><td>&lt;1</td><td>Won the vacant title</td><td>[1]</td></tr>
    <tr><td>N/A</td><td>Vacated</td><td>—</td><td>—</td><td>—</td><td>—</td><td>—</td>
        <td>Title vacated</td><td>[2]</td></tr>
    <tr><td>2</td><td>Jane Roe</td><td>June 1, 2002</td><td>Summer Gala</td>
        <td>Los Angeles</td><td>1</td><td>392</td><td></td><td>[3]</td></tr>
"#;

const PAGE_B_ROWS: &str = r#"
    <tr><td>1</td><td>John Doe</td><td>January 23, 1984</td><td>Winter Classic</td>
        <td>New York City</td><td>2</td><td>21</td><td></td><td>[1]</td></tr>
    <tr><td>2</td><td>Richard Miles</td><td>present</td><td>House show</td>
        <td>Chicago</td><td>1</td><td>1,141+</td><td>Current champion</td><td>[2]</td></tr>
"#;

async fn mock_wiki() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/page/Alpha_Title_Lineage"))
        .respond_with(ResponseTemplate::new(200).set_body_string(lineage_page(PAGE_A_ROWS)))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/page/Beta_Title_Lineage"))
        .respond_with(ResponseTemplate::new(200).set_body_string(lineage_page(PAGE_B_ROWS)))
        .mount(&server)
        .await;

    server
}

fn test_registry() -> SourceRegistry {
    SourceRegistry {
        sources: vec![
            SourceDescriptor::new("Alpha_Title_Lineage", "Alpha Title"),
            SourceDescriptor::new("Beta_Title_Lineage", "Beta Title"),
        ],
    }
}

fn test_fetcher(server: &MockServer) -> PageFetcher {
    PageFetcher::new(FetchConfig {
        api_base: format!("{}/page", server.uri()),
        timeout_secs: 5,
        max_retries: 0,
        user_agent: "clw-ingest-test".to_string(),
    })
    .unwrap()
}

#[tokio::test]
async fn test_append_design_end_to_end() {
    let server = mock_wiki().await;
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("append.db");

    let pipeline = IngestPipeline::new(
        test_registry(),
        test_fetcher(&server),
        LineageStore::new(&db_path),
        PipelineConfig {
            mode: LoadMode::Append,
            fact_table: "wwe_champs".to_string(),
            schema_sql: Some(SCHEMA_SQL.to_string()),
        },
    );

    let report = pipeline.run().await.unwrap();
    assert!(report.all_succeeded());
    // The N/A section-break row is dropped
    assert_eq!(report.loaded, vec![("Alpha Title".to_string(), 2), ("Beta Title".to_string(), 2)]);

    let conn = Connection::open(&db_path).unwrap();

    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM wwe_champs", [], |r| r.get(0))
        .unwrap();
    assert_eq!(count, 4);

    // "<1" coerces to 0 and the fixed-format date parses
    let (days, date): (i64, String) = conn
        .query_row(
            "SELECT days, date FROM wwe_champs WHERE title = 'Alpha Title' AND title_reign = 1",
            [],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )
        .unwrap();
    assert_eq!(days, 0);
    assert_eq!(date, "2001-03-05");

    // Ongoing reign degrades to nulls, row retained
    let (days, date): (Option<i64>, Option<String>) = conn
        .query_row(
            "SELECT days, date FROM wwe_champs WHERE title = 'Beta Title' AND title_reign = 2",
            [],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )
        .unwrap();
    assert_eq!(days, None);
    assert_eq!(date, None);

    // Reign ordinal 1 exists under both titles: composite key, no collision
    let ones: i64 = conn
        .query_row("SELECT COUNT(*) FROM wwe_champs WHERE title_reign = 1", [], |r| r.get(0))
        .unwrap();
    assert_eq!(ones, 2);
}

#[tokio::test]
async fn test_rebuild_design_end_to_end() {
    let server = mock_wiki().await;
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("rebuild.db");

    let pipeline = IngestPipeline::new(
        test_registry(),
        test_fetcher(&server),
        LineageStore::new(&db_path),
        PipelineConfig {
            mode: LoadMode::Rebuild,
            fact_table: "champs".to_string(),
            schema_sql: None,
        },
    );

    let report = pipeline.run().await.unwrap();
    assert!(report.all_succeeded());
    assert_eq!(report.total_rows(), 4);

    let conn = Connection::open(&db_path).unwrap();

    // John Doe appears in both sources but gets exactly one dimension row
    let champions: i64 = conn
        .query_row("SELECT COUNT(*) FROM champions", [], |r| r.get(0))
        .unwrap();
    assert_eq!(champions, 3);

    let john_id: i64 = conn
        .query_row("SELECT champion_id FROM champions WHERE champion = 'John Doe'", [], |r| {
            r.get(0)
        })
        .unwrap();
    assert_eq!(john_id, 1);

    let john_reigns: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM champs WHERE champion = ?1",
            [john_id],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(john_reigns, 2);

    // Shared location interned once, referenced from both sources
    let nyc: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM locations WHERE location = 'New York City'",
            [],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(nyc, 1);

    let events: i64 = conn.query_row("SELECT COUNT(*) FROM events", [], |r| r.get(0)).unwrap();
    assert_eq!(events, 4);
}

#[tokio::test]
async fn test_failed_source_is_isolated() {
    let server = mock_wiki().await;
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("partial.db");

    let registry = SourceRegistry {
        sources: vec![
            SourceDescriptor::new("Alpha_Title_Lineage", "Alpha Title"),
            SourceDescriptor::new("No_Such_Page", "Ghost Title"),
        ],
    };

    let pipeline = IngestPipeline::new(
        registry,
        test_fetcher(&server),
        LineageStore::new(&db_path),
        PipelineConfig {
            mode: LoadMode::Append,
            fact_table: "wwe_champs".to_string(),
            schema_sql: Some(SCHEMA_SQL.to_string()),
        },
    );

    let report = pipeline.run().await.unwrap();

    assert_eq!(report.loaded.len(), 1);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, "Ghost Title");
    assert!(report.failed[0].1.contains("not found"));

    // The healthy source still landed
    let conn = Connection::open(&db_path).unwrap();
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM wwe_champs", [], |r| r.get(0))
        .unwrap();
    assert_eq!(count, 2);
}
