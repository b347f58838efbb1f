#![cfg(feature = "db-tests")]
//! Integration tests against a live PostgreSQL.
//!
//! Requires `DATABASE_URL` and the `db-tests` feature. Each test builds
//! its own throwaway schema, so tests are independent and repeatable. The
//! fixtures are written with a direct client; the engine under test only
//! ever reads.

use dbscout_core::{Domain, SessionEvent};
use dbscout_engine::{Engine, EngineConfig, EngineError};
use tokio_postgres::NoTls;

/// Direct (non-pooled) client for fixture setup.
async fn admin_client() -> tokio_postgres::Client {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for db-tests");
    let (client, connection) = tokio_postgres::connect(&url, NoTls)
        .await
        .expect("connect to test database");
    tokio::spawn(async move {
        let _ = connection.await;
    });
    client
}

/// Recreate `schema` with the standard fixture tables.
async fn setup_schema(schema: &str) -> tokio_postgres::Client {
    let client = admin_client().await;
    let ddl = format!(
        "DROP SCHEMA IF EXISTS {schema} CASCADE;
         CREATE SCHEMA {schema};
         CREATE TABLE {schema}.measurements_weight (
             id bigserial PRIMARY KEY,
             measured_at timestamptz NOT NULL,
             weight_kg double precision NOT NULL,
             source text
         );
         CREATE TABLE {schema}.steps_daily (
             date date NOT NULL,
             steps integer
         );
         CREATE TABLE {schema}.empty_box (
             id integer PRIMARY KEY
         );
         INSERT INTO {schema}.measurements_weight (measured_at, weight_kg, source) VALUES
             (now() - interval '2 days', 81.5, 'scale'),
             (now() - interval '1 day', 80.75, 'scale'),
             (now(), 80.25, 'manual');
         INSERT INTO {schema}.steps_daily (date, steps) VALUES
             (current_date - 1, 9000),
             (current_date, 11000);"
    );
    client.batch_execute(&ddl).await.expect("fixture DDL");
    client
}

async fn engine_for(schema: &str) -> Engine {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for db-tests");
    let config = EngineConfig::new(url).with_schema(schema);
    Engine::bootstrap(&config).await.expect("engine bootstrap")
}

#[tokio::test]
async fn catalog_introspection_reads_fixture_schema() {
    let schema = "dbscout_it_catalog";
    let _admin = setup_schema(schema).await;
    let engine = engine_for(schema).await;

    let tables = engine.catalog.list_tables().await.unwrap();
    assert_eq!(tables, vec!["empty_box", "measurements_weight", "steps_daily"]);

    let columns = engine.catalog.list_columns("measurements_weight").await.unwrap();
    let names: Vec<_> = columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["id", "measured_at", "weight_kg", "source"]);
    assert_eq!(columns[0].ordinal, 1);
    assert!(!columns[0].nullable);
    assert!(columns[3].nullable);

    let pk = engine.catalog.primary_key_columns("measurements_weight").await.unwrap();
    assert_eq!(pk, vec!["id"]);
    assert!(engine.catalog.primary_key_columns("steps_daily").await.unwrap().is_empty());

    assert!(engine.catalog.table_exists("steps_daily").await.unwrap());
    assert!(!engine.catalog.table_exists("missing").await.unwrap());
    assert!(!engine.catalog.table_exists("x; DROP TABLE x").await.unwrap());

    assert_eq!(engine.catalog.row_count("measurements_weight").await.unwrap(), 3);
    assert_eq!(engine.catalog.row_count("not a name").await.unwrap(), 0);

    let described = engine.catalog.describe_table("measurements_weight").await.unwrap().unwrap();
    assert_eq!(described.primary_key, vec!["id"]);
    let indexes = engine.catalog.indexes("measurements_weight").await.unwrap();
    assert!(indexes.iter().any(|ix| ix.definition.contains("id")));
}

#[tokio::test]
async fn browse_pages_and_counts() {
    let schema = "dbscout_it_browse";
    let _admin = setup_schema(schema).await;
    let engine = engine_for(schema).await;

    // Empty table: empty headers and rows, but the count still ran.
    let empty = engine.browser.browse("empty_box", 20, 0).await.unwrap();
    assert!(empty.columns.is_empty());
    assert!(empty.rows.is_empty());
    assert_eq!(empty.total, Some(0));

    // Unsafe identifier: rejected before any query.
    let rejected = engine.browser.browse("users; DROP TABLE users", 20, 0).await.unwrap();
    assert!(rejected.rows.is_empty());
    assert_eq!(rejected.total, Some(0));

    let page = engine.browser.browse("measurements_weight", 2, 0).await.unwrap();
    assert_eq!(page.columns, ["id", "measured_at", "weight_kg", "source"]);
    assert_eq!(page.rows.len(), 2);
    assert_eq!(page.total, Some(3));
    // ORDER BY 1 DESC over a serial pk: newest ids first.
    assert_eq!(page.rows[0][0], serde_json::json!(3));

    let next = engine.browser.browse("measurements_weight", 2, 2).await.unwrap();
    assert_eq!(next.rows.len(), 1);
    assert_eq!(next.total, Some(3));
}

#[tokio::test]
async fn data_queries_read_the_configured_schema() {
    let schema = "dbscout_it_schema_scope";
    let admin = setup_schema(schema).await;

    // A same-named decoy in public: search_path resolution would serve
    // this table instead of the fixture.
    admin
        .batch_execute(
            "DROP TABLE IF EXISTS public.measurements_weight;
             CREATE TABLE public.measurements_weight (
                 id bigserial PRIMARY KEY,
                 measured_at timestamptz NOT NULL,
                 weight_kg double precision NOT NULL,
                 source text
             );
             INSERT INTO public.measurements_weight (measured_at, weight_kg) VALUES (now(), 999.5);",
        )
        .await
        .expect("decoy DDL");

    let engine = engine_for(schema).await;

    assert_eq!(engine.catalog.row_count("measurements_weight").await.unwrap(), 3);

    let page = engine.browser.browse("measurements_weight", 10, 0).await.unwrap();
    assert_eq!(page.total, Some(3));
    assert_eq!(page.rows[0][2], serde_json::json!(80.25));

    let latest = engine.domains.latest(Domain::Weight).await.unwrap().unwrap();
    assert_eq!(latest["weight_kg"], serde_json::json!(80.25));

    let series = engine.domains.series(Domain::Weight, 10).await.unwrap();
    assert_eq!(series, vec![Some(81.5), Some(80.75), Some(80.25)]);

    admin
        .batch_execute("DROP TABLE public.measurements_weight;")
        .await
        .expect("decoy cleanup");
}

#[tokio::test]
async fn domains_resolve_against_live_schema() {
    let schema = "dbscout_it_domains";
    let _admin = setup_schema(schema).await;
    let engine = engine_for(schema).await;

    let map = engine.domains.mapping();
    let weight = map.get(Domain::Weight);
    assert!(weight.is_available());
    assert_eq!(weight.table.as_deref(), Some("measurements_weight"));

    assert!(map.get(Domain::Steps).is_available());
    // No sleep or heart fixtures: unavailable, queries are no-ops.
    assert!(!map.get(Domain::Sleep).is_available());
    assert!(!map.get(Domain::HeartRate).is_available());

    let latest = engine.domains.latest(Domain::Weight).await.unwrap().unwrap();
    assert_eq!(latest["weight_kg"], serde_json::json!(80.25));

    assert_eq!(engine.domains.count(Domain::Weight).await.unwrap(), 3);
    assert_eq!(engine.domains.count(Domain::Sleep).await.unwrap(), 0);

    let series = engine.domains.series(Domain::Weight, 10).await.unwrap();
    assert_eq!(series, vec![Some(81.5), Some(80.75), Some(80.25)]);

    let recent = engine.domains.recent(Domain::Steps, 14, 0).await.unwrap();
    assert_eq!(recent.rows.len(), 2);

    let now = chrono::Utc::now();
    let sum = engine
        .domains
        .sum_in_range(
            Domain::Weight,
            now - chrono::Duration::hours(36),
            now + chrono::Duration::hours(1),
        )
        .await
        .unwrap();
    assert_eq!(sum, Some(161.0), "half-open range keeps the last two readings");

    let steps_total = engine
        .domains
        .sum_in_range(
            Domain::Steps,
            now - chrono::Duration::days(10),
            now + chrono::Duration::days(1),
        )
        .await
        .unwrap();
    assert_eq!(steps_total, Some(20000.0));

    let future = engine
        .domains
        .sum_in_range(
            Domain::Weight,
            now + chrono::Duration::days(1),
            now + chrono::Duration::days(2),
        )
        .await
        .unwrap();
    assert_eq!(future, None, "an empty range sums to nothing");

    let (recent_avg, previous_avg) = engine.domains.trend_averages(Domain::Weight, 7).await.unwrap();
    assert!(recent_avg.is_some());
    assert_eq!(previous_avg, None, "not enough history for a previous window");

    let none = engine.domains.latest(Domain::HeartRate).await.unwrap();
    assert!(none.is_none());
}

#[tokio::test]
async fn read_only_transaction_blocks_smuggled_writes() {
    let schema = "dbscout_it_readonly";
    let _admin = setup_schema(schema).await;
    let engine = engine_for(schema).await;

    // A statement that slipped past validation still dies at the database.
    let err = engine
        .db
        .execute_readonly(&format!("UPDATE {schema}.steps_daily SET steps = 0"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Database));

    // And the data is untouched.
    let rows = engine
        .db
        .execute_readonly(&format!("SELECT steps FROM {schema}.steps_daily ORDER BY steps"))
        .await
        .unwrap();
    assert_eq!(rows.len(), 2);
}

#[tokio::test]
async fn guided_session_end_to_end_issues_one_browse() {
    let schema = "dbscout_it_session";
    let _admin = setup_schema(schema).await;
    let engine = engine_for(schema).await;
    let user = 42;

    engine.sessions.open(user);

    let reply = engine.sessions.handle(user, SessionEvent::GuidedSelected).await.unwrap();
    let dbscout_engine::SessionReply::TableMenu(tables) = reply else {
        panic!("expected table menu, got {reply:?}");
    };
    assert!(tables.contains(&"measurements_weight".to_string()));

    let reply = engine
        .sessions
        .handle(user, SessionEvent::TableChosen("measurements_weight".to_string()))
        .await
        .unwrap();
    assert_eq!(
        reply,
        dbscout_engine::SessionReply::LimitMenu {
            table: "measurements_weight".to_string()
        }
    );

    let reply = engine.sessions.handle(user, SessionEvent::LimitChosen(50)).await.unwrap();
    let dbscout_engine::SessionReply::BrowseResult { table, result } = reply else {
        panic!("expected browse result, got {reply:?}");
    };
    assert_eq!(table, "measurements_weight");
    assert_eq!(result.total, Some(3));
    assert_eq!(result.rows.len(), 3);
    assert_eq!(engine.sessions.state(user), None, "terminal state clears the session");
}

#[tokio::test]
async fn raw_mode_caps_rows_and_runs_read_only() {
    let schema = "dbscout_it_raw";
    let _admin = setup_schema(schema).await;
    let engine = engine_for(schema).await;
    let user = 43;

    engine.sessions.open(user);
    engine.sessions.handle(user, SessionEvent::RawSelected).await.unwrap();

    let reply = engine
        .sessions
        .handle(
            user,
            SessionEvent::SqlEntered(format!(
                "SELECT steps FROM {schema}.steps_daily ORDER BY steps DESC"
            )),
        )
        .await
        .unwrap();
    let dbscout_engine::SessionReply::RawResult(result) = reply else {
        panic!("expected raw result, got {reply:?}");
    };
    assert_eq!(result.columns, ["steps"]);
    assert_eq!(result.rows[0][0], serde_json::json!(11000));
    assert_eq!(result.total, None);
}
