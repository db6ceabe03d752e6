//! End-to-end scenarios. Five of these stand up real source/target
//! databases and are `#[ignore]`d by default — run with
//! `cargo test -- --ignored` against a reachable MySQL/Postgres/SQL
//! Server/Oracle stack, configured via the `TEST_SOURCE_*`/`TEST_TARGET_*`
//! environment variables (see `helpers::endpoint_from_env`). The type
//! mapping fallback scenario needs no database and runs in the default
//! `cargo test` pass.

use migration_connector::EngineKind;
use migration_core::JobStatus;
use migration_engine_tests::{endpoint_from_env, MigrationTestApi, ProgressCollector};
use std::time::Duration;

/// Scenario 6: an unmapped (engine, engine, native_type) triple
/// passes through unchanged rather than failing the whole migration.
#[test]
fn type_mapping_fallback_passes_through_unmapped_types() {
    let mapped = sql_migration_connector::map_type("geography", EngineKind::SqlServer, EngineKind::Postgres);
    assert_eq!(mapped, "geography");
}

async fn wait_for_terminal(collector: &ProgressCollector) -> migration_core::JobReport {
    for _ in 0..600 {
        if let Some(report) = collector.last() {
            if report.status.is_terminal() {
                return report;
            }
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    panic!("job did not reach a terminal status within the test timeout");
}

/// Scenario 1: MySQL → Postgres, small table, `tinyint(1)`
/// mapped to `boolean`.
#[tokio::test]
#[ignore]
async fn mysql_to_postgres_small_table() {
    let api = MigrationTestApi::connect(
        EngineKind::Mysql,
        endpoint_from_env(EngineKind::Mysql, "SOURCE"),
        "migration_source",
        EngineKind::Postgres,
        endpoint_from_env(EngineKind::Postgres, "TARGET"),
        "migration_target",
    )
    .await;

    let collector = ProgressCollector::new();
    api.start_migration("scenario-1", vec!["people".to_owned()], collector.sink())
        .await;

    let terminal = wait_for_terminal(&collector).await;
    assert_eq!(terminal.status, JobStatus::Completed);
    assert!(terminal.tables_failed.is_empty());

    let target_tables = api.target_tables().await;
    assert!(target_tables.iter().any(|t| t == "people"));
}

/// Scenario 2: Postgres → MySQL, 2.5M rows, keyset pagination
/// in 25 chunks of 100,000.
#[tokio::test]
#[ignore]
async fn postgres_to_mysql_large_table_keyset() {
    let api = MigrationTestApi::connect(
        EngineKind::Postgres,
        endpoint_from_env(EngineKind::Postgres, "SOURCE"),
        "migration_source",
        EngineKind::Mysql,
        endpoint_from_env(EngineKind::Mysql, "TARGET"),
        "migration_target",
    )
    .await;

    let collector = ProgressCollector::new();
    api.start_migration("scenario-2", vec!["events".to_owned()], collector.sink())
        .await;

    let terminal = wait_for_terminal(&collector).await;
    assert_eq!(terminal.status, JobStatus::Completed);
    assert!(terminal.tables_failed.is_empty());
    assert_eq!(terminal.total_rows, 2_500_000);
}

/// Scenario 3: Oracle → SQL Server, no primary key, offset
/// pagination, no `IF NOT EXISTS`/`ENGINE=` in the rendered DDL.
#[tokio::test]
#[ignore]
async fn oracle_to_sqlserver_no_primary_key() {
    let api = MigrationTestApi::connect(
        EngineKind::Oracle,
        endpoint_from_env(EngineKind::Oracle, "SOURCE"),
        "HR",
        EngineKind::SqlServer,
        endpoint_from_env(EngineKind::SqlServer, "TARGET"),
        "migration_target",
    )
    .await;

    let collector = ProgressCollector::new();
    api.start_migration("scenario-3", vec!["LOG".to_owned()], collector.sink())
        .await;

    let terminal = wait_for_terminal(&collector).await;
    assert_eq!(terminal.status, JobStatus::Completed);
    assert!(terminal.tables_failed.is_empty());
}

/// Scenario 4: cancelling mid-job yields a cancelled terminal
/// snapshot with no further reports after it.
#[tokio::test]
#[ignore]
async fn cancellation_stops_after_third_in_progress_snapshot() {
    let api = MigrationTestApi::connect(
        EngineKind::Mysql,
        endpoint_from_env(EngineKind::Mysql, "SOURCE"),
        "migration_source",
        EngineKind::Postgres,
        endpoint_from_env(EngineKind::Postgres, "TARGET"),
        "migration_target",
    )
    .await;

    let tables: Vec<String> = (1..=10).map(|n| format!("cancel_table_{n}")).collect();
    let collector = ProgressCollector::new();
    api.start_migration("scenario-4", tables, collector.sink()).await;

    loop {
        let in_progress_count = collector
            .reports()
            .iter()
            .filter(|r| r.status == JobStatus::InProgress)
            .count();
        if in_progress_count >= 3 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    api.migrator.cancel("scenario-4").await;

    let terminal = wait_for_terminal(&collector).await;
    assert_eq!(terminal.status, JobStatus::Cancelled);
    assert!(terminal.tables_completed <= 3);

    let reports_before_cancel_settled = collector.reports().len();
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(
        collector.reports().len(),
        reports_before_cancel_settled,
        "no further snapshots should arrive after the terminal one"
    );
}

/// Scenario 5: the second of three tables fails its read after
/// a successful DDL emit; the job still completes with the other two
/// tables copied.
#[tokio::test]
#[ignore]
async fn partial_failure_records_the_failing_table_and_completes() {
    let api = MigrationTestApi::connect(
        EngineKind::Mysql,
        endpoint_from_env(EngineKind::Mysql, "SOURCE"),
        "migration_source",
        EngineKind::Postgres,
        endpoint_from_env(EngineKind::Postgres, "TARGET"),
        "migration_target",
    )
    .await;

    let tables = vec!["t1_ok".to_owned(), "t2_unreadable".to_owned(), "t3_ok".to_owned()];
    let collector = ProgressCollector::new();
    api.start_migration("scenario-5", tables, collector.sink()).await;

    let terminal = wait_for_terminal(&collector).await;
    assert_eq!(terminal.status, JobStatus::Completed);
    assert_eq!(terminal.tables_completed, 2);
    assert_eq!(terminal.tables_failed.len(), 1);
    assert_eq!(terminal.tables_failed[0].table, "t2_unreadable");
}
