use crate::model::TableSchema;
use crate::{mssql, mysql, oracle, postgres};
use db_connector::DbHandle;
use migration_connector::{ConnectorResult, EngineKind};

/// Dispatches table introspection to the right per-engine implementation.
/// `handle` must already be scoped to `database` — for Oracle that means
/// the schema-level handle and `database` is treated as the schema owner;
/// for the others it's a handle opened directly against that database.
#[tracing::instrument(skip(handle))]
pub async fn inspect_table(handle: &DbHandle, database: &str, table: &str) -> ConnectorResult<TableSchema> {
    match handle.engine_kind() {
        EngineKind::Mysql => mysql::describe_table(handle, table).await,
        EngineKind::Postgres => postgres::describe_table(handle, table).await,
        EngineKind::SqlServer => mssql::describe_table(handle, table).await,
        EngineKind::Oracle => oracle::describe_table(handle, &database.to_ascii_uppercase(), table).await,
    }
}
