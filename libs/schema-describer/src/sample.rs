use db_connector::DbHandle;
use migration_connector::{ConnectorResult, DbRow, EngineKind};

/// Fetch up to `limit` rows via each engine's native row-limiting clause.
/// No `ORDER BY` is imposed: callers get a subset of the table's content,
/// not a particular subset. `database` is only consulted for Oracle, to
/// qualify `table` with its schema owner the way `inspect_table` does —
/// an unqualified name resolves against the connecting user's own schema,
/// which isn't necessarily the one being sampled.
#[tracing::instrument(skip(handle))]
pub async fn sample(handle: &DbHandle, database: &str, table: &str, limit: u32) -> ConnectorResult<Vec<DbRow>> {
    let sql = match handle.engine_kind() {
        EngineKind::Mysql | EngineKind::Postgres => format!("SELECT * FROM {} LIMIT {}", table, limit),
        EngineKind::SqlServer => format!("SELECT TOP {} * FROM {}", limit, table),
        EngineKind::Oracle => format!(
            "SELECT * FROM {}.{} WHERE ROWNUM <= {}",
            database.to_ascii_uppercase(),
            table,
            limit
        ),
    };

    handle.query_raw(&sql, &[]).await
}
