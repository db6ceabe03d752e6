use chrono::{TimeZone, Utc};
use migration_connector::{ConnectorError, ConnectorResult, DbRow, DbValue, EngineKind};
use quaint::{
    ast::Value as QuaintValue,
    connector::ResultSet,
    prelude::Queryable,
    single::Quaint,
};
use std::sync::Arc;
use tokio::sync::Mutex as AsyncMutex;

/// A live handle to one endpoint. `quaint` covers MySQL, Postgres and SQL
/// Server uniformly; Oracle has no async driver in the ecosystem, so its
/// handle wraps the blocking `oracle` crate
/// and every call is shipped to `spawn_blocking`. This is the one place that
/// distinction leaks out of `db-connector` — everything above this module
/// only ever sees `DbHandle`.
pub enum DbHandle {
    Sql(Quaint),
    Oracle(Arc<AsyncMutex<oracle::Connection>>),
}

impl DbHandle {
    pub fn engine_kind(&self) -> EngineKind {
        match self {
            DbHandle::Sql(q) => match q.connection_info().sql_family() {
                quaint::prelude::SqlFamily::Mysql => EngineKind::Mysql,
                quaint::prelude::SqlFamily::Postgres => EngineKind::Postgres,
                quaint::prelude::SqlFamily::Mssql => EngineKind::SqlServer,
                quaint::prelude::SqlFamily::Sqlite => unreachable!("sqlite is not a supported engine"),
            },
            DbHandle::Oracle(_) => EngineKind::Oracle,
        }
    }

    /// A trivial round trip used to validate connectivity.
    pub async fn probe(&self) -> ConnectorResult<()> {
        match self {
            DbHandle::Sql(_) => self.raw_cmd("SELECT 1").await,
            DbHandle::Oracle(_) => self.raw_cmd("SELECT 1 FROM dual").await,
        }
    }

    pub async fn raw_cmd(&self, sql: &str) -> ConnectorResult<()> {
        match self {
            DbHandle::Sql(q) => q.raw_cmd(sql).await.map_err(ConnectorError::query_failed),
            DbHandle::Oracle(conn) => {
                let conn = conn.clone();
                let sql = sql.to_owned();
                tokio::task::spawn_blocking(move || {
                    let conn = conn.blocking_lock();
                    conn.execute(&sql, &[]).map(|_| ())
                })
                .await
                .map_err(|e| ConnectorError::generic(anyhow::anyhow!(e)))?
                .map_err(ConnectorError::query_failed)
            }
        }
    }

    pub async fn query_raw(&self, sql: &str, params: &[DbValue]) -> ConnectorResult<Vec<DbRow>> {
        match self {
            DbHandle::Sql(q) => {
                let quaint_params: Vec<QuaintValue<'_>> = params.iter().map(db_value_to_quaint).collect();
                let result_set = q
                    .query_raw(sql, &quaint_params)
                    .await
                    .map_err(ConnectorError::query_failed)?;
                Ok(result_set_to_rows(result_set))
            }
            DbHandle::Oracle(conn) => {
                let conn = conn.clone();
                let sql = sql.to_owned();
                let params = params.to_vec();
                tokio::task::spawn_blocking(move || -> ConnectorResult<Vec<DbRow>> {
                    let conn = conn.blocking_lock();
                    let binds: Vec<&dyn oracle::sql_type::ToSql> =
                        params.iter().map(db_value_as_oracle_bind).collect();
                    let result_set = conn.query(&sql, &binds).map_err(ConnectorError::query_failed)?;
                    let column_names: Vec<String> =
                        result_set.column_info().iter().map(|c| c.name().to_owned()).collect();

                    let mut rows = Vec::new();
                    for row in result_set {
                        let row = row.map_err(ConnectorError::query_failed)?;
                        let mut out: DbRow = Vec::with_capacity(column_names.len());
                        for (idx, name) in column_names.iter().enumerate() {
                            let value: oracle::SqlValue = row
                                .get::<_, oracle::SqlValue>(idx)
                                .map_err(ConnectorError::query_failed)?;
                            out.push((name.clone(), oracle_value_to_db_value(&value)));
                        }
                        rows.push(out);
                    }
                    Ok(rows)
                })
                .await
                .map_err(|e| ConnectorError::generic(anyhow::anyhow!(e)))?
            }
        }
    }

    /// Postgres's fastest write path: a `COPY ... FROM STDIN` command plus
    /// a manually framed tab-delimited byte stream,
    /// written through the copy-in sink `quaint`'s Postgres connector
    /// exposes for exactly this purpose.
    pub async fn postgres_copy_in(&self, copy_sql: &str, body: Vec<u8>) -> ConnectorResult<u64> {
        match self {
            DbHandle::Sql(q) => q.copy_in(copy_sql, body).await.map_err(ConnectorError::query_failed),
            DbHandle::Oracle(_) => Err(ConnectorError::generic(anyhow::anyhow!(
                "postgres_copy_in called on a non-postgres handle"
            ))),
        }
    }

    /// Array-bound `INSERT` for Oracle: one round trip binds the whole
    /// chunk via the `oracle` crate's `Batch` API.
    pub async fn oracle_batch_insert(&self, sql: &str, rows: Vec<Vec<DbValue>>) -> ConnectorResult<u64> {
        let conn = match self {
            DbHandle::Oracle(conn) => conn.clone(),
            DbHandle::Sql(_) => {
                return Err(ConnectorError::generic(anyhow::anyhow!(
                    "oracle_batch_insert called on a non-oracle handle"
                )))
            }
        };
        let sql = sql.to_owned();
        tokio::task::spawn_blocking(move || -> ConnectorResult<u64> {
            let conn = conn.blocking_lock();
            let mut batch = conn
                .batch(&sql, rows.len().max(1))
                .build()
                .map_err(ConnectorError::query_failed)?;

            for row in &rows {
                let binds: Vec<&dyn oracle::sql_type::ToSql> = row.iter().map(db_value_as_oracle_bind).collect();
                batch.append_row(&binds).map_err(ConnectorError::query_failed)?;
            }
            batch.execute().map_err(ConnectorError::query_failed)?;
            conn.commit().map_err(ConnectorError::query_failed)?;
            Ok(rows.len() as u64)
        })
        .await
        .map_err(|e| ConnectorError::generic(anyhow::anyhow!(e)))?
    }
}

fn db_value_as_oracle_bind(value: &DbValue) -> &dyn oracle::sql_type::ToSql {
    // `oracle::sql_type::ToSql` is implemented for the primitives we hold;
    // NULL binds use `oracle::sql_type::OracleType::Varchar2` sized binds in
    // the caller instead of this path, since `ToSql` needs a concrete type.
    match value {
        DbValue::Bool(b) => b,
        DbValue::Int(i) => i,
        DbValue::Float(f) => f,
        DbValue::Text(s) => s,
        DbValue::Bytes(b) => b,
        DbValue::DateTime(dt) => dt,
        DbValue::Null => &Option::<String>::None,
    }
}

fn db_value_to_quaint(value: &DbValue) -> QuaintValue<'static> {
    match value {
        DbValue::Null => QuaintValue::Text(None),
        DbValue::Bool(b) => QuaintValue::Boolean(Some(*b)),
        DbValue::Int(i) => QuaintValue::Int64(Some(*i)),
        DbValue::Float(f) => QuaintValue::Double(Some(*f)),
        DbValue::Text(s) => QuaintValue::Text(Some(s.clone().into())),
        DbValue::Bytes(b) => QuaintValue::Bytes(Some(b.clone().into())),
        DbValue::DateTime(dt) => QuaintValue::DateTime(Some(*dt)),
    }
}

fn result_set_to_rows(result_set: ResultSet) -> Vec<DbRow> {
    let columns: Vec<String> = result_set.columns().iter().map(|c| c.to_string()).collect();

    result_set
        .into_iter()
        .map(|row| {
            columns
                .iter()
                .enumerate()
                .map(|(idx, name)| (name.clone(), quaint_value_to_db_value(row.at(idx))))
                .collect()
        })
        .collect()
}

fn quaint_value_to_db_value(value: Option<&QuaintValue<'_>>) -> DbValue {
    match value {
        None => DbValue::Null,
        Some(QuaintValue::Int32(None))
        | Some(QuaintValue::Int64(None))
        | Some(QuaintValue::Float(None))
        | Some(QuaintValue::Double(None))
        | Some(QuaintValue::Text(None))
        | Some(QuaintValue::Bytes(None))
        | Some(QuaintValue::Boolean(None))
        | Some(QuaintValue::DateTime(None))
        | Some(QuaintValue::Numeric(None))
        | Some(QuaintValue::Json(None)) => DbValue::Null,
        Some(QuaintValue::Int32(Some(i))) => DbValue::Int(*i as i64),
        Some(QuaintValue::Int64(Some(i))) => DbValue::Int(*i),
        Some(QuaintValue::Float(Some(f))) => DbValue::Float(*f as f64),
        Some(QuaintValue::Double(Some(f))) => DbValue::Float(*f),
        Some(QuaintValue::Text(Some(s))) => DbValue::Text(s.to_string()),
        Some(QuaintValue::Bytes(Some(b))) => DbValue::Bytes(b.to_vec()),
        Some(QuaintValue::Boolean(Some(b))) => DbValue::Bool(*b),
        Some(QuaintValue::DateTime(Some(dt))) => DbValue::DateTime(*dt),
        Some(QuaintValue::Numeric(Some(n))) => DbValue::Text(n.to_string()),
        Some(QuaintValue::Json(Some(j))) => DbValue::Text(j.to_string()),
        Some(other) => DbValue::Text(format!("{:?}", other)),
    }
}

fn oracle_value_to_db_value(value: &oracle::SqlValue) -> DbValue {
    if value.is_null().unwrap_or(true) {
        return DbValue::Null;
    }
    if let Ok(i) = value.get::<i64>() {
        return DbValue::Int(i);
    }
    if let Ok(f) = value.get::<f64>() {
        return DbValue::Float(f);
    }
    if let Ok(dt) = value.get::<chrono::NaiveDateTime>() {
        return DbValue::DateTime(Utc.from_utc_datetime(&dt));
    }
    match value.get::<String>() {
        Ok(s) => DbValue::Text(s),
        Err(_) => DbValue::Null,
    }
}
