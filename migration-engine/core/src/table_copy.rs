use crate::bulk_load::bulk_load;
use db_connector::DbHandle;
use migration_connector::{ConnectorError, ConnectorResult, DbValue, EngineKind};
use schema_describer::TableSchema;
use std::sync::atomic::{AtomicBool, Ordering};

/// Row count per chunk once a table is large enough to chunk.
pub(crate) const CHUNK_SIZE: u32 = 100_000;
/// Row count threshold above which a table is copied in chunks rather than
/// in one shot.
pub(crate) const CHUNK_THRESHOLD: u64 = 1_000_000;

/// The two resources a single table copy needs, bundled so the call sites in
/// `migrator.rs` don't have to thread eight positional arguments through
/// every step of the per-table procedure.
pub(crate) struct TableCopyContext<'a> {
    pub source: &'a DbHandle,
    pub target: &'a DbHandle,
    pub source_engine: EngineKind,
    pub target_engine: EngineKind,
    pub source_db: &'a str,
    pub target_db: &'a str,
}

/// Outcome of copying one table, reported back to the job loop.
pub(crate) struct TableCopyOutcome {
    pub rows_copied: u64,
    pub total_rows_estimate: u64,
    /// Set the first time the TRUNCATE-in-single-shot-mode asymmetry
    /// applies to a table in this job (see DESIGN.md): surfaced once in
    /// the job report's `message`.
    pub truncate_note: Option<&'static str>,
}

/// The per-table copy procedure: introspect, emit DDL, estimate row count,
/// then copy in one shot or in chunks. Progress reporting is the caller's
/// job, since it owns the `JobReport` and the `progress_sink`; this
/// function instead calls `on_chunk` after each chunk/page so the caller
/// can fold the increment into its own report.
pub(crate) async fn copy_table(
    ctx: &TableCopyContext<'_>,
    table: &str,
    cancel_flag: &AtomicBool,
    mut on_chunk: impl FnMut(u64, u64),
) -> ConnectorResult<TableCopyOutcome> {
    // Step 1: introspect.
    let schema = schema_describer::inspect_table(ctx.source, ctx.source_db, table).await?;

    // Step 2: emit DDL. Errors here are downgraded to a warning and the
    // copy continues — the target table may already exist.
    let target_table_name = qualified_target_name(ctx.target_engine, ctx.target_db, table);
    let ddl = sql_migration_connector::render_create_table(
        &schema,
        ctx.source_engine,
        ctx.target_engine,
        Some(target_table_name.as_str()),
    );
    if let Err(err) = ctx.target.raw_cmd(&ddl).await {
        tracing::warn!(%table, error = %err, "CREATE TABLE failed; assuming the target table already exists");
    }

    // Step 3: estimate row count.
    let row_count = estimate_row_count(ctx.source, ctx.source_engine, ctx.source_db, table).await;

    // Step 4: choose strategy.
    let chunked = row_count > CHUNK_THRESHOLD;

    let truncate_note = maybe_truncate_single_shot(ctx, &target_table_name, chunked).await;

    let rows_copied = if chunked {
        copy_chunked(ctx, &schema, table, &target_table_name, cancel_flag, &mut on_chunk).await?
    } else {
        copy_single_shot(ctx, &schema, table, &target_table_name, &mut on_chunk).await?
    };

    Ok(TableCopyOutcome {
        rows_copied,
        total_rows_estimate: row_count,
        truncate_note,
    })
}

/// Oracle targets require schema qualification supplied by the caller;
/// every other engine copies into its already-scoped database/connection
/// and needs only the bare table name.
fn qualified_target_name(target_engine: EngineKind, target_db: &str, table: &str) -> String {
    match target_engine {
        EngineKind::Oracle => format!("{}.{}", target_db.to_ascii_uppercase(), table),
        _ => table.to_owned(),
    }
}

async fn estimate_row_count(source: &DbHandle, source_engine: EngineKind, _source_db: &str, table: &str) -> u64 {
    let result = match source_engine {
        // Fast, approximate.
        EngineKind::Postgres => {
            source
                .query_raw("SELECT reltuples::bigint AS count FROM pg_class WHERE relname = $1", &[table.into()])
                .await
        }
        _ => source.query_raw(&format!("SELECT COUNT(*) AS count FROM {}", table), &[]).await,
    };

    match result {
        Ok(rows) => rows
            .into_iter()
            .next()
            .and_then(|row| row.into_iter().next())
            .and_then(|(_, value)| match value {
                DbValue::Int(i) => Some(i.max(0) as u64),
                DbValue::Float(f) => Some(f.max(0.0) as u64),
                _ => None,
            })
            .unwrap_or(0),
        // On failure, treat count as 0 — triggers the single-shot path.
        Err(_) => 0,
    }
}

/// `TRUNCATE` in single-shot mode for MySQL/SQL Server targets is
/// fire-and-forget (see DESIGN.md): it runs only outside the chunked path,
/// and its failure never blocks the copy.
async fn maybe_truncate_single_shot(
    ctx: &TableCopyContext<'_>,
    target_table_name: &str,
    chunked: bool,
) -> Option<&'static str> {
    if chunked || !matches!(ctx.target_engine, EngineKind::Mysql | EngineKind::SqlServer) {
        return None;
    }

    let sql = format!("TRUNCATE TABLE {}", target_table_name);
    if let Err(err) = ctx.target.raw_cmd(&sql).await {
        tracing::warn!(table = target_table_name, error = %err, "TRUNCATE failed; continuing anyway");
    }

    Some("single-shot mode truncates the MySQL/SQL Server target before loading; chunked mode does not")
}

async fn copy_single_shot(
    ctx: &TableCopyContext<'_>,
    schema: &TableSchema,
    source_table: &str,
    target_table_name: &str,
    on_chunk: &mut impl FnMut(u64, u64),
) -> ConnectorResult<u64> {
    let columns = schema.column_names();
    let rows = ctx.source.query_raw(&format!("SELECT * FROM {}", source_table), &[]).await?;
    let row_count = rows.len() as u64;

    bulk_load(
        ctx.target,
        ctx.target_engine,
        target_table_name,
        &columns.iter().map(|s| s.to_string()).collect::<Vec<_>>(),
        rows,
    )
    .await?;

    on_chunk(row_count, row_count);
    Ok(row_count)
}

async fn copy_chunked(
    ctx: &TableCopyContext<'_>,
    schema: &TableSchema,
    source_table: &str,
    target_table_name: &str,
    cancel_flag: &AtomicBool,
    on_chunk: &mut impl FnMut(u64, u64),
) -> ConnectorResult<u64> {
    let columns: Vec<String> = schema.column_names().iter().map(|s| s.to_string()).collect();
    let mut total_copied = 0u64;

    match schema.single_column_primary_key() {
        // Step 5: keyset pagination, ascending PK.
        Some(pk) => {
            let mut last_pk: Option<DbValue> = None;
            loop {
                if cancel_flag.load(Ordering::SeqCst) {
                    break;
                }

                let rows = fetch_keyset_chunk(ctx.source, ctx.source_engine, source_table, pk, last_pk.as_ref()).await?;
                if rows.is_empty() {
                    break;
                }

                last_pk = rows.last().and_then(|row| row.iter().find(|(name, _)| name == pk)).map(|(_, v)| v.clone());
                if last_pk.as_ref().is_some_and(DbValue::is_null) {
                    return Err(ConnectorError::generic(anyhow::anyhow!(
                        "primary key column `{}` is null, keyset pagination cannot continue",
                        pk
                    )));
                }

                let chunk_len = rows.len() as u64;
                bulk_load(ctx.target, ctx.target_engine, target_table_name, &columns, rows).await?;
                total_copied += chunk_len;
                on_chunk(chunk_len, total_copied);

                if chunk_len < CHUNK_SIZE as u64 {
                    break;
                }
            }
        }
        // Step 5: offset pagination, engine-native syntax. Row order is
        // accepted non-determinism for SQL Server and Oracle without a PK.
        None => {
            let mut offset = 0u64;
            loop {
                if cancel_flag.load(Ordering::SeqCst) {
                    break;
                }

                let rows = fetch_offset_chunk(ctx.source, ctx.source_engine, source_table, offset).await?;
                if rows.is_empty() {
                    break;
                }

                let chunk_len = rows.len() as u64;
                bulk_load(ctx.target, ctx.target_engine, target_table_name, &columns, rows).await?;
                total_copied += chunk_len;
                offset += chunk_len;
                on_chunk(chunk_len, total_copied);

                if chunk_len < CHUNK_SIZE as u64 {
                    break;
                }
            }
        }
    }

    Ok(total_copied)
}

async fn fetch_keyset_chunk(
    source: &DbHandle,
    source_engine: EngineKind,
    table: &str,
    pk: &str,
    last_pk: Option<&DbValue>,
) -> ConnectorResult<Vec<migration_connector::DbRow>> {
    match last_pk {
        None => {
            let sql = keyset_sql(source_engine, table, pk, false);
            source.query_raw(&sql, &[]).await
        }
        Some(value) => {
            let sql = keyset_sql(source_engine, table, pk, true);
            source.query_raw(&sql, &[value.clone()]).await
        }
    }
}

/// Engine-native keyset pagination syntax, analogous to `offset_sql`: plain
/// `LIMIT` is only valid on MySQL/Postgres, so SQL Server uses `TOP` and
/// Oracle uses a `ROWNUM` predicate alongside the keyset `WHERE` clause.
fn keyset_sql(source_engine: EngineKind, table: &str, pk: &str, with_predicate: bool) -> String {
    match source_engine {
        EngineKind::Mysql | EngineKind::Postgres => {
            let predicate = if with_predicate { format!("WHERE {} > {}", pk, placeholder(source_engine, 1)) } else { String::new() };
            format!("SELECT * FROM {} {} ORDER BY {} ASC LIMIT {}", table, predicate, pk, CHUNK_SIZE)
        }
        EngineKind::SqlServer => {
            let predicate = if with_predicate { format!("WHERE {} > {}", pk, placeholder(source_engine, 1)) } else { String::new() };
            format!("SELECT TOP {} * FROM {} {} ORDER BY {} ASC", CHUNK_SIZE, table, predicate, pk)
        }
        EngineKind::Oracle => {
            let predicate = if with_predicate {
                format!(" AND {} > {}", pk, placeholder(source_engine, 1))
            } else {
                String::new()
            };
            format!("SELECT * FROM {} WHERE ROWNUM <= {}{} ORDER BY {} ASC", table, CHUNK_SIZE, predicate, pk)
        }
    }
}

fn placeholder(source_engine: EngineKind, position: u32) -> String {
    match source_engine {
        EngineKind::Mysql => "?".to_owned(),
        EngineKind::Postgres => format!("${}", position),
        EngineKind::SqlServer => format!("@p{}", position),
        EngineKind::Oracle => format!(":{}", position),
    }
}

async fn fetch_offset_chunk(
    source: &DbHandle,
    source_engine: EngineKind,
    table: &str,
    offset: u64,
) -> ConnectorResult<Vec<migration_connector::DbRow>> {
    let sql = offset_sql(source_engine, table, offset);
    source.query_raw(&sql, &[]).await
}

/// Engine-native offset syntax.
fn offset_sql(source_engine: EngineKind, table: &str, offset: u64) -> String {
    match source_engine {
        EngineKind::Postgres | EngineKind::Mysql => {
            format!("SELECT * FROM {} LIMIT {} OFFSET {}", table, CHUNK_SIZE, offset)
        }
        EngineKind::SqlServer => format!(
            "SELECT * FROM {} ORDER BY (SELECT NULL) OFFSET {} ROWS FETCH NEXT {} ROWS ONLY",
            table, offset, CHUNK_SIZE
        ),
        EngineKind::Oracle => format!(
            "SELECT * FROM (SELECT inner_.*, ROWNUM rnum FROM (SELECT * FROM {} ) inner_ WHERE ROWNUM <= {}) WHERE rnum > {}",
            table,
            offset + CHUNK_SIZE as u64,
            offset
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oracle_target_name_is_schema_qualified() {
        assert_eq!(qualified_target_name(EngineKind::Oracle, "hr", "log"), "HR.log");
    }

    #[test]
    fn non_oracle_target_name_is_bare() {
        assert_eq!(qualified_target_name(EngineKind::Postgres, "app", "people"), "people");
    }

    #[test]
    fn keyset_sql_without_predicate_has_no_where_clause() {
        let sql = keyset_sql(EngineKind::Mysql, "events", "id", false);
        assert!(!sql.contains("WHERE"));
        assert!(sql.contains("ORDER BY id ASC LIMIT 100000"));
    }

    #[test]
    fn keyset_sql_with_predicate_uses_engine_placeholder() {
        let mysql = keyset_sql(EngineKind::Mysql, "events", "id", true);
        assert!(mysql.contains("WHERE id > ?"));
        assert!(mysql.contains("LIMIT 100000"));

        let postgres = keyset_sql(EngineKind::Postgres, "events", "id", true);
        assert!(postgres.contains("WHERE id > $1"));
        assert!(postgres.contains("LIMIT 100000"));
    }

    #[test]
    fn sqlserver_keyset_uses_top_instead_of_limit() {
        let sql = keyset_sql(EngineKind::SqlServer, "events", "id", false);
        assert!(sql.contains("SELECT TOP 100000"));
        assert!(!sql.contains("LIMIT"));
        assert!(sql.contains("ORDER BY id ASC"));

        let with_predicate = keyset_sql(EngineKind::SqlServer, "events", "id", true);
        assert!(with_predicate.contains("WHERE id > @p1"));
    }

    #[test]
    fn oracle_keyset_uses_rownum_instead_of_limit() {
        let sql = keyset_sql(EngineKind::Oracle, "events", "id", false);
        assert!(sql.contains("WHERE ROWNUM <= 100000"));
        assert!(!sql.contains("LIMIT"));
        assert!(sql.contains("ORDER BY id ASC"));

        let with_predicate = keyset_sql(EngineKind::Oracle, "events", "id", true);
        assert!(with_predicate.contains("WHERE ROWNUM <= 100000 AND id > :1"));
    }

    #[test]
    fn sqlserver_offset_clause_uses_fetch_next() {
        let sql = offset_sql(EngineKind::SqlServer, "t", 0);
        assert!(sql.contains("ORDER BY (SELECT NULL) OFFSET 0 ROWS FETCH NEXT 100000 ROWS ONLY"));
    }

    #[test]
    fn oracle_offset_clause_uses_nested_rownum() {
        let sql = offset_sql(EngineKind::Oracle, "t", 200_000);
        assert!(sql.contains("ROWNUM <= 300000"));
        assert!(sql.contains("rnum > 200000"));
    }

    #[test]
    fn postgres_and_mysql_use_limit_offset() {
        let sql = offset_sql(EngineKind::Postgres, "t", 50);
        assert_eq!(sql, "SELECT * FROM t LIMIT 100000 OFFSET 50");
    }
}
