use crate::getters::RowExt;
use crate::model::{Column, Index, TableSchema};
use db_connector::DbHandle;
use migration_connector::ConnectorResult;
use std::collections::BTreeMap;

/// MySQL introspection. The handle passed in is already scoped to
/// `database` (`Connector::scoped_handle`), so every query here relies on
/// `DATABASE()` / the connection's default schema rather than qualifying
/// every table reference.
#[tracing::instrument(skip(handle))]
pub(crate) async fn describe_table(handle: &DbHandle, table: &str) -> ConnectorResult<TableSchema> {
    let columns = get_columns(handle, table).await?;
    let primary_keys = get_primary_key_columns(handle, table).await?;
    let indexes = get_indexes(handle, table).await?;

    Ok(TableSchema {
        table_name: table.to_owned(),
        columns,
        primary_keys,
        indexes,
    })
}

async fn get_columns(handle: &DbHandle, table: &str) -> ConnectorResult<Vec<Column>> {
    let sql = r#"
        SELECT column_name, column_type, is_nullable, column_default
        FROM information_schema.columns
        WHERE table_schema = DATABASE() AND table_name = ?
        ORDER BY ordinal_position
    "#;

    let rows = handle.query_raw(sql, &[table.into()]).await?;

    Ok(rows
        .into_iter()
        .map(|row| Column {
            name: row.text_or_empty("column_name"),
            native_type: row.text_or_empty("column_type"),
            nullable: row.text("is_nullable").map(|s| s.eq_ignore_ascii_case("YES")).unwrap_or(true),
            default: row.text("column_default"),
        })
        .collect())
}

async fn get_primary_key_columns(handle: &DbHandle, table: &str) -> ConnectorResult<Vec<String>> {
    let sql = r#"
        SELECT column_name
        FROM information_schema.key_column_usage
        WHERE table_schema = DATABASE()
          AND table_name = ?
          AND constraint_name = 'PRIMARY'
        ORDER BY ordinal_position
    "#;

    let rows = handle.query_raw(sql, &[table.into()]).await?;
    Ok(rows.into_iter().filter_map(|row| row.text("column_name")).collect())
}

async fn get_indexes(handle: &DbHandle, table: &str) -> ConnectorResult<Vec<Index>> {
    let sql = r#"
        SELECT index_name, column_name
        FROM information_schema.statistics
        WHERE table_schema = DATABASE()
          AND table_name = ?
          AND index_name <> 'PRIMARY'
        ORDER BY index_name, seq_in_index
    "#;

    let rows = handle.query_raw(sql, &[table.into()]).await?;

    let mut by_name: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for row in rows {
        let Some(index_name) = row.text("index_name") else { continue };
        let Some(column_name) = row.text("column_name") else { continue };
        by_name.entry(index_name).or_default().push(column_name);
    }

    Ok(by_name
        .into_iter()
        .map(|(name, columns)| Index { name, columns })
        .collect())
}
