use crate::getters::RowExt;
use crate::model::{Column, Index, TableSchema};
use db_connector::DbHandle;
use migration_connector::ConnectorResult;
use std::collections::BTreeMap;

/// Postgres introspection, scoped to the `public` schema — the connection
/// itself is already opened against the target database, so there is no
/// per-call database qualification.
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
        SELECT column_name, data_type, is_nullable, column_default
        FROM information_schema.columns
        WHERE table_schema = 'public' AND table_name = $1
        ORDER BY ordinal_position
    "#;

    let rows = handle.query_raw(sql, &[table.into()]).await?;

    Ok(rows
        .into_iter()
        .map(|row| Column {
            name: row.text_or_empty("column_name"),
            native_type: row.text_or_empty("data_type"),
            nullable: row.text("is_nullable").map(|s| s.eq_ignore_ascii_case("YES")).unwrap_or(true),
            default: row.text("column_default"),
        })
        .collect())
}

/// `pg_index`/`pg_attribute` joined the way the original does it, rather than
/// `information_schema.key_column_usage`, so the column order matches the
/// index's declared key order instead of an arbitrary constraint order.
async fn get_primary_key_columns(handle: &DbHandle, table: &str) -> ConnectorResult<Vec<String>> {
    let sql = r#"
        SELECT a.attname AS column_name
        FROM pg_index i
        JOIN pg_attribute a ON a.attrelid = i.indrelid AND a.attnum = ANY(i.indkey)
        JOIN pg_class c ON c.oid = i.indrelid
        WHERE c.relname = $1 AND i.indisprimary
        ORDER BY array_position(i.indkey, a.attnum)
    "#;

    let rows = handle.query_raw(sql, &[table.into()]).await?;
    Ok(rows.into_iter().filter_map(|row| row.text("column_name")).collect())
}

async fn get_indexes(handle: &DbHandle, table: &str) -> ConnectorResult<Vec<Index>> {
    let sql = r#"
        SELECT indexname, indexdef
        FROM pg_indexes
        WHERE schemaname = 'public' AND tablename = $1 AND indexname NOT LIKE '%_pkey'
    "#;

    let rows = handle.query_raw(sql, &[table.into()]).await?;

    let mut by_name: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for row in rows {
        let Some(name) = row.text("indexname") else { continue };
        let Some(def) = row.text("indexdef") else { continue };
        let columns = columns_from_index_def(&def);
        by_name.insert(name, columns);
    }

    Ok(by_name
        .into_iter()
        .map(|(name, columns)| Index { name, columns })
        .collect())
}

/// Pulls the column list out of `CREATE INDEX ... ON tbl (a, b)` as returned
/// by `pg_indexes.indexdef`; `pg_indexes` exposes the whole statement rather
/// than a structured column list.
fn columns_from_index_def(def: &str) -> Vec<String> {
    def.split('(')
        .nth(1)
        .and_then(|rest| rest.split(')').next())
        .map(|cols| cols.split(',').map(|c| c.trim().to_owned()).collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_columns_out_of_index_def() {
        let def = "CREATE INDEX events_ts_idx ON public.events USING btree (ts, id)";
        assert_eq!(columns_from_index_def(def), vec!["ts".to_owned(), "id".to_owned()]);
    }
}
