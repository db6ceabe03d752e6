use crate::getters::RowExt;
use crate::model::{Column, Index, TableSchema};
use db_connector::DbHandle;
use migration_connector::ConnectorResult;
use std::collections::BTreeMap;

/// SQL Server introspection via `sys.*` catalog views, scoped to the
/// connection's default database.
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
        SELECT c.name AS column_name,
               t.name AS data_type,
               c.is_nullable,
               dc.definition AS column_default
        FROM sys.columns c
        JOIN sys.types t ON t.user_type_id = c.user_type_id
        JOIN sys.tables tb ON tb.object_id = c.object_id
        LEFT JOIN sys.default_constraints dc ON dc.object_id = c.default_object_id
        WHERE tb.name = @p1
        ORDER BY c.column_id
    "#;

    let rows = handle.query_raw(sql, &[table.into()]).await?;

    Ok(rows
        .into_iter()
        .map(|row| Column {
            name: row.text_or_empty("column_name"),
            native_type: row.text_or_empty("data_type"),
            nullable: row.flag("is_nullable"),
            default: row.text("column_default").map(|d| strip_sql_server_parens(&d)),
        })
        .collect())
}

async fn get_primary_key_columns(handle: &DbHandle, table: &str) -> ConnectorResult<Vec<String>> {
    let sql = r#"
        SELECT c.name AS column_name
        FROM sys.key_constraints kc
        JOIN sys.tables tb ON tb.object_id = kc.parent_object_id
        JOIN sys.index_columns ic ON ic.object_id = kc.parent_object_id AND ic.index_id = kc.unique_index_id
        JOIN sys.columns c ON c.object_id = ic.object_id AND c.column_id = ic.column_id
        WHERE tb.name = @p1 AND kc.type = 'PK'
        ORDER BY ic.key_ordinal
    "#;

    let rows = handle.query_raw(sql, &[table.into()]).await?;
    Ok(rows.into_iter().filter_map(|row| row.text("column_name")).collect())
}

async fn get_indexes(handle: &DbHandle, table: &str) -> ConnectorResult<Vec<Index>> {
    let sql = r#"
        SELECT i.name AS index_name, c.name AS column_name
        FROM sys.indexes i
        JOIN sys.tables tb ON tb.object_id = i.object_id
        JOIN sys.index_columns ic ON ic.object_id = i.object_id AND ic.index_id = i.index_id
        JOIN sys.columns c ON c.object_id = ic.object_id AND c.column_id = ic.column_id
        WHERE tb.name = @p1 AND i.is_primary_key = 0 AND i.name IS NOT NULL
        ORDER BY i.name, ic.key_ordinal
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

/// `sys.default_constraints.definition` comes back parenthesized, e.g.
/// `((0))` or `('x')`; strip the wrapping so it matches the other engines'
/// bare default text.
fn strip_sql_server_parens(definition: &str) -> String {
    definition.trim_matches(|c| c == '(' || c == ')').trim_matches('\'').to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_wrapping_parens_from_default() {
        assert_eq!(strip_sql_server_parens("((0))"), "0");
        assert_eq!(strip_sql_server_parens("('active')"), "active");
    }
}
