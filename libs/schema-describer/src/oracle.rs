use crate::getters::RowExt;
use crate::model::{Column, Index, TableSchema};
use db_connector::DbHandle;
use migration_connector::ConnectorResult;
use std::collections::BTreeMap;

/// Oracle introspection against `all_*` catalog views, scoped by `owner` —
/// the uppercased schema owner, since Oracle has no separate per-database
/// namespace. The caller is responsible for uppercasing before calling this.
#[tracing::instrument(skip(handle))]
pub(crate) async fn describe_table(handle: &DbHandle, owner: &str, table: &str) -> ConnectorResult<TableSchema> {
    let columns = get_columns(handle, owner, table).await?;
    let primary_keys = get_primary_key_columns(handle, owner, table).await?;
    let indexes = get_indexes(handle, owner, table).await?;

    Ok(TableSchema {
        table_name: table.to_owned(),
        columns,
        primary_keys,
        indexes,
    })
}

async fn get_columns(handle: &DbHandle, owner: &str, table: &str) -> ConnectorResult<Vec<Column>> {
    let sql = r#"
        SELECT column_name, data_type, data_length, data_precision, data_scale, nullable, data_default
        FROM all_tab_columns
        WHERE owner = :1 AND table_name = :2
        ORDER BY column_id
    "#;

    let rows = handle.query_raw(sql, &[owner.into(), table.into()]).await?;

    Ok(rows
        .into_iter()
        .map(|row| Column {
            name: row.text_or_empty("column_name"),
            native_type: native_type_with_precision(&row),
            nullable: row.text("nullable").map(|s| s.eq_ignore_ascii_case("Y")).unwrap_or(true),
            default: row.text("data_default").map(|d| d.trim().to_owned()),
        })
        .collect())
}

/// `all_tab_columns` splits precision across `data_precision`/`data_scale`/
/// `data_length` rather than embedding it in `data_type` the way the other
/// engines' catalogs do, so it has to be reassembled here to match the
/// `TYPE(p[,s])` shape `map_type` expects.
fn native_type_with_precision(row: &migration_connector::DbRow) -> String {
    let data_type = row.text_or_empty("data_type");
    match data_type.as_str() {
        "NUMBER" => match (row.text("data_precision"), row.text("data_scale")) {
            (Some(p), Some(s)) if s != "0" => format!("NUMBER({},{})", p, s),
            (Some(p), _) => format!("NUMBER({})", p),
            (None, _) => "NUMBER".to_owned(),
        },
        "VARCHAR2" | "CHAR" | "NVARCHAR2" => match row.text("data_length") {
            Some(len) => format!("{}({})", data_type, len),
            None => data_type,
        },
        other => other.to_owned(),
    }
}

async fn get_primary_key_columns(handle: &DbHandle, owner: &str, table: &str) -> ConnectorResult<Vec<String>> {
    let sql = r#"
        SELECT cols.column_name
        FROM all_constraints cons
        JOIN all_cons_columns cols
          ON cons.constraint_name = cols.constraint_name AND cons.owner = cols.owner
        WHERE cons.owner = :1 AND cons.table_name = :2 AND cons.constraint_type = 'P'
        ORDER BY cols.position
    "#;

    let rows = handle.query_raw(sql, &[owner.into(), table.into()]).await?;
    Ok(rows.into_iter().filter_map(|row| row.text("column_name")).collect())
}

async fn get_indexes(handle: &DbHandle, owner: &str, table: &str) -> ConnectorResult<Vec<Index>> {
    let sql = r#"
        SELECT i.index_name, c.column_name
        FROM all_indexes i
        JOIN all_ind_columns c ON c.index_name = i.index_name AND c.index_owner = i.owner
        WHERE i.owner = :1 AND i.table_name = :2 AND i.uniqueness != 'PK'
        ORDER BY i.index_name, c.column_position
    "#;

    let rows = handle.query_raw(sql, &[owner.into(), table.into()]).await?;

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
