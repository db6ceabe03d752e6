use db_connector::DbHandle;
use migration_connector::{ConnectorResult, DbRow, DbValue, EngineKind};

/// SQL Server's batch size for multi-row `INSERT`, applied as a sub-batch
/// inside a table's 100,000 row chunk.
const SQLSERVER_INSERT_BATCH: usize = 10_000;

/// MySQL has no hard row limit like SQL Server's, but a single multi-row
/// `INSERT` still needs to stay well under `max_allowed_packet`; this
/// sub-batch size is the practical ceiling used in place of byte-counting
/// the statement.
const MYSQL_INSERT_BATCH: usize = 1_000;

/// Writes `rows` into `table_name` through the fastest bulk path for
/// `target_engine`. Returns the number of rows written.
pub(crate) async fn bulk_load(
    target: &DbHandle,
    target_engine: EngineKind,
    table_name: &str,
    columns: &[String],
    rows: Vec<DbRow>,
) -> ConnectorResult<u64> {
    if rows.is_empty() {
        return Ok(0);
    }

    match target_engine {
        EngineKind::Postgres => copy_in(target, table_name, columns, rows).await,
        EngineKind::Mysql => batched_insert(target, table_name, columns, rows, MYSQL_INSERT_BATCH).await,
        EngineKind::SqlServer => batched_insert(target, table_name, columns, rows, SQLSERVER_INSERT_BATCH).await,
        EngineKind::Oracle => oracle_array_insert(target, table_name, columns, rows).await,
    }
}

async fn copy_in(target: &DbHandle, table_name: &str, columns: &[String], rows: Vec<DbRow>) -> ConnectorResult<u64> {
    let copy_sql = format!("COPY {} ({}) FROM STDIN", table_name, columns.join(", "));

    let mut body = String::new();
    let row_count = rows.len() as u64;
    for row in rows {
        let mut values = row.into_iter();
        let mut first = true;
        for _ in 0..columns.len() {
            if !first {
                body.push('\t');
            }
            first = false;
            if let Some((_, value)) = values.next() {
                match value.to_copy_text() {
                    Some(text) => body.push_str(&text),
                    None => body.push_str("\\N"),
                }
            } else {
                body.push_str("\\N");
            }
        }
        body.push('\n');
    }

    target.postgres_copy_in(&copy_sql, body.into_bytes()).await?;
    Ok(row_count)
}

async fn batched_insert(
    target: &DbHandle,
    table_name: &str,
    columns: &[String],
    rows: Vec<DbRow>,
    batch_size: usize,
) -> ConnectorResult<u64> {
    let mut total = 0u64;

    for batch in rows.chunks(batch_size) {
        let values_clause = batch
            .iter()
            .map(|row| {
                let tuple = row
                    .iter()
                    .map(|(_, value)| db_value_sql_literal(value))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("({})", tuple)
            })
            .collect::<Vec<_>>()
            .join(", ");

        let sql = format!("INSERT INTO {} ({}) VALUES {}", table_name, columns.join(", "), values_clause);
        target.raw_cmd(&sql).await?;
        total += batch.len() as u64;
    }

    Ok(total)
}

async fn oracle_array_insert(
    target: &DbHandle,
    table_name: &str,
    columns: &[String],
    rows: Vec<DbRow>,
) -> ConnectorResult<u64> {
    let placeholders = (1..=columns.len()).map(|i| format!(":{}", i)).collect::<Vec<_>>().join(", ");
    let sql = format!("INSERT INTO {} ({}) VALUES ({})", table_name, columns.join(", "), placeholders);

    let bound_rows: Vec<Vec<DbValue>> = rows.into_iter().map(|row| row.into_iter().map(|(_, v)| v).collect()).collect();

    target.oracle_batch_insert(&sql, bound_rows).await
}

/// Renders a literal for inline multi-row `INSERT` statements (MySQL/SQL
/// Server bulk paths). Single quotes are doubled per standard SQL string
/// escaping; this is the literal-rendering counterpart to
/// `DbValue::to_copy_text`, used where the target accepts a plain `INSERT`
/// rather than a COPY/array-DML stream.
fn db_value_sql_literal(value: &DbValue) -> String {
    match value {
        DbValue::Null => "NULL".to_owned(),
        DbValue::Bool(b) => if *b { "1".to_owned() } else { "0".to_owned() },
        DbValue::Int(i) => i.to_string(),
        DbValue::Float(f) => f.to_string(),
        DbValue::Text(s) => format!("'{}'", s.replace('\'', "''")),
        DbValue::Bytes(b) => format!("0x{}", hex::encode(b)),
        DbValue::DateTime(dt) => format!("'{}'", dt.to_rfc3339()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_single_quotes_in_text_literal() {
        assert_eq!(db_value_sql_literal(&DbValue::Text("O'Brien".to_owned())), "'O''Brien'");
    }

    #[test]
    fn null_renders_as_sql_null() {
        assert_eq!(db_value_sql_literal(&DbValue::Null), "NULL");
    }
}
