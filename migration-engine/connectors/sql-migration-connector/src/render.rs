use crate::type_map::map_type;
use migration_connector::EngineKind;
use schema_describer::TableSchema;
use sql_ddl::CreateTable;

/// Render a `CREATE TABLE` statement for `target_engine` from a source
/// table's schema. `target_table_name` defaults to `schema.table_name`; the
/// caller supplies qualification for
/// Oracle targets (e.g. `"HR.PEOPLE"`) since this function has no notion of
/// a target schema on its own.
pub fn render_create_table(
    schema: &TableSchema,
    source_engine: EngineKind,
    target_engine: EngineKind,
    target_table_name: Option<&str>,
) -> String {
    let table_name = target_table_name.unwrap_or(&schema.table_name);

    let mut builder = CreateTable::named(table_name);

    if target_engine != EngineKind::Oracle {
        builder = builder.if_not_exists();
    }

    for column in &schema.columns {
        builder = builder.with_column(render_column(column, source_engine, target_engine));
    }

    if !schema.primary_keys.is_empty() {
        builder = builder.with_primary_key(schema.primary_keys.iter());
    }

    if target_engine == EngineKind::Mysql {
        builder = builder.with_suffix("ENGINE=InnoDB DEFAULT CHARSET=utf8mb4");
    }

    builder.to_string()
}

fn render_column(column: &schema_describer::Column, source_engine: EngineKind, target_engine: EngineKind) -> String {
    let mapped_type = map_type(&column.native_type, source_engine, target_engine);

    let mut rendered = format!("{} {}", column.name, mapped_type);

    if !column.nullable {
        rendered.push_str(" NOT NULL");
    }

    if let Some(default) = &column.default {
        if !is_empty_or_null_literal(default) {
            rendered.push_str(" DEFAULT ");
            rendered.push_str(default);
        }
    }

    rendered
}

/// The `DEFAULT` clause is omitted when the source default is empty or the
/// literal string `"null"` (case-insensitive) — `inspect_table` normalizes
/// a missing default to `""`, which this same guard already covers.
fn is_empty_or_null_literal(default: &str) -> bool {
    default.is_empty() || default.eq_ignore_ascii_case("null")
}

#[cfg(test)]
mod tests {
    use super::*;
    use schema_describer::{Column, Index};

    fn sample_schema() -> TableSchema {
        TableSchema {
            table_name: "people".to_owned(),
            columns: vec![
                Column { name: "id".into(), native_type: "int".into(), nullable: false, default: None },
                Column { name: "name".into(), native_type: "varchar(50)".into(), nullable: true, default: None },
                Column {
                    name: "active".into(),
                    native_type: "tinyint(1)".into(),
                    nullable: true,
                    default: Some("null".into()),
                },
            ],
            primary_keys: vec!["id".into()],
            indexes: vec![Index { name: "people_name_idx".into(), columns: vec!["name".into()] }],
        }
    }

    #[test]
    fn mysql_to_postgres_matches_expected_shape() {
        let sql = render_create_table(&sample_schema(), EngineKind::Mysql, EngineKind::Postgres, None);

        assert!(sql.contains("id integer NOT NULL"));
        assert!(sql.contains("name varchar(50)"));
        assert!(sql.contains("active boolean"));
        assert!(sql.contains("PRIMARY KEY (id)"));
        assert!(!sql.contains("ENGINE="));
        assert!(sql.starts_with("CREATE TABLE IF NOT EXISTS people"));
    }

    #[test]
    fn oracle_target_omits_if_not_exists() {
        let sql = render_create_table(&sample_schema(), EngineKind::Mysql, EngineKind::Oracle, Some("HR.PEOPLE"));
        assert!(sql.starts_with("CREATE TABLE HR.PEOPLE"));
        assert!(!sql.contains("IF NOT EXISTS"));
    }

    #[test]
    fn mysql_target_appends_engine_suffix() {
        let sql = render_create_table(&sample_schema(), EngineKind::Postgres, EngineKind::Mysql, None);
        assert!(sql.trim_end().ends_with("ENGINE=InnoDB DEFAULT CHARSET=utf8mb4"));
    }

    #[test]
    fn null_literal_default_is_omitted() {
        let sql = render_create_table(&sample_schema(), EngineKind::Mysql, EngineKind::Postgres, None);
        assert!(!sql.contains("DEFAULT null"));
    }

    #[test]
    fn column_order_is_preserved() {
        let sql = render_create_table(&sample_schema(), EngineKind::Mysql, EngineKind::Postgres, None);
        let id_pos = sql.find("id integer").unwrap();
        let name_pos = sql.find("name varchar").unwrap();
        let active_pos = sql.find("active boolean").unwrap();
        assert!(id_pos < name_pos && name_pos < active_pos);
    }
}
