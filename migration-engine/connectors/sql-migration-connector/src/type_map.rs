use migration_connector::EngineKind;

/// Translate a native column type string from `source_engine`'s vocabulary
/// into `target_engine`'s. A pure function over a static lookup table, not
/// a runtime-populated dictionary, so the table itself lives as a `const`
/// slice per ordered engine pair rather than a `HashMap` built at startup.
pub fn map_type(native_type: &str, source_engine: EngineKind, target_engine: EngineKind) -> String {
    if source_engine == target_engine {
        return native_type.to_owned();
    }

    let lowered = native_type.to_ascii_lowercase();

    // The `tinyint(1)` tie-break is a literal full key, matched before the
    // general precision-stripping path.
    if lowered == "tinyint(1)" {
        if let Some(target) = lookup(source_engine, target_engine, "tinyint(1)") {
            return target.to_owned();
        }
    }

    let (base, suffix) = split_precision(&lowered);

    match lookup(source_engine, target_engine, base) {
        Some(target_base) => match suffix {
            Some(suffix) => format!("{}{}", target_base, suffix),
            None => target_base.to_owned(),
        },
        None => {
            tracing::warn!(
                native_type,
                source = %source_engine,
                target = %target_engine,
                "no type mapping found; passing type through unchanged"
            );
            native_type.to_owned()
        }
    }
}

/// Splits `"varchar(255)"` into `("varchar", Some("(255)"))`, and
/// `"integer"` into `("integer", None)`.
fn split_precision(lowered: &str) -> (&str, Option<&str>) {
    match lowered.find('(') {
        Some(idx) if lowered.ends_with(')') => (&lowered[..idx], Some(&lowered[idx..])),
        _ => (lowered, None),
    }
}

fn lookup(source_engine: EngineKind, target_engine: EngineKind, base: &str) -> Option<&'static str> {
    use EngineKind::*;

    let table: &[(&str, &str)] = match (source_engine, target_engine) {
        (Mysql, Postgres) => MYSQL_TO_POSTGRES,
        (Mysql, Oracle) => MYSQL_TO_ORACLE,
        (Mysql, SqlServer) => MYSQL_TO_SQLSERVER,
        (Postgres, Mysql) => POSTGRES_TO_MYSQL,
        (Postgres, Oracle) => POSTGRES_TO_ORACLE,
        (Postgres, SqlServer) => POSTGRES_TO_SQLSERVER,
        (Oracle, Mysql) => ORACLE_TO_MYSQL,
        (Oracle, Postgres) => ORACLE_TO_POSTGRES,
        (Oracle, SqlServer) => ORACLE_TO_SQLSERVER,
        (SqlServer, Mysql) => SQLSERVER_TO_MYSQL,
        (SqlServer, Postgres) => SQLSERVER_TO_POSTGRES,
        (SqlServer, Oracle) => SQLSERVER_TO_ORACLE,
        (Mysql, Mysql) | (Postgres, Postgres) | (Oracle, Oracle) | (SqlServer, SqlServer) => &[],
    };

    table.iter().find(|(k, _)| *k == base).map(|(_, v)| *v)
}

const MYSQL_TO_POSTGRES: &[(&str, &str)] = &[
    ("int", "integer"),
    ("tinyint(1)", "boolean"),
    ("bigint", "bigint"),
    ("smallint", "smallint"),
    ("varchar", "varchar"),
    ("text", "text"),
    ("datetime", "timestamp"),
    ("timestamp", "timestamp"),
    ("date", "date"),
    ("decimal", "numeric"),
    ("double", "double precision"),
    ("float", "real"),
    ("blob", "bytea"),
    ("json", "jsonb"),
];

const MYSQL_TO_ORACLE: &[(&str, &str)] = &[
    ("int", "NUMBER(10)"),
    ("tinyint(1)", "NUMBER(1)"),
    ("bigint", "NUMBER(19)"),
    ("smallint", "NUMBER(5)"),
    ("varchar", "VARCHAR2"),
    ("text", "CLOB"),
    ("datetime", "TIMESTAMP"),
    ("timestamp", "TIMESTAMP"),
    ("date", "DATE"),
    ("decimal", "NUMBER"),
    ("double", "BINARY_DOUBLE"),
    ("float", "BINARY_FLOAT"),
    ("blob", "BLOB"),
    ("json", "CLOB"),
];

const MYSQL_TO_SQLSERVER: &[(&str, &str)] = &[
    ("int", "int"),
    ("tinyint(1)", "bit"),
    ("bigint", "bigint"),
    ("smallint", "smallint"),
    ("varchar", "varchar"),
    ("text", "varchar(max)"),
    ("datetime", "datetime2"),
    ("timestamp", "datetime2"),
    ("date", "date"),
    ("decimal", "decimal"),
    ("double", "float"),
    ("float", "real"),
    ("blob", "varbinary(max)"),
    ("json", "nvarchar(max)"),
];

const POSTGRES_TO_MYSQL: &[(&str, &str)] = &[
    ("boolean", "TINYINT(1)"),
    ("integer", "INT"),
    ("bigint", "BIGINT"),
    ("smallint", "SMALLINT"),
    ("text", "TEXT"),
    ("varchar", "VARCHAR"),
    ("timestamp without time zone", "DATETIME"),
    ("timestamp with time zone", "DATETIME"),
    ("date", "DATE"),
    ("numeric", "DECIMAL"),
    ("double precision", "DOUBLE"),
    ("real", "FLOAT"),
    ("bytea", "BLOB"),
    ("jsonb", "JSON"),
    ("json", "JSON"),
];

const POSTGRES_TO_ORACLE: &[(&str, &str)] = &[
    ("boolean", "NUMBER(1)"),
    ("integer", "NUMBER(10)"),
    ("bigint", "NUMBER(19)"),
    ("smallint", "NUMBER(5)"),
    ("text", "CLOB"),
    ("varchar", "VARCHAR2"),
    ("timestamp without time zone", "TIMESTAMP"),
    ("timestamp with time zone", "TIMESTAMP WITH TIME ZONE"),
    ("date", "DATE"),
    ("numeric", "NUMBER"),
    ("double precision", "BINARY_DOUBLE"),
    ("real", "BINARY_FLOAT"),
    ("bytea", "BLOB"),
    ("jsonb", "CLOB"),
    ("json", "CLOB"),
];

const POSTGRES_TO_SQLSERVER: &[(&str, &str)] = &[
    ("boolean", "bit"),
    ("integer", "int"),
    ("bigint", "bigint"),
    ("smallint", "smallint"),
    ("text", "varchar(max)"),
    ("varchar", "varchar"),
    ("timestamp without time zone", "datetime2"),
    ("timestamp with time zone", "datetimeoffset"),
    ("date", "date"),
    ("numeric", "decimal"),
    ("double precision", "float"),
    ("real", "real"),
    ("bytea", "varbinary(max)"),
    ("jsonb", "nvarchar(max)"),
    ("json", "nvarchar(max)"),
];

const ORACLE_TO_MYSQL: &[(&str, &str)] = &[
    ("number(10)", "INT"),
    ("number(19)", "BIGINT"),
    ("number(5)", "SMALLINT"),
    ("number(1)", "TINYINT(1)"),
    ("number", "DECIMAL"),
    ("varchar2", "VARCHAR"),
    ("nvarchar2", "VARCHAR"),
    ("char", "CHAR"),
    ("clob", "LONGTEXT"),
    ("blob", "LONGBLOB"),
    ("date", "DATETIME"),
    ("timestamp", "DATETIME"),
    ("binary_double", "DOUBLE"),
    ("binary_float", "FLOAT"),
];

const ORACLE_TO_POSTGRES: &[(&str, &str)] = &[
    ("number(10)", "integer"),
    ("number(19)", "bigint"),
    ("number(5)", "smallint"),
    ("number(1)", "boolean"),
    ("number", "numeric"),
    ("varchar2", "VARCHAR"),
    ("nvarchar2", "varchar"),
    ("char", "char"),
    ("clob", "text"),
    ("blob", "bytea"),
    ("date", "timestamp"),
    ("timestamp", "timestamp"),
    ("binary_double", "double precision"),
    ("binary_float", "real"),
];

const ORACLE_TO_SQLSERVER: &[(&str, &str)] = &[
    ("number(10)", "int"),
    ("number(19)", "bigint"),
    ("number(5)", "smallint"),
    ("number(1)", "bit"),
    ("number", "decimal"),
    ("varchar2", "varchar"),
    ("nvarchar2", "nvarchar"),
    ("char", "char"),
    ("clob", "varchar(max)"),
    ("blob", "varbinary(max)"),
    ("date", "datetime2"),
    ("timestamp", "TIMESTAMP"),
    ("binary_double", "float"),
    ("binary_float", "real"),
];

const SQLSERVER_TO_MYSQL: &[(&str, &str)] = &[
    ("bit", "TINYINT(1)"),
    ("int", "INT"),
    ("bigint", "BIGINT"),
    ("smallint", "SMALLINT"),
    ("varchar", "VARCHAR"),
    ("nvarchar", "VARCHAR"),
    ("varchar(max)", "LONGTEXT"),
    ("datetime", "DATETIME"),
    ("datetime2", "DATETIME"),
    ("date", "DATE"),
    ("decimal", "DECIMAL"),
    ("float", "DOUBLE"),
    ("real", "FLOAT"),
    ("varbinary", "BLOB"),
];

const SQLSERVER_TO_POSTGRES: &[(&str, &str)] = &[
    ("bit", "BOOLEAN"),
    ("int", "integer"),
    ("bigint", "bigint"),
    ("smallint", "smallint"),
    ("varchar", "varchar"),
    ("nvarchar", "varchar"),
    ("varchar(max)", "text"),
    ("datetime", "TIMESTAMP"),
    ("datetime2", "timestamp"),
    ("date", "date"),
    ("decimal", "numeric"),
    ("float", "double precision"),
    ("real", "real"),
    ("varbinary", "bytea"),
];

const SQLSERVER_TO_ORACLE: &[(&str, &str)] = &[
    ("bit", "NUMBER(1)"),
    ("int", "NUMBER(10)"),
    ("bigint", "NUMBER(19)"),
    ("smallint", "NUMBER(5)"),
    ("varchar", "VARCHAR2"),
    ("nvarchar", "NVARCHAR2"),
    ("varchar(max)", "CLOB"),
    ("datetime", "TIMESTAMP"),
    ("datetime2", "TIMESTAMP"),
    ("date", "DATE"),
    ("decimal", "NUMBER"),
    ("float", "BINARY_DOUBLE"),
    ("real", "BINARY_FLOAT"),
    ("varbinary", "BLOB"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_on_matching_engines() {
        assert_eq!(map_type("anything(5,2)", EngineKind::Mysql, EngineKind::Mysql), "anything(5,2)");
    }

    #[test]
    fn mysql_int_to_postgres_integer() {
        assert_eq!(map_type("int", EngineKind::Mysql, EngineKind::Postgres), "integer");
    }

    #[test]
    fn tinyint_one_tie_break_wins_over_precision_split() {
        assert_eq!(map_type("tinyint(1)", EngineKind::Mysql, EngineKind::Postgres), "boolean");
    }

    #[test]
    fn precision_suffix_is_preserved() {
        assert_eq!(map_type("varchar(255)", EngineKind::Postgres, EngineKind::Mysql), "VARCHAR(255)");
    }

    #[test]
    fn unmapped_type_passes_through() {
        assert_eq!(map_type("geography", EngineKind::SqlServer, EngineKind::Postgres), "geography");
    }

    #[test]
    fn case_insensitive_match_preserves_table_case_of_output() {
        assert_eq!(map_type("INT", EngineKind::Mysql, EngineKind::Postgres), "integer");
    }
}
