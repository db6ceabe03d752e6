use std::fmt::{Display, Write as _};

const SQL_INDENTATION: &str = "  ";

/// A `CREATE TABLE` statement builder, accumulate-then-`Display`,
/// generalized across engines through the options below rather than one
/// struct per engine: `IF NOT EXISTS` and the trailing engine suffix are the
/// only two places the four target engines disagree on shape.
pub struct CreateTable {
    table_name: String,
    if_not_exists: bool,
    column_lines: Vec<String>,
    primary_key_columns: Vec<String>,
    suffix: Option<String>,
}

impl CreateTable {
    pub fn named(table_name: impl Into<String>) -> Self {
        CreateTable {
            table_name: table_name.into(),
            if_not_exists: false,
            column_lines: Vec::new(),
            primary_key_columns: Vec::new(),
            suffix: None,
        }
    }

    /// Oracle does not support `IF NOT EXISTS`; callers skip this for
    /// Oracle targets.
    pub fn if_not_exists(mut self) -> Self {
        self.if_not_exists = true;
        self
    }

    pub fn with_column(mut self, rendered_column: impl Into<String>) -> Self {
        self.column_lines.push(rendered_column.into());
        self
    }

    pub fn with_primary_key<T, I>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Display,
    {
        self.primary_key_columns = columns.into_iter().map(|c| c.to_string()).collect();
        self
    }

    /// `ENGINE=InnoDB DEFAULT CHARSET=utf8mb4` for MySQL targets; no other
    /// engine in the fixed set uses a table-level suffix.
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = Some(suffix.into());
        self
    }
}

impl Display for CreateTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CREATE TABLE ")?;

        if self.if_not_exists {
            write!(f, "IF NOT EXISTS ")?;
        }

        writeln!(f, "{} (", self.table_name)?;

        let mut lines = self.column_lines.iter().peekable();
        while let Some(line) = lines.next() {
            let more = lines.peek().is_some() || !self.primary_key_columns.is_empty();
            writeln!(f, "{}{}{}", SQL_INDENTATION, line, if more { "," } else { "" })?;
        }

        if !self.primary_key_columns.is_empty() {
            let mut pk = String::new();
            let mut cols = self.primary_key_columns.iter().peekable();
            while let Some(col) = cols.next() {
                write!(pk, "{}", col).expect("write to String cannot fail");
                if cols.peek().is_some() {
                    pk.push_str(", ");
                }
            }
            writeln!(f, "{}PRIMARY KEY ({})", SQL_INDENTATION, pk)?;
        }

        write!(f, ")")?;

        if let Some(suffix) = &self.suffix {
            write!(f, " {}", suffix)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_minimal_table() {
        let sql = CreateTable::named("people")
            .if_not_exists()
            .with_column("id integer NOT NULL")
            .with_column("name varchar(50)")
            .with_primary_key(["id"])
            .to_string();

        assert_eq!(
            sql,
            "CREATE TABLE IF NOT EXISTS people (\n  id integer NOT NULL,\n  name varchar(50),\n  PRIMARY KEY (id)\n)"
        );
    }

    #[test]
    fn renders_mysql_suffix_without_if_not_exists_changes() {
        let sql = CreateTable::named("people")
            .with_column("id INT NOT NULL")
            .with_suffix("ENGINE=InnoDB DEFAULT CHARSET=utf8mb4")
            .to_string();

        assert_eq!(sql, "CREATE TABLE people (\n  id INT NOT NULL\n) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4");
    }

    #[test]
    fn omits_primary_key_clause_when_empty() {
        let sql = CreateTable::named("t").with_column("a INT").to_string();
        assert!(!sql.contains("PRIMARY KEY"));
    }
}
