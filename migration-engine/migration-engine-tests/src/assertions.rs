use schema_describer::{Column, TableSchema};

/// Fluent assertions over an introspected [`TableSchema`], in the style of
/// the upstream engine's `SchemaAssertion` (`assert_table`, `assert_column`
/// chains) — scaled down to the columns/primary key/indexes vocabulary this
/// workspace actually introspects.
pub struct SchemaAssertion<'a>(pub &'a TableSchema);

impl<'a> SchemaAssertion<'a> {
    pub fn new(schema: &'a TableSchema) -> Self {
        SchemaAssertion(schema)
    }

    #[track_caller]
    pub fn assert_column_count(self, count: usize) -> Self {
        assert_eq!(self.0.columns.len(), count, "unexpected column count for `{}`", self.0.table_name);
        self
    }

    #[track_caller]
    pub fn assert_has_column(self, name: &str) -> ColumnAssertion<'a> {
        let column = self
            .0
            .columns
            .iter()
            .find(|c| c.name == name)
            .unwrap_or_else(|| panic!("table `{}` has no column `{}`", self.0.table_name, name));
        ColumnAssertion(column, self)
    }

    #[track_caller]
    pub fn assert_column_order(self, expected: &[&str]) -> Self {
        let actual = self.0.column_names();
        assert_eq!(actual, expected, "column order mismatch on `{}`", self.0.table_name);
        self
    }

    #[track_caller]
    pub fn assert_primary_key_columns(self, expected: &[&str]) -> Self {
        assert_eq!(
            self.0.primary_keys, expected,
            "primary key mismatch on `{}`",
            self.0.table_name
        );
        self
    }

    #[track_caller]
    pub fn assert_has_index_on(self, columns: &[&str]) -> Self {
        let found = self
            .0
            .indexes
            .iter()
            .any(|index| index.columns.iter().map(String::as_str).eq(columns.iter().copied()));
        assert!(found, "`{}` has no index on columns {:?}", self.0.table_name, columns);
        self
    }
}

pub struct ColumnAssertion<'a>(&'a Column, SchemaAssertion<'a>);

impl<'a> ColumnAssertion<'a> {
    #[track_caller]
    pub fn assert_native_type(self, expected: &str) -> SchemaAssertion<'a> {
        assert_eq!(self.0.native_type, expected, "column `{}` native type mismatch", self.0.name);
        self.1
    }

    #[track_caller]
    pub fn assert_nullable(self, expected: bool) -> SchemaAssertion<'a> {
        assert_eq!(self.0.nullable, expected, "column `{}` nullability mismatch", self.0.name);
        self.1
    }

    pub fn into_parent(self) -> SchemaAssertion<'a> {
        self.1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use schema_describer::Index;

    fn sample_schema() -> TableSchema {
        TableSchema {
            table_name: "customers".to_owned(),
            columns: vec![
                Column {
                    name: "id".to_owned(),
                    native_type: "int".to_owned(),
                    nullable: false,
                    default: None,
                },
                Column {
                    name: "email".to_owned(),
                    native_type: "varchar(255)".to_owned(),
                    nullable: true,
                    default: None,
                },
            ],
            primary_keys: vec!["id".to_owned()],
            indexes: vec![Index {
                name: "customers_email_idx".to_owned(),
                columns: vec!["email".to_owned()],
            }],
        }
    }

    #[test]
    fn chained_assertions_pass_on_matching_schema() {
        let schema = sample_schema();
        SchemaAssertion::new(&schema)
            .assert_column_count(2)
            .assert_column_order(&["id", "email"])
            .assert_primary_key_columns(&["id"])
            .assert_has_column("email")
            .assert_native_type("varchar(255)")
            .assert_nullable(true)
            .into_parent()
            .assert_has_index_on(&["email"]);
    }

    #[test]
    #[should_panic(expected = "has no column")]
    fn assert_has_column_panics_on_missing_column() {
        let schema = sample_schema();
        SchemaAssertion::new(&schema).assert_has_column("does_not_exist");
    }

    #[test]
    #[should_panic(expected = "primary key mismatch")]
    fn assert_primary_key_columns_panics_on_mismatch() {
        let schema = sample_schema();
        SchemaAssertion::new(&schema).assert_primary_key_columns(&["email"]);
    }
}
