/// A single column as declared by the source engine, in declaration order.
/// `native_type` is preserved verbatim: the engine's own textual type name,
/// not canonicalized into some shared type system.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Column {
    pub name: String,
    pub native_type: String,
    pub nullable: bool,
    pub default: Option<String>,
}

/// A secondary index: name plus its columns in declaration order.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Index {
    pub name: String,
    pub columns: Vec<String>,
}

/// A table's full shape as seen by the source engine. Column order is the
/// source's declared order and is preserved end to end, through DDL
/// rendering and row copy.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct TableSchema {
    pub table_name: String,
    pub columns: Vec<Column>,
    pub primary_keys: Vec<String>,
    pub indexes: Vec<Index>,
}

impl TableSchema {
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// The single-column primary key, if the table has exactly one PK
    /// column — used by the Migrator to choose keyset pagination.
    pub fn single_column_primary_key(&self) -> Option<&str> {
        match self.primary_keys.as_slice() {
            [only] => Some(only.as_str()),
            _ => None,
        }
    }
}
