use migration_connector::{DbRow, DbValue};

/// A small accessor trait over the engine-agnostic row shape — every
/// per-engine introspection query reads columns by name instead of
/// threading positional indices around.
pub(crate) trait RowExt {
    fn text(&self, name: &str) -> Option<String>;
    fn text_or_empty(&self, name: &str) -> String {
        self.text(name).unwrap_or_default()
    }
    fn flag(&self, name: &str) -> bool;
}

impl RowExt for DbRow {
    fn text(&self, name: &str) -> Option<String> {
        self.iter().find(|(col, _)| col == name).and_then(|(_, value)| match value {
            DbValue::Text(s) => Some(s.clone()),
            DbValue::Int(i) => Some(i.to_string()),
            DbValue::Bool(b) => Some(b.to_string()),
            DbValue::Null => None,
            _ => None,
        })
    }

    fn flag(&self, name: &str) -> bool {
        self.iter().find(|(col, _)| col == name).map_or(false, |(_, value)| match value {
            DbValue::Bool(b) => *b,
            DbValue::Int(i) => *i != 0,
            DbValue::Text(s) => matches!(s.to_ascii_uppercase().as_str(), "Y" | "YES" | "1" | "TRUE"),
            DbValue::Null => false,
            _ => false,
        })
    }
}
