use chrono::{DateTime, Utc};

/// An engine-agnostic column value. Every flavour's driver (`quaint`'s
/// `Value`, the `oracle` crate's `SqlValue`) gets converted into this shape
/// at the point it crosses into shared code, so the copier, the sampler and
/// the test fakes never need to match on driver-specific row types.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(untagged)]
pub enum DbValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
    DateTime(DateTime<Utc>),
}

impl DbValue {
    pub fn is_null(&self) -> bool {
        matches!(self, DbValue::Null)
    }

    /// Render the value the way the target bulk-load path expects a null
    /// sentinel to be replaced with a real null representation. `None`
    /// signals "bind a real NULL" for array-DML paths; `Some` is the
    /// textual form used by the tab-delimited `COPY` stream.
    pub fn to_copy_text(&self) -> Option<String> {
        match self {
            DbValue::Null => None,
            DbValue::Bool(b) => Some(if *b { "t".to_owned() } else { "f".to_owned() }),
            DbValue::Int(i) => Some(i.to_string()),
            DbValue::Float(f) => Some(f.to_string()),
            DbValue::Text(s) => Some(escape_copy_text(s)),
            DbValue::Bytes(b) => Some(hex::encode(b)),
            DbValue::DateTime(dt) => Some(dt.to_rfc3339()),
        }
    }
}

/// Escape tab, newline and backslash for Postgres's `COPY ... FROM STDIN`
/// text format, where `\N` is reserved for null.
fn escape_copy_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            other => out.push(other),
        }
    }
    out
}

/// A single row, preserving column order as returned by the query — never a
/// `HashMap`, since callers (chunked copy, sampling) depend on positional
/// order matching the source `TableSchema.columns` order.
pub type DbRow = Vec<(String, DbValue)>;

impl From<String> for DbValue {
    fn from(s: String) -> Self {
        DbValue::Text(s)
    }
}

impl From<&str> for DbValue {
    fn from(s: &str) -> Self {
        DbValue::Text(s.to_owned())
    }
}

impl From<i64> for DbValue {
    fn from(i: i64) -> Self {
        DbValue::Int(i)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_tab_and_newline_for_copy_format() {
        let v = DbValue::Text("a\tb\nc".to_owned());
        assert_eq!(v.to_copy_text().unwrap(), "a\\tb\\nc");
    }

    #[test]
    fn null_has_no_copy_text() {
        assert_eq!(DbValue::Null.to_copy_text(), None);
    }
}
