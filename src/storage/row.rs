//! Row normalization
//!
//! Every driver row passes through [`Row::new`] exactly once. After that:
//! - column names are lowercase, in column order, first occurrence wins
//! - the delay column is exposed under one name (`delay`) only

use rusqlite::types::Value;

use crate::{Error, Result};

/// Canonical name of the delay column
pub const DELAY: &str = "delay";

/// Names the dataset may use for the same delay value
const DELAY_ALIASES: &[&str] = &["departure_delay", "dep_delay"];

/// A normalized result row
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Vec<(String, Value)>,
}

impl Row {
    /// Normalize raw `(column name, value)` pairs
    pub fn new<I, S>(raw: I) -> Self
    where
        I: IntoIterator<Item = (S, Value)>,
        S: AsRef<str>,
    {
        let mut columns: Vec<(String, Value)> = Vec::new();
        for (name, value) in raw {
            let name = name.as_ref().to_ascii_lowercase();
            if !columns.iter().any(|(existing, _)| *existing == name) {
                columns.push((name, value));
            }
        }

        let canonical = columns
            .iter()
            .position(|(name, _)| name == DELAY)
            .or_else(|| columns.iter().position(|(name, _)| is_delay_alias(name)));
        if let Some(idx) = canonical {
            columns[idx].0 = DELAY.to_string();
        }
        columns.retain(|(name, _)| !is_delay_alias(name));

        Self { columns }
    }

    /// Read the current row of a statement, given its lowercase column names
    pub fn from_sqlite(names: &[String], row: &rusqlite::Row) -> rusqlite::Result<Self> {
        let mut raw = Vec::with_capacity(names.len());
        for (idx, name) in names.iter().enumerate() {
            raw.push((name.as_str(), row.get::<_, Value>(idx)?));
        }
        Ok(Self::new(raw))
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.columns.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(n, _)| n.as_str())
    }

    /// Integer column; `NULL` or absent is `None`
    pub fn int(&self, name: &str) -> Result<Option<i64>> {
        match self.get(name) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Integer(i)) => Ok(Some(*i)),
            Some(Value::Real(r)) if r.fract() == 0.0 => Ok(Some(*r as i64)),
            Some(Value::Text(s)) => s
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| malformed(name, "integer", s)),
            Some(other) => Err(malformed(name, "integer", &format!("{:?}", other))),
        }
    }

    /// Numeric column read as `f64`; `NULL` or absent is `None`
    pub fn real(&self, name: &str) -> Result<Option<f64>> {
        match self.get(name) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Integer(i)) => Ok(Some(*i as f64)),
            Some(Value::Real(r)) => Ok(Some(*r)),
            Some(Value::Text(s)) => s
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| malformed(name, "number", s)),
            Some(other) => Err(malformed(name, "number", &format!("{:?}", other))),
        }
    }

    /// Text column; numbers are rendered, `NULL` or absent is `None`
    pub fn text(&self, name: &str) -> Result<Option<String>> {
        match self.get(name) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Text(s)) => Ok(Some(s.clone())),
            Some(Value::Integer(i)) => Ok(Some(i.to_string())),
            Some(Value::Real(r)) => Ok(Some(r.to_string())),
            Some(Value::Blob(_)) => Err(malformed(name, "text", "blob")),
        }
    }

    pub fn require_int(&self, name: &str) -> Result<i64> {
        self.int(name)?.ok_or_else(|| missing(name))
    }

    pub fn require_text(&self, name: &str) -> Result<String> {
        self.text(name)?.ok_or_else(|| missing(name))
    }
}

fn is_delay_alias(name: &str) -> bool {
    DELAY_ALIASES.contains(&name)
}

fn missing(column: &str) -> Error {
    Error::MalformedRow(format!("missing column `{}`", column))
}

fn malformed(column: &str, expected: &str, got: &str) -> Error {
    Error::MalformedRow(format!("column `{}`: expected {}, got {}", column, expected, got))
}
