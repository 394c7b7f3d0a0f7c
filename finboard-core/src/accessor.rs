//! Typed column accessors.
//!
//! Row data arrives as JSON objects. Instead of indexing rows by arbitrary
//! strings at render time, the manifest is resolved once into a table of
//! [`Accessor`]s keyed by column id, each knowing its source field and the
//! value type it must produce.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde_json::Value;

use crate::format::CellValue;
use crate::manifest::{ColumnManifest, DataType};

/// Reads one column's value out of a row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accessor {
    field: String,
    data_type: DataType,
}

impl Accessor {
    pub fn new(field: impl Into<String>, data_type: DataType) -> Self {
        Self {
            field: field.into(),
            data_type,
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    /// Extract a typed cell. Absent fields, nulls and type mismatches are `Missing`.
    pub fn read(&self, row: &Value) -> CellValue {
        let Some(raw) = row.get(&self.field) else {
            return CellValue::Missing;
        };
        match self.data_type {
            DataType::String => match raw {
                Value::String(s) => CellValue::Text(s.clone()),
                Value::Number(n) => CellValue::Text(n.to_string()),
                Value::Bool(b) => CellValue::Text(b.to_string()),
                _ => CellValue::Missing,
            },
            DataType::Number => match raw {
                Value::Number(n) => n.as_f64().map_or(CellValue::Missing, CellValue::Number),
                Value::String(s) => s
                    .trim()
                    .parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .map_or(CellValue::Missing, CellValue::Number),
                _ => CellValue::Missing,
            },
            DataType::Date => match raw {
                Value::String(s) => parse_date(s).map_or(CellValue::Missing, CellValue::Date),
                _ => CellValue::Missing,
            },
        }
    }
}

/// Accepts `YYYY-MM-DD` and anything that starts with it (RFC 3339 timestamps).
fn parse_date(s: &str) -> Option<NaiveDate> {
    let head = s.get(..10).unwrap_or(s);
    NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
}

/// Column id → accessor table, resolved once per manifest.
#[derive(Debug, Clone, Default)]
pub struct ColumnAccessors {
    by_id: HashMap<String, Accessor>,
}

impl ColumnAccessors {
    pub fn resolve(manifest: &ColumnManifest) -> Self {
        let by_id = manifest
            .columns
            .iter()
            .map(|c| {
                (
                    c.id.clone(),
                    Accessor::new(c.source_field(), c.data_type),
                )
            })
            .collect();
        Self { by_id }
    }

    pub fn get(&self, column_id: &str) -> Option<&Accessor> {
        self.by_id.get(column_id)
    }

    /// `None` when the column id is not part of the manifest.
    pub fn extract(&self, column_id: &str, row: &Value) -> Option<CellValue> {
        self.get(column_id).map(|a| a.read(row))
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn resolves_every_manifest_column() {
        let manifest = ColumnManifest::builtin();
        let accessors = ColumnAccessors::resolve(&manifest);
        assert_eq!(accessors.len(), manifest.columns.len());
        // Field override from the manifest.
        assert_eq!(accessors.get("price_close").unwrap().field(), "close");
        assert_eq!(accessors.get("ticker").unwrap().field(), "ticker");
    }

    #[test]
    fn extracts_typed_values() {
        let accessors = ColumnAccessors::resolve(&ColumnManifest::builtin());
        let row = json!({
            "ticker": "AAPL",
            "close": 189.5,
            "market_cap": "2950000000000",
            "ex_dividend_date": "2024-05-10T00:00:00Z",
            "pe_ratio": null,
        });

        assert_eq!(
            accessors.extract("ticker", &row),
            Some(CellValue::Text("AAPL".into()))
        );
        assert_eq!(
            accessors.extract("price_close", &row),
            Some(CellValue::Number(189.5))
        );
        assert_eq!(
            accessors.extract("market_cap", &row),
            Some(CellValue::Number(2.95e12))
        );
        assert_eq!(
            accessors.extract("ex_dividend_date", &row),
            Some(CellValue::Date(NaiveDate::from_ymd_opt(2024, 5, 10).unwrap()))
        );
        assert_eq!(accessors.extract("pe_ratio", &row), Some(CellValue::Missing));
        assert_eq!(accessors.extract("volume", &row), Some(CellValue::Missing));
        assert_eq!(accessors.extract("not_a_column", &row), None);
    }

    #[test]
    fn type_mismatch_is_missing() {
        let accessor = Accessor::new("close", DataType::Number);
        assert_eq!(accessor.read(&json!({"close": "n/a"})), CellValue::Missing);
        assert_eq!(accessor.read(&json!({"close": [1, 2]})), CellValue::Missing);

        let date = Accessor::new("d", DataType::Date);
        assert_eq!(date.read(&json!({"d": "yesterday"})), CellValue::Missing);
    }
}
