//! Row transcoding from source representation to target representation.
//!
//! SQLite stores flags as 0/1 integers and structured payloads as text. The
//! transcoder restores both using only the declared source type and a
//! leading-character sniff, so the results are heuristic by nature: a TEXT
//! column that happens to hold `[1,2]` becomes a JSON array.

use crate::models::{CellValue, ColumnInfo, RowRecord, TableDescriptor};

/// Target-side write plan for one table: the shared columns in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertPlan {
    /// Target table name
    pub table: String,
    /// Target metadata of the shared columns; drives parameter casts
    pub columns: Vec<ColumnInfo>,
}

/// Converts source rows of one table into target-ready value lists.
#[derive(Debug, Clone)]
pub struct RowTranscoder {
    table: String,
    /// (source, target) metadata per shared column
    columns: Vec<(ColumnInfo, ColumnInfo)>,
}

impl RowTranscoder {
    /// Builds a transcoder over the column intersection of a table.
    pub fn new(descriptor: &TableDescriptor) -> Self {
        let columns = descriptor
            .shared_columns()
            .into_iter()
            .map(|shared| (shared.source.clone(), shared.target.clone()))
            .collect();

        Self {
            table: descriptor.name.clone(),
            columns,
        }
    }

    /// True when the two stores share no column for this table.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Names of the shared columns in write order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|(s, _)| s.name.as_str()).collect()
    }

    /// The write plan matching [`RowTranscoder::transcode`] output.
    pub fn plan(&self) -> InsertPlan {
        InsertPlan {
            table: self.table.clone(),
            columns: self.columns.iter().map(|(_, t)| t.clone()).collect(),
        }
    }

    /// Produces one value per shared column. Never fails; a column missing
    /// from the row reads as null.
    pub fn transcode(&self, row: &RowRecord) -> Vec<CellValue> {
        self.columns
            .iter()
            .map(|(source, _)| {
                let value = row.get(&source.name).cloned().unwrap_or(CellValue::Null);
                transcode_value(source, value)
            })
            .collect()
    }
}

/// Applies the per-value coercion rules, first match wins.
pub fn transcode_value(source: &ColumnInfo, value: CellValue) -> CellValue {
    match value {
        CellValue::Null => CellValue::Null,
        CellValue::Integer(i @ (0 | 1)) if source.is_boolean_like() => CellValue::Bool(i == 1),
        CellValue::Real(f) if source.is_boolean_like() && (f == 0.0 || f == 1.0) => {
            CellValue::Bool(f == 1.0)
        }
        CellValue::Text(text) if text.starts_with('{') || text.starts_with('[') => {
            match serde_json::from_str::<serde_json::Value>(&text) {
                Ok(parsed) => CellValue::Json(parsed),
                Err(_) => CellValue::Text(text),
            }
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn col(name: &str, declared_type: &str) -> ColumnInfo {
        ColumnInfo::new(name, declared_type, true)
    }

    #[test]
    fn test_column_intersection() {
        let descriptor = TableDescriptor::new(
            "t",
            vec![col("a", "TEXT"), col("b", "TEXT"), col("c", "TEXT")],
            vec![col("b", "text"), col("c", "text"), col("d", "text")],
        );
        let transcoder = RowTranscoder::new(&descriptor);
        assert_eq!(transcoder.column_names(), vec!["b", "c"]);

        let row = RowRecord::new()
            .with("a", CellValue::Text("x".into()))
            .with("b", CellValue::Text("y".into()))
            .with("c", CellValue::Text("z".into()));
        assert_eq!(
            transcoder.transcode(&row),
            vec![CellValue::Text("y".into()), CellValue::Text("z".into())]
        );

        let plan = transcoder.plan();
        assert_eq!(plan.table, "t");
        assert_eq!(plan.columns, vec![col("b", "text"), col("c", "text")]);
    }

    #[test]
    fn test_empty_intersection() {
        let descriptor = TableDescriptor::new("t", vec![col("a", "TEXT")], vec![col("z", "text")]);
        assert!(RowTranscoder::new(&descriptor).is_empty());
    }

    #[test]
    fn test_boolean_coercion_only_for_boolean_columns() {
        let flag = col("active", "BOOLEAN");
        let count = col("count", "INTEGER");

        assert_eq!(
            transcode_value(&flag, CellValue::Integer(1)),
            CellValue::Bool(true)
        );
        assert_eq!(
            transcode_value(&flag, CellValue::Integer(0)),
            CellValue::Bool(false)
        );
        assert_eq!(
            transcode_value(&count, CellValue::Integer(1)),
            CellValue::Integer(1)
        );
        // Out-of-range values in a boolean column are left for the target to judge
        assert_eq!(
            transcode_value(&flag, CellValue::Integer(2)),
            CellValue::Integer(2)
        );
    }

    #[test]
    fn test_boolean_detection_is_case_insensitive_substring() {
        let flag = col("is_public", "tinyint boolean");
        assert_eq!(
            transcode_value(&flag, CellValue::Real(1.0)),
            CellValue::Bool(true)
        );
    }

    #[test]
    fn test_json_parse_success_and_failure() {
        let body = col("payload", "TEXT");
        assert_eq!(
            transcode_value(&body, CellValue::Text(r#"{"a":1}"#.into())),
            CellValue::Json(json!({"a": 1}))
        );
        assert_eq!(
            transcode_value(&body, CellValue::Text("{not json".into())),
            CellValue::Text("{not json".into())
        );
        assert_eq!(
            transcode_value(&body, CellValue::Text(" {\"a\":1}".into())),
            CellValue::Text(" {\"a\":1}".into())
        );
    }

    #[test]
    fn test_json_object_keeps_key_order() {
        let prefs = col("preferences", "TEXT");
        let source = r#"{"theme":"dark","alerts":true,"nested":{"z":1,"a":[2,1]}}"#;

        let value = transcode_value(&prefs, CellValue::Text(source.into()));
        assert!(matches!(value, CellValue::Json(_)));
        assert_eq!(value.to_pg_text().as_deref(), Some(source));
    }

    #[test]
    fn test_json_sniff_ignores_declared_type() {
        // A plain text column holding an array-like string is still parsed
        let title = col("title", "VARCHAR(255)");
        assert_eq!(
            transcode_value(&title, CellValue::Text("[1,2]".into())),
            CellValue::Json(json!([1, 2]))
        );
    }

    #[test]
    fn test_null_and_passthrough() {
        let flag = col("active", "BOOLEAN");
        assert_eq!(transcode_value(&flag, CellValue::Null), CellValue::Null);
        assert_eq!(
            transcode_value(&flag, CellValue::Text("1".into())),
            CellValue::Text("1".into())
        );
        assert_eq!(
            transcode_value(&col("data", "BLOB"), CellValue::Blob(vec![0, 1])),
            CellValue::Blob(vec![0, 1])
        );
    }

    #[test]
    fn test_missing_row_value_reads_as_null() {
        let descriptor = TableDescriptor::new("t", vec![col("a", "TEXT")], vec![col("a", "text")]);
        let transcoder = RowTranscoder::new(&descriptor);
        assert_eq!(transcoder.transcode(&RowRecord::new()), vec![CellValue::Null]);
    }
}
