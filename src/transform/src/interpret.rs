//! Normalises both historical response shapes into [`CanonicalSeries`].

use dashboard_api::{QueryResponse, RawSeries};
use indexmap::IndexMap;
use serde_json::Value;

use crate::error::{Result, TransformError};

pub const TIME_COLUMN: &str = "time";
pub const SEQUENCE_COLUMN: &str = "sequence_number";

/// Which response shape a series came from; selects the naming grammar and
/// the time-series projection strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Layout {
    /// One series per tag set, one line per value column
    Tagged,
    /// Untagged points, partitioned by an optional group-by column
    Grouped { group_by_field: Option<String> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalSeries {
    pub name: String,
    pub columns: Vec<String>,
    /// Every row is exactly `columns.len()` cells wide
    pub rows: Vec<Vec<Value>>,
    pub tags: Option<IndexMap<String, String>>,
    pub layout: Layout,
}

impl CanonicalSeries {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    /// Index of the `time` column, falling back to the leading column.
    pub fn time_index(&self) -> usize {
        self.column_index(TIME_COLUMN).unwrap_or(0)
    }

    /// Dot-separated parts of the series name.
    pub fn segments(&self) -> Vec<&str> {
        self.name.split('.').collect()
    }

    /// Tags, if the series carries at least one.
    pub fn tags(&self) -> Option<&IndexMap<String, String>> {
        self.tags.as_ref().filter(|tags| !tags.is_empty())
    }

    pub fn group_by_field(&self) -> Option<&str> {
        match &self.layout {
            Layout::Grouped { group_by_field } => group_by_field.as_deref(),
            Layout::Tagged => None,
        }
    }
}

/// Cell `index` of `row`, null when out of range.
pub fn cell(row: &[Value], index: usize) -> Value {
    row.get(index).cloned().unwrap_or(Value::Null)
}

/// Flatten a response envelope into its series, failing on the first
/// statement that reported an error.
pub fn series_of(response: QueryResponse) -> Result<Vec<RawSeries>> {
    match response {
        QueryResponse::Series(series) => Ok(series),
        QueryResponse::Statements { results } => {
            let mut all = Vec::new();
            for (statement, result) in results.into_iter().enumerate() {
                if let Some(message) = result.error {
                    return Err(TransformError::StatementError { statement, message });
                }
                all.extend(result.series.unwrap_or_default());
            }
            Ok(all)
        }
    }
}

/// Normalise raw series, preserving order and cardinality.
///
/// `group_by_field` comes from the query options and only applies to the
/// grouped shape.
pub fn interpret(raw: Vec<RawSeries>, group_by_field: Option<&str>) -> Result<Vec<CanonicalSeries>> {
    let group_by_field = group_by_field.filter(|field| !field.is_empty());

    raw.into_iter()
        .map(|series| {
            let canonical = match series {
                RawSeries::Tagged(series) => CanonicalSeries {
                    name: series.name,
                    columns: series.columns,
                    rows: series.values,
                    tags: series.tags,
                    layout: Layout::Tagged,
                },
                RawSeries::Grouped(series) => CanonicalSeries {
                    name: series.name,
                    columns: series.columns,
                    rows: series.points,
                    tags: None,
                    layout: Layout::Grouped {
                        group_by_field: group_by_field.map(str::to_string),
                    },
                },
            };
            check_row_widths(&canonical)?;
            Ok(canonical)
        })
        .collect()
}

fn check_row_widths(series: &CanonicalSeries) -> Result<()> {
    let expected = series.columns.len();
    match series.rows.iter().position(|row| row.len() != expected) {
        Some(row) => Err(TransformError::RaggedRow {
            series: series.name.clone(),
            row,
            expected,
            found: series.rows[row].len(),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> Vec<RawSeries> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_empty_input_yields_empty_output() {
        assert!(interpret(Vec::new(), None).unwrap().is_empty());
        assert!(interpret(Vec::new(), Some("host")).unwrap().is_empty());
    }

    #[test]
    fn test_preserves_order_and_shape() {
        let series = interpret(
            raw(json!([
                {"name": "cpu", "tags": {"host": "a"}, "columns": ["time", "value"], "values": [[1, 2]]},
                {"name": "mem", "columns": ["time", "value"], "points": [[1, 3]]}
            ])),
            Some("host"),
        )
        .unwrap();

        assert_eq!(series.len(), 2);
        assert_eq!(series[0].name, "cpu");
        assert_eq!(series[0].layout, Layout::Tagged);
        assert_eq!(series[0].tags().unwrap()["host"], "a");
        assert_eq!(series[1].name, "mem");
        assert_eq!(series[1].group_by_field(), Some("host"));
        assert_eq!(series[1].tags, None);
    }

    #[test]
    fn test_ragged_rows_are_rejected() {
        let err = interpret(
            raw(json!([
                {"name": "cpu", "columns": ["time", "value"], "values": [[1, 2], [3]]}
            ])),
            None,
        )
        .unwrap_err();

        assert_eq!(
            err,
            TransformError::RaggedRow {
                series: "cpu".to_string(),
                row: 1,
                expected: 2,
                found: 1,
            }
        );
    }

    #[test]
    fn test_statement_errors_surface() {
        let response: QueryResponse = serde_json::from_value(json!({
            "results": [
                {"series": [{"name": "cpu", "columns": ["time"], "values": []}]},
                {"error": "database not found: metrics"}
            ]
        }))
        .unwrap();

        let err = series_of(response).unwrap_err();
        assert_eq!(
            err,
            TransformError::StatementError {
                statement: 1,
                message: "database not found: metrics".to_string(),
            }
        );
    }

    #[test]
    fn test_statements_without_series_contribute_nothing() {
        let response: QueryResponse =
            serde_json::from_value(json!({"results": [{}, {"series": []}]})).unwrap();

        assert!(series_of(response).unwrap().is_empty());
    }

    #[test]
    fn test_time_index_falls_back_to_first_column() {
        let series = interpret(
            raw(json!([{"name": "cpu", "columns": ["ts", "value"], "values": []}])),
            None,
        )
        .unwrap();

        assert_eq!(series[0].time_index(), 0);
        assert_eq!(series[0].segments(), vec!["cpu"]);
    }
}
