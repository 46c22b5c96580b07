use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub mod dashboard;

/// Body of a query-engine response.
///
/// Two envelopes are in the wild: a bare list of series, and the
/// statement envelope returned by newer engines:
///
/// {
///   "results": [
///     {
///       "series": [
///         {
///           "name": "cpu",
///           "tags": {"host": "a"},
///           "columns": ["time", "value"],
///           "values": [[1000, 5]]
///         }
///       ]
///     }
///   ]
/// }
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum QueryResponse {
    Series(Vec<RawSeries>),
    Statements { results: Vec<StatementResult> },
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct StatementResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series: Option<Vec<RawSeries>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// One series as delivered by the query engine, in either historical shape.
///
/// A `points` key selects the grouped shape; any other series is tagged, its
/// rows under `values`. A tagged series may omit `values` when the query
/// matched no rows.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum RawSeries {
    Grouped(GroupedSeries),
    Tagged(TaggedSeries),
}

/// Series keyed by a tag set, rows under `values`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TaggedSeries {
    pub name: String,
    pub columns: Vec<String>,
    #[serde(default)]
    pub values: Vec<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<IndexMap<String, String>>,
}

/// Series without tags, rows under `points`; partitioned client side by the
/// query's `groupByField`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct GroupedSeries {
    pub name: String,
    pub columns: Vec<String>,
    pub points: Vec<Vec<Value>>,
}

/// A named line for the chart consumer.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TimeSeries {
    pub target: String,
    pub datapoints: Vec<DataPoint>,
}

/// `[value, timestamp]`, value first, as the chart component expects.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DataPoint(pub Value, pub Value);

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Table {
    pub columns: Vec<TableColumn>,
    pub rows: Vec<Vec<Value>>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TableColumn {
    pub text: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub column_type: Option<String>,
}

impl TableColumn {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            column_type: None,
        }
    }

    pub fn time() -> Self {
        Self {
            text: "Time".to_string(),
            column_type: Some("time".to_string()),
        }
    }
}

/// Column roles chosen by the user for an annotation query.
///
/// Unknown keys (name, datasource, icon colour, ...) are carried along so the
/// config can be echoed back on every event.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_column: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags_column: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_column: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A single annotation event. Roles that were never assigned stay absent.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Annotation {
    pub annotation: AnnotationConfig,
    /// Milliseconds since epoch; `None` when the time cell could not be read
    pub time: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<Value>,
}
