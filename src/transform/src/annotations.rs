//! Annotation events read from query rows.

use chrono::DateTime;
use dashboard_api::{Annotation, AnnotationConfig};
use serde_json::Value;

use crate::interpret::{CanonicalSeries, SEQUENCE_COLUMN, TIME_COLUMN};

/// Column index assigned to each annotation role.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Roles {
    pub time: Option<usize>,
    pub title: Option<usize>,
    pub tags: Option<usize>,
    pub text: Option<usize>,
}

impl Roles {
    /// `time` and `sequence_number` are reserved; the first other column is
    /// the title unless a later column is named as the title column.
    pub fn assign(columns: &[String], config: &AnnotationConfig) -> Self {
        let mut roles = Roles::default();

        for (index, column) in columns.iter().enumerate() {
            let column = column.as_str();
            if column == TIME_COLUMN {
                roles.time = Some(index);
                continue;
            }
            if column == SEQUENCE_COLUMN {
                continue;
            }
            if roles.title.is_none() {
                roles.title = Some(index);
            }

            if config.title_column.as_deref() == Some(column) {
                roles.title = Some(index);
            } else if config.tags_column.as_deref() == Some(column) {
                roles.tags = Some(index);
            } else if config.text_column.as_deref() == Some(column) {
                roles.text = Some(index);
            }
        }

        roles
    }

    fn missing(&self) -> Vec<&'static str> {
        [
            ("time", self.time),
            ("title", self.title),
            ("tags", self.tags),
            ("text", self.text),
        ]
        .into_iter()
        .filter(|(_, index)| index.is_none())
        .map(|(role, _)| role)
        .collect()
    }
}

pub fn project(series: &[CanonicalSeries], config: &AnnotationConfig) -> Vec<Annotation> {
    let mut list = Vec::new();

    for series in series {
        let roles = Roles::assign(&series.columns, config);
        let missing = roles.missing();
        if !missing.is_empty() {
            tracing::debug!(
                "Series '{}' has no column for annotation roles {missing:?}",
                series.name
            );
        }

        let read = |row: &[Value], role: Option<usize>| role.and_then(|index| row.get(index).cloned());

        for row in &series.rows {
            list.push(Annotation {
                annotation: config.clone(),
                time: roles
                    .time
                    .and_then(|index| row.get(index))
                    .and_then(epoch_millis),
                title: read(row, roles.title),
                tags: read(row, roles.tags),
                text: read(row, roles.text),
            });
        }
    }

    list
}

/// Coerce a time cell to milliseconds since epoch. Numbers are taken as
/// milliseconds, strings may be RFC 3339 or a plain integer.
pub fn epoch_millis(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64().or_else(|| {
            number
                .as_f64()
                .filter(|ms| ms.is_finite())
                .map(|ms| ms.trunc() as i64)
        }),
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .map(|time| time.timestamp_millis())
            .ok()
            .or_else(|| s.trim().parse::<i64>().ok()),
        _ => None,
    }
}
