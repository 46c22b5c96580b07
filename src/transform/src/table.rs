//! Column header plus row matrix, tag values spliced in after the time cell.

use common::config::SchemaPolicy;
use dashboard_api::{Table, TableColumn};
use serde_json::Value;

use crate::error::{Result, TransformError};
use crate::interpret::{CanonicalSeries, cell};

/// Layout fixed by the first series.
#[derive(Debug, Clone, PartialEq)]
struct Header {
    tag_keys: Vec<String>,
    data_columns: Vec<String>,
}

impl Header {
    fn of(series: &CanonicalSeries) -> Self {
        let time = series.time_index();
        Self {
            tag_keys: series
                .tags
                .as_ref()
                .map(|tags| tags.keys().cloned().collect())
                .unwrap_or_default(),
            data_columns: series
                .columns
                .iter()
                .enumerate()
                .filter(|(index, _)| *index != time)
                .map(|(_, column)| column.clone())
                .collect(),
        }
    }

    fn names(&self) -> Vec<String> {
        self.tag_keys
            .iter()
            .chain(self.data_columns.iter())
            .cloned()
            .collect()
    }

    /// Same data columns in the same order and the same set of tag keys.
    fn accepts(&self, other: &Header) -> bool {
        self.data_columns == other.data_columns
            && self.tag_keys.len() == other.tag_keys.len()
            && self.tag_keys.iter().all(|key| other.tag_keys.contains(key))
    }

    fn columns(&self) -> Vec<TableColumn> {
        std::iter::once(TableColumn::time())
            .chain(self.tag_keys.iter().map(TableColumn::new))
            .chain(self.data_columns.iter().map(TableColumn::new))
            .collect()
    }
}

pub fn project(series: &[CanonicalSeries], policy: SchemaPolicy) -> Result<Table> {
    let Some(first) = series.first() else {
        return Ok(Table::default());
    };

    let header = Header::of(first);
    let mut table = Table {
        columns: header.columns(),
        rows: Vec::new(),
    };

    for series in series {
        let layout = Header::of(series);
        let aligned = header.accepts(&layout);

        if !aligned {
            match policy {
                SchemaPolicy::Strict => {
                    return Err(TransformError::InconsistentTableSchema {
                        series: series.name.clone(),
                        expected: header.names(),
                        found: layout.names(),
                    });
                }
                SchemaPolicy::Pad => tracing::debug!(
                    "Padding series '{}' to the table header",
                    series.name
                ),
            }
        }

        let time = series.time_index();
        let data_indexes: Vec<Option<usize>> = if aligned {
            (0..series.columns.len())
                .filter(|index| *index != time)
                .map(Some)
                .collect()
        } else {
            header
                .data_columns
                .iter()
                .map(|column| series.column_index(column))
                .collect()
        };

        for row in &series.rows {
            let mut cells = Vec::with_capacity(1 + header.tag_keys.len() + data_indexes.len());
            cells.push(cell(row, time));
            cells.extend(header.tag_keys.iter().map(|key| tag_value(series, key)));
            cells.extend(
                data_indexes
                    .iter()
                    .map(|index| index.map_or(Value::Null, |index| cell(row, index))),
            );
            table.rows.push(cells);
        }
    }

    Ok(table)
}

fn tag_value(series: &CanonicalSeries, key: &str) -> Value {
    series
        .tags
        .as_ref()
        .and_then(|tags| tags.get(key))
        .map_or(Value::Null, |value| Value::String(value.clone()))
}
