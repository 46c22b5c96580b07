//! Named `[value, timestamp]` lines for the chart consumer.

use dashboard_api::{DataPoint, TimeSeries};
use indexmap::IndexMap;
use serde_json::{Number, Value};

use crate::error::Result;
use crate::interpret::{CanonicalSeries, Layout, SEQUENCE_COLUMN, TIME_COLUMN, cell};
use crate::naming::{NameContext, SeriesNamer};
use crate::offset;
use crate::options::SeriesOptions;

/// Project every series into lines, shifting timestamps by the configured
/// offset.
pub fn project(series: &[CanonicalSeries], options: &SeriesOptions) -> Result<Vec<TimeSeries>> {
    let shift = offset::decode_optional(options.time_offset())?;
    let namer = SeriesNamer::new(options);

    let mut output = Vec::new();
    for series in series {
        match &series.layout {
            Layout::Tagged => project_tagged(series, &namer, &mut output),
            Layout::Grouped { group_by_field } => {
                project_grouped(series, group_by_field.as_deref(), &namer, &mut output)
            }
        }
    }

    if shift != 0 {
        for line in output.iter_mut() {
            shift_timestamps(line, shift);
        }
    }

    Ok(output)
}

/// One line per non-time column, rows kept in source order.
fn project_tagged(series: &CanonicalSeries, namer: &SeriesNamer<'_>, output: &mut Vec<TimeSeries>) {
    let time = series.time_index();

    for (index, column) in series.columns.iter().enumerate() {
        if index == time {
            continue;
        }

        let datapoints = series
            .rows
            .iter()
            .map(|row| DataPoint(cell(row, index), cell(row, time)))
            .collect();

        output.push(TimeSeries {
            target: namer.name(&NameContext::column(series, column)),
            datapoints,
        });
    }
}

/// One line per group-by value, or a single line keyed by the value column.
fn project_grouped(
    series: &CanonicalSeries,
    group_by_field: Option<&str>,
    namer: &SeriesNamer<'_>,
    output: &mut Vec<TimeSeries>,
) {
    let time = series.column_index(TIME_COLUMN);

    let Some(value) = series.columns.iter().position(|column| {
        column != TIME_COLUMN && column != SEQUENCE_COLUMN && Some(column.as_str()) != group_by_field
    }) else {
        tracing::warn!("Series '{}' has no value column, skipping", series.name);
        return;
    };

    let group_column = group_by_field.and_then(|field| {
        let index = series.column_index(field);
        if index.is_none() {
            tracing::warn!(
                "Group-by field '{field}' not found in series '{}', rendering ungrouped",
                series.name
            );
        }
        index
    });

    let mut groups: IndexMap<String, Vec<&Vec<Value>>> = IndexMap::new();
    match group_column {
        Some(group_column) => {
            for row in &series.rows {
                groups.entry(group_key(&cell(row, group_column))).or_default().push(row);
            }
        }
        None => {
            groups.insert(series.columns[value].clone(), series.rows.iter().collect());
        }
    }

    for (key, rows) in &groups {
        let datapoints = rows
            .iter()
            .map(|row| {
                let timestamp = time.map_or(Value::Null, |time| cell(row, time));
                DataPoint(numeric_or_null(&cell(row, value)), timestamp)
            })
            .collect();

        output.push(TimeSeries {
            target: namer.name(&NameContext::group(series, key)),
            datapoints,
        });
    }
}

fn group_key(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Keep anything that reads as a number; everything else becomes null.
fn numeric_or_null(value: &Value) -> Value {
    match value {
        Value::Number(_) | Value::Null | Value::Bool(_) => value.clone(),
        Value::String(s) if s.trim().is_empty() || s.trim().parse::<f64>().is_ok() => value.clone(),
        _ => Value::Null,
    }
}

/// Move every numeric timestamp forward by `shift` milliseconds.
pub fn shift_timestamps(series: &mut TimeSeries, shift: i64) {
    let mut skipped = 0usize;

    for point in series.datapoints.iter_mut() {
        match shifted(&point.1, shift) {
            Some(timestamp) => point.1 = timestamp,
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        tracing::warn!(
            "{skipped} non-numeric timestamps left unshifted in '{}'",
            series.target
        );
    }
}

fn shifted(timestamp: &Value, shift: i64) -> Option<Value> {
    let Value::Number(number) = timestamp else {
        return None;
    };

    if let Some(ms) = number.as_i64() {
        return ms.checked_add(shift).map(Value::from);
    }

    number
        .as_f64()
        .and_then(|ms| Number::from_f64(ms + shift as f64))
        .map(Value::Number)
}
