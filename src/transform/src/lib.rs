//! Turns time-series query responses into the chart, table and annotation
//! models a dashboard renders, and maintains offset overlay lines on saved
//! dashboards.

use common::config::SchemaPolicy;
use dashboard_api::{Annotation, QueryResponse, Table, TimeSeries};

pub mod annotations;
pub mod error;
pub mod interpret;
pub mod naming;
pub mod offset;
pub mod options;
pub mod overlay;
pub mod persistence;
pub mod table;
pub mod timeseries;

pub use error::{Result, TransformError};
pub use interpret::{CanonicalSeries, Layout};
pub use options::SeriesOptions;

/// One query response, normalised, together with the options of the query
/// that produced it.
#[derive(Debug, Clone)]
pub struct QueryResult {
    series: Vec<CanonicalSeries>,
    options: SeriesOptions,
}

impl QueryResult {
    pub fn new(response: QueryResponse, options: SeriesOptions) -> Result<Self> {
        let raw = interpret::series_of(response)?;
        let series = interpret::interpret(raw, options.group_by_field())?;
        tracing::debug!("Interpreted {} series", series.len());

        Ok(Self { series, options })
    }

    pub fn series(&self) -> &[CanonicalSeries] {
        &self.series
    }

    pub fn options(&self) -> &SeriesOptions {
        &self.options
    }

    pub fn time_series(&self) -> Result<Vec<TimeSeries>> {
        timeseries::project(&self.series, &self.options)
    }

    pub fn table(&self, policy: SchemaPolicy) -> Result<Table> {
        table::project(&self.series, policy)
    }

    pub fn annotations(&self) -> Vec<Annotation> {
        annotations::project(&self.series, &self.options.annotation)
    }
}
