/// Failures raised while turning query responses into panel data.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum TransformError {
    #[error("Malformed offset '{0}': expected <digits><s|m|h|d>")]
    MalformedOffsetSpec(String),
    #[error("Row {row} of series '{series}' has {found} cells, expected {expected}")]
    RaggedRow {
        series: String,
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("Series '{series}' does not match the table header: expected {expected:?}, found {found:?}")]
    InconsistentTableSchema {
        series: String,
        expected: Vec<String>,
        found: Vec<String>,
    },
    #[error("Query statement {statement} failed: {message}")]
    StatementError { statement: usize, message: String },
}

pub type Result<T> = std::result::Result<T, TransformError>;
