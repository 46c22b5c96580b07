use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Persisted dashboard document.
///
/// Only the fields touched by offset overlays are typed; everything else is
/// kept in `extra` and written back verbatim.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Dashboard {
    #[serde(default)]
    pub rows: Vec<Row>,
    #[serde(default)]
    pub offsets: Vec<String>,
    #[serde(default)]
    pub with_offset: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Row {
    #[serde(default)]
    pub panels: Vec<Panel>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Panel {
    #[serde(rename = "type", default)]
    pub panel_type: String,
    #[serde(default)]
    pub targets: Vec<Target>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Panel {
    pub const GRAPH: &'static str = "graph";

    pub fn is_graph(&self) -> bool {
        self.panel_type == Self::GRAPH
    }
}

/// One query line of a panel.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Target {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_offset: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub auto_created: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Target {
    /// The offset this line is shifted by, treating a blank string as none.
    pub fn offset(&self) -> Option<&str> {
        self.time_offset
            .as_deref()
            .filter(|offset| !offset.trim().is_empty())
    }

    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref().filter(|alias| !alias.is_empty())
    }
}

/// Success payload of the persistence collaborator.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SavedDashboard {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u64>,
}

/// Failure payload of the persistence collaborator.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SaveError {
    pub message: String,
    pub status: u16,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

impl SaveError {
    pub const VALIDATION_FAILED: u16 = 422;

    pub fn new(message: impl Into<String>, status: u16) -> Self {
        Self {
            message: message.into(),
            status,
        }
    }

    /// Warning below 500, error otherwise.
    pub fn severity(&self) -> Severity {
        if self.status < 500 {
            Severity::Warning
        } else {
            Severity::Error
        }
    }

    /// Headline shown to the user alongside `message`.
    pub fn title(&self) -> &'static str {
        if self.status == Self::VALIDATION_FAILED {
            "Validation failed"
        } else {
            "Problem!"
        }
    }
}

impl fmt::Display for SaveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (status {})", self.message, self.status)
    }
}

impl std::error::Error for SaveError {}
