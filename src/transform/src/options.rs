use dashboard_api::AnnotationConfig;
use dashboard_api::dashboard::Target;

/// Per-query settings that travel with a response into the projectors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesOptions {
    /// User-authored naming template
    pub alias: Option<String>,
    /// Column the grouped shape is partitioned by
    pub group_by_field: Option<String>,
    /// Offset token such as `1d`; timestamps are shifted forward by it
    pub time_offset: Option<String>,
    /// Whether the query line is an auto-generated overlay
    pub auto_created: bool,
    /// Column roles for annotation queries
    pub annotation: AnnotationConfig,
}

impl SeriesOptions {
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn with_group_by(mut self, field: impl Into<String>) -> Self {
        self.group_by_field = Some(field.into());
        self
    }

    pub fn with_time_offset(mut self, offset: impl Into<String>, auto_created: bool) -> Self {
        self.time_offset = Some(offset.into());
        self.auto_created = auto_created;
        self
    }

    pub fn with_annotation(mut self, annotation: AnnotationConfig) -> Self {
        self.annotation = annotation;
        self
    }

    pub fn from_target(target: &Target) -> Self {
        Self {
            alias: target.alias().map(str::to_string),
            group_by_field: target
                .extra
                .get("groupByField")
                .and_then(|v| v.as_str())
                .filter(|v| !v.is_empty())
                .map(str::to_string),
            time_offset: target.offset().map(str::to_string),
            auto_created: target.auto_created,
            annotation: AnnotationConfig::default(),
        }
    }

    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref().filter(|alias| !alias.is_empty())
    }

    pub fn time_offset(&self) -> Option<&str> {
        self.time_offset
            .as_deref()
            .filter(|offset| !offset.trim().is_empty())
    }

    pub fn group_by_field(&self) -> Option<&str> {
        self.group_by_field.as_deref().filter(|field| !field.is_empty())
    }
}
