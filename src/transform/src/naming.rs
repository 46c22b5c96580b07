//! Alias templates and default series names.
//!
//! A template is split into literal text and placeholders by [`tokenize`];
//! each placeholder is classified into a [`Placeholder`] kind and resolved
//! against a [`NameContext`]. Anything that cannot be resolved is emitted as
//! the original placeholder text.

use crate::interpret::{CanonicalSeries, Layout};
use crate::options::SeriesOptions;

/// Placeholder syntax accepted for a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grammar {
    /// `$token` and `[[token]]`; tokens `m`, `measurement`, `col`, `N`, `tag_<key>`
    Tagged,
    /// `$token` only; tokens `s`, `g`, `N`
    Grouped,
}

impl From<&Layout> for Grammar {
    fn from(layout: &Layout) -> Self {
        match layout {
            Layout::Tagged => Grammar::Tagged,
            Layout::Grouped { .. } => Grammar::Grouped,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Literal(&'a str),
    /// `raw` is the full matched text, `token` the part between the delimiters
    Placeholder { raw: &'a str, token: &'a str },
}

fn is_word(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_'
}

pub fn tokenize(template: &str, grammar: Grammar) -> Vec<Segment<'_>> {
    let bytes = template.as_bytes();
    let mut segments = Vec::new();
    let mut literal_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        let placeholder = match bytes[i] {
            b'$' => {
                let end = bytes[i + 1..]
                    .iter()
                    .position(|b| !is_word(*b))
                    .map_or(bytes.len(), |n| i + 1 + n);
                (end > i + 1).then(|| (end, &template[i + 1..end]))
            }
            b'[' if grammar == Grammar::Tagged && bytes.get(i + 1) == Some(&b'[') => {
                bracketed(template, i + 2)
            }
            _ => None,
        };

        match placeholder {
            Some((end, token)) => {
                if literal_start < i {
                    segments.push(Segment::Literal(&template[literal_start..i]));
                }
                segments.push(Segment::Placeholder {
                    raw: &template[i..end],
                    token,
                });
                i = end;
                literal_start = end;
            }
            None => i += 1,
        }
    }

    if literal_start < bytes.len() {
        segments.push(Segment::Literal(&template[literal_start..]));
    }

    segments
}

/// `[[...]]` content starting at `start`, at least one character long.
fn bracketed(template: &str, start: usize) -> Option<(usize, &str)> {
    let first = template[start..].chars().next()?.len_utf8();
    let close = start + first + template[start + first..].find("]]")?;
    Some((close + 2, &template[start..close]))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder<'a> {
    /// Full series name
    Measurement,
    /// Column currently being rendered
    Column,
    /// Nth dot-separated part of the series name
    NameSegment(usize),
    /// Value of the named tag
    Tag(&'a str),
    /// Current group-by value
    Group,
    Unknown,
}

pub fn classify(token: &str, grammar: Grammar) -> Placeholder<'_> {
    if !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit()) {
        return token
            .parse()
            .map_or(Placeholder::Unknown, Placeholder::NameSegment);
    }

    match grammar {
        Grammar::Tagged => match token {
            "m" | "measurement" => Placeholder::Measurement,
            "col" => Placeholder::Column,
            _ => token
                .strip_prefix("tag_")
                .map_or(Placeholder::Unknown, Placeholder::Tag),
        },
        Grammar::Grouped => match token {
            "s" => Placeholder::Measurement,
            "g" => Placeholder::Group,
            _ => Placeholder::Unknown,
        },
    }
}

/// What a template is resolved against.
#[derive(Debug, Clone, Copy)]
pub struct NameContext<'a> {
    pub series: &'a CanonicalSeries,
    pub column: Option<&'a str>,
    pub group: Option<&'a str>,
}

impl<'a> NameContext<'a> {
    pub fn column(series: &'a CanonicalSeries, column: &'a str) -> Self {
        Self {
            series,
            column: Some(column),
            group: None,
        }
    }

    pub fn group(series: &'a CanonicalSeries, group: &'a str) -> Self {
        Self {
            series,
            column: None,
            group: Some(group),
        }
    }

    fn lookup(&self, placeholder: Placeholder<'_>) -> Option<&'a str> {
        match placeholder {
            Placeholder::Measurement => Some(self.series.name.as_str()),
            Placeholder::Column => self.column,
            Placeholder::NameSegment(n) => self.series.segments().get(n).copied(),
            Placeholder::Tag(key) => self
                .series
                .tags
                .as_ref()
                .and_then(|tags| tags.get(key))
                .map(String::as_str),
            Placeholder::Group => self.group,
            Placeholder::Unknown => None,
        }
    }
}

/// Resolve `template` with the grammar of the series in `context`.
pub fn resolve(template: &str, context: &NameContext<'_>) -> String {
    let grammar = Grammar::from(&context.series.layout);
    let mut out = String::with_capacity(template.len());

    for segment in tokenize(template, grammar) {
        match segment {
            Segment::Literal(text) => out.push_str(text),
            Segment::Placeholder { raw, token } => {
                out.push_str(context.lookup(classify(token, grammar)).unwrap_or(raw))
            }
        }
    }

    out
}

/// Names rendered lines from the query options.
#[derive(Debug, Clone, Copy)]
pub struct SeriesNamer<'a> {
    alias: Option<&'a str>,
    time_offset: Option<&'a str>,
    auto_created: bool,
}

impl<'a> SeriesNamer<'a> {
    pub fn new(options: &'a SeriesOptions) -> Self {
        Self {
            alias: options.alias(),
            time_offset: options.time_offset(),
            auto_created: options.auto_created,
        }
    }

    /// Alias if one is set, otherwise the default name plus offset suffix.
    pub fn name(&self, context: &NameContext<'_>) -> String {
        if let Some(alias) = self.alias {
            return resolve(alias, context);
        }

        let mut name = default_name(context);
        if let Some(offset) = self.time_offset {
            name.push('-');
            name.push_str(offset);
            if self.auto_created {
                name.push_str("-offset");
            }
        }
        name
    }
}

/// `series[.column] {tag: value, ...}` for tagged series, `series.group` for
/// grouped ones.
pub fn default_name(context: &NameContext<'_>) -> String {
    let series = context.series;
    let mut name = series.name.clone();

    match series.layout {
        Layout::Tagged => {
            if let Some(column) = context.column.filter(|column| *column != "value") {
                name.push('.');
                name.push_str(column);
            }
            if let Some(tags) = series.tags() {
                let pairs: Vec<String> = tags.iter().map(|(k, v)| format!("{k}: {v}")).collect();
                name.push_str(&format!(" {{{}}}", pairs.join(", ")));
            }
        }
        Layout::Grouped { .. } => {
            if let Some(key) = context.group.or(context.column) {
                name.push('.');
                name.push_str(key);
            }
        }
    }

    name
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    fn tagged(name: &str, tags: &[(&str, &str)]) -> CanonicalSeries {
        CanonicalSeries {
            name: name.to_string(),
            columns: vec!["time".to_string(), "value".to_string()],
            rows: Vec::new(),
            tags: (!tags.is_empty()).then(|| {
                tags.iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect::<IndexMap<_, _>>()
            }),
            layout: Layout::Tagged,
        }
    }

    fn grouped(name: &str) -> CanonicalSeries {
        CanonicalSeries {
            name: name.to_string(),
            columns: vec!["time".to_string(), "host".to_string(), "value".to_string()],
            rows: Vec::new(),
            tags: None,
            layout: Layout::Grouped {
                group_by_field: Some("host".to_string()),
            },
        }
    }

    #[test]
    fn test_tokenize_both_syntaxes() {
        assert_eq!(
            tokenize("host-[[0]]-$col!", Grammar::Tagged),
            vec![
                Segment::Literal("host-"),
                Segment::Placeholder {
                    raw: "[[0]]",
                    token: "0"
                },
                Segment::Literal("-"),
                Segment::Placeholder {
                    raw: "$col",
                    token: "col"
                },
                Segment::Literal("!"),
            ]
        );
    }

    #[test]
    fn test_tokenize_grouped_ignores_brackets() {
        assert_eq!(
            tokenize("[[s]] $s", Grammar::Grouped),
            vec![
                Segment::Literal("[[s]] "),
                Segment::Placeholder {
                    raw: "$s",
                    token: "s"
                },
            ]
        );
    }

    #[test]
    fn test_tokenize_unterminated_and_bare() {
        assert_eq!(
            tokenize("cost $ [[open", Grammar::Tagged),
            vec![Segment::Literal("cost $ [[open")]
        );
        assert_eq!(tokenize("", Grammar::Tagged), Vec::<Segment>::new());
    }

    #[test]
    fn test_bracket_content_is_non_empty() {
        assert_eq!(
            tokenize("[[]]]", Grammar::Tagged),
            vec![Segment::Placeholder {
                raw: "[[]]]",
                token: "]"
            }]
        );
        assert_eq!(
            tokenize("[[é]]", Grammar::Tagged),
            vec![Segment::Placeholder {
                raw: "[[é]]",
                token: "é"
            }]
        );
    }

    #[test]
    fn test_bracket_content_may_contain_spaces() {
        assert_eq!(
            tokenize("[[tag_host name]]", Grammar::Tagged),
            vec![Segment::Placeholder {
                raw: "[[tag_host name]]",
                token: "tag_host name"
            }]
        );
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify("m", Grammar::Tagged), Placeholder::Measurement);
        assert_eq!(classify("measurement", Grammar::Tagged), Placeholder::Measurement);
        assert_eq!(classify("col", Grammar::Tagged), Placeholder::Column);
        assert_eq!(classify("2", Grammar::Tagged), Placeholder::NameSegment(2));
        assert_eq!(classify("tag_host", Grammar::Tagged), Placeholder::Tag("host"));
        assert_eq!(classify("g", Grammar::Tagged), Placeholder::Unknown);
        assert_eq!(classify("s", Grammar::Grouped), Placeholder::Measurement);
        assert_eq!(classify("g", Grammar::Grouped), Placeholder::Group);
        assert_eq!(classify("1", Grammar::Grouped), Placeholder::NameSegment(1));
        assert_eq!(classify("col", Grammar::Grouped), Placeholder::Unknown);
    }

    #[test]
    fn test_resolve_segments_and_column() {
        let series = tagged("cpu.usage", &[]);
        let context = NameContext::column(&series, "value");

        assert_eq!(resolve("host-[[0]]-[[col]]", &context), "host-cpu-value");
        assert_eq!(resolve("$m / $1", &context), "cpu.usage / usage");
    }

    #[test]
    fn test_resolve_tags() {
        let series = tagged("cpu", &[("host", "web-1")]);
        let context = NameContext::column(&series, "value");

        assert_eq!(resolve("$tag_host", &context), "web-1");
        assert_eq!(resolve("[[tag_dc]]", &context), "[[tag_dc]]");

        let untagged = tagged("cpu", &[]);
        let context = NameContext::column(&untagged, "value");
        assert_eq!(resolve("$tag_host", &context), "$tag_host");
    }

    #[test]
    fn test_resolve_passes_unknown_through() {
        let series = tagged("cpu.usage", &[]);
        let context = NameContext::column(&series, "value");

        assert_eq!(resolve("$foo [[bar]] $9", &context), "$foo [[bar]] $9");
    }

    #[test]
    fn test_resolve_grouped() {
        let series = grouped("app.requests");
        let context = NameContext::group(&series, "web-1");

        assert_eq!(resolve("$s on $g ($0)", &context), "app.requests on web-1 (app)");
        assert_eq!(resolve("$5 $col [[s]]", &context), "$5 $col [[s]]");
    }

    #[test]
    fn test_default_names() {
        let options = SeriesOptions::default();
        let namer = SeriesNamer::new(&options);

        let plain = tagged("cpu", &[]);
        assert_eq!(namer.name(&NameContext::column(&plain, "value")), "cpu");
        assert_eq!(namer.name(&NameContext::column(&plain, "max")), "cpu.max");

        let with_tags = tagged("cpu", &[("host", "a"), ("dc", "eu")]);
        assert_eq!(
            namer.name(&NameContext::column(&with_tags, "value")),
            "cpu {host: a, dc: eu}"
        );

        let series = grouped("cpu");
        assert_eq!(namer.name(&NameContext::group(&series, "a")), "cpu.a");
    }

    #[test]
    fn test_offset_suffix_only_without_alias() {
        let series = tagged("cpu", &[]);
        let context = NameContext::column(&series, "value");

        let manual = SeriesOptions::default().with_time_offset("1d", false);
        assert_eq!(SeriesNamer::new(&manual).name(&context), "cpu-1d");

        let overlay = SeriesOptions::default().with_time_offset("1d", true);
        assert_eq!(SeriesNamer::new(&overlay).name(&context), "cpu-1d-offset");

        let aliased = SeriesOptions::default()
            .with_alias("$m now")
            .with_time_offset("1d", true);
        assert_eq!(SeriesNamer::new(&aliased).name(&context), "cpu now");
    }
}
