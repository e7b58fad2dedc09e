use regex::Regex;
use serde::Deserialize;

use crate::error::FilterError;
use crate::identity::ProcessIdentity;
use catsaw_types::{LogRecord, RenderedLine, Segment, Severity};

/// How records without a full threadtime header are treated
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MalformedPolicy {
    /// Treat them like any other record; they carry no severity and no pid
    #[default]
    Render,
    /// Drop them before any other stage
    Suppress,
}

/// Compiled highlight pattern
#[derive(Clone)]
pub struct Highlight {
    regex: Regex,

    /// Text as the user entered it
    pattern: String,
}

impl Highlight {
    /// Compile a case-insensitive highlight pattern
    pub fn new(pattern: &str) -> Result<Self, FilterError> {
        let regex = Regex::new(&format!("(?i){}", pattern)).map_err(|source| {
            FilterError::InvalidHighlight {
                pattern: pattern.to_string(),
                source,
            }
        })?;

        Ok(Self {
            regex,
            pattern: pattern.to_string(),
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Find all non-empty match positions in a string
    pub fn find_matches(&self, text: &str) -> Vec<(usize, usize)> {
        self.regex
            .find_iter(text)
            .filter(|m| !m.is_empty())
            .map(|m| (m.start(), m.end()))
            .collect()
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    /// Split `text` into plain and highlighted segments, `None` when nothing matches
    ///
    /// A match of zero width keeps the line but marks nothing.
    pub fn annotate(&self, text: &str) -> Option<Vec<Segment>> {
        if !self.is_match(text) {
            return None;
        }
        let matches = self.find_matches(text);

        let mut segments = Vec::with_capacity(matches.len() * 2 + 1);
        let mut cursor = 0;
        for (start, end) in matches {
            if start > cursor {
                segments.push(Segment::plain(&text[cursor..start]));
            }
            segments.push(Segment::highlighted(&text[start..end]));
            cursor = end;
        }
        if cursor < text.len() {
            segments.push(Segment::plain(&text[cursor..]));
        }

        Some(segments)
    }
}

impl std::fmt::Debug for Highlight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Highlight")
            .field("pattern", &self.pattern)
            .finish()
    }
}

/// User-controlled filter settings, changed only by explicit commands
#[derive(Debug, Default)]
pub struct FilterState {
    /// Drop records below this severity
    pub min_level: Option<Severity>,

    /// Keep only records from this process
    pub identity: Option<ProcessIdentity>,

    /// Keep only records matching this pattern, with the matches marked
    pub highlight: Option<Highlight>,

    /// Pause right after rendering a highlight match
    pub freeze_on_match: bool,

    pub malformed: MalformedPolicy,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn level_label(&self) -> Option<String> {
        self.min_level.map(|level| format!("≥{}", level.label()))
    }

    pub fn highlight_label(&self) -> Option<String> {
        self.highlight.as_ref().map(|h| format!("/{}/", h.pattern()))
    }

    pub fn identity_label(&self) -> Option<String> {
        self.identity.as_ref().map(ProcessIdentity::label)
    }

    /// Whether any stage can drop a record
    pub fn is_empty(&self) -> bool {
        self.min_level.is_none()
            && self.identity.is_none()
            && self.highlight.is_none()
            && self.malformed == MalformedPolicy::Render
    }
}

/// Why the pipeline dropped a record
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DropReason {
    Malformed,
    BelowLevel,
    OtherProcess,
    NoHighlightMatch,
}

/// Outcome of running a record through the pipeline
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Verdict {
    Keep {
        line: RenderedLine,
        /// The highlight pattern matched (drives freeze-on-match)
        highlight_hit: bool,
    },
    Drop(DropReason),
}

impl Verdict {
    pub fn is_keep(&self) -> bool {
        matches!(self, Self::Keep { .. })
    }
}

/// Decide whether a record is shown, and how
///
/// Stages run in a fixed order and stop at the first drop: malformed
/// header, severity, process identity, highlight. The record itself is
/// never modified.
pub fn evaluate(record: &LogRecord, filter: &FilterState) -> Verdict {
    if filter.malformed == MalformedPolicy::Suppress && !record.has_header() {
        return Verdict::Drop(DropReason::Malformed);
    }

    // Unknown levels have no place in the ordering and always pass
    let severity = record.severity();
    if let (Some(min), Some(level)) = (filter.min_level, severity) {
        if level < min {
            return Verdict::Drop(DropReason::BelowLevel);
        }
    }

    if let Some(identity) = &filter.identity {
        if !identity.owns(record) {
            return Verdict::Drop(DropReason::OtherProcess);
        }
    }

    match &filter.highlight {
        Some(highlight) => match highlight.annotate(&record.raw) {
            Some(segments) => Verdict::Keep {
                line: RenderedLine { severity, segments },
                highlight_hit: true,
            },
            None => Verdict::Drop(DropReason::NoHighlightMatch),
        },
        None => Verdict::Keep {
            line: RenderedLine::plain(severity, record.raw.clone()),
            highlight_hit: false,
        },
    }
}
