//! Shared types for catsaw
//!
//! This crate contains data structures used across multiple catsaw crates.

use chrono::NaiveDateTime;
use ratatui::style::Color;

// ============================================================================
// Device Types
// ============================================================================

/// Connection state reported by `adb devices`
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeviceState {
    Device,
    Offline,
    Unauthorized,
    Other(String),
}

impl From<&str> for DeviceState {
    fn from(s: &str) -> Self {
        match s {
            "device" => Self::Device,
            "offline" => Self::Offline,
            "unauthorized" => Self::Unauthorized,
            other => Self::Other(other.to_string()),
        }
    }
}

impl DeviceState {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Device => "device",
            Self::Offline => "offline",
            Self::Unauthorized => "unauthorized",
            Self::Other(s) => s,
        }
    }
}

/// An attached device
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeviceInfo {
    pub serial: String,
    pub state: DeviceState,
}

impl DeviceInfo {
    pub fn new(serial: String, state: DeviceState) -> Self {
        Self { serial, state }
    }

    /// Whether logcat can be read from this device
    pub fn is_ready(&self) -> bool {
        self.state == DeviceState::Device
    }
}

/// Blocking queries against the device the log stream comes from.
///
/// Every method reports unavailability as `None` (or an empty list) rather
/// than an error; callers decide whether that is fatal.
pub trait DeviceBridge {
    /// Resolve the pid of a running process by name
    fn lookup_pid(&self, process_name: &str) -> Option<String>;

    /// Current wall-clock time on the device, in the device's own timezone
    fn current_device_time(&self) -> Option<NaiveDateTime>;

    /// Current year on the device
    fn current_device_year(&self) -> Option<i32>;

    /// Installed packages as `package:<name>` lines
    fn list_packages(&self) -> Vec<String>;
}

// ============================================================================
// Log Types
// ============================================================================

/// Logcat severity, ordered from least to most severe
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Verbose,
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
}

impl Severity {
    /// All severities in ascending order
    pub const ALL: [Severity; 6] = [
        Self::Verbose,
        Self::Debug,
        Self::Info,
        Self::Warn,
        Self::Error,
        Self::Fatal,
    ];

    /// Parse the single-character level used by threadtime output
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'V' => Some(Self::Verbose),
            'D' => Some(Self::Debug),
            'I' => Some(Self::Info),
            'W' => Some(Self::Warn),
            'E' => Some(Self::Error),
            'F' => Some(Self::Fatal),
            _ => None,
        }
    }

    /// Parse a level token, which must be exactly one known character
    pub fn from_token(token: &str) -> Option<Self> {
        let mut chars = token.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::from_char(c),
            _ => None,
        }
    }

    pub fn ordinal(&self) -> u8 {
        *self as u8
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Verbose => "Verbose",
            Self::Debug => "Debug",
            Self::Info => "Info",
            Self::Warn => "Warn",
            Self::Error => "Error",
            Self::Fatal => "Fatal",
        }
    }

    /// Get display color for this level
    pub fn color(&self) -> Color {
        match self {
            Self::Verbose => Color::White,
            Self::Debug => Color::Blue,
            Self::Info => Color::Green,
            Self::Warn => Color::Yellow,
            Self::Error => Color::Red,
            Self::Fatal => Color::LightRed,
        }
    }
}

/// Field positions of the threadtime layout
pub mod field {
    pub const DATE: usize = 0;
    pub const TIME: usize = 1;
    pub const PID: usize = 2;
    pub const TID: usize = 3;
    pub const LEVEL: usize = 4;
    pub const TAG: usize = 5;

    /// Number of tokens a line needs before the message starts
    pub const HEADER_LEN: usize = 6;
}

/// One line of the log stream
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogRecord {
    /// Original line, without the line terminator
    pub raw: String,

    /// Whitespace-separated tokens of `raw`
    pub fields: Vec<String>,
}

impl LogRecord {
    /// Tokenize a complete line
    pub fn new(raw: String) -> Self {
        let fields = raw.split_whitespace().map(str::to_string).collect();
        Self { raw, fields }
    }

    pub fn field(&self, index: usize) -> Option<&str> {
        self.fields.get(index).map(String::as_str)
    }

    pub fn date(&self) -> Option<&str> {
        self.field(field::DATE)
    }

    pub fn time(&self) -> Option<&str> {
        self.field(field::TIME)
    }

    pub fn pid(&self) -> Option<&str> {
        self.field(field::PID)
    }

    pub fn tid(&self) -> Option<&str> {
        self.field(field::TID)
    }

    pub fn level_char(&self) -> Option<&str> {
        self.field(field::LEVEL)
    }

    /// Tag token as printed, usually with a trailing colon
    pub fn tag(&self) -> Option<&str> {
        self.field(field::TAG)
    }

    /// Severity of the record, if its level token is a known one
    pub fn severity(&self) -> Option<Severity> {
        self.level_char().and_then(Severity::from_token)
    }

    /// Whether every header field is present
    pub fn has_header(&self) -> bool {
        self.fields.len() >= field::HEADER_LEN
    }
}

/// A run of text inside a rendered line
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub highlighted: bool,
}

impl Segment {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            highlighted: false,
        }
    }

    pub fn highlighted(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            highlighted: true,
        }
    }
}

/// A record the filter pipeline decided to show
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedLine {
    /// Severity used to pick the line color (`None` = default color)
    pub severity: Option<Severity>,
    pub segments: Vec<Segment>,
}

impl RenderedLine {
    pub fn plain(severity: Option<Severity>, text: impl Into<String>) -> Self {
        Self {
            severity,
            segments: vec![Segment::plain(text)],
        }
    }

    /// Concatenated text of all segments
    pub fn text(&self) -> String {
        self.segments.iter().map(|s| s.text.as_str()).collect()
    }

    pub fn has_highlight(&self) -> bool {
        self.segments.iter().any(|s| s.highlighted)
    }
}

// ============================================================================
// Engine State Types
// ============================================================================

/// Whether the stream controller is consuming records
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum StreamState {
    /// Records are filtered and rendered as they arrive
    #[default]
    Active,
    /// A prompt is open; records are queued
    Interacting,
    /// Output is held; records are queued
    Paused,
}

impl StreamState {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Active => "LIVE",
            Self::Interacting => "INPUT",
            Self::Paused => "PAUSED",
        }
    }

    pub fn is_consuming(&self) -> bool {
        matches!(self, Self::Active)
    }
}

/// Status line contents, recomputed after each processed batch
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StatusSnapshot {
    pub state: StreamState,
    /// Records dropped since the last visible activity
    pub suppressed: u64,
    /// Records dropped over the whole session
    pub suppressed_total: u64,
    /// Records waiting in the pending queue
    pub buffered: usize,
    pub identity_label: Option<String>,
    pub highlight_label: Option<String>,
    pub level_label: Option<String>,
    pub freeze_on_match: bool,
}
