//! Log stream filter engine for catsaw
//!
//! This crate turns raw logcat output into records, runs them through the
//! filter pipeline and gates delivery with the stream controller.

mod controller;
mod error;
mod filter;
mod identity;
mod packages;
mod parser;
mod queue;
mod sink;
mod status;
mod stream;

pub use controller::{ControllerOptions, StreamController};
pub use error::FilterError;
pub use filter::{DropReason, FilterState, Highlight, MalformedPolicy, Verdict, evaluate};
pub use identity::{DEFAULT_RESTART_TAG, IdentityTracker, ProcessIdentity, ResolutionCause};
pub use packages::{PackageMatch, match_packages};
pub use parser::LogParser;
pub use queue::PendingQueue;
pub use sink::RenderSink;
pub use status::StatusAggregator;
pub use stream::{LogcatEvent, LogcatStream};

// Re-export types used in our public API
pub use catsaw_types::{LogRecord, RenderedLine, Severity, StatusSnapshot, StreamState};
