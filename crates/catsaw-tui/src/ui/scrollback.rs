use std::collections::VecDeque;

use catsaw_logs::RenderSink;
use catsaw_types::{RenderedLine, StatusSnapshot};

/// Prefix shown before lines from the log source's error stream
pub const DIAGNOSTIC_MARKER: &str = "adb: ";

/// One row of the scrollback
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScrollbackLine {
    Record(RenderedLine),
    Diagnostic(String),
    Notice(String),
    /// Visual break inserted by the user
    Separator,
}

/// Ring buffer of everything shown in the log area
///
/// Oldest lines are evicted once `capacity` is reached. The last status
/// snapshot is kept alongside and hidden while records are being written.
pub struct Scrollback {
    lines: VecDeque<ScrollbackLine>,
    capacity: usize,

    /// Lines evicted since the last call to `take_evicted`
    evicted: usize,

    status: Option<StatusSnapshot>,
}

impl Scrollback {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            lines: VecDeque::with_capacity(capacity.min(4096)),
            capacity,
            evicted: 0,
            status: None,
        }
    }

    pub fn push(&mut self, line: ScrollbackLine) {
        if self.lines.len() >= self.capacity {
            self.lines.pop_front();
            self.evicted += 1;
        }
        self.lines.push_back(line);
    }

    pub fn separator(&mut self) {
        self.push(ScrollbackLine::Separator);
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Lines in the window `[start, start + count)`
    pub fn window(&self, start: usize, count: usize) -> impl Iterator<Item = &ScrollbackLine> {
        self.lines.iter().skip(start).take(count)
    }

    /// Number of lines evicted since the previous call
    pub fn take_evicted(&mut self) -> usize {
        std::mem::take(&mut self.evicted)
    }

    /// Latest status, `None` while it is hidden
    pub fn last_status(&self) -> Option<&StatusSnapshot> {
        self.status.as_ref()
    }
}

impl RenderSink for Scrollback {
    fn render(&mut self, line: RenderedLine) {
        self.push(ScrollbackLine::Record(line));
    }

    fn diagnostic(&mut self, text: &str) {
        self.push(ScrollbackLine::Diagnostic(text.to_string()));
    }

    fn notice(&mut self, text: &str) {
        self.push(ScrollbackLine::Notice(text.to_string()));
    }

    fn status(&mut self, snapshot: &StatusSnapshot) {
        self.status = Some(snapshot.clone());
    }

    fn clear_line(&mut self) {
        self.status = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catsaw_types::StreamState;

    #[test]
    fn test_evicts_oldest() {
        let mut scrollback = Scrollback::new(2);
        scrollback.notice("one");
        scrollback.notice("two");
        scrollback.notice("three");

        assert_eq!(scrollback.len(), 2);
        let lines: Vec<_> = scrollback.window(0, 10).cloned().collect();
        assert_eq!(
            lines,
            [
                ScrollbackLine::Notice("two".into()),
                ScrollbackLine::Notice("three".into())
            ]
        );
        assert_eq!(scrollback.take_evicted(), 1);
        assert_eq!(scrollback.take_evicted(), 0);
    }

    #[test]
    fn test_clear_line_is_idempotent() {
        let mut scrollback = Scrollback::new(10);
        let snapshot = StatusSnapshot {
            state: StreamState::Paused,
            ..Default::default()
        };
        scrollback.status(&snapshot);
        assert_eq!(scrollback.last_status().unwrap().state, StreamState::Paused);

        scrollback.clear_line();
        scrollback.clear_line();
        assert!(scrollback.last_status().is_none());
        assert!(scrollback.is_empty());
    }

    #[test]
    fn test_sink_calls_land_in_order() {
        let mut scrollback = Scrollback::new(10);
        scrollback.render(RenderedLine::plain(None, "record"));
        scrollback.diagnostic("waiting for device");
        scrollback.separator();

        let lines: Vec<_> = scrollback.window(1, 5).cloned().collect();
        assert_eq!(
            lines,
            [
                ScrollbackLine::Diagnostic("waiting for device".into()),
                ScrollbackLine::Separator
            ]
        );
    }

    #[test]
    fn test_zero_capacity_keeps_one_line() {
        let mut scrollback = Scrollback::new(0);
        scrollback.notice("a");
        scrollback.notice("b");
        assert_eq!(scrollback.capacity(), 1);
        assert_eq!(scrollback.len(), 1);
    }
}
