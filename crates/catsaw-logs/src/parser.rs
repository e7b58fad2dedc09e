use tracing::debug;

use catsaw_types::LogRecord;

/// Reassembles a byte stream into complete log records
///
/// Bytes after the last newline are kept until a later chunk terminates the
/// line, so a record is never produced from a truncated line.
#[derive(Debug, Default)]
pub struct LogParser {
    tail: Vec<u8>,
}

impl LogParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume a chunk and return every line it completes
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<LogRecord> {
        let Some(last_newline) = chunk.iter().rposition(|&b| b == b'\n') else {
            self.tail.extend_from_slice(chunk);
            return Vec::new();
        };

        let mut complete = std::mem::take(&mut self.tail);
        complete.extend_from_slice(&chunk[..last_newline]);
        self.tail.extend_from_slice(&chunk[last_newline + 1..]);

        complete.split(|&b| b == b'\n').map(Self::parse_line).collect()
    }

    /// Tokenize one complete line (without its `\n`)
    pub fn parse_line(line: &[u8]) -> LogRecord {
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        LogRecord::new(String::from_utf8_lossy(line).into_owned())
    }

    /// Bytes waiting for a line terminator
    pub fn pending_len(&self) -> usize {
        self.tail.len()
    }

    /// Discard the unterminated remainder at end of stream
    pub fn finish(&mut self) {
        if !self.tail.is_empty() {
            debug!("discarding {} bytes of unterminated log line", self.tail.len());
            self.tail.clear();
        }
    }
}
