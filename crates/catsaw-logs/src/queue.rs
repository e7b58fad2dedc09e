use std::collections::VecDeque;

use catsaw_types::LogRecord;

/// FIFO of records held while the controller is not consuming
///
/// Records leave in the order they arrived; nothing is ever reordered or
/// evicted.
#[derive(Debug, Default)]
pub struct PendingQueue {
    entries: VecDeque<LogRecord>,
}

impl PendingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append records at the back
    pub fn extend<I>(&mut self, records: I)
    where
        I: IntoIterator<Item = LogRecord>,
    {
        self.entries.extend(records);
    }

    /// Put records that were taken out but not consumed back at the front
    pub fn restore_front(&mut self, records: Vec<LogRecord>) {
        for record in records.into_iter().rev() {
            self.entries.push_front(record);
        }
    }

    /// Take every record, oldest first
    pub fn drain(&mut self) -> Vec<LogRecord> {
        self.entries.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
