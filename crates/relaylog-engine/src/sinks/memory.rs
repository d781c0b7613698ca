use crate::record::LogRecord;
use crate::sink::Sink;
use std::collections::VecDeque;
use std::io;
use std::sync::Mutex;

/// Keeps the most recent records in memory.
///
/// Used by tests and by hosts that surface recent log lines in-process.
#[derive(Debug)]
pub struct MemorySink {
    records: Mutex<VecDeque<LogRecord>>,
    capacity: usize,
}

impl MemorySink {
    pub const DEFAULT_CAPACITY: usize = 1024;

    /// A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        Self {
            records: Mutex::new(VecDeque::new()),
            capacity: capacity.max(1),
        }
    }

    pub fn records(&self) -> Vec<LogRecord> {
        self.records
            .lock()
            .map(|r| r.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Messages only, oldest first.
    pub fn messages(&self) -> Vec<String> {
        self.records().into_iter().map(|r| r.message).collect()
    }

    pub fn len(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.records.lock().map(|mut r| r.clear()).ok();
    }
}

impl Default for MemorySink {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

impl Sink for MemorySink {
    fn write(&self, record: &LogRecord) -> io::Result<()> {
        let mut records = self
            .records
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "memory sink lock poisoned"))?;
        if records.len() == self.capacity {
            records.pop_front();
        }
        records.push_back(record.clone());
        Ok(())
    }

    fn kind(&self) -> &'static str {
        "memory"
    }
}
