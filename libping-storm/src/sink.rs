use chrono::{DateTime, Utc};
use std::sync::Mutex;

#[derive(Debug, Clone)]
pub struct LogRecord {
    pub ts: DateTime<Utc>,
    pub message: String,
}

impl LogRecord {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            ts: Utc::now(),
            message: message.into(),
        }
    }

    pub fn line(&self) -> String {
        format!("{} {}", self.ts.format("%Y-%m-%dT%H:%M:%S"), self.message)
    }
}

/// Destination for probe results. Delivery is best effort; implementations
/// must not panic or block the probe loop on failure.
pub trait LogSink: Send + Sync {
    fn append(&self, record: LogRecord);
}

/// In-memory sink, mainly useful for tests and embedding.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<LogRecord>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<LogRecord> {
        self.records.lock().unwrap().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .map(|record| record.message.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl LogSink for MemorySink {
    fn append(&self, record: LogRecord) {
        self.records.lock().unwrap().push(record);
    }
}
