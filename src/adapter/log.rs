use std::cell::RefCell;

use tracing::{Level, event};

use crate::{domain::constant::log, port::log::LogSink};

/// Forwards actor diagnostics to `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogSink;

impl LogSink for TracingLogSink {
    fn log(&self, prefix: &str, message: &str) {
        event!(Level::INFO, event = log::ACTOR_MESSAGE, prefix = %prefix, message = %message);
    }
}

/// Keeps every `(prefix, message)` pair in memory
#[derive(Debug, Default)]
pub struct MemoryLogSink {
    entries: RefCell<Vec<(String, String)>>
}

impl MemoryLogSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<(String, String)> {
        self.entries.borrow().clone()
    }

    /// Messages without their prefixes
    pub fn messages(&self) -> Vec<String> {
        self.entries.borrow().iter().map(|(_, message)| message.clone()).collect()
    }

    /// Whether any message contains the fragment
    pub fn contains(&self, fragment: &str) -> bool {
        self.entries.borrow().iter().any(|(_, message)| message.contains(fragment))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }
}

impl LogSink for MemoryLogSink {
    fn log(&self, prefix: &str, message: &str) {
        self.entries.borrow_mut().push((prefix.to_string(), message.to_string()));
    }
}
