//! In-memory sink for testing.
//!
//! Records every message it receives so tests can assert on exactly what
//! a state logger emitted.

use std::sync::{Arc, Mutex};

use super::Sink;

/// Thread-safe recorder of emitted messages.
///
/// Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    messages: Arc<Mutex<Vec<String>>>,
}

impl MemorySink {
    /// Create a new empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// A [`Sink`] that appends to this recorder.
    pub fn as_sink(&self) -> Sink {
        let messages = Arc::clone(&self.messages);
        Arc::new(move |msg: &str| {
            messages
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push(msg.to_string());
        })
    }

    /// All recorded messages, oldest first.
    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Number of recorded messages.
    pub fn len(&self) -> usize {
        self.messages.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Check if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forget all recorded messages.
    pub fn clear(&self) {
        self.messages
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }
}
