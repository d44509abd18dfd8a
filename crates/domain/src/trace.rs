use serde::Serialize;

/// Structured trace events emitted across the castfeed crates.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event")]
pub enum TraceEvent {
    /// One pager call completed.
    PagerFetch {
        limit: u32,
        cursor_held: bool,
        items: usize,
        duration_ms: u64,
    },
    /// The engine paced an empty round with a back-off sleep.
    StreamSlept {
        sleep_ms: u64,
        empty_rounds: i64,
    },
    /// The engine handed the consumer a "caught up" sentinel.
    StreamSentinel {
        empty_rounds: i64,
    },
}

impl TraceEvent {
    pub fn emit(&self) {
        let json = serde_json::to_string(self).unwrap_or_default();
        tracing::info!(trace_event = %json, "castfeed_event");
    }
}
