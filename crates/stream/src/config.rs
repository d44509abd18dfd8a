//! Declarative stream configuration, loadable from application config.
//!
//! [`StreamConfig`] mirrors the [`FeedStreamBuilder`] knobs as a plain
//! serde struct so callers can keep stream tuning in their own config
//! files. The builder remains the construction surface:
//! [`FeedStreamBuilder::from_config`].

use serde::{Deserialize, Serialize};

use crate::builder::FeedStreamBuilder;
use crate::recency::DEFAULT_RECENCY_CAPACITY;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamConfig {
    /// Batch size requested from the pager each round.
    #[serde(default = "d_limit")]
    pub limit: u32,
    /// Starting cursor; absent means start from the live head.
    #[serde(default)]
    pub cursor: Option<String>,
    /// Register the first round's items without emitting them, so the
    /// stream tails from "now" instead of replaying backlog.
    #[serde(default)]
    pub skip_existing: bool,
    /// Consecutive empty rounds tolerated before the stream yields a
    /// "caught up" sentinel. Negative: sentinel after every round.
    /// Absent: block with back-off instead of yielding sentinels.
    #[serde(default)]
    pub pause_after: Option<i64>,
    /// Ceiling on the back-off base, in seconds.
    #[serde(default = "d_max_delay_secs")]
    pub max_delay_secs: u64,
    /// Capacity of the dedup cache.
    #[serde(default = "d_recency_capacity")]
    pub recency_capacity: usize,
    /// Shrink the requested head window while no cursor is held.
    #[serde(default = "d_true")]
    pub shrink_head_window: bool,
}

fn d_limit() -> u32 {
    50
}
fn d_max_delay_secs() -> u64 {
    16
}
fn d_recency_capacity() -> usize {
    DEFAULT_RECENCY_CAPACITY
}
fn d_true() -> bool {
    true
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            limit: d_limit(),
            cursor: None,
            skip_existing: false,
            pause_after: None,
            max_delay_secs: d_max_delay_secs(),
            recency_capacity: d_recency_capacity(),
            shrink_head_window: d_true(),
        }
    }
}

impl From<&StreamConfig> for FeedStreamBuilder {
    fn from(cfg: &StreamConfig) -> Self {
        FeedStreamBuilder::from_config(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_reference_client() {
        let cfg = StreamConfig::default();
        assert_eq!(cfg.limit, 50);
        assert_eq!(cfg.max_delay_secs, 16);
        assert_eq!(cfg.recency_capacity, 301);
        assert!(cfg.pause_after.is_none());
        assert!(!cfg.skip_existing);
        assert!(cfg.shrink_head_window);
    }

    #[test]
    fn partial_json_fills_in_defaults() {
        let cfg: StreamConfig =
            serde_json::from_str(r#"{"limit": 10, "pause_after": -1}"#).unwrap();
        assert_eq!(cfg.limit, 10);
        assert_eq!(cfg.pause_after, Some(-1));
        assert_eq!(cfg.recency_capacity, 301);
        assert!(cfg.shrink_head_window);
    }
}
