//! Builder pattern for constructing a [`FeedStream`].

use std::hash::Hash;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use castfeed_domain::{Error, Result};

use crate::config::StreamConfig;
use crate::delay::DEFAULT_MAX_DELAY;
use crate::engine::FeedStream;
use crate::pager::Pager;
use crate::recency::DEFAULT_RECENCY_CAPACITY;

/// Fluent builder for [`FeedStream`].
///
/// All knobs are optional; the defaults match the reference client
/// (batch limit 50, 16-second back-off ceiling, dedup capacity 301).
/// Validation happens in [`build`](FeedStreamBuilder::build): the
/// limit and dedup capacity must be positive and the back-off ceiling
/// at least one second, since the back-off base starts there.
#[derive(Debug, Clone)]
pub struct FeedStreamBuilder {
    pub(crate) limit: u32,
    pub(crate) cursor: Option<String>,
    pub(crate) skip_existing: bool,
    pub(crate) pause_after: Option<i64>,
    pub(crate) max_delay: Duration,
    pub(crate) recency_capacity: usize,
    pub(crate) shrink_head_window: bool,
    pub(crate) cancel: CancellationToken,
}

impl FeedStreamBuilder {
    pub fn new() -> Self {
        Self {
            limit: 50,
            cursor: None,
            skip_existing: false,
            pause_after: None,
            max_delay: DEFAULT_MAX_DELAY,
            recency_capacity: DEFAULT_RECENCY_CAPACITY,
            shrink_head_window: true,
            cancel: CancellationToken::new(),
        }
    }

    /// Seed every knob from a [`StreamConfig`].
    pub fn from_config(cfg: &StreamConfig) -> Self {
        Self {
            limit: cfg.limit,
            cursor: cfg.cursor.clone(),
            skip_existing: cfg.skip_existing,
            pause_after: cfg.pause_after,
            max_delay: Duration::from_secs(cfg.max_delay_secs),
            recency_capacity: cfg.recency_capacity,
            shrink_head_window: cfg.shrink_head_window,
            cancel: CancellationToken::new(),
        }
    }

    // ── Fetch shape ──────────────────────────────────────────────────

    /// Batch size requested from the pager each round (default 50).
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    /// Starting cursor. Absent (the default) starts from the live head.
    pub fn cursor(mut self, cursor: impl Into<String>) -> Self {
        self.cursor = Some(cursor.into());
        self
    }

    /// Toggle the head-window shrink heuristic (default on). While no
    /// cursor is held the requested batch size cycles downward so a
    /// caught-up stream stops re-fetching its full head window every
    /// round.
    pub fn shrink_head_window(mut self, enabled: bool) -> Self {
        self.shrink_head_window = enabled;
        self
    }

    // ── Emission policy ──────────────────────────────────────────────

    /// Register the first round's items without emitting them, so the
    /// stream tails from "now" instead of replaying backlog.
    pub fn skip_existing(mut self, skip: bool) -> Self {
        self.skip_existing = skip;
        self
    }

    /// Bound on consecutive empty rounds before the stream yields the
    /// "caught up" sentinel (`Ok(None)`). Negative values yield the
    /// sentinel after every round, giving non-blocking poll-once
    /// semantics. Unset (the default), the stream never yields
    /// sentinels and instead blocks with jittered back-off.
    pub fn pause_after(mut self, rounds: i64) -> Self {
        self.pause_after = Some(rounds);
        self
    }

    // ── Pacing / lifecycle ───────────────────────────────────────────

    /// Ceiling on the back-off base between empty rounds (default 16s).
    pub fn max_delay(mut self, max: Duration) -> Self {
        self.max_delay = max;
        self
    }

    /// Capacity of the dedup cache (default 301). Items churning past
    /// this bound may be re-emitted.
    pub fn recency_capacity(mut self, capacity: usize) -> Self {
        self.recency_capacity = capacity;
        self
    }

    /// Cancellation token observed while blocked (pager call or pacing
    /// sleep); cancelling surfaces as [`Error::Cancelled`].
    pub fn cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Build the [`FeedStream`] over `pager`, with `key_of` extracting
    /// the stable identifier used for deduplication.
    ///
    /// `key_of` must be pure and total over every item the pager can
    /// return; panicking inside it is a caller configuration defect,
    /// not a stream-runtime condition.
    pub fn build<P, K, F>(self, pager: P, key_of: F) -> Result<FeedStream<P, K, F>>
    where
        P: Pager,
        K: Hash + Eq + Clone,
        F: Fn(&P::Item) -> K,
    {
        if self.limit == 0 {
            return Err(Error::Config("limit must be positive".into()));
        }
        if self.max_delay < Duration::from_secs(1) {
            return Err(Error::Config(
                "max_delay must be at least one second".into(),
            ));
        }
        if self.recency_capacity == 0 {
            return Err(Error::Config("recency_capacity must be positive".into()));
        }
        Ok(FeedStream::new(self, pager, key_of))
    }
}

impl Default for FeedStreamBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use castfeed_domain::Batch;

    struct EmptyPager;

    #[async_trait]
    impl Pager for EmptyPager {
        type Item = String;

        async fn fetch(&mut self, _cursor: Option<&str>, _limit: u32) -> Result<Batch<String>> {
            Ok(Batch::empty())
        }
    }

    fn key(item: &String) -> String {
        item.clone()
    }

    #[test]
    fn zero_limit_is_rejected() {
        let err = FeedStreamBuilder::new()
            .limit(0)
            .build(EmptyPager, key)
            .err()
            .unwrap();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn sub_second_max_delay_is_rejected() {
        let err = FeedStreamBuilder::new()
            .max_delay(Duration::from_millis(250))
            .build(EmptyPager, key)
            .err()
            .unwrap();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn zero_recency_capacity_is_rejected() {
        let err = FeedStreamBuilder::new()
            .recency_capacity(0)
            .build(EmptyPager, key)
            .err()
            .unwrap();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn config_seeds_every_knob() {
        let cfg = StreamConfig {
            limit: 25,
            cursor: Some("abc".into()),
            skip_existing: true,
            pause_after: Some(2),
            max_delay_secs: 8,
            recency_capacity: 100,
            shrink_head_window: false,
        };
        let builder = FeedStreamBuilder::from_config(&cfg);
        assert_eq!(builder.limit, 25);
        assert_eq!(builder.cursor.as_deref(), Some("abc"));
        assert!(builder.skip_existing);
        assert_eq!(builder.pause_after, Some(2));
        assert_eq!(builder.max_delay, Duration::from_secs(8));
        assert_eq!(builder.recency_capacity, 100);
        assert!(!builder.shrink_head_window);
    }
}
