//! The stream engine: rounds, dedup replay, pacing.

use std::collections::VecDeque;
use std::hash::Hash;
use std::time::Instant;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use castfeed_domain::{BoxStream, Error, Result, TraceEvent};

use crate::builder::FeedStreamBuilder;
use crate::delay::AdaptiveDelay;
use crate::pager::Pager;
use crate::recency::RecencySet;

/// An infinite, deduplicated, adaptively paced sequence of new items
/// drawn from a [`Pager`].
///
/// The engine is a pull-based state machine driven entirely by
/// [`next`](FeedStream::next):
///
/// - `Ok(Some(item))` — the next new item, oldest-unseen-first.
/// - `Ok(None)` — the "caught up" sentinel; only reachable when
///   `pause_after` is configured.
/// - `Err(e)` — a pager failure propagated verbatim, or cancellation.
///   Ends the session.
///
/// Each round asks the pager for one newest-first batch, replays it in
/// reverse so emission stays chronological, drops identifiers already
/// in the [`RecencySet`], and then decides pacing: poll again at once
/// after a productive round, otherwise sleep with jittered exponential
/// back-off or hand the consumer a sentinel.
///
/// # Example
///
/// ```rust,no_run
/// use async_trait::async_trait;
/// use castfeed_stream::{Batch, FeedStreamBuilder, Pager, Result};
///
/// struct HeadPager;
///
/// #[async_trait]
/// impl Pager for HeadPager {
///     type Item = String;
///
///     async fn fetch(&mut self, _cursor: Option<&str>, _limit: u32) -> Result<Batch<String>> {
///         Ok(Batch::from(vec!["newest".to_string(), "older".to_string()]))
///     }
/// }
///
/// # async fn run() -> Result<()> {
/// let mut feed = FeedStreamBuilder::new()
///     .limit(50)
///     .pause_after(0)
///     .build(HeadPager, |item: &String| item.clone())?;
///
/// while let Some(item) = feed.next().await? {
///     println!("{item}");
/// }
/// # Ok(())
/// # }
/// ```
pub struct FeedStream<P: Pager, K, F> {
    pager: P,
    key_of: F,

    // ── Configuration ────────────────────────────────────────────────
    limit: u32,
    pause_after: Option<i64>,
    shrink_head_window: bool,
    cancel: CancellationToken,

    // ── Session state ────────────────────────────────────────────────
    cursor: Option<String>,
    skip_existing: bool,
    seen: RecencySet<K>,
    delay: AdaptiveDelay,
    without_cursor_rounds: u32,
    rounds_without_new: i64,
    last_key: Option<K>,
    pending: VecDeque<P::Item>,
    sentinel_due: bool,
}

impl<P, K, F> FeedStream<P, K, F>
where
    P: Pager,
    K: Hash + Eq + Clone,
    F: Fn(&P::Item) -> K,
{
    pub(crate) fn new(builder: FeedStreamBuilder, pager: P, key_of: F) -> Self {
        Self {
            pager,
            key_of,
            limit: builder.limit,
            pause_after: builder.pause_after,
            shrink_head_window: builder.shrink_head_window,
            cancel: builder.cancel,
            cursor: builder.cursor,
            skip_existing: builder.skip_existing,
            seen: RecencySet::new(builder.recency_capacity),
            delay: AdaptiveDelay::new(builder.max_delay),
            without_cursor_rounds: 0,
            rounds_without_new: 0,
            last_key: None,
            pending: VecDeque::new(),
            sentinel_due: false,
        }
    }

    /// The key of the newest item the engine has registered so far.
    /// Observability only; the pager contract does not consume it.
    pub fn last_key(&self) -> Option<&K> {
        self.last_key.as_ref()
    }

    /// Pull the next new item, running as many rounds as it takes.
    ///
    /// Without `pause_after` this blocks (with back-off) until the feed
    /// produces something new; with it, an `Ok(None)` sentinel is
    /// returned once the empty-round budget is spent. The stream has no
    /// terminal state: after a sentinel or between items the consumer
    /// may keep calling indefinitely.
    pub async fn next(&mut self) -> Result<Option<P::Item>> {
        loop {
            if let Some(item) = self.pending.pop_front() {
                return Ok(Some(item));
            }
            if self.sentinel_due {
                self.sentinel_due = false;
                return Ok(None);
            }
            if self.cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }

            let found = self.run_round().await?;

            // Negative `pause_after`: a sentinel follows every round,
            // productive or not, and the back-off state is untouched.
            if matches!(self.pause_after, Some(bound) if bound < 0) {
                self.sentinel_due = true;
                continue;
            }
            if found {
                self.delay.reset();
                self.rounds_without_new = 0;
                continue;
            }
            self.rounds_without_new += 1;
            match self.pause_after {
                Some(bound) if self.rounds_without_new > bound => {
                    TraceEvent::StreamSentinel {
                        empty_rounds: self.rounds_without_new,
                    }
                    .emit();
                    self.delay.reset();
                    self.rounds_without_new = 0;
                    self.sentinel_due = true;
                }
                // Bounded but under budget: poll again immediately.
                Some(_) => {}
                None => self.pace().await?,
            }
        }
    }

    /// Consume the engine into a boxed async stream with the same
    /// `Ok(Some)` / `Ok(None)` / `Err` contract as
    /// [`next`](FeedStream::next); the stream terminates after yielding
    /// its first error.
    pub fn into_stream(mut self) -> BoxStream<'static, Result<Option<P::Item>>>
    where
        P: Send + 'static,
        P::Item: 'static,
        K: Send + 'static,
        F: Send + 'static,
    {
        Box::pin(async_stream::stream! {
            loop {
                match self.next().await {
                    Ok(item) => yield Ok(item),
                    Err(e) => {
                        yield Err(e);
                        break;
                    }
                }
            }
        })
    }

    /// One pager call plus batch processing. Returns whether anything
    /// new was registered.
    async fn run_round(&mut self) -> Result<bool> {
        let effective = self.effective_limit();
        debug!(limit = effective, cursor = ?self.cursor, "fetching batch");

        let cancel = self.cancel.clone();
        let started = Instant::now();
        let fetched = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(Error::Cancelled),
            batch = self.pager.fetch(self.cursor.as_deref(), effective) => batch?,
        };
        TraceEvent::PagerFetch {
            limit: effective,
            cursor_held: self.cursor.is_some(),
            items: fetched.items.len(),
            duration_ms: started.elapsed().as_millis() as u64,
        }
        .emit();

        let mut found = false;
        let suppress = self.skip_existing;
        // Replay the newest-first page oldest-to-newest so emission
        // stays chronological across rounds.
        for item in fetched.items.into_iter().rev() {
            let key = (self.key_of)(&item);
            if self.seen.contains(&key) {
                continue;
            }
            found = true;
            self.seen.insert(key.clone());
            self.last_key = Some(key);
            if !suppress {
                self.pending.push_back(item);
            }
        }
        // `skip_existing` suppresses the first round only.
        self.skip_existing = false;
        self.cursor = fetched.cursor;
        Ok(found)
    }

    /// The batch size to request this round.
    ///
    /// While no cursor is held the stream keeps re-polling the live
    /// head; cycling the requested size downward avoids re-fetching the
    /// full head window every round once caught up. Inherited from the
    /// reference client; `shrink_head_window(false)` disables it.
    fn effective_limit(&mut self) -> u32 {
        if self.cursor.is_some() || !self.shrink_head_window {
            return self.limit;
        }
        let effective = self.limit.saturating_sub(self.without_cursor_rounds);
        let modulus = (self.limit / 2).max(1);
        self.without_cursor_rounds = (self.without_cursor_rounds + 1) % modulus;
        effective
    }

    /// Sleep out an empty round, honouring cancellation.
    async fn pace(&mut self) -> Result<()> {
        let sleep = self.delay.next();
        debug!(sleep_ms = sleep.as_millis() as u64, "no new items, pacing");
        TraceEvent::StreamSlept {
            sleep_ms: sleep.as_millis() as u64,
            empty_rounds: self.rounds_without_new,
        }
        .emit();

        let cancel = self.cancel.clone();
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(Error::Cancelled),
            _ = tokio::time::sleep(sleep) => Ok(()),
        }
    }
}
