//! `castfeed-stream` — incremental streaming over cursor-paginated feeds.
//!
//! Social-graph APIs expose "fetch the latest page" endpoints: cursor
//! based, newest-first, no native subscription support. This crate
//! turns such an endpoint into an infinite, deduplicated, adaptively
//! paced sequence of *new* items — a client-side change-feed tailer
//! built on plain polling.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  Your app                                                │
//! │                                                          │
//! │   let mut feed = FeedStreamBuilder::new()                │
//! │       .limit(50)                                         │
//! │       .pause_after(0)                                    │
//! │       .build(pager, |cast| cast.hash.clone())?;          │
//! │                                                          │
//! │   while let Some(cast) = feed.next().await? { ... }      │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! # Round loop (hard-coded by the engine)
//!
//! 1. Ask the [`Pager`] for up to `limit` items before the working cursor
//! 2. Replay the newest-first batch in reverse so emission stays
//!    chronological across rounds
//! 3. Drop identifiers already in the [`RecencySet`]; queue the rest
//! 4. Found something: reset the [`AdaptiveDelay`] and poll again at once
//! 5. Found nothing: sleep with jittered exponential back-off, or hand
//!    the consumer a "caught up" sentinel when `pause_after` is set
//!
//! The engine owns no sockets and spawns no tasks; transport, auth, and
//! item schemas all live behind the [`Pager`] contract. Dropping the
//! stream releases everything.

pub mod builder;
pub mod config;
pub mod delay;
pub mod engine;
pub mod pager;
pub mod recency;

// ── Re-exports for ergonomic imports ─────────────────────────────────

pub use builder::FeedStreamBuilder;
pub use config::StreamConfig;
pub use delay::AdaptiveDelay;
pub use engine::FeedStream;
pub use pager::Pager;
pub use recency::RecencySet;

// Re-export domain types so consumers never need to import
// castfeed-domain directly.
pub use castfeed_domain::{Batch, BoxStream, Error, Result};
