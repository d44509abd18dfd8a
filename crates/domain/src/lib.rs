//! `castfeed-domain` — shared types for the castfeed crates.
//!
//! Holds the error type, the batch/cursor model exchanged with pagers,
//! the boxed stream alias, and structured trace events. Deliberately
//! free of transport concerns so every other crate can depend on it.

pub mod batch;
pub mod error;
pub mod stream;
pub mod trace;

pub use batch::Batch;
pub use error::{Error, Result};
pub use stream::BoxStream;
pub use trace::TraceEvent;
