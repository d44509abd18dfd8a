//! The pager contract: the engine's only window onto the backing API.

use async_trait::async_trait;
use castfeed_domain::{Batch, Result};

/// A source of newest-first pages.
///
/// Implementations own every transport concern: HTTP, authentication
/// and token rotation, response decoding, and any retry policy. The
/// engine calls [`fetch`](Pager::fetch) once per round and propagates
/// errors verbatim — a failed fetch ends the stream session.
#[async_trait]
pub trait Pager {
    /// The item type this pager produces. Opaque to the engine except
    /// through the caller-supplied key extractor.
    type Item: Send;

    /// Fetch up to `limit` items older than `cursor`, newest-first.
    ///
    /// `cursor: None` means the live head. The returned batch's own
    /// cursor becomes the engine's working cursor for the next call;
    /// return `None` to make the next round poll the head again.
    async fn fetch(&mut self, cursor: Option<&str>, limit: u32) -> Result<Batch<Self::Item>>;
}
