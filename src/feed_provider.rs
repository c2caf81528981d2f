//! Abstract feed capability consumed by the resolver and the walker.

use crate::error::FetchError;
use crate::types::Post;
use async_trait::async_trait;

/// The slice of the feed service the fetch pipeline depends on. The concrete
/// provider additionally pushes rate-limit notifications into the
/// [`RateLimitGate`](crate::rate_limit_gate::RateLimitGate) it was built with.
#[async_trait]
pub trait FeedProvider: Send + Sync {
    /// Resolve a handle (without the leading `@`) to its numeric account id.
    /// Returns `Ok(None)` when the provider reports no such account.
    async fn lookup_handle(&self, handle: &str) -> Result<Option<u64>, FetchError>;

    /// Fetch one timeline page for `account_id`, newest first, restricted to
    /// ids at or below `max_id` when one is given.
    async fn timeline_page(
        &self,
        account_id: u64,
        max_id: Option<u64>,
        page_size: usize,
    ) -> Result<Vec<Post>, FetchError>;
}
