//! Backward pagination over an account's timeline.
//!
//! One page request is outstanding at a time; each page's boundary depends on
//! the previous page's minimum id, so pages cannot be fetched in parallel.

use crate::content_filter;
use crate::error::FetchError;
use crate::feed_provider::FeedProvider;
use crate::rate_limit_gate::RateLimitGate;
use crate::types::{LanguageSet, Post};
use std::sync::Arc;
use tracing::{debug, info};

pub const DEFAULT_PAGE_SIZE: usize = 200;

/// Walks an account's feed backward, newest first, collecting qualifying
/// posts until the target count is reached or the feed runs out.
pub struct TimelineWalker {
    provider: Arc<dyn FeedProvider>,
    gate: Arc<RateLimitGate>,
    page_size: usize,
}

impl TimelineWalker {
    pub fn new(provider: Arc<dyn FeedProvider>, gate: Arc<RateLimitGate>) -> Self {
        Self {
            provider,
            gate,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Collect up to `target_count` accepted posts, in feed order.
    ///
    /// The loop has exactly three exits: an empty page (feed exhausted,
    /// success with possibly fewer posts than requested), the target count
    /// reached, or an error from the gate or the provider. A rate limit is
    /// fatal to the walk; it is not retried here.
    pub async fn fetch(
        &self,
        account_id: u64,
        languages: &LanguageSet,
        target_count: usize,
    ) -> Result<Vec<Post>, FetchError> {
        let mut accepted: Vec<Post> = Vec::new();
        if target_count == 0 {
            return Ok(accepted);
        }

        let mut max_id: Option<u64> = None;
        let mut page_number = 0u64;

        loop {
            page_number += 1;
            self.gate.check_or_fail()?;

            let page = self
                .provider
                .timeline_page(account_id, max_id, self.page_size)
                .await?;

            if page.is_empty() {
                info!(
                    "feed exhausted after {} pages, collected {} of {} posts",
                    page_number - 1,
                    accepted.len(),
                    target_count
                );
                return Ok(accepted);
            }

            info!(
                "📄 fetched page #{} ({} posts, max_id={})",
                page_number,
                page.len(),
                max_id.map(|id| id.to_string()).unwrap_or_else(|| "none".into())
            );

            // Track the smallest id on the page so the next request starts
            // strictly before the oldest post seen, even when ids are not
            // contiguous. A page of all-rejected posts still advances this.
            let mut min_id_seen = u64::MAX;

            for post in page {
                min_id_seen = min_id_seen.min(post.id);

                if !content_filter::accept(&post, languages) {
                    debug!(
                        post_id = post.id,
                        lang = %post.lang,
                        is_retweet = post.is_retweet,
                        "rejected post"
                    );
                    continue;
                }

                accepted.push(post);
                if accepted.len() >= target_count {
                    info!(
                        "✅ target of {} posts reached on page #{}",
                        target_count, page_number
                    );
                    return Ok(accepted);
                }
            }

            max_id = Some(min_id_seen.saturating_sub(1));
        }
    }
}
