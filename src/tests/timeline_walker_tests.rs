use crate::content_filter;
use crate::error::FetchError;
use crate::feed_provider::FeedProvider;
use crate::rate_limit_gate::RateLimitGate;
use crate::timeline_walker::TimelineWalker;
use crate::types::{LanguageSet, Post};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use parking_lot::Mutex;
use std::sync::Arc;

fn make_post(id: u64, lang: &str, is_retweet: bool) -> Post {
    Post {
        id,
        author_id: 42,
        created_at: Utc.timestamp_opt(1_539_202_764, 0).unwrap(),
        text: format!("post {id}"),
        lang: lang.to_string(),
        is_retweet,
        in_reply_to: None,
    }
}

fn english() -> LanguageSet {
    std::iter::once("en".to_string()).collect()
}

/// Serves pages out of a fixed newest-first feed, the way a static provider
/// would, and records every requested upper bound.
struct StaticFeed {
    posts: Vec<Post>,
    requests: Mutex<Vec<Option<u64>>>,
}

impl StaticFeed {
    fn new(posts: Vec<Post>) -> Arc<Self> {
        Arc::new(Self {
            posts,
            requests: Mutex::new(Vec::new()),
        })
    }

    fn requests(&self) -> Vec<Option<u64>> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl FeedProvider for StaticFeed {
    async fn lookup_handle(&self, _handle: &str) -> Result<Option<u64>, FetchError> {
        unreachable!("the walker never resolves handles")
    }

    async fn timeline_page(
        &self,
        _account_id: u64,
        max_id: Option<u64>,
        page_size: usize,
    ) -> Result<Vec<Post>, FetchError> {
        self.requests.lock().push(max_id);
        Ok(self
            .posts
            .iter()
            .filter(|post| max_id.map_or(true, |bound| post.id <= bound))
            .take(page_size)
            .cloned()
            .collect())
    }
}

fn walker(provider: Arc<StaticFeed>, page_size: usize) -> (TimelineWalker, Arc<RateLimitGate>) {
    let gate = Arc::new(RateLimitGate::new());
    (
        TimelineWalker::new(provider, gate.clone()).with_page_size(page_size),
        gate,
    )
}

/// Three 200-post pages: within each page, half are retweets and a quarter
/// of the remainder are English, so 25 posts per page qualify.
fn mixed_feed(pages: u64, page_size: u64) -> Vec<Post> {
    let total = pages * page_size;
    (0..total)
        .map(|i| {
            let id = 1_000_000 - i;
            match i % 8 {
                n if n % 2 == 0 => make_post(id, "en", true),
                1 => make_post(id, "en", false),
                _ => make_post(id, "de", false),
            }
        })
        .collect()
}

#[tokio::test]
async fn every_collected_post_satisfies_the_filter() {
    let provider = StaticFeed::new(mixed_feed(3, 200));
    let (walker, _gate) = walker(provider, 200);
    let languages = english();

    let posts = walker.fetch(42, &languages, 40).await.unwrap();
    assert!(posts
        .iter()
        .all(|post| content_filter::accept(post, &languages)));
}

#[tokio::test]
async fn stops_after_two_pages_when_the_target_is_reached() {
    // 25 qualifying posts per page, target 40: page 1 yields 25, page 2 the
    // remaining 15. Page 3 must never be requested.
    let provider = StaticFeed::new(mixed_feed(3, 200));
    let (walker, _gate) = walker(provider.clone(), 200);

    let posts = walker.fetch(42, &english(), 40).await.unwrap();
    assert_eq!(posts.len(), 40);
    assert_eq!(provider.requests().len(), 2);
}

#[tokio::test]
async fn short_feed_returns_everything_available() {
    // 75 qualifying posts exist; asking for more is not an error.
    let provider = StaticFeed::new(mixed_feed(3, 200));
    let (walker, _gate) = walker(provider.clone(), 200);

    let posts = walker.fetch(42, &english(), 1_000).await.unwrap();
    assert_eq!(posts.len(), 75);
    // Three full pages plus the empty page that ends the walk.
    assert_eq!(provider.requests().len(), 4);
}

#[tokio::test]
async fn empty_feed_yields_an_empty_result() {
    let provider = StaticFeed::new(Vec::new());
    let (walker, _gate) = walker(provider.clone(), 200);

    let posts = walker.fetch(42, &english(), 40).await.unwrap();
    assert!(posts.is_empty());
    assert_eq!(provider.requests(), vec![None]);
}

#[tokio::test]
async fn zero_target_makes_no_requests() {
    let provider = StaticFeed::new(mixed_feed(1, 200));
    let (walker, _gate) = walker(provider.clone(), 200);

    let posts = walker.fetch(42, &english(), 0).await.unwrap();
    assert!(posts.is_empty());
    assert!(provider.requests().is_empty());
}

#[tokio::test]
async fn page_of_only_rejected_posts_still_advances_the_cursor() {
    // First page is all retweets; the qualifying posts sit behind it.
    let mut posts: Vec<Post> = (0..200)
        .map(|i| make_post(1_000 - i, "en", true))
        .collect();
    posts.extend((0..10).map(|i| make_post(700 - i, "en", false)));

    let provider = StaticFeed::new(posts);
    let (walker, _gate) = walker(provider.clone(), 200);

    let collected = walker.fetch(42, &english(), 5).await.unwrap();
    assert_eq!(collected.len(), 5);

    let requests = provider.requests();
    assert_eq!(requests[0], None);
    // Oldest id on page one was 801, so page two starts at 800.
    assert_eq!(requests[1], Some(800));
}

#[tokio::test]
async fn upper_bound_strictly_decreases_across_pages() {
    let provider = StaticFeed::new(mixed_feed(3, 200));
    let (walker, _gate) = walker(provider.clone(), 200);

    walker.fetch(42, &english(), 1_000).await.unwrap();

    let bounds: Vec<u64> = provider.requests().into_iter().flatten().collect();
    assert!(bounds.windows(2).all(|w| w[1] < w[0]));
}

#[tokio::test]
async fn rerunning_against_a_static_feed_is_idempotent() {
    let provider = StaticFeed::new(mixed_feed(3, 200));
    let (walker, _gate) = walker(provider, 200);
    let languages = english();

    let first = walker.fetch(42, &languages, 40).await.unwrap();
    let second = walker.fetch(42, &languages, 40).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn collected_posts_keep_feed_order() {
    let provider = StaticFeed::new(mixed_feed(3, 200));
    let (walker, _gate) = walker(provider, 200);

    let posts = walker.fetch(42, &english(), 40).await.unwrap();
    assert!(posts.windows(2).all(|w| w[1].id < w[0].id));
}

#[tokio::test]
async fn limited_gate_fails_the_walk_before_any_request() {
    let provider = StaticFeed::new(mixed_feed(1, 200));
    let gate = Arc::new(RateLimitGate::new());
    let walker = TimelineWalker::new(provider.clone(), gate.clone()).with_page_size(200);

    gate.notify_limited(Utc::now().timestamp_millis() + 60_000);

    let err = walker.fetch(42, &english(), 40).await.unwrap_err();
    assert!(matches!(err, FetchError::RateLimited { .. }));
    assert!(provider.requests().is_empty());
}

/// Provider that pushes a rate-limit notification while serving its first
/// page, the way the real provider does when the response headers show an
/// exhausted budget.
struct LimitingFeed {
    inner: Arc<StaticFeed>,
    gate: Arc<RateLimitGate>,
}

#[async_trait]
impl FeedProvider for LimitingFeed {
    async fn lookup_handle(&self, handle: &str) -> Result<Option<u64>, FetchError> {
        self.inner.lookup_handle(handle).await
    }

    async fn timeline_page(
        &self,
        account_id: u64,
        max_id: Option<u64>,
        page_size: usize,
    ) -> Result<Vec<Post>, FetchError> {
        let page = self.inner.timeline_page(account_id, max_id, page_size).await;
        self.gate
            .notify_limited(Utc::now().timestamp_millis() + 5_000);
        page
    }
}

#[tokio::test]
async fn notification_during_the_walk_stops_the_next_page() {
    let inner = StaticFeed::new(mixed_feed(3, 200));
    let gate = Arc::new(RateLimitGate::new());
    let provider = Arc::new(LimitingFeed {
        inner: inner.clone(),
        gate: gate.clone(),
    });

    let walker = TimelineWalker::new(provider, gate).with_page_size(200);

    // Target cannot be met on page one, so the walker tries to continue and
    // must hit the gate.
    let err = walker.fetch(42, &english(), 40).await.unwrap_err();
    assert!(matches!(err, FetchError::RateLimited { .. }));
    assert_eq!(inner.requests().len(), 1);
}
