pub mod account_resolver;
pub mod config;
pub mod content_filter;
pub mod error;
pub mod feed_provider;
pub mod profiling_client;
pub mod rate_limit_gate;
pub mod timeline_walker;
pub mod twitter_feed;
pub mod types;

#[cfg(test)]
mod tests;

pub use account_resolver::AccountResolver;
pub use config::ProfilerConfig;
pub use error::{format_reset_time, FetchError, ProfilingError};
pub use feed_provider::FeedProvider;
pub use profiling_client::{ProfilingClient, DEFAULT_PROFILING_URL};
pub use rate_limit_gate::RateLimitGate;
pub use timeline_walker::{TimelineWalker, DEFAULT_PAGE_SIZE};
pub use twitter_feed::{TwitterFeedProvider, DEFAULT_TWITTER_API_URL};
pub use types::{ContentItem, LanguageSet, Post};
