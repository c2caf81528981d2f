//! Domain types shared by the fetch pipeline and the profiling client.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;

/// Accepted language tags. Membership is an exact string match, no
/// normalization or wildcards.
pub type LanguageSet = HashSet<String>;

/// One fetched timeline post, as produced by the feed provider. Never
/// mutated after creation; ids decrease as the timeline is walked backward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub id: u64,
    pub author_id: u64,
    pub created_at: DateTime<Utc>,
    pub text: String,
    pub lang: String,
    pub is_retweet: bool,
    /// Screen name this post replies to. A non-empty value means the post
    /// is a reply.
    pub in_reply_to: Option<String>,
}

/// Normalized representation of one accepted post, serialized with the
/// field names the profiling service expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentItem {
    pub userid: String,
    pub id: String,
    pub sourceid: String,
    pub contenttype: String,
    pub language: String,
    pub content: String,
    /// Creation time in epoch milliseconds.
    pub created: i64,
    pub reply: bool,
    pub forward: bool,
}
