//! Reshare/language filtering and content-item normalization.
//!
//! Pure functions, no state: the walker calls [`accept`] per post, the
//! orchestrator calls [`normalize`] on everything that was collected.

use crate::types::{ContentItem, LanguageSet, Post};

/// Source tag stamped on every content item.
pub const SOURCE_ID: &str = "twitter";

/// All posts are submitted as plain text.
pub const CONTENT_TYPE: &str = "text/plain";

/// A post qualifies when it is original (not a retweet) and written in one
/// of the accepted languages.
pub fn accept(post: &Post, languages: &LanguageSet) -> bool {
    !post.is_retweet && languages.contains(&post.lang)
}

/// Map an accepted post into the profiling service's content-item shape.
pub fn normalize(post: &Post) -> ContentItem {
    ContentItem {
        userid: post.author_id.to_string(),
        id: post.id.to_string(),
        sourceid: SOURCE_ID.to_string(),
        contenttype: CONTENT_TYPE.to_string(),
        language: post.lang.clone(),
        content: sanitize(&post.text),
        created: post.created_at.timestamp_millis(),
        reply: post
            .in_reply_to
            .as_deref()
            .map(|name| !name.is_empty())
            .unwrap_or(false),
        // Retweets are filtered out before normalization, so this is always
        // false in practice. The profiling service schema still carries it.
        forward: post.is_retweet,
    }
}

/// Strip every character outside the printable ASCII range (0x20-0x7E).
pub fn sanitize(text: &str) -> String {
    text.chars()
        .filter(|c| ('\x20'..='\x7e').contains(c))
        .collect()
}
