//! Twitter v1.1 feed provider.
//!
//! Application (bearer token) auth only; OAuth user-context signing is out of
//! scope. Rate-limit state is pushed into the shared gate from the response
//! headers of every call, so a limit observed here blocks the next request
//! even if it is issued from a different component.

use crate::error::FetchError;
use crate::feed_provider::FeedProvider;
use crate::rate_limit_gate::RateLimitGate;
use crate::types::Post;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_TWITTER_API_URL: &str = "https://api.twitter.com/1.1";

/// Timeline created_at format, e.g. "Wed Oct 10 20:19:24 +0000 2018".
const CREATED_AT_FORMAT: &str = "%a %b %d %H:%M:%S %z %Y";

/// Fallback block window when a 429 arrives without a reset header. v1.1
/// rate-limit windows are 15 minutes.
const DEFAULT_RESET_WINDOW_SECS: i64 = 15 * 60;

const RATE_LIMIT_REMAINING_HEADER: &str = "x-rate-limit-remaining";
const RATE_LIMIT_RESET_HEADER: &str = "x-rate-limit-reset";

#[derive(Debug, Deserialize)]
struct WireUser {
    id: u64,
}

#[derive(Debug, Deserialize)]
struct WireStatus {
    id: u64,
    created_at: String,
    user: WireUser,
    /// Set when `tweet_mode=extended` is requested.
    full_text: Option<String>,
    text: Option<String>,
    lang: Option<String>,
    retweeted_status: Option<serde_json::Value>,
    in_reply_to_screen_name: Option<String>,
}

impl WireStatus {
    fn into_post(self) -> Result<Post, FetchError> {
        let created_at = DateTime::parse_from_str(&self.created_at, CREATED_AT_FORMAT)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| {
                FetchError::Malformed(format!("bad created_at '{}': {e}", self.created_at))
            })?;

        Ok(Post {
            id: self.id,
            author_id: self.user.id,
            created_at,
            text: self.full_text.or(self.text).unwrap_or_default(),
            // "und" is the tag Twitter itself uses for undetected languages.
            lang: self.lang.unwrap_or_else(|| "und".to_string()),
            is_retweet: self.retweeted_status.is_some(),
            in_reply_to: self.in_reply_to_screen_name,
        })
    }
}

pub struct TwitterFeedProvider {
    client: Client,
    base_url: String,
    bearer_token: String,
    gate: Arc<RateLimitGate>,
}

impl TwitterFeedProvider {
    pub fn new(
        base_url: &str,
        bearer_token: &str,
        gate: Arc<RateLimitGate>,
    ) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(concat!("persona-profiler/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            bearer_token: bearer_token.to_string(),
            gate,
        })
    }

    /// Push rate-limit header state into the gate. Twitter reports the
    /// remaining budget on every response, so exhaustion is visible before
    /// the first 429.
    fn observe_rate_limit(&self, response: &Response) -> i64 {
        let remaining = header_u64(response, RATE_LIMIT_REMAINING_HEADER);
        let reset_at_millis = header_u64(response, RATE_LIMIT_RESET_HEADER)
            .map(|secs| secs as i64 * 1000)
            .unwrap_or_else(|| {
                Utc::now().timestamp_millis() + DEFAULT_RESET_WINDOW_SECS * 1000
            });

        let exhausted =
            response.status() == StatusCode::TOO_MANY_REQUESTS || remaining == Some(0);
        if exhausted {
            let until_secs =
                (reset_at_millis - Utc::now().timestamp_millis()).max(0) / 1000;
            warn!(
                "twitter rate limit reached, stopping all requests for {} seconds",
                until_secs
            );
            self.gate.notify_limited(reset_at_millis);
        }

        reset_at_millis
    }

    async fn get(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Response, FetchError> {
        let url = format!("{}/{path}", self.base_url);
        debug!(%url, "requesting");

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.bearer_token)
            .query(query)
            .send()
            .await?;

        let reset_at_millis = self.observe_rate_limit(&response);
        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            return Err(FetchError::RateLimited { reset_at_millis });
        }

        Ok(response)
    }
}

#[async_trait]
impl FeedProvider for TwitterFeedProvider {
    async fn lookup_handle(&self, handle: &str) -> Result<Option<u64>, FetchError> {
        let response = self
            .get("users/show.json", &[("screen_name", handle.to_string())])
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(FetchError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let user: WireUser = response.json().await?;
        Ok(Some(user.id))
    }

    async fn timeline_page(
        &self,
        account_id: u64,
        max_id: Option<u64>,
        page_size: usize,
    ) -> Result<Vec<Post>, FetchError> {
        let mut query = vec![
            ("user_id", account_id.to_string()),
            ("count", page_size.to_string()),
            ("include_rts", "true".to_string()),
            ("tweet_mode", "extended".to_string()),
        ];
        if let Some(max_id) = max_id {
            query.push(("max_id", max_id.to_string()));
        }

        let response = self.get("statuses/user_timeline.json", &query).await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(FetchError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let statuses: Vec<WireStatus> = response.json().await?;
        statuses
            .into_iter()
            .map(WireStatus::into_post)
            .collect()
    }
}

fn header_u64(response: &Response, name: &str) -> Option<u64> {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_status_maps_to_post() {
        let json = r#"{
            "id": 1050118621198921700,
            "created_at": "Wed Oct 10 20:19:24 +0000 2018",
            "full_text": "To make room for more expression, we will now count all emojis as equal.",
            "lang": "en",
            "user": { "id": 6253282 },
            "in_reply_to_screen_name": null
        }"#;

        let status: WireStatus = serde_json::from_str(json).unwrap();
        let post = status.into_post().unwrap();

        assert_eq!(post.id, 1050118621198921700);
        assert_eq!(post.author_id, 6253282);
        assert_eq!(post.lang, "en");
        assert!(!post.is_retweet);
        assert_eq!(post.in_reply_to, None);
        assert_eq!(post.created_at.timestamp(), 1539202764);
    }

    #[test]
    fn retweet_marker_is_presence_of_retweeted_status() {
        let json = r#"{
            "id": 10,
            "created_at": "Wed Oct 10 20:19:24 +0000 2018",
            "text": "RT @someone: hello",
            "lang": "en",
            "user": { "id": 1 },
            "retweeted_status": { "id": 9 }
        }"#;

        let status: WireStatus = serde_json::from_str(json).unwrap();
        let post = status.into_post().unwrap();
        assert!(post.is_retweet);
    }

    #[test]
    fn full_text_takes_precedence_over_text() {
        let json = r#"{
            "id": 10,
            "created_at": "Wed Oct 10 20:19:24 +0000 2018",
            "text": "truncated...",
            "full_text": "the whole thing",
            "lang": "en",
            "user": { "id": 1 }
        }"#;

        let status: WireStatus = serde_json::from_str(json).unwrap();
        assert_eq!(status.into_post().unwrap().text, "the whole thing");
    }

    #[test]
    fn missing_language_becomes_und() {
        let json = r#"{
            "id": 10,
            "created_at": "Wed Oct 10 20:19:24 +0000 2018",
            "text": "????",
            "user": { "id": 1 }
        }"#;

        let status: WireStatus = serde_json::from_str(json).unwrap();
        assert_eq!(status.into_post().unwrap().lang, "und");
    }

    #[test]
    fn unparseable_created_at_is_an_error() {
        let json = r#"{
            "id": 10,
            "created_at": "not a date",
            "text": "hi",
            "lang": "en",
            "user": { "id": 1 }
        }"#;

        let status: WireStatus = serde_json::from_str(json).unwrap();
        assert!(matches!(
            status.into_post(),
            Err(FetchError::Malformed(_))
        ));
    }
}
