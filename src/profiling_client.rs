//! Client for the personality profiling service.
//!
//! Receives a finished batch of content items and returns the profile
//! document as a string in the requested encoding. The service owns the
//! document format; nothing here inspects it.

use crate::error::ProfilingError;
use crate::types::ContentItem;
use reqwest::header::ACCEPT;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info};

pub const DEFAULT_PROFILING_URL: &str =
    "https://gateway.watsonplatform.net/personality-insights/api";

const PROFILE_PATH: &str = "v2/profile";

#[derive(Serialize)]
struct ContentItemsBody<'a> {
    #[serde(rename = "contentItems")]
    content_items: &'a [ContentItem],
}

pub struct ProfilingClient {
    client: Client,
    base_url: String,
    username: String,
    password: String,
}

impl ProfilingClient {
    pub fn new(
        base_url: &str,
        username: &str,
        password: &str,
    ) -> Result<Self, ProfilingError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            username: username.to_string(),
            password: password.to_string(),
        })
    }

    /// Submit the batch and return the profile as structured JSON.
    pub async fn profile_json(
        &self,
        items: &[ContentItem],
        include_raw: bool,
    ) -> Result<String, ProfilingError> {
        self.post_items(
            items,
            "application/json",
            &[("include_raw", include_raw.to_string())],
        )
        .await
    }

    /// Submit the batch and return the profile as tabular CSV.
    pub async fn profile_csv(
        &self,
        items: &[ContentItem],
        include_headers: bool,
    ) -> Result<String, ProfilingError> {
        self.post_items(
            items,
            "text/csv",
            &[("headers", include_headers.to_string())],
        )
        .await
    }

    async fn post_items(
        &self,
        items: &[ContentItem],
        accept: &str,
        query: &[(&str, String)],
    ) -> Result<String, ProfilingError> {
        let url = format!("{}/{PROFILE_PATH}", self.base_url);
        info!("submitting {} content items to {}", items.len(), url);

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.username, Some(&self.password))
            .header(ACCEPT, accept)
            .query(query)
            .json(&ContentItemsBody {
                content_items: items,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ProfilingError::Api {
                status: status.as_u16(),
                message,
            });
        }

        debug!("profiling service responded with {}", status);
        Ok(response.text().await?)
    }
}
