//! Environment-backed configuration.
//!
//! Callers are expected to have loaded a `.env` file (the binary does) before
//! calling [`ProfilerConfig::from_env`].

use crate::profiling_client::DEFAULT_PROFILING_URL;
use crate::twitter_feed::DEFAULT_TWITTER_API_URL;
use anyhow::{bail, Result};

pub const TWITTER_BEARER_TOKEN_VAR: &str = "TWITTER_BEARER_TOKEN";
pub const TWITTER_API_URL_VAR: &str = "TWITTER_API_URL";
pub const PROFILING_URL_VAR: &str = "PROFILING_URL";
pub const PROFILING_USERNAME_VAR: &str = "PROFILING_USERNAME";
pub const PROFILING_PASSWORD_VAR: &str = "PROFILING_PASSWORD";

#[derive(Debug, Clone)]
pub struct ProfilerConfig {
    pub twitter_api_url: String,
    pub twitter_bearer_token: String,
    pub profiling_url: String,
    pub profiling_username: String,
    pub profiling_password: String,
}

impl ProfilerConfig {
    /// Load configuration from the environment. All missing required
    /// variables are reported in one error rather than one at a time.
    pub fn from_env() -> Result<Self> {
        let bearer_token = non_empty_var(TWITTER_BEARER_TOKEN_VAR);
        let profiling_username = non_empty_var(PROFILING_USERNAME_VAR);
        let profiling_password = non_empty_var(PROFILING_PASSWORD_VAR);

        let mut missing = Vec::new();
        if bearer_token.is_none() {
            missing.push(TWITTER_BEARER_TOKEN_VAR);
        }
        if profiling_username.is_none() {
            missing.push(PROFILING_USERNAME_VAR);
        }
        if profiling_password.is_none() {
            missing.push(PROFILING_PASSWORD_VAR);
        }
        let (Some(twitter_bearer_token), Some(profiling_username), Some(profiling_password)) =
            (bearer_token, profiling_username, profiling_password)
        else {
            bail!(
                "cannot load credentials from the environment. The variables {} are unset or empty",
                missing.join(",")
            );
        };

        Ok(Self {
            twitter_api_url: non_empty_var(TWITTER_API_URL_VAR)
                .unwrap_or_else(|| DEFAULT_TWITTER_API_URL.to_string()),
            twitter_bearer_token,
            profiling_url: non_empty_var(PROFILING_URL_VAR)
                .unwrap_or_else(|| DEFAULT_PROFILING_URL.to_string()),
            profiling_username,
            profiling_password,
        })
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
}
