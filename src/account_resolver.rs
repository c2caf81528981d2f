//! Maps a user-supplied identifier to a canonical numeric account id.

use crate::error::FetchError;
use crate::feed_provider::FeedProvider;
use crate::rate_limit_gate::RateLimitGate;
use std::sync::Arc;
use tracing::debug;

pub struct AccountResolver {
    provider: Arc<dyn FeedProvider>,
    gate: Arc<RateLimitGate>,
}

impl AccountResolver {
    pub fn new(provider: Arc<dyn FeedProvider>, gate: Arc<RateLimitGate>) -> Self {
        Self { provider, gate }
    }

    /// Resolve `identifier` to a numeric account id. An `@handle` goes
    /// through the provider (gated like any other request); anything else
    /// must parse as a numeric id and makes no network call.
    pub async fn resolve(&self, identifier: &str) -> Result<u64, FetchError> {
        if let Some(handle) = identifier.strip_prefix('@') {
            self.gate.check_or_fail()?;
            debug!(handle, "looking up handle");
            return match self.provider.lookup_handle(handle).await? {
                Some(id) => Ok(id),
                None => Err(FetchError::UnknownAccount(identifier.to_string())),
            };
        }

        identifier
            .parse::<u64>()
            .map_err(|_| FetchError::InvalidIdentifier(identifier.to_string()))
    }
}
