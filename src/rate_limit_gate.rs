//! Gate between outbound requests and the provider's rate-limit signals.
//!
//! The provider pushes exhaustion notifications from its own task; every
//! request path calls [`RateLimitGate::check_or_fail`] before going out. Both
//! sides share a single mutex, so a notification arriving mid-request can
//! never be lost or observed half-written.

use crate::error::{format_reset_time, FetchError};
use chrono::Utc;
use parking_lot::Mutex;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy)]
struct RateLimitState {
    limited: bool,
    reset_at_millis: i64,
}

/// Tracks whether outbound requests are currently blocked and until when.
pub struct RateLimitGate {
    state: Mutex<RateLimitState>,
}

impl RateLimitGate {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(RateLimitState {
                limited: false,
                reset_at_millis: -1,
            }),
        }
    }

    /// Record a provider notification that requests must stop until
    /// `reset_at_millis`. Safe to call from any task, including concurrently
    /// with [`check_or_fail`](Self::check_or_fail).
    pub fn notify_limited(&self, reset_at_millis: i64) {
        let mut state = self.state.lock();
        state.limited = true;
        state.reset_at_millis = reset_at_millis;
        warn!(
            "rate limit notification received, requests blocked until {}",
            format_reset_time(reset_at_millis)
        );
    }

    /// Fail with [`FetchError::RateLimited`] while the gate is limited and
    /// the reset time has not passed. A limit whose reset time has passed is
    /// cleared here, on the read path; there is no background timer.
    pub fn check_or_fail(&self) -> Result<(), FetchError> {
        let mut state = self.state.lock();
        if state.limited && Utc::now().timestamp_millis() >= state.reset_at_millis {
            debug!("rate limit window has passed, clearing limited state");
            state.limited = false;
            state.reset_at_millis = -1;
        }
        if state.limited {
            return Err(FetchError::RateLimited {
                reset_at_millis: state.reset_at_millis,
            });
        }
        Ok(())
    }
}

impl Default for RateLimitGate {
    fn default() -> Self {
        Self::new()
    }
}
