//! Sliding window rate limiter
//!
//! Two tiers are checked in order against the shared store: the caller's
//! own window, then the process-wide window. Each check is one atomic
//! store batch; a rejected check takes its own event back out again.

use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::rate_limit::{RateLimitConfig, RateLimitDecision, RateLimitReason, TierConfig};
use crate::domain::store::{KeyValueStore, WindowEvent};
use crate::domain::{Clock, DomainError, SystemClock};

/// Store-backed two-tier rate limiter
#[derive(Debug)]
pub struct SlidingWindowRateLimiter {
    store: Arc<dyn KeyValueStore>,
    config: RateLimitConfig,
    clock: Arc<dyn Clock>,
}

impl SlidingWindowRateLimiter {
    pub fn new(store: Arc<dyn KeyValueStore>, config: RateLimitConfig) -> Self {
        Self::with_clock(store, config, Arc::new(SystemClock))
    }

    pub fn with_clock(
        store: Arc<dyn KeyValueStore>,
        config: RateLimitConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            config,
            clock,
        }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Admits or rejects one request from `client_id`
    ///
    /// Never fails: a store error yields a degraded admission.
    pub async fn check_limit(&self, client_id: &str) -> RateLimitDecision {
        let now = self.clock.now_millis();

        match self.check_tiers(client_id, now).await {
            Ok(decision) => {
                if decision.admitted {
                    debug!(
                        client_id,
                        remaining = decision.remaining,
                        "Rate limit check passed"
                    );
                } else {
                    info!(
                        client_id,
                        reason = %decision.reason,
                        limit = decision.limit,
                        "Rate limit exceeded"
                    );
                }
                decision
            }
            Err(e) => {
                warn!(
                    client_id,
                    error = %e,
                    "Rate limit store unavailable, admitting request without enforcement"
                );
                let tier = self.config.per_client;
                RateLimitDecision::fail_open(tier.limit, now + tier.window_millis())
            }
        }
    }

    async fn check_tiers(&self, client_id: &str, now: i64) -> Result<RateLimitDecision, DomainError> {
        // Shared by both tiers so one id identifies this check everywhere
        let member = format!("{}-{}", now, Uuid::new_v4());

        let per_client = self.config.per_client;
        let client_key = self.client_key(client_id);
        let client_count = self.record(&client_key, &per_client, now, &member).await?;

        if client_count >= per_client.limit as u64 {
            self.compensate(&client_key, &member).await;
            return Ok(RateLimitDecision::rejected(
                RateLimitReason::IpLimit,
                per_client.limit,
                now + per_client.window_millis(),
            ));
        }

        let system = self.config.system;
        let system_key = self.system_key();
        let system_count = self.record(&system_key, &system, now, &member).await?;

        if system_count >= system.limit as u64 {
            self.compensate(&system_key, &member).await;
            self.compensate(&client_key, &member).await;
            return Ok(RateLimitDecision::rejected(
                RateLimitReason::SystemLimit,
                system.limit,
                now + system.window_millis(),
            ));
        }

        let remaining = (per_client.limit as u64).saturating_sub(client_count + 1) as u32;

        Ok(RateLimitDecision::admitted(
            per_client.limit,
            remaining,
            now + per_client.window_millis(),
        ))
    }

    async fn record(
        &self,
        key: &str,
        tier: &TierConfig,
        now: i64,
        member: &str,
    ) -> Result<u64, DomainError> {
        let event = WindowEvent {
            key: key.to_string(),
            window_start: now - tier.window_millis(),
            score: now,
            member: member.to_string(),
            ttl: tier.window,
        };

        self.store.record_window_event(&event).await
    }

    /// Takes a rejected check's event back out of a window
    async fn compensate(&self, key: &str, member: &str) {
        if let Err(e) = self.store.remove_window_event(key, member).await {
            warn!(key, error = %e, "Failed to remove rejected rate limit event");
        }
    }

    fn client_key(&self, client_id: &str) -> String {
        format!("{}:ip:{}", self.config.namespace, client_id)
    }

    fn system_key(&self) -> String {
        format!("{}:system", self.config.namespace)
    }
}
