//! Rate limit configuration

use std::time::Duration;

use crate::domain::DomainError;

/// One sliding-window tier: at most `limit` events per `window`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierConfig {
    pub limit: u32,
    pub window: Duration,
}

impl TierConfig {
    pub fn new(limit: u32, window_seconds: u64) -> Self {
        Self {
            limit,
            window: Duration::from_secs(window_seconds),
        }
    }

    pub fn window_millis(&self) -> i64 {
        self.window.as_millis() as i64
    }
}

/// Two-tier limiter configuration
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Per client identity
    pub per_client: TierConfig,
    /// Shared by every client of this process
    pub system: TierConfig,
    /// Prefix for the store keys holding the event logs
    pub namespace: String,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            per_client: TierConfig::new(10, 300),
            system: TierConfig::new(100, 3600),
            namespace: "ratelimit".to_string(),
        }
    }
}

impl RateLimitConfig {
    pub fn new(per_client: TierConfig, system: TierConfig) -> Self {
        Self {
            per_client,
            system,
            ..Default::default()
        }
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        for (name, tier) in [("ip", &self.per_client), ("system", &self.system)] {
            if tier.limit == 0 {
                return Err(DomainError::configuration(format!(
                    "{} rate limit must be positive",
                    name
                )));
            }

            if tier.window.as_secs() == 0 {
                return Err(DomainError::configuration(format!(
                    "{} rate limit window must be at least one second",
                    name
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RateLimitConfig::default();
        assert_eq!(config.per_client, TierConfig::new(10, 300));
        assert_eq!(config.system, TierConfig::new(100, 3600));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero() {
        let config = RateLimitConfig::new(TierConfig::new(0, 60), TierConfig::new(10, 60));
        assert!(config.validate().is_err());

        let config = RateLimitConfig::new(TierConfig::new(5, 60), TierConfig::new(10, 0));
        assert!(config.validate().is_err());
    }
}
