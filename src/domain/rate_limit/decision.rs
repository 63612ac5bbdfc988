//! Admission decisions

use serde::{Deserialize, Serialize};

/// Why a check ended the way it did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateLimitReason {
    /// Admitted by both tiers
    Ok,
    /// Rejected by the per-client tier
    IpLimit,
    /// Rejected by the process-wide tier
    SystemLimit,
    /// Store unreachable; admitted without enforcement
    StoreUnavailable,
}

impl std::fmt::Display for RateLimitReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ok => write!(f, "ok"),
            Self::IpLimit => write!(f, "ip_limit"),
            Self::SystemLimit => write!(f, "system_limit"),
            Self::StoreUnavailable => write!(f, "store_unavailable"),
        }
    }
}

/// Result of a rate limit check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitDecision {
    pub admitted: bool,
    pub limit: u32,
    pub remaining: u32,
    /// Upper bound on when the window frees up, millis since epoch
    pub reset_at_ms: i64,
    pub reason: RateLimitReason,
}

impl RateLimitDecision {
    pub fn admitted(limit: u32, remaining: u32, reset_at_ms: i64) -> Self {
        Self {
            admitted: true,
            limit,
            remaining,
            reset_at_ms,
            reason: RateLimitReason::Ok,
        }
    }

    pub fn rejected(reason: RateLimitReason, limit: u32, reset_at_ms: i64) -> Self {
        Self {
            admitted: false,
            limit,
            remaining: 0,
            reset_at_ms,
            reason,
        }
    }

    /// Degraded admission while the store is unavailable
    pub fn fail_open(limit: u32, reset_at_ms: i64) -> Self {
        Self {
            admitted: true,
            limit,
            remaining: limit,
            reset_at_ms,
            reason: RateLimitReason::StoreUnavailable,
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.reason == RateLimitReason::StoreUnavailable
    }
}
