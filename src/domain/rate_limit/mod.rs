//! Rate limit domain - Tier configuration and admission decisions

mod config;
mod decision;

pub use config::{RateLimitConfig, TierConfig};
pub use decision::{RateLimitDecision, RateLimitReason};
