//! Infrastructure layer - Store, provider and service implementations

pub mod logging;
pub mod places;
pub mod rate_limit;
pub mod services;
pub mod store;
