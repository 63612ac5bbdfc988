//! API layer - HTTP endpoints and extractors

pub mod health;
pub mod middleware;
pub mod router;
pub mod state;
pub mod types;
pub mod v1;

pub use middleware::ClientIdentity;
pub use router::create_router;
pub use state::AppState;
