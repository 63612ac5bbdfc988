//! Store domain - Shared key-value store abstraction

mod repository;

pub use repository::{KeyValueStore, KeyValueStoreExt, WindowEvent};

#[cfg(test)]
pub use repository::mock::MockStore;
