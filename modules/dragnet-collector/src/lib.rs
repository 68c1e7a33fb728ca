pub mod collector;
pub mod consolidate;
pub mod deep;
pub mod extraction;
pub mod fanout;
pub mod harvest;
pub mod providers;
pub mod search;
pub mod social;
pub mod store;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;
pub mod traits;
pub mod validate;

pub use collector::{CollectionResult, MassiveCollector};
