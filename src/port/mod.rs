//! Trait boundaries between the engine and its collaborators.

mod fetch;
mod store;

pub use fetch::RecordFetcher;
pub use store::{MasterStore, TrendStore};
