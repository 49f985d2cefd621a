//! SQLite persistence adapters.

pub mod database;
mod master_store;
mod trend_store;

pub use master_store::SqliteMasterStore;
pub use trend_store::SqliteTrendStore;
