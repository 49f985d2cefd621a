//! Outbound adapters: persistence and external feeds.

pub mod feed;
pub mod sqlite;
