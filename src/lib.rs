//! Trendsync - time-windowed trend collection with cache-coherent sync.
//!
//! This crate collects social trend records for a topic, aggregates them into
//! per-day keyword frequencies, and keeps a rolling window of those rows in a
//! local SQLite store while avoiding redundant fetches from the external feed.
//!
//! # Architecture
//!
//! A request flows through three cooperating caches:
//!
//! - **`service::range_cache`** - Answers "do the stored rows already cover
//!   this date window?" and narrows the fetch to the uncovered gap.
//! - **`service::master_cache`** - Holds the raw fetched records per
//!   topic/channel, merged by record id so re-fetches never duplicate, and
//!   decides between skipping, an incremental cursor fetch, and a full fetch.
//! - **`service::retention`** - Writes aggregated rows into the permanent
//!   store idempotently while pruning rows older than the retention horizon.
//!
//! The [`service::Orchestrator`] sequences these stages for one run.
//!
//! # Modules
//!
//! - [`config`] - Configuration loading from TOML files
//! - [`domain`] - Core types: windows, coverage verdicts, records, trend rows
//! - [`error`] - Error types for the crate
//! - [`port`] - Trait seams for stores and the record fetcher
//! - [`service`] - Cache-coherency and sync services
//! - [`adapter`] - SQLite persistence, the feed HTTP client, and the CLI

pub mod adapter;
pub mod config;
pub mod domain;
pub mod error;
pub mod port;
pub mod service;
