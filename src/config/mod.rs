//! Configuration loading, validation, and logging setup.

pub mod logging;
pub mod settings;

pub use logging::LoggingConfig;
pub use settings::{CacheConfig, Config, FeedConfig};
