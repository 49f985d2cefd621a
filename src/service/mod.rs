//! The cache-coherency and sync services composed by the orchestrator.

pub mod aggregate;
pub mod master_cache;
pub mod orchestrator;
pub mod range_cache;
pub mod report;
pub mod retention;

pub use master_cache::{merge, select_window, FetchPlan, MasterCache, MasterCachePolicy};
pub use orchestrator::{Orchestrator, OrchestratorSettings, RunReport, Stage};
pub use range_cache::RangeCache;
pub use retention::RetentionSync;
