//! Store-agnostic domain types for the cache and sync engine.

mod coverage;
mod filter;
mod id;
mod record;
mod request;
mod row;
mod window;

pub use coverage::{classify, Coverage};
pub use filter::RowFilter;
pub use id::{Channel, RecordId, Topic};
pub use record::MasterRecord;
pub use request::TopicWindowRequest;
pub use row::TrendRow;
pub use window::DateWindow;
