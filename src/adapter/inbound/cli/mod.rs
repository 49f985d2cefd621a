//! Command-line inbound adapter.

mod command;
mod run;

pub use command::{Cli, Commands, ReportArgs, RunArgs, SyncArgs};
pub use run::execute;
