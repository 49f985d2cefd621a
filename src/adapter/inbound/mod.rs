//! Inbound adapters: interfaces through which work enters the application.

pub mod cli;
