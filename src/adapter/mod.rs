//! Adapters binding the service layer to the outside world.

pub mod inbound;
pub mod outbound;
