//! Search feed adapter: HTTP client and wire types.

mod client;
mod dto;

pub use client::FeedClient;
pub use dto::{parse_item, FeedPage};
