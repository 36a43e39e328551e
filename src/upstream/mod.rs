//! Upstream Module
//!
//! Outbound half of the dispatcher: service targets and the relay client.

pub mod client;
pub mod target;

pub use client::UpstreamClient;
pub use target::{SearchRequest, ServiceKind, TAVILY_API_KEY_HEADER};
