//! Configuration Module
//!
//! Proxy and upstream service configuration loading.

pub mod loader;
pub mod service;

pub use loader::ConfigLoader;
pub use service::{ProxyConfig, ServerSettings, ServiceConfig};
