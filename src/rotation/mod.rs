//! Rotation Module
//!
//! API key pool management and the per-call selection policy.

pub mod key_pool;

pub use key_pool::{epoch_ms, CredentialRecord, KeyPool, KeyPoolStats, DEFAULT_MIN_SPACING_MS};
