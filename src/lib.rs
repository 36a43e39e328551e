//! StudyBuddy Proxy
//!
//! Edge proxy for the StudyBuddy study assistant. The browser client never
//! holds provider credentials; instead it calls this proxy, which picks an
//! API key from a per-service rotation pool, forwards the payload to the
//! upstream provider (Groq, Gemini, or Tavily search), and relays the
//! response with permissive CORS headers.
//!
//! Key selection spreads load across the configured keys: least-used keys
//! go first, a key rests for a minimum spacing window between uses, and
//! when every key is inside the window the least-recently-used one is
//! reused rather than failing the request.

pub mod config;
pub mod error;
pub mod extract;
pub mod rotation;
pub mod server;
pub mod upstream;

pub use config::{ConfigLoader, ProxyConfig, ServerSettings, ServiceConfig};
pub use error::{ProxyError, Result};
pub use rotation::{CredentialRecord, KeyPool, KeyPoolStats, DEFAULT_MIN_SPACING_MS};
pub use server::{build_router, serve, AppState};
pub use upstream::{SearchRequest, ServiceKind, UpstreamClient};
