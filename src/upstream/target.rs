//! Upstream Service Targets
//!
//! The fixed set of third-party APIs the proxy fronts, and where each one
//! expects its credential.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Header carrying the Tavily search API key
pub const TAVILY_API_KEY_HEADER: &str = "X-Tavily-API-Key";

/// One of the three upstream services
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceKind {
    /// Groq chat completions (Bearer token auth)
    Groq,
    /// Gemini content generation (key as URL query parameter)
    Gemini,
    /// Tavily web search (key in a custom header)
    Search,
}

impl ServiceKind {
    /// All services, in a fixed order
    pub const ALL: [ServiceKind; 3] = [ServiceKind::Groq, ServiceKind::Gemini, ServiceKind::Search];

    /// Resolve a request path segment to a service
    pub fn from_path(segment: &str) -> Option<Self> {
        match segment {
            "groq" => Some(ServiceKind::Groq),
            "gemini" => Some(ServiceKind::Gemini),
            "search" => Some(ServiceKind::Search),
            _ => None,
        }
    }

    /// Name used for routing and config lookup
    pub fn config_name(&self) -> &'static str {
        match self {
            ServiceKind::Groq => "groq",
            ServiceKind::Gemini => "gemini",
            ServiceKind::Search => "search",
        }
    }

    /// Provider name used in log and error messages
    pub fn display_name(&self) -> &'static str {
        match self {
            ServiceKind::Groq => "Groq",
            ServiceKind::Gemini => "Gemini",
            ServiceKind::Search => "Tavily",
        }
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.config_name())
    }
}

/// Search request forwarded to Tavily, with proxy-side defaults applied.
/// Fields the client omits are filled in; fields outside this shape are
/// dropped before forwarding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Free-text search query
    #[serde(default)]
    pub query: String,

    /// Search depth, "basic" unless the client asks for more
    #[serde(default = "default_search_depth")]
    pub search_depth: String,

    /// Domains to restrict results to
    #[serde(default)]
    pub include_domains: Vec<String>,

    /// Domains to exclude from results
    #[serde(default)]
    pub exclude_domains: Vec<String>,

    /// Maximum number of results to return
    #[serde(default = "default_max_results")]
    pub max_results: u32,
}

impl Default for SearchRequest {
    fn default() -> Self {
        Self {
            query: String::new(),
            search_depth: default_search_depth(),
            include_domains: Vec::new(),
            exclude_domains: Vec::new(),
            max_results: default_max_results(),
        }
    }
}

fn default_search_depth() -> String {
    "basic".to_string()
}

fn default_max_results() -> u32 {
    5
}
