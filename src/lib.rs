/// Content scanners for repository files (file kinds, CI and dependency heuristics)
pub mod analysis;

/// Server settings resolved once at startup from the environment and CLI flags
pub mod config;

/// GitLab REST client with rate limiting, retries and typed errors
pub mod gitlab;

/// MCP tool implementations exposing library functionality through the protocol
pub mod tools;

/// Transport layer implementations for MCP server modes (stdio, SSE)
pub mod transport;

/// Tool argument and result types shared by the tool functions
pub mod types;

/// Logging setup shared by the binaries
pub mod logging;
