//! Ways of exposing [`GitLabInsightTools`](crate::tools::GitLabInsightTools)
//! to an MCP client. Both transports share one `GitLabClient` per process.

/// Server-Sent Events over HTTP, one service instance per session
pub mod sse_server;

/// stdin/stdout for clients that launch the server as a subprocess
pub mod stdio;
