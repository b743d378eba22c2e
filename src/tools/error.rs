//! Error types for the GitLab tool layer
//!
//! Every variant is rendered to the agent as an `{"error": "..."}` payload
//! instead of failing the MCP call.

use thiserror::Error;

use crate::gitlab::GitLabError;

#[derive(Debug, Error)]
pub enum ToolError {
    /// Missing or blank required argument, or arguments that are not valid JSON
    #[error("{0}")]
    InvalidArgument(String),

    #[error("Unknown tool: '{0}'")]
    UnknownTool(String),

    #[error(transparent)]
    GitLab(#[from] GitLabError),

    #[error("Failed to serialize tool result: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ToolError {
    /// Error for a required argument that was absent or blank.
    pub fn missing(name: &str) -> Self {
        Self::InvalidArgument(format!("'{name}' parameter is required"))
    }
}
