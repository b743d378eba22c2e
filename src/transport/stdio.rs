use std::sync::Arc;

use anyhow::Result;
use rmcp::ServiceExt;
use rmcp::transport::stdio;

use crate::gitlab::GitLabClient;
use crate::tools::GitLabInsightTools;

/// Runs the MCP server in STDIN/STDOUT mode.
///
/// This mode is used when the server is launched as a subprocess by an MCP client,
/// communicating through standard input/output streams. The client's HTTP
/// connection pool is released when the session ends.
///
/// # Example
/// ```no_run
/// # use std::sync::Arc;
/// # use gitlab_insight::{config::Settings, gitlab::GitLabClient};
/// # use gitlab_insight::transport::stdio::run_stdio_server;
/// # async fn example() -> anyhow::Result<()> {
/// let client = Arc::new(GitLabClient::new(Settings::from_env()?)?);
/// run_stdio_server(client).await?;
/// # Ok(())
/// # }
/// ```
pub async fn run_stdio_server(client: Arc<GitLabClient>) -> Result<()> {
    let service = GitLabInsightTools::new(client.clone());

    let server = service.serve(stdio()).await?;
    tracing::info!("Serving GitLab Insight over stdio");

    let outcome = server.waiting().await;
    client.close();
    tracing::info!("Stdio session ended");

    outcome?;
    Ok(())
}
