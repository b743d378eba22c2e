use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use rmcp::transport::sse_server::SseServer;

use crate::gitlab::GitLabClient;
use crate::tools::GitLabInsightTools;

pub struct SseServerApp {
    bind_addr: SocketAddr,
    client: Arc<GitLabClient>,
}

impl SseServerApp {
    /// Creates a new SSE server application. Every SSE session shares `client`,
    /// and with it the rate limiter and connection pool.
    pub fn new(bind_addr: SocketAddr, client: Arc<GitLabClient>) -> Self {
        Self { bind_addr, client }
    }

    /// Starts the SSE server and serves the GitLab tools until Ctrl+C.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The server fails to bind to the specified address
    /// - Waiting for the shutdown signal fails
    pub async fn serve(self) -> Result<()> {
        let sse_server = SseServer::serve(self.bind_addr).await?;
        tracing::info!("Access the GitLab Insight server at http://{}/sse", self.bind_addr);

        let client = self.client.clone();
        let cancellation_token =
            sse_server.with_service(move || GitLabInsightTools::new(client.clone()));

        // Wait for Ctrl+C signal to gracefully shutdown
        tokio::signal::ctrl_c().await?;
        tracing::info!("Shutting down SSE server");

        cancellation_token.cancel();
        self.client.close();

        Ok(())
    }
}
