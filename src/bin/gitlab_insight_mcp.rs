use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use gitlab_insight::config::Settings;
use gitlab_insight::gitlab::{ConnectionStatus, GitLabClient};
use gitlab_insight::logging::init_logging;
use gitlab_insight::transport::{sse_server::SseServerApp, stdio::run_stdio_server};

#[derive(Parser)]
#[command(author, version = env!("CARGO_PKG_VERSION"))]
#[command(
    about = "GitLab Insight MCP Server - Model Context Protocol server for read-only GitLab repository insight"
)]
#[command(
    long_about = "GitLab Insight MCP Server gives MCP clients read-only access to a GitLab instance: project search and metadata, repository files and READMEs, code and issue search, wikis, dependency, build and CI inspection, releases and tags. Public projects work without a token. Supports both stdio and HTTP/SSE interfaces."
)]
#[command(propagate_version = true)]
#[command(disable_version_flag = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the server in stdin/stdout mode for MCP client integration like Claude Desktop
    Stdio {
        #[command(flatten)]
        options: ServerOptions,
    },
    /// Run the server with HTTP/SSE interface for web-based access and testing
    Http {
        /// Address to bind the HTTP server to
        #[arg(short, long, default_value = "0.0.0.0:8080")]
        address: String,

        #[command(flatten)]
        options: ServerOptions,
    },
}

/// Overrides for the `GITLAB_INSIGHT_*` environment settings
#[derive(Args)]
struct ServerOptions {
    /// Enable debug logging for troubleshooting and development
    #[arg(short, long)]
    debug: bool,

    /// Base URL of the GitLab instance (overrides GITLAB_INSIGHT_GITLAB_URL)
    #[arg(short = 'u', long)]
    gitlab_url: Option<String>,

    /// Personal access token (overrides GITLAB_INSIGHT_TOKEN)
    #[arg(short = 't', long)]
    token: Option<String>,

    /// Request timeout in seconds (overrides GITLAB_INSIGHT_TIMEOUT)
    #[arg(long)]
    timeout: Option<f64>,

    /// Attempts per request (overrides GITLAB_INSIGHT_MAX_RETRIES)
    #[arg(long)]
    max_retries: Option<u32>,

    /// Requests allowed per minute (overrides GITLAB_INSIGHT_RATE_LIMIT_PER_MINUTE)
    #[arg(long)]
    rate_limit_per_minute: Option<u32>,
}

impl ServerOptions {
    fn settings(self) -> Result<Settings> {
        let mut settings = Settings::from_env()?;
        if let Some(url) = self.gitlab_url {
            settings = settings.with_gitlab_url(url);
        }
        if self.token.is_some() {
            settings = settings.with_token(self.token);
        }
        if let Some(secs) = self.timeout {
            let timeout = Duration::try_from_secs_f64(secs)
                .map_err(|_| anyhow::anyhow!("--timeout must be a non-negative number, got {secs}"))?;
            settings = settings.with_timeout(timeout);
        }
        if let Some(retries) = self.max_retries {
            settings = settings.with_max_retries(retries);
        }
        if let Some(rate) = self.rate_limit_per_minute {
            settings = settings.with_rate_limit_per_minute(rate);
        }
        if self.debug {
            settings = settings.with_log_level("debug");
        }
        settings.validate()?;
        Ok(settings)
    }
}

/// Build the shared client and log a connectivity check. A failed check is
/// not fatal: the instance may come up after the server does.
async fn connect(options: ServerOptions) -> Result<Arc<GitLabClient>> {
    let settings = options.settings()?;
    init_logging(&settings.log_level);
    tracing::debug!("Resolved settings: {:?}", settings);

    let client = Arc::new(GitLabClient::new(settings)?);
    let report = client.test_connection().await;
    match report.status {
        ConnectionStatus::Connected => tracing::info!(
            "Connected to {} (authenticated: {})",
            report.gitlab_url,
            report.authenticated
        ),
        ConnectionStatus::Error => tracing::warn!(
            "Connectivity check against {} failed: {}",
            report.gitlab_url,
            report.error.as_deref().unwrap_or("unknown error")
        ),
    }
    if let Some(warning) = &report.warning {
        tracing::warn!("{}", warning);
    }

    Ok(client)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Stdio { options } => {
            let client = connect(options).await?;
            run_stdio_server(client).await
        }
        Commands::Http { address, options } => {
            let addr: SocketAddr = address.parse()?;
            let client = connect(options).await?;
            SseServerApp::new(addr, client).serve().await
        }
    }
}
