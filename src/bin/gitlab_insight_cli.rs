use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::{Value, json};

use gitlab_insight::config::Settings;
use gitlab_insight::gitlab::GitLabClient;
use gitlab_insight::logging::init_logging;
use gitlab_insight::tools::{ToolName, ToolRegistry};

#[derive(Parser)]
#[command(author, version = env!("CARGO_PKG_VERSION"))]
#[command(about = "GitLab Insight CLI - run GitLab Insight tools from the command line")]
#[command(propagate_version = true)]
struct Cli {
    /// Base URL of the GitLab instance (overrides GITLAB_INSIGHT_GITLAB_URL)
    #[arg(short = 'u', long, global = true)]
    gitlab_url: Option<String>,

    /// Personal access token (overrides GITLAB_INSIGHT_TOKEN)
    #[arg(short = 't', long, global = true)]
    token: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check connectivity and token validity
    TestConnection,
    /// List the available tools
    ListTools,
    /// Call a tool with JSON arguments
    Call {
        /// Tool name, e.g. search_repositories
        tool: String,

        /// Tool arguments as a JSON object
        #[arg(short, long, default_value = "{}")]
        arguments: String,
    },
}

impl Cli {
    fn settings(&self) -> Result<Settings> {
        let mut settings = Settings::from_env()?;
        if let Some(url) = &self.gitlab_url {
            settings = settings.with_gitlab_url(url.clone());
        }
        if self.token.is_some() {
            settings = settings.with_token(self.token.clone());
        }
        if self.debug {
            settings = settings.with_log_level("debug");
        }
        Ok(settings)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = cli.settings()?;
    init_logging(&settings.log_level);

    let registry = ToolRegistry::new();
    let client = GitLabClient::new(settings)?;

    let output = match cli.command {
        Commands::TestConnection => serde_json::to_value(client.test_connection().await)?,
        Commands::ListTools => {
            let tools = registry
                .names()
                .into_iter()
                .map(|name| -> Result<Value> {
                    let summary = registry.lookup(name).map(ToolName::summary)?;
                    Ok(json!({ "name": name, "summary": summary }))
                })
                .collect::<Result<Vec<_>>>()?;
            Value::Array(tools)
        }
        Commands::Call { tool, arguments } => {
            let arguments: Value = serde_json::from_str(&arguments)
                .with_context(|| format!("--arguments is not valid JSON: {arguments}"))?;
            registry.call(&client, &tool, arguments).await?
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    client.close();
    Ok(())
}
