//! Name-based dispatch over the tool set.
//!
//! The MCP handler and the CLI both route calls through [`ToolName::handle`],
//! so argument parsing and result shaping are identical on either surface.

use std::collections::HashMap;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

use super::error::ToolError;
use super::functions;
use crate::gitlab::GitLabClient;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString, IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum ToolName {
    TestConnectivity,
    SearchRepositories,
    GetProjectInfo,
    ListRepositoryFiles,
    GetFileContent,
    GetProjectReadme,
    SearchCode,
    SearchIssues,
    GetWikiPages,
    AnalyzeDependencies,
    GetCiConfig,
    GetBuildConfig,
    ListReleases,
    GetRelease,
    ListTags,
    InspectProject,
}

impl ToolName {
    pub fn as_str(self) -> &'static str {
        self.into()
    }

    /// One-line summary shown by `list-tools`
    pub fn summary(self) -> &'static str {
        match self {
            Self::TestConnectivity => "Check that the GitLab instance is reachable",
            Self::SearchRepositories => "Search public projects by keyword, language or topic",
            Self::GetProjectInfo => "Project metadata, statistics and languages",
            Self::ListRepositoryFiles => "List files and directories in a repository",
            Self::GetFileContent => "Read a single file",
            Self::GetProjectReadme => "Find and read the project README",
            Self::SearchCode => "Search code or file names",
            Self::SearchIssues => "Search issues by keyword",
            Self::GetWikiPages => "List wiki pages or read one page",
            Self::AnalyzeDependencies => "Parse dependency manifests",
            Self::GetCiConfig => "Read and summarize .gitlab-ci.yml",
            Self::GetBuildConfig => "Detect build systems and read their files",
            Self::ListReleases => "List releases",
            Self::GetRelease => "Release details by tag",
            Self::ListTags => "List repository tags",
            Self::InspectProject => "Combined dependency, build and CI overview",
        }
    }

    /// Run the tool against `client` with JSON arguments. `null` arguments
    /// are treated as an empty object.
    pub async fn handle(self, client: &GitLabClient, arguments: Value) -> Result<Value, ToolError> {
        tracing::debug!("Calling tool {}", self);
        match self {
            Self::TestConnectivity => to_json(client.test_connection().await),
            Self::SearchRepositories => {
                to_json(functions::project::search_repositories(client, parse(arguments)?).await?)
            }
            Self::GetProjectInfo => {
                to_json(functions::project::get_project_info(client, parse(arguments)?).await?)
            }
            Self::ListRepositoryFiles => to_json(
                functions::repository::list_repository_files(client, parse(arguments)?).await?,
            ),
            Self::GetFileContent => to_json(
                functions::repository::get_file_content(client, parse(arguments)?).await?,
            ),
            Self::GetProjectReadme => to_json(
                functions::repository::get_project_readme(client, parse(arguments)?).await?,
            ),
            Self::SearchCode => {
                to_json(functions::search::search_code(client, parse(arguments)?).await?)
            }
            Self::SearchIssues => {
                to_json(functions::search::search_issues(client, parse(arguments)?).await?)
            }
            Self::GetWikiPages => {
                to_json(functions::wiki::get_wiki_pages(client, parse(arguments)?).await?)
            }
            Self::AnalyzeDependencies => to_json(
                functions::inspect::analyze_dependencies(client, parse(arguments)?).await?,
            ),
            Self::GetCiConfig => {
                to_json(functions::inspect::get_ci_config(client, parse(arguments)?).await?)
            }
            Self::GetBuildConfig => {
                to_json(functions::inspect::get_build_config(client, parse(arguments)?).await?)
            }
            Self::ListReleases => {
                to_json(functions::release::list_releases(client, parse(arguments)?).await?)
            }
            Self::GetRelease => {
                to_json(functions::release::get_release(client, parse(arguments)?).await?)
            }
            Self::ListTags => {
                to_json(functions::release::list_tags(client, parse(arguments)?).await?)
            }
            Self::InspectProject => {
                to_json(functions::inspect::inspect_project(client, parse(arguments)?).await?)
            }
        }
    }
}

fn parse<T: DeserializeOwned>(arguments: Value) -> Result<T, ToolError> {
    let arguments = match arguments {
        Value::Null => Value::Object(Map::new()),
        other => other,
    };
    serde_json::from_value(arguments)
        .map_err(|e| ToolError::InvalidArgument(format!("Invalid arguments: {e}")))
}

fn to_json<T: Serialize>(result: T) -> Result<Value, ToolError> {
    Ok(serde_json::to_value(result)?)
}

/// Lookup table from wire name to [`ToolName`]
#[derive(Debug, Clone)]
pub struct ToolRegistry {
    tools: HashMap<&'static str, ToolName>,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: ToolName::iter().map(|tool| (tool.as_str(), tool)).collect(),
        }
    }

    pub fn lookup(&self, name: &str) -> Result<ToolName, ToolError> {
        self.tools
            .get(name.trim())
            .copied()
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))
    }

    /// Registered tool names in alphabetical order
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.tools.keys().copied().collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub async fn call(
        &self,
        client: &GitLabClient,
        name: &str,
        arguments: Value,
    ) -> Result<Value, ToolError> {
        self.lookup(name)?.handle(client, arguments).await
    }
}
