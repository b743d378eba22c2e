//! MCP (Model Context Protocol) tool implementations for GitLab Insight
//!
//! This module exposes read-only GitLab repository insight as MCP tools:
//! project search and metadata, files and READMEs, code and issue search,
//! wikis, dependency/build/CI inspection, releases and tags.
//!
//! Every tool returns a single JSON text payload. Failures are reported as an
//! `{"error": "..."}` payload with `is_error` set, never as protocol errors.

use std::sync::Arc;

use rmcp::{Error as McpError, ServerHandler, model::*, tool};
use serde::Serialize;
use serde_json::{Value, json};

use crate::gitlab::GitLabClient;
use crate::types::{
    GetFileContentArgs, GetReleaseArgs, GetWikiPagesArgs, ListReleasesArgs,
    ListRepositoryFilesArgs, ListTagsArgs, ProjectArgs, ProjectAtRefArgs, SearchCodeArgs,
    SearchIssuesArgs, SearchRepositoriesArgs,
};

/// Error types specific to tool operations
pub mod error;

/// Tool function implementations organized by functionality
pub mod functions;

/// Name-based tool dispatch shared by the server and the CLI
pub mod registry;

pub use error::ToolError;
pub use registry::{ToolName, ToolRegistry};

/// MCP server handler wrapping a shared [`GitLabClient`]
#[derive(Clone)]
pub struct GitLabInsightTools {
    client: Arc<GitLabClient>,
    registry: Arc<ToolRegistry>,
}

impl GitLabInsightTools {
    pub fn new(client: Arc<GitLabClient>) -> Self {
        Self {
            client,
            registry: Arc::new(ToolRegistry::new()),
        }
    }

    pub fn client(&self) -> &Arc<GitLabClient> {
        &self.client
    }

    /// Runs a tool and renders its outcome as MCP content.
    async fn invoke<A: Serialize>(
        &self,
        tool: ToolName,
        arguments: A,
    ) -> Result<CallToolResult, McpError> {
        let arguments = serde_json::to_value(arguments)
            .map_err(|e| McpError::internal_error(format!("Invalid arguments: {e}"), None))?;

        match tool.handle(&self.client, arguments).await {
            Ok(result) => Ok(CallToolResult {
                content: vec![Content::text(to_pretty_json(&result))],
                is_error: Some(false),
            }),
            Err(e) => {
                tracing::error!("Tool {} failed: {}", tool, e);
                Ok(CallToolResult {
                    content: vec![Content::text(to_pretty_json(
                        &json!({ "error": e.to_string() }),
                    ))],
                    is_error: Some(true),
                })
            }
        }
    }
}

fn to_pretty_json(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

#[tool(tool_box)]
impl GitLabInsightTools {
    #[tool(
        description = "Test connectivity to the configured GitLab instance. Reports whether the instance is reachable, whether anonymous access works, whether the configured token is valid, and the GitLab version when available."
    )]
    async fn test_connectivity(&self) -> Result<CallToolResult, McpError> {
        self.invoke(ToolName::TestConnectivity, json!({})).await
    }

    #[tool(
        description = "Search public GitLab projects by keyword, programming language or topic. Returns name, path, description, URL, stars, forks, topics and last activity for each match. Examples: `{\"query\": \"root\"}`, `{\"language\": \"python\", \"topic\": \"physics\", \"sort_by\": \"stars\"}`"
    )]
    async fn search_repositories(
        &self,
        #[tool(param)]
        #[schemars(description = "Search keywords matched against project name and description")]
        query: Option<String>,
        #[tool(param)]
        #[schemars(description = "Filter by programming language (e.g. 'python', 'c++')")]
        language: Option<String>,
        #[tool(param)]
        #[schemars(description = "Filter by project topic (e.g. 'machine-learning')")]
        topic: Option<String>,
        #[tool(param)]
        #[schemars(
            description = "Sort field: 'last_activity_at' (default), 'name', 'created_at' or 'stars'"
        )]
        sort_by: Option<String>,
        #[tool(param)]
        #[schemars(description = "Sort order: 'desc' (default) or 'asc'")]
        order: Option<String>,
        #[tool(param)]
        #[schemars(description = "Number of results (default: 20, max: 100)")]
        per_page: Option<u32>,
    ) -> Result<CallToolResult, McpError> {
        let args = SearchRepositoriesArgs {
            query,
            language,
            topic,
            sort_by,
            order,
            per_page,
        };
        self.invoke(ToolName::SearchRepositories, args).await
    }

    #[tool(
        description = "Get detailed information about a GitLab project: description, default branch, visibility, statistics, languages, topics, license and timestamps."
    )]
    async fn get_project_info(
        &self,
        #[tool(param)]
        #[schemars(
            description = "Project identifier: a numeric ID (e.g. '12345') or a path (e.g. 'atlas/athena')"
        )]
        project: Option<String>,
    ) -> Result<CallToolResult, McpError> {
        self.invoke(ToolName::GetProjectInfo, ProjectArgs { project })
            .await
    }

    #[tool(
        description = "List files and directories in a GitLab repository, optionally under a sub-path, at a ref, or recursively."
    )]
    async fn list_repository_files(
        &self,
        #[tool(param)]
        #[schemars(
            description = "Project identifier: a numeric ID (e.g. '12345') or a path (e.g. 'atlas/athena')"
        )]
        project: Option<String>,
        #[tool(param)]
        #[schemars(description = "Sub-directory to list (default: repository root)")]
        path: Option<String>,
        #[tool(param)]
        #[serde(rename = "ref")]
        #[schemars(description = "Branch, tag or commit SHA (default: the default branch)")]
        git_ref: Option<String>,
        #[tool(param)]
        #[schemars(description = "List the tree recursively (default: false)")]
        recursive: Option<bool>,
        #[tool(param)]
        #[schemars(description = "Number of entries (default: 100, max: 100)")]
        per_page: Option<u32>,
    ) -> Result<CallToolResult, McpError> {
        let args = ListRepositoryFilesArgs {
            project,
            path,
            git_ref,
            recursive,
            per_page,
        };
        self.invoke(ToolName::ListRepositoryFiles, args).await
    }

    #[tool(
        description = "Read a file from a GitLab repository. Text files are returned decoded with a language hint; binary files are reported by size only."
    )]
    async fn get_file_content(
        &self,
        #[tool(param)]
        #[schemars(
            description = "Project identifier: a numeric ID (e.g. '12345') or a path (e.g. 'atlas/athena')"
        )]
        project: Option<String>,
        #[tool(param)]
        #[schemars(description = "Path of the file in the repository (e.g. 'src/main.py')")]
        file_path: Option<String>,
        #[tool(param)]
        #[serde(rename = "ref")]
        #[schemars(description = "Branch, tag or commit SHA (default: the default branch)")]
        git_ref: Option<String>,
    ) -> Result<CallToolResult, McpError> {
        let args = GetFileContentArgs {
            project,
            file_path,
            git_ref,
        };
        self.invoke(ToolName::GetFileContent, args).await
    }

    #[tool(
        description = "Get the README of a GitLab project. Common README names (README.md, README.rst, README.txt, README) are tried in order."
    )]
    async fn get_project_readme(
        &self,
        #[tool(param)]
        #[schemars(
            description = "Project identifier: a numeric ID (e.g. '12345') or a path (e.g. 'atlas/athena')"
        )]
        project: Option<String>,
        #[tool(param)]
        #[serde(rename = "ref")]
        #[schemars(description = "Branch, tag or commit SHA (default: the default branch)")]
        git_ref: Option<String>,
    ) -> Result<CallToolResult, McpError> {
        self.invoke(
            ToolName::GetProjectReadme,
            ProjectAtRefArgs { project, git_ref },
        )
        .await
    }

    #[tool(
        description = "Search for code or file names, globally or within one project. When the instance has no advanced search, a project search falls back to scanning the repository's text files directly. Examples: `{\"search_term\": \"TTree\", \"project\": \"atlas/athena\"}`, `{\"search_term\": \"CMakeLists\", \"scope\": \"filenames\"}`"
    )]
    async fn search_code(
        &self,
        #[tool(param)]
        #[schemars(description = "Text to search for")]
        search_term: Option<String>,
        #[tool(param)]
        #[schemars(
            description = "Project identifier to search within. Omit for a global search (requires advanced search on the instance)"
        )]
        project: Option<String>,
        #[tool(param)]
        #[schemars(description = "'blobs' to search file contents (default) or 'filenames'")]
        scope: Option<String>,
        #[tool(param)]
        #[schemars(description = "Number of results (default: 20, max: 100)")]
        per_page: Option<u32>,
    ) -> Result<CallToolResult, McpError> {
        let args = SearchCodeArgs {
            search_term,
            project,
            scope,
            per_page,
        };
        self.invoke(ToolName::SearchCode, args).await
    }

    #[tool(
        description = "Search issues by keyword, globally or within one project. Returns title, state, author, creation date, URL and a description snippet."
    )]
    async fn search_issues(
        &self,
        #[tool(param)]
        #[schemars(description = "Keywords matched against issue titles and descriptions")]
        search_term: Option<String>,
        #[tool(param)]
        #[schemars(description = "Optional project identifier to restrict the search")]
        project: Option<String>,
        #[tool(param)]
        #[schemars(description = "'opened', 'closed' or 'all' (default)")]
        state: Option<String>,
        #[tool(param)]
        #[schemars(description = "Number of results (default: 10, max: 100)")]
        per_page: Option<u32>,
    ) -> Result<CallToolResult, McpError> {
        let args = SearchIssuesArgs {
            search_term,
            project,
            state,
            per_page,
        };
        self.invoke(ToolName::SearchIssues, args).await
    }

    #[tool(
        description = "Access the wiki of a GitLab project. Lists all pages, or returns the content of one page when 'page_slug' is given."
    )]
    async fn get_wiki_pages(
        &self,
        #[tool(param)]
        #[schemars(
            description = "Project identifier: a numeric ID (e.g. '12345') or a path (e.g. 'atlas/athena')"
        )]
        project: Option<String>,
        #[tool(param)]
        #[schemars(description = "Slug of a page to read. Omit to list all pages")]
        page_slug: Option<String>,
    ) -> Result<CallToolResult, McpError> {
        self.invoke(
            ToolName::GetWikiPages,
            GetWikiPagesArgs { project, page_slug },
        )
        .await
    }

    #[tool(
        description = "Analyze the dependencies of a GitLab project by parsing manifests such as requirements.txt, pyproject.toml and CMakeLists.txt. Unparsed manifests include a content preview."
    )]
    async fn analyze_dependencies(
        &self,
        #[tool(param)]
        #[schemars(
            description = "Project identifier: a numeric ID (e.g. '12345') or a path (e.g. 'atlas/athena')"
        )]
        project: Option<String>,
        #[tool(param)]
        #[serde(rename = "ref")]
        #[schemars(description = "Branch, tag or commit SHA (default: the default branch)")]
        git_ref: Option<String>,
    ) -> Result<CallToolResult, McpError> {
        self.invoke(
            ToolName::AnalyzeDependencies,
            ProjectAtRefArgs { project, git_ref },
        )
        .await
    }

    #[tool(
        description = "Get the .gitlab-ci.yml of a GitLab project with a structural summary: stages, jobs, hidden job templates, includes, default image and variables."
    )]
    async fn get_ci_config(
        &self,
        #[tool(param)]
        #[schemars(
            description = "Project identifier: a numeric ID (e.g. '12345') or a path (e.g. 'atlas/athena')"
        )]
        project: Option<String>,
        #[tool(param)]
        #[serde(rename = "ref")]
        #[schemars(description = "Branch, tag or commit SHA (default: the default branch)")]
        git_ref: Option<String>,
    ) -> Result<CallToolResult, McpError> {
        self.invoke(ToolName::GetCiConfig, ProjectAtRefArgs { project, git_ref })
            .await
    }

    #[tool(
        description = "Get the build configuration of a GitLab project. Looks for CMakeLists.txt, Makefile, setup.py, setup.cfg, pyproject.toml, SConstruct, wscript and Dockerfile, and reports the detected build systems."
    )]
    async fn get_build_config(
        &self,
        #[tool(param)]
        #[schemars(
            description = "Project identifier: a numeric ID (e.g. '12345') or a path (e.g. 'atlas/athena')"
        )]
        project: Option<String>,
        #[tool(param)]
        #[serde(rename = "ref")]
        #[schemars(description = "Branch, tag or commit SHA (default: the default branch)")]
        git_ref: Option<String>,
    ) -> Result<CallToolResult, McpError> {
        self.invoke(
            ToolName::GetBuildConfig,
            ProjectAtRefArgs { project, git_ref },
        )
        .await
    }

    #[tool(
        description = "List releases of a GitLab project with tag, name, dates, author and asset counts."
    )]
    async fn list_releases(
        &self,
        #[tool(param)]
        #[schemars(
            description = "Project identifier: a numeric ID (e.g. '12345') or a path (e.g. 'atlas/athena')"
        )]
        project: Option<String>,
        #[tool(param)]
        #[schemars(description = "Number of releases (default: 20, max: 100)")]
        per_page: Option<u32>,
    ) -> Result<CallToolResult, McpError> {
        self.invoke(ToolName::ListReleases, ListReleasesArgs { project, per_page })
            .await
    }

    #[tool(
        description = "Get one release of a GitLab project by tag name, including release notes, asset links, source archives, commit and evidences."
    )]
    async fn get_release(
        &self,
        #[tool(param)]
        #[schemars(
            description = "Project identifier: a numeric ID (e.g. '12345') or a path (e.g. 'atlas/athena')"
        )]
        project: Option<String>,
        #[tool(param)]
        #[schemars(description = "Tag name of the release (e.g. 'v1.0.0')")]
        tag_name: Option<String>,
    ) -> Result<CallToolResult, McpError> {
        self.invoke(ToolName::GetRelease, GetReleaseArgs { project, tag_name })
            .await
    }

    #[tool(
        description = "List tags of a GitLab repository with their commits. Example: `{\"project\": \"atlas/athena\", \"search\": \"v1\", \"sort\": \"asc\"}`"
    )]
    async fn list_tags(
        &self,
        #[tool(param)]
        #[schemars(
            description = "Project identifier: a numeric ID (e.g. '12345') or a path (e.g. 'atlas/athena')"
        )]
        project: Option<String>,
        #[tool(param)]
        #[schemars(description = "Filter tags by name (e.g. 'v1')")]
        search: Option<String>,
        #[tool(param)]
        #[schemars(description = "'desc' (default, newest first) or 'asc'")]
        sort: Option<String>,
        #[tool(param)]
        #[schemars(description = "Number of tags (default: 20, max: 100)")]
        per_page: Option<u32>,
    ) -> Result<CallToolResult, McpError> {
        let args = ListTagsArgs {
            project,
            search,
            sort,
            per_page,
        };
        self.invoke(ToolName::ListTags, args).await
    }

    #[tool(
        description = "Inspect a GitLab project in one call: detected ecosystems, build systems, parsed dependencies (first 10 per manifest) and a CI summary."
    )]
    async fn inspect_project(
        &self,
        #[tool(param)]
        #[schemars(
            description = "Project identifier: a numeric ID (e.g. '12345') or a path (e.g. 'atlas/athena')"
        )]
        project: Option<String>,
        #[tool(param)]
        #[serde(rename = "ref")]
        #[schemars(description = "Branch, tag or commit SHA (default: the default branch)")]
        git_ref: Option<String>,
    ) -> Result<CallToolResult, McpError> {
        self.invoke(
            ToolName::InspectProject,
            ProjectAtRefArgs { project, git_ref },
        )
        .await
    }
}

#[tool(tool_box)]
impl ServerHandler for GitLabInsightTools {
    fn get_info(&self) -> ServerInfo {
        let settings = self.client.settings();
        let auth_status = if settings.is_authenticated() {
            "authenticated with a personal access token"
        } else {
            "anonymous, public projects only"
        };

        let instructions = format!(
            r#"GitLab Insight MCP Server - {url} ({auth_status})

## Overview
Read-only access to repositories on a GitLab instance: project search and
metadata, files and READMEs, code and issue search, wikis, dependency, build
and CI inspection, releases and tags.

Projects are identified by numeric ID (e.g. "12345") or full path
(e.g. "atlas/athena"). Tools that read files accept an optional "ref"
(branch, tag or commit SHA) and default to the project's default branch.

Every tool returns one JSON document. Failures are returned as
{{"error": "..."}}.

## Available Tools
{tools}

## Examples
```json
{{"name": "search_repositories", "arguments": {{"query": "root", "language": "c++"}}}}
{{"name": "inspect_project", "arguments": {{"project": "atlas/athena"}}}}
{{"name": "get_file_content", "arguments": {{"project": "12345", "file_path": "setup.py", "ref": "v1.2.0"}}}}
```"#,
            url = settings.gitlab_url,
            tools = self
                .registry
                .names()
                .iter()
                .map(|name| format!("- {name}"))
                .collect::<Vec<_>>()
                .join("\n"),
        );

        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(instructions),
        }
    }
}
