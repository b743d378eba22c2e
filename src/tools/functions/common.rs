//! Helpers shared by the tool functions: argument checks, ref resolution and
//! file fetching.

use std::collections::HashMap;

use futures::stream::{self, StreamExt};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::analysis::file_kind;
use crate::gitlab::{GitLabClient, GitLabError, QueryParams};
use crate::tools::error::ToolError;
use crate::types::{ProjectRef, RepositoryFile};

/// Upper bound on concurrent file fetches issued by one tool call
pub const MAX_CONCURRENT_FETCHES: usize = 10;

/// Branch used when the project does not report a default branch
pub const FALLBACK_BRANCH: &str = "main";

/// Trimmed value, or `None` when absent or blank.
pub fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

pub fn required(value: Option<&str>, name: &str) -> Result<String, ToolError> {
    non_blank(value).ok_or_else(|| ToolError::missing(name))
}

pub fn required_project(value: Option<&str>) -> Result<ProjectRef, ToolError> {
    value
        .and_then(ProjectRef::parse)
        .ok_or_else(|| ToolError::missing("project"))
}

/// Deserialize an API response body into `T`.
pub fn from_response<T: DeserializeOwned>(value: Value, path: &str) -> Result<T, GitLabError> {
    serde_json::from_value(value)
        .map_err(|e| GitLabError::api(200, format!("Unexpected response from {path}: {e}")))
}

/// Deserialize a list endpoint body. Anything other than an array is
/// treated as an empty list.
pub fn list_from_response<T: DeserializeOwned>(
    value: Value,
    path: &str,
) -> Result<Vec<T>, GitLabError> {
    match value {
        Value::Array(_) => from_response(value, path),
        _ => Ok(Vec::new()),
    }
}

/// `/projects/{id}/repository/files/{encoded path}`
pub fn file_api_path(project: &ProjectRef, path: &str) -> String {
    format!(
        "{}/repository/files/{}",
        project.api_path(),
        urlencoding::encode(path)
    )
}

/// The requested ref, or the project's default branch when none was given.
pub async fn resolve_ref(
    client: &GitLabClient,
    project: &ProjectRef,
    requested: Option<&str>,
) -> Result<String, GitLabError> {
    if let Some(git_ref) = non_blank(requested) {
        return Ok(git_ref);
    }

    let params = QueryParams::new().with("statistics", "false");
    let data = client.get(&project.api_path(), Some(&params)).await?;
    Ok(data
        .get("default_branch")
        .and_then(Value::as_str)
        .unwrap_or(FALLBACK_BRANCH)
        .to_string())
}

/// Fetch a repository file's metadata and raw payload.
pub async fn get_repository_file(
    client: &GitLabClient,
    project: &ProjectRef,
    path: &str,
    git_ref: &str,
) -> Result<RepositoryFile, GitLabError> {
    let api_path = file_api_path(project, path);
    let params = QueryParams::new().with("ref", git_ref);
    let value = client.get(&api_path, Some(&params)).await?;
    from_response(value, &api_path)
}

/// Decoded text of a file, or `None` if it does not exist at `git_ref`.
pub async fn fetch_file(
    client: &GitLabClient,
    project: &ProjectRef,
    path: &str,
    git_ref: &str,
) -> Result<Option<String>, GitLabError> {
    match get_repository_file(client, project, path, git_ref).await {
        Ok(file) => Ok(Some(file_kind::decode_content_or_raw(
            &file.content,
            file.encoding(),
        ))),
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => Err(e),
    }
}

/// Fetch several files concurrently. Missing files are left out of the map;
/// any other failure aborts the whole fetch.
pub async fn fetch_files(
    client: &GitLabClient,
    project: &ProjectRef,
    paths: &[&str],
    git_ref: &str,
) -> Result<HashMap<String, String>, GitLabError> {
    let owned: Vec<String> = paths.iter().map(|path| path.to_string()).collect();
    let fetched: Vec<Result<(String, Option<String>), GitLabError>> = stream::iter(owned)
        .map(|path: String| async move {
            let content = fetch_file(client, project, &path, git_ref).await?;
            Ok((path, content))
        })
        .buffer_unordered(MAX_CONCURRENT_FETCHES)
        .collect()
        .await;

    let mut found = HashMap::new();
    for result in fetched {
        if let (path, Some(content)) = result? {
            found.insert(path, content);
        }
    }
    Ok(found)
}

/// Append `value` unless already present, keeping first-seen order.
pub fn push_unique(values: &mut Vec<String>, value: &str) {
    if !values.iter().any(|v| v == value) {
        values.push(value.to_string());
    }
}
