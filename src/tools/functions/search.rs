use super::common::{fetch_files, list_from_response, non_blank, required};
use crate::analysis::file_kind;
use crate::gitlab::{GitLabClient, GitLabError, QueryParams};
use crate::tools::error::ToolError;
use crate::types::{
    CodeMatch, CodeSearchResult, CodeSearchScope, GitLabCodeHit, GitLabIssue, IssueSearchResult,
    IssueSummary, ProjectRef, SearchCodeArgs, SearchIssuesArgs, TreeEntry,
};

const DEFAULT_CODE_PER_PAGE: u32 = 20;
const DEFAULT_ISSUE_PER_PAGE: u32 = 10;
const DEFAULT_ISSUE_STATE: &str = "all";
const GLOBAL_SCOPE_LABEL: &str = "(global)";
const DESCRIPTION_SNIPPET_CHARS: usize = 200;

/// Tree page size for the fallback scan
const FALLBACK_TREE_PER_PAGE: u32 = 500;
/// Most files downloaded by one fallback scan
const FALLBACK_MAX_FILES: usize = 100;
const FALLBACK_REF: &str = "HEAD";

const CODE_SEARCH_AUTH_REQUIRED: &str = "Code search requires authentication on this GitLab \
     instance. Set GITLAB_INSIGHT_TOKEN to a personal access token with the 'read_api' scope.";
const ADVANCED_SEARCH_REQUIRED: &str = "Searching code across all projects requires advanced \
     search, which is not enabled on this GitLab instance. Pass a 'project' to search within a \
     single repository instead.";
const ISSUE_SEARCH_AUTH_REQUIRED: &str = "Issue search requires authentication. Set \
     GITLAB_INSIGHT_TOKEN to a personal access token with the 'read_api' scope.";

/// Code or filename search, globally or within one project.
///
/// When the instance rejects a project search (no advanced search), the
/// project's default branch is scanned directly instead.
pub async fn search_code(
    client: &GitLabClient,
    args: SearchCodeArgs,
) -> Result<CodeSearchResult, ToolError> {
    let search_term = required(args.search_term.as_deref(), "search_term")?;
    let scope = CodeSearchScope::parse_lenient(args.scope.as_deref());
    let per_page = client
        .settings()
        .clamp_per_page(args.per_page, DEFAULT_CODE_PER_PAGE);
    let project = args.project.as_deref().and_then(ProjectRef::parse);

    let params = QueryParams::new()
        .with("search", &search_term)
        .with("scope", scope.as_str())
        .with("per_page", per_page);
    let path = match &project {
        Some(project) => format!("{}/search", project.api_path()),
        None => "/search".to_string(),
    };

    let mut result = CodeSearchResult {
        search_term: search_term.clone(),
        scope,
        project: project
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_else(|| GLOBAL_SCOPE_LABEL.to_string()),
        total_results: 0,
        results: Vec::new(),
        note: None,
        error: None,
    };

    match client.get(&path, Some(&params)).await {
        Ok(value) => {
            let hits: Vec<GitLabCodeHit> = list_from_response(value, &path)?;
            result.results = hits
                .into_iter()
                .map(|hit| CodeMatch::from_hit(hit, scope))
                .collect();
        }
        Err(GitLabError::Authentication) => {
            result.error = Some(CODE_SEARCH_AUTH_REQUIRED.to_string());
        }
        Err(GitLabError::Api { status: 400, .. }) => match &project {
            None => result.error = Some(ADVANCED_SEARCH_REQUIRED.to_string()),
            Some(project) => {
                tracing::info!(
                    "Search API unavailable for {}, scanning repository files instead",
                    project
                );
                result.results =
                    scan_repository(client, project, &search_term, scope, per_page as usize)
                        .await?;
                result.note = Some(format!(
                    "Advanced search is not available on this instance. Results come from a \
                     direct scan of up to {FALLBACK_MAX_FILES} text files on the default branch."
                ));
            }
        },
        Err(e) => return Err(e.into()),
    }

    result.total_results = result.results.len();
    Ok(result)
}

/// Case-insensitive scan of the repository tree at [`FALLBACK_REF`].
async fn scan_repository(
    client: &GitLabClient,
    project: &ProjectRef,
    search_term: &str,
    scope: CodeSearchScope,
    limit: usize,
) -> Result<Vec<CodeMatch>, GitLabError> {
    let tree_path = format!("{}/repository/tree", project.api_path());
    let params = QueryParams::new()
        .with("recursive", "true")
        .with("per_page", FALLBACK_TREE_PER_PAGE);
    let entries: Vec<TreeEntry> =
        list_from_response(client.get(&tree_path, Some(&params)).await?, &tree_path)?;

    let paths: Vec<String> = entries
        .into_iter()
        .filter(TreeEntry::is_file)
        .filter_map(|entry| entry.path)
        .collect();
    let needle = search_term.to_lowercase();

    let file_match = |path: &str, data: Option<String>, startline: Option<u64>| CodeMatch {
        file_name: Some(file_kind::file_name(path).to_string()),
        file_path: Some(path.to_string()),
        project_id: None,
        data,
        git_ref: Some(FALLBACK_REF.to_string()),
        startline,
    };

    if scope == CodeSearchScope::Filenames {
        return Ok(paths
            .iter()
            .filter(|path| file_kind::file_name(path).to_lowercase().contains(&needle))
            .take(limit)
            .map(|path| file_match(path.as_str(), None, None))
            .collect());
    }

    let candidates: Vec<&str> = paths
        .iter()
        .map(String::as_str)
        .filter(|path| !file_kind::is_binary(path))
        .take(FALLBACK_MAX_FILES)
        .collect();
    let contents = fetch_files(client, project, &candidates, FALLBACK_REF).await?;

    let mut matches = Vec::new();
    for path in candidates {
        let Some(content) = contents.get(path) else {
            continue;
        };
        for (index, line) in content.lines().enumerate() {
            if line.to_lowercase().contains(&needle) {
                matches.push(file_match(
                    path,
                    Some(line.trim_end().to_string()),
                    Some(index as u64 + 1),
                ));
                if matches.len() >= limit {
                    return Ok(matches);
                }
            }
        }
    }

    Ok(matches)
}

/// Keyword search over issues, globally or within one project.
pub async fn search_issues(
    client: &GitLabClient,
    args: SearchIssuesArgs,
) -> Result<IssueSearchResult, ToolError> {
    let search_term = required(args.search_term.as_deref(), "search_term")?;
    let project = args.project.as_deref().and_then(ProjectRef::parse);
    let per_page = client
        .settings()
        .clamp_per_page(args.per_page, DEFAULT_ISSUE_PER_PAGE);

    let params = QueryParams::new()
        .with("search", &search_term)
        .with("scope", "all")
        .with(
            "state",
            non_blank(args.state.as_deref()).unwrap_or_else(|| DEFAULT_ISSUE_STATE.to_string()),
        )
        .with("per_page", per_page);

    let (path, scope) = match &project {
        Some(project) => (
            format!("{}/issues", project.api_path()),
            format!("project '{project}'"),
        ),
        None => ("/issues".to_string(), "all projects".to_string()),
    };

    let mut result = IssueSearchResult {
        search_term,
        scope,
        count: 0,
        issues: Vec::new(),
        error: None,
    };

    match client.get(&path, Some(&params)).await {
        Ok(value) => {
            let issues: Vec<GitLabIssue> = list_from_response(value, &path)?;
            result.issues = issues.into_iter().map(summarize_issue).collect();
        }
        Err(GitLabError::Authentication) => {
            result.error = Some(ISSUE_SEARCH_AUTH_REQUIRED.to_string());
        }
        Err(e) => return Err(e.into()),
    }

    result.count = result.issues.len();
    Ok(result)
}

fn summarize_issue(issue: GitLabIssue) -> IssueSummary {
    IssueSummary {
        title: issue.title,
        description_snippet: file_kind::preview(&issue.description, DESCRIPTION_SNIPPET_CHARS),
        state: issue.state,
        web_url: issue.web_url,
        author: issue.author.and_then(|author| author.name),
        created_at: issue.created_at,
    }
}
