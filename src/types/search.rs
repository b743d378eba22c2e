use serde::{Deserialize, Serialize};

use super::null_as_default;

/// Code search scope accepted by the GitLab search API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodeSearchScope {
    #[default]
    Blobs,
    Filenames,
}

impl CodeSearchScope {
    /// Unknown values fall back to `blobs`.
    pub fn parse_lenient(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("filenames") => Self::Filenames,
            _ => Self::Blobs,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Blobs => "blobs",
            Self::Filenames => "filenames",
        }
    }
}

/// Entry of `GET /search` and `GET /projects/:id/search` for code scopes
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GitLabCodeHit {
    pub filename: Option<String>,
    pub path: Option<String>,
    pub project_id: Option<u64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: String,
    #[serde(rename = "ref")]
    pub git_ref: Option<String>,
    pub startline: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeMatch {
    pub file_name: Option<String>,
    pub file_path: Option<String>,
    pub project_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(rename = "ref")]
    pub git_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub startline: Option<u64>,
}

impl CodeMatch {
    pub fn from_hit(hit: GitLabCodeHit, scope: CodeSearchScope) -> Self {
        let blob = scope == CodeSearchScope::Blobs;
        Self {
            file_name: hit.filename,
            file_path: hit.path,
            project_id: hit.project_id,
            data: blob.then_some(hit.data),
            git_ref: hit.git_ref,
            startline: if blob { hit.startline } else { None },
        }
    }
}

/// Result of `search_code`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeSearchResult {
    pub search_term: String,
    pub scope: CodeSearchScope,
    /// Project searched, or `(global)`
    pub project: String,
    pub total_results: usize,
    pub results: Vec<CodeMatch>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Issue as returned by the issues API
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GitLabIssue {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    pub state: Option<String>,
    pub web_url: Option<String>,
    pub author: Option<GitLabUser>,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GitLabUser {
    pub name: Option<String>,
    pub username: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueSummary {
    pub title: Option<String>,
    pub description_snippet: String,
    pub state: Option<String>,
    pub web_url: Option<String>,
    pub author: Option<String>,
    pub created_at: Option<String>,
}

/// Result of `search_issues`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueSearchResult {
    pub search_term: String,
    pub scope: String,
    pub count: usize,
    pub issues: Vec<IssueSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
