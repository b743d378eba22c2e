use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::null_as_default;

/// Project identifier accepted by every project-scoped tool: a numeric id
/// (`"12345"`) or a full path (`"atlas/athena"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProjectRef(String);

impl ProjectRef {
    /// `None` for blank input.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        (!value.is_empty()).then(|| Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_numeric_id(&self) -> bool {
        self.0.chars().all(|c| c.is_ascii_digit())
    }

    /// Path segment form: ids pass through, paths are fully percent-encoded.
    pub fn encoded(&self) -> Cow<'_, str> {
        if self.is_numeric_id() {
            Cow::Borrowed(&self.0)
        } else {
            urlencoding::encode(&self.0)
        }
    }

    /// `/projects/{encoded}`
    pub fn api_path(&self) -> String {
        format!("/projects/{}", self.encoded())
    }
}

impl fmt::Display for ProjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Project as returned by `GET /projects` and `GET /projects/:id`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GitLabProject {
    pub id: Option<u64>,
    pub name: Option<String>,
    pub path_with_namespace: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    pub web_url: Option<String>,
    pub default_branch: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub topics: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub star_count: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub forks_count: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub open_issues_count: u64,
    pub last_activity_at: Option<String>,
    pub created_at: Option<String>,
    pub visibility: Option<String>,
    pub readme_url: Option<String>,
    pub license: Option<GitLabLicense>,
    pub namespace: Option<GitLabNamespace>,
    pub statistics: Option<ProjectStatistics>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GitLabLicense {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GitLabNamespace {
    pub name: Option<String>,
    pub full_path: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectStatistics {
    #[serde(default, deserialize_with = "null_as_default")]
    pub commit_count: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub repository_size: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub storage_size: u64,
}

/// Search result entry for `search_repositories`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSummary {
    pub id: Option<u64>,
    pub name: Option<String>,
    pub path_with_namespace: Option<String>,
    pub description: String,
    pub web_url: Option<String>,
    pub default_branch: Option<String>,
    pub topics: Vec<String>,
    pub star_count: u64,
    pub forks_count: u64,
    pub last_activity_at: Option<String>,
    pub created_at: Option<String>,
    pub visibility: Option<String>,
}

impl From<GitLabProject> for ProjectSummary {
    fn from(project: GitLabProject) -> Self {
        Self {
            id: project.id,
            name: project.name,
            path_with_namespace: project.path_with_namespace,
            description: project.description,
            web_url: project.web_url,
            default_branch: project.default_branch,
            topics: project.topics,
            star_count: project.star_count,
            forks_count: project.forks_count,
            last_activity_at: project.last_activity_at,
            created_at: project.created_at,
            visibility: project.visibility,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NamespaceInfo {
    pub name: Option<String>,
    pub path: Option<String>,
}

/// Result of `get_project_info`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectDetail {
    pub id: Option<u64>,
    pub name: Option<String>,
    pub path_with_namespace: Option<String>,
    pub description: String,
    pub web_url: Option<String>,
    pub default_branch: Option<String>,
    pub visibility: Option<String>,
    pub topics: Vec<String>,
    pub star_count: u64,
    pub forks_count: u64,
    pub open_issues_count: u64,
    pub created_at: Option<String>,
    pub last_activity_at: Option<String>,
    /// Language name to percentage of the repository
    pub languages: Map<String, Value>,
    pub readme_url: Option<String>,
    pub license: Option<String>,
    pub namespace: NamespaceInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statistics: Option<ProjectStatistics>,
}

impl ProjectDetail {
    pub fn new(project: GitLabProject, languages: Map<String, Value>) -> Self {
        let namespace = project.namespace.unwrap_or_default();
        Self {
            id: project.id,
            name: project.name,
            path_with_namespace: project.path_with_namespace,
            description: project.description,
            web_url: project.web_url,
            default_branch: project.default_branch,
            visibility: project.visibility,
            topics: project.topics,
            star_count: project.star_count,
            forks_count: project.forks_count,
            open_issues_count: project.open_issues_count,
            created_at: project.created_at,
            last_activity_at: project.last_activity_at,
            languages,
            readme_url: project.readme_url,
            license: project.license.and_then(|license| license.name),
            namespace: NamespaceInfo {
                name: namespace.name,
                path: namespace.full_path,
            },
            statistics: project.statistics,
        }
    }
}
