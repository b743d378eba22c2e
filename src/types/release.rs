use serde::{Deserialize, Serialize};

use super::null_as_default;
use super::search::GitLabUser;

/// Release as returned by `GET /projects/:id/releases[/:tag]`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GitLabRelease {
    pub tag_name: Option<String>,
    pub name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    pub created_at: Option<String>,
    pub released_at: Option<String>,
    pub author: Option<GitLabUser>,
    pub commit: Option<CommitInfo>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub assets: ReleaseAssets,
    #[serde(default, deserialize_with = "null_as_default")]
    pub evidences: Vec<Evidence>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommitInfo {
    pub id: Option<String>,
    pub short_id: Option<String>,
    pub title: Option<String>,
    pub created_at: Option<String>,
    pub author_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReleaseAssets {
    #[serde(default, deserialize_with = "null_as_default")]
    pub links: Vec<AssetLink>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sources: Vec<AssetSource>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetLink {
    pub name: Option<String>,
    pub url: Option<String>,
    pub link_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetSource {
    pub format: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    pub sha: Option<String>,
    pub collected_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleaseSummary {
    pub tag_name: Option<String>,
    pub name: Option<String>,
    pub description: String,
    pub created_at: Option<String>,
    pub released_at: Option<String>,
    pub author: Option<String>,
    /// Short SHA of the tagged commit
    pub commit_path: Option<String>,
    pub assets_count: usize,
    pub sources_count: usize,
}

impl From<GitLabRelease> for ReleaseSummary {
    fn from(release: GitLabRelease) -> Self {
        Self {
            tag_name: release.tag_name,
            name: release.name,
            description: release.description,
            created_at: release.created_at,
            released_at: release.released_at,
            author: release.author.and_then(|a| a.username),
            commit_path: release.commit.and_then(|c| c.short_id),
            assets_count: release.assets.links.len(),
            sources_count: release.assets.sources.len(),
        }
    }
}

/// Result of `list_releases`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleaseList {
    pub project: String,
    pub total_releases: usize,
    pub releases: Vec<ReleaseSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleaseDetail {
    pub name: Option<String>,
    pub description: String,
    pub created_at: Option<String>,
    pub released_at: Option<String>,
    pub author: Option<String>,
    pub commit: CommitInfo,
    pub assets: ReleaseAssets,
    pub evidences: Vec<Evidence>,
}

impl From<GitLabRelease> for ReleaseDetail {
    fn from(release: GitLabRelease) -> Self {
        Self {
            name: release.name,
            description: release.description,
            created_at: release.created_at,
            released_at: release.released_at,
            author: release.author.and_then(|a| a.username),
            commit: release.commit.unwrap_or_default(),
            assets: release.assets,
            evidences: release.evidences,
        }
    }
}

/// Result of `get_release`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReleaseLookup {
    pub project: String,
    pub found: bool,
    pub tag_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(flatten)]
    pub release: Option<ReleaseDetail>,
}

/// Tag from `GET /projects/:id/repository/tags`, also the tool output shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
    pub target: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub commit: CommitInfo,
    #[serde(default, deserialize_with = "null_as_default")]
    pub protected: bool,
}

/// Result of `list_tags`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagList {
    pub project: String,
    pub total_tags: usize,
    pub tags: Vec<Tag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}
