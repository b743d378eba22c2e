use serde::{Deserialize, Serialize};

use super::null_as_default;

/// Entry of `GET /projects/:id/repository/tree`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeEntry {
    pub name: Option<String>,
    /// `blob` for files, `tree` for directories
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub path: Option<String>,
    pub mode: Option<String>,
}

impl TreeEntry {
    pub fn is_file(&self) -> bool {
        self.kind.as_deref() == Some("blob")
    }

    pub fn is_directory(&self) -> bool {
        self.kind.as_deref() == Some("tree")
    }
}

/// Result of `list_repository_files`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryTree {
    pub project: String,
    pub path: String,
    #[serde(rename = "ref")]
    pub git_ref: String,
    pub total_entries: usize,
    pub directories: Vec<TreeEntry>,
    pub files: Vec<TreeEntry>,
}

/// Response of `GET /projects/:id/repository/files/:path`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RepositoryFile {
    pub file_name: Option<String>,
    pub file_path: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub size: u64,
    pub encoding: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
    #[serde(rename = "ref")]
    pub git_ref: Option<String>,
    pub last_commit_id: Option<String>,
    pub content_sha256: Option<String>,
}

impl RepositoryFile {
    /// Encoding declared by GitLab, `base64` when absent.
    pub fn encoding(&self) -> &str {
        self.encoding.as_deref().unwrap_or("base64")
    }
}

/// Result of `get_file_content`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileContent {
    pub file_name: String,
    pub file_path: String,
    pub size: u64,
    #[serde(rename = "ref")]
    pub git_ref: String,
    pub last_commit_id: Option<String>,
    pub content_sha256: Option<String>,
    pub is_binary: bool,
    pub content: String,
    pub language: Option<String>,
}

/// Result of `get_project_readme`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReadmeLookup {
    Found {
        file_name: String,
        file_path: String,
        #[serde(rename = "ref")]
        git_ref: String,
        size: u64,
        content: String,
        format: String,
    },
    Missing {
        error: String,
        tried: Vec<String>,
        content: Option<String>,
    },
}
