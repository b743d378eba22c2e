use serde::{Deserialize, Serialize};

/// Wiki page from `GET /projects/:id/wikis[/:slug]`. `content` is only
/// present for single-page lookups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WikiPage {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
}

/// Result of `get_wiki_pages`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum WikiLookup {
    List {
        project: String,
        mode: &'static str,
        total_pages: usize,
        pages: Vec<WikiPage>,
    },
    Detail {
        project: String,
        mode: &'static str,
        page: WikiPage,
    },
    Unavailable {
        project: String,
        error: String,
        pages: Vec<WikiPage>,
    },
}
