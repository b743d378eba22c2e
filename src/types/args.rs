//! Tool arguments as received over MCP or from the CLI's `--arguments` JSON.
//!
//! Every field is optional at the serde level; required arguments are checked
//! by the tool functions so a missing value yields a descriptive error.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SearchRepositoriesArgs {
    pub query: Option<String>,
    pub language: Option<String>,
    pub topic: Option<String>,
    /// `last_activity_at` (default), `name`, `created_at` or `stars`
    pub sort_by: Option<String>,
    /// `asc` or `desc` (default)
    pub order: Option<String>,
    pub per_page: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ProjectArgs {
    pub project: Option<String>,
}

/// Arguments for tools that read files at a ref of one project
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ProjectAtRefArgs {
    pub project: Option<String>,
    #[serde(rename = "ref")]
    pub git_ref: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ListRepositoryFilesArgs {
    pub project: Option<String>,
    pub path: Option<String>,
    #[serde(rename = "ref")]
    pub git_ref: Option<String>,
    pub recursive: Option<bool>,
    pub per_page: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct GetFileContentArgs {
    pub project: Option<String>,
    pub file_path: Option<String>,
    #[serde(rename = "ref")]
    pub git_ref: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SearchCodeArgs {
    pub search_term: Option<String>,
    pub project: Option<String>,
    /// `blobs` (default) or `filenames`
    pub scope: Option<String>,
    pub per_page: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SearchIssuesArgs {
    pub search_term: Option<String>,
    pub project: Option<String>,
    /// `opened`, `closed` or `all` (default)
    pub state: Option<String>,
    pub per_page: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct GetWikiPagesArgs {
    pub project: Option<String>,
    pub page_slug: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ListReleasesArgs {
    pub project: Option<String>,
    pub per_page: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct GetReleaseArgs {
    pub project: Option<String>,
    pub tag_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ListTagsArgs {
    pub project: Option<String>,
    pub search: Option<String>,
    /// `asc` or `desc`; anything else keeps GitLab's default ordering
    pub sort: Option<String>,
    pub per_page: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ref_field_is_named_ref() {
        let args: ProjectAtRefArgs =
            serde_json::from_value(json!({"project": "atlas/athena", "ref": "v1"})).unwrap();
        assert_eq!(args.git_ref.as_deref(), Some("v1"));
        assert_eq!(
            serde_json::to_value(&args).unwrap(),
            json!({"project": "atlas/athena", "ref": "v1"})
        );
    }

    #[test]
    fn test_missing_and_null_fields_are_none() {
        let args: SearchCodeArgs =
            serde_json::from_value(json!({"search_term": "RooFit", "project": null})).unwrap();
        assert_eq!(args.search_term.as_deref(), Some("RooFit"));
        assert!(args.project.is_none());
        assert!(args.per_page.is_none());
    }

    #[test]
    fn test_schema_lists_properties() {
        let schema = schemars::schema_for!(ListRepositoryFilesArgs);
        let value = serde_json::to_value(&schema).unwrap();
        let properties = value["properties"].as_object().unwrap();
        assert!(properties.contains_key("ref"));
        assert!(properties.contains_key("recursive"));
    }
}
