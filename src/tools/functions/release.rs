use super::common::{from_response, list_from_response, non_blank, required, required_project};
use crate::gitlab::{GitLabClient, GitLabError, QueryParams};
use crate::tools::error::ToolError;
use crate::types::{
    GetReleaseArgs, GitLabRelease, ListReleasesArgs, ListTagsArgs, ReleaseDetail, ReleaseList,
    ReleaseLookup, ReleaseSummary, Tag, TagList,
};

const DEFAULT_RELEASE_PER_PAGE: u32 = 20;
const DEFAULT_TAG_PER_PAGE: u32 = 20;
const PROJECT_NOT_FOUND: &str = "Project not found";

pub async fn list_releases(
    client: &GitLabClient,
    args: ListReleasesArgs,
) -> Result<ReleaseList, ToolError> {
    let project = required_project(args.project.as_deref())?;
    let per_page = client
        .settings()
        .clamp_per_page(args.per_page, DEFAULT_RELEASE_PER_PAGE);

    let path = format!("{}/releases", project.api_path());
    let params = QueryParams::new().with("per_page", per_page);

    let (releases, note) = match client.get(&path, Some(&params)).await {
        Ok(value) => (list_from_response::<GitLabRelease>(value, &path)?, None),
        Err(GitLabError::NotFound { .. }) => (Vec::new(), Some(PROJECT_NOT_FOUND.to_string())),
        Err(e) => return Err(e.into()),
    };

    Ok(ReleaseList {
        project: project.to_string(),
        total_releases: releases.len(),
        releases: releases.into_iter().map(ReleaseSummary::from).collect(),
        note,
    })
}

/// A single release by tag, with assets, commit and evidences.
pub async fn get_release(
    client: &GitLabClient,
    args: GetReleaseArgs,
) -> Result<ReleaseLookup, ToolError> {
    let project = required_project(args.project.as_deref())?;
    let tag_name = required(args.tag_name.as_deref(), "tag_name")?;

    let path = format!(
        "{}/releases/{}",
        project.api_path(),
        urlencoding::encode(&tag_name)
    );

    match client.get(&path, None).await {
        Ok(value) => {
            let release: GitLabRelease = from_response(value, &path)?;
            Ok(ReleaseLookup {
                project: project.to_string(),
                found: true,
                tag_name: release.tag_name.clone().or(Some(tag_name)),
                error: None,
                release: Some(ReleaseDetail::from(release)),
            })
        }
        Err(GitLabError::NotFound { .. }) => Ok(ReleaseLookup {
            project: project.to_string(),
            found: false,
            error: Some(format!("Release '{tag_name}' not found")),
            tag_name: Some(tag_name),
            release: None,
        }),
        Err(e) => Err(e.into()),
    }
}

/// Repository tags, optionally filtered by name. Only `asc` and `desc` are
/// forwarded as sort orders.
pub async fn list_tags(client: &GitLabClient, args: ListTagsArgs) -> Result<TagList, ToolError> {
    let project = required_project(args.project.as_deref())?;
    let per_page = client
        .settings()
        .clamp_per_page(args.per_page, DEFAULT_TAG_PER_PAGE);
    let sort = non_blank(args.sort.as_deref()).filter(|s| s == "asc" || s == "desc");

    let path = format!("{}/repository/tags", project.api_path());
    let params = QueryParams::new()
        .with_opt("search", non_blank(args.search.as_deref()))
        .with_opt("sort", sort)
        .with("per_page", per_page);

    let (tags, note) = match client.get(&path, Some(&params)).await {
        Ok(value) => (list_from_response::<Tag>(value, &path)?, None),
        Err(GitLabError::NotFound { .. }) => (Vec::new(), Some(PROJECT_NOT_FOUND.to_string())),
        Err(e) => return Err(e.into()),
    };

    Ok(TagList {
        project: project.to_string(),
        total_tags: tags.len(),
        tags,
        note,
    })
}
