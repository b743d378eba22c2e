use serde_json::{Map, Value};

use super::common::{from_response, list_from_response, non_blank, required_project};
use crate::gitlab::{GitLabClient, QueryParams};
use crate::tools::error::ToolError;
use crate::types::{
    GitLabProject, ProjectArgs, ProjectDetail, ProjectSummary, SearchRepositoriesArgs,
};

const DEFAULT_SEARCH_PER_PAGE: u32 = 20;
const DEFAULT_ORDER_BY: &str = "last_activity_at";
const DEFAULT_SORT: &str = "desc";

/// Search public projects by keyword, language and topic.
pub async fn search_repositories(
    client: &GitLabClient,
    args: SearchRepositoriesArgs,
) -> Result<Vec<ProjectSummary>, ToolError> {
    let order_by = match non_blank(args.sort_by.as_deref()) {
        Some(sort_by) if sort_by == "stars" => "star_count".to_string(),
        Some(sort_by) => sort_by,
        None => DEFAULT_ORDER_BY.to_string(),
    };
    let per_page = client
        .settings()
        .clamp_per_page(args.per_page, DEFAULT_SEARCH_PER_PAGE);

    let params = QueryParams::new()
        .with("visibility", "public")
        .with_opt("search", non_blank(args.query.as_deref()))
        .with_opt(
            "with_programming_language",
            non_blank(args.language.as_deref()),
        )
        .with_opt("topic", non_blank(args.topic.as_deref()))
        .with("order_by", order_by)
        .with(
            "sort",
            non_blank(args.order.as_deref()).unwrap_or_else(|| DEFAULT_SORT.to_string()),
        )
        .with("per_page", per_page);

    let projects: Vec<GitLabProject> =
        list_from_response(client.get("/projects", Some(&params)).await?, "/projects")?;

    Ok(projects.into_iter().map(ProjectSummary::from).collect())
}

/// Project metadata with statistics and the language breakdown.
///
/// A failed languages lookup degrades to an empty map.
pub async fn get_project_info(
    client: &GitLabClient,
    args: ProjectArgs,
) -> Result<ProjectDetail, ToolError> {
    let project = required_project(args.project.as_deref())?;
    let path = project.api_path();

    let params = QueryParams::new().with("statistics", "true");
    let data: GitLabProject = from_response(client.get(&path, Some(&params)).await?, &path)?;

    let languages = match client.get(&format!("{path}/languages"), None).await {
        Ok(Value::Object(languages)) => languages,
        Ok(_) => Map::new(),
        Err(e) => {
            tracing::warn!("Failed to fetch languages for {}: {}", project, e);
            Map::new()
        }
    };

    Ok(ProjectDetail::new(data, languages))
}
