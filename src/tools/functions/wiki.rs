use super::common::{from_response, list_from_response, non_blank, required_project};
use crate::gitlab::{GitLabClient, GitLabError, QueryParams};
use crate::tools::error::ToolError;
use crate::types::{GetWikiPagesArgs, WikiLookup, WikiPage};

const WIKI_NOT_FOUND: &str = "Wiki not found or not enabled for this project";
const WIKI_ACCESS_DENIED: &str = "Wiki access denied, the project may require authentication";

/// Lists wiki pages, or returns one page with content when `page_slug` is set.
pub async fn get_wiki_pages(
    client: &GitLabClient,
    args: GetWikiPagesArgs,
) -> Result<WikiLookup, ToolError> {
    let project = required_project(args.project.as_deref())?;
    let wikis_path = format!("{}/wikis", project.api_path());

    let lookup = match non_blank(args.page_slug.as_deref()) {
        Some(slug) => {
            let path = format!("{wikis_path}/{}", urlencoding::encode(&slug));
            client
                .get(&path, None)
                .await
                .and_then(|value| from_response::<WikiPage>(value, &path))
                .map(|mut page| {
                    if page.content.is_none() {
                        page.content = Some(String::new());
                    }
                    WikiLookup::Detail {
                        project: project.to_string(),
                        mode: "detail",
                        page,
                    }
                })
        }
        None => {
            let params = QueryParams::new().with("with_content", "false");
            client
                .get(&wikis_path, Some(&params))
                .await
                .and_then(|value| list_from_response::<WikiPage>(value, &wikis_path))
                .map(|pages| WikiLookup::List {
                    project: project.to_string(),
                    mode: "list",
                    total_pages: pages.len(),
                    pages: pages.into_iter().map(summary_only).collect(),
                })
        }
    };

    match lookup {
        Ok(lookup) => Ok(lookup),
        Err(GitLabError::NotFound { .. }) => Ok(unavailable(&project, WIKI_NOT_FOUND)),
        Err(GitLabError::Api { status: 403, .. }) => {
            Ok(unavailable(&project, WIKI_ACCESS_DENIED))
        }
        Err(e) => Err(e.into()),
    }
}

fn summary_only(page: WikiPage) -> WikiPage {
    WikiPage {
        content: None,
        encoding: None,
        ..page
    }
}

fn unavailable(project: impl ToString, error: &str) -> WikiLookup {
    WikiLookup::Unavailable {
        project: project.to_string(),
        error: error.to_string(),
        pages: Vec::new(),
    }
}
