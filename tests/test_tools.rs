//! Tool behavior against a mocked GitLab API
//!
//! Tools are called through their functions for typed assertions, and
//! through the registry where the JSON surface matters.

use mockito::{Matcher, ServerGuard};
use serde_json::{Value, json};

use gitlab_insight::analysis::{BUILD_FILES, CI_CONFIG_FILE, DEPENDENCY_FILES};
use gitlab_insight::tools::ToolRegistry;
use gitlab_insight::tools::error::ToolError;
use gitlab_insight::tools::functions::{inspect, project, release, repository, search, wiki};
use gitlab_insight::types::*;
use test_util::{
    api, create_test_client, mock_default_branch, mock_file, mock_json, mock_server, mock_status,
};

fn at_ref(git_ref: &str) -> ProjectAtRefArgs {
    ProjectAtRefArgs {
        project: Some("42".to_string()),
        git_ref: Some(git_ref.to_string()),
    }
}

/// Every file probed by the inspection tools, without duplicates
fn probed_files() -> Vec<&'static str> {
    let mut paths: Vec<&'static str> = Vec::new();
    let candidates = DEPENDENCY_FILES
        .iter()
        .flat_map(|(_, files)| files.iter().copied())
        .chain(BUILD_FILES.iter().map(|entry| entry.file))
        .chain([CI_CONFIG_FILE]);
    for path in candidates {
        if !paths.contains(&path) {
            paths.push(path);
        }
    }
    paths
}

/// Serves `present` files and answers 404 for every other probed file.
async fn mock_repository(server: &mut ServerGuard, present: &[(&str, &str)]) {
    for path in probed_files() {
        match present.iter().find(|(name, _)| *name == path) {
            Some((_, content)) => {
                mock_file(server, path, content).await;
            }
            None => {
                let api_path = format!(
                    "/projects/42/repository/files/{}",
                    urlencoding::encode(path)
                );
                mock_status(server, &api_path, 404).await;
            }
        }
    }
}

#[tokio::test]
async fn test_search_repositories_maps_sort_and_filters() {
    let mut server = mock_server().await;
    let mock = server
        .mock("GET", api("/projects").as_str())
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("visibility".into(), "public".into()),
            Matcher::UrlEncoded("search".into(), "root".into()),
            Matcher::UrlEncoded("with_programming_language".into(), "c++".into()),
            Matcher::UrlEncoded("order_by".into(), "star_count".into()),
            Matcher::UrlEncoded("sort".into(), "desc".into()),
            Matcher::UrlEncoded("per_page".into(), "100".into()),
        ]))
        .with_status(200)
        .with_body(
            json!([{
                "id": 7,
                "name": "root",
                "path_with_namespace": "sft/root",
                "description": null,
                "web_url": "https://gitlab.example.org/sft/root",
                "default_branch": "master",
                "topics": ["physics"],
                "star_count": 120,
                "forks_count": 30,
                "last_activity_at": "2026-09-01T10:00:00Z",
                "visibility": "public"
            }])
            .to_string(),
        )
        .create_async()
        .await;

    let client = create_test_client(&server);
    let args = SearchRepositoriesArgs {
        query: Some("root".to_string()),
        language: Some("c++".to_string()),
        sort_by: Some("stars".to_string()),
        per_page: Some(500),
        ..Default::default()
    };
    let projects = project::search_repositories(&client, args).await.unwrap();

    assert_eq!(projects.len(), 1);
    assert_eq!(projects[0].path_with_namespace.as_deref(), Some("sft/root"));
    assert_eq!(projects[0].description, "");
    assert_eq!(projects[0].star_count, 120);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_get_project_info_tolerates_language_failure() {
    let mut server = mock_server().await;
    let _project = server
        .mock("GET", api("/projects/atlas%2Fathena").as_str())
        .match_query(Matcher::UrlEncoded("statistics".into(), "true".into()))
        .with_status(200)
        .with_body(
            json!({
                "id": 42,
                "name": "athena",
                "path_with_namespace": "atlas/athena",
                "license": {"name": "Apache License 2.0"},
                "namespace": {"name": "atlas", "full_path": "atlas"},
                "statistics": {"commit_count": 1000, "repository_size": 2048, "storage_size": 4096}
            })
            .to_string(),
        )
        .create_async()
        .await;
    let _languages = mock_status(&mut server, "/projects/atlas%2Fathena/languages", 500).await;

    let client = create_test_client(&server);
    let detail = project::get_project_info(
        &client,
        ProjectArgs {
            project: Some("atlas/athena".to_string()),
        },
    )
    .await
    .unwrap();

    assert_eq!(detail.license.as_deref(), Some("Apache License 2.0"));
    assert_eq!(detail.namespace.path.as_deref(), Some("atlas"));
    assert!(detail.languages.is_empty());
    assert_eq!(detail.statistics.unwrap().commit_count, 1000);
}

#[tokio::test]
async fn test_missing_project_argument() {
    let server = mock_server().await;
    let client = create_test_client(&server);

    let err = project::get_project_info(&client, ProjectArgs { project: None })
        .await
        .unwrap_err();

    assert!(matches!(err, ToolError::InvalidArgument(_)));
    assert_eq!(err.to_string(), "'project' parameter is required");
}

#[tokio::test]
async fn test_list_repository_files_splits_entries() {
    let mut server = mock_server().await;
    let mock = server
        .mock("GET", api("/projects/42/repository/tree").as_str())
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("path".into(), "src".into()),
            Matcher::UrlEncoded("recursive".into(), "true".into()),
        ]))
        .with_status(200)
        .with_body(
            json!([
                {"name": "core", "type": "tree", "path": "src/core", "mode": "040000"},
                {"name": "main.py", "type": "blob", "path": "src/main.py", "mode": "100644"},
                {"name": "vendor", "type": "commit", "path": "src/vendor", "mode": "160000"}
            ])
            .to_string(),
        )
        .create_async()
        .await;

    let client = create_test_client(&server);
    let args = ListRepositoryFilesArgs {
        project: Some("42".to_string()),
        path: Some("src".to_string()),
        recursive: Some(true),
        ..Default::default()
    };
    let tree = repository::list_repository_files(&client, args)
        .await
        .unwrap();

    assert_eq!(tree.path, "src");
    assert_eq!(tree.git_ref, DEFAULT_BRANCH_LABEL);
    assert_eq!(tree.total_entries, 3);
    assert_eq!(tree.directories.len(), 1);
    assert_eq!(tree.files[0].path.as_deref(), Some("src/main.py"));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_get_file_content_decodes_text_at_default_branch() {
    let mut server = mock_server().await;
    let branch = mock_default_branch(&mut server, "develop").await;
    let _file = mock_file(&mut server, "src/main.py", "import ROOT\nprint('hi')\n").await;

    let client = create_test_client(&server);
    let args = GetFileContentArgs {
        project: Some("42".to_string()),
        file_path: Some("src/main.py".to_string()),
        git_ref: None,
    };
    let file = repository::get_file_content(&client, args).await.unwrap();

    assert!(!file.is_binary);
    assert_eq!(file.content, "import ROOT\nprint('hi')\n");
    assert_eq!(file.language.as_deref(), Some("python"));
    assert_eq!(file.file_name, "main.py");
    branch.assert_async().await;
}

#[tokio::test]
async fn test_get_file_content_reports_binary_by_name() {
    let mut server = mock_server().await;
    let _file = mock_file(&mut server, "docs/logo.png", "\u{89}PNG").await;

    let client = create_test_client(&server);
    let args = GetFileContentArgs {
        project: Some("42".to_string()),
        file_path: Some("docs/logo.png".to_string()),
        git_ref: Some("main".to_string()),
    };
    let file = repository::get_file_content(&client, args).await.unwrap();

    assert!(file.is_binary);
    assert!(file.content.starts_with("[Binary file"));
    assert_eq!(file.language, None);
}

#[tokio::test]
async fn test_get_file_content_treats_invalid_utf8_as_binary() {
    let mut server = mock_server().await;
    let _file = mock_json(
        &mut server,
        "/projects/42/repository/files/data.txt",
        json!({"file_name": "data.txt", "size": 3, "encoding": "base64", "content": "/+7d"}),
    )
    .await;

    let client = create_test_client(&server);
    let args = GetFileContentArgs {
        project: Some("42".to_string()),
        file_path: Some("data.txt".to_string()),
        git_ref: Some("main".to_string()),
    };
    let file = repository::get_file_content(&client, args).await.unwrap();

    assert!(file.is_binary);
    assert!(file.content.contains("could not be decoded"));
}

#[tokio::test]
async fn test_get_project_readme_tries_candidates_in_order() {
    let mut server = mock_server().await;
    let _md = mock_status(&mut server, "/projects/42/repository/files/README.md", 404).await;
    let _rst = mock_file(&mut server, "README.rst", "Athena\n======\n").await;

    let client = create_test_client(&server);
    let readme = repository::get_project_readme(&client, at_ref("main"))
        .await
        .unwrap();

    match readme {
        ReadmeLookup::Found {
            file_name,
            content,
            format,
            ..
        } => {
            assert_eq!(file_name, "README.rst");
            assert_eq!(content, "Athena\n======\n");
            assert_eq!(format, "restructuredtext");
        }
        other => panic!("expected a README, got {other:?}"),
    }
}

#[tokio::test]
async fn test_get_project_readme_lists_candidates_when_missing() {
    let mut server = mock_server().await;
    for candidate in repository::README_CANDIDATES {
        let path = format!("/projects/42/repository/files/{candidate}");
        mock_status(&mut server, &path, 404).await;
    }

    let client = create_test_client(&server);
    let readme = repository::get_project_readme(&client, at_ref("main"))
        .await
        .unwrap();

    let json = serde_json::to_value(&readme).unwrap();
    assert_eq!(json["error"], "No README file found");
    assert_eq!(
        json["tried"].as_array().unwrap().len(),
        repository::README_CANDIDATES.len()
    );
}

#[tokio::test]
async fn test_search_code_in_project() {
    let mut server = mock_server().await;
    let mock = server
        .mock("GET", api("/projects/42/search").as_str())
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("scope".into(), "blobs".into()),
            Matcher::UrlEncoded("search".into(), "TTree".into()),
        ]))
        .with_status(200)
        .with_body(
            json!([{
                "filename": "reader.cxx",
                "path": "src/reader.cxx",
                "project_id": 42,
                "data": "TTree *tree = nullptr;",
                "ref": "main",
                "startline": 12
            }])
            .to_string(),
        )
        .create_async()
        .await;

    let client = create_test_client(&server);
    let args = SearchCodeArgs {
        search_term: Some("TTree".to_string()),
        project: Some("42".to_string()),
        ..Default::default()
    };
    let result = search::search_code(&client, args).await.unwrap();

    assert_eq!(result.total_results, 1);
    assert_eq!(result.results[0].startline, Some(12));
    assert_eq!(result.note, None);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_search_code_falls_back_to_repository_scan() {
    let mut server = mock_server().await;
    let _search = mock_status(&mut server, "/projects/42/search", 400).await;
    let _tree = mock_json(
        &mut server,
        "/projects/42/repository/tree",
        json!([
            {"name": "src", "type": "tree", "path": "src"},
            {"name": "reader.py", "type": "blob", "path": "src/reader.py"},
            {"name": "logo.png", "type": "blob", "path": "docs/logo.png"},
            {"name": "README.md", "type": "blob", "path": "README.md"}
        ]),
    )
    .await;
    let _reader = mock_file(
        &mut server,
        "src/reader.py",
        "import ROOT\n\ntree = ROOT.TTree('t', 't')\n",
    )
    .await;
    let _readme = mock_file(&mut server, "README.md", "# Reader\nReads a ttree.\n").await;

    let client = create_test_client(&server);
    let args = SearchCodeArgs {
        search_term: Some("TTree".to_string()),
        project: Some("42".to_string()),
        ..Default::default()
    };
    let result = search::search_code(&client, args).await.unwrap();

    assert!(result.note.is_some());
    assert_eq!(result.error, None);
    assert_eq!(result.total_results, 2);

    let reader = result
        .results
        .iter()
        .find(|m| m.file_path.as_deref() == Some("src/reader.py"))
        .unwrap();
    assert_eq!(reader.startline, Some(3));
    assert_eq!(reader.data.as_deref(), Some("tree = ROOT.TTree('t', 't')"));
    assert!(
        result
            .results
            .iter()
            .all(|m| m.file_path.as_deref() != Some("docs/logo.png"))
    );
}

#[tokio::test]
async fn test_search_code_fallback_by_filename() {
    let mut server = mock_server().await;
    let _search = mock_status(&mut server, "/projects/42/search", 400).await;
    let _tree = mock_json(
        &mut server,
        "/projects/42/repository/tree",
        json!([
            {"name": "CMakeLists.txt", "type": "blob", "path": "CMakeLists.txt"},
            {"name": "CMakeLists.txt", "type": "blob", "path": "src/CMakeLists.txt"},
            {"name": "main.cxx", "type": "blob", "path": "src/main.cxx"}
        ]),
    )
    .await;

    let client = create_test_client(&server);
    let args = SearchCodeArgs {
        search_term: Some("cmakelists".to_string()),
        project: Some("42".to_string()),
        scope: Some("filenames".to_string()),
        per_page: None,
    };
    let result = search::search_code(&client, args).await.unwrap();

    assert_eq!(result.scope, CodeSearchScope::Filenames);
    assert_eq!(result.total_results, 2);
    assert!(result.results.iter().all(|m| m.data.is_none()));
}

#[tokio::test]
async fn test_search_code_global_without_advanced_search() {
    let mut server = mock_server().await;
    let _search = mock_status(&mut server, "/search", 400).await;

    let client = create_test_client(&server);
    let args = SearchCodeArgs {
        search_term: Some("TTree".to_string()),
        ..Default::default()
    };
    let result = search::search_code(&client, args).await.unwrap();

    assert_eq!(result.project, "(global)");
    assert!(result.error.unwrap().contains("advanced search"));
    assert!(result.results.is_empty());
}

#[tokio::test]
async fn test_search_code_requires_authentication() {
    let mut server = mock_server().await;
    let _search = mock_status(&mut server, "/search", 401).await;

    let client = create_test_client(&server);
    let args = SearchCodeArgs {
        search_term: Some("TTree".to_string()),
        ..Default::default()
    };
    let result = search::search_code(&client, args).await.unwrap();

    assert!(result.error.unwrap().contains("authentication"));
}

#[tokio::test]
async fn test_search_issues_snippets_descriptions() {
    let mut server = mock_server().await;
    let mock = server
        .mock("GET", api("/projects/42/issues").as_str())
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("search".into(), "segfault".into()),
            Matcher::UrlEncoded("state".into(), "all".into()),
            Matcher::UrlEncoded("per_page".into(), "10".into()),
        ]))
        .with_status(200)
        .with_body(
            json!([{
                "title": "Segfault in reader",
                "description": "x".repeat(500),
                "state": "opened",
                "web_url": "https://gitlab.example.org/atlas/athena/-/issues/1",
                "author": {"name": "Ada Lovelace", "username": "ada"},
                "created_at": "2026-01-01T00:00:00Z"
            }])
            .to_string(),
        )
        .create_async()
        .await;

    let client = create_test_client(&server);
    let args = SearchIssuesArgs {
        search_term: Some("segfault".to_string()),
        project: Some("42".to_string()),
        ..Default::default()
    };
    let result = search::search_issues(&client, args).await.unwrap();

    assert_eq!(result.count, 1);
    assert_eq!(result.scope, "project '42'");
    assert_eq!(result.issues[0].description_snippet.len(), 200);
    assert_eq!(result.issues[0].author.as_deref(), Some("Ada Lovelace"));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_wiki_pages_list_and_detail() {
    let mut server = mock_server().await;
    let _list = mock_json(
        &mut server,
        "/projects/42/wikis",
        json!([
            {"title": "Home", "slug": "home", "format": "markdown"},
            {"title": "Build Guide", "slug": "build/guide", "format": "markdown"}
        ]),
    )
    .await;
    let _detail = mock_json(
        &mut server,
        "/projects/42/wikis/build%2Fguide",
        json!({"title": "Build Guide", "slug": "build/guide", "format": "markdown", "content": "Run cmake", "encoding": "UTF-8"}),
    )
    .await;

    let client = create_test_client(&server);
    let list = wiki::get_wiki_pages(
        &client,
        GetWikiPagesArgs {
            project: Some("42".to_string()),
            page_slug: None,
        },
    )
    .await
    .unwrap();
    let list = serde_json::to_value(&list).unwrap();
    assert_eq!(list["mode"], "list");
    assert_eq!(list["total_pages"], 2);

    let detail = wiki::get_wiki_pages(
        &client,
        GetWikiPagesArgs {
            project: Some("42".to_string()),
            page_slug: Some("build/guide".to_string()),
        },
    )
    .await
    .unwrap();
    match detail {
        WikiLookup::Detail { page, .. } => assert_eq!(page.content.as_deref(), Some("Run cmake")),
        other => panic!("expected a page, got {other:?}"),
    }
}

#[tokio::test]
async fn test_wiki_not_enabled() {
    let mut server = mock_server().await;
    let _list = mock_status(&mut server, "/projects/42/wikis", 404).await;

    let client = create_test_client(&server);
    let result = wiki::get_wiki_pages(
        &client,
        GetWikiPagesArgs {
            project: Some("42".to_string()),
            page_slug: None,
        },
    )
    .await
    .unwrap();

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["error"], "Wiki not found or not enabled for this project");
    assert_eq!(json["pages"], json!([]));
}

#[tokio::test]
async fn test_wiki_access_denied() {
    let mut server = mock_server().await;
    let _list = mock_status(&mut server, "/projects/42/wikis", 403).await;

    let client = create_test_client(&server);
    let result = wiki::get_wiki_pages(
        &client,
        GetWikiPagesArgs {
            project: Some("42".to_string()),
            page_slug: None,
        },
    )
    .await
    .unwrap();

    assert!(matches!(result, WikiLookup::Unavailable { ref error, .. } if error.contains("denied")));
}

#[tokio::test]
async fn test_list_releases_for_missing_project() {
    let mut server = mock_server().await;
    let _releases = mock_status(&mut server, "/projects/42/releases", 404).await;

    let client = create_test_client(&server);
    let list = release::list_releases(
        &client,
        ListReleasesArgs {
            project: Some("42".to_string()),
            per_page: None,
        },
    )
    .await
    .unwrap();

    assert_eq!(list.total_releases, 0);
    assert_eq!(list.note.as_deref(), Some("Project not found"));
}

#[tokio::test]
async fn test_list_releases_summarizes_assets() {
    let mut server = mock_server().await;
    let _releases = mock_json(
        &mut server,
        "/projects/42/releases",
        json!([{
            "tag_name": "v1.2.0",
            "name": "Athena 1.2",
            "description": null,
            "author": {"username": "ada"},
            "commit": {"id": "d5a3ff1", "short_id": "d5a3ff1"},
            "assets": {
                "links": [{"name": "tarball", "url": "https://example.org/a.tgz"}],
                "sources": [{"format": "zip", "url": "https://example.org/s.zip"}, {"format": "tar.gz", "url": "https://example.org/s.tgz"}]
            }
        }]),
    )
    .await;

    let client = create_test_client(&server);
    let list = release::list_releases(
        &client,
        ListReleasesArgs {
            project: Some("42".to_string()),
            per_page: Some(5),
        },
    )
    .await
    .unwrap();

    let summary = &list.releases[0];
    assert_eq!(summary.author.as_deref(), Some("ada"));
    assert_eq!(summary.commit_path.as_deref(), Some("d5a3ff1"));
    assert_eq!(summary.assets_count, 1);
    assert_eq!(summary.sources_count, 2);
    assert_eq!(list.note, None);
}

#[tokio::test]
async fn test_get_release_found_and_missing() {
    let mut server = mock_server().await;
    let _found = mock_json(
        &mut server,
        "/projects/42/releases/v1.2.0",
        json!({
            "tag_name": "v1.2.0",
            "name": "Athena 1.2",
            "description": "Bug fixes",
            "evidences": [{"sha": "abc", "collected_at": "2026-02-01T00:00:00Z"}]
        }),
    )
    .await;
    let _missing = mock_status(&mut server, "/projects/42/releases/v9.9.9", 404).await;

    let client = create_test_client(&server);
    let found = release::get_release(
        &client,
        GetReleaseArgs {
            project: Some("42".to_string()),
            tag_name: Some("v1.2.0".to_string()),
        },
    )
    .await
    .unwrap();
    let json = serde_json::to_value(&found).unwrap();
    assert_eq!(json["found"], true);
    assert_eq!(json["description"], "Bug fixes");
    assert_eq!(json["evidences"][0]["sha"], "abc");

    let missing = release::get_release(
        &client,
        GetReleaseArgs {
            project: Some("42".to_string()),
            tag_name: Some("v9.9.9".to_string()),
        },
    )
    .await
    .unwrap();
    assert!(!missing.found);
    assert_eq!(missing.error.as_deref(), Some("Release 'v9.9.9' not found"));
}

#[tokio::test]
async fn test_list_tags_ignores_unknown_sort() {
    let mut server = mock_server().await;
    let mock = server
        .mock("GET", api("/projects/42/repository/tags").as_str())
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("search".into(), "v1".into()),
            Matcher::UrlEncoded("per_page".into(), "20".into()),
        ]))
        .with_status(200)
        .with_body(
            json!([{"name": "v1.0.0", "message": null, "target": "abc", "commit": {"id": "abc", "short_id": "abc"}, "protected": true}])
                .to_string(),
        )
        .create_async()
        .await;

    let client = create_test_client(&server);
    let args = ListTagsArgs {
        project: Some("42".to_string()),
        search: Some("v1".to_string()),
        sort: Some("newest".to_string()),
        per_page: None,
    };
    let tags = release::list_tags(&client, args).await.unwrap();

    assert_eq!(tags.total_tags, 1);
    assert_eq!(tags.tags[0].message, "");
    assert!(tags.tags[0].protected);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_list_tags_for_missing_project() {
    let mut server = mock_server().await;
    let _tags = mock_status(&mut server, "/projects/42/repository/tags", 404).await;

    let client = create_test_client(&server);
    let tags = release::list_tags(
        &client,
        ListTagsArgs {
            project: Some("42".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    assert!(tags.tags.is_empty());
    assert_eq!(tags.note.as_deref(), Some("Project not found"));
}

const REQUIREMENTS: &str = "numpy>=1.24\n# plotting\nmatplotlib\n-r extra.txt\n";
const CMAKE: &str = "cmake_minimum_required(VERSION 3.20)\nfind_package(ROOT 6.28 REQUIRED)\nfind_package(Boost)\n";
const CI: &str = "stages:\n  - build\n  - test\n\nimage: gcc:13\n\nbuild-job:\n  stage: build\n  script: make\n\n.template:\n  script: echo\n";

#[tokio::test]
async fn test_analyze_dependencies() {
    let mut server = mock_server().await;
    mock_repository(
        &mut server,
        &[
            ("requirements.txt", REQUIREMENTS),
            ("CMakeLists.txt", CMAKE),
            ("setup.py", "from setuptools import setup\nsetup()\n"),
        ],
    )
    .await;

    let client = create_test_client(&server);
    let report = inspect::analyze_dependencies(&client, at_ref("main"))
        .await
        .unwrap();

    assert_eq!(report.ecosystems_detected, ["python", "cpp", "fortran"]);
    // CMakeLists.txt is reported once per ecosystem it belongs to
    assert_eq!(report.files_found, 4);

    let requirements = &report.dependency_files[0];
    assert_eq!(requirements.file, "requirements.txt");
    assert_eq!(requirements.dependencies_count, 2);
    assert_eq!(requirements.dependencies[0].version_spec, ">=1.24");
    assert_eq!(requirements.raw_content_preview, None);

    let setup = report
        .dependency_files
        .iter()
        .find(|f| f.file == "setup.py")
        .unwrap();
    assert_eq!(setup.dependencies_count, 0);
    assert!(setup.raw_content_preview.is_some());
}

#[tokio::test]
async fn test_get_ci_config() {
    let mut server = mock_server().await;
    let _ci = mock_file(&mut server, CI_CONFIG_FILE, CI).await;

    let client = create_test_client(&server);
    let report = inspect::get_ci_config(&client, at_ref("main"))
        .await
        .unwrap();

    assert!(report.found);
    let analysis = report.analysis.unwrap();
    assert_eq!(
        analysis.stages,
        Some(vec!["build".to_string(), "test".to_string()])
    );
    assert_eq!(analysis.jobs, ["build-job"]);
    assert_eq!(analysis.hidden_jobs, [".template"]);
    assert_eq!(analysis.image.as_deref(), Some("gcc:13"));
}

#[tokio::test]
async fn test_get_ci_config_missing() {
    let mut server = mock_server().await;
    let path = format!(
        "/projects/42/repository/files/{}",
        urlencoding::encode(CI_CONFIG_FILE)
    );
    let _ci = mock_status(&mut server, &path, 404).await;

    let client = create_test_client(&server);
    let report = inspect::get_ci_config(&client, at_ref("main"))
        .await
        .unwrap();

    assert!(!report.found);
    assert!(report.error.unwrap().contains(CI_CONFIG_FILE));
}

#[tokio::test]
async fn test_get_build_config() {
    let mut server = mock_server().await;
    mock_repository(
        &mut server,
        &[
            ("CMakeLists.txt", CMAKE),
            ("setup.py", "setup()"),
            ("setup.cfg", "[metadata]\nname = demo\n"),
            ("Dockerfile", "FROM gcc:13\n"),
        ],
    )
    .await;

    let client = create_test_client(&server);
    let report = inspect::get_build_config(&client, at_ref("main"))
        .await
        .unwrap();

    assert_eq!(report.files_found, 4);
    assert_eq!(
        report.build_systems_detected,
        ["cmake", "setuptools", "docker"]
    );
    assert_eq!(report.build_files[1].size, "setup()".len());
}

#[tokio::test]
async fn test_inspect_project() {
    let mut server = mock_server().await;
    let _branch = mock_default_branch(&mut server, "main").await;
    mock_repository(
        &mut server,
        &[
            ("requirements.txt", REQUIREMENTS),
            ("CMakeLists.txt", CMAKE),
            ("Makefile", "all:\n\tg++ main.cxx\n"),
            (CI_CONFIG_FILE, CI),
        ],
    )
    .await;

    let client = create_test_client(&server);
    let inspection = inspect::inspect_project(
        &client,
        ProjectAtRefArgs {
            project: Some("42".to_string()),
            git_ref: None,
        },
    )
    .await
    .unwrap();

    assert_eq!(inspection.git_ref, "main");
    assert_eq!(inspection.files_analyzed, 4);
    assert_eq!(inspection.ecosystems, ["python", "cpp", "fortran"]);
    assert_eq!(inspection.build_systems, ["cmake", "make"]);
    assert_eq!(inspection.dependencies.len(), 3);

    let ci = inspection.ci_config.unwrap();
    assert!(ci.found);
    assert_eq!(ci.analysis.jobs, ["build-job"]);
    assert!(ci.analysis.hidden_jobs.is_empty());
    assert!(ci.raw_preview.starts_with("stages:"));
}

#[tokio::test]
async fn test_registry_reports_errors_as_values() {
    let server = mock_server().await;
    let client = create_test_client(&server);
    let registry = ToolRegistry::new();

    let err = registry
        .call(&client, "list_issues", Value::Null)
        .await
        .unwrap_err();
    assert!(matches!(err, ToolError::UnknownTool(_)));

    let err = registry
        .call(&client, "get_release", json!({"project": "42"}))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "'tag_name' parameter is required");
}

#[tokio::test]
async fn test_registry_call_returns_json() {
    let mut server = mock_server().await;
    let _tags = mock_json(
        &mut server,
        "/projects/atlas%2Fathena/repository/tags",
        json!([{"name": "v2.0.0"}]),
    )
    .await;

    let client = create_test_client(&server);
    let result = ToolRegistry::new()
        .call(&client, "list_tags", json!({"project": "atlas/athena"}))
        .await
        .unwrap();

    assert_eq!(result["project"], "atlas/athena");
    assert_eq!(result["tags"][0]["name"], "v2.0.0");
    assert!(result.get("note").is_none());
}
