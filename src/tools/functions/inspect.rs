//! Repository inspection tools: dependency manifests, build files and CI
//! configuration.
//!
//! All probes for one call are fetched concurrently at a single resolved ref.
//! Files that do not exist are skipped.

use super::common::{
    fetch_files, get_repository_file, push_unique, required_project, resolve_ref,
};
use crate::analysis::{
    BUILD_FILES, CI_CONFIG_FILE, DEPENDENCY_FILES, ManifestFormat, analyze_ci_yaml,
    distinct_build_systems, file_kind,
};
use crate::gitlab::GitLabClient;
use crate::tools::error::ToolError;
use crate::types::{
    BuildFileReport, BuildReport, CiConfigReport, CiOverview, DependencyFileReport,
    DependencyReport, DependencySample, ProjectAtRefArgs, ProjectInspection,
};

/// Characters of an unparsed manifest included in the report
const RAW_PREVIEW_CHARS: usize = 500;
const CI_PREVIEW_CHARS: usize = 200;
const DEPENDENCY_SAMPLE_SIZE: usize = 10;

/// Every manifest path in [`DEPENDENCY_FILES`], without duplicates.
fn dependency_paths() -> Vec<&'static str> {
    let mut paths = Vec::new();
    for (_, files) in DEPENDENCY_FILES {
        for file in *files {
            if !paths.contains(file) {
                paths.push(*file);
            }
        }
    }
    paths
}

pub async fn analyze_dependencies(
    client: &GitLabClient,
    args: ProjectAtRefArgs,
) -> Result<DependencyReport, ToolError> {
    let project = required_project(args.project.as_deref())?;
    let git_ref = resolve_ref(client, &project, args.git_ref.as_deref()).await?;

    let contents = fetch_files(client, &project, &dependency_paths(), &git_ref).await?;

    let mut ecosystems_detected = Vec::new();
    let mut dependency_files = Vec::new();
    for (ecosystem, files) in DEPENDENCY_FILES {
        for file in *files {
            let Some(content) = contents.get(*file) else {
                continue;
            };
            push_unique(&mut ecosystems_detected, ecosystem);

            let dependencies = ManifestFormat::for_file(file)
                .map(|format| format.parse(content))
                .unwrap_or_default();
            let raw_content_preview = dependencies
                .is_empty()
                .then(|| file_kind::preview(content, RAW_PREVIEW_CHARS));

            dependency_files.push(DependencyFileReport {
                file: file.to_string(),
                ecosystem: ecosystem.to_string(),
                dependencies_count: dependencies.len(),
                dependencies,
                raw_content_preview,
            });
        }
    }

    Ok(DependencyReport {
        project: project.to_string(),
        git_ref,
        ecosystems_detected,
        files_found: dependency_files.len(),
        dependency_files,
    })
}

/// `.gitlab-ci.yml` content with a structural summary.
pub async fn get_ci_config(
    client: &GitLabClient,
    args: ProjectAtRefArgs,
) -> Result<CiConfigReport, ToolError> {
    let project = required_project(args.project.as_deref())?;
    let git_ref = resolve_ref(client, &project, args.git_ref.as_deref()).await?;

    let file = match get_repository_file(client, &project, CI_CONFIG_FILE, &git_ref).await {
        Ok(file) => file,
        Err(e) if e.is_not_found() => {
            return Ok(CiConfigReport {
                project: project.to_string(),
                git_ref,
                found: false,
                size: None,
                content: None,
                analysis: None,
                error: Some(format!("No {CI_CONFIG_FILE} found in this repository")),
            });
        }
        Err(e) => return Err(e.into()),
    };

    let content = file_kind::decode_content_or_raw(&file.content, file.encoding());
    Ok(CiConfigReport {
        project: project.to_string(),
        git_ref,
        found: true,
        size: Some(file.size),
        analysis: Some(analyze_ci_yaml(&content)),
        content: Some(content),
        error: None,
    })
}

pub async fn get_build_config(
    client: &GitLabClient,
    args: ProjectAtRefArgs,
) -> Result<BuildReport, ToolError> {
    let project = required_project(args.project.as_deref())?;
    let git_ref = resolve_ref(client, &project, args.git_ref.as_deref()).await?;

    let paths: Vec<&str> = BUILD_FILES.iter().map(|entry| entry.file).collect();
    let contents = fetch_files(client, &project, &paths, &git_ref).await?;

    let found: Vec<_> = BUILD_FILES
        .iter()
        .filter(|entry| contents.contains_key(entry.file))
        .collect();

    let build_files: Vec<BuildFileReport> = found
        .iter()
        .filter_map(|entry| {
            let content = contents.get(entry.file)?;
            Some(BuildFileReport {
                file: entry.file.to_string(),
                build_system: entry.build_system.to_string(),
                language: entry.language.to_string(),
                size: content.chars().count(),
                content: content.clone(),
            })
        })
        .collect();

    Ok(BuildReport {
        project: project.to_string(),
        git_ref,
        build_systems_detected: distinct_build_systems(found.iter().copied()),
        files_found: build_files.len(),
        build_files,
    })
}

/// One-call overview combining dependency, build and CI inspection.
pub async fn inspect_project(
    client: &GitLabClient,
    args: ProjectAtRefArgs,
) -> Result<ProjectInspection, ToolError> {
    let project = required_project(args.project.as_deref())?;
    let git_ref = resolve_ref(client, &project, args.git_ref.as_deref()).await?;

    let mut paths = dependency_paths();
    for entry in BUILD_FILES {
        if !paths.contains(&entry.file) {
            paths.push(entry.file);
        }
    }
    paths.push(CI_CONFIG_FILE);

    let contents = fetch_files(client, &project, &paths, &git_ref).await?;

    let mut ecosystems = Vec::new();
    let mut dependencies = Vec::new();
    for (ecosystem, files) in DEPENDENCY_FILES {
        for file in *files {
            let Some(content) = contents.get(*file) else {
                continue;
            };
            push_unique(&mut ecosystems, ecosystem);

            let Some(format) = ManifestFormat::for_file(file) else {
                continue;
            };
            let parsed = format.parse(content);
            if parsed.is_empty() {
                continue;
            }
            dependencies.push(DependencySample {
                source_file: file.to_string(),
                ecosystem: ecosystem.to_string(),
                count: parsed.len(),
                items: parsed.into_iter().take(DEPENDENCY_SAMPLE_SIZE).collect(),
            });
        }
    }

    let build_systems = distinct_build_systems(
        BUILD_FILES
            .iter()
            .filter(|entry| contents.contains_key(entry.file)),
    );

    let ci_config = contents.get(CI_CONFIG_FILE).map(|content| CiOverview {
        found: true,
        analysis: analyze_ci_yaml(content).summary(),
        raw_preview: file_kind::preview(content, CI_PREVIEW_CHARS),
    });

    Ok(ProjectInspection {
        project: project.to_string(),
        git_ref,
        ecosystems,
        build_systems,
        dependencies,
        ci_config,
        files_analyzed: contents.len(),
    })
}
