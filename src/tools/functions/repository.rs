use super::common::{
    get_repository_file, list_from_response, non_blank, required, required_project, resolve_ref,
};
use crate::analysis::file_kind;
use crate::gitlab::{GitLabClient, QueryParams};
use crate::tools::error::ToolError;
use crate::types::{
    DEFAULT_BRANCH_LABEL, FileContent, GetFileContentArgs, ListRepositoryFilesArgs,
    ProjectAtRefArgs, ReadmeLookup, RepositoryTree, TreeEntry,
};

const DEFAULT_TREE_PER_PAGE: u32 = 100;

/// README names tried in order of preference
pub const README_CANDIDATES: &[&str] = &[
    "README.md",
    "README.rst",
    "README.txt",
    "README",
    "readme.md",
    "readme.rst",
    "readme.txt",
    "Readme.md",
];

/// One page of the repository tree, split into directories and files.
pub async fn list_repository_files(
    client: &GitLabClient,
    args: ListRepositoryFilesArgs,
) -> Result<RepositoryTree, ToolError> {
    let project = required_project(args.project.as_deref())?;
    let path = non_blank(args.path.as_deref());
    let git_ref = non_blank(args.git_ref.as_deref());
    let per_page = client
        .settings()
        .clamp_per_page(args.per_page, DEFAULT_TREE_PER_PAGE);

    let mut params = QueryParams::new()
        .with_opt("path", path.as_deref())
        .with_opt("ref", git_ref.as_deref())
        .with("per_page", per_page);
    if args.recursive.unwrap_or(false) {
        params.insert("recursive", "true");
    }

    let api_path = format!("{}/repository/tree", project.api_path());
    let entries: Vec<TreeEntry> =
        list_from_response(client.get(&api_path, Some(&params)).await?, &api_path)?;

    let total_entries = entries.len();
    let (directories, files): (Vec<_>, Vec<_>) = entries
        .into_iter()
        .filter(|e| e.is_directory() || e.is_file())
        .partition(TreeEntry::is_directory);

    Ok(RepositoryTree {
        project: project.to_string(),
        path: path.unwrap_or_else(|| "/".to_string()),
        git_ref: git_ref.unwrap_or_else(|| DEFAULT_BRANCH_LABEL.to_string()),
        total_entries,
        directories,
        files,
    })
}

/// Decoded content of one file. Binary files are reported by size only.
pub async fn get_file_content(
    client: &GitLabClient,
    args: GetFileContentArgs,
) -> Result<FileContent, ToolError> {
    let project = required_project(args.project.as_deref())?;
    let file_path = required(args.file_path.as_deref(), "file_path")?;
    let git_ref = resolve_ref(client, &project, args.git_ref.as_deref()).await?;

    let file = get_repository_file(client, &project, &file_path, &git_ref).await?;
    let file_name = file
        .file_name
        .clone()
        .unwrap_or_else(|| file_kind::file_name(&file_path).to_string());

    let (is_binary, content, language) = if file_kind::is_binary(&file_name) {
        (true, format!("[Binary file, {} bytes]", file.size), None)
    } else {
        match file_kind::decode_content(&file.content, file.encoding()) {
            Ok(text) => (
                false,
                text,
                file_kind::language_hint(&file_name).map(str::to_string),
            ),
            Err(e) => {
                tracing::debug!("Treating {} as binary: {}", file_path, e);
                (
                    true,
                    format!(
                        "[Binary file, {} bytes, could not be decoded as UTF-8]",
                        file.size
                    ),
                    None,
                )
            }
        }
    };

    Ok(FileContent {
        file_name,
        file_path: file.file_path.unwrap_or(file_path),
        size: file.size,
        git_ref: file.git_ref.unwrap_or(git_ref),
        last_commit_id: file.last_commit_id,
        content_sha256: file.content_sha256,
        is_binary,
        content,
        language,
    })
}

/// First README found among [`README_CANDIDATES`].
pub async fn get_project_readme(
    client: &GitLabClient,
    args: ProjectAtRefArgs,
) -> Result<ReadmeLookup, ToolError> {
    let project = required_project(args.project.as_deref())?;
    let git_ref = resolve_ref(client, &project, args.git_ref.as_deref()).await?;

    for candidate in README_CANDIDATES {
        let file = match get_repository_file(client, &project, candidate, &git_ref).await {
            Ok(file) => file,
            Err(e) if e.is_not_found() => continue,
            Err(e) => return Err(e.into()),
        };

        return Ok(ReadmeLookup::Found {
            content: file_kind::decode_content_or_raw(&file.content, file.encoding()),
            file_name: file.file_name.unwrap_or_else(|| candidate.to_string()),
            file_path: file.file_path.unwrap_or_else(|| candidate.to_string()),
            git_ref: file.git_ref.unwrap_or(git_ref),
            size: file.size,
            format: file_kind::readme_format(candidate).to_string(),
        });
    }

    Ok(ReadmeLookup::Missing {
        error: "No README file found".to_string(),
        tried: README_CANDIDATES.iter().map(|c| c.to_string()).collect(),
        content: None,
    })
}
