//! File-kind detection by name and extension, and decoding of the base64
//! payloads returned by the repository files API.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

const BINARY_EXTENSIONS: &[&str] = &[
    ".png", ".jpg", ".jpeg", ".gif", ".bmp", ".ico", ".webp", ".svg", ".pdf", ".zip", ".gz",
    ".tar", ".bz2", ".xz", ".7z", ".rar", ".exe", ".dll", ".so", ".dylib", ".o", ".a", ".pyc",
    ".pyo", ".class", ".wasm", ".root", ".pkl", ".pickle", ".npy", ".npz", ".h5", ".hdf5",
    ".ttf", ".otf", ".woff", ".woff2", ".mp3", ".mp4", ".wav", ".avi", ".mov",
];

/// Extensions whose media type is not textual even though they are missing
/// from [`BINARY_EXTENSIONS`].
const NON_TEXT_MEDIA_EXTENSIONS: &[&str] = &[
    ".jar", ".war", ".doc", ".docx", ".xls", ".xlsx", ".ppt", ".pptx", ".odt", ".ods", ".tif",
    ".tiff", ".psd", ".ogg", ".flac", ".webm", ".mkv", ".mpg", ".mpeg", ".deb", ".rpm", ".dmg",
    ".iso", ".bin", ".tgz",
];

const TEXT_EXTENSIONS: &[&str] = &[
    ".yml", ".yaml", ".toml", ".cfg", ".ini", ".conf", ".cmake", ".in", ".txt", ".md", ".rst",
    ".tex", ".py", ".pyx", ".pxd", ".pyi", ".cpp", ".cxx", ".cc", ".c", ".h", ".hpp", ".hxx",
    ".java", ".scala", ".kt", ".js", ".mjs", ".ts", ".tsx", ".jsx", ".rs", ".go", ".rb", ".jl",
    ".r", ".sh", ".bash", ".zsh", ".fish", ".f90", ".f95", ".f03", ".f", ".json", ".xml",
    ".html", ".htm", ".css", ".sql", ".gitignore", ".gitmodules", ".gitattributes",
    ".dockerignore", ".env", ".editorconfig",
];

const TEXT_FILENAMES: &[&str] = &[
    "Makefile",
    "CMakeLists.txt",
    "Dockerfile",
    "Jenkinsfile",
    "README",
    "LICENSE",
    "CHANGELOG",
    "CONTRIBUTING",
    ".gitignore",
    ".gitmodules",
    ".gitattributes",
    ".gitlab-ci.yml",
    ".clang-format",
    ".clang-tidy",
];

const FILENAME_LANGUAGES: &[(&str, &str)] = &[
    ("CMakeLists.txt", "cmake"),
    ("Makefile", "makefile"),
    ("Dockerfile", "dockerfile"),
    ("Jenkinsfile", "groovy"),
    (".gitlab-ci.yml", "yaml"),
    (".clang-format", "yaml"),
];

// Case-sensitive: `.C` and `.R` are matched before falling back to lowercase.
const EXTENSION_LANGUAGES: &[(&str, &str)] = &[
    (".py", "python"),
    (".pyx", "python"),
    (".pyi", "python"),
    (".cpp", "cpp"),
    (".cxx", "cpp"),
    (".cc", "cpp"),
    (".C", "cpp"),
    (".c", "c"),
    (".h", "cpp"),
    (".hpp", "cpp"),
    (".hxx", "cpp"),
    (".java", "java"),
    (".js", "javascript"),
    (".mjs", "javascript"),
    (".ts", "typescript"),
    (".tsx", "typescript"),
    (".rs", "rust"),
    (".go", "go"),
    (".rb", "ruby"),
    (".sh", "bash"),
    (".bash", "bash"),
    (".zsh", "bash"),
    (".yml", "yaml"),
    (".yaml", "yaml"),
    (".json", "json"),
    (".xml", "xml"),
    (".html", "html"),
    (".htm", "html"),
    (".css", "css"),
    (".sql", "sql"),
    (".md", "markdown"),
    (".markdown", "markdown"),
    (".tex", "latex"),
    (".cmake", "cmake"),
    (".toml", "toml"),
    (".ini", "ini"),
    (".cfg", "ini"),
    (".r", "r"),
    (".R", "r"),
    (".jl", "julia"),
    (".f90", "fortran"),
    (".f95", "fortran"),
    (".f03", "fortran"),
    (".f", "fortran"),
];

/// Last path component of `path`.
pub fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Extension including the leading dot, or `""` when the name has none.
fn extension(name: &str) -> &str {
    name.rfind('.').map(|idx| &name[idx..]).unwrap_or("")
}

/// Whether a file should be reported as binary instead of decoded.
///
/// Known text names and extensions win over the binary lists; anything
/// unrecognised is treated as text.
pub fn is_binary(path: &str) -> bool {
    let name = file_name(path);
    if TEXT_FILENAMES.contains(&name) {
        return false;
    }

    let ext = extension(name).to_lowercase();
    if TEXT_EXTENSIONS.contains(&ext.as_str()) {
        return false;
    }

    BINARY_EXTENSIONS.contains(&ext.as_str()) || NON_TEXT_MEDIA_EXTENSIONS.contains(&ext.as_str())
}

/// Syntax highlighting hint for a file, looked up by full name first.
pub fn language_hint(path: &str) -> Option<&'static str> {
    let name = file_name(path);
    if let Some((_, lang)) = FILENAME_LANGUAGES.iter().find(|(n, _)| *n == name) {
        return Some(*lang);
    }

    let ext = extension(name);
    let lookup = |key: &str| {
        EXTENSION_LANGUAGES
            .iter()
            .find(|(e, _)| *e == key)
            .map(|(_, lang)| *lang)
    };
    lookup(ext).or_else(|| lookup(&ext.to_lowercase()))
}

/// Markup format of a README, judged by its extension.
pub fn readme_format(name: &str) -> &'static str {
    let lower = name.to_lowercase();
    if lower.ends_with(".md") {
        "markdown"
    } else if lower.ends_with(".rst") {
        "restructuredtext"
    } else {
        "plaintext"
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("invalid base64 content: {0}")]
    Base64(String),
    #[error("content is not valid UTF-8")]
    Utf8,
}

/// Decode a repository file payload to text.
///
/// Non-base64 encodings and empty payloads are returned unchanged.
pub fn decode_content(content: &str, encoding: &str) -> Result<String, DecodeError> {
    if encoding != "base64" || content.is_empty() {
        return Ok(content.to_string());
    }

    let compact: String = content
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    let bytes = STANDARD
        .decode(compact)
        .map_err(|e| DecodeError::Base64(e.to_string()))?;
    String::from_utf8(bytes).map_err(|_| DecodeError::Utf8)
}

/// Like [`decode_content`], but keeps the raw payload when decoding fails.
pub fn decode_content_or_raw(content: &str, encoding: &str) -> String {
    decode_content(content, encoding).unwrap_or_else(|_| content.to_string())
}

/// First `max_chars` characters of `text`.
pub fn preview(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
