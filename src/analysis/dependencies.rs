//! Dependency manifest discovery and best-effort parsers.
//!
//! The parsers are line-oriented regex scanners. They cover the common
//! layouts of each format and silently skip anything they do not recognise.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Manifest files probed for each ecosystem, in reporting order.
/// A file may belong to more than one ecosystem.
pub const DEPENDENCY_FILES: &[(&str, &[&str])] = &[
    (
        "python",
        &[
            "requirements.txt",
            "requirements-dev.txt",
            "requirements_dev.txt",
            "pyproject.toml",
            "setup.py",
            "setup.cfg",
            "Pipfile",
            "conda.yaml",
            "environment.yml",
        ],
    ),
    (
        "cpp",
        &["CMakeLists.txt", "conanfile.txt", "conanfile.py", "vcpkg.json"],
    ),
    ("fortran", &["CMakeLists.txt"]),
];

static REQUIREMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([a-zA-Z0-9_.-]+)\s*(.*)$").expect("valid regex"));
static PEP621_DEPENDENCIES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^dependencies\s*=\s*\[").expect("valid regex"));
static INLINE_LIST: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[(.+)\]").expect("valid regex"));
static POETRY_DEPENDENCIES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\[tool\.poetry\.dependencies\]").expect("valid regex"));
static TABLE_ENTRY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z0-9_.-]+)\s*=\s*(.+)$").expect("valid regex"));
static INLINE_TABLE_VERSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"version\s*=\s*["']([^"']*)["']"#).expect("valid regex"));
static CMAKE_FIND_PACKAGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"find_package\s*\(\s*([a-zA-Z0-9_]+)(?:\s+([0-9][^\s)]*))?\s*")
        .expect("valid regex")
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    pub name: String,
    pub version_spec: String,
}

impl Dependency {
    fn new(name: &str, version_spec: &str) -> Self {
        Self {
            name: name.to_string(),
            version_spec: version_spec.trim().to_string(),
        }
    }
}

/// Manifest formats with a parser
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestFormat {
    Requirements,
    Pyproject,
    CMake,
}

impl ManifestFormat {
    /// Parser for a manifest path, matched on the file name.
    pub fn for_file(path: &str) -> Option<Self> {
        match super::file_kind::file_name(path) {
            "requirements.txt" | "requirements-dev.txt" | "requirements_dev.txt" => {
                Some(Self::Requirements)
            }
            "pyproject.toml" => Some(Self::Pyproject),
            "CMakeLists.txt" => Some(Self::CMake),
            _ => None,
        }
    }

    pub fn parse(self, content: &str) -> Vec<Dependency> {
        match self {
            Self::Requirements => parse_requirements_txt(content),
            Self::Pyproject => parse_pyproject_toml(content),
            Self::CMake => parse_cmake_find_package(content),
        }
    }
}

pub fn parse_requirements_txt(content: &str) -> Vec<Dependency> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#') && !line.starts_with('-'))
        .filter_map(|line| {
            let line = line.split('#').next().unwrap_or_default().trim();
            REQUIREMENT
                .captures(line)
                .map(|caps| Dependency::new(&caps[1], &caps[2]))
        })
        .collect()
}

enum PyprojectSection {
    Other,
    DependencyList,
    PoetryTable,
}

/// PEP 621 `dependencies = [...]` (inline or multi-line) and
/// `[tool.poetry.dependencies]` tables.
pub fn parse_pyproject_toml(content: &str) -> Vec<Dependency> {
    let mut deps = Vec::new();
    let mut section = PyprojectSection::Other;

    for line in content.lines() {
        let stripped = line.trim();

        if PEP621_DEPENDENCIES.is_match(stripped) {
            match INLINE_LIST.captures(stripped) {
                Some(caps) => {
                    deps.extend(caps[1].split(',').filter_map(requirement_item));
                    section = PyprojectSection::Other;
                }
                None => section = PyprojectSection::DependencyList,
            }
            continue;
        }
        if POETRY_DEPENDENCIES.is_match(stripped) {
            section = PyprojectSection::PoetryTable;
            continue;
        }

        match section {
            PyprojectSection::Other => {}
            PyprojectSection::DependencyList => {
                if stripped.starts_with(']') {
                    section = PyprojectSection::Other;
                } else if !stripped.starts_with('#') {
                    deps.extend(requirement_item(stripped));
                }
            }
            PyprojectSection::PoetryTable => {
                if stripped.starts_with('[') {
                    section = PyprojectSection::Other;
                    continue;
                }
                if let Some(caps) = TABLE_ENTRY.captures(stripped) {
                    if &caps[1] == "python" {
                        continue;
                    }
                    let value = caps[2].trim();
                    let version = if value.starts_with('{') {
                        INLINE_TABLE_VERSION
                            .captures(value)
                            .map(|v| v[1].to_string())
                            .unwrap_or_default()
                    } else {
                        strip_quotes(value).to_string()
                    };
                    deps.push(Dependency::new(&caps[1], &version));
                }
            }
        }
    }

    deps
}

/// One quoted PEP 508 requirement, with list punctuation and comments removed.
fn requirement_item(item: &str) -> Option<Dependency> {
    let item = item.split('#').next().unwrap_or_default();
    let item = item
        .trim()
        .trim_matches(|c| matches!(c, ',' | '"' | '\''))
        .trim();
    if item.is_empty() {
        return None;
    }
    REQUIREMENT
        .captures(item)
        .map(|caps| Dependency::new(&caps[1], &caps[2]))
}

pub fn parse_cmake_find_package(content: &str) -> Vec<Dependency> {
    CMAKE_FIND_PACKAGE
        .captures_iter(content)
        .map(|caps| {
            Dependency::new(
                &caps[1],
                caps.get(2).map(|m| m.as_str()).unwrap_or_default(),
            )
        })
        .collect()
}

fn strip_quotes(value: &str) -> &str {
    value.trim().trim_matches(|c| c == '\'' || c == '"')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(deps: &[Dependency]) -> Vec<&str> {
        deps.iter().map(|d| d.name.as_str()).collect()
    }

    #[test]
    fn test_requirements_txt() {
        let content = "\
# analysis stack
numpy>=1.20
uproot == 5.0.4  # pinned
-r base.txt
--index-url https://pypi.example.org

awkward
";
        let deps = parse_requirements_txt(content);
        assert_eq!(names(&deps), vec!["numpy", "uproot", "awkward"]);
        assert_eq!(deps[0].version_spec, ">=1.20");
        assert_eq!(deps[1].version_spec, "== 5.0.4");
        assert_eq!(deps[2].version_spec, "");
    }

    #[test]
    fn test_pyproject_multiline_list() {
        let content = r#"
[project]
name = "hep-tool"
dependencies = [
    "numpy>=1.20",
    # plotting
    "matplotlib",  # optional later
    'scipy<2',
]

[project.optional-dependencies]
dev = ["pytest"]
"#;
        let deps = parse_pyproject_toml(content);
        assert_eq!(names(&deps), vec!["numpy", "matplotlib", "scipy"]);
        assert_eq!(deps[0].version_spec, ">=1.20");
        assert_eq!(deps[2].version_spec, "<2");
    }

    #[test]
    fn test_pyproject_inline_list() {
        let deps = parse_pyproject_toml(r#"dependencies = ["requests>=2.31", "click"]"#);
        assert_eq!(names(&deps), vec!["requests", "click"]);
        assert_eq!(deps[0].version_spec, ">=2.31");
    }

    #[test]
    fn test_pyproject_poetry_table() {
        let content = r#"
[tool.poetry.dependencies]
python = "^3.10"
numpy = "^1.26"
pandas = { version = "^2.1", optional = true }

[tool.poetry.group.dev.dependencies]
pytest = "^7"
"#;
        let deps = parse_pyproject_toml(content);
        assert_eq!(names(&deps), vec!["numpy", "pandas"]);
        assert_eq!(deps[0].version_spec, "^1.26");
        assert_eq!(deps[1].version_spec, "^2.1");
    }

    #[test]
    fn test_cmake_find_package() {
        let content = "\
cmake_minimum_required(VERSION 3.16)
find_package(ROOT 6.26 REQUIRED COMPONENTS Core Tree)
find_package( Boost )
find_package(Eigen3 3.4)
";
        let deps = parse_cmake_find_package(content);
        assert_eq!(names(&deps), vec!["ROOT", "Boost", "Eigen3"]);
        assert_eq!(deps[0].version_spec, "6.26");
        assert_eq!(deps[1].version_spec, "");
        assert_eq!(deps[2].version_spec, "3.4");
    }

    #[test]
    fn test_format_lookup() {
        assert_eq!(
            ManifestFormat::for_file("requirements_dev.txt"),
            Some(ManifestFormat::Requirements)
        );
        assert_eq!(
            ManifestFormat::for_file("CMakeLists.txt"),
            Some(ManifestFormat::CMake)
        );
        assert_eq!(ManifestFormat::for_file("setup.py"), None);
    }
}
