//! Line-anchored scanner for `.gitlab-ci.yml`.
//!
//! This is a heuristic, not a YAML parser: any top-level key with an empty
//! value is reported as a job, so unusual layouts can be mis-detected.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Top-level keys with a meaning of their own in GitLab CI
const RESERVED_KEYS: &[&str] = &[
    "stages",
    "variables",
    "default",
    "include",
    "image",
    "services",
    "before_script",
    "after_script",
    "cache",
    "workflow",
];

static STAGES_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^stages:\s*\n((?:\s+-\s+.+\n?)+)").expect("valid regex"));
static STAGE_ITEM: Lazy<Regex> = Lazy::new(|| Regex::new(r"-\s+(\S+)").expect("valid regex"));
static JOB_KEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^([a-zA-Z_][a-zA-Z0-9_.-]*):\s*$").expect("valid regex"));
static HIDDEN_KEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^(\.[a-zA-Z_][a-zA-Z0-9_.-]*):\s*$").expect("valid regex"));
static INCLUDE_ENTRY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r##"(?:local|remote|template|project|file):\s*['"]?([^'"#\n]+)"##)
        .expect("valid regex")
});
static IMAGE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^image:\s+(.+)$").expect("valid regex"));
static VARIABLES_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^variables:\s*$").expect("valid regex"));
static VARIABLE_ENTRY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s+([A-Z_][A-Z0-9_]*):\s*(.+)").expect("valid regex"));

/// Structure recovered from a CI configuration file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CiAnalysis {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stages: Option<Vec<String>>,
    pub jobs: Vec<String>,
    #[serde(
        default,
        rename = "hidden_jobs_templates",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub hidden_jobs: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub includes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub variables: BTreeMap<String, String>,
}

impl CiAnalysis {
    /// Reduced view (stages, jobs and image) used for project overviews.
    pub fn summary(&self) -> Self {
        Self {
            stages: self.stages.clone(),
            jobs: self.jobs.clone(),
            image: self.image.clone(),
            ..Self::default()
        }
    }
}

pub fn analyze_ci_yaml(content: &str) -> CiAnalysis {
    let stages = STAGES_BLOCK.captures(content).map(|caps| {
        STAGE_ITEM
            .captures_iter(&caps[1])
            .map(|item| item[1].to_string())
            .collect()
    });

    let jobs = JOB_KEY
        .captures_iter(content)
        .map(|caps| caps[1].to_string())
        .filter(|key| !RESERVED_KEYS.contains(&key.as_str()) && !key.starts_with('.'))
        .collect();

    let hidden_jobs = HIDDEN_KEY
        .captures_iter(content)
        .map(|caps| caps[1].to_string())
        .collect();

    let includes = INCLUDE_ENTRY
        .captures_iter(content)
        .map(|caps| caps[1].trim().to_string())
        .collect();

    let image = IMAGE
        .captures(content)
        .map(|caps| strip_quotes(&caps[1]).to_string());

    CiAnalysis {
        stages,
        jobs,
        hidden_jobs,
        includes,
        image,
        variables: scan_variables(content),
    }
}

/// Entries of top-level `variables:` blocks. Later definitions win.
fn scan_variables(content: &str) -> BTreeMap<String, String> {
    let mut variables = BTreeMap::new();
    let mut in_block = false;

    for line in content.lines() {
        if VARIABLES_HEADER.is_match(line) {
            in_block = true;
            continue;
        }
        if !in_block {
            continue;
        }
        if line.chars().next().is_some_and(|c| !c.is_whitespace()) {
            in_block = false;
            continue;
        }
        if let Some(caps) = VARIABLE_ENTRY.captures(line) {
            variables.insert(caps[1].to_string(), strip_quotes(&caps[2]).to_string());
        }
    }

    variables
}

fn strip_quotes(value: &str) -> &str {
    value.trim().trim_matches(|c| c == '\'' || c == '"')
}
