use serde::Serialize;

use crate::analysis::{CiAnalysis, Dependency};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DependencyFileReport {
    pub file: String,
    pub ecosystem: String,
    pub dependencies_count: usize,
    pub dependencies: Vec<Dependency>,
    /// First characters of files that yielded no parsed dependencies
    pub raw_content_preview: Option<String>,
}

/// Result of `analyze_dependencies`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DependencyReport {
    pub project: String,
    #[serde(rename = "ref")]
    pub git_ref: String,
    pub ecosystems_detected: Vec<String>,
    pub files_found: usize,
    pub dependency_files: Vec<DependencyFileReport>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildFileReport {
    pub file: String,
    pub build_system: String,
    pub language: String,
    pub size: usize,
    pub content: String,
}

/// Result of `get_build_config`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildReport {
    pub project: String,
    #[serde(rename = "ref")]
    pub git_ref: String,
    pub build_systems_detected: Vec<String>,
    pub files_found: usize,
    pub build_files: Vec<BuildFileReport>,
}

/// Result of `get_ci_config`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CiConfigReport {
    pub project: String,
    #[serde(rename = "ref")]
    pub git_ref: String,
    pub found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<CiAnalysis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DependencySample {
    pub source_file: String,
    pub ecosystem: String,
    pub count: usize,
    /// At most the first ten parsed dependencies
    pub items: Vec<Dependency>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CiOverview {
    pub found: bool,
    pub analysis: CiAnalysis,
    pub raw_preview: String,
}

/// Result of `inspect_project`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectInspection {
    pub project: String,
    #[serde(rename = "ref")]
    pub git_ref: String,
    pub ecosystems: Vec<String>,
    pub build_systems: Vec<String>,
    pub dependencies: Vec<DependencySample>,
    pub ci_config: Option<CiOverview>,
    pub files_analyzed: usize,
}
