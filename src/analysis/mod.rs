pub mod build;
pub mod ci;
pub mod dependencies;
pub mod file_kind;

pub use build::{BUILD_FILES, BuildFile, distinct_build_systems};
pub use ci::{CiAnalysis, analyze_ci_yaml};
pub use dependencies::{DEPENDENCY_FILES, Dependency, ManifestFormat};

/// Path of the GitLab CI configuration at the repository root
pub const CI_CONFIG_FILE: &str = ".gitlab-ci.yml";
