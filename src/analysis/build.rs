use serde::Serialize;

/// A build-system marker file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BuildFile {
    pub file: &'static str,
    pub build_system: &'static str,
    pub language: &'static str,
}

const fn build_file(
    file: &'static str,
    build_system: &'static str,
    language: &'static str,
) -> BuildFile {
    BuildFile {
        file,
        build_system,
        language,
    }
}

/// Build files probed by the build tools, in priority order.
pub const BUILD_FILES: &[BuildFile] = &[
    build_file("CMakeLists.txt", "cmake", "cmake"),
    build_file("Makefile", "make", "makefile"),
    build_file("setup.py", "setuptools", "python"),
    build_file("setup.cfg", "setuptools", "ini"),
    build_file("pyproject.toml", "python-build", "toml"),
    build_file("SConstruct", "scons", "python"),
    build_file("SConscript", "scons", "python"),
    build_file("wscript", "waf", "python"),
    build_file("Dockerfile", "docker", "dockerfile"),
];

/// Distinct build systems in first-seen order.
pub fn distinct_build_systems<'a>(files: impl IntoIterator<Item = &'a BuildFile>) -> Vec<String> {
    let mut systems: Vec<String> = Vec::new();
    for file in files {
        if !systems.iter().any(|s| s == file.build_system) {
            systems.push(file.build_system.to_string());
        }
    }
    systems
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distinct_build_systems_keeps_order() {
        let found = [BUILD_FILES[2], BUILD_FILES[0], BUILD_FILES[3], BUILD_FILES[8]];
        assert_eq!(
            distinct_build_systems(&found),
            vec!["setuptools", "cmake", "docker"]
        );
    }
}
