//! Path and export conventions shared by the analyses and their consumers.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::index::models::{file_stem, RepoMap};

const ENTRY_STEMS: &[&str] = &["index", "main", "app", "server", "bin"];

const ENTRY_FILES: &[&str] = &["lib.rs", "mod.rs", "__init__.py", "__main__.py"];

const INTERNAL_SEGMENTS: &[&str] = &[
    "internal",
    "private",
    "__tests__",
    "__mocks__",
    "test",
    "tests",
    "fixtures",
];

static TEST_FILE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\.(test|spec)\.[A-Za-z]+$)|(_test\.(go|py)$)|(^test_[^/]*\.py$)")
        .expect("test-file pattern is a valid regex")
});

fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

fn dir_segments(path: &str) -> impl Iterator<Item = &str> {
    let mut segments: Vec<&str> = path.split('/').collect();
    segments.pop();
    segments.into_iter()
}

/// Entry points are exempt from dead-export reporting: `index.*`,
/// `main.*`, `app.*`, `server.*`, `bin.*`, anything under `bin/`, and
/// module roots (`lib.rs`, `mod.rs`, `__init__.py`, `__main__.py`).
pub fn is_entry_point(path: &str) -> bool {
    let name = file_name(path);
    ENTRY_STEMS.contains(&file_stem(path))
        || ENTRY_FILES.contains(&name)
        || dir_segments(path).any(|segment| segment == "bin")
}

pub fn is_test_file(path: &str) -> bool {
    TEST_FILE.is_match(file_name(path))
}

/// Whether `name` exported from `path` is internal by convention and
/// should not be held to documentation or usage requirements.
pub fn is_internal_export(name: &str, path: &str) -> bool {
    name.starts_with('_')
        || dir_segments(path).any(|segment| INTERNAL_SEGMENTS.contains(&segment))
        || is_test_file(path)
}

/// Export names of `file` in declaration order, de-duplicated.
///
/// `None` when the file is not in the map.
pub fn get_exports_from_repo_map(file: &str, map: &RepoMap) -> Option<Vec<String>> {
    let entry = map.get(file)?;
    let mut names: Vec<String> = Vec::with_capacity(entry.symbols.exports.len());
    for name in entry.export_names() {
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    Some(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::models::FileEntry;

    #[test]
    fn test_entry_points() {
        for path in [
            "index.js",
            "src/index.ts",
            "main.py",
            "cmd/server.go",
            "src/app.tsx",
            "bin/cli.js",
            "tools/bin/run.py",
            "src/lib.rs",
            "pkg/__init__.py",
            "pkg/__main__.py",
            "cmd/tool/main.go",
        ] {
            assert!(is_entry_point(path), "{} should be an entry point", path);
        }
        for path in ["src/utils.js", "binary/x.js", "lib/apply.ts", "bin.d/x.js"] {
            assert!(!is_entry_point(path), "{} should not be an entry point", path);
        }
    }

    #[test]
    fn test_test_files() {
        assert!(is_test_file("src/utils.test.js"));
        assert!(is_test_file("src/utils.spec.tsx"));
        assert!(is_test_file("pkg/handler_test.go"));
        assert!(is_test_file("app/models_test.py"));
        assert!(is_test_file("tests/test_models.py"));
        assert!(!is_test_file("src/testing.js"));
        assert!(!is_test_file("src/latest.py"));
    }

    #[test]
    fn test_internal_exports() {
        assert!(is_internal_export("_private", "src/a.py"));
        assert!(is_internal_export("helper", "src/internal/a.ts"));
        assert!(is_internal_export("fixture", "src/__tests__/a.ts"));
        assert!(is_internal_export("mock", "src/a.test.ts"));
        assert!(!is_internal_export("formatDate", "src/utils.js"));
        assert!(!is_internal_export("render", "src/internals.ts"));
    }

    #[test]
    fn test_get_exports_from_repo_map() {
        let map = RepoMap::new().with_file(
            "src/utils.js",
            FileEntry::new().with_exports(["formatDate", "parseDate", "formatDate"]),
        );
        assert_eq!(
            get_exports_from_repo_map("src/utils.js", &map),
            Some(vec!["formatDate".to_string(), "parseDate".to_string()])
        );
        assert_eq!(
            get_exports_from_repo_map("./src/utils.js", &map).map(|e| e.len()),
            Some(2)
        );
        assert_eq!(get_exports_from_repo_map("src/missing.js", &map), None);
    }
}
