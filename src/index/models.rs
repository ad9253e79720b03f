use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// A declared or exported symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolRef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// 1-based line of the declaration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exported: Option<bool>,
}

impl SymbolRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: None,
            line: None,
            exported: None,
        }
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    pub fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    pub fn exported(mut self, exported: bool) -> Self {
        self.exported = Some(exported);
        self
    }
}

/// One import statement as written in the source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportRef {
    /// Raw specifier, relative or bare, without quotes
    pub source: String,
    pub kind: String,
    /// Local identifiers bound by the statement
    #[serde(default)]
    pub names: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
}

impl ImportRef {
    pub fn new(source: impl Into<String>, kind: impl Into<String>, names: Vec<String>) -> Self {
        Self {
            source: source.into(),
            kind: kind.into(),
            names,
            line: None,
        }
    }

    pub fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    /// Whether the statement binds the whole module rather than named items
    /// (`import * as ns`, `require(...)`, `export * from`, `use m::*`, `mod m;`).
    pub fn is_wildcard(&self) -> bool {
        self.names.is_empty()
            || matches!(
                self.kind.as_str(),
                "namespace" | "require" | "default" | "module" | "mod" | "side-effect"
            )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSymbols {
    #[serde(default)]
    pub exports: Vec<SymbolRef>,
    #[serde(default)]
    pub functions: Vec<SymbolRef>,
    #[serde(default)]
    pub classes: Vec<SymbolRef>,
    #[serde(default)]
    pub types: Vec<SymbolRef>,
    #[serde(default)]
    pub constants: Vec<SymbolRef>,
}

impl FileSymbols {
    pub fn len(&self) -> usize {
        self.exports.len()
            + self.functions.len()
            + self.classes.len()
            + self.types.len()
            + self.constants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Symbols and imports of a single file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    #[serde(default)]
    pub symbols: FileSymbols,
    #[serde(default)]
    pub imports: Vec<ImportRef>,
}

impl FileEntry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_export(mut self, name: impl Into<String>) -> Self {
        self.symbols.exports.push(SymbolRef::new(name).exported(true));
        self
    }

    pub fn with_exports<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in names {
            self = self.with_export(name);
        }
        self
    }

    pub fn with_function(mut self, name: impl Into<String>) -> Self {
        self.symbols
            .functions
            .push(SymbolRef::new(name).with_kind("function"));
        self
    }

    pub fn with_class(mut self, name: impl Into<String>) -> Self {
        self.symbols.classes.push(SymbolRef::new(name).with_kind("class"));
        self
    }

    pub fn with_import(mut self, import: ImportRef) -> Self {
        self.imports.push(import);
        self
    }

    /// Shorthand for `import { names } from 'source'`.
    pub fn importing(self, source: &str, names: &[&str]) -> Self {
        let names = names.iter().map(|n| n.to_string()).collect();
        self.with_import(ImportRef::new(source, "named", names))
    }

    pub fn export_names(&self) -> impl Iterator<Item = &str> {
        self.symbols.exports.iter().map(|s| s.name.as_str())
    }
}

/// Whole-repository symbol and import map keyed by normalized relative path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoMap {
    #[serde(default)]
    pub files: BTreeMap<String, FileEntry>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoMapStats {
    pub file_count: usize,
    pub symbol_count: usize,
    pub export_count: usize,
    pub import_count: usize,
}

impl RepoMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry, normalizing the key first.
    pub fn insert(&mut self, path: &str, entry: FileEntry) {
        self.files.insert(normalize_rel_path(path), entry);
    }

    pub fn with_file(mut self, path: &str, entry: FileEntry) -> Self {
        self.insert(path, entry);
        self
    }

    pub fn get(&self, path: &str) -> Option<&FileEntry> {
        self.files
            .get(path)
            .or_else(|| self.files.get(&normalize_rel_path(path)))
    }

    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(|k| k.as_str())
    }

    pub fn stats(&self) -> RepoMapStats {
        let mut stats = RepoMapStats {
            file_count: self.files.len(),
            ..Default::default()
        };
        for entry in self.files.values() {
            stats.symbol_count += entry.symbols.len();
            stats.export_count += entry.symbols.exports.len();
            stats.import_count += entry.imports.len();
        }
        stats
    }
}

/// Normalize a repository-relative path: forward slashes, no leading `./`,
/// no empty or `.` segments.
pub fn normalize_rel_path(path: &str) -> String {
    let unified = path.replace('\\', "/");
    unified
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect::<Vec<_>>()
        .join("/")
}

/// Relative key for `path` under `root`, if it lies inside it.
pub fn rel_path(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let key = normalize_rel_path(&relative.to_string_lossy());
    if key.is_empty() {
        None
    } else {
        Some(key)
    }
}

/// Directory portion of a relative key (`""` for root-level files).
pub fn parent_dir(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[..idx],
        None => "",
    }
}

/// File name without directory or extension.
pub fn file_stem(path: &str) -> &str {
    let name = match path.rfind('/') {
        Some(idx) => &path[idx + 1..],
        None => path,
    };
    match name.find('.') {
        Some(0) | None => name,
        Some(idx) => &name[..idx],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_normalize_rel_path() {
        assert_eq!(normalize_rel_path("./src/utils.js"), "src/utils.js");
        assert_eq!(normalize_rel_path("src\\lib\\mod.rs"), "src/lib/mod.rs");
        assert_eq!(normalize_rel_path(".\\a\\.\\b.py"), "a/b.py");
        assert_eq!(normalize_rel_path("a//b.go"), "a/b.go");
        assert_eq!(normalize_rel_path("utils.js"), "utils.js");
    }

    #[test]
    fn test_insert_normalizes_key() {
        let mut map = RepoMap::new();
        map.insert("./src\\app.js", FileEntry::new());
        assert!(map.files.contains_key("src/app.js"));
        assert!(map.contains("./src/app.js"));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_rel_path() {
        let root = PathBuf::from("/repo");
        assert_eq!(
            rel_path(&root, &PathBuf::from("/repo/src/a.ts")),
            Some("src/a.ts".to_string())
        );
        assert_eq!(rel_path(&root, &PathBuf::from("/other/a.ts")), None);
        assert_eq!(rel_path(&root, &root), None);
    }

    #[test]
    fn test_parent_dir_and_stem() {
        assert_eq!(parent_dir("src/a/b.js"), "src/a");
        assert_eq!(parent_dir("b.js"), "");
        assert_eq!(file_stem("src/a/index.test.js"), "index");
        assert_eq!(file_stem("main.rs"), "main");
        assert_eq!(file_stem(".eslintrc"), ".eslintrc");
    }

    #[test]
    fn test_entry_defaults_are_empty() {
        let entry: FileEntry = serde_json::from_str("{}").unwrap();
        assert!(entry.symbols.exports.is_empty());
        assert!(entry.symbols.types.is_empty());
        assert!(entry.imports.is_empty());

        let entry: FileEntry =
            serde_json::from_str(r#"{"imports":[{"source":"./a","kind":"named"}]}"#).unwrap();
        assert!(entry.imports[0].names.is_empty());
    }

    #[test]
    fn test_stats() {
        let map = RepoMap::new()
            .with_file("a.js", FileEntry::new().with_exports(["x", "y"]).with_function("x"))
            .with_file("b.js", FileEntry::new().importing("./a", &["x"]));
        let stats = map.stats();
        assert_eq!(stats.file_count, 2);
        assert_eq!(stats.export_count, 2);
        assert_eq!(stats.symbol_count, 3);
        assert_eq!(stats.import_count, 1);
    }

    #[test]
    fn test_wildcard_imports() {
        assert!(ImportRef::new("./a", "namespace", vec!["a".into()]).is_wildcard());
        assert!(ImportRef::new("./a", "re-export", vec![]).is_wildcard());
        assert!(!ImportRef::new("./a", "named", vec!["x".into()]).is_wildcard());
    }
}
