//! Import resolution for mapping import specifiers to known files.
//!
//! Resolution is a best-effort heuristic, not a bundler-grade module
//! resolver. It sits behind the [`ImportResolver`] trait so a stricter
//! strategy can be swapped in without touching index construction or the
//! graph algorithms.
//!
//! Precedence of [`HeuristicResolver`] (first hit wins, known files are
//! visited in sorted order so ties resolve deterministically):
//!
//! 1. Language normalisation of the specifier (Python dots, Rust `::`,
//!    Java package paths).
//! 2. Relative specifiers are joined with the importer's directory and
//!    tried as exact path, then `path.<ext>`, then `path/index.*`,
//!    `path/mod.rs`, `path/__init__.py`.
//! 3. Non-relative specifiers are tried the same way from the repo root.
//! 4. Trailing-path match: a known file whose extension-less path ends with
//!    the specifier, then a directory whose path ends with it (Go packages,
//!    index files).
//!
//! Bare single-segment JavaScript specifiers (`react`, `fs`) are package
//! names and never fall through to the trailing-path match.

use std::collections::{BTreeSet, HashMap};

use crate::index::models::{file_stem, parent_dir, RepoMap};

/// Strategy that maps `(importer, specifier)` to a known file key.
pub trait ImportResolver: Send + Sync {
    /// Returns the resolved file, or `None` when the specifier is unknown
    /// (external package, generated file, dynamic path).
    fn resolve(&self, importer: &str, source: &str, files: &KnownFiles) -> Option<String>;
}

const INDEX_STEMS: &[&str] = &["index", "mod", "__init__"];

/// File keys of a repo map with suffix lookups precomputed.
#[derive(Debug, Clone, Default)]
pub struct KnownFiles {
    paths: BTreeSet<String>,
    /// Extension-less path suffix -> first file
    by_suffix: HashMap<String, String>,
    /// Directory suffix -> first index-like file in that directory
    index_by_dir_suffix: HashMap<String, String>,
    /// Directory suffix -> first file in that directory
    by_dir_suffix: HashMap<String, String>,
}

impl KnownFiles {
    pub fn new<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let paths: BTreeSet<String> = paths.into_iter().map(Into::into).collect();
        let mut known = Self {
            paths: BTreeSet::new(),
            by_suffix: HashMap::new(),
            index_by_dir_suffix: HashMap::new(),
            by_dir_suffix: HashMap::new(),
        };

        for path in &paths {
            for suffix in suffixes(strip_extension(path)) {
                known.by_suffix.entry(suffix).or_insert_with(|| path.clone());
            }

            let dir = parent_dir(path);
            if dir.is_empty() {
                continue;
            }
            let is_index = INDEX_STEMS.contains(&file_stem(path));
            for suffix in suffixes(dir) {
                if is_index {
                    known
                        .index_by_dir_suffix
                        .entry(suffix.clone())
                        .or_insert_with(|| path.clone());
                }
                known.by_dir_suffix.entry(suffix).or_insert_with(|| path.clone());
            }
        }

        known.paths = paths;
        known
    }

    pub fn from_map(map: &RepoMap) -> Self {
        Self::new(map.paths())
    }

    pub fn contains(&self, path: &str) -> bool {
        self.paths.contains(path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Known file whose extension-less path is `spec` or ends with `/spec`.
    pub fn match_trailing(&self, spec: &str) -> Option<&str> {
        self.by_suffix.get(spec).map(|s| s.as_str())
    }

    /// First file of a directory whose path is `spec` or ends with `/spec`,
    /// preferring index-like files.
    pub fn match_directory(&self, spec: &str) -> Option<&str> {
        self.index_by_dir_suffix
            .get(spec)
            .or_else(|| self.by_dir_suffix.get(spec))
            .map(|s| s.as_str())
    }

    fn match_index_directory(&self, spec: &str) -> Option<&str> {
        self.index_by_dir_suffix.get(spec).map(|s| s.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Family {
    Script,
    Python,
    Rust,
    Go,
    Java,
    Other,
}

impl Family {
    fn of(path: &str) -> Self {
        let ext = path.rsplit_once('.').map(|(_, ext)| ext).unwrap_or("");
        match ext {
            "js" | "jsx" | "mjs" | "cjs" | "ts" | "tsx" | "mts" | "cts" => Family::Script,
            "py" | "pyi" => Family::Python,
            "rs" => Family::Rust,
            "go" => Family::Go,
            "java" => Family::Java,
            _ => Family::Other,
        }
    }

    fn extensions(&self) -> &'static [&'static str] {
        match self {
            Family::Script => &["ts", "tsx", "js", "jsx", "mjs", "cjs", "mts", "cts", "d.ts"],
            Family::Python => &["py", "pyi"],
            Family::Rust => &["rs"],
            Family::Go => &["go"],
            Family::Java => &["java"],
            Family::Other => &[],
        }
    }
}

/// Default resolver: relative path + extension list, then trailing match.
#[derive(Debug, Clone)]
pub struct HeuristicResolver {
    fallback_extensions: Vec<String>,
}

impl HeuristicResolver {
    pub fn new() -> Self {
        Self {
            fallback_extensions: crate::REGISTRY
                .source_extensions()
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }

    /// Trailing-path match, then an index file of a matching directory.
    fn trailing(&self, spec: &str, files: &KnownFiles) -> Option<String> {
        let spec = spec.trim_matches('/');
        if spec.is_empty() {
            return None;
        }
        let spec = self.strip_known_extension(spec);
        files
            .match_trailing(spec)
            .or_else(|| files.match_index_directory(spec))
            .map(String::from)
    }

    fn strip_known_extension<'a>(&self, spec: &'a str) -> &'a str {
        let stripped = strip_extension(spec);
        let ext = spec[stripped.len()..].trim_start_matches('.');
        if self.fallback_extensions.iter().any(|e| e == ext) {
            stripped
        } else {
            spec
        }
    }

    /// Try `base` as a file, `base.<ext>`, then an index file inside `base`.
    fn lookup(&self, base: &str, family: Family, files: &KnownFiles) -> Option<String> {
        if base.is_empty() {
            return None;
        }
        if files.contains(base) {
            return Some(base.to_string());
        }

        let own = family.extensions().iter().map(|e| e.to_string());
        let rest = self.fallback_extensions.iter().cloned();
        let extensions: Vec<String> = own.chain(rest).collect();

        for ext in &extensions {
            let candidate = format!("{}.{}", base, ext);
            if files.contains(&candidate) {
                return Some(candidate);
            }
        }
        for stem in INDEX_STEMS {
            for ext in &extensions {
                let candidate = format!("{}/{}.{}", base, stem, ext);
                if files.contains(&candidate) {
                    return Some(candidate);
                }
            }
        }
        None
    }

    fn resolve_script(&self, importer: &str, source: &str, files: &KnownFiles) -> Option<String> {
        if is_relative(source) {
            return self.resolve_relative(parent_dir(importer), source, Family::Script, files);
        }

        // Common project aliases for the source root
        let spec = source
            .strip_prefix("@/")
            .or_else(|| source.strip_prefix("~/"))
            .unwrap_or(source);
        let aliased = spec.len() != source.len();

        if !aliased && (spec.starts_with('@') || !spec.contains('/')) {
            // npm package; only a root-level file of the same name qualifies
            return self.lookup(spec, Family::Script, files);
        }

        self.lookup(spec, Family::Script, files)
            .or_else(|| self.lookup(&format!("src/{}", spec), Family::Script, files))
            .or_else(|| self.trailing(spec, files))
    }

    fn resolve_relative(
        &self,
        base_dir: &str,
        spec: &str,
        family: Family,
        files: &KnownFiles,
    ) -> Option<String> {
        if let Some(joined) = join_path(base_dir, spec) {
            if let Some(hit) = self.lookup(&joined, family, files) {
                return Some(hit);
            }
        }
        let stripped = strip_relative_prefix(spec);
        if stripped.is_empty() {
            return None;
        }
        self.trailing(stripped, files)
    }

    fn resolve_python(&self, importer: &str, source: &str, files: &KnownFiles) -> Option<String> {
        let dots = source.chars().take_while(|c| *c == '.').count();
        let module = source[dots..].replace('.', "/");

        if dots > 0 {
            let mut spec = String::from(if dots == 1 { "./" } else { "" });
            for _ in 1..dots {
                spec.push_str("../");
            }
            spec.push_str(&module);
            return self.resolve_relative(parent_dir(importer), &spec, Family::Python, files);
        }

        self.lookup(&module, Family::Python, files)
            .or_else(|| {
                let local = join_path(parent_dir(importer), &module)?;
                self.lookup(&local, Family::Python, files)
            })
            .or_else(|| self.trailing(&module, files))
    }

    fn resolve_rust(&self, importer: &str, source: &str, files: &KnownFiles) -> Option<String> {
        let path = source
            .split("::{")
            .next()
            .unwrap_or(source)
            .trim()
            .trim_start_matches("::");
        let segments: Vec<&str> = path
            .split("::")
            .map(str::trim)
            .filter(|s| !s.is_empty() && *s != "*")
            .collect();
        let first = *segments.first()?;

        let (base, rest, anchored) = match first {
            "crate" => (rust_crate_root(importer, files), &segments[1..], true),
            "self" => (rust_module_dir(importer), &segments[1..], true),
            "super" => {
                let supers = segments.iter().take_while(|s| **s == "super").count();
                let mut dir = rust_module_dir(importer);
                for _ in 0..supers {
                    dir = parent_dir(&dir).to_string();
                }
                (dir, &segments[supers..], true)
            }
            _ => (rust_module_dir(importer), &segments[..], false),
        };

        // Trailing segments may name items rather than modules
        for len in (1..=rest.len()).rev() {
            let module = rest[..len].join("/");
            let joined = if base.is_empty() {
                module.clone()
            } else {
                format!("{}/{}", base, module)
            };
            if let Some(hit) = self.lookup(&joined, Family::Rust, files) {
                return Some(hit);
            }
            if anchored {
                if let Some(hit) = self.trailing(&module, files) {
                    return Some(hit);
                }
            }
        }

        // `super::{A, B}`, `crate::Item`: the anchor module itself
        if anchored {
            return rust_module_file(&base, files);
        }
        None
    }

    fn resolve_go(&self, source: &str, files: &KnownFiles) -> Option<String> {
        if is_relative(source) {
            let spec = strip_relative_prefix(source);
            return files.match_directory(spec).map(String::from);
        }
        let segments: Vec<&str> = source.split('/').filter(|s| !s.is_empty()).collect();
        if segments.len() < 2 {
            // Standard library package
            return None;
        }
        (0..segments.len())
            .map(|start| segments[start..].join("/"))
            .find_map(|suffix| files.match_directory(&suffix).map(String::from))
    }

    fn resolve_java(&self, source: &str, files: &KnownFiles) -> Option<String> {
        let source = source.trim_start_matches("static ").trim();
        if let Some(package) = source.strip_suffix(".*") {
            return files.match_directory(&package.replace('.', "/")).map(String::from);
        }
        let path = source.replace('.', "/");
        self.trailing(&path, files).or_else(|| {
            // `import static pkg.Type.member`
            let (owner, _) = path.rsplit_once('/')?;
            self.trailing(owner, files)
        })
    }
}

impl Default for HeuristicResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl ImportResolver for HeuristicResolver {
    fn resolve(&self, importer: &str, source: &str, files: &KnownFiles) -> Option<String> {
        let source = source.trim();
        if source.is_empty() {
            return None;
        }

        let resolved = match Family::of(importer) {
            Family::Script | Family::Other => self.resolve_script(importer, source, files),
            Family::Python => self.resolve_python(importer, source, files),
            Family::Rust => self.resolve_rust(importer, source, files),
            Family::Go => self.resolve_go(source, files),
            Family::Java => self.resolve_java(source, files),
        };

        resolved.filter(|target| target != importer)
    }
}

fn is_relative(spec: &str) -> bool {
    spec == "." || spec == ".." || spec.starts_with("./") || spec.starts_with("../")
}

fn strip_relative_prefix(spec: &str) -> &str {
    let mut rest = spec;
    loop {
        if let Some(r) = rest.strip_prefix("./") {
            rest = r;
        } else if let Some(r) = rest.strip_prefix("../") {
            rest = r;
        } else {
            break;
        }
    }
    rest.trim_end_matches('/')
}

/// Join `spec` onto `base_dir`, resolving `.` and `..`. `None` when the
/// result would escape the repository root.
fn join_path(base_dir: &str, spec: &str) -> Option<String> {
    let mut parts: Vec<&str> = base_dir.split('/').filter(|s| !s.is_empty()).collect();
    for segment in spec.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop()?;
            }
            other => parts.push(other),
        }
    }
    Some(parts.join("/"))
}

/// Every trailing run of segments: `a/b/c` -> `a/b/c`, `b/c`, `c`.
fn suffixes(path: &str) -> Vec<String> {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    (0..segments.len())
        .map(|start| segments[start..].join("/"))
        .collect()
}

fn strip_extension(path: &str) -> &str {
    let name_start = path.rfind('/').map(|i| i + 1).unwrap_or(0);
    match path[name_start..].rfind('.') {
        Some(0) | None => path,
        Some(dot) => &path[..name_start + dot],
    }
}

/// Directory holding the child modules of a Rust source file.
fn rust_module_dir(importer: &str) -> String {
    let dir = parent_dir(importer);
    match file_stem(importer) {
        "lib" | "main" | "mod" => dir.to_string(),
        stem if dir.is_empty() => stem.to_string(),
        stem => format!("{}/{}", dir, stem),
    }
}

/// Source file of the module whose children live in `dir`.
fn rust_module_file(dir: &str, files: &KnownFiles) -> Option<String> {
    let candidates = if dir.is_empty() {
        vec!["lib.rs".to_string(), "main.rs".to_string(), "mod.rs".to_string()]
    } else {
        vec![
            format!("{}/mod.rs", dir),
            format!("{}.rs", dir),
            format!("{}/lib.rs", dir),
            format!("{}/main.rs", dir),
        ]
    };
    candidates.into_iter().find(|candidate| files.contains(candidate))
}

/// Nearest ancestor directory holding `lib.rs` or `main.rs`.
fn rust_crate_root(importer: &str, files: &KnownFiles) -> String {
    let mut dir = parent_dir(importer);
    loop {
        let prefix = if dir.is_empty() {
            String::new()
        } else {
            format!("{}/", dir)
        };
        if files.contains(&format!("{}lib.rs", prefix))
            || files.contains(&format!("{}main.rs", prefix))
        {
            return dir.to_string();
        }
        if dir.is_empty() {
            return "src".to_string();
        }
        dir = parent_dir(dir);
    }
}
