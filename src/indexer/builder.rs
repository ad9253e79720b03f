//! Repo map construction and the availability contract around it.
//!
//! [`build_repo_map`] is the fallible primitive. [`ensure_repo_map`] and
//! [`ensure_repo_map_sync`] wrap it so that every failure becomes a
//! [`RepoMapStatus`] with a reason instead of an error.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::prelude::*;
use serde::Serialize;

use crate::config::ProjectConfig;
use crate::error::{RepoMapError, Result};
use crate::index::models::{normalize_rel_path, FileEntry, RepoMap};
use crate::indexer::extractor::SymbolExtractor;
use crate::indexer::matcher::{AstGrepMatcher, StructuralMatcher};
use crate::indexer::walker::FileWalker;

#[derive(Clone, Default)]
pub struct BuildOptions {
    /// Languages or aliases; empty means every language with files present
    pub languages: Vec<String>,
    /// Per-language ceiling on candidate files
    pub max_files: Option<usize>,
    /// Pre-loaded file bodies keyed by relative path
    pub contents: HashMap<String, String>,
    /// Directory names excluded on top of the defaults
    pub exclude_dirs: Vec<String>,
    /// Overrides the default `ast-grep` matcher
    pub matcher: Option<Arc<dyn StructuralMatcher>>,
    /// Only honoured by [`ensure_repo_map`]
    pub timeout: Option<Duration>,
}

impl std::fmt::Debug for BuildOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuildOptions")
            .field("languages", &self.languages)
            .field("max_files", &self.max_files)
            .field("contents", &self.contents.len())
            .field("exclude_dirs", &self.exclude_dirs)
            .field("matcher", &self.matcher.is_some())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl BuildOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &ProjectConfig) -> Self {
        let matcher: Option<Arc<dyn StructuralMatcher>> = config
            .matcher
            .binary
            .as_ref()
            .map(|binary| {
                Arc::new(AstGrepMatcher::with_binary(binary)) as Arc<dyn StructuralMatcher>
            });
        Self {
            languages: config.languages.clone(),
            max_files: config.max_files,
            exclude_dirs: config.exclude_dirs.clone(),
            matcher,
            timeout: config.timeout(),
            ..Default::default()
        }
    }

    pub fn with_languages<I, S>(mut self, languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.languages = languages.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_max_files(mut self, max_files: usize) -> Self {
        self.max_files = Some(max_files);
        self
    }

    pub fn with_contents(mut self, contents: HashMap<String, String>) -> Self {
        self.contents = contents;
        self
    }

    pub fn with_matcher(mut self, matcher: Arc<dyn StructuralMatcher>) -> Self {
        self.matcher = Some(matcher);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn matcher(&self) -> Arc<dyn StructuralMatcher> {
        self.matcher
            .clone()
            .unwrap_or_else(|| Arc::new(AstGrepMatcher::new()))
    }

    fn max_files(&self) -> usize {
        self.max_files.unwrap_or(crate::config::DEFAULT_MAX_FILES)
    }
}

/// Outcome of asking for a repo map.
///
/// `available == false` always comes with a non-empty `fallback_reason`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoMapStatus {
    pub available: bool,
    pub map: Option<RepoMap>,
    pub fallback_reason: Option<String>,
}

/// Which analysis path a consumer should take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Analysis<'a> {
    Full(&'a RepoMap),
    Degraded(&'a str),
}

impl RepoMapStatus {
    pub fn ready(map: RepoMap) -> Self {
        Self {
            available: true,
            map: Some(map),
            fallback_reason: None,
        }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        let mut reason = reason.into();
        if reason.trim().is_empty() {
            reason = "repo map unavailable".to_string();
        }
        Self {
            available: false,
            map: None,
            fallback_reason: Some(reason),
        }
    }

    pub fn analysis(&self) -> Analysis<'_> {
        match (&self.map, &self.fallback_reason) {
            (Some(map), _) if self.available => Analysis::Full(map),
            (_, Some(reason)) => Analysis::Degraded(reason),
            _ => Analysis::Degraded("repo map unavailable"),
        }
    }

    pub fn into_map(self) -> Option<RepoMap> {
        if self.available {
            self.map
        } else {
            None
        }
    }
}

/// Build a map for `languages` under `root`.
///
/// Unknown languages are skipped. Files whose read or match fails are
/// dropped from the map.
pub fn build_repo_map<S: AsRef<str>>(
    root: &Path,
    languages: &[S],
    options: &BuildOptions,
) -> Result<RepoMap> {
    build_cancellable(root, languages, options, &AtomicBool::new(false))
}

fn build_cancellable<S: AsRef<str>>(
    root: &Path,
    languages: &[S],
    options: &BuildOptions,
    cancelled: &AtomicBool,
) -> Result<RepoMap> {
    if !root.is_dir() {
        return Err(RepoMapError::InvalidPath(format!(
            "{} is not a directory",
            root.display()
        )));
    }

    let start = Instant::now();
    let matcher = options.matcher();
    let extractor = SymbolExtractor::new(matcher.as_ref());
    let walker = FileWalker::with_excludes(options.exclude_dirs.iter().cloned());
    let contents: HashMap<String, &String> = options
        .contents
        .iter()
        .map(|(path, body)| (normalize_rel_path(path), body))
        .collect();

    let mut map = RepoMap::new();
    let mut built = Vec::new();

    for language in languages {
        let language = language.as_ref();
        let Some(name) = crate::REGISTRY.canonical_name(language) else {
            tracing::debug!("Skipping unsupported language: {}", language);
            continue;
        };
        if built.contains(&name) {
            continue;
        }
        built.push(name);

        let Some(table) = crate::REGISTRY.patterns_for(name) else {
            continue;
        };
        let files = walker.find_files(root, name, options.max_files())?;
        tracing::debug!("{}: {} candidate files", name, files.len());

        let entries: Vec<(String, FileEntry)> = files
            .par_iter()
            .filter_map(|rel| {
                if cancelled.load(Ordering::Relaxed) {
                    return None;
                }
                let source = match contents.get(rel) {
                    Some(body) => (*body).clone(),
                    None => match std::fs::read_to_string(root.join(rel)) {
                        Ok(body) => body,
                        Err(e) => {
                            tracing::debug!("Dropping {}: {}", rel, e);
                            return None;
                        }
                    },
                };
                let dialect = crate::REGISTRY.dialect_for(Path::new(rel), name)?;
                match extractor.extract(table, dialect, &source) {
                    Ok(entry) => Some((rel.clone(), entry)),
                    Err(e) => {
                        tracing::warn!("Dropping {}: {}", rel, e);
                        None
                    }
                }
            })
            .collect();

        for (rel, entry) in entries {
            map.insert(&rel, entry);
        }
    }

    if cancelled.load(Ordering::Relaxed) {
        return Err(RepoMapError::Matcher("build cancelled".to_string()));
    }

    let stats = map.stats();
    tracing::info!(
        "Built repo map: {} files, {} symbols, {} imports in {:?}",
        stats.file_count,
        stats.symbol_count,
        stats.import_count,
        start.elapsed()
    );
    Ok(map)
}

/// Canonical languages to build: the requested ones, or every registered
/// language with at least one file under `root`.
fn resolve_languages(root: &Path, options: &BuildOptions) -> Vec<&'static str> {
    if !options.languages.is_empty() {
        let mut names = Vec::new();
        for language in &options.languages {
            if let Some(name) = crate::REGISTRY.canonical_name(language) {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }
        return names;
    }

    let walker = FileWalker::with_excludes(options.exclude_dirs.iter().cloned());
    crate::REGISTRY
        .supported_languages()
        .into_iter()
        .filter(|name| {
            walker
                .find_files(root, name, 1)
                .is_ok_and(|files| !files.is_empty())
        })
        .collect()
}

fn ensure_cancellable(
    root: &Path,
    options: &BuildOptions,
    cancelled: &AtomicBool,
) -> RepoMapStatus {
    if !root.is_dir() {
        return RepoMapStatus::unavailable(format!("repository root not found: {}", root.display()));
    }

    if let Err(e) = options.matcher().check_available() {
        return RepoMapStatus::unavailable(e.to_string());
    }

    let languages = resolve_languages(root, options);
    if languages.is_empty() {
        return RepoMapStatus::unavailable(if options.languages.is_empty() {
            format!("no supported languages found in {}", root.display())
        } else {
            format!("no supported languages among: {}", options.languages.join(", "))
        });
    }

    match build_cancellable(root, &languages, options, cancelled) {
        Ok(map) => RepoMapStatus::ready(map),
        Err(e) => RepoMapStatus::unavailable(format!("repo map build failed: {}", e)),
    }
}

/// Blocking variant of [`ensure_repo_map`]. Never fails.
pub fn ensure_repo_map_sync(root: &Path, options: &BuildOptions) -> RepoMapStatus {
    ensure_cancellable(root, options, &AtomicBool::new(false))
}

/// Flags the build as cancelled when the awaiting future goes away.
struct CancelOnDrop(Arc<AtomicBool>);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.0.store(true, Ordering::Relaxed);
    }
}

/// Build on the blocking pool, bounded by `options.timeout`. Never fails:
/// timeouts and panics resolve to an unavailable status.
pub async fn ensure_repo_map(root: impl Into<PathBuf>, options: BuildOptions) -> RepoMapStatus {
    let root = root.into();
    let timeout = options.timeout;
    let cancelled = Arc::new(AtomicBool::new(false));
    let _guard = CancelOnDrop(cancelled.clone());

    let flag = cancelled.clone();
    let task = tokio::task::spawn_blocking(move || ensure_cancellable(&root, &options, &flag));

    let joined = match timeout {
        Some(limit) => match tokio::time::timeout(limit, task).await {
            Ok(joined) => joined,
            Err(_) => {
                tracing::warn!("Repo map build timed out after {:?}", limit);
                return RepoMapStatus::unavailable(format!(
                    "repo map build timed out after {}s",
                    limit.as_secs_f64()
                ));
            }
        },
        None => task.await,
    };

    match joined {
        Ok(status) => status,
        Err(e) => RepoMapStatus::unavailable(format!("repo map task failed: {}", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indexer::matcher::PatternMatch;
    use std::fs;
    use tempfile::TempDir;

    /// Answers `export function $NAME` style patterns by scanning lines.
    struct LineMatcher;

    impl StructuralMatcher for LineMatcher {
        fn check_available(&self) -> Result<()> {
            Ok(())
        }

        fn find_matches(&self, pattern: &str, _: &str, source: &str) -> Result<Vec<PatternMatch>> {
            if source.contains("SYNTAX ERROR") {
                return Err(RepoMapError::Matcher("parse failure".into()));
            }
            if pattern != "export function $NAME($$$PARAMS) { $$$BODY }" {
                return Ok(Vec::new());
            }
            Ok(source
                .lines()
                .enumerate()
                .filter_map(|(i, line)| {
                    let rest = line.strip_prefix("export function ")?;
                    let name = rest.split('(').next()?;
                    Some(PatternMatch::new(line, i).with_single("NAME", name))
                })
                .collect())
        }
    }

    struct MissingMatcher;

    impl StructuralMatcher for MissingMatcher {
        fn check_available(&self) -> Result<()> {
            Err(RepoMapError::Matcher("matcher tool not installed".into()))
        }

        fn find_matches(&self, _: &str, _: &str, _: &str) -> Result<Vec<PatternMatch>> {
            Err(RepoMapError::Matcher("matcher tool not installed".into()))
        }
    }

    fn options() -> BuildOptions {
        BuildOptions::new().with_matcher(Arc::new(LineMatcher))
    }

    fn repo() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("utils.js"), "export function formatDate() {}\n").unwrap();
        fs::create_dir_all(dir.path().join("lib")).unwrap();
        fs::write(dir.path().join("lib/broken.js"), "SYNTAX ERROR\n").unwrap();
        dir
    }

    #[test]
    fn test_build_drops_failing_files() {
        let dir = repo();
        let map = build_repo_map(dir.path(), &["javascript"], &options()).unwrap();
        assert_eq!(map.paths().collect::<Vec<_>>(), vec!["utils.js"]);
        assert_eq!(
            map.get("utils.js").unwrap().export_names().collect::<Vec<_>>(),
            vec!["formatDate"]
        );
    }

    #[test]
    fn test_build_skips_unknown_languages() {
        let dir = repo();
        let map = build_repo_map(dir.path(), &["cobol"], &options()).unwrap();
        assert!(map.is_empty());
    }

    #[test]
    fn test_preloaded_contents_win_over_disk() {
        let dir = repo();
        let mut contents = HashMap::new();
        contents.insert("./utils.js".to_string(), "export function parseDate() {}\n".to_string());
        let map = build_repo_map(dir.path(), &["js"], &options().with_contents(contents)).unwrap();
        assert_eq!(
            map.get("utils.js").unwrap().export_names().collect::<Vec<_>>(),
            vec!["parseDate"]
        );
    }

    #[test]
    fn test_build_rejects_missing_root() {
        let dir = TempDir::new().unwrap();
        let err = build_repo_map(&dir.path().join("missing"), &["js"], &options()).unwrap_err();
        assert!(matches!(err, RepoMapError::InvalidPath(_)));
    }

    #[test]
    fn test_ensure_sync_available() {
        let dir = repo();
        let status = ensure_repo_map_sync(dir.path(), &options());
        assert!(status.available);
        assert!(status.fallback_reason.is_none());
        assert!(matches!(status.analysis(), Analysis::Full(map) if map.contains("utils.js")));
    }

    #[test]
    fn test_ensure_sync_matcher_missing() {
        let dir = repo();
        let options = BuildOptions::new().with_matcher(Arc::new(MissingMatcher));
        let status = ensure_repo_map_sync(dir.path(), &options);
        assert!(!status.available);
        assert!(status.map.is_none());
        assert!(status.fallback_reason.unwrap().contains("not installed"));
    }

    #[test]
    fn test_ensure_sync_no_languages() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("README.md"), "# hi").unwrap();
        let status = ensure_repo_map_sync(dir.path(), &options());
        assert!(!status.available);
        assert!(matches!(
            status.analysis(),
            Analysis::Degraded(reason) if reason.contains("no supported languages")
        ));

        let status = ensure_repo_map_sync(dir.path(), &options().with_languages(["cobol"]));
        assert!(!status.available);
    }

    #[test]
    fn test_ensure_sync_missing_root() {
        let dir = TempDir::new().unwrap();
        let status = ensure_repo_map_sync(&dir.path().join("gone"), &options());
        assert!(!status.available);
        assert!(!status.fallback_reason.unwrap().is_empty());
    }

    #[test]
    fn test_unavailable_reason_never_empty() {
        let status = RepoMapStatus::unavailable("  ");
        assert_eq!(status.fallback_reason.as_deref(), Some("repo map unavailable"));
        assert!(status.into_map().is_none());
    }

    #[test]
    fn test_status_serializes_camel_case() {
        let status = RepoMapStatus::unavailable("matcher tool not installed");
        let json = serde_json::to_value(status).unwrap();
        assert_eq!(json["available"], false);
        assert_eq!(json["fallbackReason"], "matcher tool not installed");
        assert!(json["map"].is_null());
    }

    #[tokio::test]
    async fn test_async_matches_sync_shape() {
        let dir = repo();
        let sync = ensure_repo_map_sync(dir.path(), &options());
        let async_status = ensure_repo_map(dir.path(), options()).await;
        assert_eq!(sync, async_status);
    }

    #[tokio::test]
    async fn test_async_timeout_is_unavailable() {
        struct SlowMatcher;
        impl StructuralMatcher for SlowMatcher {
            fn check_available(&self) -> Result<()> {
                std::thread::sleep(Duration::from_millis(500));
                Ok(())
            }
            fn find_matches(&self, _: &str, _: &str, _: &str) -> Result<Vec<PatternMatch>> {
                Ok(Vec::new())
            }
        }

        let dir = repo();
        let options = BuildOptions::new()
            .with_matcher(Arc::new(SlowMatcher))
            .with_timeout(Duration::from_millis(20));
        let status = ensure_repo_map(dir.path(), options).await;
        assert!(!status.available);
        assert!(status.fallback_reason.unwrap().contains("timed out"));
    }
}
