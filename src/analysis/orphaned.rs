//! Unused "infrastructure": base classes, services and factories that
//! nothing outside their own directory subtree imports.
//!
//! The heuristics are lexical and have no type information, so only
//! high-certainty findings are produced. Entry points and test files are
//! skipped, and any namespace or wildcard import of the defining file
//! counts as a use.
//!
//! Only exported classes and functions are candidates. A declaration that
//! is not exported cannot be imported from another file, so it is never
//! reported here.

use std::collections::{BTreeSet, HashMap};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::analysis::exports::{is_entry_point, is_test_file};
use crate::analysis::graph::resolve_imports;
use crate::index::import_resolver::{HeuristicResolver, ImportResolver};
use crate::index::models::{parent_dir, FileEntry, RepoMap};
use crate::index::usage::build_usage_index_with;

static INFRASTRUCTURE_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(Base|Abstract)[A-Z_]|(Base|Service|Provider|Repository|Adapter|Manager|Client|Gateway|Handler|Middleware)$")
        .expect("infrastructure pattern is a valid regex")
});

static FACTORY_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(create|make|build)([A-Z_0-9]|$)|Factory$")
        .expect("factory pattern is a valid regex")
});

const INFRASTRUCTURE_DIRS: &[&str] = &[
    "base",
    "abstract",
    "services",
    "service",
    "infrastructure",
    "infra",
    "adapters",
    "providers",
];

const CLASS_KINDS: &[&str] = &["class", "struct", "trait", "interface", "abstract"];

const FUNCTION_KINDS: &[&str] = &["function", "method", "arrow", "generator"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OrphanKind {
    Infrastructure,
    Factory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Certainty {
    #[serde(rename = "HIGH")]
    High,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrphanedItem {
    pub file: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: OrphanKind,
    pub certainty: Certainty,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    pub reason: String,
}

/// Declared kind of an exported name: the export's own kind, else the kind
/// of a class or function declared under that name.
fn declared_kind<'a>(
    entry: &'a FileEntry,
    name: &str,
    export_kind: Option<&'a str>,
) -> Option<&'a str> {
    export_kind.filter(|k| *k != "named").or_else(|| {
        entry
            .symbols
            .classes
            .iter()
            .chain(&entry.symbols.functions)
            .chain(&entry.symbols.types)
            .find(|s| s.name == name)
            .and_then(|s| s.kind.as_deref())
    })
}

/// Classify an exported item, if it looks like infrastructure.
pub fn classify(file: &str, name: &str, kind: Option<&str>) -> Option<OrphanKind> {
    let class_like = kind.map_or(true, |k| CLASS_KINDS.contains(&k));
    let function_like = kind.map_or(true, |k| FUNCTION_KINDS.contains(&k));

    if name.ends_with("Factory") || (function_like && FACTORY_NAME.is_match(name)) {
        return Some(OrphanKind::Factory);
    }
    if class_like {
        let in_infra_dir = file
            .split('/')
            .rev()
            .skip(1)
            .any(|segment| INFRASTRUCTURE_DIRS.contains(&segment));
        if INFRASTRUCTURE_NAME.is_match(name) || in_infra_dir {
            return Some(OrphanKind::Infrastructure);
        }
    }
    None
}

pub fn find_orphaned_infrastructure(map: &RepoMap) -> Vec<OrphanedItem> {
    find_orphaned_infrastructure_with(map, &HeuristicResolver::new())
}

pub fn find_orphaned_infrastructure_with(
    map: &RepoMap,
    resolver: &dyn ImportResolver,
) -> Vec<OrphanedItem> {
    let index = build_usage_index_with(map, resolver);

    let mut wildcard_importers: HashMap<&str, BTreeSet<&str>> = HashMap::new();
    for edge in resolve_imports(map, resolver) {
        if edge.import.is_wildcard() {
            wildcard_importers.entry(edge.to).or_default().insert(edge.from);
        }
    }

    let mut orphans = Vec::new();
    for (file, entry) in &map.files {
        if is_entry_point(file) || is_test_file(file) {
            continue;
        }
        let dir = parent_dir(file);
        let subtree = format!("{}/", dir);

        let mut checked: Vec<&str> = Vec::new();
        for symbol in &entry.symbols.exports {
            let name = symbol.name.as_str();
            if checked.contains(&name) || name == "default" {
                continue;
            }
            checked.push(name);

            let kind = declared_kind(entry, name, symbol.kind.as_deref());
            let Some(orphan_kind) = classify(file, name, kind) else {
                continue;
            };

            let mut importers: BTreeSet<String> =
                index.find_usages(file, name).into_iter().collect();
            if let Some(wildcards) = wildcard_importers.get(file.as_str()) {
                importers.extend(wildcards.iter().map(|f| f.to_string()));
            }

            let reason = if dir.is_empty() {
                if !importers.is_empty() {
                    continue;
                }
                format!("`{}` is exported but never imported", name)
            } else {
                if importers.iter().any(|importer| !importer.starts_with(&subtree)) {
                    continue;
                }
                if importers.is_empty() {
                    format!("`{}` is exported but never imported", name)
                } else {
                    format!("`{}` is only imported from within {}/", name, dir)
                }
            };

            orphans.push(OrphanedItem {
                file: file.clone(),
                name: name.to_string(),
                kind: orphan_kind,
                certainty: Certainty::High,
                line: symbol.line,
                reason,
            });
        }
    }

    orphans
}
