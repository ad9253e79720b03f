use serde::Serialize;

use crate::analysis::exports::is_entry_point;
use crate::index::import_resolver::{HeuristicResolver, ImportResolver};
use crate::index::models::RepoMap;
use crate::index::usage::build_usage_index_with;

pub const UNUSED_EXPORT_TYPE: &str = "undocumented-export";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnusedExport {
    pub file: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
}

pub fn find_unused_exports(map: &RepoMap) -> Vec<UnusedExport> {
    find_unused_exports_with(map, &HeuristicResolver::new())
}

/// Every export of every non-entry-point file nothing imports.
///
/// Files with at least one dependent are not inspected export by export.
pub fn find_unused_exports_with(map: &RepoMap, resolver: &dyn ImportResolver) -> Vec<UnusedExport> {
    let index = build_usage_index_with(map, resolver);
    let mut unused = Vec::new();

    for (file, entry) in &map.files {
        if is_entry_point(file) || index.has_dependents(file) {
            continue;
        }
        let mut reported: Vec<&str> = Vec::new();
        for symbol in &entry.symbols.exports {
            if reported.contains(&symbol.name.as_str()) {
                continue;
            }
            reported.push(&symbol.name);
            unused.push(UnusedExport {
                file: file.clone(),
                name: symbol.name.clone(),
                kind: UNUSED_EXPORT_TYPE,
                line: symbol.line,
            });
        }
    }

    unused
}
