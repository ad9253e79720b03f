//! Usage index derived from a [`RepoMap`].
//!
//! Built once per analysis by a pure function and never mutated afterwards.
//! All lookups are single hash-map lookups returning owned, sorted vectors.

use std::collections::{BTreeSet, HashMap};

use crate::index::import_resolver::{HeuristicResolver, ImportResolver, KnownFiles};
use crate::index::models::RepoMap;

/// Key of the symbol usage table: `"<file>:<symbol>"`.
pub fn symbol_key(file: &str, symbol: &str) -> String {
    format!("{}:{}", file, symbol)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsageIndex {
    /// `"file:symbol"` -> files importing that symbol from that file
    pub by_symbol: HashMap<String, BTreeSet<String>>,
    /// file -> files importing it
    pub by_file: HashMap<String, BTreeSet<String>>,
    /// file -> names it exports
    pub exports_by_file: HashMap<String, BTreeSet<String>>,
}

impl UsageIndex {
    /// Files importing `symbol` from `file`, excluding `file` itself.
    pub fn find_usages(&self, file: &str, symbol: &str) -> Vec<String> {
        self.by_symbol
            .get(&symbol_key(file, symbol))
            .map(|users| users.iter().filter(|u| *u != file).cloned().collect())
            .unwrap_or_default()
    }

    /// Files importing `file`, excluding `file` itself.
    pub fn find_dependents(&self, file: &str) -> Vec<String> {
        self.by_file
            .get(file)
            .map(|users| users.iter().filter(|u| *u != file).cloned().collect())
            .unwrap_or_default()
    }

    pub fn has_dependents(&self, file: &str) -> bool {
        self.by_file
            .get(file)
            .is_some_and(|users| users.iter().any(|u| u != file))
    }

    pub fn exports_of(&self, file: &str) -> Vec<String> {
        self.exports_by_file
            .get(file)
            .map(|names| names.iter().cloned().collect())
            .unwrap_or_default()
    }
}

/// Build the usage index with the default [`HeuristicResolver`].
pub fn build_usage_index(map: &RepoMap) -> UsageIndex {
    build_usage_index_with(map, &HeuristicResolver::new())
}

/// Build the usage index resolving imports through `resolver`.
///
/// Unresolved imports and self-imports record nothing.
pub fn build_usage_index_with(map: &RepoMap, resolver: &dyn ImportResolver) -> UsageIndex {
    let known = KnownFiles::from_map(map);
    let mut index = UsageIndex::default();

    for (file, entry) in &map.files {
        index
            .exports_by_file
            .insert(file.clone(), entry.export_names().map(String::from).collect());

        for import in &entry.imports {
            let Some(target) = resolver.resolve(file, &import.source, &known) else {
                continue;
            };
            if &target == file {
                continue;
            }

            index
                .by_file
                .entry(target.clone())
                .or_default()
                .insert(file.clone());

            for name in &import.names {
                index
                    .by_symbol
                    .entry(symbol_key(&target, name))
                    .or_default()
                    .insert(file.clone());
            }
        }
    }

    index
}

/// Files importing `symbol` from `file`; empty on miss.
pub fn find_usages(index: &UsageIndex, file: &str, symbol: &str) -> Vec<String> {
    index.find_usages(file, symbol)
}

/// Files importing `file`; empty on miss.
pub fn find_dependents(index: &UsageIndex, file: &str) -> Vec<String> {
    index.find_dependents(file)
}
