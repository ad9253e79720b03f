pub mod analysis;
pub mod config;
pub mod error;
pub mod index;
pub mod indexer;
pub mod languages;

use once_cell::sync::Lazy;

pub use analysis::{
    find_circular_dependencies, find_orphaned_infrastructure, find_unused_exports,
    get_dependency_graph, get_exports_from_repo_map, is_entry_point, is_internal_export,
    DependencyGraph, OrphanedItem, UnusedExport,
};
pub use config::ProjectConfig;
pub use error::{RepoMapError, Result};
pub use index::{
    build_usage_index, build_usage_index_with, find_dependents, find_usages, FileEntry,
    HeuristicResolver, ImportRef, ImportResolver, RepoMap, SymbolRef, UsageIndex,
};
pub use indexer::{
    build_repo_map, ensure_repo_map, ensure_repo_map_sync, find_files_for_language, Analysis,
    AstGrepMatcher, BuildOptions, RepoMapStatus, StructuralMatcher,
};
pub use languages::{dialect_for, patterns_for, LanguageRegistry, QueryPattern, QueryTable};

/// Global language registry instance (lazily initialized)
pub static REGISTRY: Lazy<LanguageRegistry> = Lazy::new(LanguageRegistry::new);
