//! Whole-program analyses over a [`RepoMap`](crate::index::RepoMap).
//!
//! Every function here is pure: it builds a fresh usage index or graph
//! from the map in hand and returns owned results.

pub mod exports;
pub mod graph;
pub mod orphaned;
pub mod unused;

pub use exports::{get_exports_from_repo_map, is_entry_point, is_internal_export, is_test_file};
pub use graph::{
    find_circular_dependencies, find_circular_dependencies_with, get_dependency_graph,
    get_dependency_graph_with, resolve_imports, DependencyEdge, DependencyGraph, ResolvedImport,
};
pub use orphaned::{
    find_orphaned_infrastructure, find_orphaned_infrastructure_with, Certainty, OrphanKind,
    OrphanedItem,
};
pub use unused::{find_unused_exports, find_unused_exports_with, UnusedExport};
