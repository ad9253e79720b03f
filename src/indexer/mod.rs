pub mod builder;
pub mod extractor;
pub mod matcher;
pub mod walker;

pub use builder::{
    build_repo_map, ensure_repo_map, ensure_repo_map_sync, Analysis, BuildOptions, RepoMapStatus,
};
pub use extractor::SymbolExtractor;
pub use matcher::{AstGrepMatcher, PatternMatch, StructuralMatcher};
pub use walker::{find_files_for_language, FileWalker, DEFAULT_EXCLUDED_DIRS};
