pub mod import_resolver;
pub mod models;
pub mod usage;

pub use import_resolver::{HeuristicResolver, ImportResolver, KnownFiles};
pub use models::*;
pub use usage::{
    build_usage_index, build_usage_index_with, find_dependents, find_usages, UsageIndex,
};
