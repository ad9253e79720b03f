//! Optional per-repository configuration read from `.repo-map.toml`.
//!
//! ```toml
//! max_files = 2000
//! languages = ["typescript", "python"]
//! exclude_dirs = ["generated", "third_party"]
//! timeout_secs = 120
//!
//! [matcher]
//! binary = "/opt/bin/ast-grep"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::Result;

pub const CONFIG_FILENAME: &str = ".repo-map.toml";

pub const DEFAULT_MAX_FILES: usize = 5000;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MatcherConfig {
    /// Explicit matcher executable; `ast-grep` then `sg` when unset
    pub binary: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectConfig {
    pub max_files: Option<usize>,
    pub languages: Vec<String>,
    pub exclude_dirs: Vec<String>,
    pub timeout_secs: Option<u64>,
    pub matcher: MatcherConfig,
}

impl ProjectConfig {
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load `.repo-map.toml` from `root`. A missing file yields defaults;
    /// a malformed one is an error.
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join(CONFIG_FILENAME);
        if !path.is_file() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path)?;
        let config = Self::parse(&content)?;
        tracing::debug!("Loaded {}", path.display());
        Ok(config)
    }

    pub fn max_files(&self) -> usize {
        self.max_files.unwrap_or(DEFAULT_MAX_FILES)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}
