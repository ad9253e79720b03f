//! Language query registry.
//!
//! Each supported language is described by a static table of ast-grep
//! patterns grouped by category, plus the file extensions and syntax
//! dialects it covers. Tables are plain data: TypeScript extends JavaScript
//! by concatenating tables when the registry is built.

pub mod go;
pub mod java;
pub mod javascript;
pub mod python;
pub mod rust;
pub mod typescript;

use std::collections::HashMap;
use std::path::Path;

use serde::Serialize;

/// Lexical rule applied to an extracted name after a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NameFilter {
    /// First character is uppercase (Go exported identifiers)
    Capitalized,
    /// Not underscore-prefixed (Python public names)
    Public,
    /// ALL_CAPS identifiers (Python module constants)
    UpperSnake,
}

impl NameFilter {
    pub fn accepts(&self, name: &str) -> bool {
        match self {
            NameFilter::Capitalized => name.chars().next().is_some_and(|c| c.is_uppercase()),
            NameFilter::Public => !name.is_empty() && !name.starts_with('_'),
            NameFilter::UpperSnake => {
                name.chars().any(|c| c.is_ascii_uppercase())
                    && name
                        .chars()
                        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
            }
        }
    }
}

/// A single structural pattern and the rules for turning its matches into names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryPattern {
    pub pattern: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_var: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_name: Option<&'static str>,
    pub multi: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_var: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_filter: Option<NameFilter>,
    pub top_level: bool,
}

impl QueryPattern {
    pub fn new(pattern: &'static str) -> Self {
        Self {
            pattern,
            kind: None,
            name_var: None,
            fallback_name: None,
            multi: false,
            source_var: None,
            name_filter: None,
            top_level: false,
        }
    }

    pub fn kind(mut self, kind: &'static str) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Name comes from a single meta-variable.
    pub fn name(mut self, var: &'static str) -> Self {
        self.name_var = Some(var);
        self
    }

    /// Names come from a capture holding a list of specifiers.
    pub fn names(mut self, var: &'static str) -> Self {
        self.name_var = Some(var);
        self.multi = true;
        self
    }

    pub fn fallback(mut self, name: &'static str) -> Self {
        self.fallback_name = Some(name);
        self
    }

    pub fn source(mut self, var: &'static str) -> Self {
        self.source_var = Some(var);
        self
    }

    pub fn filter(mut self, filter: NameFilter) -> Self {
        self.name_filter = Some(filter);
        self
    }

    pub fn at_top_level(mut self) -> Self {
        self.top_level = true;
        self
    }

    /// Whether a match of this pattern can yield a symbol name.
    pub fn produces_name(&self) -> bool {
        self.name_var.is_some() || self.fallback_name.is_some() || self.multi
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryCategory {
    Exports,
    Functions,
    Classes,
    Types,
    Constants,
    Imports,
}

impl QueryCategory {
    pub const ALL: [QueryCategory; 6] = [
        QueryCategory::Exports,
        QueryCategory::Functions,
        QueryCategory::Classes,
        QueryCategory::Types,
        QueryCategory::Constants,
        QueryCategory::Imports,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QueryCategory::Exports => "exports",
            QueryCategory::Functions => "functions",
            QueryCategory::Classes => "classes",
            QueryCategory::Types => "types",
            QueryCategory::Constants => "constants",
            QueryCategory::Imports => "imports",
        }
    }

    pub fn is_symbol_category(&self) -> bool {
        !matches!(self, QueryCategory::Imports)
    }
}

/// Patterns for one language, grouped by category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QueryTable {
    pub exports: Vec<QueryPattern>,
    pub functions: Vec<QueryPattern>,
    pub classes: Vec<QueryPattern>,
    pub types: Vec<QueryPattern>,
    pub constants: Vec<QueryPattern>,
    pub imports: Vec<QueryPattern>,
}

impl QueryTable {
    pub fn get(&self, category: QueryCategory) -> &[QueryPattern] {
        match category {
            QueryCategory::Exports => &self.exports,
            QueryCategory::Functions => &self.functions,
            QueryCategory::Classes => &self.classes,
            QueryCategory::Types => &self.types,
            QueryCategory::Constants => &self.constants,
            QueryCategory::Imports => &self.imports,
        }
    }

    /// Append every pattern of `other`, category by category.
    pub fn extend(&mut self, other: QueryTable) {
        self.exports.extend(other.exports);
        self.functions.extend(other.functions);
        self.classes.extend(other.classes);
        self.types.extend(other.types);
        self.constants.extend(other.constants);
        self.imports.extend(other.imports);
    }

    pub fn len(&self) -> usize {
        QueryCategory::ALL.iter().map(|c| self.get(*c).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Checks the structural contract of the table.
    pub fn validate(&self) -> std::result::Result<(), String> {
        for category in QueryCategory::ALL {
            for pattern in self.get(category) {
                if pattern.pattern.trim().is_empty() {
                    return Err(format!("empty pattern in {}", category.as_str()));
                }
                if category.is_symbol_category() && !pattern.produces_name() {
                    return Err(format!(
                        "{} pattern `{}` has no name extraction field",
                        category.as_str(),
                        pattern.pattern
                    ));
                }
                if category == QueryCategory::Imports && pattern.source_var.is_none() {
                    return Err(format!("import pattern `{}` has no source_var", pattern.pattern));
                }
            }
        }
        Ok(())
    }
}

/// Static description of a supported language.
#[derive(Debug, Clone)]
pub struct LanguageDef {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub extensions: &'static [&'static str],
    /// Extension-specific grammars, e.g. `jsx` files under JavaScript
    pub dialects: &'static [(&'static str, &'static str)],
    pub queries: QueryTable,
}

pub struct LanguageRegistry {
    languages: HashMap<&'static str, LanguageDef>,
    aliases: HashMap<&'static str, &'static str>,
    extension_map: HashMap<&'static str, &'static str>,
}

impl LanguageRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            languages: HashMap::new(),
            aliases: HashMap::new(),
            extension_map: HashMap::new(),
        };

        registry.register(javascript::definition());
        registry.register(typescript::definition());
        registry.register(python::definition());
        registry.register(rust::definition());
        registry.register(go::definition());
        registry.register(java::definition());

        registry
    }

    pub fn register(&mut self, def: LanguageDef) {
        for ext in def.extensions {
            self.extension_map.insert(*ext, def.name);
        }
        for alias in def.aliases {
            self.aliases.insert(*alias, def.name);
        }
        self.languages.insert(def.name, def);
    }

    /// Resolve a language name or alias, case-insensitively.
    pub fn canonical_name(&self, language: &str) -> Option<&'static str> {
        let lower = language.trim().to_ascii_lowercase();
        if let Some((name, _)) = self.languages.get_key_value(lower.as_str()) {
            return Some(*name);
        }
        self.aliases.get(lower.as_str()).copied()
    }

    pub fn get(&self, language: &str) -> Option<&LanguageDef> {
        self.canonical_name(language)
            .and_then(|name| self.languages.get(name))
    }

    pub fn patterns_for(&self, language: &str) -> Option<&QueryTable> {
        self.get(language).map(|def| &def.queries)
    }

    /// Grammar to use for `path` when it is analysed as `language`.
    ///
    /// Returns `None` only when the language itself is unknown.
    pub fn dialect_for(&self, path: &Path, language: &str) -> Option<&'static str> {
        let def = self.get(language)?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        if let Some(ext) = ext {
            for (dialect_ext, dialect) in def.dialects {
                if *dialect_ext == ext {
                    return Some(*dialect);
                }
            }
        }
        Some(def.name)
    }

    pub fn extensions_for(&self, language: &str) -> &'static [&'static str] {
        self.get(language).map(|def| def.extensions).unwrap_or(&[])
    }

    pub fn language_for_path(&self, path: &Path) -> Option<&'static str> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        self.extension_map.get(ext.as_str()).copied()
    }

    /// Canonical names, sorted.
    pub fn supported_languages(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.languages.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Every extension known to any language, sorted.
    pub fn source_extensions(&self) -> Vec<&'static str> {
        let mut exts: Vec<_> = self.extension_map.keys().copied().collect();
        exts.sort_unstable();
        exts
    }
}

impl Default for LanguageRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Patterns for a language or alias from the global registry.
pub fn patterns_for(language: &str) -> Option<&'static QueryTable> {
    crate::REGISTRY.patterns_for(language)
}

/// Dialect of `path` under `language` from the global registry.
pub fn dialect_for(path: impl AsRef<Path>, language: &str) -> Option<&'static str> {
    crate::REGISTRY.dialect_for(path.as_ref(), language)
}
