//! Turns structural matches into a [`FileEntry`].

use std::collections::HashSet;

use crate::error::{RepoMapError, Result};
use crate::index::models::{FileEntry, ImportRef, SymbolRef};
use crate::indexer::matcher::{PatternMatch, StructuralMatcher};
use crate::languages::{QueryCategory, QueryPattern, QueryTable};

/// Which side of a `key: value` specifier is the bound name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingSide {
    /// Exported object keys: `{ a: impl }` exports `a`
    Key,
    /// Import destructuring: `{ a: local }` binds `local`
    Value,
}

pub struct SymbolExtractor<'a> {
    matcher: &'a dyn StructuralMatcher,
}

impl<'a> SymbolExtractor<'a> {
    pub fn new(matcher: &'a dyn StructuralMatcher) -> Self {
        Self { matcher }
    }

    /// Run every pattern of `table` over `source` parsed as `dialect`, in
    /// a single matcher batch.
    ///
    /// Any matcher failure fails the whole file.
    pub fn extract(&self, table: &QueryTable, dialect: &str, source: &str) -> Result<FileEntry> {
        let patterns: Vec<(QueryCategory, &QueryPattern)> = QueryCategory::ALL
            .into_iter()
            .flat_map(|category| table.get(category).iter().map(move |p| (category, p)))
            .collect();
        let texts: Vec<&str> = patterns.iter().map(|(_, p)| p.pattern).collect();

        let batches = self.matcher.find_all(&texts, dialect, source)?;
        if batches.len() != patterns.len() {
            return Err(RepoMapError::Matcher(format!(
                "matcher answered {} of {} patterns",
                batches.len(),
                patterns.len()
            )));
        }
        let matched: Vec<(QueryCategory, &QueryPattern, Vec<PatternMatch>)> = patterns
            .into_iter()
            .zip(batches)
            .map(|((category, pattern), matches)| (category, pattern, matches))
            .collect();

        let mut entry = FileEntry::new();

        for category in QueryCategory::ALL {
            if !category.is_symbol_category() {
                continue;
            }
            let mut seen = HashSet::new();
            let mut symbols = Vec::new();
            for (_, pattern, matches) in matched.iter().filter(|(c, _, _)| *c == category) {
                for m in matches {
                    if pattern.top_level && m.column != 0 {
                        continue;
                    }
                    for name in match_names(pattern, m, BindingSide::Key) {
                        if pattern.name_filter.is_some_and(|f| !f.accepts(&name)) {
                            continue;
                        }
                        if !seen.insert((name.clone(), m.line)) {
                            continue;
                        }
                        let mut symbol = SymbolRef::new(name).at_line(m.line + 1);
                        if let Some(kind) = pattern.kind {
                            symbol = symbol.with_kind(kind);
                        }
                        symbols.push(symbol);
                    }
                }
            }
            symbols.sort_by_key(|s| s.line);
            if let Some(slot) = symbols_mut(&mut entry, category) {
                *slot = symbols;
            }
        }

        // An explicit export list replaces the lexical convention
        if entry.symbols.exports.iter().any(|s| s.kind.as_deref() == Some("all")) {
            entry.symbols.exports.retain(|s| s.kind.as_deref() == Some("all"));
        }

        let exported: HashSet<String> = entry.export_names().map(String::from).collect();
        for symbol in entry.symbols.exports.iter_mut() {
            symbol.exported = Some(true);
        }
        for category in [
            QueryCategory::Functions,
            QueryCategory::Classes,
            QueryCategory::Types,
            QueryCategory::Constants,
        ] {
            for symbol in symbols_mut(&mut entry, category).into_iter().flatten() {
                symbol.exported = Some(exported.contains(&symbol.name));
            }
        }

        let imports = matched
            .iter()
            .filter(|(c, _, _)| *c == QueryCategory::Imports);
        for (_, pattern, matches) in imports {
            for m in matches {
                for import in match_imports(pattern, m) {
                    merge_import(&mut entry.imports, import);
                }
            }
        }
        entry.imports.sort_by_key(|i| i.line);

        Ok(entry)
    }
}

fn symbols_mut(entry: &mut FileEntry, category: QueryCategory) -> Option<&mut Vec<SymbolRef>> {
    match category {
        QueryCategory::Exports => Some(&mut entry.symbols.exports),
        QueryCategory::Functions => Some(&mut entry.symbols.functions),
        QueryCategory::Classes => Some(&mut entry.symbols.classes),
        QueryCategory::Types => Some(&mut entry.symbols.types),
        QueryCategory::Constants => Some(&mut entry.symbols.constants),
        QueryCategory::Imports => None,
    }
}

/// One statement matched by two patterns becomes one import.
fn merge_import(imports: &mut Vec<ImportRef>, import: ImportRef) {
    match imports
        .iter_mut()
        .find(|existing| existing.line == import.line && existing.source == import.source)
    {
        Some(existing) => {
            for name in import.names {
                if !existing.names.contains(&name) {
                    existing.names.push(name);
                }
            }
        }
        None => imports.push(import),
    }
}

/// Names a match yields under `pattern`'s extraction rules.
pub fn match_names(pattern: &QueryPattern, m: &PatternMatch, side: BindingSide) -> Vec<String> {
    let mut names = Vec::new();
    if let Some(var) = pattern.name_var {
        if let Some(items) = m.multi.get(var) {
            for item in items {
                names.extend(split_names(item, side));
            }
        } else if let Some(text) = m.single.get(var) {
            if pattern.multi {
                names.extend(split_names(text, side));
            } else if let Some(name) = clean_name(text, side) {
                names.push(name);
            }
        }
    }
    if names.is_empty() {
        if let Some(fallback) = pattern.fallback_name {
            names.push(fallback.to_string());
        }
    }
    names
}

fn match_imports(pattern: &QueryPattern, m: &PatternMatch) -> Vec<ImportRef> {
    let Some(source_var) = pattern.source_var else {
        return Vec::new();
    };
    let kind = pattern.kind.unwrap_or("import");
    let line = m.line + 1;

    let sources: Vec<String> = if let Some(items) = m.multi.get(source_var) {
        items.iter().flat_map(|item| split_sources(item)).collect()
    } else if let Some(text) = m.single.get(source_var) {
        split_sources(text)
    } else {
        Vec::new()
    };

    // Grouped statements bind nothing by name
    let names = if sources.len() > 1 {
        Vec::new()
    } else {
        match_names(pattern, m, BindingSide::Value)
    };

    sources
        .into_iter()
        .map(|source| ImportRef::new(source, kind, names.clone()).at_line(line))
        .collect()
}

/// Module specifiers in a source capture. A parenthesised block (Go
/// grouped imports) yields one specifier per line.
pub fn split_sources(text: &str) -> Vec<String> {
    let text = text.trim().trim_end_matches(';').trim();
    if let Some(inner) = text.strip_prefix('(').and_then(|t| t.strip_suffix(')')) {
        return inner
            .split(['\n', ';'])
            .flat_map(split_sources)
            .collect();
    }
    if text.is_empty() || text.starts_with("//") {
        return Vec::new();
    }

    let quoted = text.ends_with(['"', '\'', '`']);
    let spec = if quoted {
        // `alias "path"` keeps only the path
        text.rsplit(char::is_whitespace).next().unwrap_or(text)
    } else {
        text
    };
    let spec = strip_quotes(spec);
    if spec.is_empty() {
        Vec::new()
    } else {
        vec![spec.to_string()]
    }
}

/// Split a specifier list into bound names.
///
/// `{ a, b as c }` gives `a, c`; `crate::m::{A, self}` gives `A`;
/// `["x", "y"]` gives `x, y`.
pub fn split_names(text: &str, side: BindingSide) -> Vec<String> {
    let text = text.trim();
    let list = match (text.find('{'), text.rfind('}')) {
        (Some(open), Some(close)) if open < close => &text[open + 1..close],
        _ => text
            .trim_start_matches(['[', '('])
            .trim_end_matches([']', ')']),
    };
    list.split(',')
        .filter_map(|piece| clean_name(piece, side))
        .collect()
}

/// Reduce one specifier to the identifier it binds, if any.
pub fn clean_name(piece: &str, side: BindingSide) -> Option<String> {
    let mut name = strip_quotes(piece.trim());
    name = name.strip_prefix("...").unwrap_or(name);
    name = name.strip_prefix("type ").unwrap_or(name).trim();

    if let Some((_, alias)) = name.rsplit_once(" as ") {
        name = alias.trim();
    }
    if let Some((_, last)) = name.rsplit_once("::") {
        name = last.trim();
    } else if let Some((key, value)) = name.split_once(':') {
        name = match side {
            BindingSide::Key => key.trim(),
            BindingSide::Value => value.trim(),
        };
    }
    if let Some((before, _)) = name.split_once('=') {
        name = before.trim();
    }
    if let Some((_, last)) = name.rsplit_once('.') {
        name = last;
    }
    let name = strip_quotes(name);

    if name.is_empty() || name == "*" || name == "self" || !is_identifier(name) {
        return None;
    }
    Some(name.to_string())
}

fn strip_quotes(text: &str) -> &str {
    text.trim().trim_matches(['"', '\'', '`'])
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::languages::QueryPattern as P;
    use std::collections::HashMap;

    /// Matcher answering from a fixed pattern -> matches table.
    struct TableMatcher(HashMap<&'static str, Vec<PatternMatch>>);

    impl StructuralMatcher for TableMatcher {
        fn check_available(&self) -> Result<()> {
            Ok(())
        }

        fn find_matches(&self, pattern: &str, _: &str, _: &str) -> Result<Vec<PatternMatch>> {
            Ok(self.0.get(pattern).cloned().unwrap_or_default())
        }
    }

    struct FailingMatcher;

    impl StructuralMatcher for FailingMatcher {
        fn check_available(&self) -> Result<()> {
            Ok(())
        }

        fn find_matches(&self, _: &str, _: &str, _: &str) -> Result<Vec<PatternMatch>> {
            Err(RepoMapError::Matcher("parse error".into()))
        }
    }

    #[test]
    fn test_split_names() {
        assert_eq!(split_names("{ a, b as c }", BindingSide::Value), vec!["a", "c"]);
        assert_eq!(split_names("crate::m::{A, self, B as C}", BindingSide::Value), vec!["A", "C"]);
        assert_eq!(split_names("[\"x\", 'y']", BindingSide::Key), vec!["x", "y"]);
        assert_eq!(split_names("crate::m::*", BindingSide::Value), Vec::<String>::new());
        assert_eq!(
            split_names("{ type Props, State }", BindingSide::Value),
            vec!["Props", "State"]
        );
    }

    #[test]
    fn test_key_value_sides() {
        assert_eq!(clean_name("a: local", BindingSide::Value).as_deref(), Some("local"));
        assert_eq!(clean_name("a: impl", BindingSide::Key).as_deref(), Some("a"));
        assert_eq!(clean_name("com.acme.Service", BindingSide::Value).as_deref(), Some("Service"));
        assert_eq!(clean_name("{ a }", BindingSide::Key), None);
        assert_eq!(clean_name(",", BindingSide::Key), None);
        assert_eq!(clean_name("limit = 10", BindingSide::Value).as_deref(), Some("limit"));
    }

    #[test]
    fn test_split_sources() {
        assert_eq!(split_sources("'./utils'"), vec!["./utils"]);
        assert_eq!(split_sources("crate::models::{A, B}"), vec!["crate::models::{A, B}"]);
        assert_eq!(
            split_sources("(\n\t\"fmt\"\n\tlog \"github.com/acme/log\"\n)"),
            vec!["fmt", "github.com/acme/log"]
        );
    }

    #[test]
    fn test_multi_with_fallback() {
        let pattern = P::new("module.exports = $NAME").name("NAME").fallback("default");
        let m = PatternMatch::new("module.exports = { a }", 0).with_single("NAME", "{ a }");
        assert_eq!(match_names(&pattern, &m, BindingSide::Key), vec!["default"]);

        let m = PatternMatch::new("module.exports = api", 0).with_single("NAME", "api");
        assert_eq!(match_names(&pattern, &m, BindingSide::Key), vec!["api"]);
    }

    #[test]
    fn test_extract_entry() {
        let mut table = QueryTable::default();
        table.exports.push(P::new("export function $NAME() {}").kind("function").name("NAME"));
        table.exports.push(P::new("export { $$$NAMES }").kind("named").names("NAMES"));
        table.functions.push(P::new("function $NAME() {}").kind("function").name("NAME"));
        table.imports.push(
            P::new("import { $$$NAMES } from $SOURCE")
                .kind("named")
                .names("NAMES")
                .source("SOURCE"),
        );
        table.imports.push(
            P::new("import $NAME, { $$$NAMES } from $SOURCE")
                .kind("named")
                .names("NAMES")
                .source("SOURCE"),
        );

        let mut answers = HashMap::new();
        answers.insert(
            "export function $NAME() {}",
            vec![PatternMatch::new("export function formatDate() {}", 4)
                .with_single("NAME", "formatDate")],
        );
        answers.insert(
            "export { $$$NAMES }",
            vec![PatternMatch::new("export { helper as util }", 9)
                .with_multi("NAMES", ["helper as util"])],
        );
        answers.insert(
            "function $NAME() {}",
            vec![
                PatternMatch::new("function formatDate() {}", 4)
                    .at_column(7)
                    .with_single("NAME", "formatDate"),
                PatternMatch::new("function helper() {}", 7).with_single("NAME", "helper"),
            ],
        );
        answers.insert(
            "import { $$$NAMES } from $SOURCE",
            vec![PatternMatch::new("import { a } from './a'", 0)
                .with_multi("NAMES", ["a", ",", "b"])
                .with_single("SOURCE", "'./a'")],
        );
        answers.insert(
            "import $NAME, { $$$NAMES } from $SOURCE",
            vec![PatternMatch::new("import { a } from './a'", 0)
                .with_multi("NAMES", ["a", ",", "c"])
                .with_single("SOURCE", "'./a'")],
        );

        let matcher = TableMatcher(answers);
        let entry = SymbolExtractor::new(&matcher).extract(&table, "javascript", "").unwrap();

        let exports: Vec<_> = entry.export_names().collect();
        assert_eq!(exports, vec!["formatDate", "util"]);
        assert_eq!(entry.symbols.exports[0].line, Some(5));
        assert!(entry.symbols.exports.iter().all(|s| s.exported == Some(true)));

        assert_eq!(entry.symbols.functions.len(), 2);
        assert_eq!(entry.symbols.functions[0].exported, Some(true));
        assert_eq!(entry.symbols.functions[1].exported, Some(false));

        assert_eq!(entry.imports.len(), 1);
        assert_eq!(entry.imports[0].source, "./a");
        assert_eq!(entry.imports[0].names, vec!["a", "b", "c"]);
        assert_eq!(entry.imports[0].line, Some(1));
    }

    #[test]
    fn test_top_level_and_filters() {
        let mut table = QueryTable::default();
        table.exports.push(
            P::new("def $NAME(): $$$BODY")
                .name("NAME")
                .filter(crate::languages::NameFilter::Public)
                .at_top_level(),
        );
        let mut answers = HashMap::new();
        answers.insert(
            "def $NAME(): $$$BODY",
            vec![
                PatternMatch::new("def load(): ...", 0).with_single("NAME", "load"),
                PatternMatch::new("def _hidden(): ...", 3).with_single("NAME", "_hidden"),
                PatternMatch::new("def method(): ...", 6)
                    .at_column(4)
                    .with_single("NAME", "method"),
            ],
        );
        let matcher = TableMatcher(answers);
        let entry = SymbolExtractor::new(&matcher).extract(&table, "python", "").unwrap();
        assert_eq!(entry.export_names().collect::<Vec<_>>(), vec!["load"]);
    }

    #[test]
    fn test_all_list_replaces_lexical_exports() {
        let mut table = QueryTable::default();
        table.exports.push(P::new("__all__ = [$$$NAMES]").kind("all").names("NAMES"));
        table.exports.push(P::new("def $NAME(): $$$BODY").kind("function").name("NAME"));
        let mut answers = HashMap::new();
        answers.insert(
            "__all__ = [$$$NAMES]",
            vec![PatternMatch::new("__all__ = ['load']", 0).with_multi("NAMES", ["'load'"])],
        );
        answers.insert(
            "def $NAME(): $$$BODY",
            vec![
                PatternMatch::new("def load(): ...", 2).with_single("NAME", "load"),
                PatternMatch::new("def extra(): ...", 5).with_single("NAME", "extra"),
            ],
        );
        let matcher = TableMatcher(answers);
        let entry = SymbolExtractor::new(&matcher).extract(&table, "python", "").unwrap();
        assert_eq!(entry.export_names().collect::<Vec<_>>(), vec!["load"]);
    }

    #[test]
    fn test_grouped_imports_split() {
        let mut table = QueryTable::default();
        table.imports.push(P::new("import ($$$SPECS)").kind("group").source("SPECS"));
        let mut answers = HashMap::new();
        answers.insert(
            "import ($$$SPECS)",
            vec![PatternMatch::new("import (...)", 2)
                .with_multi("SPECS", ["\"fmt\"", "web \"example.com/app/web\""])],
        );
        let matcher = TableMatcher(answers);
        let entry = SymbolExtractor::new(&matcher).extract(&table, "go", "").unwrap();
        let sources: Vec<_> = entry.imports.iter().map(|i| i.source.as_str()).collect();
        assert_eq!(sources, vec!["fmt", "example.com/app/web"]);
        assert!(entry.imports.iter().all(|i| i.names.is_empty() && i.kind == "group"));
    }

    #[test]
    fn test_matcher_failure_fails_file() {
        let table = crate::languages::javascript::queries();
        assert!(SymbolExtractor::new(&FailingMatcher).extract(&table, "javascript", "x").is_err());
    }

    #[test]
    fn test_whole_table_is_one_batch() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        struct BatchCounter {
            batches: AtomicUsize,
            patterns: AtomicUsize,
        }

        impl StructuralMatcher for BatchCounter {
            fn check_available(&self) -> Result<()> {
                Ok(())
            }

            fn find_matches(&self, _: &str, _: &str, _: &str) -> Result<Vec<PatternMatch>> {
                Err(RepoMapError::Matcher("batched matcher".into()))
            }

            fn find_all(
                &self,
                patterns: &[&str],
                _language: &str,
                _source: &str,
            ) -> Result<Vec<Vec<PatternMatch>>> {
                self.batches.fetch_add(1, Ordering::Relaxed);
                self.patterns.fetch_add(patterns.len(), Ordering::Relaxed);
                let mut batches = vec![Vec::new(); patterns.len()];
                let named = "import { $$$NAMES } from $SOURCE";
                if let Some(i) = patterns.iter().position(|p| *p == named) {
                    batches[i].push(
                        PatternMatch::new("import { a } from './a'", 0)
                            .with_multi("NAMES", ["a"])
                            .with_single("SOURCE", "'./a'"),
                    );
                }
                Ok(batches)
            }
        }

        let table = crate::languages::typescript::queries();
        let matcher = BatchCounter {
            batches: AtomicUsize::new(0),
            patterns: AtomicUsize::new(0),
        };
        let entry = SymbolExtractor::new(&matcher).extract(&table, "typescript", "").unwrap();

        assert_eq!(matcher.batches.load(Ordering::Relaxed), 1);
        assert_eq!(matcher.patterns.load(Ordering::Relaxed), table.len());
        assert_eq!(entry.imports.len(), 1);
        assert_eq!(entry.imports[0].names, vec!["a"]);
    }

    #[test]
    fn test_short_batch_fails_file() {
        struct ShortBatch;

        impl StructuralMatcher for ShortBatch {
            fn check_available(&self) -> Result<()> {
                Ok(())
            }

            fn find_matches(&self, _: &str, _: &str, _: &str) -> Result<Vec<PatternMatch>> {
                Ok(Vec::new())
            }

            fn find_all(&self, _: &[&str], _: &str, _: &str) -> Result<Vec<Vec<PatternMatch>>> {
                Ok(vec![Vec::new()])
            }
        }

        let table = crate::languages::javascript::queries();
        assert!(SymbolExtractor::new(&ShortBatch).extract(&table, "javascript", "").is_err());
    }
}
