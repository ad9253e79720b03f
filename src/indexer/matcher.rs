//! Structural matcher seam.
//!
//! The builder never parses source itself: it hands a pattern, a grammar
//! name and the file's text to a [`StructuralMatcher`] and gets back the
//! matched ranges with their meta-variable captures. [`AstGrepMatcher`]
//! shells out to the `ast-grep` CLI.

use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use once_cell::sync::OnceCell;
use serde::Deserialize;

use crate::error::{RepoMapError, Result};

/// Binary names tried in order when no explicit binary is configured.
pub const MATCHER_BINARIES: &[&str] = &["ast-grep", "sg"];

/// One structural match in a file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatternMatch {
    pub text: String,
    /// 0-based line of the match start
    pub line: usize,
    /// 0-based column of the match start
    pub column: usize,
    /// `$NAME` captures
    pub single: HashMap<String, String>,
    /// `$$$NAMES` captures, one entry per captured node
    pub multi: HashMap<String, Vec<String>>,
}

impl PatternMatch {
    pub fn new(text: impl Into<String>, line: usize) -> Self {
        Self {
            text: text.into(),
            line,
            ..Default::default()
        }
    }

    pub fn at_column(mut self, column: usize) -> Self {
        self.column = column;
        self
    }

    pub fn with_single(mut self, var: &str, text: impl Into<String>) -> Self {
        self.single.insert(var.to_string(), text.into());
        self
    }

    pub fn with_multi<I, S>(mut self, var: &str, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.multi
            .insert(var.to_string(), items.into_iter().map(Into::into).collect());
        self
    }
}

pub trait StructuralMatcher: Send + Sync {
    /// `Err` with a human-readable reason when the matcher cannot run.
    fn check_available(&self) -> Result<()>;

    /// Every match of `pattern` in `source`, parsed with grammar `language`.
    fn find_matches(
        &self,
        pattern: &str,
        language: &str,
        source: &str,
    ) -> Result<Vec<PatternMatch>>;

    /// Matches of every pattern in `patterns` over one source; entry `i`
    /// of the result belongs to `patterns[i]`.
    ///
    /// The default asks [`find_matches`](Self::find_matches) once per
    /// pattern. Matchers backed by an external process override it to
    /// answer the whole batch in one invocation.
    fn find_all(
        &self,
        patterns: &[&str],
        language: &str,
        source: &str,
    ) -> Result<Vec<Vec<PatternMatch>>> {
        patterns
            .iter()
            .map(|pattern| self.find_matches(pattern, language, source))
            .collect()
    }
}

/// Shells out to `ast-grep`: `run --pattern` for a single pattern, and
/// `scan --inline-rules` with one rule per pattern for a batch. Source is
/// always piped on stdin.
#[derive(Debug, Default)]
pub struct AstGrepMatcher {
    binary: Option<PathBuf>,
    resolved: OnceCell<Option<PathBuf>>,
}

impl AstGrepMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_binary(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: Some(binary.into()),
            resolved: OnceCell::new(),
        }
    }

    fn require_binary(&self) -> Result<&PathBuf> {
        self.binary()
            .ok_or_else(|| RepoMapError::Matcher("matcher tool not installed".to_string()))
    }

    /// Run the binary with `source` on stdin. `None` when it printed nothing
    /// and exited with 0 or 1, which ast-grep uses for "no matches".
    fn exec(&self, args: &[&str], source: &str) -> Result<Option<String>> {
        let mut child = Command::new(self.require_binary()?)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(source.as_bytes())?;
        }
        let output = child.wait_with_output()?;
        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();

        if !stdout.trim().is_empty() {
            return Ok(Some(stdout));
        }
        if output.status.success() || output.status.code() == Some(1) {
            return Ok(None);
        }
        Err(RepoMapError::Matcher(format!(
            "ast-grep {} failed: {}",
            args.first().copied().unwrap_or_default(),
            String::from_utf8_lossy(&output.stderr).trim()
        )))
    }

    /// First candidate binary that answers `--version`.
    fn binary(&self) -> Option<&PathBuf> {
        self.resolved
            .get_or_init(|| {
                let candidates: Vec<PathBuf> = match &self.binary {
                    Some(binary) => vec![binary.clone()],
                    None => MATCHER_BINARIES.iter().map(PathBuf::from).collect(),
                };
                candidates.into_iter().find(|candidate| {
                    Command::new(candidate)
                        .arg("--version")
                        .stdin(Stdio::null())
                        .stdout(Stdio::null())
                        .stderr(Stdio::null())
                        .status()
                        .is_ok_and(|status| status.success())
                })
            })
            .as_ref()
    }
}

impl StructuralMatcher for AstGrepMatcher {
    fn check_available(&self) -> Result<()> {
        match self.binary() {
            Some(_) => Ok(()),
            None => Err(RepoMapError::Matcher(match &self.binary {
                Some(binary) => format!("matcher tool not installed: {}", binary.display()),
                None => "matcher tool not installed (tried ast-grep, sg)".to_string(),
            })),
        }
    }

    fn find_matches(
        &self,
        pattern: &str,
        language: &str,
        source: &str,
    ) -> Result<Vec<PatternMatch>> {
        let args = [
            "run",
            "--pattern",
            pattern,
            "--lang",
            language,
            "--json=compact",
            "--stdin",
        ];
        match self.exec(&args, source)? {
            Some(stdout) => parse_ast_grep_json(&stdout),
            None => Ok(Vec::new()),
        }
    }

    fn find_all(
        &self,
        patterns: &[&str],
        language: &str,
        source: &str,
    ) -> Result<Vec<Vec<PatternMatch>>> {
        let mut batches = vec![Vec::new(); patterns.len()];
        if patterns.is_empty() {
            return Ok(batches);
        }

        let rules = inline_rules(patterns, language);
        let args = ["scan", "--inline-rules", rules.as_str(), "--json=compact", "--stdin"];
        let Some(stdout) = self.exec(&args, source)? else {
            return Ok(batches);
        };

        for (rule_id, m) in parse_scan_json(&stdout)? {
            let slot = rule_index(&rule_id)
                .and_then(|i| batches.get_mut(i))
                .ok_or_else(|| RepoMapError::Matcher(format!("unknown rule id `{}`", rule_id)))?;
            slot.push(m);
        }
        Ok(batches)
    }
}

const RULE_PREFIX: &str = "p";

/// One YAML document per pattern, with ids `p0`, `p1`, ... in order.
///
/// Each rule is a JSON object, which is also valid YAML.
pub fn inline_rules(patterns: &[&str], language: &str) -> String {
    patterns
        .iter()
        .enumerate()
        .map(|(i, pattern)| {
            serde_json::json!({
                "id": format!("{}{}", RULE_PREFIX, i),
                "language": language,
                "severity": "info",
                "rule": { "pattern": pattern },
            })
            .to_string()
        })
        .collect::<Vec<_>>()
        .join("\n---\n")
}

fn rule_index(rule_id: &str) -> Option<usize> {
    rule_id.strip_prefix(RULE_PREFIX)?.parse().ok()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMatch {
    #[serde(default)]
    rule_id: Option<String>,
    text: String,
    range: RawRange,
    #[serde(default)]
    meta_variables: RawMetaVariables,
}

#[derive(Debug, Deserialize)]
struct RawRange {
    start: RawPosition,
}

#[derive(Debug, Deserialize)]
struct RawPosition {
    line: usize,
    column: usize,
}

#[derive(Debug, Default, Deserialize)]
struct RawMetaVariables {
    #[serde(default)]
    single: HashMap<String, RawCapture>,
    #[serde(default)]
    multi: HashMap<String, Vec<RawCapture>>,
}

#[derive(Debug, Deserialize)]
struct RawCapture {
    text: String,
}

impl From<RawMatch> for PatternMatch {
    fn from(m: RawMatch) -> Self {
        PatternMatch {
            text: m.text,
            line: m.range.start.line,
            column: m.range.start.column,
            single: m
                .meta_variables
                .single
                .into_iter()
                .map(|(k, v)| (k, v.text))
                .collect(),
            multi: m
                .meta_variables
                .multi
                .into_iter()
                .map(|(k, v)| (k, v.into_iter().map(|c| c.text).collect()))
                .collect(),
        }
    }
}

/// Parse the `--json=compact` output of `ast-grep run`.
pub fn parse_ast_grep_json(output: &str) -> Result<Vec<PatternMatch>> {
    let raw: Vec<RawMatch> = serde_json::from_str(output.trim())?;
    Ok(raw.into_iter().map(PatternMatch::from).collect())
}

/// Parse the `--json=compact` output of `ast-grep scan` into
/// `(rule id, match)` pairs.
pub fn parse_scan_json(output: &str) -> Result<Vec<(String, PatternMatch)>> {
    let raw: Vec<RawMatch> = serde_json::from_str(output.trim())?;
    raw.into_iter()
        .map(|mut m| {
            let rule_id = m
                .rule_id
                .take()
                .ok_or_else(|| RepoMapError::Matcher("scan match without ruleId".to_string()))?;
            Ok((rule_id, PatternMatch::from(m)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"[{"text":"import { a, b } from './utils'","range":{"byteOffset":{"start":0,"end":30},"start":{"line":2,"column":0},"end":{"line":2,"column":30}},"file":"STDIN","lines":"import { a, b } from './utils'","language":"JavaScript","metaVariables":{"single":{"SOURCE":{"text":"'./utils'","range":{"byteOffset":{"start":21,"end":30},"start":{"line":2,"column":21},"end":{"line":2,"column":30}}}},"multi":{"NAMES":[{"text":"a","range":{"byteOffset":{"start":9,"end":10},"start":{"line":2,"column":9},"end":{"line":2,"column":10}}},{"text":",","range":{"byteOffset":{"start":10,"end":11},"start":{"line":2,"column":10},"end":{"line":2,"column":11}}},{"text":"b","range":{"byteOffset":{"start":12,"end":13},"start":{"line":2,"column":12},"end":{"line":2,"column":13}}}]},"transformed":{}}}]"#;

    #[test]
    fn test_parse_compact_output() {
        let matches = parse_ast_grep_json(SAMPLE).unwrap();
        assert_eq!(matches.len(), 1);
        let m = &matches[0];
        assert_eq!(m.line, 2);
        assert_eq!(m.column, 0);
        assert_eq!(m.single.get("SOURCE").map(String::as_str), Some("'./utils'"));
        assert_eq!(m.multi.get("NAMES").unwrap(), &vec!["a", ",", "b"]);
    }

    #[test]
    fn test_parse_empty_and_invalid() {
        assert!(parse_ast_grep_json("[]").unwrap().is_empty());
        assert!(parse_ast_grep_json("not json").is_err());
    }

    #[test]
    fn test_parse_without_meta_variables() {
        let out = r#"[{"text":"x","range":{"start":{"line":0,"column":4},"end":{"line":0,"column":5}}}]"#;
        let matches = parse_ast_grep_json(out).unwrap();
        assert_eq!(matches[0].column, 4);
        assert!(matches[0].single.is_empty());
    }

    #[test]
    fn test_missing_binary_is_unavailable() {
        let matcher = AstGrepMatcher::with_binary("/nonexistent/ast-grep-binary");
        let err = matcher.check_available().unwrap_err();
        assert!(err.to_string().contains("not installed"));
        assert!(matcher.find_matches("$X", "javascript", "x").is_err());
        assert!(matcher.find_all(&["$X", "$Y"], "javascript", "x").is_err());
    }

    #[test]
    fn test_inline_rules_one_document_per_pattern() {
        let rules = inline_rules(&["export function $NAME() {}", "import \"$SRC\""], "tsx");
        let docs: Vec<&str> = rules.split("\n---\n").collect();
        assert_eq!(docs.len(), 2);

        let second: serde_json::Value = serde_json::from_str(docs[1]).unwrap();
        assert_eq!(second["id"], "p1");
        assert_eq!(second["language"], "tsx");
        assert_eq!(second["rule"]["pattern"], "import \"$SRC\"");
        assert_eq!(rule_index("p1"), Some(1));
        assert_eq!(rule_index("other"), None);
    }

    #[test]
    fn test_parse_scan_output_keeps_rule_ids() {
        let out = r#"[{"ruleId":"p3","text":"x","range":{"start":{"line":1,"column":0}}},{"ruleId":"p0","text":"y","range":{"start":{"line":4,"column":2}},"metaVariables":{"single":{"NAME":{"text":"y"}}}}]"#;
        let pairs = parse_scan_json(out).unwrap();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].0, "p3");
        assert_eq!(pairs[1].0, "p0");
        assert_eq!(pairs[1].1.line, 4);
        assert_eq!(pairs[1].1.single.get("NAME").map(String::as_str), Some("y"));

        let missing = r#"[{"text":"x","range":{"start":{"line":0,"column":0}}}]"#;
        assert!(parse_scan_json(missing).is_err());
    }

    #[test]
    fn test_default_find_all_asks_per_pattern() {
        struct Echo;

        impl StructuralMatcher for Echo {
            fn check_available(&self) -> Result<()> {
                Ok(())
            }

            fn find_matches(
                &self,
                pattern: &str,
                _language: &str,
                _source: &str,
            ) -> Result<Vec<PatternMatch>> {
                Ok(vec![PatternMatch::new(pattern, 0)])
            }
        }

        let batches = Echo.find_all(&["a", "b"], "javascript", "").unwrap();
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[1][0].text, "b");
    }
}
