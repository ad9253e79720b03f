use super::{LanguageDef, QueryPattern as P, QueryTable};

pub fn definition() -> LanguageDef {
    LanguageDef {
        name: "rust",
        aliases: &["rs"],
        extensions: &["rs"],
        dialects: &[],
        queries: queries(),
    }
}

pub fn queries() -> QueryTable {
    QueryTable {
        exports: vec![
            P::new("pub fn $NAME($$$ARGS) { $$$BODY }").kind("function").name("NAME"),
            P::new("pub fn $NAME($$$ARGS) -> $RET { $$$BODY }").kind("function").name("NAME"),
            P::new("pub async fn $NAME($$$ARGS) { $$$BODY }").kind("function").name("NAME"),
            P::new("pub async fn $NAME($$$ARGS) -> $RET { $$$BODY }").kind("function").name("NAME"),
            P::new("pub(crate) fn $NAME($$$ARGS) { $$$BODY }").kind("function").name("NAME"),
            P::new("pub(crate) fn $NAME($$$ARGS) -> $RET { $$$BODY }")
                .kind("function")
                .name("NAME"),
            P::new("pub struct $NAME { $$$FIELDS }").kind("struct").name("NAME"),
            P::new("pub struct $NAME;").kind("struct").name("NAME"),
            P::new("pub struct $NAME($$$FIELDS);").kind("struct").name("NAME"),
            P::new("pub(crate) struct $NAME { $$$FIELDS }").kind("struct").name("NAME"),
            P::new("pub enum $NAME { $$$VARIANTS }").kind("enum").name("NAME"),
            P::new("pub(crate) enum $NAME { $$$VARIANTS }").kind("enum").name("NAME"),
            P::new("pub trait $NAME { $$$BODY }").kind("trait").name("NAME"),
            P::new("pub type $NAME = $TYPE;").kind("type").name("NAME"),
            P::new("pub const $NAME: $TYPE = $VALUE;").kind("constant").name("NAME"),
            P::new("pub static $NAME: $TYPE = $VALUE;").kind("static").name("NAME"),
            P::new("pub mod $NAME;").kind("module").name("NAME"),
            P::new("pub use $PATH;").kind("re-export").names("PATH"),
            P::new("pub(crate) use $PATH;").kind("re-export").names("PATH"),
        ],
        functions: vec![
            P::new("fn $NAME($$$ARGS) { $$$BODY }").kind("function").name("NAME"),
            P::new("fn $NAME($$$ARGS) -> $RET { $$$BODY }").kind("function").name("NAME"),
            P::new("async fn $NAME($$$ARGS) { $$$BODY }").kind("function").name("NAME"),
            P::new("async fn $NAME($$$ARGS) -> $RET { $$$BODY }").kind("function").name("NAME"),
        ],
        classes: vec![
            P::new("struct $NAME { $$$FIELDS }").kind("struct").name("NAME"),
            P::new("struct $NAME;").kind("struct").name("NAME"),
            P::new("struct $NAME($$$FIELDS);").kind("struct").name("NAME"),
            P::new("enum $NAME { $$$VARIANTS }").kind("enum").name("NAME"),
        ],
        types: vec![
            P::new("trait $NAME { $$$BODY }").kind("trait").name("NAME"),
            P::new("type $NAME = $TYPE;").kind("type").name("NAME"),
        ],
        constants: vec![
            P::new("const $NAME: $TYPE = $VALUE;").kind("constant").name("NAME"),
            P::new("static $NAME: $TYPE = $VALUE;").kind("static").name("NAME"),
        ],
        imports: vec![
            P::new("use $PATH;").kind("use").names("PATH").source("PATH"),
            P::new("pub use $PATH;").kind("re-export").names("PATH").source("PATH"),
            P::new("mod $NAME;").kind("mod").name("NAME").source("NAME"),
            P::new("pub mod $NAME;").kind("mod").name("NAME").source("NAME"),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visibility_markers_in_exports() {
        let table = queries();
        assert!(table.exports.iter().all(|p| p.pattern.starts_with("pub")));
        assert!(table.exports.iter().any(|p| p.pattern.starts_with("pub(crate)")));
    }

    #[test]
    fn test_use_and_mod_are_imports() {
        let table = queries();
        let kinds: Vec<_> = table.imports.iter().filter_map(|p| p.kind).collect();
        assert!(kinds.contains(&"use"));
        assert!(kinds.contains(&"mod"));
    }
}
