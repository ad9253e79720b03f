use super::{LanguageDef, QueryPattern as P, QueryTable};

pub fn definition() -> LanguageDef {
    LanguageDef {
        name: "javascript",
        aliases: &["js", "node", "nodejs"],
        extensions: &["js", "jsx", "mjs", "cjs"],
        dialects: &[("jsx", "jsx")],
        queries: queries(),
    }
}

/// JavaScript patterns. TypeScript starts from this table.
pub fn queries() -> QueryTable {
    QueryTable {
        exports: vec![
            P::new("export function $NAME($$$PARAMS) { $$$BODY }").kind("function").name("NAME"),
            P::new("export async function $NAME($$$PARAMS) { $$$BODY }")
                .kind("function")
                .name("NAME"),
            P::new("export function* $NAME($$$PARAMS) { $$$BODY }").kind("function").name("NAME"),
            P::new("export class $NAME { $$$BODY }").kind("class").name("NAME"),
            P::new("export class $NAME extends $BASE { $$$BODY }").kind("class").name("NAME"),
            P::new("export const $NAME = $VALUE").kind("constant").name("NAME"),
            P::new("export let $NAME = $VALUE").kind("variable").name("NAME"),
            P::new("export var $NAME = $VALUE").kind("variable").name("NAME"),
            P::new("export default function $NAME($$$PARAMS) { $$$BODY }")
                .kind("function")
                .name("NAME"),
            P::new("export default class $NAME { $$$BODY }").kind("class").name("NAME"),
            P::new("export default $VALUE").kind("default").fallback("default"),
            P::new("export { $$$NAMES }").kind("named").names("NAMES"),
            P::new("module.exports = { $$$NAMES }").kind("commonjs").names("NAMES"),
            P::new("module.exports = $NAME").kind("commonjs").name("NAME").fallback("default"),
            P::new("module.exports.$NAME = $VALUE").kind("commonjs").name("NAME"),
            P::new("exports.$NAME = $VALUE").kind("commonjs").name("NAME"),
        ],
        functions: vec![
            P::new("function $NAME($$$PARAMS) { $$$BODY }").kind("function").name("NAME"),
            P::new("async function $NAME($$$PARAMS) { $$$BODY }").kind("function").name("NAME"),
            P::new("function* $NAME($$$PARAMS) { $$$BODY }").kind("generator").name("NAME"),
            P::new("const $NAME = ($$$PARAMS) => $BODY").kind("arrow").name("NAME"),
            P::new("const $NAME = async ($$$PARAMS) => $BODY").kind("arrow").name("NAME"),
            P::new("const $NAME = function($$$PARAMS) { $$$BODY }").kind("function").name("NAME"),
        ],
        classes: vec![
            P::new("class $NAME { $$$BODY }").kind("class").name("NAME"),
            P::new("class $NAME extends $BASE { $$$BODY }").kind("class").name("NAME"),
        ],
        types: Vec::new(),
        constants: vec![P::new("const $NAME = $VALUE").kind("constant").name("NAME")],
        imports: vec![
            P::new("import $NAME from $SOURCE").kind("default").name("NAME").source("SOURCE"),
            P::new("import { $$$NAMES } from $SOURCE")
                .kind("named")
                .names("NAMES")
                .source("SOURCE"),
            P::new("import $NAME, { $$$NAMES } from $SOURCE")
                .kind("named")
                .names("NAMES")
                .source("SOURCE"),
            P::new("import * as $NAME from $SOURCE")
                .kind("namespace")
                .name("NAME")
                .source("SOURCE"),
            P::new("import $SOURCE").kind("side-effect").source("SOURCE"),
            P::new("const $NAME = require($SOURCE)").kind("require").name("NAME").source("SOURCE"),
            P::new("const { $$$NAMES } = require($SOURCE)")
                .kind("require")
                .names("NAMES")
                .source("SOURCE"),
            P::new("require($SOURCE)").kind("side-effect").source("SOURCE"),
            P::new("export { $$$NAMES } from $SOURCE")
                .kind("re-export")
                .names("NAMES")
                .source("SOURCE"),
            P::new("export * from $SOURCE").kind("re-export").source("SOURCE"),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_types_category_is_empty() {
        assert!(queries().types.is_empty());
    }

    #[test]
    fn test_import_patterns_capture_source() {
        assert!(queries().imports.iter().all(|p| p.source_var == Some("SOURCE")));
    }

    #[test]
    fn test_commonjs_exports_present() {
        let table = queries();
        let commonjs: Vec<_> = table
            .exports
            .iter()
            .filter(|p| p.kind == Some("commonjs"))
            .collect();
        assert_eq!(commonjs.len(), 4);
        assert!(commonjs.iter().any(|p| p.multi));
    }
}
