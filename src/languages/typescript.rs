use super::{javascript, LanguageDef, QueryPattern as P, QueryTable};

pub fn definition() -> LanguageDef {
    LanguageDef {
        name: "typescript",
        aliases: &["ts"],
        extensions: &["ts", "tsx", "mts", "cts"],
        dialects: &[("tsx", "tsx")],
        queries: queries(),
    }
}

/// Every JavaScript pattern followed by the TypeScript-only additions.
pub fn queries() -> QueryTable {
    let mut table = javascript::queries();
    table.extend(additions());
    table
}

fn additions() -> QueryTable {
    QueryTable {
        exports: vec![
            P::new("export interface $NAME { $$$BODY }").kind("interface").name("NAME"),
            P::new("export interface $NAME extends $$$BASES { $$$BODY }")
                .kind("interface")
                .name("NAME"),
            P::new("export type $NAME = $TYPE").kind("type").name("NAME"),
            P::new("export enum $NAME { $$$BODY }").kind("enum").name("NAME"),
            P::new("export const enum $NAME { $$$BODY }").kind("enum").name("NAME"),
            P::new("export abstract class $NAME { $$$BODY }").kind("class").name("NAME"),
            P::new("export abstract class $NAME extends $BASE { $$$BODY }")
                .kind("class")
                .name("NAME"),
            P::new("export function $NAME($$$PARAMS): $RET { $$$BODY }")
                .kind("function")
                .name("NAME"),
            P::new("export async function $NAME($$$PARAMS): $RET { $$$BODY }")
                .kind("function")
                .name("NAME"),
            P::new("export const $NAME: $TYPE = $VALUE").kind("constant").name("NAME"),
            P::new("export namespace $NAME { $$$BODY }").kind("namespace").name("NAME"),
            P::new("export type { $$$NAMES }").kind("named").names("NAMES"),
        ],
        functions: vec![
            P::new("function $NAME($$$PARAMS): $RET { $$$BODY }").kind("function").name("NAME"),
            P::new("async function $NAME($$$PARAMS): $RET { $$$BODY }")
                .kind("function")
                .name("NAME"),
            P::new("const $NAME = ($$$PARAMS): $RET => $BODY").kind("arrow").name("NAME"),
        ],
        classes: vec![
            P::new("abstract class $NAME { $$$BODY }").kind("class").name("NAME"),
            P::new("abstract class $NAME extends $BASE { $$$BODY }").kind("class").name("NAME"),
            P::new("class $NAME implements $$$IFACES { $$$BODY }").kind("class").name("NAME"),
        ],
        types: vec![
            P::new("interface $NAME { $$$BODY }").kind("interface").name("NAME"),
            P::new("interface $NAME extends $$$BASES { $$$BODY }").kind("interface").name("NAME"),
            P::new("type $NAME = $TYPE").kind("type").name("NAME"),
            P::new("enum $NAME { $$$BODY }").kind("enum").name("NAME"),
        ],
        constants: vec![P::new("const $NAME: $TYPE = $VALUE").kind("constant").name("NAME")],
        imports: vec![
            P::new("import type { $$$NAMES } from $SOURCE")
                .kind("type")
                .names("NAMES")
                .source("SOURCE"),
            P::new("import type $NAME from $SOURCE").kind("type").name("NAME").source("SOURCE"),
            P::new("import $NAME = require($SOURCE)").kind("require").name("NAME").source("SOURCE"),
            P::new("export type { $$$NAMES } from $SOURCE")
                .kind("re-export")
                .names("NAMES")
                .source("SOURCE"),
        ],
    }
}
