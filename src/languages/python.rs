use super::{LanguageDef, NameFilter, QueryPattern as P, QueryTable};

pub fn definition() -> LanguageDef {
    LanguageDef {
        name: "python",
        aliases: &["py", "python3"],
        extensions: &["py", "pyi"],
        dialects: &[],
        queries: queries(),
    }
}

/// Python has no export statement: `__all__` wins when present, otherwise
/// public module-level definitions are the module's surface.
pub fn queries() -> QueryTable {
    QueryTable {
        exports: vec![
            P::new("__all__ = [$$$NAMES]").kind("all").names("NAMES"),
            P::new("__all__ = ($$$NAMES)").kind("all").names("NAMES"),
            P::new("def $NAME($$$PARAMS): $$$BODY")
                .kind("function")
                .name("NAME")
                .filter(NameFilter::Public)
                .at_top_level(),
            P::new("async def $NAME($$$PARAMS): $$$BODY")
                .kind("function")
                .name("NAME")
                .filter(NameFilter::Public)
                .at_top_level(),
            P::new("class $NAME: $$$BODY")
                .kind("class")
                .name("NAME")
                .filter(NameFilter::Public)
                .at_top_level(),
            P::new("class $NAME($$$BASES): $$$BODY")
                .kind("class")
                .name("NAME")
                .filter(NameFilter::Public)
                .at_top_level(),
        ],
        functions: vec![
            P::new("def $NAME($$$PARAMS): $$$BODY").kind("function").name("NAME"),
            P::new("async def $NAME($$$PARAMS): $$$BODY").kind("function").name("NAME"),
        ],
        classes: vec![
            P::new("class $NAME: $$$BODY").kind("class").name("NAME"),
            P::new("class $NAME($$$BASES): $$$BODY").kind("class").name("NAME"),
        ],
        types: vec![
            P::new("$NAME = TypeVar($$$ARGS)").kind("type_var").name("NAME").at_top_level(),
            P::new("$NAME: TypeAlias = $TYPE").kind("type").name("NAME").at_top_level(),
        ],
        constants: vec![
            P::new("$NAME = $VALUE")
                .kind("constant")
                .name("NAME")
                .filter(NameFilter::UpperSnake)
                .at_top_level(),
            P::new("$NAME: $TYPE = $VALUE")
                .kind("constant")
                .name("NAME")
                .filter(NameFilter::UpperSnake)
                .at_top_level(),
        ],
        imports: vec![
            P::new("import $SOURCE").kind("module").name("SOURCE").source("SOURCE"),
            P::new("import $SOURCE as $NAME").kind("module").name("NAME").source("SOURCE"),
            P::new("from $SOURCE import $$$NAMES").kind("from").names("NAMES").source("SOURCE"),
            P::new("from $SOURCE import ($$$NAMES)").kind("from").names("NAMES").source("SOURCE"),
        ],
    }
}
