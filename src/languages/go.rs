use super::{LanguageDef, NameFilter, QueryPattern as P, QueryTable};

pub fn definition() -> LanguageDef {
    LanguageDef {
        name: "go",
        aliases: &["golang"],
        extensions: &["go"],
        dialects: &[],
        queries: queries(),
    }
}

/// Go exports by capitalization, so every export pattern carries the
/// `Capitalized` filter.
pub fn queries() -> QueryTable {
    QueryTable {
        exports: vec![
            P::new("func $NAME($$$PARAMS) { $$$BODY }")
                .kind("function")
                .name("NAME")
                .filter(NameFilter::Capitalized),
            P::new("func $NAME($$$PARAMS) $RET { $$$BODY }")
                .kind("function")
                .name("NAME")
                .filter(NameFilter::Capitalized),
            P::new("func ($RECV $TYPE) $NAME($$$PARAMS) { $$$BODY }")
                .kind("method")
                .name("NAME")
                .filter(NameFilter::Capitalized),
            P::new("func ($RECV $TYPE) $NAME($$$PARAMS) $RET { $$$BODY }")
                .kind("method")
                .name("NAME")
                .filter(NameFilter::Capitalized),
            P::new("type $NAME struct { $$$FIELDS }")
                .kind("struct")
                .name("NAME")
                .filter(NameFilter::Capitalized),
            P::new("type $NAME interface { $$$METHODS }")
                .kind("interface")
                .name("NAME")
                .filter(NameFilter::Capitalized),
            P::new("type $NAME $TYPE").kind("type").name("NAME").filter(NameFilter::Capitalized),
            P::new("const $NAME = $VALUE")
                .kind("constant")
                .name("NAME")
                .filter(NameFilter::Capitalized),
            P::new("var $NAME = $VALUE")
                .kind("variable")
                .name("NAME")
                .filter(NameFilter::Capitalized),
        ],
        functions: vec![
            P::new("func $NAME($$$PARAMS) { $$$BODY }").kind("function").name("NAME"),
            P::new("func $NAME($$$PARAMS) $RET { $$$BODY }").kind("function").name("NAME"),
            P::new("func ($RECV $TYPE) $NAME($$$PARAMS) { $$$BODY }").kind("method").name("NAME"),
            P::new("func ($RECV $TYPE) $NAME($$$PARAMS) $RET { $$$BODY }")
                .kind("method")
                .name("NAME"),
        ],
        classes: vec![P::new("type $NAME struct { $$$FIELDS }").kind("struct").name("NAME")],
        types: vec![
            P::new("type $NAME interface { $$$METHODS }").kind("interface").name("NAME"),
            P::new("type $NAME $TYPE").kind("type").name("NAME"),
        ],
        constants: vec![P::new("const $NAME = $VALUE").kind("constant").name("NAME")],
        imports: vec![
            P::new("import $SOURCE").kind("import").source("SOURCE"),
            P::new("import $NAME $SOURCE").kind("alias").name("NAME").source("SOURCE"),
            P::new("import ($$$SPECS)").kind("group").source("SPECS"),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exports_are_capitalization_filtered() {
        let table = queries();
        assert!(table
            .exports
            .iter()
            .all(|p| p.name_filter == Some(NameFilter::Capitalized)));
    }

    #[test]
    fn test_method_receiver_form_exported() {
        let table = queries();
        assert!(table.exports.iter().any(|p| p.kind == Some("method")));
    }
}
