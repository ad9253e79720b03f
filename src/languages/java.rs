use super::{LanguageDef, QueryPattern as P, QueryTable};

pub fn definition() -> LanguageDef {
    LanguageDef {
        name: "java",
        aliases: &[],
        extensions: &["java"],
        dialects: &[],
        queries: queries(),
    }
}

pub fn queries() -> QueryTable {
    QueryTable {
        exports: vec![
            P::new("public class $NAME { $$$BODY }").kind("class").name("NAME"),
            P::new("public class $NAME extends $BASE { $$$BODY }").kind("class").name("NAME"),
            P::new("public class $NAME implements $$$IFACES { $$$BODY }")
                .kind("class")
                .name("NAME"),
            P::new("public abstract class $NAME { $$$BODY }").kind("class").name("NAME"),
            P::new("public final class $NAME { $$$BODY }").kind("class").name("NAME"),
            P::new("public interface $NAME { $$$BODY }").kind("interface").name("NAME"),
            P::new("public enum $NAME { $$$BODY }").kind("enum").name("NAME"),
            P::new("public record $NAME($$$FIELDS) { $$$BODY }").kind("record").name("NAME"),
            P::new("public $RET $NAME($$$PARAMS) { $$$BODY }").kind("method").name("NAME"),
            P::new("public static $RET $NAME($$$PARAMS) { $$$BODY }").kind("method").name("NAME"),
            P::new("protected $RET $NAME($$$PARAMS) { $$$BODY }").kind("method").name("NAME"),
            P::new("protected class $NAME { $$$BODY }").kind("class").name("NAME"),
        ],
        functions: vec![
            P::new("$RET $NAME($$$PARAMS) { $$$BODY }").kind("method").name("NAME"),
        ],
        classes: vec![
            P::new("class $NAME { $$$BODY }").kind("class").name("NAME"),
            P::new("class $NAME extends $BASE { $$$BODY }").kind("class").name("NAME"),
            P::new("abstract class $NAME { $$$BODY }").kind("class").name("NAME"),
            P::new("enum $NAME { $$$BODY }").kind("enum").name("NAME"),
        ],
        types: vec![P::new("interface $NAME { $$$BODY }").kind("interface").name("NAME")],
        constants: vec![
            P::new("static final $TYPE $NAME = $VALUE;").kind("constant").name("NAME"),
            P::new("public static final $TYPE $NAME = $VALUE;").kind("constant").name("NAME"),
        ],
        imports: vec![
            P::new("import $SOURCE;").kind("import").names("SOURCE").source("SOURCE"),
            P::new("import static $SOURCE;").kind("static").names("SOURCE").source("SOURCE"),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_modifier_exports() {
        let table = queries();
        assert!(table
            .exports
            .iter()
            .all(|p| p.pattern.starts_with("public") || p.pattern.starts_with("protected")));
    }
}
