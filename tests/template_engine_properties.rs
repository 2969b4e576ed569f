//! Property-based tests across the engine and the generation layer
//! **Property: generated content equals a direct render followed by tab expansion**

use proptest::prelude::*;
use symmetric_codegen::{ClassSchema, CodegenConfig, Generator};
use symmetric_template::{compile, Context};

proptest! {
    /// Property: the generator adds nothing but re-indentation to a render
    #[test]
    fn prop_generator_matches_direct_render(
        name in "[A-Z][a-z]{0,10}",
        body in r"[a-z \t\n;]{0,40}",
        indent in 0usize..6,
    ) {
        let source = format!("{}{{{{ name }}}}{}", body, body);

        let mut generator = Generator::new(CodegenConfig::new().with_indent(indent));
        generator.add_template("t", "txt", &source).unwrap();
        let generated = generator.render_class(&ClassSchema::new(name.clone())).unwrap();

        let direct = compile(&source)
            .unwrap()
            .render(&Context::new().with("name", name))
            .unwrap();
        let expected = if indent == 0 {
            direct
        } else {
            direct.replace('\t', &" ".repeat(indent))
        };
        prop_assert_eq!(&generated[0].content, &expected);
    }
}
