//! Property-based tests for class generation
//! **Property: output naming and re-indentation are predictable for any class**

use proptest::prelude::*;
use symmetric_codegen::{ClassSchema, CodegenConfig, Generator, PropertyKind, PropertySchema};

/// Strategy for class names
fn class_name_strategy() -> impl Strategy<Value = String> {
    "[A-Z][A-Za-z0-9]{0,12}"
}

/// Strategy for snake_case property names that stay distinct after camel-casing
fn property_names_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::btree_set("[a-z][a-z0-9]{0,6}(_[a-z][a-z0-9]{0,3})?", 0..6)
        .prop_map(|names| names.into_iter().collect())
}

fn schema(name: &str, properties: &[String]) -> ClassSchema {
    properties.iter().fold(ClassSchema::new(name), |schema, property| {
        schema.with_property(PropertySchema::new(property.clone(), PropertyKind::String))
    })
}

proptest! {
    /// Property: every file is named prefix + class name + extension
    #[test]
    fn prop_output_path_naming(
        name in class_name_strategy(),
        prefix in "[A-Z]{0,3}",
    ) {
        let mut generator = Generator::new(CodegenConfig::new().with_prefix(prefix.clone()));
        generator.add_template("header", "h", "{{ name }}").unwrap();

        let files = generator.render_class(&ClassSchema::new(name.clone())).unwrap();
        prop_assert_eq!(files.len(), 1);
        prop_assert_eq!(files[0].path.to_string_lossy().into_owned(), format!("{}{}.h", prefix, name));
        prop_assert_eq!(&files[0].content, &name);
    }

    /// Property: with a non-zero indent no tab survives post-rendering
    #[test]
    fn prop_tabs_replaced(
        names in property_names_strategy(),
        indent in 1usize..8,
    ) {
        let mut generator = Generator::new(CodegenConfig::new().with_indent(indent));
        generator
            .add_template("fields", "txt", "{% for p in properties %}\t{{ p.name }}\n{% endfor %}")
            .unwrap();

        let files = generator.render_class(&schema("Model", &names)).unwrap();
        let content = &files[0].content;
        prop_assert!(!content.contains('\t'));
        prop_assert_eq!(content.lines().count(), names.len());
        for line in content.lines() {
            prop_assert!(line.starts_with(&" ".repeat(indent)));
        }
    }

    /// Property: one line per property, in declaration order
    #[test]
    fn prop_properties_keep_order(names in property_names_strategy()) {
        let config = CodegenConfig { camelcase: false, ..CodegenConfig::default() };
        let mut generator = Generator::new(config);
        generator
            .add_template("fields", "txt", "{% for p in properties %}{{ p.name }}{% if not last %},{% endif %}{% endfor %}")
            .unwrap();

        let files = generator.render_class(&schema("Model", &names)).unwrap();
        prop_assert_eq!(&files[0].content, &names.join(","));
    }
}
