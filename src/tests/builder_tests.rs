//! Tests for defining blocks through the fluent builder
//!
//! These tests cover connection typing, colours, layout flags, metadata and
//! every way a definition can be rejected at registration.

#[cfg(test)]
mod builder_tests {
    use crate::core::content::Content;
    use crate::core::field::Field;
    use crate::core::meta::MetaKey;
    use crate::core::types::{BuiltinType, Colour, TypeIndicator};
    use crate::core::{BlockFactory, BuildError, FactoryConfig, HostRegistry, SlotDef};
    use crate::host::memory::{InputKind, RenderedShape};
    use crate::host::FieldWidget;
    use crate::ExprCode;

    fn factory() -> BlockFactory {
        BlockFactory::new(HostRegistry::new(), FactoryConfig::default(), vec![]).unwrap()
    }

    fn factory_with_types(types: &[&str]) -> BlockFactory {
        let config = FactoryConfig::new().with_custom_types(types.iter().copied());
        BlockFactory::new(HostRegistry::new(), config, vec![]).unwrap()
    }

    /// A fresh builder is a statement that stacks with anything
    #[test]
    fn test_defaults() {
        let factory = factory();
        let builder = factory.block("plain");
        let definition = builder.definition();

        assert_eq!(definition.name(), "plain");
        assert_eq!(definition.previous(), Some(&TypeIndicator::Any));
        assert_eq!(definition.next(), Some(&TypeIndicator::Any));
        assert_eq!(definition.output(), None);
        assert_eq!(definition.colour(), &Colour::Hue(120));
        assert_eq!(definition.inline(), None);
        assert!(definition.fields().is_empty());
        assert!(definition.meta().is_empty());
    }

    /// `outputs` after `follows`/`precedes` leaves only the output
    #[test]
    fn test_outputs_clears_stack_connections() {
        let factory = factory();
        let builder = factory.block("sum").follows("Number").precedes("String").outputs("Number");
        let definition = builder.definition();

        assert_eq!(definition.previous(), None);
        assert_eq!(definition.next(), None);
        assert_eq!(definition.output(), Some(&TypeIndicator::Builtin(BuiltinType::Number)));
        assert!(definition.is_expression());
    }

    #[test]
    fn test_none_removes_connection() {
        let factory = factory();
        let builder = factory.block("start").follows("none").precedes("*");

        assert_eq!(builder.definition().previous(), None);
        assert_eq!(builder.definition().next(), Some(&TypeIndicator::Any));
    }

    #[test]
    fn test_colour_last_call_wins() {
        let factory = factory();
        assert_eq!(
            factory.block("a").hue(30).color("#a55b80").definition().colour(),
            &Colour::Hex("#a55b80".into())
        );
        assert_eq!(
            factory.block("b").color("#a55b80").hue(30).definition().colour(),
            &Colour::Hue(30)
        );
    }

    #[test]
    fn test_inline_and_external() {
        let factory = factory();
        assert_eq!(factory.block("a").inline().definition().inline(), Some(true));
        assert_eq!(factory.block("b").external().definition().inline(), Some(false));
        assert_eq!(factory.block("c").inline().external().definition().inline(), Some(false));
    }

    #[test]
    fn test_meta_overwrites_same_key() {
        const LABEL: MetaKey<String> = MetaKey::new("label");
        const WEIGHT: MetaKey<u32> = MetaKey::new("weight");

        let factory = factory();
        let builder = factory
            .block("tagged")
            .meta(LABEL, "first".to_string())
            .meta(WEIGHT, 3)
            .meta(LABEL, "second".to_string());

        let meta = builder.definition().meta();
        assert_eq!(meta.get(LABEL).map(String::as_str), Some("second"));
        assert_eq!(meta.get(WEIGHT), Some(&3));
        assert_eq!(meta.len(), 2);
    }

    #[test]
    fn test_fields_keep_declaration_order() {
        let factory = factory();
        let builder = factory
            .block("move")
            .content(|row| row.text("move").dropdown("DIR", ["left", "right"]))
            .slot("STEPS", SlotDef::allow("Number").content(|row| row.text("by")))
            .stmt("THEN", "*");

        let fields = builder.definition().fields();
        assert_eq!(fields.len(), 3);
        assert!(matches!(&fields[0], Field::Content(items) if items.len() == 2));
        assert!(matches!(&fields[1], Field::Value { key, check, .. }
            if key == "STEPS" && *check == TypeIndicator::Builtin(BuiltinType::Number)));
        assert!(matches!(&fields[2], Field::Statement { key, check } if key == "THEN" && *check == TypeIndicator::Any));
        assert!(matches!(&fields[1].content()[0], Content::Text(text) if text == "by"));
    }

    /// A custom type used anywhere must have been declared on the factory
    #[test]
    fn test_undeclared_custom_type_rejected() {
        let factory = factory_with_types(&["Sprite"]);

        assert!(factory
            .block("ok")
            .follows("Sprite")
            .slot("S", SlotDef::allow("Sprite"))
            .implement(|_| Ok(String::new()))
            .is_ok());

        let err = factory.block("bad").precedes("Costume").implement(|_| Ok(String::new())).unwrap_err();
        assert_eq!(
            err,
            BuildError::UndeclaredType {
                block: "bad".into(),
                ty: "Costume".into()
            }
        );

        let err = factory
            .block("bad_output")
            .outputs("Costume")
            .implement(|_| Ok(ExprCode::plain("")))
            .unwrap_err();
        assert!(matches!(err, BuildError::UndeclaredType { ty, .. } if ty == "Costume"));

        let err = factory
            .block("bad_variable")
            .content(|row| row.variable("V", ["Costume"]))
            .implement(|_| Ok(String::new()))
            .unwrap_err();
        assert!(matches!(err, BuildError::UndeclaredType { ty, .. } if ty == "Costume"));

        assert!(!factory.registry().contains("bad"));
    }

    #[test]
    fn test_wildcards_rejected_where_meaningless() {
        let factory = factory();

        let err = factory.block("out").outputs("*").implement(|_| Ok(ExprCode::plain(""))).unwrap_err();
        assert!(matches!(err, BuildError::InvalidIndicator { indicator, .. } if indicator == "*"));

        let err = factory
            .block("slot")
            .slot("A", SlotDef::allow("none"))
            .implement(|_| Ok(String::new()))
            .unwrap_err();
        assert!(matches!(err, BuildError::InvalidIndicator { indicator, .. } if indicator == "none"));
    }

    #[test]
    fn test_empty_name_rejected() {
        let err = factory().block("  ").implement(|_| Ok(String::new())).unwrap_err();
        assert_eq!(err, BuildError::EmptyName);
    }

    /// Keys are unique across content rows and slots
    #[test]
    fn test_duplicate_keys_rejected() {
        let factory = factory();

        let err = factory
            .block("dup")
            .content(|row| row.number("X", 1.0))
            .slot("X", SlotDef::any())
            .implement(|_| Ok(String::new()))
            .unwrap_err();
        assert_eq!(
            err,
            BuildError::DuplicateKey {
                block: "dup".into(),
                key: "X".into()
            }
        );

        let err = factory
            .block("dup_row")
            .content(|row| row.textbox("T", "a").textbox("T", "b"))
            .implement(|_| Ok(String::new()))
            .unwrap_err();
        assert!(matches!(err, BuildError::DuplicateKey { key, .. } if key == "T"));
    }

    /// The implementation may only touch keys the definition declares
    #[test]
    fn test_undeclared_key_rejected() {
        let factory = factory();

        let err = factory
            .block("reads")
            .content(|row| row.number("N", 1.0))
            .implement(|block| Ok(block.fields().text("M")?))
            .unwrap_err();
        assert_eq!(
            err,
            BuildError::UndeclaredKey {
                block: "reads".into(),
                key: "M".into()
            }
        );

        let err = factory
            .block("resolves")
            .content(|row| row.number("N", 1.0))
            .implement(|block| block.resolve("N"))
            .unwrap_err();
        assert!(matches!(err, BuildError::UndeclaredKey { key, .. } if key == "N"));

        assert_eq!(factory.registry().count(), 0);
    }

    #[test]
    fn test_shape_replays_definition() {
        let factory = factory();
        factory
            .block("say")
            .hue(65)
            .tooltip("Say something")
            .help_url("https://example.org/say")
            .follows("none")
            .inline()
            .content(|row| row.text("say").textbox("MSG", "hello"))
            .slot("TARGET", SlotDef::allow("String").content(|row| row.text("to")))
            .stmt("AFTER", "*")
            .implement(|_| Ok(String::new()))
            .unwrap();

        let shape = factory.registry().shape("say").unwrap();
        let mut rendered = RenderedShape::new();
        shape.init(&mut rendered);

        assert_eq!(rendered.colour, Some(Colour::Hue(65)));
        assert_eq!(rendered.tooltip.as_deref(), Some("Say something"));
        assert_eq!(rendered.help_url.as_deref(), Some("https://example.org/say"));
        assert_eq!(rendered.previous, None);
        assert_eq!(rendered.next, Some(None));
        assert_eq!(rendered.output, None);
        assert_eq!(rendered.inline, Some(true));

        assert_eq!(rendered.inputs.len(), 3);
        assert_eq!(rendered.inputs[0].kind, InputKind::Dummy);
        assert_eq!(rendered.inputs[0].widget_keys(), vec!["MSG"]);
        assert!(matches!(&rendered.inputs[0].widgets[0], (None, FieldWidget::Label(text)) if text == "say"));

        let target = rendered.input("TARGET").unwrap();
        assert_eq!(target.kind, InputKind::Value);
        assert_eq!(target.check.as_deref(), Some("String"));
        assert!(matches!(&target.widgets[0], (None, FieldWidget::Label(text)) if text == "to"));

        let after = rendered.input("AFTER").unwrap();
        assert_eq!(after.kind, InputKind::Statement);
        assert_eq!(after.check, None);
    }

    #[test]
    fn test_expression_shape_has_only_output() {
        let factory = factory_with_types(&["Sprite"]);
        factory
            .block("me")
            .outputs("Sprite")
            .implement(|_| Ok("this".into()))
            .unwrap();

        let mut rendered = RenderedShape::new();
        factory.registry().shape("me").unwrap().init(&mut rendered);

        assert_eq!(rendered.previous, None);
        assert_eq!(rendered.next, None);
        assert_eq!(rendered.output, Some(Some("Sprite".to_string())));
        assert_eq!(rendered.inline, None);
    }

    #[test]
    fn test_dropdown_options_reach_widget() {
        let factory = factory();
        factory
            .block("pick")
            .content(|row| row.dropdown("A", ["A", "B"]).dropdown("B", [("x", "A"), ("y", "B")]))
            .implement(|_| Ok(String::new()))
            .unwrap();

        let mut rendered = RenderedShape::new();
        factory.registry().shape("pick").unwrap().init(&mut rendered);

        let entries: Vec<Vec<(String, String)>> = rendered.inputs[0]
            .widgets
            .iter()
            .filter_map(|(_, widget)| match widget {
                FieldWidget::Dropdown(options) => Some(options.entries()),
                _ => None,
            })
            .collect();
        let pairs = |items: &[(&str, &str)]| -> Vec<(String, String)> {
            items.iter().map(|(l, v)| (l.to_string(), v.to_string())).collect()
        };
        assert_eq!(entries[0], pairs(&[("A", "A"), ("B", "B")]));
        assert_eq!(entries[1], pairs(&[("x", "A"), ("y", "B")]));
    }
}
