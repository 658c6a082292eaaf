use featws::parse::{tokenize, Piece, ReferenceKind};
use featws::{
    scan_references, CompileError, Feature, ModelBuilder, ModelError, Parameter, ValueType,
};
use serde_json::json;

#[test]
fn empty_model_compiles() {
    let compiled = ModelBuilder::new().build().unwrap().compile().unwrap();
    assert!(compiled.feature_rules().is_empty());
    assert!(compiled.setup_ready());
    assert_eq!(compiled.to_string(), "CompiledRuleSet(0 rules, 0 defaults, 0 groups, 0 slices)");
}

#[test]
fn deeply_chained_dependencies() {
    // r0 <- r1 <- ... <- r25
    let mut builder = ModelBuilder::new().rule("r0", true);
    for i in 1..26 {
        builder = builder.rule(&format!("r{i}"), format!("#r{}", i - 1));
    }
    let compiled = builder.build().unwrap().compile().unwrap();

    assert_eq!(compiled.level("r25"), Some(25));
    assert_eq!(compiled.rule("r0").unwrap().precedence, 1025);
    assert_eq!(compiled.rule("r25").unwrap().precedence, 1000);
}

#[test]
fn reverse_declared_chain() {
    let mut builder = ModelBuilder::new();
    for i in (1..10).rev() {
        builder = builder.rule(&format!("r{i}"), format!("#r{}", i - 1));
    }
    let compiled = builder.rule("r0", 1).build().unwrap().compile().unwrap();
    assert_eq!(compiled.level("r9"), Some(9));
    assert_eq!(compiled.execution_order()[0], "r0");
}

#[test]
fn repeated_reference_counts_once() {
    let compiled = ModelBuilder::new()
        .rule("a", 1)
        .rule("b", "#a + #a + @a")
        .build()
        .unwrap()
        .compile()
        .unwrap();
    assert_eq!(compiled.level("b"), Some(1));
}

#[test]
fn modulo_is_not_a_group_reference() {
    assert!(scan_references("10 % 3 == 1").is_empty());
    let compiled = ModelBuilder::new()
        .parameter(Parameter::new("n", ValueType::Integer))
        .rule("odd", "$n % 2 == 1")
        .build()
        .unwrap()
        .compile()
        .unwrap();
    assert_eq!(
        compiled.rule("odd").unwrap().expression,
        r#"ctx.GetInt("n") % 2 == 1"#
    );
}

#[test]
fn pieces_concatenate_back_to_input() {
    let text = "#a.b::integer+$c % 2 == 1 && @ || %g_0 ## $";
    let rebuilt: String = tokenize(text)
        .iter()
        .map(|p| match p {
            Piece::Ref(token) => token.to_string(),
            Piece::Text(text) => (*text).to_owned(),
        })
        .collect();
    assert_eq!(rebuilt, text);
}

#[test]
fn unknown_sigil_is_unimplemented_scope() {
    assert_eq!(
        ReferenceKind::from_sigil('&'),
        Err(CompileError::UnimplementedScope { scope: '&' })
    );
}

#[test]
fn unknown_cast_uses_generic_getter() {
    let compiled = ModelBuilder::new()
        .parameter(Parameter::new("age", ValueType::Integer))
        .rule("a", "$age::money > 1")
        .build()
        .unwrap()
        .compile()
        .unwrap();
    assert_eq!(compiled.rule("a").unwrap().expression, r#"ctx.Get("age") > 1"#);
}

#[test]
fn unknown_reference_in_condition() {
    let result = ModelBuilder::new()
        .rule("a", json!({"value": 1, "condition": "#missing"}))
        .build()
        .unwrap()
        .compile();
    assert_eq!(
        result.unwrap_err(),
        CompileError::UnresolvableReference {
            rule: "a".into(),
            reference: "missing".into(),
        }
    );
}

#[test]
fn parameter_named_like_rule_reference_is_input() {
    let compiled = ModelBuilder::new()
        .parameter(Parameter::new("limit", ValueType::Integer))
        .rule("over", "#limit < 10")
        .build()
        .unwrap()
        .compile()
        .unwrap();
    assert_eq!(compiled.level("over"), Some(0));
}

#[test]
fn duplicate_feature_declarations_use_the_first() {
    let compiled = ModelBuilder::new()
        .feature(Feature::new("score", ValueType::Integer))
        .feature(Feature::new("score", ValueType::String))
        .rule("score", 5)
        .build()
        .unwrap()
        .compile()
        .unwrap();
    assert_eq!(compiled.rule("score").unwrap().output_type, Some(ValueType::Integer));
}

#[test]
fn slice_name_collision() {
    let result = ModelBuilder::new()
        .rule("items_0", 1)
        .rule("items", json!([1, 2]))
        .build();
    assert_eq!(
        result.unwrap_err(),
        ModelError::DuplicateRule {
            name: "items_0".into()
        }
    );
}

#[test]
fn object_output_is_wrapped() {
    let compiled = ModelBuilder::new()
        .feature(Feature::new("limits", ValueType::Object))
        .rule("limits", json!({"max": 10, "min": 1}))
        .build()
        .unwrap()
        .compile()
        .unwrap();
    assert_eq!(
        compiled.rule("limits").unwrap().expression,
        r#"processor.ToMap("{\"max\":10,\"min\":1}")"#
    );
}

#[test]
fn json_output_is_camel_case() {
    let compiled = ModelBuilder::new()
        .feature(Feature::new("a", ValueType::Integer).with_default(3))
        .rule("a", 1)
        .build()
        .unwrap()
        .compile()
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(&compiled.to_json().unwrap()).unwrap();
    assert_eq!(value["featureRules"][0]["name"], "a");
    assert_eq!(value["featureRules"][0]["accessor"], "GetInt");
    assert_eq!(value["defaultValues"][0]["defaultValue"], "3");
    assert_eq!(value["setupReady"], true);
}
