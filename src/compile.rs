use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::precedence::build_precedence;
use crate::salience::Saliences;
use crate::solve::LevelSolver;
use crate::symbols::Symbols;
use crate::transpile::Transpiler;
use crate::types::value_text;
use crate::{
    Accessor, CompileError, CompileOptions, CompiledRule, CompiledRuleSet, DefaultValue,
    FeatwsError, Model, Rule, ValueType,
};

const ALWAYS: &str = "true";

pub(crate) fn compile(
    model: &Model,
    options: &CompileOptions,
) -> Result<CompiledRuleSet, CompileError> {
    let symbols = Symbols::new(model);

    let precedence = build_precedence(model.rules());
    let levels = LevelSolver::new(&symbols, precedence).solve()?;
    let saliences = Saliences::assign(&levels, options.salience_base());
    debug!(
        rules = levels.len(),
        max_level = saliences.max_level(),
        "assigned saliences"
    );

    let transpiler = Transpiler::new(&symbols);
    let feature_rules: Vec<_> = model
        .rules()
        .map(|rule| assemble(rule, &symbols, &transpiler, &saliences))
        .collect();
    let default_values = build_default_values(model, &symbols, &transpiler);

    let required_params: Vec<_> = model.required_params().cloned().collect();
    Ok(CompiledRuleSet {
        feature_rules,
        default_values,
        setup_ready: required_params.is_empty(),
        required_params,
        remote_loaded: model.remote_loaded().cloned().collect(),
        groups: model.groups.clone(),
        slices: model.slices.clone(),
        levels,
    })
}

/// Whether `name` is written to `result` rather than `ctx`: both the rule
/// and its feature must say so.
fn writes_result(name: &str, rule_result: bool, symbols: &Symbols<'_>) -> bool {
    rule_result && symbols.feature(name).map_or(true, |f| f.result)
}

/// Output type of a rule: its own `type`, else its feature's type, else
/// boolean for rules with no declared feature.
fn output_type(rule: &Rule, symbols: &Symbols<'_>) -> Option<ValueType> {
    if rule.output_type.is_some() {
        return rule.output_type;
    }
    match symbols.feature(&rule.name) {
        Some(feature) => feature.value_type,
        None => Some(ValueType::Boolean),
    }
}

fn assemble(
    rule: &Rule,
    symbols: &Symbols<'_>,
    transpiler: &Transpiler<'_, '_>,
    saliences: &Saliences,
) -> CompiledRule {
    let output_type = output_type(rule, symbols);

    let condition = match rule.condition.as_deref() {
        None | Some(ALWAYS) => ALWAYS.to_owned(),
        Some(condition) => transpiler.transpile(condition, Some(ValueType::Boolean)),
    };
    let expression = transpiler.transpile(&rule.expression_text(), output_type);

    CompiledRule {
        name: rule.name.clone(),
        output_type,
        accessor: Accessor::for_type(output_type),
        condition,
        precedence: saliences.get(&rule.name),
        expression,
        result: writes_result(&rule.name, rule.result, symbols),
    }
}

/// Boolean defaults render as strings in the target language. A default
/// goes to the same map its feature's rule writes.
fn build_default_values(
    model: &Model,
    symbols: &Symbols<'_>,
    transpiler: &Transpiler<'_, '_>,
) -> Vec<DefaultValue> {
    let mut defaults = Vec::new();
    for feature in model.features() {
        let Some(default) = &feature.default else {
            continue;
        };
        let output = if default.is_boolean() || feature.value_type == Some(ValueType::Boolean) {
            Some(ValueType::String)
        } else {
            feature.value_type
        };
        let value = transpiler.transpile(&value_text(default), output);
        if value.is_empty() {
            continue;
        }
        defaults.push(DefaultValue {
            name: feature.name.clone(),
            default_value: value,
            result: writes_result(
                &feature.name,
                model.rule(&feature.name).map_or(true, |r| r.result),
                symbols,
            ),
        });
    }
    defaults
}

/// Load the model in `dir`, compile it and write `dir/rules.grl`.
///
/// Returns the path of the written file.
///
/// # Errors
///
/// Returns [`FeatwsError`] on load, compile or write failure.
pub fn transpile_dir(dir: impl AsRef<Path>) -> Result<PathBuf, FeatwsError> {
    let dir = dir.as_ref();
    let model = Model::from_dir(dir)?;
    let compiled = model.compile()?;
    let output = dir.join("rules.grl");
    compiled.write_grl(&output)?;
    info!(path = %output.display(), %compiled, "wrote rule file");
    Ok(output)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::{
        Accessor, CompileError, CompileOptions, Feature, GroupMember, ModelBuilder, Parameter,
        ValueType,
    };

    #[test]
    fn parameter_rule_at_level_zero() {
        let compiled = ModelBuilder::new()
            .feature(Feature::new("a", ValueType::Integer))
            .parameter(Parameter::new("p", ValueType::Integer))
            .rule("a", "$p + 1")
            .build()
            .unwrap()
            .compile()
            .unwrap();

        let a = compiled.rule("a").unwrap();
        assert_eq!(compiled.level("a"), Some(0));
        assert_eq!(a.precedence, 1000);
        assert_eq!(a.expression, r#"ctx.GetInt("p") + 1"#);
        assert_eq!(a.output_type, Some(ValueType::Integer));
        assert_eq!(a.accessor, Accessor::GetInt);
        assert_eq!(a.condition, "true");
        assert!(a.result);
    }

    #[test]
    fn dependent_rule_gets_lower_salience() {
        let compiled = ModelBuilder::new()
            .rule("a", "#b == 1")
            .rule("b", 2)
            .build()
            .unwrap()
            .compile()
            .unwrap();

        assert_eq!(compiled.level("b"), Some(0));
        assert_eq!(compiled.level("a"), Some(1));
        let a = compiled.rule("a").unwrap();
        let b = compiled.rule("b").unwrap();
        assert!(b.precedence > a.precedence);
        assert_eq!(a.expression, r#"result.Get("b") == 1"#);
        assert_eq!(a.output_type, Some(ValueType::Boolean));
        assert_eq!(b.expression, "2");
        assert_eq!(compiled.execution_order(), vec!["b", "a"]);
    }

    #[test]
    fn condition_is_transpiled() {
        let compiled = ModelBuilder::new()
            .parameter(Parameter::new("age", ValueType::Integer))
            .feature(Feature::new("label", ValueType::String))
            .rule(
                "label",
                json!({"value": "adult", "condition": "$age >= 18"}),
            )
            .build()
            .unwrap()
            .compile()
            .unwrap();

        let label = compiled.rule("label").unwrap();
        assert_eq!(label.condition, r#"ctx.GetInt("age") >= 18"#);
        assert_eq!(label.expression, "\"adult\"");
    }

    #[test]
    fn condition_references_order_rules() {
        let compiled = ModelBuilder::new()
            .rule("gate", true)
            .rule("a", json!({"value": 1, "type": "integer", "condition": "#gate"}))
            .build()
            .unwrap()
            .compile()
            .unwrap();
        assert_eq!(compiled.level("a"), Some(1));
        assert_eq!(compiled.rule("a").unwrap().condition, r#"result.Get("gate")"#);
    }

    #[test]
    fn group_levels() {
        let compiled = ModelBuilder::new()
            .parameter(Parameter::new("state", ValueType::String))
            .group("g", vec![GroupMember::new("{$state}", json!(["SP"]))])
            .build()
            .unwrap()
            .compile()
            .unwrap();

        let names: Vec<&str> = compiled.feature_rules().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["g_0_value", "g_0", "g"]);
        assert_eq!(compiled.level("g_0_value"), Some(0));
        assert_eq!(compiled.level("g_0"), Some(1));
        assert_eq!(compiled.level("g"), Some(2));

        assert_eq!(
            compiled.rule("g_0_value").unwrap().expression,
            r#"ctx.GetString("state") + """#
        );
        assert_eq!(
            compiled.rule("g").unwrap().expression,
            r#"result.GetBool("g_0")"#
        );
    }

    #[test]
    fn slice_items_read_from_context() {
        let compiled = ModelBuilder::new()
            .parameter(Parameter::new("base", ValueType::Integer))
            .rule(
                "limits",
                json!([{"value": "$base * 2", "type": "integer"}, {"value": "$base * 3", "type": "integer"}]),
            )
            .build()
            .unwrap()
            .compile()
            .unwrap();

        let slice = compiled.rule("limits").unwrap();
        assert_eq!(slice.output_type, Some(ValueType::Slice));
        assert_eq!(slice.accessor, Accessor::GetSlice);
        assert_eq!(
            slice.expression,
            r#"ctx.GetInt("limits_0"), ctx.GetInt("limits_1")"#
        );
        assert!(!compiled.rule("limits_0").unwrap().result);
        assert_eq!(compiled.slices(), ["limits".to_owned()]);
    }

    #[test]
    fn default_values() {
        let compiled = ModelBuilder::new()
            .feature(Feature::new("flag", ValueType::Boolean).with_default(false))
            .feature(Feature::new("limit", ValueType::Integer).with_default(10))
            .feature(Feature::new("label", ValueType::String).with_default("none"))
            .feature(Feature::new("meta", ValueType::Object).with_default(json!({"a": 1})))
            .feature(Feature::new("plain", ValueType::Integer))
            .build()
            .unwrap()
            .compile()
            .unwrap();

        let defaults: Vec<(&str, &str)> = compiled
            .default_values()
            .iter()
            .map(|d| (d.name.as_str(), d.default_value.as_str()))
            .collect();
        assert_eq!(
            defaults,
            vec![
                ("flag", "\"false\""),
                ("limit", "10"),
                ("label", "\"none\""),
                ("meta", r#"processor.ToMap("{\"a\":1}")"#),
            ]
        );
    }

    #[test]
    fn defaults_follow_the_feature_target() {
        let compiled = ModelBuilder::new()
            .feature(Feature::new("zone", ValueType::String).in_context().with_default("north"))
            .feature(Feature::new("limit", ValueType::Integer).with_default(10))
            .feature(Feature::new("hidden", ValueType::Integer).with_default(0))
            .rule("hidden", json!({"value": 1, "result": false}))
            .build()
            .unwrap()
            .compile()
            .unwrap();

        let targets: Vec<(&str, &str, bool)> = compiled
            .default_values()
            .iter()
            .map(|d| (d.name.as_str(), d.default_value.as_str(), d.result))
            .collect();
        assert_eq!(
            targets,
            vec![
                ("zone", "\"north\"", false),
                ("limit", "10", true),
                ("hidden", "0", false),
            ]
        );
    }

    #[test]
    fn empty_string_default_is_kept_quoted() {
        let compiled = ModelBuilder::new()
            .feature(Feature::new("label", ValueType::String).with_default(""))
            .feature(Feature::new("code", ValueType::Integer).with_default(""))
            .build()
            .unwrap()
            .compile()
            .unwrap();
        assert_eq!(compiled.default_values().len(), 1);
        assert_eq!(compiled.default_values()[0].default_value, "\"\"");
    }

    #[test]
    fn custom_base_salience() {
        let compiled = ModelBuilder::new()
            .rule("a", 1)
            .rule("b", "#a")
            .build()
            .unwrap()
            .compile_with(&CompileOptions::new().base_salience(10))
            .unwrap();
        assert_eq!(compiled.rule("a").unwrap().precedence, 11);
        assert_eq!(compiled.rule("b").unwrap().precedence, 10);
    }

    #[test]
    fn parameter_summaries() {
        let compiled = ModelBuilder::new()
            .parameter(Parameter::new("a", ValueType::Integer).required())
            .parameter(Parameter::new("b", ValueType::Object).resolved_by("clients"))
            .build()
            .unwrap()
            .compile()
            .unwrap();
        assert!(!compiled.setup_ready());
        assert_eq!(compiled.required_params()[0].name, "a");
        assert_eq!(compiled.remote_loaded()[0].name, "b");
    }

    #[test]
    fn unknown_reference_fails_compile() {
        let result = ModelBuilder::new()
            .rule("a", "#ghost")
            .build()
            .unwrap()
            .compile();
        assert!(matches!(
            result,
            Err(CompileError::UnresolvableReference { .. })
        ));
    }
}
