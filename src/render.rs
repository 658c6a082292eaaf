use std::fmt;

use crate::{CompiledRule, CompiledRuleSet, Source, ValueType, BASE_SALIENCE};

const DEFAULT_VALUES: &str = "DefaultValues";
const GROUP_ENTRIES: &str = "GroupEntries";

/// Render a compiled rule set as Grule rule language source.
///
/// Setup rules (defaults and group entries) get a salience above every
/// feature rule so they fire first.
#[must_use]
pub fn render_grl(compiled: &CompiledRuleSet) -> String {
    Grl(compiled).to_string()
}

struct Grl<'a>(&'a CompiledRuleSet);

impl fmt::Display for Grl<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let compiled = self.0;
        let setup = compiled
            .feature_rules
            .iter()
            .map(|r| r.precedence)
            .max()
            .unwrap_or(BASE_SALIENCE)
            .saturating_add(1);

        if !compiled.default_values.is_empty() {
            let actions: Vec<String> = compiled
                .default_values
                .iter()
                .map(|d| format!("{}.Put(\"{}\", {})", target(d.result), d.name, d.default_value))
                .collect();
            write_rule(f, DEFAULT_VALUES, setup, "true", &actions)?;
        }

        if !compiled.groups.is_empty() {
            let mut actions = Vec::new();
            for (group, members) in &compiled.groups {
                for (i, member) in members.iter().enumerate() {
                    let entries = serde_json::Value::String(member.entries.to_string());
                    actions.push(format!(
                        "{}.Put(\"{group}_{i}_entries\", processor.ToSlice({entries}))",
                        Source::Context
                    ));
                }
            }
            write_rule(f, GROUP_ENTRIES, setup, "true", &actions)?;
        }

        for rule in &compiled.feature_rules {
            write_rule(f, &rule.name, rule.precedence, &rule.condition, &[assignment(rule)])?;
        }
        Ok(())
    }
}

fn target(result: bool) -> Source {
    if result {
        Source::Result
    } else {
        Source::Context
    }
}

fn assignment(rule: &CompiledRule) -> String {
    let target = target(rule.result);
    let write = if rule.output_type == Some(ValueType::Slice) {
        "AddItems"
    } else {
        "Put"
    };
    format!("{target}.{write}(\"{}\", {})", rule.name, rule.expression)
}

fn write_rule(
    f: &mut fmt::Formatter<'_>,
    name: &str,
    salience: i64,
    condition: &str,
    actions: &[String],
) -> fmt::Result {
    writeln!(f, "rule {name} \"{name}\" salience {salience} {{")?;
    writeln!(f, "    when")?;
    writeln!(f, "        {condition}")?;
    writeln!(f, "    then")?;
    for action in actions {
        writeln!(f, "        {action};")?;
    }
    writeln!(f, "        Retract(\"{name}\");")?;
    writeln!(f, "}}")?;
    writeln!(f)
}
