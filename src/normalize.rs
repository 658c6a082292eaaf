use indexmap::map::Entry;
use indexmap::IndexMap;
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::types::value_text;
use crate::{Feature, GroupMember, Model, ModelError, Parameter, Rule, ValueType};

enum Body {
    Rule(Rule),
    Slice(Vec<JsonValue>),
}

pub(crate) fn normalize(
    mut features: Vec<Feature>,
    parameters: Vec<Parameter>,
    raw_rules: Vec<(String, JsonValue)>,
    raw_groups: Vec<(String, Vec<GroupMember>)>,
) -> Result<Model, ModelError> {
    let mut bodies: IndexMap<String, Body> = IndexMap::new();
    for (name, body) in raw_rules {
        let body = parse_body(&name, body)?;
        insert_unique(&mut bodies, name, body)?;
    }

    let mut groups = IndexMap::new();
    for (group, members) in raw_groups {
        expand_group(&group, &members, &mut bodies, &mut features)?;
        groups.insert(group, members);
    }

    let mut rules: IndexMap<String, Rule> = IndexMap::new();
    let mut slices_pending = Vec::new();
    for (name, body) in bodies {
        match body {
            Body::Rule(rule) => insert_unique(&mut rules, name, rule)?,
            Body::Slice(items) => slices_pending.push((name, items)),
        }
    }

    let mut slices = Vec::new();
    for (slice, items) in slices_pending {
        expand_slice(&slice, items, &mut rules, &mut features)?;
        slices.push(slice);
    }

    debug!(
        rules = rules.len(),
        features = features.len(),
        groups = groups.len(),
        slices = slices.len(),
        "normalized model"
    );

    Ok(Model {
        features,
        parameters,
        rules,
        groups,
        slices,
    })
}

fn insert_unique<T>(map: &mut IndexMap<String, T>, name: String, value: T) -> Result<(), ModelError> {
    match map.entry(name) {
        Entry::Occupied(entry) => Err(ModelError::DuplicateRule {
            name: entry.key().clone(),
        }),
        Entry::Vacant(entry) => {
            entry.insert(value);
            Ok(())
        }
    }
}

fn parse_body(name: &str, body: JsonValue) -> Result<Body, ModelError> {
    match body {
        JsonValue::Array(items) => Ok(Body::Slice(items)),
        other => Ok(Body::Rule(parse_rule(name, other)?)),
    }
}

/// An object with a `value` key is a structured rule; anything else is the
/// rule's expression as-is.
fn parse_rule(name: &str, body: JsonValue) -> Result<Rule, ModelError> {
    let JsonValue::Object(mut fields) = body else {
        return Ok(Rule::new(name, body));
    };
    let Some(value) = fields.remove("value") else {
        return Ok(Rule::new(name, JsonValue::Object(fields)));
    };

    let mut rule = Rule::new(name, value);
    match fields.get("type") {
        None | Some(JsonValue::Null) => {}
        Some(JsonValue::String(t)) => {
            let output_type = ValueType::parse(t).ok_or_else(|| ModelError::InvalidRule {
                name: name.to_owned(),
                reason: format!("unknown type '{t}'"),
            })?;
            rule = rule.typed(output_type);
        }
        Some(other) => {
            return Err(ModelError::InvalidRule {
                name: name.to_owned(),
                reason: format!("type must be a string, got {other}"),
            });
        }
    }
    match fields.get("condition") {
        None | Some(JsonValue::Null) => {}
        Some(condition) => rule.condition = Some(value_text(condition).into_owned()),
    }
    if let Some(JsonValue::Bool(result)) = fields.get("result") {
        rule.result = *result;
    }
    Ok(rule)
}

fn push_feature(features: &mut Vec<Feature>, feature: Feature) {
    if !features.iter().any(|f| f.name == feature.name) {
        features.push(feature);
    }
}

/// Group `g` with members `m_0..m_n` becomes:
/// `g_i_value` (the member's rendered value, kept in the context),
/// `g_i` (whether that value is among the member's entries), and
/// `g` (all members pass).
fn expand_group(
    group: &str,
    members: &[GroupMember],
    bodies: &mut IndexMap<String, Body>,
    features: &mut Vec<Feature>,
) -> Result<(), ModelError> {
    let mut checks = Vec::with_capacity(members.len());
    for (i, member) in members.iter().enumerate() {
        let member_name = format!("{group}_{i}");
        let value_name = format!("{member_name}_value");

        let value_rule = Rule::new(&value_name, group_template(&member.template))
            .typed(ValueType::String)
            .in_context();
        insert_unique(bodies, value_name, Body::Rule(value_rule))?;

        let check_rule = Rule::new(&member_name, format!("%{member_name}")).typed(ValueType::Boolean);
        push_feature(features, Feature::new(&member_name, ValueType::Boolean));
        checks.push(format!("#{member_name}"));
        insert_unique(bodies, member_name, Body::Rule(check_rule))?;
    }

    push_feature(features, Feature::new(group, ValueType::Boolean));
    let group_rule = Rule::new(group, checks.join(" && ")).typed(ValueType::Boolean);
    insert_unique(bodies, group.to_owned(), Body::Rule(group_rule))
}

/// Turn `{$state}-{$city}` into the concatenation `$state+"-"+$city`.
pub(crate) fn group_template(template: &str) -> String {
    let quoted = format!("\"{template}\"")
        .replace('{', "\"+")
        .replace('}', "+\"");
    let trimmed = quoted.trim();
    let trimmed = trimmed.strip_prefix("\"\"+").unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix("+\"\"").unwrap_or(trimmed);
    trimmed.to_owned()
}

/// Slice `s` with items `i_0..i_n` becomes context rules `s_0..s_n` and a
/// slice rule `s` collecting them, placed after every other rule.
fn expand_slice(
    slice: &str,
    items: Vec<JsonValue>,
    rules: &mut IndexMap<String, Rule>,
    features: &mut Vec<Feature>,
) -> Result<(), ModelError> {
    let mut item_refs = Vec::with_capacity(items.len());
    for (i, item) in items.into_iter().enumerate() {
        let item_name = format!("{slice}_{i}");
        let rule = parse_rule(&item_name, item)?.in_context();
        push_feature(
            features,
            Feature {
                name: item_name.clone(),
                value_type: rule.output_type,
                result: false,
                default: None,
            },
        );
        item_refs.push(format!("#{item_name}"));
        insert_unique(rules, item_name, rule)?;
    }

    push_feature(features, Feature::new(slice, ValueType::Slice));
    let slice_rule = Rule::new(slice, item_refs.join(", ")).typed(ValueType::Slice);
    insert_unique(rules, slice.to_owned(), slice_rule)
}
