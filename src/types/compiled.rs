use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

use super::feature::Parameter;
use super::model::GroupMember;
use super::rule::{CompiledRule, DefaultValue};

/// Output of a compile: everything a template needs to render the target
/// rule source.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompiledRuleSet {
    pub(crate) feature_rules: Vec<CompiledRule>,
    pub(crate) default_values: Vec<DefaultValue>,
    pub(crate) required_params: Vec<Parameter>,
    pub(crate) remote_loaded: Vec<Parameter>,
    pub(crate) groups: IndexMap<String, Vec<GroupMember>>,
    pub(crate) slices: Vec<String>,
    pub(crate) setup_ready: bool,
    #[serde(skip)]
    pub(crate) levels: IndexMap<String, usize>,
}

impl CompiledRuleSet {
    /// Compiled rules in declaration order.
    #[must_use]
    pub fn feature_rules(&self) -> &[CompiledRule] {
        &self.feature_rules
    }

    #[must_use]
    pub fn rule(&self, name: &str) -> Option<&CompiledRule> {
        self.feature_rules.iter().find(|r| r.name == name)
    }

    #[must_use]
    pub fn default_values(&self) -> &[DefaultValue] {
        &self.default_values
    }

    #[must_use]
    pub fn required_params(&self) -> &[Parameter] {
        &self.required_params
    }

    #[must_use]
    pub fn remote_loaded(&self) -> &[Parameter] {
        &self.remote_loaded
    }

    #[must_use]
    pub fn groups(&self) -> &IndexMap<String, Vec<GroupMember>> {
        &self.groups
    }

    #[must_use]
    pub fn slices(&self) -> &[String] {
        &self.slices
    }

    /// Whether the rules can run without any caller-supplied parameter.
    #[must_use]
    pub fn setup_ready(&self) -> bool {
        self.setup_ready
    }

    /// Dependency level of a rule: 0 for rules that reference no other rule.
    #[must_use]
    pub fn level(&self, name: &str) -> Option<usize> {
        self.levels.get(name).copied()
    }

    /// Rule names in the order the target engine fires them (highest
    /// salience first, declaration order among equals).
    #[must_use]
    pub fn execution_order(&self) -> Vec<&str> {
        let mut rules: Vec<&CompiledRule> = self.feature_rules.iter().collect();
        rules.sort_by(|a, b| b.precedence.cmp(&a.precedence));
        rules.into_iter().map(|r| r.name.as_str()).collect()
    }

    /// Serialize as pretty JSON for external templates.
    ///
    /// # Errors
    ///
    /// Returns [`serde_json::Error`] if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Render as Grule rule language source.
    #[must_use]
    pub fn to_grl(&self) -> String {
        crate::render::render_grl(self)
    }

    /// Render as Grule source and write it to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`std::io::Error`] if the file cannot be written.
    pub fn write_grl(&self, path: impl AsRef<std::path::Path>) -> std::io::Result<()> {
        std::fs::write(path, self.to_grl())
    }
}

impl fmt::Display for CompiledRuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CompiledRuleSet({} rules, {} defaults, {} groups, {} slices)",
            self.feature_rules.len(),
            self.default_values.len(),
            self.groups.len(),
            self.slices.len(),
        )
    }
}
