use indexmap::IndexMap;
use serde::Serialize;

use super::compiled::CompiledRuleSet;
use super::error::{CompileError, ModelError};
use super::feature::{Feature, Parameter};
use super::options::CompileOptions;
use super::rule::Rule;

/// One member of a group: a value template and the entries the rendered
/// value must be found in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupMember {
    /// Template such as `{$state}-{$city}`; braces mark interpolated
    /// expressions.
    pub template: String,
    pub entries: serde_json::Value,
}

impl GroupMember {
    #[must_use]
    pub fn new(template: &str, entries: impl Into<serde_json::Value>) -> Self {
        Self {
            template: template.to_owned(),
            entries: entries.into(),
        }
    }
}

/// Builder for a normalized [`Model`].
///
/// Rule bodies are given as JSON values, in the same shape a `rules.json`
/// file uses: strings are expressions, objects with a `value` key carry
/// `type`/`condition`/`result` alongside it, and arrays declare slices.
///
/// # Example
///
/// ```
/// use featws::{Feature, ModelBuilder, Parameter, ValueType};
///
/// let model = ModelBuilder::new()
///     .parameter(Parameter::new("age", ValueType::Integer))
///     .feature(Feature::new("adult", ValueType::Boolean))
///     .rule("adult", "$age >= 18")
///     .build()
///     .unwrap();
/// assert_eq!(model.rules().count(), 1);
/// ```
#[derive(Debug, Default)]
pub struct ModelBuilder {
    features: Vec<Feature>,
    parameters: Vec<Parameter>,
    rules: Vec<(String, serde_json::Value)>,
    groups: Vec<(String, Vec<GroupMember>)>,
}

impl ModelBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn feature(mut self, feature: Feature) -> Self {
        self.features.push(feature);
        self
    }

    #[must_use]
    pub fn features(mut self, features: impl IntoIterator<Item = Feature>) -> Self {
        self.features.extend(features);
        self
    }

    #[must_use]
    pub fn parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    #[must_use]
    pub fn parameters(mut self, parameters: impl IntoIterator<Item = Parameter>) -> Self {
        self.parameters.extend(parameters);
        self
    }

    #[must_use]
    pub fn rule(mut self, name: &str, body: impl Into<serde_json::Value>) -> Self {
        self.rules.push((name.to_owned(), body.into()));
        self
    }

    #[must_use]
    pub fn group(mut self, name: &str, members: Vec<GroupMember>) -> Self {
        self.groups.push((name.to_owned(), members));
        self
    }

    /// Normalize rule bodies and expand groups and slices into synthetic
    /// rules and features.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError`] for duplicate rule names (including collisions
    /// with synthetic names) or malformed rule bodies.
    pub fn build(self) -> Result<Model, ModelError> {
        crate::normalize::normalize(self.features, self.parameters, self.rules, self.groups)
    }
}

/// The normalized input of a compile: features, parameters and one rule per
/// feature name, in declaration order.
#[derive(Debug, Clone)]
pub struct Model {
    pub(crate) features: Vec<Feature>,
    pub(crate) parameters: Vec<Parameter>,
    pub(crate) rules: IndexMap<String, Rule>,
    pub(crate) groups: IndexMap<String, Vec<GroupMember>>,
    pub(crate) slices: Vec<String>,
}

impl Model {
    /// Load and normalize the model files in `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError`](crate::load::LoadError) on I/O, JSON or
    /// normalization failure.
    pub fn from_dir(dir: impl AsRef<std::path::Path>) -> Result<Self, crate::load::LoadError> {
        crate::load::load_dir(dir)
    }

    /// Compile with the default options.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError`] if a reference is unknown, the rules form a
    /// cycle, or an expression cannot be transpiled.
    pub fn compile(&self) -> Result<CompiledRuleSet, CompileError> {
        crate::compile::compile(self, &CompileOptions::default())
    }

    /// Compile with explicit options.
    ///
    /// # Errors
    ///
    /// See [`compile()`](Self::compile).
    pub fn compile_with(&self, options: &CompileOptions) -> Result<CompiledRuleSet, CompileError> {
        crate::compile::compile(self, options)
    }

    #[must_use]
    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    #[must_use]
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// Rules in declaration order; slices come after the plain rules.
    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.rules.values()
    }

    #[must_use]
    pub fn rule(&self, name: &str) -> Option<&Rule> {
        self.rules.get(name)
    }

    #[must_use]
    pub fn feature(&self, name: &str) -> Option<&Feature> {
        self.features.iter().find(|f| f.name == name)
    }

    #[must_use]
    pub fn groups(&self) -> &IndexMap<String, Vec<GroupMember>> {
        &self.groups
    }

    #[must_use]
    pub fn slices(&self) -> &[String] {
        &self.slices
    }

    pub fn required_params(&self) -> impl Iterator<Item = &Parameter> {
        self.parameters.iter().filter(|p| p.required)
    }

    /// Parameters fetched by a remote resolver.
    pub fn remote_loaded(&self) -> impl Iterator<Item = &Parameter> {
        self.parameters.iter().filter(|p| p.resolver.is_some())
    }
}
