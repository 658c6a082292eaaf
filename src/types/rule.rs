use std::borrow::Cow;

use serde::Serialize;

use super::value_type::{Accessor, ValueType};

/// A normalized rule before compilation: one per feature name, including the
/// synthetic rules produced by group and slice expansion.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub name: String,
    /// The rule body. Strings are expressions; any other JSON value is
    /// serialized to text before scanning and transpiling.
    pub expression: serde_json::Value,
    pub condition: Option<String>,
    /// Explicit output type; when `None` the feature's declared type applies.
    pub output_type: Option<ValueType>,
    pub result: bool,
}

impl Rule {
    #[must_use]
    pub fn new(name: &str, expression: impl Into<serde_json::Value>) -> Self {
        Self {
            name: name.to_owned(),
            expression: expression.into(),
            condition: None,
            output_type: None,
            result: true,
        }
    }

    #[must_use]
    pub fn when(mut self, condition: &str) -> Self {
        self.condition = Some(condition.to_owned());
        self
    }

    #[must_use]
    pub fn typed(mut self, output_type: ValueType) -> Self {
        self.output_type = Some(output_type);
        self
    }

    /// Write the computed value to the context instead of the results.
    #[must_use]
    pub fn in_context(mut self) -> Self {
        self.result = false;
        self
    }

    /// The body as expression text.
    #[must_use]
    pub fn expression_text(&self) -> Cow<'_, str> {
        value_text(&self.expression)
    }

    /// Body and condition joined, as searched for cross-references.
    #[must_use]
    pub fn reference_text(&self) -> String {
        let body = self.expression_text();
        match &self.condition {
            Some(condition) => format!("{body} {condition}"),
            None => body.into_owned(),
        }
    }
}

/// Text form of a JSON value: strings verbatim, everything else as compact JSON.
pub(crate) fn value_text(value: &serde_json::Value) -> Cow<'_, str> {
    match value {
        serde_json::Value::String(s) => Cow::Borrowed(s.as_str()),
        other => Cow::Owned(other.to_string()),
    }
}

/// A rule ready for rendering: expressions transpiled, salience assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompiledRule {
    pub name: String,
    pub output_type: Option<ValueType>,
    pub accessor: Accessor,
    pub condition: String,
    /// Salience score; higher runs first.
    pub precedence: i64,
    pub expression: String,
    pub result: bool,
}

/// Transpiled default for a feature that declares one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DefaultValue {
    pub name: String,
    pub default_value: String,
    /// Same target as the feature's rule: `result` when true, else `ctx`.
    pub result: bool,
}
