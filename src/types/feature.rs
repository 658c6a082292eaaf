use serde::{Deserialize, Deserializer, Serialize};

use super::value_type::ValueType;

/// A named, typed value produced by a rule.
///
/// Features with `result == false` live in the input context rather than in
/// the computed results; synthetic slice items are declared this way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub name: String,
    #[serde(rename = "type", default)]
    pub value_type: Option<ValueType>,
    #[serde(default = "default_true")]
    pub result: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
}

impl Feature {
    #[must_use]
    pub fn new(name: &str, value_type: ValueType) -> Self {
        Self {
            name: name.to_owned(),
            value_type: Some(value_type),
            result: true,
            default: None,
        }
    }

    /// Mark the feature as context-held (`result == false`).
    #[must_use]
    pub fn in_context(mut self) -> Self {
        self.result = false;
        self
    }

    #[must_use]
    pub fn with_default(mut self, value: impl Into<serde_json::Value>) -> Self {
        self.default = Some(value.into());
        self
    }
}

/// A named, typed input supplied by the caller of the generated rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "type")]
    pub value_type: ValueType,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolver: Option<String>,
}

impl Parameter {
    #[must_use]
    pub fn new(name: &str, value_type: ValueType) -> Self {
        Self {
            name: name.to_owned(),
            value_type,
            required: false,
            resolver: None,
        }
    }

    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Attach the name of the remote resolver that loads this parameter.
    #[must_use]
    pub fn resolved_by(mut self, resolver: &str) -> Self {
        self.resolver = Some(resolver.to_owned());
        self
    }
}

fn default_true() -> bool {
    true
}

/// Parameter files written by hand carry `"required": "True"` as often as a
/// real boolean.
fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
    }

    match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => Ok(b),
        Flag::Text(s) => match s.to_ascii_lowercase().as_str() {
            "true" => Ok(true),
            "false" | "" => Ok(false),
            other => Err(serde::de::Error::custom(format!(
                "expected a boolean, got '{other}'"
            ))),
        },
    }
}
