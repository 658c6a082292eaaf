use std::fmt;

use serde::{Deserialize, Serialize};

/// Declared type of a feature, parameter or rule output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Boolean,
    Integer,
    Decimal,
    String,
    Object,
    Slice,
}

impl ValueType {
    /// Parse a type name as written in a `::TYPE` cast or a model file.
    /// Returns `None` for names that are not one of the six known types.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "boolean" => Some(ValueType::Boolean),
            "integer" => Some(ValueType::Integer),
            "decimal" => Some(ValueType::Decimal),
            "string" => Some(ValueType::String),
            "object" => Some(ValueType::Object),
            "slice" => Some(ValueType::Slice),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ValueType::Boolean => "boolean",
            ValueType::Integer => "integer",
            ValueType::Decimal => "decimal",
            ValueType::String => "string",
            ValueType::Object => "object",
            ValueType::Slice => "slice",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed getter on the target engine's data holders (`ctx` / `result`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Accessor {
    Get,
    GetMap,
    GetString,
    GetBool,
    GetInt,
    GetFloat,
    GetSlice,
}

impl Accessor {
    /// Select the getter for a value type. Unknown or missing types fall back
    /// to the untyped [`Accessor::Get`].
    #[must_use]
    pub fn for_type(value_type: Option<ValueType>) -> Self {
        match value_type {
            Some(ValueType::Object) => Accessor::GetMap,
            Some(ValueType::String) => Accessor::GetString,
            Some(ValueType::Boolean) => Accessor::GetBool,
            Some(ValueType::Integer) => Accessor::GetInt,
            Some(ValueType::Decimal) => Accessor::GetFloat,
            Some(ValueType::Slice) => Accessor::GetSlice,
            None => Accessor::Get,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Accessor::Get => "Get",
            Accessor::GetMap => "GetMap",
            Accessor::GetString => "GetString",
            Accessor::GetBool => "GetBool",
            Accessor::GetInt => "GetInt",
            Accessor::GetFloat => "GetFloat",
            Accessor::GetSlice => "GetSlice",
        }
    }
}

impl fmt::Display for Accessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a referenced value lives at evaluation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// Caller-supplied input (`ctx`).
    Context,
    /// Values computed by other rules (`result`).
    Result,
}

impl Source {
    #[must_use]
    pub fn prefix(self) -> &'static str {
        match self {
            Source::Context => "ctx",
            Source::Result => "result",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}
