use std::fmt;

use crate::{CompileError, ValueType};

/// The kind of a sigil reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    /// `$name`: a caller-supplied parameter.
    Parameter,
    /// `#name`: another rule's computed value.
    Result,
    /// `@name`: same meaning as `#name`.
    Alias,
    /// `%name`: membership of a group's current value in its entries.
    GroupMembership,
}

pub(crate) const SIGILS: [char; 4] = ['$', '#', '@', '%'];

impl ReferenceKind {
    /// Classify a sigil character.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::UnimplementedScope`] for any other character.
    pub fn from_sigil(sigil: char) -> Result<Self, CompileError> {
        match sigil {
            '$' => Ok(ReferenceKind::Parameter),
            '#' => Ok(ReferenceKind::Result),
            '@' => Ok(ReferenceKind::Alias),
            '%' => Ok(ReferenceKind::GroupMembership),
            scope => Err(CompileError::UnimplementedScope { scope }),
        }
    }

    #[must_use]
    pub fn sigil(self) -> char {
        match self {
            ReferenceKind::Parameter => '$',
            ReferenceKind::Result => '#',
            ReferenceKind::Alias => '@',
            ReferenceKind::GroupMembership => '%',
        }
    }
}

/// An explicit `::TYPE` cast, kept as written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeOverride<'a>(pub &'a str);

impl TypeOverride<'_> {
    #[must_use]
    pub fn value_type(self) -> Option<ValueType> {
        ValueType::parse(self.0)
    }
}

/// `SIGIL NAME (.NAME)* (::TYPE)?`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: ReferenceKind,
    pub name: &'a str,
    pub path: Vec<&'a str>,
    pub type_override: Option<TypeOverride<'a>>,
}

impl Token<'_> {
    /// The rule or parameter this token makes its rule wait for, if any.
    /// Group checks wait on the group member's synthetic `_value` rule.
    #[must_use]
    pub fn dependency(&self) -> Option<String> {
        match self.kind {
            ReferenceKind::Parameter => None,
            ReferenceKind::Result | ReferenceKind::Alias => Some(self.name.to_owned()),
            ReferenceKind::GroupMembership => Some(format!("{}_value", self.name)),
        }
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.kind.sigil(), self.name)?;
        for segment in &self.path {
            write!(f, ".{segment}")?;
        }
        if let Some(TypeOverride(cast)) = self.type_override {
            write!(f, "::{cast}")?;
        }
        Ok(())
    }
}

/// A run of expression text: either copied verbatim or a sigil reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Piece<'a> {
    Text(&'a str),
    Ref(Token<'a>),
}
