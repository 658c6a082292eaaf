use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CompileError {
    #[error("unresolvable reference '{reference}' in rule '{rule}'")]
    UnresolvableReference { rule: String, reference: String },

    #[error("cyclic reference detected: {}", path.join(" -> "))]
    CyclicReference { path: Vec<String> },

    #[error("unimplemented reference scope '{scope}'")]
    UnimplementedScope { scope: char },

    #[error("no accessor for type '{type_name}' in token '{token}' of rule '{rule}'")]
    UnresolvedAccessor {
        rule: String,
        token: String,
        type_name: String,
    },
}

/// Errors raised while normalizing rule bodies, groups and slices into a
/// [`Model`](super::Model).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("duplicate rule name '{name}'")]
    DuplicateRule { name: String },

    #[error("invalid rule '{name}': {reason}")]
    InvalidRule { name: String, reason: String },
}
