mod compiled;
mod error;
mod feature;
mod model;
mod options;
mod rule;
mod value_type;

pub use compiled::CompiledRuleSet;
pub use error::{CompileError, ModelError};
pub use feature::{Feature, Parameter};
pub use model::{GroupMember, Model, ModelBuilder};
pub use options::{CompileOptions, BASE_SALIENCE};
pub(crate) use rule::value_text;
pub use rule::{CompiledRule, DefaultValue, Rule};
pub use value_type::{Accessor, Source, ValueType};
