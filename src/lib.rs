mod compile;
mod error;
pub mod load;
mod normalize;
pub mod parse;
mod precedence;
mod render;
mod salience;
mod solve;
mod symbols;
mod transpile;
mod types;

pub use compile::transpile_dir;
pub use error::FeatwsError;
pub use precedence::scan_references;
pub use render::render_grl;
pub use salience::Saliences;
pub use symbols::{Resolved, Symbols};
pub use transpile::Transpiler;
pub use types::{
    Accessor, CompileError, CompileOptions, CompiledRule, CompiledRuleSet, DefaultValue, Feature,
    GroupMember, Model, ModelBuilder, ModelError, Parameter, Rule, Source, ValueType,
    BASE_SALIENCE,
};
