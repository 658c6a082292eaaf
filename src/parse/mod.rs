//! Sigil reference tokenizer shared by dependency scanning and transpiling.

mod grammar;
mod token;

pub use grammar::tokenize;
pub use token::{Piece, ReferenceKind, Token, TypeOverride};
