use thiserror::Error;

use crate::load::LoadError;
use crate::{CompileError, ModelError};

/// Unified error type covering loading, normalization, compilation and I/O.
///
/// Returned by [`transpile_dir()`](crate::transpile_dir).
#[derive(Debug, Error)]
pub enum FeatwsError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
