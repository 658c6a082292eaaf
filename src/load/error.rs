use std::path::PathBuf;

use thiserror::Error;

use crate::ModelError;

/// Errors raised while reading a model directory.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read '{}'", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in '{}'", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("no rules.json in '{}'", dir.display())]
    MissingRules { dir: PathBuf },

    #[error(transparent)]
    Model(#[from] ModelError),
}
