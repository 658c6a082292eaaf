//! Reads a model directory: `rules.json`, `parameters.json`,
//! `features.json` and optional `groups/<name>.json` files.

mod error;

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::{Feature, GroupMember, Model, ModelBuilder, Parameter};

pub use error::LoadError;

pub const RULES_FILE: &str = "rules.json";
pub const PARAMETERS_FILE: &str = "parameters.json";
pub const FEATURES_FILE: &str = "features.json";
pub const GROUPS_DIR: &str = "groups";

/// Load and normalize the model stored in `dir`.
///
/// Only the JSON rule form is read; a `rules.featws` file is ignored.
///
/// # Errors
///
/// Returns [`LoadError::MissingRules`] when `rules.json` is absent, and
/// [`LoadError::Io`] / [`LoadError::Json`] for unreadable or malformed files.
pub fn load_dir(dir: impl AsRef<Path>) -> Result<Model, LoadError> {
    let dir = dir.as_ref();

    let rules_path = dir.join(RULES_FILE);
    if !rules_path.is_file() {
        return Err(LoadError::MissingRules {
            dir: dir.to_path_buf(),
        });
    }
    let rules: IndexMap<String, serde_json::Value> = read_json(&rules_path)?;
    let parameters: Vec<Parameter> = read_json(&dir.join(PARAMETERS_FILE))?;
    let features: Vec<Feature> = read_json(&dir.join(FEATURES_FILE))?;

    let mut builder = ModelBuilder::new()
        .parameters(parameters)
        .features(features);
    for (name, body) in rules {
        builder = builder.rule(&name, body);
    }
    for (name, members) in read_groups(&dir.join(GROUPS_DIR))? {
        builder = builder.group(&name, members);
    }

    Ok(builder.build()?)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, LoadError> {
    let text = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let value = serde_json::from_str(&text).map_err(|source| LoadError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), "read model file");
    Ok(value)
}

/// Each `<group>.json` maps a value template to the entries it must match.
/// Files are read in file-name order.
fn read_groups(groups_dir: &Path) -> Result<Vec<(String, Vec<GroupMember>)>, LoadError> {
    if !groups_dir.is_dir() {
        return Ok(Vec::new());
    }
    let io_error = |source: std::io::Error| LoadError::Io {
        path: groups_dir.to_path_buf(),
        source,
    };

    let mut paths: Vec<PathBuf> = Vec::new();
    for entry in fs::read_dir(groups_dir).map_err(io_error)? {
        let path = entry.map_err(io_error)?.path();
        if path.extension().is_some_and(|ext| ext == "json") {
            paths.push(path);
        }
    }
    paths.sort();

    let mut groups = Vec::with_capacity(paths.len());
    for path in paths {
        let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        let members: IndexMap<String, serde_json::Value> = read_json(&path)?;
        let members = members
            .into_iter()
            .map(|(template, entries)| GroupMember::new(&template, entries))
            .collect();
        groups.push((name.to_owned(), members));
    }
    Ok(groups)
}
