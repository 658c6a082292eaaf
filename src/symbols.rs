use std::collections::{HashMap, HashSet};

use crate::parse::ReferenceKind;
use crate::{Feature, Model, Parameter, Source, ValueType};

/// Where a reference reads from and what type it is known to have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolved {
    pub source: Source,
    pub value_type: Option<ValueType>,
}

/// Name lookup over a model: features, parameters and rule names.
///
/// Both dependency ordering and transpiling resolve names through this one
/// table. When a name is declared twice the first declaration wins.
#[derive(Debug)]
pub struct Symbols<'m> {
    features: HashMap<&'m str, &'m Feature>,
    parameters: HashMap<&'m str, &'m Parameter>,
    rules: HashSet<&'m str>,
}

impl<'m> Symbols<'m> {
    #[must_use]
    pub fn new(model: &'m Model) -> Self {
        let mut features = HashMap::new();
        for feature in &model.features {
            features.entry(feature.name.as_str()).or_insert(feature);
        }
        let mut parameters = HashMap::new();
        for parameter in &model.parameters {
            parameters.entry(parameter.name.as_str()).or_insert(parameter);
        }
        let rules = model.rules.keys().map(String::as_str).collect();
        Self {
            features,
            parameters,
            rules,
        }
    }

    #[must_use]
    pub fn feature(&self, name: &str) -> Option<&'m Feature> {
        self.features.get(name).copied()
    }

    #[must_use]
    pub fn parameter(&self, name: &str) -> Option<&'m Parameter> {
        self.parameters.get(name).copied()
    }

    #[must_use]
    pub fn is_rule(&self, name: &str) -> bool {
        self.rules.contains(name)
    }

    /// Whether `name` is a feature, a parameter or a rule.
    #[must_use]
    pub fn is_known(&self, name: &str) -> bool {
        self.features.contains_key(name) || self.parameters.contains_key(name) || self.is_rule(name)
    }

    /// Source and type of a `$`, `#` or `@` reference. Unknown names keep
    /// the sigil's default source and no type. Group checks have no single
    /// source and return `None`.
    #[must_use]
    pub fn resolve(&self, kind: ReferenceKind, name: &str) -> Option<Resolved> {
        match kind {
            ReferenceKind::Parameter => Some(Resolved {
                source: Source::Context,
                value_type: self.parameter(name).map(|p| p.value_type),
            }),
            ReferenceKind::Result | ReferenceKind::Alias => {
                let feature = self.feature(name);
                let source = match feature {
                    Some(f) if !f.result => Source::Context,
                    _ => Source::Result,
                };
                Some(Resolved {
                    source,
                    value_type: feature.and_then(|f| f.value_type),
                })
            }
            ReferenceKind::GroupMembership => None,
        }
    }
}
