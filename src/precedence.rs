use indexmap::IndexMap;

use crate::parse::{tokenize, Piece};
use crate::Rule;

/// Names a piece of rule text depends on, in order of appearance.
///
/// `#name` and `@name` depend on `name`; `%name` depends on the group
/// member's `name_value` rule. Parameters (`$name`) are inputs and never
/// appear. Duplicates are kept.
#[must_use]
pub fn scan_references(text: &str) -> Vec<String> {
    tokenize(text)
        .into_iter()
        .filter_map(|piece| match piece {
            Piece::Ref(token) => token.dependency(),
            Piece::Text(_) => None,
        })
        .collect()
}

/// Map every rule to the references found in its body and condition.
/// An empty list means the rule depends on nothing.
pub(crate) fn build_precedence<'r>(
    rules: impl IntoIterator<Item = &'r Rule>,
) -> IndexMap<String, Vec<String>> {
    rules
        .into_iter()
        .map(|rule| (rule.name.clone(), scan_references(&rule.reference_text())))
        .collect()
}
