use indexmap::IndexMap;

/// Salience per rule: `base + max_level - level`, so level 0 fires first
/// and the deepest rules get exactly `base`. Scores saturate at `i64::MAX`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Saliences {
    base: i64,
    max_level: usize,
    scores: IndexMap<String, i64>,
}

impl Saliences {
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub fn assign(levels: &IndexMap<String, usize>, base: i64) -> Self {
        let max_level = levels.values().copied().max().unwrap_or(0);
        let scores = levels
            .iter()
            .map(|(name, &level)| {
                let score = base.saturating_add((max_level - level) as i64);
                (name.clone(), score)
            })
            .collect();
        Self {
            base,
            max_level,
            scores,
        }
    }

    /// Salience of `name`, or the base for rules that were never leveled.
    #[must_use]
    pub fn get(&self, name: &str) -> i64 {
        self.scores.get(name).copied().unwrap_or(self.base)
    }

    #[must_use]
    pub fn max_level(&self) -> usize {
        self.max_level
    }

    /// The highest salience handed out.
    #[must_use]
    pub fn top(&self) -> i64 {
        self.scores.values().copied().max().unwrap_or(self.base)
    }
}
