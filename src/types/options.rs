/// Salience given to the deepest rule of a compiled set; shallower rules get
/// one point more per level.
pub const BASE_SALIENCE: i64 = 1000;

/// Settings for a compile.
///
/// ```
/// use featws::CompileOptions;
///
/// let options = CompileOptions::new().base_salience(50);
/// assert_eq!(options.salience_base(), 50);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    base_salience: i64,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            base_salience: BASE_SALIENCE,
        }
    }
}

impl CompileOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn base_salience(mut self, base: i64) -> Self {
        self.base_salience = base;
        self
    }

    #[must_use]
    pub fn salience_base(&self) -> i64 {
        self.base_salience
    }
}
