use std::collections::HashMap;

use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::symbols::Symbols;
use crate::CompileError;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Dependency {
    /// Referenced rule already has this level.
    Level(usize),
    /// A parameter or input-only feature: known, but no rule computes it.
    Input,
    /// Referenced rule not leveled yet.
    Pending(String),
}

/// Fixed-point solver turning per-rule reference lists into dependency
/// levels. Owns its working state; one instance serves one compile.
pub(crate) struct LevelSolver<'s, 'm> {
    symbols: &'s Symbols<'m>,
    pending: IndexMap<String, Vec<Dependency>>,
    levels: IndexMap<String, usize>,
}

impl<'s, 'm> LevelSolver<'s, 'm> {
    pub(crate) fn new(symbols: &'s Symbols<'m>, precedence: IndexMap<String, Vec<String>>) -> Self {
        let pending = precedence
            .into_iter()
            .map(|(name, refs)| (name, refs.into_iter().map(Dependency::Pending).collect()))
            .collect();
        Self {
            symbols,
            pending,
            levels: IndexMap::new(),
        }
    }

    /// Level every rule: 0 when it depends on no rule, otherwise one more
    /// than its deepest dependency.
    ///
    /// Each pass visits the remaining rules in declaration order. A pass
    /// that levels nothing means the rest wait on each other.
    pub(crate) fn solve(mut self) -> Result<IndexMap<String, usize>, CompileError> {
        let mut pass = 0_usize;
        while !self.pending.is_empty() {
            pass += 1;
            let names: Vec<String> = self.pending.keys().cloned().collect();
            let mut leveled = 0_usize;
            for name in &names {
                if self.try_level(name)? {
                    leveled += 1;
                }
            }
            debug!(pass, leveled, remaining = self.pending.len(), "level solver pass");

            if leveled == 0 {
                return Err(CompileError::CyclicReference {
                    path: self.find_cycle(),
                });
            }
        }
        Ok(self.levels)
    }

    fn try_level(&mut self, name: &str) -> Result<bool, CompileError> {
        let Some(deps) = self.pending.get_mut(name) else {
            return Ok(false);
        };

        let mut deepest: Option<usize> = None;
        let mut ready = true;
        for dep in deps.iter_mut() {
            if let Dependency::Pending(reference) = dep {
                if !self.symbols.is_known(reference) {
                    return Err(CompileError::UnresolvableReference {
                        rule: name.to_owned(),
                        reference: reference.clone(),
                    });
                }
                if let Some(&level) = self.levels.get(reference.as_str()) {
                    *dep = Dependency::Level(level);
                } else if !self.symbols.is_rule(reference) {
                    *dep = Dependency::Input;
                }
            }
            match dep {
                Dependency::Level(level) => {
                    deepest = Some(deepest.map_or(*level, |d| d.max(*level)));
                }
                Dependency::Input => {}
                Dependency::Pending(_) => ready = false,
            }
        }
        if !ready {
            return Ok(false);
        }

        let level = deepest.map_or(0, |d| d + 1);
        self.pending.shift_remove(name);
        self.levels.insert(name.to_owned(), level);
        trace!(rule = name, level, "leveled");
        Ok(true)
    }

    /// One cycle among the rules still pending, as `[a, b, .., a]`.
    fn find_cycle(&self) -> Vec<String> {
        let adj: HashMap<&str, Vec<&str>> = self
            .pending
            .iter()
            .map(|(name, deps)| {
                let next = deps
                    .iter()
                    .filter_map(|dep| match dep {
                        Dependency::Pending(r) if self.pending.contains_key(r.as_str()) => {
                            Some(r.as_str())
                        }
                        _ => None,
                    })
                    .collect();
                (name.as_str(), next)
            })
            .collect();

        let mut state: HashMap<&str, DfsState> = self
            .pending
            .keys()
            .map(|name| (name.as_str(), DfsState::Unvisited))
            .collect();

        for name in self.pending.keys() {
            let name = name.as_str();
            if state.get(name) == Some(&DfsState::Unvisited) {
                if let Some(cycle) = dfs(name, &adj, &mut state) {
                    return cycle;
                }
            }
        }

        // Every pending rule waits on another pending rule, so a cycle exists.
        self.pending.keys().cloned().collect()
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum DfsState {
    Unvisited,
    InStack,
    Done,
}

/// Depth-first search from `start` on an explicit stack of
/// `(node, next neighbor index)` frames.
fn dfs<'a>(
    start: &'a str,
    adj: &HashMap<&'a str, Vec<&'a str>>,
    state: &mut HashMap<&'a str, DfsState>,
) -> Option<Vec<String>> {
    let mut stack: Vec<(&'a str, usize)> = vec![(start, 0)];
    state.insert(start, DfsState::InStack);

    while let Some(frame) = stack.last_mut() {
        let (node, next) = *frame;
        let Some(&neighbor) = adj.get(node).and_then(|n| n.get(next)) else {
            stack.pop();
            state.insert(node, DfsState::Done);
            continue;
        };
        frame.1 += 1;

        match state.get(neighbor) {
            Some(DfsState::InStack) => {
                let pos = stack.iter().position(|&(n, _)| n == neighbor).unwrap_or(0);
                let mut cycle: Vec<String> =
                    stack[pos..].iter().map(|&(n, _)| n.to_owned()).collect();
                cycle.push(neighbor.to_owned());
                return Some(cycle);
            }
            Some(DfsState::Unvisited) | None => {
                state.insert(neighbor, DfsState::InStack);
                stack.push((neighbor, 0));
            }
            Some(DfsState::Done) => {}
        }
    }
    None
}
