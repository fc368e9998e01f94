//! Recursion guard for cycle detection, depth limiting and iteration
//! bounding in recursive type computations.
//!
//! Every traversal of the type graph (subtyping, evaluation, instantiation,
//! printing) goes through a [`RecursionGuard`]. It combines:
//! 1. **Cycle detection** via a visiting set
//! 2. **Depth limiting** to prevent stack overflow
//! 3. **Iteration bounding** to prevent runaway expansion
//!
//! What a revisit *means* is up to the caller: subtyping treats a revisited
//! pair as holding (co-inductive), evaluation returns the unevaluated node,
//! printing elides the cycle.

use rustc_hash::FxHashSet;
use std::hash::Hash;

/// Named limit presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecursionProfile {
    /// Structural subtype checking.
    SubtypeCheck,

    /// Alias expansion, mapped/conditional/spread evaluation.
    TypeEvaluation,

    /// Substituting type arguments into a body.
    Instantiation,

    /// Pretty-printing.
    Printing,

    /// Shallow walks such as `contains_type_parameters`.
    ShallowTraversal,

    Custom { max_depth: u32, max_iterations: u32 },
}

impl RecursionProfile {
    pub const fn max_depth(self) -> u32 {
        match self {
            Self::SubtypeCheck => flint_common::limits::MAX_SUBTYPE_DEPTH,
            Self::TypeEvaluation => flint_common::limits::MAX_EVALUATE_DEPTH,
            Self::Instantiation => flint_common::limits::MAX_INSTANTIATION_DEPTH,
            Self::Printing => flint_common::limits::MAX_PRINT_DEPTH,
            Self::ShallowTraversal => 64,
            Self::Custom { max_depth, .. } => max_depth,
        }
    }

    pub const fn max_iterations(self) -> u32 {
        match self {
            Self::SubtypeCheck => 100_000,
            Self::TypeEvaluation => 100_000,
            Self::Instantiation => 100_000,
            Self::Printing => 10_000,
            Self::ShallowTraversal => 10_000,
            Self::Custom { max_iterations, .. } => max_iterations,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecursionResult {
    Entered,
    Cycle,
    DepthExceeded,
    IterationExceeded,
}

impl RecursionResult {
    #[inline]
    pub fn is_entered(self) -> bool {
        matches!(self, Self::Entered)
    }

    #[inline]
    pub fn is_cycle(self) -> bool {
        matches!(self, Self::Cycle)
    }

    #[inline]
    pub fn is_exceeded(self) -> bool {
        matches!(self, Self::DepthExceeded | Self::IterationExceeded)
    }
}

pub struct RecursionGuard<K: Hash + Eq + Copy> {
    visiting: FxHashSet<K>,
    depth: u32,
    iterations: u32,
    max_depth: u32,
    max_iterations: u32,
    exceeded: bool,
}

impl<K: Hash + Eq + Copy> RecursionGuard<K> {
    pub fn new(max_depth: u32, max_iterations: u32) -> Self {
        Self {
            visiting: FxHashSet::default(),
            depth: 0,
            iterations: 0,
            max_depth,
            max_iterations,
            exceeded: false,
        }
    }

    pub fn with_profile(profile: RecursionProfile) -> Self {
        Self::new(profile.max_depth(), profile.max_iterations())
    }

    #[must_use]
    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn enter(&mut self, key: K) -> RecursionResult {
        self.iterations = self.iterations.saturating_add(1);

        if self.iterations > self.max_iterations {
            self.exceeded = true;
            return RecursionResult::IterationExceeded;
        }
        if self.depth >= self.max_depth {
            self.exceeded = true;
            return RecursionResult::DepthExceeded;
        }
        if self.visiting.contains(&key) {
            return RecursionResult::Cycle;
        }

        self.visiting.insert(key);
        self.depth += 1;
        RecursionResult::Entered
    }

    pub fn leave(&mut self, key: K) {
        let was_present = self.visiting.remove(&key);
        debug_assert!(
            was_present,
            "RecursionGuard::leave() called with a key that is not in the visiting set"
        );
        self.depth = self.depth.saturating_sub(1);
    }

    /// Run `f` with `key` entered, leaving afterwards.
    pub fn scope<T>(&mut self, key: K, f: impl FnOnce() -> T) -> Result<T, RecursionResult> {
        match self.enter(key) {
            RecursionResult::Entered => {
                let result = f();
                self.leave(key);
                Ok(result)
            }
            denied => Err(denied),
        }
    }

    #[inline]
    pub fn is_visiting(&self, key: &K) -> bool {
        self.visiting.contains(key)
    }

    #[inline]
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Whether any limit was hit since construction or the last `reset`.
    #[inline]
    pub fn is_exceeded(&self) -> bool {
        self.exceeded
    }

    pub fn reset(&mut self) {
        self.visiting.clear();
        self.depth = 0;
        self.iterations = 0;
        self.exceeded = false;
    }
}

#[cfg(debug_assertions)]
impl<K: Hash + Eq + Copy> Drop for RecursionGuard<K> {
    fn drop(&mut self) {
        if !std::thread::panicking() {
            debug_assert!(
                self.visiting.is_empty(),
                "RecursionGuard dropped with {} active entries",
                self.visiting.len()
            );
        }
    }
}

#[cfg(test)]
#[path = "../tests/recursion_tests.rs"]
mod tests;
