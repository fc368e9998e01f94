//! Per-session cache of module results.
//!
//! Each module's entry is computed at most once: the first requester runs
//! the computation and publishes it, later requesters read the published
//! value. A request for a module whose computation is still running (an
//! import cycle) returns `None` so the caller can fall back to something
//! that does not need the module, such as its declared signature.

use dashmap::{DashMap, DashSet};
use flint_common::Atom;
use once_cell::sync::OnceCell;
use std::sync::Arc;
use tracing::{debug, trace};

pub struct ModuleCache<T> {
    cells: DashMap<Atom, Arc<OnceCell<Arc<T>>>>,
    in_progress: DashSet<Atom>,
}

impl<T> Default for ModuleCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ModuleCache<T> {
    pub fn new() -> Self {
        Self {
            cells: DashMap::new(),
            in_progress: DashSet::new(),
        }
    }

    /// The published value for `module`, computing it with `compute` on the
    /// first request. `None` while `module` is being computed.
    pub fn get_or_compute(&self, module: Atom, compute: impl FnOnce() -> T) -> Option<Arc<T>> {
        // Clone the cell out so no shard lock is held while computing.
        let cell = self.cells.entry(module).or_default().clone();
        if let Some(value) = cell.get() {
            trace!(module = module.0, "module cache hit");
            return Some(Arc::clone(value));
        }
        if !self.in_progress.insert(module) {
            debug!(module = module.0, "module cache: cycle");
            return None;
        }
        let value = Arc::clone(cell.get_or_init(|| Arc::new(compute())));
        self.in_progress.remove(&module);
        Some(value)
    }

    /// The published value, without computing.
    pub fn get(&self, module: Atom) -> Option<Arc<T>> {
        self.cells.get(&module).and_then(|cell| cell.get().cloned())
    }

    pub fn is_computing(&self, module: Atom) -> bool {
        self.in_progress.contains(&module)
    }

    /// Number of published entries.
    pub fn len(&self) -> usize {
        self.cells.iter().filter(|entry| entry.value().get().is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
#[path = "../tests/module_cache_tests.rs"]
mod tests;
