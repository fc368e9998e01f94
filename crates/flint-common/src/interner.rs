//! String interning.
//!
//! Property names, binding names and string literal values are interned once
//! per checking session and referenced by `Atom` afterwards, so comparing two
//! names is a `u32` comparison.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};

/// Interned string handle.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Atom(pub u32);

impl Atom {
    /// The empty string, always pre-interned at index 0.
    pub const EMPTY: Self = Self(0);
}

#[derive(Default)]
struct InternerInner {
    map: FxHashMap<Arc<str>, Atom>,
    strings: Vec<Arc<str>>,
}

/// Thread-safe string interner.
///
/// Reads take a shared lock; only the first occurrence of a string takes
/// the write lock.
pub struct Interner {
    inner: RwLock<InternerInner>,
}

impl Default for Interner {
    fn default() -> Self {
        Self::new()
    }
}

impl Interner {
    pub fn new() -> Self {
        let interner = Self {
            inner: RwLock::new(InternerInner::default()),
        };
        interner.intern("");
        interner
    }

    /// Intern `s`, returning the existing atom when it was seen before.
    pub fn intern(&self, s: &str) -> Atom {
        {
            let inner = self.inner.read().expect("interner lock poisoned");
            if let Some(&atom) = inner.map.get(s) {
                return atom;
            }
        }

        let mut inner = self.inner.write().expect("interner lock poisoned");
        if let Some(&atom) = inner.map.get(s) {
            return atom;
        }
        let atom = Atom(inner.strings.len() as u32);
        let text: Arc<str> = Arc::from(s);
        inner.strings.push(text.clone());
        inner.map.insert(text, atom);
        atom
    }

    /// Resolve an atom back to its text. Unknown atoms resolve to `""`.
    pub fn resolve(&self, atom: Atom) -> Arc<str> {
        let inner = self.inner.read().expect("interner lock poisoned");
        inner
            .strings
            .get(atom.0 as usize)
            .cloned()
            .unwrap_or_else(|| Arc::from(""))
    }

    /// Look up an atom without interning.
    pub fn get(&self, s: &str) -> Option<Atom> {
        let inner = self.inner.read().expect("interner lock poisoned");
        inner.map.get(s).copied()
    }

    pub fn len(&self) -> usize {
        self.inner.read().expect("interner lock poisoned").strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }
}

#[cfg(test)]
#[path = "../tests/interner_tests.rs"]
mod tests;
