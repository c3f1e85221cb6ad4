//! String interning for identifier deduplication.
//!
//! Names (functions, variables, classes, type parameters) are compared on
//! every candidate lookup, so they are stored once and handed out as `Atom`
//! handles. Equality of two names is then a `u32` comparison.
//!
//! The interner is shared between independent compilation units, so it uses
//! a `DashMap` for the forward lookup and a `RwLock`ed vector for the reverse
//! lookup.

use dashmap::DashMap;
use rustc_hash::FxBuildHasher;
use std::sync::{Arc, PoisonError, RwLock};

/// Interned string handle.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Atom(pub u32);

impl Atom {
    /// Sentinel for "no name" (anonymous declarations, placeholders).
    pub const NONE: Self = Self(u32::MAX);

    pub const fn is_none(self) -> bool {
        self.0 == u32::MAX
    }
}

/// Thread-safe string interner.
pub struct Interner {
    map: DashMap<Arc<str>, Atom, FxBuildHasher>,
    strings: RwLock<Vec<Arc<str>>>,
}

impl Interner {
    pub fn new() -> Self {
        Interner {
            map: DashMap::with_hasher(FxBuildHasher),
            strings: RwLock::new(Vec::new()),
        }
    }

    /// Intern a string, returning the existing atom if it was seen before.
    pub fn intern(&self, text: &str) -> Atom {
        if let Some(atom) = self.map.get(text) {
            return *atom;
        }

        let mut strings = self.strings.write().unwrap_or_else(PoisonError::into_inner);
        // Another thread may have interned it while we waited for the lock.
        if let Some(atom) = self.map.get(text) {
            return *atom;
        }

        let shared: Arc<str> = Arc::from(text);
        let atom = Atom(strings.len() as u32);
        strings.push(shared.clone());
        self.map.insert(shared, atom);
        atom
    }

    /// Look up an atom without interning.
    pub fn get(&self, text: &str) -> Option<Atom> {
        self.map.get(text).map(|atom| *atom)
    }

    /// Resolve an atom back to its text. Unknown atoms resolve to `""`.
    pub fn resolve(&self, atom: Atom) -> Arc<str> {
        if atom.is_none() {
            return Arc::from("");
        }
        let strings = self.strings.read().unwrap_or_else(PoisonError::into_inner);
        strings
            .get(atom.0 as usize)
            .cloned()
            .unwrap_or_else(|| Arc::from(""))
    }

    pub fn len(&self) -> usize {
        self.strings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for Interner {
    fn default() -> Self {
        Self::new()
    }
}
