//! String interning for the bytecode atom pool.
//!
//! Identifiers and property names referenced by instruction operands are
//! stored once and addressed by index thereafter, keeping the emitted
//! bytecode compact and giving `Bytecode::atoms` a stable, serializable
//! table independent of the heap.

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

/// An interned string index. `Atom(0)` through `Atom(127)` are reserved so
/// common property names compile to the same index across every chunk that
/// mentions them, even before a program-specific `AtomTable` is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Atom(pub u32);

const WELL_KNOWN: &[&str] = &[
    "", "length", "name", "constructor", "prototype", "message", "stack",
    "value", "done", "next", "return", "throw", "Symbol.iterator",
    "Symbol.asyncIterator", "toString", "valueOf", "__proto__",
];

pub struct AtomTable {
    strings: Vec<String>,
    lookup: BTreeMap<String, Atom>,
}

impl AtomTable {
    pub fn new() -> Self {
        let mut t = AtomTable { strings: Vec::new(), lookup: BTreeMap::new() };
        for s in WELL_KNOWN {
            t.intern(s);
        }
        t
    }

    /// `intern(s) == intern(s')` iff `s == s'`.
    pub fn intern(&mut self, s: &str) -> Atom {
        if let Some(a) = self.lookup.get(s) {
            return *a;
        }
        let idx = self.strings.len() as u32;
        self.strings.push(String::from(s));
        let atom = Atom(idx);
        self.lookup.insert(String::from(s), atom);
        atom
    }

    pub fn get_string(&self, atom: Atom) -> &str {
        self.strings.get(atom.0 as usize).map(|s| s.as_str()).unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    /// Snapshot used by the bytecode serializer.
    pub fn as_slice(&self) -> &[String] {
        &self.strings
    }
}

impl Default for AtomTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_is_idempotent() {
        let mut t = AtomTable::new();
        let a = t.intern("foo");
        let b = t.intern("foo");
        let c = t.intern("bar");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(t.get_string(a), "foo");
    }

    #[test]
    fn well_known_atoms_preassigned() {
        let mut t = AtomTable::new();
        let len_atom = t.intern("length");
        assert_eq!(t.get_string(len_atom), "length");
        assert!(len_atom.0 < 128);
    }
}
