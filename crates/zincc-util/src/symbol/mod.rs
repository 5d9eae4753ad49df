//! String interning: a compact, cheaply-comparable handle for identifier and
//! keyword text.
//!
//! The compiler is specified as a single-threaded pipeline (one file in,
//! one binary out), so the interner here is a plain `RefCell`-backed table
//! rather than the lock-free concurrent map a multi-threaded front-end would
//! need. The [`Symbol`] handle is still just a `u32` index, so equality and
//! hashing stay O(1) regardless.

use std::cell::RefCell;

use rustc_hash::FxHashMap;

/// An interned string: a 4-byte handle into the thread-local string table.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol(u32);

impl Symbol {
    /// Interns `text`, returning the existing handle if it was seen before.
    pub fn intern(text: &str) -> Symbol {
        INTERNER.with(|i| i.borrow_mut().intern(text))
    }

    /// Looks up the original string for this handle.
    ///
    /// The returned value is copied out of the thread-local table, since
    /// the table may grow (and reallocate) between calls.
    pub fn as_str(&self) -> String {
        INTERNER.with(|i| i.borrow().resolve(*self).to_owned())
    }

    #[inline]
    pub fn index(&self) -> u32 {
        self.0
    }
}

impl std::fmt::Debug for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Symbol({:?})", self.as_str())
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Default)]
struct Interner {
    strings: Vec<Box<str>>,
    lookup: FxHashMap<Box<str>, u32>,
}

impl Interner {
    fn intern(&mut self, text: &str) -> Symbol {
        if let Some(&index) = self.lookup.get(text) {
            return Symbol(index);
        }
        let index = self.strings.len() as u32;
        let boxed: Box<str> = text.into();
        self.strings.push(boxed.clone());
        self.lookup.insert(boxed, index);
        Symbol(index)
    }

    fn resolve(&self, symbol: Symbol) -> &str {
        &self.strings[symbol.0 as usize]
    }
}

thread_local! {
    static INTERNER: RefCell<Interner> = RefCell::new(Interner::default());
}
