//! Block scoping for locals and parameters (spec.md §4.3). Function
//! bodies, `if`/`otherwise` arms, and loop bodies each introduce a rib;
//! the nearest binding wins, so nested blocks may shadow an outer one.

use std::collections::HashMap;

use zincc_util::{Idx, IndexVec, Symbol};

use crate::NameKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RibId(pub u32);

impl Idx for RibId {
    fn from_usize(idx: usize) -> Self {
        RibId(idx as u32)
    }
    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy)]
pub enum RibKind {
    Function,
    Block,
    Loop,
}

#[derive(Debug)]
pub struct Rib {
    pub bindings: HashMap<Symbol, NameKind>,
    pub parent: Option<RibId>,
    pub kind: RibKind,
}

/// A stack of nested scopes, LIFO as blocks are entered and exited
/// (spec.md §3: "per-function local ... LIFO-stacked for block scopes
/// introduced by control constructs").
pub struct ScopeTree {
    ribs: IndexVec<RibId, Rib>,
    current: RibId,
}

impl ScopeTree {
    /// Starts a fresh tree rooted at a function-body rib.
    pub fn new() -> Self {
        let mut ribs = IndexVec::new();
        let root = ribs.push(Rib {
            bindings: HashMap::new(),
            parent: None,
            kind: RibKind::Function,
        });
        Self { ribs, current: root }
    }

    pub fn enter(&mut self, kind: RibKind) {
        let rib = self.ribs.push(Rib {
            bindings: HashMap::new(),
            parent: Some(self.current),
            kind,
        });
        self.current = rib;
    }

    pub fn exit(&mut self) {
        if let Some(parent) = self.ribs[self.current].parent {
            self.current = parent;
        }
    }

    pub fn bind(&mut self, name: Symbol, kind: NameKind) {
        self.ribs[self.current].bindings.insert(name, kind);
    }

    /// The nearest binding for `name`, walking outward from the current
    /// rib — shadowing within nested blocks is allowed (spec.md §4.3).
    pub fn resolve(&self, name: Symbol) -> Option<NameKind> {
        let mut rib = self.current;
        loop {
            if let Some(kind) = self.ribs[rib].bindings.get(&name) {
                return Some(*kind);
            }
            rib = self.ribs[rib].parent?;
        }
    }

    /// Whether any enclosing rib up to (and including) the nearest
    /// function boundary is a loop — used to validate `break`/`continue`.
    pub fn in_loop(&self) -> bool {
        let mut rib = self.current;
        loop {
            match self.ribs[rib].kind {
                RibKind::Loop => return true,
                RibKind::Function => return false,
                RibKind::Block => {}
            }
            match self.ribs[rib].parent {
                Some(parent) => rib = parent,
                None => return false,
            }
        }
    }
}

impl Default for ScopeTree {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_through_nested_blocks() {
        let mut tree = ScopeTree::new();
        tree.bind(Symbol::intern("x"), NameKind::Local);
        tree.enter(RibKind::Block);
        assert_eq!(tree.resolve(Symbol::intern("x")), Some(NameKind::Local));
    }

    #[test]
    fn shadowing_prefers_nearest_binding() {
        let mut tree = ScopeTree::new();
        tree.bind(Symbol::intern("x"), NameKind::Param);
        tree.enter(RibKind::Block);
        tree.bind(Symbol::intern("x"), NameKind::Local);
        assert_eq!(tree.resolve(Symbol::intern("x")), Some(NameKind::Local));
        tree.exit();
        assert_eq!(tree.resolve(Symbol::intern("x")), Some(NameKind::Param));
    }

    #[test]
    fn unknown_name_is_unresolved() {
        let tree = ScopeTree::new();
        assert_eq!(tree.resolve(Symbol::intern("ghost")), None);
    }

    #[test]
    fn in_loop_stops_at_function_boundary() {
        let mut tree = ScopeTree::new();
        assert!(!tree.in_loop());
        tree.enter(RibKind::Loop);
        assert!(tree.in_loop());
        tree.enter(RibKind::Block);
        assert!(tree.in_loop());
    }
}
