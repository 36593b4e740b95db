//! One lexical scope's declaration set.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;

use crate::interner::InternedStr;
use crate::symbol::Symbol;

/// Non-owning index of a scope in the compilation context's scope table.
///
/// Scopes reference each other by id rather than by reference-counted
/// pointers; they are torn down only with the owning context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ScopeId(pub u32);

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single level in the scope hierarchy.
///
/// Bindings map interned names to ordered symbol sequences. Redeclaring a
/// name in the same scope prepends, so the most recent declaration is found
/// first; earlier entries stay reachable for overload sets.
pub struct Scope<'tcx> {
    id: ScopeId,
    parent: Option<ScopeId>,
    /// Nesting depth from the root (the root is 0).
    depth: u32,
    bindings: RwLock<HashMap<InternedStr, Vec<&'tcx Symbol<'tcx>>>>,
}

impl<'tcx> Scope<'tcx> {
    pub(crate) fn new(id: ScopeId, parent: Option<ScopeId>, depth: u32) -> Self {
        Self {
            id,
            parent,
            depth,
            bindings: RwLock::new(HashMap::new()),
        }
    }

    #[inline]
    pub fn id(&self) -> ScopeId {
        self.id
    }

    #[inline]
    pub fn parent(&self) -> Option<ScopeId> {
        self.parent
    }

    #[inline]
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Insert a symbol, prepending to any existing sequence for the name.
    pub fn insert(&self, symbol: &'tcx Symbol<'tcx>) {
        self.bindings
            .write()
            .entry(symbol.name)
            .or_default()
            .insert(0, symbol);
    }

    /// Exactly the entries declared directly in this scope, most recent
    /// first. Never consults the parent.
    pub fn lookup_local(&self, name: InternedStr) -> Vec<&'tcx Symbol<'tcx>> {
        self.bindings
            .read()
            .get(&name)
            .map(|symbols| symbols.to_vec())
            .unwrap_or_default()
    }

    pub fn has_local(&self, name: InternedStr) -> bool {
        self.bindings.read().contains_key(&name)
    }

    /// Invoke a closure for each symbol in this scope.
    pub fn for_each_symbol<F>(&self, mut visit: F)
    where
        F: FnMut(&'tcx Symbol<'tcx>),
    {
        let bindings = self.bindings.read();
        for symbols in bindings.values() {
            for symbol in symbols {
                visit(symbol);
            }
        }
    }

    /// Compact rendering: `{id}/{symbol_count}`.
    pub fn format_compact(&self) -> String {
        let total: usize = self.bindings.read().values().map(|v| v.len()).sum();
        format!("{}/{}", self.id, total)
    }
}

impl<'tcx> fmt::Debug for Scope<'tcx> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut entries = Vec::new();
        self.for_each_symbol(|symbol| entries.push(symbol.format_compact()));
        f.debug_struct("Scope")
            .field("id", &self.id)
            .field("parent", &self.parent)
            .field("depth", &self.depth)
            .field("symbols", &entries)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interner::InternPool;
    use crate::loc::SourceLoc;

    fn new_symbol<'tcx>(name: InternedStr) -> Symbol<'tcx> {
        Symbol::new(name, ScopeId(0), SourceLoc::default())
    }

    #[test]
    fn lookup_local_is_empty_for_unknown_names() {
        let pool = InternPool::default();
        let scope = Scope::new(ScopeId(0), None, 0);
        assert!(scope.lookup_local(pool.intern("missing")).is_empty());
    }

    #[test]
    fn redeclaration_prepends() {
        let pool = InternPool::default();
        let scope = Scope::new(ScopeId(0), None, 0);
        let name = pool.intern("f");

        let first = new_symbol(name);
        let second = new_symbol(name);
        scope.insert(&first);
        scope.insert(&second);

        let found = scope.lookup_local(name);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].id, second.id, "most recent declaration first");
        assert_eq!(found[1].id, first.id);
    }

    #[test]
    fn distinct_names_do_not_interfere() {
        let pool = InternPool::default();
        let scope = Scope::new(ScopeId(0), None, 0);
        let a = new_symbol(pool.intern("a"));
        let b = new_symbol(pool.intern("b"));
        scope.insert(&a);
        scope.insert(&b);

        assert_eq!(scope.lookup_local(pool.intern("a")).len(), 1);
        assert_eq!(scope.lookup_local(pool.intern("b")).len(), 1);
        assert!(scope.has_local(pool.intern("a")));
        assert!(!scope.has_local(pool.intern("c")));
    }

    #[test]
    fn format_compact_counts_symbols() {
        let pool = InternPool::default();
        let scope = Scope::new(ScopeId(7), None, 0);
        scope.insert(Box::leak(Box::new(new_symbol(pool.intern("x")))));
        assert_eq!(scope.format_compact(), "7/1");
    }
}
