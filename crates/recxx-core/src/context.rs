//! The compilation context: arena, interner, scope table, and type
//! construction helpers.
//!
//! All scope/symbol state hangs off an explicit `CompileCtxt` passed by
//! reference through every call, so multiple independent compilations can
//! run in one process.

use parking_lot::RwLock;
use std::collections::HashMap;

use recxx_error::{Error, Result};

use crate::ast::AstNode;
use crate::declare_arena;
use crate::interner::{InternPool, InternedStr};
use crate::limits::MAX_SCOPE_NESTING;
use crate::loc::SourceLoc;
use crate::scope::{Scope, ScopeId};
use crate::symbol::{SymId, SymKind, Symbol, TemplateInfo};
use crate::ty::{BuiltinTy, CvQuals, TemplateArg, TplParamId, Ty, TyKind, ValueExpr};

declare_arena!([
    symbol: Symbol<'tcx>,
    scope: Scope<'tcx>,
    ty: Ty<'tcx>,
    ast: AstNode<'tcx>,
    template: TemplateInfo<'tcx>,
]);

/// Per-compilation state: one arena, one interner, one scope table.
#[derive(Debug, Default)]
pub struct CompileCtxt<'tcx> {
    pub arena: Arena<'tcx>,
    pub interner: InternPool,
    /// ScopeId -> &Scope, indexed by the id's integer value.
    scopes: RwLock<Vec<&'tcx Scope<'tcx>>>,
    /// SymId -> &Symbol, for id-based back-references (class destructors,
    /// specialization primaries).
    symbols: RwLock<HashMap<SymId, &'tcx Symbol<'tcx>>>,
    /// File table backing `SourceLoc::file` indices.
    files: RwLock<Vec<String>>,
}

impl<'tcx> CompileCtxt<'tcx> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a file path, returning its index for `SourceLoc`.
    pub fn add_file(&self, path: impl Into<String>) -> u32 {
        let mut files = self.files.write();
        files.push(path.into());
        (files.len() - 1) as u32
    }

    /// Render a location with its file path, for diagnostics.
    pub fn display_loc(&self, loc: SourceLoc) -> String {
        let files = self.files.read();
        match files.get(loc.file as usize) {
            Some(path) => format!("{}:{}:{}", path, loc.line, loc.col),
            None => loc.to_string(),
        }
    }

    /// Create the global root scope. Idempotent: returns the existing root
    /// if one was already created.
    pub fn create_globals(&'tcx self) -> ScopeId {
        {
            let scopes = self.scopes.read();
            if let Some(root) = scopes.first() {
                return root.id();
            }
        }
        let scope = self.arena.alloc(Scope::new(ScopeId(0), None, 0));
        self.scopes.write().push(scope);
        scope.id()
    }

    /// The global root scope. Panics if `create_globals` was never called.
    pub fn global_scope(&self) -> ScopeId {
        self.scopes
            .read()
            .first()
            .map(|s| s.id())
            .expect("global scope not created")
    }

    /// Look up a scope by id.
    pub fn scope(&self, id: ScopeId) -> &'tcx Scope<'tcx> {
        self.scopes.read()[id.0 as usize]
    }

    /// Open a new scope nested in `parent`.
    ///
    /// Fails with a fatal `NestingTooDeep` when the configured maximum
    /// nesting depth is exceeded.
    pub fn enter_scope(&'tcx self, parent: ScopeId) -> Result<ScopeId> {
        let depth = self.scope(parent).depth() + 1;
        if depth as usize >= MAX_SCOPE_NESTING {
            return Err(Error::nesting_too_deep(MAX_SCOPE_NESTING)
                .with_operation("context::enter_scope"));
        }

        let mut scopes = self.scopes.write();
        let id = ScopeId(scopes.len() as u32);
        let scope = self.arena.alloc(Scope::new(id, Some(parent), depth));
        scopes.push(scope);
        Ok(id)
    }

    /// Declare a fresh symbol in `scope`.
    ///
    /// Redeclaring a name prepends to the existing sequence; earlier
    /// entries remain reachable as the rest of the overload set.
    pub fn new_symbol(
        &'tcx self,
        scope: ScopeId,
        name: &str,
        kind: SymKind,
        loc: SourceLoc,
    ) -> &'tcx Symbol<'tcx> {
        let key = self.interner.intern(name);
        let symbol = self.arena.alloc(Symbol::new(key, scope, loc));
        symbol.set_kind(kind);
        self.scope(scope).insert(symbol);
        self.symbols.write().insert(symbol.id, symbol);
        symbol
    }

    /// Look up a symbol by id.
    pub fn symbol(&self, id: SymId) -> Option<&'tcx Symbol<'tcx>> {
        self.symbols.read().get(&id).copied()
    }

    /// Open the scope introduced by a symbol's body (class, namespace,
    /// template). The inner scope's parent is the symbol's declaring scope,
    /// not whatever scope happens to be lexically active, so member lookups
    /// continue upward from the right place.
    pub fn enter_symbol_scope(&'tcx self, symbol: &'tcx Symbol<'tcx>) -> Result<ScopeId> {
        if let Some(existing) = symbol.inner_scope() {
            return Ok(existing);
        }
        let inner = self.enter_scope(symbol.scope)?;
        symbol.set_inner_scope(inner);
        Ok(inner)
    }

    /// Walk `from`, then its parents, returning the first non-empty local
    /// result. Never merges entries across two scope levels: shadowing is
    /// total.
    pub fn lookup_chain(&self, from: ScopeId, name: InternedStr) -> Vec<&'tcx Symbol<'tcx>> {
        let mut current = Some(from);
        while let Some(id) = current {
            let scope = self.scope(id);
            let found = scope.lookup_local(name);
            if !found.is_empty() {
                return found;
            }
            current = scope.parent();
        }
        Vec::new()
    }

    /// Convenience wrapper interning the name first.
    pub fn lookup_chain_str(&self, from: ScopeId, name: &str) -> Vec<&'tcx Symbol<'tcx>> {
        self.lookup_chain(from, self.interner.intern(name))
    }

    // ------------------------------------------------------------------
    // Type construction helpers
    // ------------------------------------------------------------------

    pub fn mk_ty(&'tcx self, kind: TyKind<'tcx>, quals: CvQuals) -> &'tcx Ty<'tcx> {
        self.arena.alloc(Ty::new(kind, quals))
    }

    pub fn builtin(&'tcx self, builtin: BuiltinTy) -> &'tcx Ty<'tcx> {
        self.mk_ty(TyKind::Builtin(builtin), CvQuals::NONE)
    }

    pub fn named(&'tcx self, symbol: SymId) -> &'tcx Ty<'tcx> {
        self.mk_ty(TyKind::Named(symbol), CvQuals::NONE)
    }

    pub fn pointer_to(&'tcx self, inner: &'tcx Ty<'tcx>) -> &'tcx Ty<'tcx> {
        self.mk_ty(TyKind::Pointer(inner), CvQuals::NONE)
    }

    pub fn reference_to(&'tcx self, inner: &'tcx Ty<'tcx>) -> &'tcx Ty<'tcx> {
        self.mk_ty(TyKind::Reference(inner), CvQuals::NONE)
    }

    pub fn array_of(&'tcx self, elem: &'tcx Ty<'tcx>, len: Option<ValueExpr>) -> &'tcx Ty<'tcx> {
        self.mk_ty(TyKind::Array(elem, len), CvQuals::NONE)
    }

    pub fn function_of(
        &'tcx self,
        ret: &'tcx Ty<'tcx>,
        params: Vec<&'tcx Ty<'tcx>>,
    ) -> &'tcx Ty<'tcx> {
        self.mk_ty(TyKind::Function { ret, params }, CvQuals::NONE)
    }

    pub fn param(&'tcx self, id: TplParamId) -> &'tcx Ty<'tcx> {
        self.mk_ty(TyKind::Param(id), CvQuals::NONE)
    }

    pub fn spec(&'tcx self, primary: SymId, args: Vec<TemplateArg<'tcx>>) -> &'tcx Ty<'tcx> {
        self.mk_ty(TyKind::Spec { primary, args }, CvQuals::NONE)
    }

    pub fn synthetic(&'tcx self, ordinal: u32) -> &'tcx Ty<'tcx> {
        self.mk_ty(TyKind::Synthetic(ordinal), CvQuals::NONE)
    }

    pub fn error_ty(&'tcx self) -> &'tcx Ty<'tcx> {
        self.mk_ty(TyKind::Error, CvQuals::NONE)
    }

    /// A copy of `ty` with different outermost qualifiers.
    pub fn with_quals(&'tcx self, ty: &Ty<'tcx>, quals: CvQuals) -> &'tcx Ty<'tcx> {
        self.mk_ty(ty.kind.clone(), quals)
    }
}
