use std::cell::Cell;
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

use strum_macros::{Display, EnumIter, EnumString};

use crate::interner::InternedStr;
use crate::loc::SourceLoc;
use crate::scope::ScopeId;
use crate::ty::{TemplateArg, TplParamId, Ty};

static NEXT_SYMBOL_ID: AtomicU32 = AtomicU32::new(1);

/// Unique identity of one declared symbol. Stable for the whole compilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SymId(pub u32);

impl fmt::Display for SymId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What a declared name denotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumString, Display, Default)]
#[strum(serialize_all = "snake_case")]
pub enum SymKind {
    #[default]
    Undefined,
    Class,
    Enum,
    Enumerator,
    Typedef,
    Function,
    Variable,
    Namespace,
    Template,
}

impl SymKind {
    /// Kinds that introduce a scope a qualified name may step into.
    pub fn is_scope_name(&self) -> bool {
        matches!(self, SymKind::Class | SymKind::Namespace)
    }

    /// Kinds that denote a type in a simple-type-specifier position.
    pub fn is_type_name(&self) -> bool {
        matches!(self, SymKind::Class | SymKind::Enum | SymKind::Typedef)
    }
}

/// One template parameter of a template declaration.
#[derive(Debug, Clone, Copy)]
pub struct TplParam<'tcx> {
    pub id: TplParamId,
    pub name: InternedStr,
    pub kind: TplParamKind<'tcx>,
}

#[derive(Debug, Clone, Copy)]
pub enum TplParamKind<'tcx> {
    /// A type parameter.
    Type,
    /// A non-type parameter with its declared type.
    Value(&'tcx Ty<'tcx>),
}

/// Template metadata attached to a `SymKind::Template` symbol.
///
/// A primary template has `pattern: None`; a partial or full specialization
/// carries its specialized argument pattern and a link to the primary.
#[derive(Debug)]
pub struct TemplateInfo<'tcx> {
    pub params: Vec<TplParam<'tcx>>,
    pub pattern: Option<Vec<TemplateArg<'tcx>>>,
    pub primary: Option<SymId>,
}

impl<'tcx> TemplateInfo<'tcx> {
    pub fn primary_template(params: Vec<TplParam<'tcx>>) -> Self {
        Self {
            params,
            pattern: None,
            primary: None,
        }
    }

    pub fn specialization(
        params: Vec<TplParam<'tcx>>,
        pattern: Vec<TemplateArg<'tcx>>,
        primary: SymId,
    ) -> Self {
        Self {
            params,
            pattern: Some(pattern),
            primary: Some(primary),
        }
    }

    pub fn is_primary(&self) -> bool {
        self.pattern.is_none()
    }

    pub fn find_param(&self, id: TplParamId) -> Option<&TplParam<'tcx>> {
        self.params.iter().find(|p| p.id == id)
    }
}

/// One declared name's metadata.
///
/// Symbols are created once when a declaration is first processed and are
/// append-only: the deferred fields below are completed later (a class's
/// destructor once its body is parsed, a template's metadata once its
/// parameter list is known) but existing values are never replaced.
#[derive(Debug)]
pub struct Symbol<'tcx> {
    pub id: SymId,
    pub name: InternedStr,
    /// Scope this symbol was declared in. Non-owning index.
    pub scope: ScopeId,
    pub loc: SourceLoc,
    kind: Cell<SymKind>,
    ty: Cell<Option<&'tcx Ty<'tcx>>>,
    /// Scope introduced by this symbol's body, for class/namespace/template
    /// kinds. Its parent is always this symbol's declaring scope.
    inner_scope: Cell<Option<ScopeId>>,
    /// The class's registered destructor, if any.
    destructor: Cell<Option<SymId>>,
    template: Cell<Option<&'tcx TemplateInfo<'tcx>>>,
}

impl<'tcx> Symbol<'tcx> {
    pub fn new(name: InternedStr, scope: ScopeId, loc: SourceLoc) -> Self {
        let id = SymId(NEXT_SYMBOL_ID.fetch_add(1, Ordering::SeqCst));
        Self {
            id,
            name,
            scope,
            loc,
            kind: Cell::new(SymKind::Undefined),
            ty: Cell::new(None),
            inner_scope: Cell::new(None),
            destructor: Cell::new(None),
            template: Cell::new(None),
        }
    }

    #[inline]
    pub fn kind(&self) -> SymKind {
        self.kind.get()
    }

    #[inline]
    pub fn set_kind(&self, kind: SymKind) {
        self.kind.set(kind);
    }

    #[inline]
    pub fn ty(&self) -> Option<&'tcx Ty<'tcx>> {
        self.ty.get()
    }

    #[inline]
    pub fn set_ty(&self, ty: &'tcx Ty<'tcx>) {
        self.ty.set(Some(ty));
    }

    #[inline]
    pub fn inner_scope(&self) -> Option<ScopeId> {
        self.inner_scope.get()
    }

    pub(crate) fn set_inner_scope(&self, scope: ScopeId) {
        debug_assert!(self.inner_scope.get().is_none(), "inner scope already set");
        self.inner_scope.set(Some(scope));
    }

    #[inline]
    pub fn destructor(&self) -> Option<SymId> {
        self.destructor.get()
    }

    pub fn set_destructor(&self, destructor: SymId) {
        debug_assert!(self.destructor.get().is_none(), "destructor already set");
        self.destructor.set(Some(destructor));
    }

    #[inline]
    pub fn template(&self) -> Option<&'tcx TemplateInfo<'tcx>> {
        self.template.get()
    }

    pub fn set_template(&self, info: &'tcx TemplateInfo<'tcx>) {
        debug_assert!(self.template.get().is_none(), "template info already set");
        self.template.set(Some(info));
    }

    /// Compact one-line rendering for traces and debug output.
    pub fn format_compact(&self) -> String {
        let mut info = Vec::new();
        if let Some(inner) = self.inner_scope.get() {
            info.push(format!("s{}", inner));
        }
        if let Some(dtor) = self.destructor.get() {
            info.push(format!("~{}", dtor));
        }
        if self.template.get().is_some() {
            info.push("tpl".to_string());
        }

        let meta = if info.is_empty() {
            String::new()
        } else {
            format!(" ({})", info.join(" "))
        };

        format!("{}@{} {}{}", self.id, self.scope, self.kind.get(), meta)
    }
}
