//! Id-expression resolution against the scope chain.

use recxx_core::{AstKind, AstNode, CompileCtxt, InternedStr, ScopeId, SymKind, Symbol};
use recxx_error::{Error, Result};

/// Pick the type-denoting entry out of a lookup result, if nothing hides it.
///
/// A simple-type-specifier position only accepts class/enum/typedef names.
/// Any non-type entry in the sequence hides the type name entirely, so the
/// result is the type entry only when every entry denotes a type.
pub fn filter_simple_type_specifier<'tcx>(
    entries: &[&'tcx Symbol<'tcx>],
) -> Option<&'tcx Symbol<'tcx>> {
    let mut result = None;
    for entry in entries {
        if !entry.kind().is_type_name() {
            return None;
        }
        result = Some(*entry);
    }
    result
}

/// Resolves id-expressions to symbol sequences.
///
/// Resolution is query-only: it reads scopes and symbols, never mutates
/// them, so a failed resolution leaves the context untouched.
#[derive(Debug, Clone, Copy)]
pub struct NameResolver<'tcx> {
    cc: &'tcx CompileCtxt<'tcx>,
}

impl<'tcx> NameResolver<'tcx> {
    pub fn new(cc: &'tcx CompileCtxt<'tcx>) -> Self {
        Self { cc }
    }

    /// Resolve an id-expression starting from `scope`.
    ///
    /// An exhausted lookup is `Ok(vec![])`; only malformed or unsupported
    /// inputs and invalid qualifications produce errors.
    pub fn resolve_id_expression(
        &self,
        scope: ScopeId,
        node: &'tcx AstNode<'tcx>,
    ) -> Result<Vec<&'tcx Symbol<'tcx>>> {
        self.resolve_unqualified(scope, node, false)
    }

    /// Dispatch over the id-expression kinds. `local_only` restricts name
    /// lookups to the given scope without walking parents; it is set for the
    /// trailing id of a qualified path.
    fn resolve_unqualified(
        &self,
        scope: ScopeId,
        node: &'tcx AstNode<'tcx>,
        local_only: bool,
    ) -> Result<Vec<&'tcx Symbol<'tcx>>> {
        match node.kind() {
            AstKind::Ident => {
                let name = self.node_text(node)?;
                Ok(self.lookup(scope, name, local_only))
            }
            AstKind::DestructorId => self.resolve_destructor(scope, node, local_only),
            AstKind::QualifiedId => {
                if local_only {
                    // A qualified id cannot be the trailing id of another
                    // qualified id.
                    return Err(Error::unexpected("nested qualified id")
                        .with_operation("resolve::resolve_unqualified")
                        .with_context("loc", self.cc.display_loc(node.loc())));
                }
                self.resolve_qualified(scope, node)
            }
            kind @ (AstKind::TemplateId
            | AstKind::OperatorFunctionId
            | AstKind::ConversionFunctionId
            | AstKind::QualifiedTemplate
            | AstKind::QualifiedTemplateId
            | AstKind::QualifiedOperatorFunctionId) => {
                Err(Error::unsupported_construct(kind.to_string())
                    .with_operation("resolve::resolve_id_expression")
                    .with_context("loc", self.cc.display_loc(node.loc())))
            }
            kind => Err(Error::unexpected(format!("not an id-expression: {kind}"))
                .with_operation("resolve::resolve_id_expression")
                .with_context("loc", self.cc.display_loc(node.loc()))),
        }
    }

    /// `~X`: `X` must name exactly one class; answer is that class's
    /// registered destructor, or nothing.
    fn resolve_destructor(
        &self,
        scope: ScopeId,
        node: &'tcx AstNode<'tcx>,
        local_only: bool,
    ) -> Result<Vec<&'tcx Symbol<'tcx>>> {
        let class_node = node.child(0).ok_or_else(|| {
            Error::unexpected("destructor id without a class name")
                .with_operation("resolve::resolve_destructor")
                .with_context("loc", self.cc.display_loc(node.loc()))
        })?;
        let name = self.node_text(class_node)?;

        let entries = self.lookup(scope, name, local_only);
        if entries.is_empty() {
            return Ok(Vec::new());
        }
        // A shadowed class name would silently pick the wrong destructor;
        // demand an unambiguous result instead.
        if entries.len() > 1 {
            return Err(Error::ambiguous_symbol(self.resolve_text(name))
                .with_operation("resolve::resolve_destructor")
                .with_context("entries", entries.len().to_string())
                .with_context("loc", self.cc.display_loc(node.loc())));
        }

        let class = entries[0];
        if class.kind() != SymKind::Class {
            return Ok(Vec::new());
        }

        match class.destructor().and_then(|id| self.cc.symbol(id)) {
            Some(dtor) => Ok(vec![dtor]),
            None => Ok(Vec::new()),
        }
    }

    /// `[::] a::b::c`: walk the qualifier chain left to right, then resolve
    /// the trailing id strictly inside the named entity's scope.
    fn resolve_qualified(
        &self,
        scope: ScopeId,
        node: &'tcx AstNode<'tcx>,
    ) -> Result<Vec<&'tcx Symbol<'tcx>>> {
        let mut lookup_scope = scope;
        if node
            .child(0)
            .is_some_and(|c| c.is_kind(AstKind::GlobalScope))
        {
            lookup_scope = self.cc.global_scope();
        }

        // A namespace qualifier is illegal once any class appeared earlier
        // in the path, no matter how many components sit in between.
        let mut seen_class = false;

        let mut nested_name = node.child(1);
        while let Some(nested) = nested_name {
            let component = nested.child(0).ok_or_else(|| {
                Error::unexpected("nested name without a component")
                    .with_operation("resolve::resolve_qualified")
                    .with_context("loc", self.cc.display_loc(nested.loc()))
            })?;
            if !component.is_kind(AstKind::Ident) {
                return Err(Error::unsupported_construct(component.kind().to_string())
                    .with_operation("resolve::resolve_qualified")
                    .with_context("loc", self.cc.display_loc(component.loc())));
            }

            let name = self.node_text(component)?;
            let entries = self.cc.lookup_chain(lookup_scope, name);
            let entry = entries.first().copied().ok_or_else(|| {
                Error::unknown_identifier(self.resolve_text(name))
                    .with_operation("resolve::resolve_qualified")
                    .with_context("loc", self.cc.display_loc(component.loc()))
            })?;

            if !entry.kind().is_scope_name() {
                return Err(self.invalid_qualifier(name, "does not name a class or namespace", component));
            }
            if seen_class && entry.kind() == SymKind::Namespace {
                return Err(self.invalid_qualifier(name, "namespace qualifier after a class", component));
            }
            if entry.kind() == SymKind::Class {
                seen_class = true;
            }

            lookup_scope = entry.inner_scope().ok_or_else(|| {
                self.invalid_qualifier(name, "entity has no inner scope", component)
            })?;
            tracing::trace!(
                "qualified lookup advanced to scope {} via '{}'",
                lookup_scope,
                self.resolve_text(name)
            );

            nested_name = nested.child(1);
        }

        // Qualified lookup is scoped to the named entity: the trailing id
        // never escapes upward into enclosing scopes.
        let trailing = node.child(2).ok_or_else(|| {
            Error::unexpected("qualified id without a trailing id")
                .with_operation("resolve::resolve_qualified")
                .with_context("loc", self.cc.display_loc(node.loc()))
        })?;
        self.resolve_unqualified(lookup_scope, trailing, true)
    }

    fn lookup(
        &self,
        scope: ScopeId,
        name: InternedStr,
        local_only: bool,
    ) -> Vec<&'tcx Symbol<'tcx>> {
        if local_only {
            self.cc.scope(scope).lookup_local(name)
        } else {
            self.cc.lookup_chain(scope, name)
        }
    }

    fn node_text(&self, node: &AstNode<'tcx>) -> Result<InternedStr> {
        node.text().ok_or_else(|| {
            Error::unexpected(format!("{} node without text", node.kind()))
                .with_operation("resolve::node_text")
                .with_context("loc", self.cc.display_loc(node.loc()))
        })
    }

    fn resolve_text(&self, name: InternedStr) -> String {
        self.cc
            .interner
            .resolve_owned(name)
            .unwrap_or_else(|| "<unknown>".to_string())
    }

    fn invalid_qualifier(&self, name: InternedStr, why: &str, node: &AstNode<'tcx>) -> Error {
        Error::invalid_qualifier(self.resolve_text(name), why)
            .with_operation("resolve::resolve_qualified")
            .with_context("loc", self.cc.display_loc(node.loc()))
    }
}
