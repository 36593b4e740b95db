//! Parser-boundary AST model.
//!
//! The parser hands the resolver an already-built, immutable tree of nodes.
//! Each node exposes a kind tag, up to [`MAX_AST_CHILDREN`] ordered children,
//! an optional text payload, and a source location. The resolver only reads
//! this tree; it never mutates it.

use strum_macros::{Display, EnumIter, EnumString};

use crate::context::CompileCtxt;
use crate::interner::InternedStr;
use crate::limits::MAX_AST_CHILDREN;
use crate::loc::SourceLoc;

/// Node kinds of the id-expression grammar fragment this core consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumString, Display, Default)]
#[strum(serialize_all = "snake_case")]
pub enum AstKind {
    #[default]
    Undefined,
    /// A simple identifier.
    Ident,
    /// An unqualified destructor name `~X`; child 0 names the class.
    DestructorId,
    /// `identifier<args>`
    TemplateId,
    /// `operator +`
    OperatorFunctionId,
    /// `operator T`
    ConversionFunctionId,
    /// `a::b::c`; child 0 is an optional global-scope marker, child 1 an
    /// optional nested-name chain, child 2 the trailing unqualified id.
    QualifiedId,
    /// `a::b::template c`
    QualifiedTemplate,
    /// `a::b::c<args>`
    QualifiedTemplateId,
    /// `a::b::operator +`
    QualifiedOperatorFunctionId,
    /// One qualifier component; child 0 is the component, child 1 the rest
    /// of the chain (another nested-name node) or nothing.
    NestedName,
    /// The leading `::` of a fully qualified name.
    GlobalScope,
}

impl AstKind {
    /// Kinds that may appear as the root of an id-expression.
    pub fn is_id_expression(&self) -> bool {
        !matches!(
            self,
            AstKind::Undefined | AstKind::NestedName | AstKind::GlobalScope
        )
    }
}

/// One immutable node of the parser's tree.
#[derive(Debug)]
pub struct AstNode<'tcx> {
    kind: AstKind,
    children: [Option<&'tcx AstNode<'tcx>>; MAX_AST_CHILDREN],
    text: Option<InternedStr>,
    loc: SourceLoc,
}

impl<'tcx> AstNode<'tcx> {
    pub fn new(
        kind: AstKind,
        children: [Option<&'tcx AstNode<'tcx>>; MAX_AST_CHILDREN],
        text: Option<InternedStr>,
        loc: SourceLoc,
    ) -> Self {
        Self {
            kind,
            children,
            text,
            loc,
        }
    }

    #[inline]
    pub fn kind(&self) -> AstKind {
        self.kind
    }

    #[inline]
    pub fn is_kind(&self, kind: AstKind) -> bool {
        self.kind == kind
    }

    /// Get the nth child, if present.
    #[inline]
    pub fn child(&self, index: usize) -> Option<&'tcx AstNode<'tcx>> {
        self.children.get(index).copied().flatten()
    }

    /// Get the interned text payload, if any.
    #[inline]
    pub fn text(&self) -> Option<InternedStr> {
        self.text
    }

    #[inline]
    pub fn loc(&self) -> SourceLoc {
        self.loc
    }

    /// Count of present children.
    pub fn child_count(&self) -> usize {
        self.children.iter().filter(|c| c.is_some()).count()
    }
}

/// Arena-backed constructor for id-expression fragments.
///
/// Real input comes from the parser; tests and drivers use this builder to
/// assemble the same shapes.
#[derive(Debug, Clone, Copy)]
pub struct AstBuilder<'tcx> {
    cc: &'tcx CompileCtxt<'tcx>,
}

impl<'tcx> AstBuilder<'tcx> {
    pub fn new(cc: &'tcx CompileCtxt<'tcx>) -> Self {
        Self { cc }
    }

    fn alloc(
        &self,
        kind: AstKind,
        children: [Option<&'tcx AstNode<'tcx>>; MAX_AST_CHILDREN],
        text: Option<&str>,
        loc: SourceLoc,
    ) -> &'tcx AstNode<'tcx> {
        let text = text.map(|t| self.cc.interner.intern(t));
        self.cc.arena.alloc(AstNode::new(kind, children, text, loc))
    }

    /// A simple identifier node.
    pub fn ident(&self, name: &str, loc: SourceLoc) -> &'tcx AstNode<'tcx> {
        self.alloc(AstKind::Ident, [None; MAX_AST_CHILDREN], Some(name), loc)
    }

    /// An unqualified destructor name `~class_name`.
    pub fn destructor_id(&self, class_name: &str, loc: SourceLoc) -> &'tcx AstNode<'tcx> {
        let name = self.ident(class_name, loc);
        self.alloc(
            AstKind::DestructorId,
            [Some(name), None, None, None],
            None,
            loc,
        )
    }

    /// A node of one of the deliberately unsupported id-expression kinds.
    pub fn unsupported(&self, kind: AstKind, loc: SourceLoc) -> &'tcx AstNode<'tcx> {
        self.alloc(kind, [None; MAX_AST_CHILDREN], None, loc)
    }

    /// A qualified id `[::] q1::q2::...::trailing`.
    ///
    /// `qualifiers` become a right-nested chain of nested-name nodes, as the
    /// parser produces them.
    pub fn qualified_id(
        &self,
        global: bool,
        qualifiers: &[&str],
        trailing: &'tcx AstNode<'tcx>,
        loc: SourceLoc,
    ) -> &'tcx AstNode<'tcx> {
        let global_op =
            global.then(|| self.alloc(AstKind::GlobalScope, [None; MAX_AST_CHILDREN], None, loc));

        let mut chain: Option<&'tcx AstNode<'tcx>> = None;
        for name in qualifiers.iter().rev() {
            let component = self.ident(name, loc);
            chain = Some(self.alloc(
                AstKind::NestedName,
                [Some(component), chain, None, None],
                None,
                loc,
            ));
        }

        self.alloc(
            AstKind::QualifiedId,
            [global_op, chain, Some(trailing), None],
            None,
            loc,
        )
    }
}
