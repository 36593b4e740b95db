//! End-to-end resolution scenarios over a hand-built program shape:
//!
//! ```text
//! namespace outer {
//!     class Widget { ~Widget(); };
//!     namespace inner { int depth; }
//! }
//! int depth;
//! template <typename T> class Holder;
//! template <typename T> class Holder<T*>;
//! ```

use pretty_assertions::assert_eq;

use recxx_core::{
    AstBuilder, BuiltinTy, CompileCtxt, ScopeId, SourceLoc, SymKind, Symbol, TemplateArg,
    TemplateInfo, TplParam, TplParamId, TplParamKind,
};
use recxx_error::ErrorKind;
use recxx_resolver::{NameResolver, SolveError, TemplateSolver, filter_simple_type_specifier};

struct Program<'tcx> {
    cc: &'tcx CompileCtxt<'tcx>,
    root: ScopeId,
    outer_ns: &'tcx Symbol<'tcx>,
    widget: &'tcx Symbol<'tcx>,
    widget_dtor: &'tcx Symbol<'tcx>,
    inner_depth: &'tcx Symbol<'tcx>,
    global_depth: &'tcx Symbol<'tcx>,
    holder: &'tcx Symbol<'tcx>,
    holder_ptr: &'tcx Symbol<'tcx>,
}

fn build<'tcx>(cc: &'tcx CompileCtxt<'tcx>) -> Program<'tcx> {
    let root = cc.create_globals();
    let loc = SourceLoc::default();

    let outer_ns = cc.new_symbol(root, "outer", SymKind::Namespace, loc);
    let outer_scope = cc.enter_symbol_scope(outer_ns).unwrap();

    let widget = cc.new_symbol(outer_scope, "Widget", SymKind::Class, loc);
    let widget_scope = cc.enter_symbol_scope(widget).unwrap();
    let widget_dtor = cc.new_symbol(widget_scope, "~Widget", SymKind::Function, loc);
    widget.set_destructor(widget_dtor.id);

    let inner_ns = cc.new_symbol(outer_scope, "inner", SymKind::Namespace, loc);
    let inner_scope = cc.enter_symbol_scope(inner_ns).unwrap();
    let inner_depth = cc.new_symbol(inner_scope, "depth", SymKind::Variable, loc);

    let global_depth = cc.new_symbol(root, "depth", SymKind::Variable, loc);

    let params = vec![TplParam {
        id: TplParamId(0),
        name: cc.interner.intern("T"),
        kind: TplParamKind::Type,
    }];
    let holder = cc.new_symbol(root, "Holder", SymKind::Template, loc);
    holder.set_template(cc.arena.alloc(TemplateInfo::primary_template(params.clone())));

    let holder_ptr = cc.new_symbol(root, "Holder", SymKind::Template, loc);
    let slot = cc.param(TplParamId(0));
    holder_ptr.set_template(cc.arena.alloc(TemplateInfo::specialization(
        params,
        vec![TemplateArg::Type(cc.pointer_to(slot))],
        holder.id,
    )));

    Program {
        cc,
        root,
        outer_ns,
        widget,
        widget_dtor,
        inner_depth,
        global_depth,
        holder,
        holder_ptr,
    }
}

#[test]
fn qualified_path_reaches_nested_namespace() {
    let cc = CompileCtxt::default();
    let p = build(&cc);
    let builder = AstBuilder::new(p.cc);
    let resolver = NameResolver::new(p.cc);
    let loc = SourceLoc::default();

    let trailing = builder.ident("depth", loc);
    let node = builder.qualified_id(false, &["outer", "inner"], trailing, loc);

    let found = resolver.resolve_id_expression(p.root, node).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, p.inner_depth.id);
}

#[test]
fn qualified_lookup_never_escapes_the_named_entity() {
    let cc = CompileCtxt::default();
    let p = build(&cc);
    let builder = AstBuilder::new(p.cc);
    let resolver = NameResolver::new(p.cc);
    let loc = SourceLoc::default();

    // `depth` exists at the root, but `outer::depth` must not find it by
    // walking up from the namespace scope.
    let trailing = builder.ident("depth", loc);
    let node = builder.qualified_id(false, &["outer"], trailing, loc);
    assert!(resolver.resolve_id_expression(p.root, node).unwrap().is_empty());

    // Unqualified from the root still sees the global.
    let plain = builder.ident("depth", loc);
    let found = resolver.resolve_id_expression(p.root, plain).unwrap();
    assert_eq!(found[0].id, p.global_depth.id);
}

#[test]
fn leading_global_scope_restarts_at_root() {
    let cc = CompileCtxt::default();
    let p = build(&cc);
    let builder = AstBuilder::new(p.cc);
    let resolver = NameResolver::new(p.cc);
    let loc = SourceLoc::default();

    // From inside outer::, `::outer::inner::depth` still resolves.
    let outer_scope = p.outer_ns.inner_scope().unwrap();
    let trailing = builder.ident("depth", loc);
    let node = builder.qualified_id(true, &["outer", "inner"], trailing, loc);
    let found = resolver.resolve_id_expression(outer_scope, node).unwrap();
    assert_eq!(found[0].id, p.inner_depth.id);
}

#[test]
fn variable_qualifier_is_invalid() {
    let cc = CompileCtxt::default();
    let p = build(&cc);
    let builder = AstBuilder::new(p.cc);
    let resolver = NameResolver::new(p.cc);
    let loc = SourceLoc::default();

    let trailing = builder.ident("anything", loc);
    let node = builder.qualified_id(false, &["depth"], trailing, loc);
    let err = resolver.resolve_id_expression(p.root, node).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidQualifier);
    assert!(!err.is_fatal());
}

#[test]
fn namespace_after_class_is_invalid() {
    let cc = CompileCtxt::default();
    let p = build(&cc);
    let loc = SourceLoc::default();

    // Plant a namespace inside the class scope so only the path rule can
    // reject it.
    let widget_scope = p.widget.inner_scope().unwrap();
    let nested_ns = p.cc.new_symbol(widget_scope, "detail", SymKind::Namespace, loc);
    p.cc.enter_symbol_scope(nested_ns).unwrap();

    let builder = AstBuilder::new(p.cc);
    let resolver = NameResolver::new(p.cc);
    let trailing = builder.ident("anything", loc);
    let node = builder.qualified_id(false, &["outer", "Widget", "detail"], trailing, loc);
    let err = resolver.resolve_id_expression(p.root, node).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidQualifier);
}

#[test]
fn unknown_qualifier_reports_identifier() {
    let cc = CompileCtxt::default();
    let p = build(&cc);
    let builder = AstBuilder::new(p.cc);
    let resolver = NameResolver::new(p.cc);
    let loc = SourceLoc::default();

    let trailing = builder.ident("x", loc);
    let node = builder.qualified_id(false, &["missing"], trailing, loc);
    let err = resolver.resolve_id_expression(p.root, node).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnknownIdentifier);
}

#[test]
fn qualified_destructor_resolves_inside_class() {
    let cc = CompileCtxt::default();
    let p = build(&cc);
    let builder = AstBuilder::new(p.cc);
    let resolver = NameResolver::new(p.cc);
    let loc = SourceLoc::default();

    // `outer::Widget::~Widget` — the trailing destructor id resolves with
    // the class scope as the sole starting point.
    let trailing = builder.destructor_id("Widget", loc);
    let node = builder.qualified_id(false, &["outer", "Widget"], trailing, loc);
    let found = resolver.resolve_id_expression(p.root, node).unwrap();
    assert!(found.is_empty(), "class name is not local to its own scope");

    // From inside outer::, the unqualified `~Widget` finds the destructor.
    let outer_scope = p.outer_ns.inner_scope().unwrap();
    let unqualified = builder.destructor_id("Widget", loc);
    let found = resolver.resolve_id_expression(outer_scope, unqualified).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, p.widget_dtor.id);
}

#[test]
fn shadowing_is_total_across_scopes() {
    let cc = CompileCtxt::default();
    let p = build(&cc);
    let builder = AstBuilder::new(p.cc);
    let resolver = NameResolver::new(p.cc);
    let loc = SourceLoc::default();

    let block = p.cc.enter_scope(p.root).unwrap();
    let local = p.cc.new_symbol(block, "depth", SymKind::Variable, loc);

    let node = builder.ident("depth", loc);
    let found = resolver.resolve_id_expression(block, node).unwrap();
    assert_eq!(found.len(), 1, "no merging with the global `depth`");
    assert_eq!(found[0].id, local.id);
}

#[test]
fn type_specifier_filtering_after_resolution() {
    let cc = CompileCtxt::default();
    let p = build(&cc);
    let builder = AstBuilder::new(p.cc);
    let resolver = NameResolver::new(p.cc);
    let loc = SourceLoc::default();

    let outer_scope = p.outer_ns.inner_scope().unwrap();
    let node = builder.ident("Widget", loc);
    let entries = resolver.resolve_id_expression(outer_scope, node).unwrap();
    let picked = filter_simple_type_specifier(&entries).unwrap();
    assert_eq!(picked.id, p.widget.id);

    // Redeclare `Widget` as a function; the type name is now hidden.
    p.cc.new_symbol(outer_scope, "Widget", SymKind::Function, loc);
    let node = builder.ident("Widget", loc);
    let entries = resolver.resolve_id_expression(outer_scope, node).unwrap();
    assert_eq!(entries.len(), 2);
    assert!(filter_simple_type_specifier(&entries).is_none());
}

#[test]
fn template_solving_end_to_end() {
    let cc = CompileCtxt::default();
    let p = build(&cc);
    let builder = AstBuilder::new(p.cc);
    let resolver = NameResolver::new(p.cc);
    let solver = TemplateSolver::new(p.cc);
    let loc = SourceLoc::default();

    // Resolution hands the solver the whole overload set for `Holder`.
    let node = builder.ident("Holder", loc);
    let candidates = resolver.resolve_id_expression(p.root, node).unwrap();
    assert_eq!(candidates.len(), 2);

    let int = p.cc.builtin(BuiltinTy::Int);
    let pair = solver
        .solve(
            &candidates,
            &[TemplateArg::Type(p.cc.pointer_to(int))],
            loc,
            false,
        )
        .unwrap();
    assert_eq!(pair.entry.id, p.holder_ptr.id, "pointer specialization wins");

    let pair = solver
        .solve(&candidates, &[TemplateArg::Type(int)], loc, false)
        .unwrap();
    assert_eq!(pair.entry.id, p.holder.id, "primary takes the rest");
}

#[test]
fn failed_solve_renders_recoverable_diagnostics() {
    let cc = CompileCtxt::default();
    let p = build(&cc);
    let solver = TemplateSolver::new(p.cc);
    let loc = SourceLoc::new(0, 12, 5);

    let int = p.cc.builtin(BuiltinTy::Int);
    let err = solver
        .solve(&[p.holder_ptr], &[TemplateArg::Type(int)], loc, false)
        .unwrap_err();
    assert!(matches!(err, SolveError::NoMatchingTemplate { .. }));

    let rendered = err.into_error(p.cc);
    assert_eq!(rendered.kind(), ErrorKind::NoMatchingTemplate);
    assert!(!rendered.is_fatal(), "callers may substitute an error type");
    assert!(rendered.to_string().contains("Holder"));
}
