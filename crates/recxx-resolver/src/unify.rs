//! Structural unification of template patterns against concrete arguments.

use smallvec::SmallVec;

use recxx_core::limits::MAX_INSTANTIATION_DEPTH;
use recxx_core::{
    CompileCtxt, CvQuals, QualMode, TemplateArg, TplParam, TplParamId, TplParamKind, Ty, TyKind,
    ValueExpr,
};
use recxx_error::{Error, Result};

/// One established binding of a template parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum Binding<'tcx> {
    Type(TplParamId, &'tcx Ty<'tcx>),
    Value(TplParamId, i64),
}

impl<'tcx> Binding<'tcx> {
    pub fn param(&self) -> TplParamId {
        match self {
            Binding::Type(id, _) | Binding::Value(id, _) => *id,
        }
    }
}

/// Ordered binding set for one unification attempt.
///
/// Each solve candidate gets a fresh substitution; bindings are only ever
/// appended, and re-binding a parameter must agree with the existing entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Substitution<'tcx> {
    bindings: SmallVec<[Binding<'tcx>; 4]>,
}

impl<'tcx> Substitution<'tcx> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Binding<'tcx>> {
        self.bindings.iter()
    }

    pub fn type_binding(&self, id: TplParamId) -> Option<&'tcx Ty<'tcx>> {
        self.bindings.iter().find_map(|b| match b {
            Binding::Type(bound, ty) if *bound == id => Some(*ty),
            _ => None,
        })
    }

    pub fn value_binding(&self, id: TplParamId) -> Option<i64> {
        self.bindings.iter().find_map(|b| match b {
            Binding::Value(bound, value) if *bound == id => Some(*value),
            _ => None,
        })
    }

    pub fn bind_type(&mut self, id: TplParamId, ty: &'tcx Ty<'tcx>) {
        debug_assert!(self.type_binding(id).is_none(), "parameter already bound");
        self.bindings.push(Binding::Type(id, ty));
    }

    pub fn bind_value(&mut self, id: TplParamId, value: i64) {
        debug_assert!(self.value_binding(id).is_none(), "parameter already bound");
        self.bindings.push(Binding::Value(id, value));
    }

    /// Rewrite `ty`, replacing every bound parameter slot with its binding.
    /// Unbound slots stay as parameter slots.
    pub fn apply_ty(
        &self,
        cc: &'tcx CompileCtxt<'tcx>,
        ty: &'tcx Ty<'tcx>,
    ) -> &'tcx Ty<'tcx> {
        match &ty.kind {
            TyKind::Param(id) => match self.type_binding(*id) {
                // The slot's own qualifiers stack on top of the binding's.
                Some(bound) => cc.with_quals(bound, bound.quals.union(ty.quals)),
                None => ty,
            },
            TyKind::Pointer(inner) => {
                cc.with_quals(cc.pointer_to(self.apply_ty(cc, inner)), ty.quals)
            }
            TyKind::Reference(inner) => cc.reference_to(self.apply_ty(cc, inner)),
            TyKind::Array(elem, len) => cc.with_quals(
                cc.array_of(self.apply_ty(cc, elem), (*len).map(|l| self.apply_value(l))),
                ty.quals,
            ),
            TyKind::Function { ret, params } => {
                let ret = self.apply_ty(cc, ret);
                let params = params.iter().map(|p| self.apply_ty(cc, p)).collect();
                cc.with_quals(cc.function_of(ret, params), ty.quals)
            }
            TyKind::Spec { primary, args } => {
                let args = args.iter().map(|a| self.apply_arg(cc, a)).collect();
                cc.with_quals(cc.spec(*primary, args), ty.quals)
            }
            _ => ty,
        }
    }

    pub fn apply_value(&self, value: ValueExpr) -> ValueExpr {
        match value {
            ValueExpr::Param(id) => match self.value_binding(id) {
                Some(bound) => ValueExpr::Const(bound),
                None => value,
            },
            ValueExpr::Const(_) => value,
        }
    }

    pub fn apply_arg(
        &self,
        cc: &'tcx CompileCtxt<'tcx>,
        arg: &TemplateArg<'tcx>,
    ) -> TemplateArg<'tcx> {
        match *arg {
            TemplateArg::Type(ty) => TemplateArg::Type(self.apply_ty(cc, ty)),
            TemplateArg::Value(value) => TemplateArg::Value(self.apply_value(value)),
        }
    }
}

/// Matches patterns built from template parameter slots against concrete
/// types and values.
///
/// Unification never backtracks: each pattern shape has exactly one matching
/// concrete shape, and alternatives are explored candidate by candidate at
/// the solver level with fresh substitutions.
#[derive(Debug, Clone, Copy)]
pub struct Unifier<'tcx> {
    cc: &'tcx CompileCtxt<'tcx>,
}

impl<'tcx> Unifier<'tcx> {
    pub fn new(cc: &'tcx CompileCtxt<'tcx>) -> Self {
        Self { cc }
    }

    /// Unify a pattern argument list against a concrete argument list,
    /// accumulating bindings into `subst`.
    pub fn unify_args(
        &self,
        pattern: &[TemplateArg<'tcx>],
        concrete: &[TemplateArg<'tcx>],
        params: &[TplParam<'tcx>],
        subst: &mut Substitution<'tcx>,
    ) -> Result<()> {
        if pattern.len() != concrete.len() {
            return Err(Error::unification_mismatch(format!(
                "expected {} template arguments, got {}",
                pattern.len(),
                concrete.len()
            ))
            .with_operation("unify::unify_args"));
        }
        for (pat, arg) in pattern.iter().zip(concrete.iter()) {
            self.unify_arg(pat, arg, params, subst)?;
        }
        Ok(())
    }

    fn unify_arg(
        &self,
        pattern: &TemplateArg<'tcx>,
        concrete: &TemplateArg<'tcx>,
        params: &[TplParam<'tcx>],
        subst: &mut Substitution<'tcx>,
    ) -> Result<()> {
        match (*pattern, *concrete) {
            (TemplateArg::Type(pat), TemplateArg::Type(arg)) => {
                self.unify_type(pat, arg, QualMode::Exact, params, subst)
            }
            (TemplateArg::Value(pat), TemplateArg::Value(arg)) => {
                self.unify_value(pat, arg, params, subst)
            }
            _ => Err(Error::unification_mismatch(
                "type argument supplied where a value was expected, or vice versa",
            )
            .with_operation("unify::unify_args")),
        }
    }

    /// Unify a type pattern against a concrete type under the given
    /// qualifier mode.
    pub fn unify_type(
        &self,
        pattern: &'tcx Ty<'tcx>,
        concrete: &'tcx Ty<'tcx>,
        mode: QualMode,
        params: &[TplParam<'tcx>],
        subst: &mut Substitution<'tcx>,
    ) -> Result<()> {
        self.unify_type_at(pattern, concrete, mode, params, subst, 0)
    }

    fn unify_type_at(
        &self,
        pattern: &'tcx Ty<'tcx>,
        concrete: &'tcx Ty<'tcx>,
        mode: QualMode,
        params: &[TplParam<'tcx>],
        subst: &mut Substitution<'tcx>,
        depth: usize,
    ) -> Result<()> {
        if depth >= MAX_INSTANTIATION_DEPTH {
            return Err(Error::recursion_limit(MAX_INSTANTIATION_DEPTH)
                .with_operation("unify::unify_type"));
        }

        // Reference-ness resolves before cv-qualifiers before the base type.
        if let (TyKind::Reference(pat), TyKind::Reference(arg)) = (&pattern.kind, &concrete.kind) {
            return self.unify_type_at(pat, arg, QualMode::Exact, params, subst, depth + 1);
        }
        if pattern.is_reference() != concrete.is_reference() {
            return Err(self.mismatch(pattern, concrete, "reference-ness differs"));
        }

        if let Some(id) = pattern.as_param() {
            return self.bind_type_param(id, pattern, concrete, mode, subst);
        }

        if mode == QualMode::Exact && pattern.quals != concrete.quals {
            return Err(self.mismatch(pattern, concrete, "cv-qualifiers differ"));
        }

        match (&pattern.kind, &concrete.kind) {
            (TyKind::Builtin(pat), TyKind::Builtin(arg)) if pat == arg => Ok(()),
            (TyKind::Named(pat), TyKind::Named(arg)) if pat == arg => Ok(()),
            (TyKind::Synthetic(pat), TyKind::Synthetic(arg)) if pat == arg => Ok(()),
            (TyKind::Pointer(pat), TyKind::Pointer(arg)) => {
                self.unify_type_at(pat, arg, QualMode::Exact, params, subst, depth + 1)
            }
            (TyKind::Array(pat, pat_len), TyKind::Array(arg, arg_len)) => {
                match (pat_len, arg_len) {
                    (Some(p), Some(a)) => self.unify_value(*p, *a, params, subst)?,
                    (None, None) => {}
                    _ => {
                        return Err(self.mismatch(pattern, concrete, "array length presence"));
                    }
                }
                self.unify_type_at(pat, arg, QualMode::Exact, params, subst, depth + 1)
            }
            (
                TyKind::Function {
                    ret: pat_ret,
                    params: pat_params,
                },
                TyKind::Function {
                    ret: arg_ret,
                    params: arg_params,
                },
            ) => {
                if pat_params.len() != arg_params.len() {
                    return Err(self.mismatch(pattern, concrete, "parameter count differs"));
                }
                self.unify_type_at(pat_ret, arg_ret, QualMode::Exact, params, subst, depth + 1)?;
                for (pat, arg) in pat_params.iter().zip(arg_params.iter()) {
                    // Function parameters compare with outermost qualifiers
                    // ignored, matching overload resolution.
                    self.unify_type_at(
                        pat,
                        arg,
                        QualMode::IgnoreOutermost,
                        params,
                        subst,
                        depth + 1,
                    )?;
                }
                Ok(())
            }
            (
                TyKind::Spec {
                    primary: pat_primary,
                    args: pat_args,
                },
                TyKind::Spec {
                    primary: arg_primary,
                    args: arg_args,
                },
            ) => {
                if pat_primary != arg_primary {
                    return Err(self.mismatch(pattern, concrete, "different class templates"));
                }
                if pat_args.len() != arg_args.len() {
                    return Err(self.mismatch(pattern, concrete, "argument count differs"));
                }
                for (pat, arg) in pat_args.iter().zip(arg_args.iter()) {
                    self.unify_arg(pat, arg, params, subst)?;
                }
                Ok(())
            }
            _ => Err(self.mismatch(pattern, concrete, "different type constructors")),
        }
    }

    /// A bare parameter slot binds any concrete type, subject to agreement
    /// with an existing binding.
    fn bind_type_param(
        &self,
        id: TplParamId,
        pattern: &'tcx Ty<'tcx>,
        concrete: &'tcx Ty<'tcx>,
        mode: QualMode,
        subst: &mut Substitution<'tcx>,
    ) -> Result<()> {
        let bound = match mode {
            // `const P` against `const int` deduces `P = int`: the slot's own
            // qualifiers must be present on the argument and are peeled off.
            QualMode::Exact => {
                if !pattern.quals.minus(concrete.quals).is_unqualified() {
                    return Err(self.mismatch(pattern, concrete, "missing cv-qualifiers"));
                }
                self.cc.with_quals(concrete, concrete.quals.minus(pattern.quals))
            }
            QualMode::IgnoreOutermost => self.cc.with_quals(concrete, CvQuals::NONE),
        };

        if let Some(existing) = subst.type_binding(id) {
            if !existing.equivalent(bound, QualMode::Exact) {
                return Err(self
                    .mismatch(existing, bound, "conflicting bindings for one parameter")
                    .with_context("param", id.to_string()));
            }
            return Ok(());
        }

        tracing::trace!("binding {} to a concrete type", id);
        subst.bind_type(id, bound);
        Ok(())
    }

    /// Unify a value pattern against a concrete constant expression.
    pub fn unify_value(
        &self,
        pattern: ValueExpr,
        concrete: ValueExpr,
        params: &[TplParam<'tcx>],
        subst: &mut Substitution<'tcx>,
    ) -> Result<()> {
        let ValueExpr::Const(value) = concrete else {
            return Err(Error::unification_mismatch(
                "concrete argument is not an evaluated constant expression",
            )
            .with_operation("unify::unify_value"));
        };

        match pattern {
            ValueExpr::Const(expected) => {
                if expected == value {
                    Ok(())
                } else {
                    Err(Error::unification_mismatch(format!(
                        "constant {} does not match pattern constant {}",
                        value, expected
                    ))
                    .with_operation("unify::unify_value"))
                }
            }
            ValueExpr::Param(id) => {
                let declared = params.iter().find(|p| p.id == id).ok_or_else(|| {
                    Error::unexpected(format!("value slot {} has no parameter declaration", id))
                        .with_operation("unify::unify_value")
                })?;
                let TplParamKind::Value(ty) = declared.kind else {
                    return Err(Error::unification_mismatch(format!(
                        "constant supplied for type parameter {}",
                        id
                    ))
                    .with_operation("unify::unify_value"));
                };
                if !ty.accepts_constant() {
                    return Err(Error::unification_mismatch(format!(
                        "constant {} is not convertible to the declared parameter type",
                        value
                    ))
                    .with_operation("unify::unify_value"));
                }

                if let Some(existing) = subst.value_binding(id) {
                    if existing != value {
                        return Err(Error::unification_mismatch(format!(
                            "parameter {} already bound to {}, now {}",
                            id, existing, value
                        ))
                        .with_operation("unify::unify_value"));
                    }
                    return Ok(());
                }

                tracing::trace!("binding {} to constant {}", id, value);
                subst.bind_value(id, value);
                Ok(())
            }
        }
    }

    fn mismatch(&self, pattern: &Ty<'tcx>, concrete: &Ty<'tcx>, why: &str) -> Error {
        Error::unification_mismatch(format!(
            "{} (pattern {:?} vs {:?})",
            why, pattern.kind, concrete.kind
        ))
        .with_operation("unify::unify_type")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use recxx_core::BuiltinTy;
    use recxx_error::ErrorKind;

    fn type_param<'tcx>(cc: &'tcx CompileCtxt<'tcx>, n: u32) -> (TplParam<'tcx>, &'tcx Ty<'tcx>) {
        let id = TplParamId(n);
        let param = TplParam {
            id,
            name: cc.interner.intern(&format!("P{n}")),
            kind: TplParamKind::Type,
        };
        (param, cc.param(id))
    }

    #[test]
    fn bare_parameter_binds_and_agrees() {
        let cc = CompileCtxt::default();
        let cc = &cc;
        let unifier = Unifier::new(cc);
        let (param, slot) = type_param(cc, 0);
        let params = [param];

        let int = cc.builtin(BuiltinTy::Int);
        let float = cc.builtin(BuiltinTy::Float);

        let mut subst = Substitution::new();
        unifier
            .unify_type(slot, int, QualMode::Exact, &params, &mut subst)
            .unwrap();
        assert!(subst.type_binding(param.id).unwrap().equivalent(int, QualMode::Exact));

        // Same type again agrees.
        unifier
            .unify_type(slot, int, QualMode::Exact, &params, &mut subst)
            .unwrap();
        assert_eq!(subst.len(), 1);

        // A different type conflicts.
        let err = unifier
            .unify_type(slot, float, QualMode::Exact, &params, &mut subst)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnificationMismatch);
    }

    #[test]
    fn pointer_pattern_requires_pointer() {
        let cc = CompileCtxt::default();
        let cc = &cc;
        let unifier = Unifier::new(cc);
        let (param, slot) = type_param(cc, 0);
        let params = [param];
        let pattern = cc.pointer_to(slot);

        let int = cc.builtin(BuiltinTy::Int);
        let mut subst = Substitution::new();
        let err = unifier
            .unify_type(pattern, int, QualMode::Exact, &params, &mut subst)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnificationMismatch);

        let dbl = cc.builtin(BuiltinTy::Double);
        let ptr_dbl = cc.pointer_to(dbl);
        let mut subst = Substitution::new();
        unifier
            .unify_type(pattern, ptr_dbl, QualMode::Exact, &params, &mut subst)
            .unwrap();
        assert!(subst.type_binding(param.id).unwrap().equivalent(dbl, QualMode::Exact));
    }

    #[test]
    fn qualified_slot_peels_qualifiers() {
        let cc = CompileCtxt::default();
        let cc = &cc;
        let unifier = Unifier::new(cc);
        let (param, slot) = type_param(cc, 0);
        let params = [param];
        let const_slot = cc.with_quals(slot, CvQuals::CONST);

        let int = cc.builtin(BuiltinTy::Int);
        let const_int = cc.with_quals(int, CvQuals::CONST);

        let mut subst = Substitution::new();
        unifier
            .unify_type(const_slot, const_int, QualMode::Exact, &params, &mut subst)
            .unwrap();
        let bound = subst.type_binding(param.id).unwrap();
        assert!(bound.quals.is_unqualified());

        // Plain int lacks the const the pattern demands.
        let mut subst = Substitution::new();
        assert!(
            unifier
                .unify_type(const_slot, int, QualMode::Exact, &params, &mut subst)
                .is_err()
        );

        // In parameter-like contexts the outermost const is irrelevant.
        let mut subst = Substitution::new();
        unifier
            .unify_type(const_slot, int, QualMode::IgnoreOutermost, &params, &mut subst)
            .unwrap();
    }

    #[test]
    fn references_resolve_before_qualifiers() {
        let cc = CompileCtxt::default();
        let cc = &cc;
        let unifier = Unifier::new(cc);
        let (param, slot) = type_param(cc, 0);
        let params = [param];
        let pattern = cc.reference_to(slot);

        let int = cc.builtin(BuiltinTy::Int);
        let ref_int = cc.reference_to(int);

        let mut subst = Substitution::new();
        unifier
            .unify_type(pattern, ref_int, QualMode::Exact, &params, &mut subst)
            .unwrap();
        assert!(subst.type_binding(param.id).unwrap().equivalent(int, QualMode::Exact));

        // Reference pattern against non-reference fails regardless of mode.
        let mut subst = Substitution::new();
        assert!(
            unifier
                .unify_type(pattern, int, QualMode::IgnoreOutermost, &params, &mut subst)
                .is_err()
        );
    }

    #[test]
    fn function_patterns_recurse_into_parameters() {
        let cc = CompileCtxt::default();
        let cc = &cc;
        let unifier = Unifier::new(cc);
        let (p0, slot0) = type_param(cc, 0);
        let (p1, slot1) = type_param(cc, 1);
        let params = [p0, p1];

        let pattern = cc.function_of(slot0, vec![slot1, slot1]);

        let int = cc.builtin(BuiltinTy::Int);
        let dbl = cc.builtin(BuiltinTy::Double);
        let concrete = cc.function_of(int, vec![dbl, dbl]);

        let mut subst = Substitution::new();
        unifier
            .unify_type(pattern, concrete, QualMode::Exact, &params, &mut subst)
            .unwrap();
        assert!(subst.type_binding(p0.id).unwrap().equivalent(int, QualMode::Exact));
        assert!(subst.type_binding(p1.id).unwrap().equivalent(dbl, QualMode::Exact));

        // Same slot in both parameter positions must agree.
        let mixed = cc.function_of(int, vec![dbl, int]);
        let mut subst = Substitution::new();
        assert!(
            unifier
                .unify_type(pattern, mixed, QualMode::Exact, &params, &mut subst)
                .is_err()
        );
    }

    #[test]
    fn value_parameters_bind_integral_constants() {
        let cc = CompileCtxt::default();
        let cc = &cc;
        let unifier = Unifier::new(cc);

        let id = TplParamId(0);
        let int_param = TplParam {
            id,
            name: cc.interner.intern("N"),
            kind: TplParamKind::Value(cc.builtin(BuiltinTy::Int)),
        };
        let params = [int_param];

        let mut subst = Substitution::new();
        unifier
            .unify_value(ValueExpr::Param(id), ValueExpr::Const(3), &params, &mut subst)
            .unwrap();
        assert_eq!(subst.value_binding(id), Some(3));

        // Agreement on re-binding.
        unifier
            .unify_value(ValueExpr::Param(id), ValueExpr::Const(3), &params, &mut subst)
            .unwrap();
        assert!(
            unifier
                .unify_value(ValueExpr::Param(id), ValueExpr::Const(4), &params, &mut subst)
                .is_err()
        );
    }

    #[test]
    fn value_parameter_of_non_integral_type_rejects() {
        let cc = CompileCtxt::default();
        let cc = &cc;
        let unifier = Unifier::new(cc);

        let id = TplParamId(0);
        let dbl_param = TplParam {
            id,
            name: cc.interner.intern("N"),
            kind: TplParamKind::Value(cc.builtin(BuiltinTy::Double)),
        };
        let params = [dbl_param];

        let mut subst = Substitution::new();
        let err = unifier
            .unify_value(ValueExpr::Param(id), ValueExpr::Const(1), &params, &mut subst)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnificationMismatch);
    }

    #[test]
    fn deep_recursion_is_bounded() {
        let cc = CompileCtxt::default();
        let cc = &cc;
        let unifier = Unifier::new(cc);
        let (param, slot) = type_param(cc, 0);
        let params = [param];

        // Matching pointer chains on both sides keep the walk structural
        // until the depth guard trips.
        let mut pattern = slot;
        let mut concrete = cc.builtin(BuiltinTy::Int);
        for _ in 0..MAX_INSTANTIATION_DEPTH + 16 {
            pattern = cc.pointer_to(pattern);
            concrete = cc.pointer_to(concrete);
        }

        let mut subst = Substitution::new();
        let err = unifier
            .unify_type(pattern, concrete, QualMode::Exact, &params, &mut subst)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RecursionLimitExceeded);
        assert!(err.is_fatal());
    }

    #[test]
    fn substitution_application_rebuilds_compounds() {
        let cc = CompileCtxt::default();
        let cc = &cc;
        let (param, slot) = type_param(cc, 0);
        let int = cc.builtin(BuiltinTy::Int);

        let mut subst = Substitution::new();
        subst.bind_type(param.id, int);
        subst.bind_value(TplParamId(1), 8);

        let pattern = cc.pointer_to(cc.with_quals(slot, CvQuals::CONST));
        let applied = subst.apply_ty(cc, pattern);
        let expected = cc.pointer_to(cc.with_quals(int, CvQuals::CONST));
        assert!(applied.equivalent(expected, QualMode::Exact));

        let arr = cc.array_of(slot, Some(ValueExpr::Param(TplParamId(1))));
        let applied = subst.apply_ty(cc, arr);
        let expected = cc.array_of(int, Some(ValueExpr::Const(8)));
        assert!(applied.equivalent(expected, QualMode::Exact));

        // Unbound slots survive application unchanged.
        let other = cc.param(TplParamId(9));
        assert!(subst.apply_ty(cc, other).as_param().is_some());
    }
}
