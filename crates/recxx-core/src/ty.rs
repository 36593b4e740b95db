//! Type model consumed through predicates.
//!
//! The wider type subsystem (pretty-printing, conversions, layout) is an
//! external collaborator; this module carries only what resolution and
//! unification need: structural shape, cv-qualifiers, decomposition
//! accessors, and equivalence under a caller-supplied qualifier mode.

use std::fmt;

use strum_macros::Display;

use crate::symbol::SymId;

/// Identity of one template parameter within its owning template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TplParamId(pub u32);

impl fmt::Display for TplParamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

/// Const/volatile qualifier set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CvQuals {
    pub is_const: bool,
    pub is_volatile: bool,
}

impl CvQuals {
    pub const NONE: CvQuals = CvQuals {
        is_const: false,
        is_volatile: false,
    };

    pub const CONST: CvQuals = CvQuals {
        is_const: true,
        is_volatile: false,
    };

    pub fn is_unqualified(&self) -> bool {
        !self.is_const && !self.is_volatile
    }

    /// Qualifiers present in `self` but not in `other`.
    pub fn minus(self, other: CvQuals) -> CvQuals {
        CvQuals {
            is_const: self.is_const && !other.is_const,
            is_volatile: self.is_volatile && !other.is_volatile,
        }
    }

    /// Union of two qualifier sets.
    pub fn union(self, other: CvQuals) -> CvQuals {
        CvQuals {
            is_const: self.is_const || other.is_const,
            is_volatile: self.is_volatile || other.is_volatile,
        }
    }
}

impl fmt::Display for CvQuals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_const {
            write!(f, "const")?;
        }
        if self.is_volatile {
            if self.is_const {
                write!(f, " ")?;
            }
            write!(f, "volatile")?;
        }
        Ok(())
    }
}

/// Scalar builtins of the source language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "snake_case")]
pub enum BuiltinTy {
    Void,
    Bool,
    Char,
    Int,
    UInt,
    Long,
    Float,
    Double,
}

impl BuiltinTy {
    pub fn is_integral(&self) -> bool {
        matches!(
            self,
            BuiltinTy::Bool | BuiltinTy::Char | BuiltinTy::Int | BuiltinTy::UInt | BuiltinTy::Long
        )
    }
}

/// A constant expression slot: either an evaluated constant or a reference
/// to a non-type template parameter still awaiting a binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueExpr {
    Const(i64),
    Param(TplParamId),
}

/// One template argument: a type or a constant expression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TemplateArg<'tcx> {
    Type(&'tcx Ty<'tcx>),
    Value(ValueExpr),
}

/// Qualifier handling mode for equivalence and unification.
///
/// `IgnoreOutermost` is used in function-parameter-like contexts; `Exact`
/// everywhere else. The mode applies only to the outermost level; nested
/// comparisons are always exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualMode {
    Exact,
    IgnoreOutermost,
}

/// Structural shape of a type.
#[derive(Debug, Clone)]
pub enum TyKind<'tcx> {
    Builtin(BuiltinTy),
    /// A user-declared class/enum/typedef, by symbol identity.
    Named(SymId),
    Pointer(&'tcx Ty<'tcx>),
    Reference(&'tcx Ty<'tcx>),
    /// Element type plus optional (possibly dependent) length.
    Array(&'tcx Ty<'tcx>, Option<ValueExpr>),
    Function {
        ret: &'tcx Ty<'tcx>,
        params: Vec<&'tcx Ty<'tcx>>,
    },
    /// A template type-parameter slot.
    Param(TplParamId),
    /// A specialization of a class template.
    Spec {
        primary: SymId,
        args: Vec<TemplateArg<'tcx>>,
    },
    /// A unique probe type used only for partial-ordering comparisons;
    /// equivalent to nothing but itself.
    Synthetic(u32),
    /// Placeholder substituted for a failed resolution so later
    /// declarations can still be processed.
    Error,
}

/// A type handle: structural kind plus cv-qualifiers.
#[derive(Debug, Clone)]
pub struct Ty<'tcx> {
    pub kind: TyKind<'tcx>,
    pub quals: CvQuals,
}

impl<'tcx> Ty<'tcx> {
    pub fn new(kind: TyKind<'tcx>, quals: CvQuals) -> Self {
        Self { kind, quals }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.kind, TyKind::Error)
    }

    pub fn is_named(&self) -> bool {
        matches!(self.kind, TyKind::Named(_))
    }

    pub fn is_reference(&self) -> bool {
        matches!(self.kind, TyKind::Reference(_))
    }

    pub fn is_integral(&self) -> bool {
        matches!(self.kind, TyKind::Builtin(b) if b.is_integral())
    }

    pub fn as_param(&self) -> Option<TplParamId> {
        match self.kind {
            TyKind::Param(id) => Some(id),
            _ => None,
        }
    }

    pub fn as_pointer(&self) -> Option<&'tcx Ty<'tcx>> {
        match self.kind {
            TyKind::Pointer(inner) => Some(inner),
            _ => None,
        }
    }

    pub fn as_reference(&self) -> Option<&'tcx Ty<'tcx>> {
        match self.kind {
            TyKind::Reference(inner) => Some(inner),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<(&'tcx Ty<'tcx>, Option<ValueExpr>)> {
        match self.kind {
            TyKind::Array(elem, len) => Some((elem, len)),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<(&'tcx Ty<'tcx>, &[&'tcx Ty<'tcx>])> {
        match &self.kind {
            TyKind::Function { ret, params } => Some((ret, params)),
            _ => None,
        }
    }

    pub fn as_spec(&self) -> Option<(SymId, &[TemplateArg<'tcx>])> {
        match &self.kind {
            TyKind::Spec { primary, args } => Some((*primary, args)),
            _ => None,
        }
    }

    /// Strip reference-ness, yielding the referred-to type.
    /// Reference-ness resolves before cv-qualifiers during matching.
    pub fn strip_reference(&'tcx self) -> &'tcx Ty<'tcx> {
        match self.kind {
            TyKind::Reference(inner) => inner,
            _ => self,
        }
    }

    /// Whether a constant expression may be bound to a non-type parameter
    /// declared with this type.
    pub fn accepts_constant(&self) -> bool {
        self.is_integral()
    }

    /// Structural equivalence under the given qualifier mode.
    ///
    /// Reference-ness is resolved first, then cv-qualifiers, then the base
    /// structure; nested components always compare exactly.
    pub fn equivalent(&self, other: &Ty<'tcx>, mode: QualMode) -> bool {
        if let (TyKind::Reference(a), TyKind::Reference(b)) = (&self.kind, &other.kind) {
            return a.equivalent(b, QualMode::Exact);
        }
        if self.is_reference() != other.is_reference() {
            return false;
        }

        if mode == QualMode::Exact && self.quals != other.quals {
            return false;
        }

        match (&self.kind, &other.kind) {
            (TyKind::Builtin(a), TyKind::Builtin(b)) => a == b,
            (TyKind::Named(a), TyKind::Named(b)) => a == b,
            (TyKind::Param(a), TyKind::Param(b)) => a == b,
            (TyKind::Synthetic(a), TyKind::Synthetic(b)) => a == b,
            (TyKind::Pointer(a), TyKind::Pointer(b)) => a.equivalent(b, QualMode::Exact),
            (TyKind::Array(a, alen), TyKind::Array(b, blen)) => {
                alen == blen && a.equivalent(b, QualMode::Exact)
            }
            (
                TyKind::Function {
                    ret: ar,
                    params: ap,
                },
                TyKind::Function {
                    ret: br,
                    params: bp,
                },
            ) => {
                ar.equivalent(br, QualMode::Exact)
                    && ap.len() == bp.len()
                    && ap
                        .iter()
                        .zip(bp.iter())
                        .all(|(a, b)| a.equivalent(b, QualMode::Exact))
            }
            (
                TyKind::Spec {
                    primary: a,
                    args: aa,
                },
                TyKind::Spec {
                    primary: b,
                    args: ba,
                },
            ) => a == b && aa.len() == ba.len() && aa.iter().zip(ba.iter()).all(|(x, y)| x == y),
            // An error placeholder compares equal to nothing, itself included.
            (TyKind::Error, _) | (_, TyKind::Error) => false,
            _ => false,
        }
    }
}

impl<'tcx> PartialEq for Ty<'tcx> {
    fn eq(&self, other: &Self) -> bool {
        self.equivalent(other, QualMode::Exact)
    }
}
