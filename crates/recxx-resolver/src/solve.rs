//! Candidate selection among template specializations.

use recxx_core::limits::{
    MAX_FEASIBLE_SPECIALIZATIONS, MAX_TEMPLATE_ARGUMENTS, MAX_TEMPLATE_PARAMETERS,
};
use recxx_core::{
    CompileCtxt, SourceLoc, Symbol, TemplateArg, TemplateInfo, TplParamKind, ValueExpr,
};
use recxx_error::{Error, ErrorKind};

use crate::unify::{Substitution, Unifier};

/// A successful solve: the chosen candidate plus the bindings that made its
/// pattern match the supplied arguments.
#[derive(Debug, Clone)]
pub struct MatchedPair<'tcx> {
    pub entry: &'tcx Symbol<'tcx>,
    pub substitution: Substitution<'tcx>,
}

impl<'tcx> PartialEq for MatchedPair<'tcx> {
    fn eq(&self, other: &Self) -> bool {
        self.entry.id == other.entry.id && self.substitution == other.substitution
    }
}

/// Typed solve failure, carrying the competing candidates and arguments for
/// caller-side diagnostic formatting.
#[derive(Debug)]
pub enum SolveError<'tcx> {
    NoMatchingTemplate {
        candidates: Vec<&'tcx Symbol<'tcx>>,
        arguments: Vec<TemplateArg<'tcx>>,
        loc: SourceLoc,
    },
    AmbiguousTemplate {
        tied: Vec<&'tcx Symbol<'tcx>>,
        arguments: Vec<TemplateArg<'tcx>>,
        loc: SourceLoc,
    },
    TooManyFeasibleCandidates {
        limit: usize,
        loc: SourceLoc,
    },
    TooManyArguments {
        count: usize,
        loc: SourceLoc,
    },
    /// A fatal error surfaced while evaluating a candidate (for example the
    /// instantiation depth guard); it propagates unchanged.
    Fatal(Error),
}

impl<'tcx> SolveError<'tcx> {
    /// Render into the unified error type, with candidates, arguments, and
    /// location attached as context.
    pub fn into_error(self, cc: &CompileCtxt<'tcx>) -> Error {
        let names = |entries: &[&'tcx Symbol<'tcx>]| {
            entries
                .iter()
                .map(|s| {
                    cc.interner
                        .resolve_owned(s.name)
                        .unwrap_or_else(|| "<unknown>".to_string())
                })
                .collect::<Vec<_>>()
                .join(", ")
        };

        match self {
            SolveError::NoMatchingTemplate {
                candidates,
                arguments,
                loc,
            } => Error::new(
                ErrorKind::NoMatchingTemplate,
                "no template candidate matches the supplied arguments",
            )
            .with_operation("solve::solve")
            .with_context("candidates", names(&candidates))
            .with_context("arguments", arguments.len().to_string())
            .with_context("loc", cc.display_loc(loc)),
            SolveError::AmbiguousTemplate {
                tied,
                arguments,
                loc,
            } => Error::new(
                ErrorKind::AmbiguousTemplate,
                "no candidate is strictly more specialized than all others",
            )
            .with_operation("solve::solve")
            .with_context("tied", names(&tied))
            .with_context("arguments", arguments.len().to_string())
            .with_context("loc", cc.display_loc(loc)),
            SolveError::TooManyFeasibleCandidates { limit, loc } => Error::new(
                ErrorKind::TooManyFeasibleCandidates,
                format!("more than {} feasible specializations", limit),
            )
            .with_operation("solve::solve")
            .with_context("limit", limit.to_string())
            .with_context("loc", cc.display_loc(loc)),
            SolveError::TooManyArguments { count, loc } => Error::new(
                ErrorKind::TooManyArguments,
                format!("{} template arguments exceed the supported maximum", count),
            )
            .with_operation("solve::solve")
            .with_context("count", count.to_string())
            .with_context("loc", cc.display_loc(loc)),
            SolveError::Fatal(err) => err.with_operation("solve::solve"),
        }
    }
}

/// One feasible candidate with its fresh substitution and the pattern it
/// was matched with.
struct Feasible<'tcx> {
    entry: &'tcx Symbol<'tcx>,
    info: &'tcx TemplateInfo<'tcx>,
    pattern: Vec<TemplateArg<'tcx>>,
    substitution: Substitution<'tcx>,
}

/// Picks the template candidate whose pattern best matches an argument list.
///
/// Solving is query-only and idempotent: candidates are evaluated with fresh
/// substitutions and nothing in the context changes, so speculative solves
/// can be redone freely.
#[derive(Debug, Clone, Copy)]
pub struct TemplateSolver<'tcx> {
    cc: &'tcx CompileCtxt<'tcx>,
    unifier: Unifier<'tcx>,
}

impl<'tcx> TemplateSolver<'tcx> {
    pub fn new(cc: &'tcx CompileCtxt<'tcx>) -> Self {
        Self {
            cc,
            unifier: Unifier::new(cc),
        }
    }

    /// Select the best candidate for `arguments`.
    ///
    /// With `exact_match_required`, candidates only survive when re-applying
    /// their substitution to their pattern reproduces the supplied arguments
    /// exactly; this validates explicit specializations.
    pub fn solve(
        &self,
        candidates: &[&'tcx Symbol<'tcx>],
        arguments: &[TemplateArg<'tcx>],
        loc: SourceLoc,
        exact_match_required: bool,
    ) -> Result<MatchedPair<'tcx>, SolveError<'tcx>> {
        if arguments.len() > MAX_TEMPLATE_ARGUMENTS {
            return Err(SolveError::TooManyArguments {
                count: arguments.len(),
                loc,
            });
        }

        let mut feasible = Vec::new();
        for &candidate in candidates {
            match self.try_candidate(candidate, arguments) {
                Ok(Some(entry)) => {
                    feasible.push(entry);
                    if feasible.len() > MAX_FEASIBLE_SPECIALIZATIONS {
                        return Err(SolveError::TooManyFeasibleCandidates {
                            limit: MAX_FEASIBLE_SPECIALIZATIONS,
                            loc,
                        });
                    }
                }
                Ok(None) => {}
                Err(err) => return Err(SolveError::Fatal(err)),
            }
        }

        if exact_match_required {
            feasible.retain(|f| self.is_exact(f, arguments));
        }

        if feasible.is_empty() {
            return Err(SolveError::NoMatchingTemplate {
                candidates: candidates.to_vec(),
                arguments: arguments.to_vec(),
                loc,
            });
        }
        if feasible.len() == 1 {
            let chosen = feasible.remove(0);
            return Ok(MatchedPair {
                entry: chosen.entry,
                substitution: chosen.substitution,
            });
        }

        self.partial_order(feasible, arguments, loc)
    }

    /// Attempt one candidate with a fresh substitution. `Ok(None)` means the
    /// candidate is simply infeasible; fatal errors propagate.
    fn try_candidate(
        &self,
        candidate: &'tcx Symbol<'tcx>,
        arguments: &[TemplateArg<'tcx>],
    ) -> Result<Option<Feasible<'tcx>>, Error> {
        let info = candidate.template().ok_or_else(|| {
            Error::unexpected("solve candidate without template metadata")
                .with_operation("solve::try_candidate")
        })?;
        if info.params.len() > MAX_TEMPLATE_PARAMETERS {
            return Err(Error::new(
                ErrorKind::TooManyArguments,
                format!(
                    "{} template parameters exceed the supported maximum",
                    info.params.len()
                ),
            )
            .with_operation("solve::try_candidate"));
        }

        let pattern = self.pattern_of(info);
        let mut substitution = Substitution::new();
        match self
            .unifier
            .unify_args(&pattern, arguments, &info.params, &mut substitution)
        {
            Ok(()) => {
                tracing::trace!(
                    "candidate {} feasible with {} bindings",
                    candidate.id,
                    substitution.len()
                );
                Ok(Some(Feasible {
                    entry: candidate,
                    info,
                    pattern,
                    substitution,
                }))
            }
            Err(err) if err.is_fatal() => Err(err),
            Err(_) => Ok(None),
        }
    }

    /// A specialization matches with its declared argument pattern; a
    /// primary template matches with its bare parameter list.
    fn pattern_of(&self, info: &'tcx TemplateInfo<'tcx>) -> Vec<TemplateArg<'tcx>> {
        match &info.pattern {
            Some(pattern) => pattern.clone(),
            None => info
                .params
                .iter()
                .map(|p| match p.kind {
                    TplParamKind::Type => TemplateArg::Type(self.cc.param(p.id)),
                    TplParamKind::Value(_) => TemplateArg::Value(ValueExpr::Param(p.id)),
                })
                .collect(),
        }
    }

    /// Re-apply the substitution to the pattern and demand exact structural
    /// equality with the supplied arguments.
    fn is_exact(&self, feasible: &Feasible<'tcx>, arguments: &[TemplateArg<'tcx>]) -> bool {
        feasible
            .pattern
            .iter()
            .zip(arguments.iter())
            .all(|(pat, arg)| feasible.substitution.apply_arg(self.cc, pat) == *arg)
    }

    /// Standard partial ordering: the winner must be strictly more
    /// specialized than every other survivor pairwise.
    fn partial_order(
        &self,
        feasible: Vec<Feasible<'tcx>>,
        arguments: &[TemplateArg<'tcx>],
        loc: SourceLoc,
    ) -> Result<MatchedPair<'tcx>, SolveError<'tcx>> {
        let mut winner = None;
        for (i, a) in feasible.iter().enumerate() {
            let dominates = feasible
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .all(|(_, b)| self.more_specialized(a, b) && !self.more_specialized(b, a));
            if dominates {
                winner = Some(i);
                break;
            }
        }

        match winner {
            Some(i) => {
                let chosen = &feasible[i];
                Ok(MatchedPair {
                    entry: chosen.entry,
                    substitution: chosen.substitution.clone(),
                })
            }
            None => Err(SolveError::AmbiguousTemplate {
                tied: feasible.iter().map(|f| f.entry).collect(),
                arguments: arguments.to_vec(),
                loc,
            }),
        }
    }

    /// `a` is more specialized than `b` when `b`'s pattern accepts `a`'s
    /// pattern with `a`'s parameters frozen into unique synthetic types and
    /// constants. The strictness check (not vice versa) is done by the
    /// caller.
    fn more_specialized(&self, a: &Feasible<'tcx>, b: &Feasible<'tcx>) -> bool {
        let frozen = self.freeze(a);
        let as_arguments: Vec<TemplateArg<'tcx>> = a
            .pattern
            .iter()
            .map(|pat| frozen.apply_arg(self.cc, pat))
            .collect();

        let mut probe = Substitution::new();
        self.unifier
            .unify_args(&b.pattern, &as_arguments, &b.info.params, &mut probe)
            .is_ok()
    }

    /// Substitution mapping each of the candidate's parameters to a probe
    /// value no real argument can equal: synthetic types for type
    /// parameters, distinct sentinel constants for value parameters.
    fn freeze(&self, candidate: &Feasible<'tcx>) -> Substitution<'tcx> {
        let mut frozen = Substitution::new();
        for (ordinal, param) in candidate.info.params.iter().enumerate() {
            match param.kind {
                TplParamKind::Type => {
                    frozen.bind_type(param.id, self.cc.synthetic(ordinal as u32));
                }
                TplParamKind::Value(_) => {
                    frozen.bind_value(param.id, i64::MIN + ordinal as i64);
                }
            }
        }
        frozen
    }
}
