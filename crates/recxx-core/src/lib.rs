//! Core data model for the recxx frontend: interning, arena allocation,
//! the parser-boundary AST, the type model, symbols, scopes, and the
//! compilation context that ties them together.

pub mod arena;
pub mod ast;
pub mod context;
pub mod interner;
pub mod limits;
pub mod loc;
pub mod scope;
pub mod symbol;
pub mod ty;

pub use ast::{AstBuilder, AstKind, AstNode};
pub use context::{Arena, CompileCtxt};
pub use interner::{InternPool, InternedStr};
pub use loc::SourceLoc;
pub use scope::{Scope, ScopeId};
pub use symbol::{SymId, SymKind, Symbol, TemplateInfo, TplParam, TplParamKind};
pub use ty::{BuiltinTy, CvQuals, QualMode, TemplateArg, TplParamId, Ty, TyKind, ValueExpr};
