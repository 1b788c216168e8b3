// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Declaration AST nodes.

use crate::stmt::{Assign, Block, VarDecl};
use crate::ty::TypeExpr;
use crate::Span;

/// A whole compilation unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    /// The `#!` line, if the source starts with one.
    pub shebang: Option<Span>,
    pub items: Vec<Item>,
    /// Always the full source range.
    pub span: Span,
}

/// A root-level statement.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub kind: ItemKind,
    /// Prefixed with `export`.
    pub exported: bool,
    pub span: Span,
}

/// The closed set of root statements.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemKind {
    Import(ImportDecl),
    Fn(FnDecl),
    Type(TypeDecl),
    VarDecl(VarDecl),
    Assign(Assign),
    Impl(ImplDecl),
}

/// `[foreign] import [.]a.b.c [as alias] [(x, y!)]`
#[derive(Debug, Clone, PartialEq)]
pub struct ImportDecl {
    pub foreign: bool,
    /// Path written with a leading `.`.
    pub relative: bool,
    pub path: Vec<String>,
    pub alias: Option<String>,
    pub expose: Vec<Exposed>,
}

/// A name in an import's expose list.
#[derive(Debug, Clone, PartialEq)]
pub struct Exposed {
    pub name: String,
    pub is_macro: bool,
    pub span: Span,
}

/// `[static] fn [name] [(params)] [-> T] { body }`
#[derive(Debug, Clone, PartialEq)]
pub struct FnDecl {
    pub is_static: bool,
    /// `None` for anonymous functions.
    pub name: Option<FnName>,
    pub params: Vec<Param>,
    pub ret_ty: Option<TypeExpr>,
    pub body: Block,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FnName {
    pub name: String,
    /// Declared as `name!`.
    pub is_macro: bool,
    pub span: Span,
}

/// A function or constructor parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub ty: Option<TypeExpr>,
    pub span: Span,
}

/// `[type] Name [(params)] := body`
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDecl {
    /// Written with the `type` keyword.
    pub has_keyword: bool,
    pub name: String,
    pub name_span: Span,
    pub params: Vec<TypeParam>,
    pub body: TypeBody,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeParam {
    pub name: String,
    pub ty: Option<TypeExpr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeBody {
    Alias(TypeExpr),
    Constructors(TypeConstructors),
}

/// A constructors block. All items share one style.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeConstructors {
    /// `{ field: Type ... }`
    Shorthand(Vec<FieldShorthand>),
    /// `{ Name(params) ... }`
    Full(Vec<Constructor>),
}

impl TypeConstructors {
    pub fn len(&self) -> usize {
        match self {
            TypeConstructors::Shorthand(fields) => fields.len(),
            TypeConstructors::Full(ctors) => ctors.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldShorthand {
    pub name: String,
    pub ty: TypeExpr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Constructor {
    pub name: String,
    pub params: Vec<Param>,
    pub span: Span,
}

/// `impl T for U { fns }` or `impl T { fns }`
#[derive(Debug, Clone, PartialEq)]
pub struct ImplDecl {
    /// The `T` of `impl T for U`.
    pub trait_ty: Option<TypeExpr>,
    pub self_ty: TypeExpr,
    pub fns: Vec<FnDecl>,
}
