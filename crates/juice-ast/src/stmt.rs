// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Statement AST nodes.

use crate::decl::FnDecl;
use crate::expr::Expr;
use crate::ty::TypeExpr;
use crate::Span;

/// A statement in the AST.
#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

/// The kind of statement.
#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    /// `name := value` or `name: Type = value`
    VarDecl(VarDecl),
    /// `name = value`
    Assign(Assign),
    Fn(FnDecl),
    For(ForLoop),
    Return(Option<Expr>),
    Break,
    Continue,
    Block(Block),
    /// Expression statement (calls, macro calls, if, match, ...)
    Expr(Expr),
}

/// A brace-delimited statement list.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VarDecl {
    pub name: String,
    pub name_span: Span,
    pub ty: Option<TypeExpr>,
    pub value: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Assign {
    pub name: String,
    pub name_span: Span,
    pub value: Expr,
}

/// `for { }`, `for iter { }` or `for x of iter { }`.
#[derive(Debug, Clone, PartialEq)]
pub struct ForLoop {
    pub binding: Option<String>,
    pub iter: Option<ForIter>,
    pub body: Block,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ForIter {
    Expr(Expr),
    /// `start..end`
    Range { start: Expr, end: Expr },
}
