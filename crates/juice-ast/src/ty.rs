// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Type expressions.

use crate::expr::Expr;
use crate::Span;

#[derive(Debug, Clone, PartialEq)]
pub struct TypeExpr {
    pub kind: TypeExprKind,
    pub span: Span,
}

impl TypeExpr {
    pub fn new(kind: TypeExprKind, span: Span) -> Self {
        Self { kind, span }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeExprKind {
    /// `string`, `int`, `float`, `list`, `unit`
    Builtin(BuiltinType),
    /// Value identifier used as a type
    Ident(String),
    /// Type identifier
    Named(String),
    /// Literal used as a type-level constant
    Literal(Box<Expr>),
    /// `Name(label: T, U)`
    Call {
        callee: String,
        callee_span: Span,
        args: Vec<TypeArg>,
    },
    /// `(A, B)`, at least two elements
    Tuple(Vec<TypeExpr>),
    /// `(A)`
    Group(Box<TypeExpr>),
    Binary {
        op: TypeOp,
        left: Box<TypeExpr>,
        right: Box<TypeExpr>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeArg {
    pub label: Option<String>,
    pub value: TypeExpr,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinType {
    String,
    Int,
    Float,
    List,
    Unit,
}

impl BuiltinType {
    pub fn from_name(name: &str) -> Option<BuiltinType> {
        Some(match name {
            "string" => BuiltinType::String,
            "int" => BuiltinType::Int,
            "float" => BuiltinType::Float,
            "list" => BuiltinType::List,
            "unit" => BuiltinType::Unit,
            _ => return None,
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            BuiltinType::String => "string",
            BuiltinType::Int => "int",
            BuiltinType::Float => "float",
            BuiltinType::List => "list",
            BuiltinType::Unit => "unit",
        }
    }
}

/// Type-level binary operators, both at level 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeOp {
    /// `|`
    Union,
    /// `&`
    Intersection,
}

impl TypeOp {
    pub fn symbol(self) -> &'static str {
        match self {
            TypeOp::Union => "|",
            TypeOp::Intersection => "&",
        }
    }
}
