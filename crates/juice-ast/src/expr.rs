// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Expression AST nodes.

use crate::decl::FnDecl;
use crate::stmt::Block;
use crate::token::{Radix, Token, TokenKind};
use crate::ty::TypeExpr;
use crate::Span;

/// An expression in the AST.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// The kind of expression.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    /// Integer literal
    Int { value: u64, radix: Radix },
    /// Float literal
    Float(f64),
    /// String literal, possibly interpolated
    Str(StrLit),
    /// Boolean literal
    Bool(bool),
    /// Value identifier
    Ident(String),
    /// Type identifier used as a value
    TypeName(String),
    /// `[a, b, c]`
    List(Vec<Expr>),
    /// `{ a = 1, b }`
    Record(Vec<RecordField>),
    /// `(a, b)`, at least two elements
    Tuple(Vec<Expr>),
    /// `(a)`
    Group(Box<Expr>),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Postfix `?`
    Try(Box<Expr>),
    /// `object.member`; the member is any atom.
    Member {
        object: Box<Expr>,
        member: Box<Expr>,
    },
    /// `base::member`
    TypeAccess {
        base: Box<Expr>,
        member: Box<Expr>,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Arg>,
    },
    MacroCall(MacroCall),
    /// Anonymous (or named) function used as a value
    Fn(Box<FnDecl>),
    If {
        cond: Box<Expr>,
        then_block: Block,
        /// Either another `If` or a `Block`.
        else_branch: Option<Box<Expr>>,
    },
    Match {
        scrutinee: Box<Expr>,
        arms: Vec<MatchArm>,
    },
    Block(Block),
}

/// A call or macro argument with an optional `label:` prefix.
#[derive(Debug, Clone, PartialEq)]
pub struct Arg {
    pub label: Option<String>,
    pub value: Expr,
    pub span: Span,
}

/// A record literal field. `value` is `None` for shorthand fields.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordField {
    pub name: String,
    pub value: Option<Expr>,
    pub span: Span,
}

/// A macro invocation `name!(args)`, `name!{ body }` or `name!(args){ body }`.
#[derive(Debug, Clone, PartialEq)]
pub struct MacroCall {
    pub name: String,
    pub name_span: Span,
    /// Written with a parenthesised argument list (possibly empty).
    pub parenthesized: bool,
    pub args: Vec<Arg>,
    pub body: Option<MacroBody>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacroForm {
    Args,
    Body,
    ArgsWithBody,
}

impl MacroCall {
    pub fn form(&self) -> MacroForm {
        match (self.parenthesized, self.body.is_some()) {
            (true, true) => MacroForm::ArgsWithBody,
            (false, _) => MacroForm::Body,
            (true, false) => MacroForm::Args,
        }
    }
}

/// Opaque brace-delimited macro body. Never parsed; kept for later expansion.
#[derive(Debug, Clone, PartialEq)]
pub struct MacroBody {
    /// Span including the braces.
    pub span: Span,
    /// Span between the braces.
    pub inner: Span,
    /// Source text between the braces, trimmed.
    pub text: String,
    /// Flat tokens between the braces.
    pub tokens: Vec<Token>,
}

/// A string literal after escape and interpolation processing.
#[derive(Debug, Clone, PartialEq)]
pub struct StrLit {
    pub segments: Vec<StrSegment>,
    pub layout: StrLayout,
}

impl StrLit {
    /// The literal's value if it has no interpolations.
    pub fn as_plain(&self) -> Option<String> {
        let mut out = String::new();
        for seg in &self.segments {
            match &seg.kind {
                StrSegmentKind::Text(text) => out.push_str(text),
                StrSegmentKind::Escape { value, .. } => out.push(*value),
                StrSegmentKind::Interpolation(_) => return None,
            }
        }
        Some(out)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StrSegment {
    pub kind: StrSegmentKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StrSegmentKind {
    Text(String),
    /// `raw` is the escape as written, including the backslash.
    Escape { value: char, raw: String },
    Interpolation(Box<Expr>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum StrLayout {
    Inline,
    /// Spans of the stripped `| ` markers, one per marked line.
    MultiLine { markers: Vec<Span> },
}

/// A match arm: `pattern -> body`.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchArm {
    pub pattern: MatchPattern,
    /// A block, or a record literal when the block reading failed.
    pub body: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MatchPattern {
    Value(Expr),
    Type(TypeExpr),
}

impl MatchPattern {
    pub fn span(&self) -> Span {
        match self {
            MatchPattern::Value(e) => e.span,
            MatchPattern::Type(t) => t.span,
        }
    }
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    // Level 1
    Add,
    Sub,
    BitAnd,
    BitOr,
    BitXor,
    Mod,
    And,
    Or,
    // Level 2
    Mul,
    Div,
    Pow,
    // Level 3
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    // Level 4
    Shl,
    Shr,
}

impl BinOp {
    pub const MIN_LEVEL: u8 = 1;
    pub const MAX_LEVEL: u8 = 4;

    pub fn from_token(kind: &TokenKind) -> Option<BinOp> {
        Some(match kind {
            TokenKind::Plus => BinOp::Add,
            TokenKind::Minus => BinOp::Sub,
            TokenKind::Amp => BinOp::BitAnd,
            TokenKind::Pipe => BinOp::BitOr,
            TokenKind::Caret => BinOp::BitXor,
            TokenKind::Percent => BinOp::Mod,
            TokenKind::AmpAmp => BinOp::And,
            TokenKind::PipePipe => BinOp::Or,
            TokenKind::Star => BinOp::Mul,
            TokenKind::Slash => BinOp::Div,
            TokenKind::StarStar => BinOp::Pow,
            TokenKind::EqEq => BinOp::Eq,
            TokenKind::BangEq => BinOp::Ne,
            TokenKind::Lt => BinOp::Lt,
            TokenKind::Gt => BinOp::Gt,
            TokenKind::LtEq => BinOp::Le,
            TokenKind::GtEq => BinOp::Ge,
            TokenKind::Shl => BinOp::Shl,
            TokenKind::Shr => BinOp::Shr,
            _ => return None,
        })
    }

    /// Binding strength; higher binds tighter.
    pub fn level(self) -> u8 {
        match self {
            BinOp::Add
            | BinOp::Sub
            | BinOp::BitAnd
            | BinOp::BitOr
            | BinOp::BitXor
            | BinOp::Mod
            | BinOp::And
            | BinOp::Or => 1,
            BinOp::Mul | BinOp::Div | BinOp::Pow => 2,
            BinOp::Eq | BinOp::Ne | BinOp::Lt | BinOp::Gt | BinOp::Le | BinOp::Ge => 3,
            BinOp::Shl | BinOp::Shr => 4,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::BitAnd => "&",
            BinOp::BitOr => "|",
            BinOp::BitXor => "^",
            BinOp::Mod => "%",
            BinOp::And => "&&",
            BinOp::Or => "||",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Pow => "**",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::Lt => "<",
            BinOp::Gt => ">",
            BinOp::Le => "<=",
            BinOp::Ge => ">=",
            BinOp::Shl => "<<",
            BinOp::Shr => ">>",
        }
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// Logical not (!)
    Not,
    /// Negation (-)
    Neg,
}

impl UnaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Not => "!",
            UnaryOp::Neg => "-",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shift_binds_tighter_than_plus() {
        assert!(BinOp::Shl.level() > BinOp::Add.level());
        assert!(BinOp::Eq.level() > BinOp::Mul.level());
        assert_eq!(BinOp::from_token(&TokenKind::StarStar), Some(BinOp::Pow));
        assert_eq!(BinOp::from_token(&TokenKind::Eq), None);
    }

    #[test]
    fn plain_string_value() {
        let lit = StrLit {
            segments: vec![
                StrSegment { kind: StrSegmentKind::Text("a".into()), span: Span::new(1, 2) },
                StrSegment {
                    kind: StrSegmentKind::Escape { value: '\n', raw: "\\n".into() },
                    span: Span::new(2, 4),
                },
            ],
            layout: StrLayout::Inline,
        };
        assert_eq!(lit.as_plain().as_deref(), Some("a\n"));
    }
}
