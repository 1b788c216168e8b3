// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Token definitions for the lexer.

use crate::Span;

/// A token produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// Base of an integer literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Radix {
    Decimal,
    Binary,
    Octal,
    Hex,
}

impl Radix {
    pub fn base(self) -> u32 {
        match self {
            Radix::Decimal => 10,
            Radix::Binary => 2,
            Radix::Octal => 8,
            Radix::Hex => 16,
        }
    }

    pub fn prefix(self) -> &'static str {
        match self {
            Radix::Decimal => "",
            Radix::Binary => "0b",
            Radix::Octal => "0o",
            Radix::Hex => "0x",
        }
    }
}

/// A string literal as split by the string-content sub-lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct StrToken {
    /// Body started with a line break, so indentation markers apply.
    pub multiline: bool,
    pub pieces: Vec<StrPiece>,
}

/// One piece of a string body.
#[derive(Debug, Clone, PartialEq)]
pub enum StrPiece {
    /// Ordinary characters, copied verbatim.
    Text { text: String, span: Span },
    /// A backslash escape and the character it denotes.
    Escape { value: char, span: Span },
    /// `${ ... }`; `tokens` is the re-lexed inner source, ending in `Eof`.
    Interpolation { tokens: Vec<Token>, span: Span },
    /// A stripped `| ` line marker in a multi-line string.
    Indent { span: Span },
}

impl StrPiece {
    pub fn span(&self) -> Span {
        match self {
            StrPiece::Text { span, .. }
            | StrPiece::Escape { span, .. }
            | StrPiece::Interpolation { span, .. }
            | StrPiece::Indent { span } => *span,
        }
    }
}

/// The kind of token.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Literals
    Int { value: u64, radix: Radix },
    Float(f64),
    Str(StrToken),
    Bool(bool),

    // Names
    Ident(String),
    TypeIdent(String),
    /// `name!`, stored without the bang.
    MacroIdent(String),

    // Keywords
    Fn,
    Import,
    Foreign,
    As,
    If,
    Else,
    For,
    Of,
    Match,
    Return,
    Static,
    Type,
    Impl,
    Export,
    Break,
    Continue,
    Loop,
    Await,

    // Operators
    Plus,
    Minus,
    Star,
    StarStar,
    Slash,
    Percent,
    Amp,
    AmpAmp,
    Pipe,
    PipePipe,
    Caret,
    EqEq,
    BangEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
    Shl,
    Shr,
    Bang,
    Question,
    Eq,
    ColonEq,
    Colon,
    ColonColon,
    Dot,
    DotDot,
    Arrow,
    Comma,

    // Delimiters
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,

    Eof,
}

impl TokenKind {
    /// Human-readable name for error messages.
    pub fn display_name(&self) -> &'static str {
        match self {
            TokenKind::Int { .. } | TokenKind::Float(_) => "a number",
            TokenKind::Str(_) => "a string",
            TokenKind::Bool(_) => "'true' or 'false'",

            TokenKind::Ident(_) => "a name",
            TokenKind::TypeIdent(_) => "a type name",
            TokenKind::MacroIdent(_) => "a macro name",

            TokenKind::Fn => "'fn'",
            TokenKind::Import => "'import'",
            TokenKind::Foreign => "'foreign'",
            TokenKind::As => "'as'",
            TokenKind::If => "'if'",
            TokenKind::Else => "'else'",
            TokenKind::For => "'for'",
            TokenKind::Of => "'of'",
            TokenKind::Match => "'match'",
            TokenKind::Return => "'return'",
            TokenKind::Static => "'static'",
            TokenKind::Type => "'type'",
            TokenKind::Impl => "'impl'",
            TokenKind::Export => "'export'",
            TokenKind::Break => "'break'",
            TokenKind::Continue => "'continue'",
            TokenKind::Loop => "'loop'",
            TokenKind::Await => "'await'",

            TokenKind::Plus => "'+'",
            TokenKind::Minus => "'-'",
            TokenKind::Star => "'*'",
            TokenKind::StarStar => "'**'",
            TokenKind::Slash => "'/'",
            TokenKind::Percent => "'%'",
            TokenKind::Amp => "'&'",
            TokenKind::AmpAmp => "'&&'",
            TokenKind::Pipe => "'|'",
            TokenKind::PipePipe => "'||'",
            TokenKind::Caret => "'^'",
            TokenKind::EqEq => "'=='",
            TokenKind::BangEq => "'!='",
            TokenKind::Lt => "'<'",
            TokenKind::Gt => "'>'",
            TokenKind::LtEq => "'<='",
            TokenKind::GtEq => "'>='",
            TokenKind::Shl => "'<<'",
            TokenKind::Shr => "'>>'",
            TokenKind::Bang => "'!'",
            TokenKind::Question => "'?'",
            TokenKind::Eq => "'='",
            TokenKind::ColonEq => "':='",
            TokenKind::Colon => "':'",
            TokenKind::ColonColon => "'::'",
            TokenKind::Dot => "'.'",
            TokenKind::DotDot => "'..'",
            TokenKind::Arrow => "'->'",
            TokenKind::Comma => "','",

            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::LBracket => "'['",
            TokenKind::RBracket => "']'",

            TokenKind::Eof => "end of file",
        }
    }

    /// Keywords that begin a root-level statement. Recovery resumes at these.
    pub fn starts_root_statement(&self) -> bool {
        matches!(
            self,
            TokenKind::Fn
                | TokenKind::Static
                | TokenKind::Type
                | TokenKind::Impl
                | TokenKind::Import
                | TokenKind::Foreign
                | TokenKind::Export
        )
    }

    /// Keywords that begin a statement inside a body.
    pub fn starts_block_statement(&self) -> bool {
        self.starts_root_statement()
            || matches!(
                self,
                TokenKind::Return
                    | TokenKind::Break
                    | TokenKind::Continue
                    | TokenKind::For
                    | TokenKind::If
                    | TokenKind::Match
            )
    }

    pub fn is_keyword(&self) -> bool {
        matches!(
            self,
            TokenKind::Fn
                | TokenKind::Import
                | TokenKind::Foreign
                | TokenKind::As
                | TokenKind::If
                | TokenKind::Else
                | TokenKind::For
                | TokenKind::Of
                | TokenKind::Match
                | TokenKind::Return
                | TokenKind::Static
                | TokenKind::Type
                | TokenKind::Impl
                | TokenKind::Export
                | TokenKind::Break
                | TokenKind::Continue
                | TokenKind::Loop
                | TokenKind::Await
        )
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenKind::Ident(name) | TokenKind::TypeIdent(name) => write!(f, "'{name}'"),
            TokenKind::MacroIdent(name) => write!(f, "'{name}!'"),
            TokenKind::Int { value, .. } => write!(f, "'{value}'"),
            other => f.write_str(other.display_name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_show_their_text() {
        assert_eq!(TokenKind::Ident("foo".into()).to_string(), "'foo'");
        assert_eq!(TokenKind::MacroIdent("dbg".into()).to_string(), "'dbg!'");
        assert_eq!(TokenKind::ColonEq.to_string(), "':='");
        assert_eq!(TokenKind::Eof.to_string(), "end of file");
    }

    #[test]
    fn recovery_keywords() {
        assert!(TokenKind::Foreign.starts_root_statement());
        assert!(!TokenKind::Return.starts_root_statement());
        assert!(TokenKind::Return.starts_block_statement());
        assert!(TokenKind::Await.is_keyword());
    }
}
