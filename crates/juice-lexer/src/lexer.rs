// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! The lexer implementation using logos.

use juice_ast::token::{Radix, Token, TokenKind};
use juice_ast::trivia::Comment;
use juice_ast::Span;
use logos::Logos;
use tracing::{debug, trace};

use crate::error::LexError;
use crate::string::{self, StrEnd};

/// Whether an identifier was directly followed by `!`.
#[derive(Debug, Clone, Copy, PartialEq)]
enum IdentShape {
    Plain,
    Macro,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum NumberShape {
    Int,
    Float,
}

/// Raw token type for logos - we parse values in a second pass.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
enum RawToken {
    // === Keywords ===
    #[token("fn")]
    Fn,
    #[token("import")]
    Import,
    #[token("foreign")]
    Foreign,
    #[token("as")]
    As,
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("for")]
    For,
    #[token("of")]
    Of,
    #[token("match")]
    Match,
    #[token("return")]
    Return,
    #[token("static")]
    Static,
    #[token("type")]
    Type,
    #[token("impl")]
    Impl,
    #[token("export")]
    Export,
    #[token("break")]
    Break,
    #[token("continue")]
    Continue,
    #[token("loop")]
    Loop,
    #[token("await")]
    Await,
    #[token("true")]
    True,
    #[token("false")]
    False,

    // === Operators ===
    #[token("**")]
    StarStar,
    #[token("&&")]
    AmpAmp,
    #[token("||")]
    PipePipe,
    #[token("==")]
    EqEq,
    #[token("!=")]
    BangEq,
    #[token("<=")]
    LtEq,
    #[token(">=")]
    GtEq,
    #[token("<<")]
    Shl,
    #[token(">>")]
    Shr,
    #[token(":=")]
    ColonEq,
    #[token("::")]
    ColonColon,
    #[token("..")]
    DotDot,
    #[token("->")]
    Arrow,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("&")]
    Amp,
    #[token("|")]
    Pipe,
    #[token("^")]
    Caret,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("!")]
    Bang,
    #[token("?")]
    Question,
    #[token("=")]
    Eq,
    #[token(":")]
    Colon,
    #[token(".")]
    Dot,
    #[token(",")]
    Comma,

    // === Delimiters ===
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,

    // === Trivia ===
    #[regex(r"//[^\n]*")]
    Comment,

    // === Literals ===
    // Prefixed integers take any alphanumerics so bad digits are reported
    // as one malformed number instead of a number followed by a name.
    #[regex(r"0x[0-9A-Za-z_]*")]
    HexInt,
    #[regex(r"0b[0-9A-Za-z_]*")]
    BinInt,
    #[regex(r"0o[0-9A-Za-z_]*")]
    OctInt,
    #[regex(r"[0-9][0-9_]*", decimal)]
    Decimal(NumberShape),

    #[token("\"", string_literal)]
    Str(StrEnd),

    // === Names (must come after keywords) ===
    #[regex(r"[a-z_][a-z0-9_]*", ident)]
    Ident(IdentShape),
    #[regex(r"[A-Z][A-Za-z0-9_]*")]
    TypeIdent,
}

/// Extend a decimal into a float when a single `.` follows. `1..2` stays an int.
fn decimal(lex: &mut logos::Lexer<RawToken>) -> NumberShape {
    let rest = lex.remainder().as_bytes();
    if rest.first() != Some(&b'.') || rest.get(1) == Some(&b'.') {
        return NumberShape::Int;
    }
    let fraction = rest[1..]
        .iter()
        .take_while(|b| b.is_ascii_digit() || **b == b'_')
        .count();
    lex.bump(1 + fraction);
    NumberShape::Float
}

/// Absorb a directly following `!` (but not `!=`) into a macro name.
fn ident(lex: &mut logos::Lexer<RawToken>) -> IdentShape {
    let rest = lex.remainder().as_bytes();
    if rest.first() == Some(&b'!') && rest.get(1) != Some(&b'=') {
        lex.bump(1);
        IdentShape::Macro
    } else {
        IdentShape::Plain
    }
}

fn string_literal(lex: &mut logos::Lexer<RawToken>) -> StrEnd {
    let (len, end) = string::scan(lex.remainder());
    lex.bump(len);
    end
}

/// Maximum number of errors to collect before stopping.
pub const MAX_ERRORS: usize = 20;

/// Maximum nesting of `${ }` interpolations inside strings.
pub const MAX_INTERPOLATION_DEPTH: usize = 64;

/// The lexer for Juice source code.
pub struct Lexer<'a> {
    source: &'a str,
    /// Absolute offset of `source` in the whole document.
    base: usize,
    /// Interpolation nesting level; 0 for the document itself.
    depth: usize,
    errors: Vec<LexError>,
    comments: Vec<Comment>,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given source code.
    pub fn new(source: &'a str) -> Self {
        Self::nested(source, 0, 0)
    }

    /// Lexer for a fragment starting at absolute offset `base`.
    pub(crate) fn nested(source: &'a str, base: usize, depth: usize) -> Self {
        Self {
            source,
            base,
            depth,
            errors: Vec::new(),
            comments: Vec::new(),
        }
    }

    /// Tokenize the entire source, collecting multiple errors.
    pub fn tokenize(&mut self) -> LexResult {
        if self.depth == 0 {
            debug!(len = self.source.len(), "tokenize");
        }
        let mut tokens = Vec::new();
        let mut shebang = None;
        let mut logos_lexer = RawToken::lexer(self.source);

        if self.depth == 0 && self.source.starts_with("#!") {
            let len = self.source.find('\n').unwrap_or(self.source.len());
            logos_lexer.bump(len);
            shebang = Some(Span::new(0, len));
        }

        while let Some(result) = logos_lexer.next() {
            let range = logos_lexer.span();
            let slice = logos_lexer.slice();
            let span = Span::new(range.start, range.end).offset(self.base);

            let kind = match result {
                Ok(RawToken::Comment) => {
                    self.comments.push(Comment {
                        span,
                        text: slice.trim_end_matches('\r').to_string(),
                    });
                    continue;
                }
                Ok(raw) => self.convert_token(raw, slice, span),
                Err(()) => {
                    let ch = self
                        .source
                        .get(range.start..)
                        .and_then(|rest| rest.chars().next())
                        .unwrap_or('?');
                    // Never resume inside a multi-byte character
                    let ch_end = range.start + ch.len_utf8();
                    if range.end < ch_end {
                        logos_lexer.bump(ch_end - range.end);
                    }
                    self.errors
                        .push(LexError::unexpected_char(ch, self.base + range.start));
                    continue;
                }
            };

            tokens.push(Token::new(kind, span));
        }

        let end = self.base + self.source.len();
        tokens.push(Token::new(TokenKind::Eof, Span::point(end)));

        // The token stream stays complete; only the error list is capped.
        if self.errors.len() > MAX_ERRORS {
            trace!(dropped = self.errors.len() - MAX_ERRORS, "error limit reached");
            self.errors.truncate(MAX_ERRORS);
        }

        trace!(
            tokens = tokens.len(),
            errors = self.errors.len(),
            depth = self.depth,
            "tokenized"
        );
        LexResult {
            tokens,
            comments: std::mem::take(&mut self.comments),
            shebang,
            errors: std::mem::take(&mut self.errors),
        }
    }

    /// Convert a raw logos token to our TokenKind, parsing literals.
    fn convert_token(&mut self, raw: RawToken, slice: &str, span: Span) -> TokenKind {
        match raw {
            // Keywords
            RawToken::Fn => TokenKind::Fn,
            RawToken::Import => TokenKind::Import,
            RawToken::Foreign => TokenKind::Foreign,
            RawToken::As => TokenKind::As,
            RawToken::If => TokenKind::If,
            RawToken::Else => TokenKind::Else,
            RawToken::For => TokenKind::For,
            RawToken::Of => TokenKind::Of,
            RawToken::Match => TokenKind::Match,
            RawToken::Return => TokenKind::Return,
            RawToken::Static => TokenKind::Static,
            RawToken::Type => TokenKind::Type,
            RawToken::Impl => TokenKind::Impl,
            RawToken::Export => TokenKind::Export,
            RawToken::Break => TokenKind::Break,
            RawToken::Continue => TokenKind::Continue,
            RawToken::Loop => TokenKind::Loop,
            RawToken::Await => TokenKind::Await,
            RawToken::True => TokenKind::Bool(true),
            RawToken::False => TokenKind::Bool(false),

            // Operators
            RawToken::StarStar => TokenKind::StarStar,
            RawToken::AmpAmp => TokenKind::AmpAmp,
            RawToken::PipePipe => TokenKind::PipePipe,
            RawToken::EqEq => TokenKind::EqEq,
            RawToken::BangEq => TokenKind::BangEq,
            RawToken::LtEq => TokenKind::LtEq,
            RawToken::GtEq => TokenKind::GtEq,
            RawToken::Shl => TokenKind::Shl,
            RawToken::Shr => TokenKind::Shr,
            RawToken::ColonEq => TokenKind::ColonEq,
            RawToken::ColonColon => TokenKind::ColonColon,
            RawToken::DotDot => TokenKind::DotDot,
            RawToken::Arrow => TokenKind::Arrow,
            RawToken::Plus => TokenKind::Plus,
            RawToken::Minus => TokenKind::Minus,
            RawToken::Star => TokenKind::Star,
            RawToken::Slash => TokenKind::Slash,
            RawToken::Percent => TokenKind::Percent,
            RawToken::Amp => TokenKind::Amp,
            RawToken::Pipe => TokenKind::Pipe,
            RawToken::Caret => TokenKind::Caret,
            RawToken::Lt => TokenKind::Lt,
            RawToken::Gt => TokenKind::Gt,
            RawToken::Bang => TokenKind::Bang,
            RawToken::Question => TokenKind::Question,
            RawToken::Eq => TokenKind::Eq,
            RawToken::Colon => TokenKind::Colon,
            RawToken::Dot => TokenKind::Dot,
            RawToken::Comma => TokenKind::Comma,

            // Delimiters
            RawToken::LParen => TokenKind::LParen,
            RawToken::RParen => TokenKind::RParen,
            RawToken::LBrace => TokenKind::LBrace,
            RawToken::RBrace => TokenKind::RBrace,
            RawToken::LBracket => TokenKind::LBracket,
            RawToken::RBracket => TokenKind::RBracket,

            // Literals - validate and parse the values
            RawToken::HexInt => self.int_literal(slice, Radix::Hex, span),
            RawToken::BinInt => self.int_literal(slice, Radix::Binary, span),
            RawToken::OctInt => self.int_literal(slice, Radix::Octal, span),
            RawToken::Decimal(NumberShape::Int) => self.int_literal(slice, Radix::Decimal, span),
            RawToken::Decimal(NumberShape::Float) => self.float_literal(slice, span),
            RawToken::Str(end) => self.string_literal(slice, end, span),

            RawToken::Ident(IdentShape::Plain) => TokenKind::Ident(slice.to_string()),
            RawToken::Ident(IdentShape::Macro) => {
                TokenKind::MacroIdent(slice[..slice.len() - 1].to_string())
            }
            RawToken::TypeIdent => TokenKind::TypeIdent(slice.to_string()),

            RawToken::Comment => unreachable!("comments are split off before conversion"),
        }
    }

    fn int_literal(&mut self, slice: &str, radix: Radix, span: Span) -> TokenKind {
        let digits = &slice[radix.prefix().len()..];
        if let Err(hint) = check_digits(digits, radix, false) {
            self.errors.push(LexError::malformed_number(slice, span, hint));
            return TokenKind::Int { value: 0, radix };
        }
        let cleaned: String = digits.chars().filter(|c| *c != '_').collect();
        match u64::from_str_radix(&cleaned, radix.base()) {
            Ok(value) => TokenKind::Int { value, radix },
            Err(_) => {
                self.errors.push(LexError::number_overflow(slice, span));
                TokenKind::Int { value: 0, radix }
            }
        }
    }

    fn float_literal(&mut self, slice: &str, span: Span) -> TokenKind {
        let (whole, fraction) = slice.split_once('.').unwrap_or((slice, ""));
        let checked = check_digits(whole, Radix::Decimal, false)
            .and_then(|()| check_digits(fraction, Radix::Decimal, true));
        if let Err(hint) = checked {
            self.errors.push(LexError::malformed_number(slice, span, hint));
            return TokenKind::Float(0.0);
        }
        let mut cleaned: String = slice.chars().filter(|c| *c != '_').collect();
        if fraction.is_empty() {
            cleaned.push('0');
        }
        TokenKind::Float(cleaned.parse().unwrap_or(0.0))
    }

    fn string_literal(&mut self, slice: &str, end: StrEnd, span: Span) -> TokenKind {
        let body = match end {
            StrEnd::Closed => &slice[1..slice.len() - 1],
            StrEnd::Open => {
                self.errors
                    .push(LexError::unterminated_string(span.start, span.end));
                &slice[1..]
            }
        };
        let split = string::split(body, span.start + 1, self.depth);
        self.errors.extend(split.errors);
        self.comments.extend(split.comments);
        TokenKind::Str(split.token)
    }
}

/// Underscores may only separate digits, and every digit must fit the radix.
fn check_digits(digits: &str, radix: Radix, allow_empty: bool) -> Result<(), &'static str> {
    if digits.is_empty() {
        return if allow_empty {
            Ok(())
        } else {
            Err("expected digits after the prefix")
        };
    }
    if digits.starts_with('_') || digits.ends_with('_') || digits.contains("__") {
        return Err("'_' may only appear between two digits");
    }
    if digits
        .chars()
        .any(|c| c != '_' && !c.is_digit(radix.base()))
    {
        return Err(match radix {
            Radix::Binary => "binary digits are 0 and 1",
            Radix::Octal => "octal digits are 0 to 7",
            Radix::Hex => "hex digits are 0-9 and a-f",
            Radix::Decimal => "decimal digits are 0 to 9",
        });
    }
    Ok(())
}

/// Result of lexing: tokens plus any errors found.
#[derive(Debug, Clone)]
pub struct LexResult {
    /// Always ends with `Eof`.
    pub tokens: Vec<Token>,
    pub comments: Vec<Comment>,
    pub shebang: Option<Span>,
    pub errors: Vec<LexError>,
}

impl LexResult {
    /// Returns true if lexing completed without errors.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LexErrorKind;
    use pretty_assertions::assert_eq;

    fn kinds(source: &str) -> Vec<TokenKind> {
        let result = Lexer::new(source).tokenize();
        assert!(result.is_ok(), "unexpected errors: {:?}", result.errors);
        result
            .tokens
            .into_iter()
            .map(|t| t.kind)
            .filter(|k| *k != TokenKind::Eof)
            .collect()
    }

    fn ident(name: &str) -> TokenKind {
        TokenKind::Ident(name.to_string())
    }

    fn int(value: u64, radix: Radix) -> TokenKind {
        TokenKind::Int { value, radix }
    }

    #[test]
    fn names_and_macros() {
        assert_eq!(
            kinds("fn foo Bar baz! a!=b"),
            vec![
                TokenKind::Fn,
                ident("foo"),
                TokenKind::TypeIdent("Bar".to_string()),
                TokenKind::MacroIdent("baz".to_string()),
                ident("a"),
                TokenKind::BangEq,
                ident("b"),
            ]
        );
    }

    #[test]
    fn keywords_need_whole_words() {
        assert_eq!(kinds("format iffy of"), vec![ident("format"), ident("iffy"), TokenKind::Of]);
        assert_eq!(kinds("true false"), vec![TokenKind::Bool(true), TokenKind::Bool(false)]);
    }

    #[test]
    fn operators_longest_match() {
        assert_eq!(
            kinds("a:=b :: c ** d -> e << f"),
            vec![
                ident("a"),
                TokenKind::ColonEq,
                ident("b"),
                TokenKind::ColonColon,
                ident("c"),
                TokenKind::StarStar,
                ident("d"),
                TokenKind::Arrow,
                ident("e"),
                TokenKind::Shl,
                ident("f"),
            ]
        );
    }

    #[test]
    fn numbers() {
        assert_eq!(
            kinds("1_000 0x1F 0b101 0o17 3. 2.5 1..2"),
            vec![
                int(1000, Radix::Decimal),
                int(31, Radix::Hex),
                int(5, Radix::Binary),
                int(15, Radix::Octal),
                TokenKind::Float(3.0),
                TokenKind::Float(2.5),
                int(1, Radix::Decimal),
                TokenKind::DotDot,
                int(2, Radix::Decimal),
            ]
        );
    }

    #[test]
    fn malformed_numbers_still_produce_tokens() {
        let result = Lexer::new("1__0 0b102 0x 1_").tokenize();
        assert_eq!(result.errors.len(), 4);
        assert!(result
            .errors
            .iter()
            .all(|e| matches!(e.kind, LexErrorKind::MalformedNumber(_))));
        assert_eq!(result.errors[1].span, Span::new(5, 10));
        // Four number tokens plus Eof
        assert_eq!(result.tokens.len(), 5);
    }

    #[test]
    fn number_overflow() {
        assert_eq!(kinds("18446744073709551615"), vec![int(u64::MAX, Radix::Decimal)]);
        let result = Lexer::new("18446744073709551616").tokenize();
        assert_eq!(
            result.errors[0].kind,
            LexErrorKind::NumberOverflow("18446744073709551616".to_string())
        );
    }

    #[test]
    fn comments_become_trivia() {
        let result = Lexer::new("x := 1 // note\r\ny := 2").tokenize();
        assert!(result.is_ok());
        assert_eq!(result.comments.len(), 1);
        assert_eq!(result.comments[0].text, "// note");
        assert_eq!(result.comments[0].span.start, 7);
        assert_eq!(result.tokens.len(), 7);
    }

    #[test]
    fn shebang_only_on_first_line() {
        let result = Lexer::new("#!/usr/bin/env juice\nx := 1").tokenize();
        assert!(result.is_ok());
        assert_eq!(result.shebang, Some(Span::new(0, 20)));
        assert_eq!(result.tokens[0].kind, ident("x"));

        let result = Lexer::new("x := 1 # y").tokenize();
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].kind, LexErrorKind::UnexpectedChar('#'));
        assert_eq!(result.errors[0].span, Span::new(7, 8));
        assert_eq!(result.shebang, None);
    }

    #[test]
    fn lexing_resumes_after_bad_characters() {
        let result = Lexer::new("a @ é b").tokenize();
        assert_eq!(result.errors.len(), 2);
        assert_eq!(result.errors[0].span, Span::new(2, 3));
        assert_eq!(result.errors[1].kind, LexErrorKind::UnexpectedChar('é'));
        assert_eq!(result.errors[1].span, Span::new(4, 6));
        let names: Vec<_> = result.tokens.iter().map(|t| t.kind.clone()).collect();
        assert_eq!(names, vec![ident("a"), ident("b"), TokenKind::Eof]);
    }

    #[test]
    fn error_limit() {
        let source = format!("{}x {{ }}", "@ ".repeat(30));
        let result = Lexer::new(&source).tokenize();
        assert_eq!(result.errors.len(), MAX_ERRORS);
        let kinds: Vec<_> = result.tokens.into_iter().map(|t| t.kind).collect();
        assert_eq!(kinds, vec![ident("x"), TokenKind::LBrace, TokenKind::RBrace, TokenKind::Eof]);
    }

    #[test]
    fn eof_sits_at_end_of_input() {
        let result = Lexer::new("x  ").tokenize();
        assert_eq!(result.tokens.last().map(|t| t.span), Some(Span::point(3)));
    }
}
