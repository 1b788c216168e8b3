// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Parser state, token navigation and error recovery.
//!
//! The grammar itself lives in `decl`, `stmt`, `expr` and `types`; each adds
//! methods to [`Parser`].

use std::collections::HashSet;

use juice_ast::decl::Program;
use juice_ast::expr::Expr;
use juice_ast::token::{Token, TokenKind};
use juice_ast::Span;
use tracing::{debug, trace};

use crate::error::{ErrorCategory, ParseError};
use crate::options::ParseOptions;

/// Grow the stack when less than this remains.
#[cfg(not(target_arch = "wasm32"))]
const RED_ZONE: usize = 100 * 1024;

/// Size of each new stack segment.
#[cfg(not(target_arch = "wasm32"))]
const STACK_PER_RECURSION: usize = 1024 * 1024;

static EOF: Token = Token { kind: TokenKind::Eof, span: Span { start: 0, end: 0 } };

/// Where an expression sits, which decides what a `{` means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Position {
    /// Start of a statement: `{` opens a block.
    Statement,
    /// Any value slot: `{` is tried as a record literal, then as a block.
    Value,
    /// Condition or scrutinee of `if`/`for`/`match`: `{` belongs to the
    /// construct's body and is never consumed by the expression.
    Head,
}

impl Position {
    /// Position of every operand after the first one.
    pub(crate) fn operand(self) -> Position {
        match self {
            Position::Statement => Position::Value,
            other => other,
        }
    }
}

/// Result of parsing a whole program.
#[derive(Debug)]
pub struct ParseResult {
    pub program: Program,
    pub errors: Vec<ParseError>,
    /// Inner spans of every macro body in the tree.
    pub macro_bodies: Vec<Span>,
}

impl ParseResult {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Result of parsing a single expression.
#[derive(Debug)]
pub struct ExprResult {
    pub expr: Option<Expr>,
    pub errors: Vec<ParseError>,
    pub macro_bodies: Vec<Span>,
}

/// What speculation needs to undo.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Snapshot {
    pos: usize,
    errors: usize,
    macro_bodies: usize,
    halted: bool,
}

/// The parser for Juice source code.
pub struct Parser<'t> {
    source: &'t str,
    tokens: &'t [Token],
    pos: usize,
    options: ParseOptions,
    errors: Vec<ParseError>,
    depth: usize,
    /// Set by a fatal error, or by the first error in strict mode.
    halted: bool,
    macro_bodies: Vec<Span>,
    /// Offsets of `{` that already failed as a record literal.
    pub(crate) failed_records: HashSet<usize>,
    /// Offsets of `{` that already failed as a block.
    pub(crate) failed_blocks: HashSet<usize>,
}

impl<'t> Parser<'t> {
    /// `tokens` is the lexer output and ends with `Eof`.
    pub fn new(source: &'t str, tokens: &'t [Token], options: ParseOptions) -> Self {
        Self {
            source,
            tokens,
            pos: 0,
            options,
            errors: Vec::new(),
            depth: 0,
            halted: false,
            macro_bodies: Vec::new(),
            failed_records: HashSet::new(),
            failed_blocks: HashSet::new(),
        }
    }

    /// Parse the whole token stream as a program.
    pub fn parse(mut self, shebang: Option<Span>) -> ParseResult {
        debug!(tokens = self.tokens.len(), strict = self.options.strict, "parsing program");
        let mut items = Vec::new();

        while !self.at_end() && !self.halted {
            let start = self.pos;
            match self.parse_item() {
                Ok(item) => items.push(item),
                Err(e) => {
                    self.record_error(e);
                    self.recover(start, Self::synchronize_root);
                }
            }
        }

        debug!(items = items.len(), errors = self.errors.len(), "parsed program");
        let program = Program { shebang, items, span: Span::new(0, self.source.len()) };
        ParseResult { program, errors: self.errors, macro_bodies: self.macro_bodies }
    }

    /// Parse the token stream as one expression.
    pub fn parse_expression(mut self) -> ExprResult {
        let expr = match self.parse_expr(Position::Value) {
            Ok(expr) if self.at_end() => Some(expr),
            Ok(_) => {
                let err = ParseError::expected("end of input", self.current_kind(), self.current().span);
                self.record_error(err);
                None
            }
            Err(e) => {
                self.record_error(e);
                None
            }
        };
        ExprResult { expr, errors: self.errors, macro_bodies: self.macro_bodies }
    }

    // =========================================================================
    // Errors and Recovery
    // =========================================================================

    pub(crate) fn record_error(&mut self, error: ParseError) {
        if self.halted {
            return;
        }
        let fatal = error.is_fatal();
        self.errors.push(error);
        if fatal || self.options.strict {
            self.halted = true;
        } else if self.errors.len() >= self.options.max_errors {
            let span = self.current().span;
            self.errors.push(ParseError::too_many_errors(span, self.options.max_errors));
            self.halted = true;
        }
    }

    pub(crate) fn note_macro_body(&mut self, inner: Span) {
        self.macro_bodies.push(inner);
    }

    pub(crate) fn pos(&self) -> usize {
        self.pos
    }

    pub(crate) fn halted(&self) -> bool {
        self.halted
    }

    /// Skip past a failed statement that began at token `start` and note the
    /// discarded range on the error just recorded.
    pub(crate) fn recover(&mut self, start: usize, sync: fn(&mut Self)) {
        if self.halted {
            return;
        }
        if self.pos == start && !self.at_end() && !self.check(&TokenKind::RBrace) {
            self.advance();
        }
        sync(self);
        if self.pos > start {
            let skipped = self.tokens[start].span.to(self.tokens[self.pos - 1].span);
            trace!(%skipped, "recovered");
            if let Some(last) = self.errors.last_mut() {
                last.skipped.get_or_insert(skipped);
            }
        }
    }

    /// Skip to the next root statement.
    pub(crate) fn synchronize_root(&mut self) {
        let mut brace_depth = 0;

        while !self.at_end() {
            match self.current_kind() {
                TokenKind::LBrace => {
                    brace_depth += 1;
                    self.advance();
                }
                TokenKind::RBrace => {
                    self.advance();
                    if brace_depth > 0 {
                        brace_depth -= 1;
                        if brace_depth == 0 {
                            return;
                        }
                    }
                }
                kind if brace_depth == 0 && kind.starts_root_statement() => return,
                _ if brace_depth == 0 && self.starts_untagged_item() => return,
                _ => {
                    self.advance();
                }
            }
        }
    }

    /// Skip to the next statement inside a block, stopping before its `}`.
    pub(crate) fn synchronize_in_block(&mut self) {
        let mut brace_depth = 0;

        while !self.at_end() {
            match self.current_kind() {
                TokenKind::LBrace => {
                    brace_depth += 1;
                    self.advance();
                }
                TokenKind::RBrace => {
                    if brace_depth == 0 {
                        return;
                    }
                    brace_depth -= 1;
                    self.advance();
                    if brace_depth == 0 {
                        return;
                    }
                }
                kind if brace_depth == 0 && kind.starts_block_statement() => return,
                TokenKind::Ident(_)
                    if brace_depth == 0
                        && (self.starts_declaration() || matches!(self.peek(1), TokenKind::Eq)) =>
                {
                    return
                }
                _ => {
                    self.advance();
                }
            }
        }
    }

    /// Skip a balanced `{ ... }` group starting at the current `{`.
    pub(crate) fn skip_braces(&mut self) -> Span {
        let start = self.current().span;
        let mut brace_depth = 0usize;

        while !self.at_end() {
            match self.advance().kind {
                TokenKind::LBrace => brace_depth += 1,
                TokenKind::RBrace => {
                    brace_depth = brace_depth.saturating_sub(1);
                    if brace_depth == 0 {
                        break;
                    }
                }
                _ => {}
            }
        }
        start.to(self.previous_span())
    }

    // =========================================================================
    // Speculation and Depth
    // =========================================================================

    pub(crate) fn snapshot(&self) -> Snapshot {
        Snapshot {
            pos: self.pos,
            errors: self.errors.len(),
            macro_bodies: self.macro_bodies.len(),
            halted: self.halted,
        }
    }

    pub(crate) fn restore(&mut self, snapshot: Snapshot) {
        self.pos = snapshot.pos;
        self.errors.truncate(snapshot.errors);
        self.macro_bodies.truncate(snapshot.macro_bodies);
        self.halted = snapshot.halted;
    }

    /// Run `f` tentatively. A returned error or a recorded syntax error
    /// rewinds the parser and yields `None`. Structural errors mean the
    /// shape matched, so they are kept; fatal errors still propagate.
    pub(crate) fn speculate<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<Option<T>, ParseError> {
        let snapshot = self.snapshot();
        let result = f(self);

        let recorded = &self.errors[snapshot.errors..];
        if let Some(fatal) = recorded.iter().find(|e| e.is_fatal()) {
            return Err(fatal.clone());
        }
        let shape_matched = recorded.iter().all(|e| e.category() == ErrorCategory::Structural);
        match result {
            Ok(value) if shape_matched => Ok(Some(value)),
            Err(e) if e.is_fatal() => Err(e),
            _ => {
                self.restore(snapshot);
                Ok(None)
            }
        }
    }

    /// Run `f` one nesting level deeper.
    pub(crate) fn nested<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        if self.depth >= self.options.max_depth {
            return Err(ParseError::nesting_too_deep(self.current().span, self.options.max_depth));
        }
        self.depth += 1;
        let result = ensure_sufficient_stack(|| f(self));
        self.depth -= 1;
        result
    }

    // =========================================================================
    // Token Navigation
    // =========================================================================

    pub(crate) fn current(&self) -> &'t Token {
        let tokens: &'t [Token] = self.tokens;
        tokens.get(self.pos).or_else(|| tokens.last()).unwrap_or(&EOF)
    }

    pub(crate) fn current_kind(&self) -> &'t TokenKind {
        &self.current().kind
    }

    pub(crate) fn peek(&self, n: usize) -> &'t TokenKind {
        let tokens: &'t [Token] = self.tokens;
        tokens.get(self.pos + n).map(|t| &t.kind).unwrap_or(&TokenKind::Eof)
    }

    pub(crate) fn peek_span(&self, n: usize) -> Span {
        self.tokens.get(self.pos + n).map_or(self.current().span, |t| t.span)
    }

    pub(crate) fn at_end(&self) -> bool {
        matches!(self.current_kind(), TokenKind::Eof)
    }

    pub(crate) fn advance(&mut self) -> &'t Token {
        let token = self.current();
        if !self.at_end() {
            self.pos += 1;
        }
        token
    }

    pub(crate) fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(self.current_kind()) == std::mem::discriminant(kind)
    }

    pub(crate) fn match_token(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn expect(&mut self, kind: &TokenKind) -> Result<&'t Token, ParseError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(ParseError::missing(kind, self.current_kind(), self.current().span))
        }
    }

    /// An error saying `expected` was wanted at the current token.
    pub(crate) fn error_expected(&self, expected: &str) -> ParseError {
        ParseError::expected(expected, self.current_kind(), self.current().span)
    }

    pub(crate) fn expect_ident(&mut self) -> Result<(String, Span), ParseError> {
        match self.current_kind() {
            TokenKind::Ident(name) => {
                let span = self.advance().span;
                Ok((name.clone(), span))
            }
            _ => Err(self.error_expected("a name")),
        }
    }

    /// A value or type identifier.
    pub(crate) fn expect_any_ident(&mut self) -> Result<(String, Span), ParseError> {
        match self.current_kind() {
            TokenKind::Ident(name) | TokenKind::TypeIdent(name) => {
                let span = self.advance().span;
                Ok((name.clone(), span))
            }
            _ => Err(self.error_expected("a name")),
        }
    }

    /// `label:` in front of a call or type argument. `of` and `as` are
    /// keywords elsewhere but plain labels here.
    pub(crate) fn parse_arg_label(&mut self) -> Option<String> {
        let label = match (self.current_kind(), self.peek(1)) {
            (TokenKind::Ident(name) | TokenKind::TypeIdent(name), TokenKind::Colon) => name.clone(),
            (TokenKind::Of, TokenKind::Colon) => "of".to_string(),
            (TokenKind::As, TokenKind::Colon) => "as".to_string(),
            _ => return None,
        };
        self.advance();
        self.advance();
        Some(label)
    }

    pub(crate) fn previous_span(&self) -> Span {
        match self.pos.checked_sub(1).and_then(|i| self.tokens.get(i)) {
            Some(token) => token.span,
            None => Span::point(self.current().span.start),
        }
    }

    /// Span from `start` to the end of the last consumed token.
    pub(crate) fn span_from(&self, start: Span) -> Span {
        start.to(self.previous_span())
    }

    pub(crate) fn source_text(&self, span: Span) -> &'t str {
        let source: &'t str = self.source;
        source.get(span.start..span.end).unwrap_or("")
    }

    /// `name :=` or `name :` at the current token.
    pub(crate) fn starts_declaration(&self) -> bool {
        matches!(self.current_kind(), TokenKind::Ident(_))
            && matches!(self.peek(1), TokenKind::ColonEq | TokenKind::Colon)
    }

    /// A root item without a leading keyword: `name :=`, `name :`,
    /// `name =`, or a type declaration such as `Point :=` or `Pair(t) :=`.
    fn starts_untagged_item(&self) -> bool {
        match (self.current_kind(), self.peek(1)) {
            (TokenKind::Ident(_), TokenKind::ColonEq | TokenKind::Colon | TokenKind::Eq) => true,
            (TokenKind::TypeIdent(_), TokenKind::ColonEq | TokenKind::LParen) => true,
            _ => false,
        }
    }

    /// Run `f` over a nested token stream, such as an interpolation.
    pub(crate) fn with_tokens<T>(
        &mut self,
        tokens: &'t [Token],
        f: impl FnOnce(&mut Self) -> T,
    ) -> T {
        let saved = (self.tokens, self.pos);
        self.tokens = tokens;
        self.pos = 0;
        let result = f(self);
        (self.tokens, self.pos) = saved;
        result
    }
}

/// Run `f`, first moving to a fresh stack segment if the current one is
/// nearly used up.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

#[inline]
#[cfg(target_arch = "wasm32")]
fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(source: &str) -> Vec<Token> {
        juice_lexer::tokenize(source).tokens
    }

    #[test]
    fn navigation_stays_on_eof() {
        let toks = tokens("a");
        let mut parser = Parser::new("a", &toks, ParseOptions::default());
        assert!(matches!(parser.advance().kind, TokenKind::Ident(_)));
        assert!(parser.at_end());
        parser.advance();
        assert!(parser.at_end());
        assert!(matches!(parser.peek(5), TokenKind::Eof));
    }

    #[test]
    fn speculation_rewinds() {
        let source = "a b c";
        let toks = tokens(source);
        let mut parser = Parser::new(source, &toks, ParseOptions::default());
        let result = parser
            .speculate(|p| {
                p.advance();
                p.advance();
                Err::<(), _>(p.error_expected("expression"))
            })
            .unwrap();
        assert!(result.is_none());
        assert_eq!(parser.pos, 0);
        assert!(parser.errors.is_empty());
    }

    #[test]
    fn depth_limit() {
        let source = "a";
        let toks = tokens(source);
        let mut parser = Parser::new(source, &toks, ParseOptions::default().with_max_depth(2));
        let result = parser.nested(|p| p.nested(|p| p.nested(|_| Ok(()))));
        assert!(result.unwrap_err().is_fatal());
        assert_eq!(parser.depth, 0);
    }
}
