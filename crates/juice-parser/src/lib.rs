// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Parser for the Juice language.
//!
//! Transforms a token stream into a syntax tree. Parsing never stops at the
//! first problem: errors are collected, the parser skips to the next
//! statement and carries on, so one call reports everything it can.

mod decl;
mod error;
mod expr;
mod hints;
mod options;
mod parser;
mod stmt;
mod types;

pub use error::{ErrorCategory, ParseError, ParseErrorKind};
pub use options::ParseOptions;
pub use parser::{ExprResult, ParseResult, Parser};

use juice_ast::decl::Program;
use juice_ast::expr::Expr;
use juice_ast::token::Token;
use juice_ast::trivia::Comment;
use juice_ast::Span;
use juice_lexer::{LexError, Lexer};
use tracing::debug;

/// Everything one parse produces.
#[derive(Debug)]
pub struct ParseOutput {
    pub program: Program,
    pub tokens: Vec<Token>,
    pub comments: Vec<Comment>,
    pub lex_errors: Vec<LexError>,
    pub errors: Vec<ParseError>,
}

impl ParseOutput {
    pub fn is_ok(&self) -> bool {
        self.lex_errors.is_empty() && self.errors.is_empty()
    }
}

/// Result of parsing a single expression.
#[derive(Debug)]
pub struct ExprOutput {
    pub expr: Option<Expr>,
    pub lex_errors: Vec<LexError>,
    pub errors: Vec<ParseError>,
}

impl ExprOutput {
    pub fn is_ok(&self) -> bool {
        self.expr.is_some() && self.lex_errors.is_empty() && self.errors.is_empty()
    }
}

/// Parse a compilation unit with default options.
pub fn parse(source: &str) -> ParseOutput {
    parse_with_options(source, &ParseOptions::default())
}

pub fn parse_with_options(source: &str, options: &ParseOptions) -> ParseOutput {
    let lexed = Lexer::new(source).tokenize();
    let result = Parser::new(source, &lexed.tokens, options.clone()).parse(lexed.shebang);
    let lex_errors = outside_macro_bodies(lexed.errors, &result.macro_bodies);

    if options.strict && !lex_errors.is_empty() {
        debug!(lex_errors = lex_errors.len(), "strict mode: dropping the tree after lex errors");
        let program = Program { shebang: lexed.shebang, items: Vec::new(), span: Span::new(0, source.len()) };
        return ParseOutput {
            program,
            tokens: lexed.tokens,
            comments: lexed.comments,
            lex_errors,
            errors: Vec::new(),
        };
    }

    ParseOutput {
        program: result.program,
        tokens: lexed.tokens,
        comments: lexed.comments,
        lex_errors,
        errors: result.errors,
    }
}

/// Parse `source` as one self-contained expression.
pub fn parse_expression(source: &str) -> ExprOutput {
    let lexed = Lexer::new(source).tokenize();
    let result = Parser::new(source, &lexed.tokens, ParseOptions::default()).parse_expression();
    ExprOutput {
        expr: result.expr,
        lex_errors: outside_macro_bodies(lexed.errors, &result.macro_bodies),
        errors: result.errors,
    }
}

/// Macro bodies are raw text; characters the lexer rejects inside them are
/// not errors.
fn outside_macro_bodies(errors: Vec<LexError>, bodies: &[Span]) -> Vec<LexError> {
    errors
        .into_iter()
        .filter(|e| !bodies.iter().any(|body| body.contains(e.span)))
        .collect()
}

#[cfg(test)]
pub(crate) mod test_support {
    use juice_ast::decl::ItemKind;
    use juice_ast::sexpr::{expr_to_sexpr, stmt_to_sexpr, to_sexpr};

    use crate::ParseError;

    /// Dump of a program that must parse cleanly.
    pub fn program(src: &str) -> String {
        let out = crate::parse(src);
        assert!(out.is_ok(), "errors in {src:?}: {:?} {:?}", out.lex_errors, out.errors);
        to_sexpr(&out.program)
    }

    /// Dump of the statements of `src` wrapped in a function body.
    pub fn body(src: &str) -> String {
        let wrapped = format!("fn wrapper() {{\n{src}\n}}");
        let out = crate::parse(&wrapped);
        assert!(out.is_ok(), "errors in {src:?}: {:?} {:?}", out.lex_errors, out.errors);
        match &out.program.items[0].kind {
            ItemKind::Fn(f) => f.body.stmts.iter().map(stmt_to_sexpr).collect::<Vec<_>>().join(" "),
            other => panic!("expected a function, got {other:?}"),
        }
    }

    /// Dump of an expression that must parse cleanly.
    pub fn expr(src: &str) -> String {
        let out = crate::parse_expression(src);
        assert!(out.is_ok(), "errors in {src:?}: {:?} {:?}", out.lex_errors, out.errors);
        out.expr.as_ref().map(expr_to_sexpr).unwrap_or_default()
    }

    pub fn expr_errors(src: &str) -> Vec<ParseError> {
        crate::parse_expression(src).errors
    }

    pub fn errors_of(src: &str) -> Vec<ParseError> {
        crate::parse(src).errors
    }
}
