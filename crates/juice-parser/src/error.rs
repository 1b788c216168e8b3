// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Parse error types.

use juice_ast::token::TokenKind;
use juice_ast::Span;
use thiserror::Error;

/// A parser error with location and friendly message.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub span: Span,
    pub message: String,
    /// What would have been accepted at `span`, if known.
    pub expected: Vec<String>,
    pub hint: Option<String>,
    /// Tokens discarded by recovery after this error.
    pub skipped: Option<Span>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    #[error("unexpected token")]
    UnexpectedToken,
    #[error("missing token")]
    MissingToken,
    #[error("'{{' is neither a record literal nor a block")]
    Unresolvable,
    #[error("reserved keyword")]
    ReservedKeyword,
    #[error("'export' must be followed by a declaration")]
    ExportNotDeclaration,
    #[error("constructor styles are mixed")]
    MixedConstructors,
    #[error("parenthesised single element is not a tuple")]
    SingleElementTuple,
    #[error("nesting too deep")]
    NestingTooDeep,
    #[error("too many errors")]
    TooManyErrors,
}

/// Broad class of a parse error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The token stream does not fit the grammar.
    Syntax,
    /// The grammar fits but the construct is ill-formed.
    Structural,
}

impl ParseErrorKind {
    pub fn category(self) -> ErrorCategory {
        match self {
            ParseErrorKind::MixedConstructors | ParseErrorKind::SingleElementTuple => {
                ErrorCategory::Structural
            }
            _ => ErrorCategory::Syntax,
        }
    }

    /// Fatal errors stop the parse.
    pub fn is_fatal(self) -> bool {
        matches!(self, ParseErrorKind::NestingTooDeep | ParseErrorKind::TooManyErrors)
    }
}

impl ParseError {
    fn new(kind: ParseErrorKind, span: Span, message: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            message: message.into(),
            expected: Vec::new(),
            hint: None,
            skipped: None,
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.kind.is_fatal()
    }

    pub fn category(&self) -> ErrorCategory {
        self.kind.category()
    }

    /// Something other than `expected` showed up.
    pub(crate) fn expected(expected: &str, found: &TokenKind, span: Span) -> Self {
        let message = format_expected_message(expected, found);
        let mut err = Self::new(ParseErrorKind::UnexpectedToken, span, message);
        err.expected = vec![expected.to_string()];
        err.hint = crate::hints::for_expected(expected, found).map(String::from);
        err
    }

    /// A specific required token is absent.
    pub(crate) fn missing(token: &TokenKind, found: &TokenKind, span: Span) -> Self {
        let expected = token.display_name();
        let mut err = Self::expected(expected, found, span);
        err.kind = ParseErrorKind::MissingToken;
        err
    }

    pub(crate) fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub(crate) fn with_expected(mut self, expected: &[&str]) -> Self {
        self.expected = expected.iter().map(|e| e.to_string()).collect();
        self
    }

    pub(crate) fn unresolvable(span: Span) -> Self {
        Self::new(
            ParseErrorKind::Unresolvable,
            span,
            "'{' is neither a valid record literal nor a valid block",
        )
        .with_hint("records hold 'name = value' or 'name' fields; blocks hold statements")
    }

    pub(crate) fn reserved_keyword(keyword: &TokenKind, span: Span) -> Self {
        Self::new(
            ParseErrorKind::ReservedKeyword,
            span,
            format!("{} is reserved and cannot be used yet", keyword.display_name()),
        )
        .with_hint("use 'for { ... }' for an endless loop")
    }

    pub(crate) fn export_not_declaration(found: &TokenKind, span: Span) -> Self {
        Self::new(
            ParseErrorKind::ExportNotDeclaration,
            span,
            format!("'export' must be followed by a declaration, found {}", found.display_name()),
        )
        .with_expected(&["'fn'", "'static'", "'type'", "a variable declaration"])
        .with_hint("only functions, types and 'name := value' can be exported")
    }

    pub(crate) fn mixed_constructors(span: Span, first_is_shorthand: bool) -> Self {
        let (first, other) = if first_is_shorthand {
            ("'field: Type' fields", "a 'Name(...)' constructor")
        } else {
            ("'Name(...)' constructors", "a 'field: Type' field")
        };
        Self::new(
            ParseErrorKind::MixedConstructors,
            span,
            format!("this block started with {first}, so {other} cannot follow"),
        )
        .with_hint("declare either all fields or all constructors")
    }

    pub(crate) fn single_element_tuple(span: Span) -> Self {
        Self::new(
            ParseErrorKind::SingleElementTuple,
            span,
            "a tuple needs at least two elements",
        )
        .with_hint("remove the trailing ',' to group a single value")
    }

    pub(crate) fn nesting_too_deep(span: Span, limit: usize) -> Self {
        Self::new(
            ParseErrorKind::NestingTooDeep,
            span,
            format!("expression nested more than {limit} levels deep"),
        )
        .with_hint("split the expression into named parts")
    }

    pub(crate) fn too_many_errors(span: Span, limit: usize) -> Self {
        Self::new(
            ParseErrorKind::TooManyErrors,
            span,
            format!("stopped after {limit} errors"),
        )
    }
}

/// Format a user-friendly "expected X, found Y" message.
fn format_expected_message(expected: &str, found: &TokenKind) -> String {
    match expected {
        "'{'" => format!("Expected '{{' to start block, found {found}"),
        "'}'" => {
            if matches!(found, TokenKind::Eof) {
                "Unclosed '{' - missing '}'".to_string()
            } else {
                format!("Expected '}}' to close block, found {found}")
            }
        }
        "')'" => {
            if matches!(found, TokenKind::Eof) {
                "Unclosed '(' - missing ')'".to_string()
            } else {
                format!("Expected ')', found {found}")
            }
        }
        "']'" => {
            if matches!(found, TokenKind::Eof) {
                "Unclosed '[' - missing ']'".to_string()
            } else {
                format!("Expected ']', found {found}")
            }
        }
        "a name" => format!("Expected name, found {found}"),
        "expression" => format!("Expected expression, found {found}"),
        "type" => format!("Expected type, found {found}"),
        _ => format!("Expected {expected}, found {found}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories() {
        assert_eq!(ParseErrorKind::SingleElementTuple.category(), ErrorCategory::Structural);
        assert_eq!(ParseErrorKind::Unresolvable.category(), ErrorCategory::Syntax);
        assert!(ParseErrorKind::TooManyErrors.is_fatal());
        assert!(!ParseErrorKind::MissingToken.is_fatal());
    }

    #[test]
    fn expected_messages() {
        let err = ParseError::missing(&TokenKind::RParen, &TokenKind::Eof, Span::point(3));
        assert_eq!(err.kind, ParseErrorKind::MissingToken);
        assert_eq!(err.to_string(), "Unclosed '(' - missing ')'");
        assert_eq!(err.expected, vec!["')'".to_string()]);

        let err = ParseError::expected("expression", &TokenKind::Comma, Span::new(4, 5));
        assert_eq!(err.to_string(), "Expected expression, found ','");
        assert!(err.hint.is_some());
    }
}
