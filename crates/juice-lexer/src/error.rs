// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Lexer error types.

use juice_ast::Span;
use thiserror::Error;

/// A lexer error with location and friendly message.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind}")]
pub struct LexError {
    pub kind: LexErrorKind,
    pub span: Span,
    pub hint: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexErrorKind {
    #[error("unexpected character '{0}'")]
    UnexpectedChar(char),
    #[error("unterminated string")]
    UnterminatedString,
    #[error("invalid escape sequence '{0}'")]
    InvalidEscape(String),
    #[error("malformed number '{0}'")]
    MalformedNumber(String),
    #[error("number '{0}' does not fit in 64 bits")]
    NumberOverflow(String),
    #[error("string interpolations nested too deeply")]
    NestingTooDeep,
}

impl LexError {
    pub fn unexpected_char(ch: char, pos: usize) -> Self {
        let hint = match ch {
            ';' => Some("statements are not separated by ';'".to_string()),
            '#' => Some("'#!' is only allowed on the first line".to_string()),
            '\'' => Some("strings use double quotes".to_string()),
            _ => None,
        };
        Self {
            kind: LexErrorKind::UnexpectedChar(ch),
            span: Span::new(pos, pos + ch.len_utf8()),
            hint,
        }
    }

    pub fn unterminated_string(start: usize, end: usize) -> Self {
        Self {
            kind: LexErrorKind::UnterminatedString,
            span: Span::new(start, end),
            hint: Some("add a closing '\"'".to_string()),
        }
    }

    pub fn invalid_escape(raw: &str, span: Span) -> Self {
        Self {
            kind: LexErrorKind::InvalidEscape(raw.to_string()),
            span,
            hint: Some("valid: \\\" \\\\ \\/ \\b \\f \\n \\r \\t \\$ \\0 \\u{...}".to_string()),
        }
    }

    pub fn malformed_number(text: &str, span: Span, hint: &str) -> Self {
        Self {
            kind: LexErrorKind::MalformedNumber(text.to_string()),
            span,
            hint: Some(hint.to_string()),
        }
    }

    pub fn number_overflow(text: &str, span: Span) -> Self {
        Self {
            kind: LexErrorKind::NumberOverflow(text.to_string()),
            span,
            hint: Some(format!("the largest integer is {}", u64::MAX)),
        }
    }

    pub fn nesting_too_deep(span: Span) -> Self {
        Self {
            kind: LexErrorKind::NestingTooDeep,
            span,
            hint: None,
        }
    }
}
