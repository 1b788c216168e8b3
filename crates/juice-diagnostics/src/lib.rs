// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Juice front-end diagnostics.
//!
//! Provides a unified diagnostic type that the CLI and any other tool
//! consume. Lexer and parser errors are converted to `Diagnostic` via the
//! `ToDiagnostic` trait, keeping those crates free of rendering concerns.

pub mod codes;
pub mod convert;
pub mod formatter;
pub mod json;

pub use convert::collect_diagnostics;

use juice_ast::Span;
use serde::Serialize;

// ============================================================================
// Core Types
// ============================================================================

/// A diagnostic with enough context to render a source snippet.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: Option<ErrorCode>,
    pub message: String,
    pub labels: Vec<Label>,
    pub notes: Vec<String>,
    pub help: Option<String>,
    /// What the parser would have accepted at the primary span.
    pub expected: Vec<String>,
    /// False when the error ended the parse.
    pub recoverable: bool,
}

/// A labeled source span within a diagnostic.
#[derive(Debug, Clone, Serialize)]
pub struct Label {
    pub span: Span,
    pub style: LabelStyle,
    pub message: Option<String>,
}

/// How a label should be displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelStyle {
    /// Where the error is (red underline).
    Primary,
    /// Related location, such as skipped input (blue underline).
    Secondary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// An error code like E0101.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ErrorCode(pub String);

// ============================================================================
// Builder API
// ============================================================================

impl Diagnostic {
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message.into())
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message.into())
    }

    fn new(severity: Severity, message: String) -> Self {
        Self {
            severity,
            code: None,
            message,
            labels: Vec::new(),
            notes: Vec::new(),
            help: None,
            expected: Vec::new(),
            recoverable: true,
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(ErrorCode(code.into()));
        self
    }

    pub fn with_label(mut self, span: Span, style: LabelStyle, msg: impl Into<String>) -> Self {
        self.labels.push(Label {
            span,
            style,
            message: Some(msg.into()),
        });
        self
    }

    pub fn with_primary(self, span: Span, msg: impl Into<String>) -> Self {
        self.with_label(span, LabelStyle::Primary, msg)
    }

    pub fn with_secondary(self, span: Span, msg: impl Into<String>) -> Self {
        self.with_label(span, LabelStyle::Secondary, msg)
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn with_expected(mut self, expected: &[String]) -> Self {
        self.expected = expected.to_vec();
        self
    }

    /// Mark the diagnostic as the one that stopped the parse.
    pub fn fatal(mut self) -> Self {
        self.recoverable = false;
        self
    }

    /// Returns the primary span (first primary label, or first label).
    pub fn primary_span(&self) -> Option<Span> {
        self.labels
            .iter()
            .find(|l| l.style == LabelStyle::Primary)
            .or(self.labels.first())
            .map(|l| l.span)
    }
}

// ============================================================================
// Conversion Trait
// ============================================================================

/// Convert a front-end error into a rich diagnostic.
pub trait ToDiagnostic {
    fn to_diagnostic(&self) -> Diagnostic;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_span_prefers_primary_labels() {
        let diag = Diagnostic::error("boom")
            .with_secondary(Span::new(0, 2), "skipped")
            .with_primary(Span::new(5, 6), "here");
        assert_eq!(diag.primary_span(), Some(Span::new(5, 6)));
        assert!(diag.recoverable);
        assert!(!diag.fatal().recoverable);
    }

    #[test]
    fn serializes_with_lowercase_tags() {
        let diag = Diagnostic::warning("careful").with_code("E0100");
        let value = serde_json::to_value(&diag).unwrap();
        assert_eq!(value["severity"], "warning");
        assert_eq!(value["code"], "E0100");
        assert_eq!(value["recoverable"], true);
    }
}
