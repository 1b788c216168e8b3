// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Conversions from lexer and parser errors to `Diagnostic`.

use juice_lexer::{LexError, LexErrorKind};
use juice_parser::{ParseError, ParseErrorKind, ParseOutput};

use crate::{Diagnostic, ToDiagnostic};

// ============================================================================
// Lex Errors
// ============================================================================

impl ToDiagnostic for LexError {
    fn to_diagnostic(&self) -> Diagnostic {
        let (code, label) = match &self.kind {
            LexErrorKind::UnexpectedChar(_) => ("E0001", "unexpected character"),
            LexErrorKind::UnterminatedString => ("E0002", "string starts here"),
            LexErrorKind::InvalidEscape(_) => ("E0003", "unknown escape"),
            LexErrorKind::MalformedNumber(_) => ("E0004", "malformed number"),
            LexErrorKind::NumberOverflow(_) => ("E0005", "too large"),
            LexErrorKind::NestingTooDeep => ("E0006", "too deep"),
        };

        let mut diag = Diagnostic::error(self.kind.to_string())
            .with_code(code)
            .with_primary(self.span, label);

        if let Some(ref hint) = self.hint {
            diag = diag.with_help(hint.as_str());
        }

        diag
    }
}

// ============================================================================
// Parse Errors
// ============================================================================

fn parse_code(kind: ParseErrorKind) -> &'static str {
    match kind {
        ParseErrorKind::UnexpectedToken => "E0100",
        ParseErrorKind::MissingToken => "E0101",
        ParseErrorKind::Unresolvable => "E0102",
        ParseErrorKind::ReservedKeyword => "E0103",
        ParseErrorKind::ExportNotDeclaration => "E0104",
        ParseErrorKind::MixedConstructors => "E0200",
        ParseErrorKind::SingleElementTuple => "E0201",
        ParseErrorKind::NestingTooDeep => "E0300",
        ParseErrorKind::TooManyErrors => "E0301",
    }
}

impl ToDiagnostic for ParseError {
    fn to_diagnostic(&self) -> Diagnostic {
        let label = match self.expected.as_slice() {
            [] => "here".to_string(),
            [one] => format!("expected {one}"),
            many => format!("expected one of {}", many.join(", ")),
        };

        let mut diag = Diagnostic::error(&self.message)
            .with_code(parse_code(self.kind))
            .with_primary(self.span, label)
            .with_expected(&self.expected);

        if let Some(skipped) = self.skipped {
            diag = diag.with_secondary(skipped, "skipped");
        }
        if let Some(ref hint) = self.hint {
            diag = diag.with_help(hint.as_str());
        }
        if self.is_fatal() {
            diag = diag.fatal().with_note("parsing stopped here");
        }

        diag
    }
}

/// Every lexer and parser diagnostic of one parse, ordered by position.
pub fn collect_diagnostics(output: &ParseOutput) -> Vec<Diagnostic> {
    let mut diagnostics: Vec<Diagnostic> = output
        .lex_errors
        .iter()
        .map(ToDiagnostic::to_diagnostic)
        .chain(output.errors.iter().map(ToDiagnostic::to_diagnostic))
        .collect();
    // Stable, so a fatal error stays behind anything at the same offset.
    diagnostics.sort_by_key(|d| d.primary_span().map_or(usize::MAX, |s| s.start));
    diagnostics
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LabelStyle;
    use juice_ast::Span;
    use pretty_assertions::assert_eq;

    fn codes(src: &str) -> Vec<String> {
        collect_diagnostics(&juice_parser::parse(src))
            .into_iter()
            .filter_map(|d| d.code.map(|c| c.0))
            .collect()
    }

    #[test]
    fn codes_follow_error_kinds() {
        assert_eq!(codes("x := (1,)"), vec!["E0201"]);
        assert_eq!(codes("x := loop"), vec!["E0103"]);
        assert_eq!(codes("x := \"abc"), vec!["E0002"]);
        assert_eq!(codes("x := 1 @ y := 2"), vec!["E0001"]);
    }

    #[test]
    fn lex_and_parse_errors_are_ordered_by_position() {
        let diags = collect_diagnostics(&juice_parser::parse("x := )\ny := \"a\\q\""));
        let starts: Vec<_> = diags.iter().filter_map(|d| d.primary_span()).map(|s| s.start).collect();
        assert_eq!(starts.len(), 2);
        assert!(starts[0] < starts[1]);
        assert_eq!(diags[0].code.as_ref().map(|c| c.0.as_str()), Some("E0100"));
        assert_eq!(diags[1].code.as_ref().map(|c| c.0.as_str()), Some("E0003"));
    }

    #[test]
    fn skipped_input_is_a_secondary_label() {
        let diags = collect_diagnostics(&juice_parser::parse("fn f( { } x := 1"));
        assert_eq!(diags.len(), 1);
        let secondary: Vec<_> =
            diags[0].labels.iter().filter(|l| l.style == LabelStyle::Secondary).collect();
        assert_eq!(secondary.len(), 1);
        assert_eq!(secondary[0].message.as_deref(), Some("skipped"));
        assert!(diags[0].recoverable);
    }

    #[test]
    fn fatal_errors_are_not_recoverable() {
        let options = juice_parser::ParseOptions::default().with_max_depth(4);
        let output = juice_parser::parse_with_options("x := ((((((1))))))", &options);
        let diags = collect_diagnostics(&output);
        assert_eq!(diags.len(), 1);
        assert!(!diags[0].recoverable);
        assert_eq!(diags[0].code.as_ref().map(|c| c.0.as_str()), Some("E0300"));
    }

    #[test]
    fn expected_tokens_are_carried() {
        let diags = collect_diagnostics(&juice_parser::parse("print(1)"));
        assert_eq!(diags[0].expected, vec!["':=', ':' or '='".to_string()]);
        assert_eq!(diags[0].primary_span(), Some(Span::new(5, 6)));
        assert_eq!(diags[0].help.as_deref(), Some("calls are only allowed inside function bodies"));
    }
}
