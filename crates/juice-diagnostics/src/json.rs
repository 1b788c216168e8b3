// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! JSON diagnostic output for machine consumption.
//!
//! Produces structured JSON that editors and scripts can parse: every
//! diagnostic carries its code, category, exact locations (line/column) and
//! the source line it points at.
//!
//! Use `--format json` with `juice check` or `juice parse` to get this output.

use juice_ast::{LineMap, Span};
use serde::Serialize;

use crate::codes::ErrorCodeRegistry;
use crate::{Diagnostic, LabelStyle, Severity};

/// A complete JSON diagnostic report for one file.
#[derive(Debug, Serialize)]
pub struct DiagnosticReport {
    /// Schema version for forward compatibility.
    pub version: u32,
    pub file: String,
    /// True when there are no errors.
    pub success: bool,
    pub diagnostics: Vec<JsonDiagnostic>,
    pub error_count: usize,
    pub warning_count: usize,
}

/// A single diagnostic in JSON form, enriched with source context.
#[derive(Debug, Serialize)]
pub struct JsonDiagnostic {
    /// "error" or "warning".
    pub severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Error category (e.g., "Syntax", "Limit").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub message: String,
    /// Primary source location.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<SourceLocation>,
    pub labels: Vec<JsonLabel>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub expected: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
    pub recoverable: bool,
}

/// A source location with line/column (1-based).
#[derive(Debug, Serialize)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
    pub byte_offset: usize,
    /// The source line text for context.
    pub source_line: String,
}

/// A labeled span in JSON form.
#[derive(Debug, Serialize)]
pub struct JsonLabel {
    /// "primary" or "secondary".
    pub role: LabelStyle,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub span: Span,
    pub start: LineCol,
    pub end: LineCol,
}

/// Line/column pair (1-based).
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct LineCol {
    pub line: usize,
    pub column: usize,
}

/// Convert diagnostics to a structured JSON report.
pub fn to_json_report(diagnostics: &[Diagnostic], source: &str, file: &str) -> DiagnosticReport {
    let registry = ErrorCodeRegistry::default();
    let line_map = LineMap::new(source);

    let json_diags: Vec<JsonDiagnostic> = diagnostics
        .iter()
        .map(|d| to_json_diagnostic(d, source, &line_map, &registry))
        .collect();

    let error_count = diagnostics.iter().filter(|d| d.severity == Severity::Error).count();
    let warning_count = diagnostics.len() - error_count;

    DiagnosticReport {
        version: 1,
        file: file.to_string(),
        success: error_count == 0,
        diagnostics: json_diags,
        error_count,
        warning_count,
    }
}

fn to_json_diagnostic(
    diag: &Diagnostic,
    source: &str,
    line_map: &LineMap,
    registry: &ErrorCodeRegistry,
) -> JsonDiagnostic {
    let code = diag.code.as_ref().map(|c| c.0.clone());
    let category = code
        .as_ref()
        .and_then(|c| registry.get(c))
        .map(|info| info.category.to_string());

    let location = diag.primary_span().map(|span| {
        let (line, column) = line_map.offset_to_line_col(span.start);
        SourceLocation {
            line,
            column,
            byte_offset: span.start,
            source_line: line_map.line_text(source, line).unwrap_or("").to_string(),
        }
    });

    let line_col = |offset: usize| {
        let (line, column) = line_map.offset_to_line_col(offset);
        LineCol { line, column }
    };

    let labels = diag
        .labels
        .iter()
        .map(|l| JsonLabel {
            role: l.style,
            message: l.message.clone(),
            span: l.span,
            start: line_col(l.span.start),
            end: line_col(l.span.end),
        })
        .collect();

    JsonDiagnostic {
        severity: diag.severity,
        code,
        category,
        message: diag.message.clone(),
        location,
        labels,
        expected: diag.expected.clone(),
        notes: diag.notes.clone(),
        help: diag.help.clone(),
        recoverable: diag.recoverable,
    }
}

/// Serialize a diagnostic report to pretty JSON.
pub fn to_json_string(report: &DiagnosticReport) -> String {
    serde_json::to_string_pretty(report).unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collect_diagnostics;
    use pretty_assertions::assert_eq;

    #[test]
    fn report_has_line_and_column() {
        let source = "x := 1\ny := )\n";
        let diags = collect_diagnostics(&juice_parser::parse(source));
        let report = to_json_report(&diags, source, "main.juice");

        assert!(!report.success);
        assert_eq!(report.error_count, 1);
        let diag = &report.diagnostics[0];
        assert_eq!(diag.code.as_deref(), Some("E0100"));
        assert_eq!(diag.category.as_deref(), Some("Syntax"));
        let location = diag.location.as_ref().unwrap();
        assert_eq!((location.line, location.column), (2, 6));
        assert_eq!(location.source_line, "y := )");
        assert_eq!(diag.labels[0].end, LineCol { line: 2, column: 7 });
    }

    #[test]
    fn clean_source_is_a_successful_report() {
        let report = to_json_report(&[], "x := 1", "ok.juice");
        let value: serde_json::Value = serde_json::from_str(&to_json_string(&report)).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["file"], "ok.juice");
        assert_eq!(value["diagnostics"].as_array().map(Vec::len), Some(0));
    }

    #[test]
    fn serialized_fields() {
        let source = "x := (1,)";
        let diags = collect_diagnostics(&juice_parser::parse(source));
        let json = to_json_string(&to_json_report(&diags, source, "t.juice"));
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let diag = &value["diagnostics"][0];
        assert_eq!(diag["severity"], "error");
        assert_eq!(diag["code"], "E0201");
        assert_eq!(diag["category"], "Structural");
        assert_eq!(diag["labels"][0]["role"], "primary");
        assert_eq!(diag["labels"][0]["span"]["start"], 5);
        assert_eq!(diag["recoverable"], true);
    }
}
