// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Rich terminal formatter for diagnostics.
//!
//! Produces multi-line, color-coded error output:
//!
//! ```text
//! error[E0101]: Expected ')', found 'y'
//!   --> main.juice:4:3
//!     |
//!   3 |   total := (x + 1
//!     |             ------- skipped
//!   4 |   y := 2
//!     |   ^ expected ')'
//!     = note: skipped input is underlined with '-'
//! ```

use colored::Colorize;

use juice_ast::LineMap;

use crate::{Diagnostic, LabelStyle, Severity};

/// Formats diagnostics for terminal output.
pub struct DiagnosticFormatter<'a> {
    source: &'a str,
    file_name: Option<&'a str>,
    line_map: LineMap,
}

/// A source line with its labels.
struct AnnotatedLine {
    line_num: usize,
    text: String,
    annotations: Vec<Annotation>,
}

struct Annotation {
    col_start: usize,
    col_end: usize,
    style: LabelStyle,
    message: Option<String>,
}

impl<'a> DiagnosticFormatter<'a> {
    pub fn new(source: &'a str) -> Self {
        let line_map = LineMap::new(source);
        Self {
            source,
            file_name: None,
            line_map,
        }
    }

    pub fn with_file_name(mut self, name: &'a str) -> Self {
        self.file_name = Some(name);
        self
    }

    pub fn format(&self, diagnostic: &Diagnostic) -> String {
        let mut out = String::new();

        // Line 1: severity[code]: message
        self.format_header(&mut out, diagnostic);

        let annotated = self.collect_annotated_lines(diagnostic);
        let Some(first) = annotated.first() else {
            self.format_footer(&mut out, diagnostic);
            return out;
        };

        // Line 2: --> file:line:col
        let file = self.file_name.unwrap_or("<source>");
        let col = diagnostic
            .primary_span()
            .map_or(1, |span| self.line_map.offset_to_line_col(span.start).1);
        let line = diagnostic
            .primary_span()
            .map_or(first.line_num, |span| self.line_map.offset_to_line_col(span.start).0);
        out.push_str(&format!("  {} {}:{}:{}\n", "-->".blue(), file, line, col));

        // Calculate gutter width from max line number
        let max_line = annotated.last().map(|a| a.line_num).unwrap_or(1);
        let gutter_width = max_line.to_string().len().max(2);

        out.push_str(&format!("{} {}\n", " ".repeat(gutter_width + 1), "|".blue()));

        let mut prev_line_num: Option<usize> = None;
        for annotated_line in &annotated {
            // Gap indicator for non-consecutive lines
            if let Some(prev) = prev_line_num {
                if annotated_line.line_num > prev + 1 {
                    out.push_str(&format!("{} {}\n", " ".repeat(gutter_width), "...".blue()));
                }
            }

            // Source line: NN | code
            out.push_str(&format!(
                "{:>width$} {} {}\n",
                annotated_line.line_num.to_string().blue().bold(),
                "|".blue(),
                annotated_line.text,
                width = gutter_width + 1,
            ));

            self.format_annotations(&mut out, annotated_line, gutter_width);

            prev_line_num = Some(annotated_line.line_num);
        }

        self.format_footer(&mut out, diagnostic);

        out
    }

    /// Format every diagnostic, separated by blank lines.
    pub fn format_all(&self, diagnostics: &[Diagnostic]) -> String {
        diagnostics
            .iter()
            .map(|d| self.format(d))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn format_header(&self, out: &mut String, diagnostic: &Diagnostic) {
        let severity_str = match diagnostic.severity {
            Severity::Error => "error".red().bold(),
            Severity::Warning => "warning".yellow().bold(),
        };

        if let Some(ref code) = diagnostic.code {
            out.push_str(&format!(
                "{}[{}]: {}\n",
                severity_str,
                code.0.clone().red().bold(),
                diagnostic.message.bold()
            ));
        } else {
            out.push_str(&format!("{}: {}\n", severity_str, diagnostic.message.bold()));
        }
    }

    fn format_footer(&self, out: &mut String, diagnostic: &Diagnostic) {
        let indent = " ".repeat(3);

        if diagnostic.expected.len() > 1 {
            out.push_str(&format!(
                "{} {} {}: one of {}\n",
                indent,
                "=".cyan(),
                "expected".cyan().bold(),
                diagnostic.expected.join(", ")
            ));
        }

        for note in &diagnostic.notes {
            out.push_str(&format!("{} {} {}: {}\n", indent, "=".cyan(), "note".cyan().bold(), note));
        }

        if let Some(ref help) = diagnostic.help {
            out.push_str(&format!("{} {} {}: {}\n", indent, "=".cyan(), "help".cyan().bold(), help));
        }
    }

    fn collect_annotated_lines(&self, diagnostic: &Diagnostic) -> Vec<AnnotatedLine> {
        let mut lines_map: std::collections::BTreeMap<usize, AnnotatedLine> =
            std::collections::BTreeMap::new();

        for label in &diagnostic.labels {
            let (line_num, col_start) = self.line_map.offset_to_line_col(label.span.start);
            let (end_line, col_end) = self.line_map.offset_to_line_col(label.span.end);
            let line_text = self.line_map.line_text(self.source, line_num).unwrap_or("");

            // Multi-line spans are underlined to the end of their first line
            let effective_col_end = if end_line == line_num { col_end } else { line_text.len() + 1 };

            let entry = lines_map.entry(line_num).or_insert_with(|| AnnotatedLine {
                line_num,
                text: line_text.to_string(),
                annotations: Vec::new(),
            });

            entry.annotations.push(Annotation {
                col_start,
                col_end: effective_col_end.max(col_start + 1), // At least 1 char wide
                style: label.style,
                message: label.message.clone(),
            });
        }

        lines_map.into_values().collect()
    }

    fn format_annotations(&self, out: &mut String, annotated_line: &AnnotatedLine, gutter_width: usize) {
        // Primary first, then by column
        let mut sorted: Vec<&Annotation> = annotated_line.annotations.iter().collect();
        sorted.sort_by(|a, b| {
            a.style
                .cmp_priority()
                .cmp(&b.style.cmp_priority())
                .then(a.col_start.cmp(&b.col_start))
        });

        let line_len = annotated_line.text.len() + 2;
        let mut underline = vec![' '; line_len];
        let mut messages: Vec<(usize, LabelStyle, &str)> = Vec::new();

        for ann in &sorted {
            let ch = match ann.style {
                LabelStyle::Primary => '^',
                LabelStyle::Secondary => '-',
            };

            for slot in underline
                .iter_mut()
                .take(ann.col_end.saturating_sub(1))
                .skip(ann.col_start - 1)
            {
                // Primary carets win over secondary dashes
                if *slot != '^' {
                    *slot = ch;
                }
            }

            if let Some(ref msg) = ann.message {
                messages.push((ann.col_start, ann.style, msg));
            }
        }

        let underline_str: String = underline.iter().collect::<String>().trim_end().to_string();
        if underline_str.is_empty() {
            return;
        }
        let colored_underline = color_underline(&underline_str);
        let pad = " ".repeat(gutter_width + 1);
        // Messages hang below, rightmost first
        messages.sort_by_key(|(col, _, _)| std::cmp::Reverse(*col));

        match messages.as_slice() {
            [] => out.push_str(&format!("{} {} {}\n", pad, "|".blue(), colored_underline)),
            [(_, style, msg)] => out.push_str(&format!(
                "{} {} {} {}\n",
                pad,
                "|".blue(),
                colored_underline,
                style_message(*style, msg),
            )),
            _ => {
                out.push_str(&format!("{} {} {}\n", pad, "|".blue(), colored_underline));
                for (col, style, msg) in &messages {
                    out.push_str(&format!(
                        "{} {} {}{}\n",
                        pad,
                        "|".blue(),
                        " ".repeat(col.saturating_sub(1)),
                        style_message(*style, msg),
                    ));
                }
            }
        }
    }
}

impl LabelStyle {
    fn cmp_priority(&self) -> u8 {
        match self {
            LabelStyle::Primary => 0,
            LabelStyle::Secondary => 1,
        }
    }
}

fn style_message(style: LabelStyle, msg: &str) -> String {
    match style {
        LabelStyle::Primary => msg.red().bold().to_string(),
        LabelStyle::Secondary => msg.blue().to_string(),
    }
}

/// Color the underline characters (^ in red, - in blue).
fn color_underline(s: &str) -> String {
    let mut result = String::new();
    let mut current_char = None;
    let mut run = String::new();

    for ch in s.chars() {
        let kind = match ch {
            '^' | '-' => Some(ch),
            _ => None,
        };

        if kind != current_char && !run.is_empty() {
            result.push_str(&flush_run(&run, current_char));
            run.clear();
        }
        run.push(ch);
        current_char = kind;
    }

    if !run.is_empty() {
        result.push_str(&flush_run(&run, current_char));
    }

    result
}

fn flush_run(run: &str, kind: Option<char>) -> String {
    match kind {
        Some('^') => run.red().bold().to_string(),
        Some('-') => run.blue().to_string(),
        _ => run.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use juice_ast::Span;
    use pretty_assertions::assert_eq;

    fn plain(source: &str, diagnostic: &Diagnostic) -> String {
        colored::control::set_override(false);
        DiagnosticFormatter::new(source).with_file_name("main.juice").format(diagnostic)
    }

    #[test]
    fn single_label() {
        let source = "x := 1\ny := )\n";
        let diag = Diagnostic::error("Expected expression, found ')'")
            .with_code("E0100")
            .with_primary(Span::new(12, 13), "expected expression");
        let expected = [
            "error[E0100]: Expected expression, found ')'",
            "  --> main.juice:2:6",
            "    |",
            "  2 | y := )",
            "    |      ^ expected expression",
            "",
        ];
        assert_eq!(plain(source, &diag), expected.join("\n"));
    }

    #[test]
    fn footer_lists_expected_notes_and_help() {
        let diag = Diagnostic::error("stopped")
            .with_expected(&["'a'".to_string(), "'b'".to_string()])
            .with_note("parsing stopped here")
            .with_help("try again");
        let expected = [
            "error: stopped",
            "    = expected: one of 'a', 'b'",
            "    = note: parsing stopped here",
            "    = help: try again",
            "",
        ];
        assert_eq!(plain("", &diag), expected.join("\n"));
    }

    #[test]
    fn skipped_input_and_primary_on_separate_lines() {
        let source = "a := (1 +\ntype T := int\n";
        let diag = Diagnostic::warning("w")
            .with_secondary(Span::new(0, 9), "skipped")
            .with_primary(Span::new(10, 14), "here");
        let out = plain(source, &diag);
        assert!(out.starts_with("warning: w\n  --> main.juice:2:1\n"), "{out}");
        assert!(out.contains("  1 | a := (1 +\n    | --------- skipped\n"), "{out}");
        assert!(out.contains("  2 | type T := int\n    | ^^^^ here\n"), "{out}");
    }
}
