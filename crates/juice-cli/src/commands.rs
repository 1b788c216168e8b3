// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Subcommand implementations. Each returns whether the input was clean.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use juice_ast::sexpr::item_to_sexpr;
use juice_ast::trivia::CommentList;
use juice_diagnostics::codes::ErrorCodeRegistry;
use juice_diagnostics::formatter::DiagnosticFormatter;
use juice_diagnostics::json::{to_json_report, to_json_string};
use juice_diagnostics::{collect_diagnostics, Diagnostic, ToDiagnostic};
use juice_parser::{ParseOptions, ParseOutput};
use tracing::debug;

use crate::output;
use crate::Format;

fn read_source(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

/// Diagnostics as text or a JSON report.
pub(crate) fn render_diagnostics(
    diagnostics: &[Diagnostic],
    source: &str,
    file: &str,
    format: Format,
) -> String {
    match format {
        Format::Text => DiagnosticFormatter::new(source).with_file_name(file).format_all(diagnostics),
        Format::Json => to_json_string(&to_json_report(diagnostics, source, file)),
    }
}

pub fn cmd_lex(path: &Path) -> Result<bool> {
    let source = read_source(path)?;
    let file = path.display().to_string();
    let result = juice_lexer::tokenize(&source);

    if !result.is_ok() {
        let diagnostics: Vec<Diagnostic> = result.errors.iter().map(ToDiagnostic::to_diagnostic).collect();
        eprint!("{}", render_diagnostics(&diagnostics, &source, &file, Format::Text));
        eprintln!("\n{}", output::banner_fail("Lex", diagnostics.len()));
        return Ok(false);
    }

    if let Some(shebang) = result.shebang {
        println!("{:>4}:{:<4} shebang", shebang.start, shebang.end);
    }
    for tok in &result.tokens {
        println!("{:>4}:{:<4} {:?}", tok.span.start, tok.span.end, tok.kind);
    }
    let detail = format!("{} tokens, {} comments", result.tokens.len(), result.comments.len());
    println!("\n{}", output::banner_ok("Lex", &detail));
    Ok(true)
}

/// `parse` prints the tree, `check` only the verdict.
pub fn cmd_parse(path: &Path, options: &ParseOptions, format: Format, print_tree: bool) -> Result<bool> {
    let source = read_source(path)?;
    let file = path.display().to_string();
    debug!(file = %file, ?options, "parsing");

    let parsed = juice_parser::parse_with_options(&source, options);
    let diagnostics = collect_diagnostics(&parsed);

    if format == Format::Json {
        println!("{}", render_diagnostics(&diagnostics, &source, &file, format));
        return Ok(diagnostics.is_empty());
    }

    if !diagnostics.is_empty() {
        eprint!("{}", render_diagnostics(&diagnostics, &source, &file, format));
        eprintln!("\n{}", output::banner_fail("Parse", diagnostics.len()));
        return Ok(false);
    }

    if print_tree {
        print!("{}", tree_with_comments(&parsed));
    }
    let detail = format!("{} items in {}", parsed.program.items.len(), output::file_path(&file));
    println!("{}", output::banner_ok("Parse", &detail));
    Ok(true)
}

/// The tree dump, one item per line, with each comment printed before the
/// item it precedes.
pub(crate) fn tree_with_comments(parsed: &ParseOutput) -> String {
    let mut comments = CommentList::new(parsed.comments.clone());
    let mut out = String::new();

    for item in &parsed.program.items {
        for comment in comments.take_before(item.span.start) {
            out.push_str(&format!("{}\n", comment.text.dimmed()));
        }
        out.push_str(&item_to_sexpr(item));
        out.push('\n');
    }
    for comment in comments.take_rest() {
        out.push_str(&format!("{}\n", comment.text.dimmed()));
    }
    out
}

pub fn cmd_explain(code: Option<&str>) -> bool {
    let registry = ErrorCodeRegistry::default();

    let Some(code) = code else {
        println!("{}", output::section_header("Error codes:"));
        for info in registry.all() {
            println!("  {}  {:<10}  {}", output::code(info.code), info.category.to_string(), info.title);
        }
        return true;
    };

    let Some(info) = registry.get(&code.to_ascii_uppercase()) else {
        eprintln!("{}: unknown error code `{}`", output::error_label(), code);
        eprintln!();
        eprintln!("Error codes use the format E0NNN (e.g., E0100, E0201).");
        eprintln!("Run `juice explain` to list them.");
        return false;
    };

    println!("{}[{}]: {}", "error".red().bold(), output::code(info.code), info.title.bold());
    println!();
    println!("  Category: {}", info.category);
    println!();
    println!("  {}", info.explanation);
    println!();
    println!("  Run `juice check <file>` to see this error in context.");
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn comments_precede_their_items() {
        colored::control::set_override(false);
        let parsed = juice_parser::parse("// one\nx := 1\n// two\nfn f() { }\n// tail\n");
        assert_eq!(
            tree_with_comments(&parsed),
            "// one\n(:= x 1)\n// two\n(fn f (params) (block))\n// tail\n"
        );
    }

    #[test]
    fn json_rendering_is_valid() {
        let source = "x := )";
        let parsed = juice_parser::parse(source);
        let rendered = render_diagnostics(&collect_diagnostics(&parsed), source, "bad.juice", Format::Json);
        assert!(rendered.contains("\"code\": \"E0100\""), "{rendered}");
        assert!(rendered.contains("\"file\": \"bad.juice\""), "{rendered}");
    }

    #[test]
    fn explain_known_and_unknown_codes() {
        assert!(cmd_explain(Some("e0201")));
        assert!(cmd_explain(None));
        assert!(!cmd_explain(Some("E9999")));
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = cmd_lex(Path::new("/nonexistent/missing.juice")).unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }
}
