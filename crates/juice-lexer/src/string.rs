// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! String-content sub-lexer.
//!
//! A literal is handled in two steps. [`scan`] runs as a logos callback and
//! only finds the closing quote, tracking `${ }` brace depth and strings
//! nested inside interpolations with an explicit mode stack. [`split`] then
//! breaks the body into text, escapes, interpolations and indentation
//! markers, re-lexing each interpolation with absolute offsets.

use juice_ast::token::{StrPiece, StrToken};
use juice_ast::trivia::Comment;
use juice_ast::Span;

use crate::error::LexError;
use crate::lexer::{Lexer, MAX_INTERPOLATION_DEPTH};

/// How a string literal ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrEnd {
    Closed,
    /// Ran into the end of input.
    Open,
}

#[derive(Debug, Clone, Copy)]
enum Mode {
    Str,
    Interp { braces: usize },
}

/// Find the end of a string literal. `rest` starts just after the opening
/// quote; returns the byte length consumed including the closing quote.
pub(crate) fn scan(rest: &str) -> (usize, StrEnd) {
    let bytes = rest.as_bytes();
    let mut modes = vec![Mode::Str];
    let mut i = 0;

    while i < bytes.len() {
        let next = bytes.get(i + 1).copied();
        match modes.last_mut() {
            Some(Mode::Str) => match bytes[i] {
                b'\\' => i += 1,
                b'"' => {
                    modes.pop();
                    if modes.is_empty() {
                        return (i + 1, StrEnd::Closed);
                    }
                }
                b'$' if next == Some(b'{') => {
                    modes.push(Mode::Interp { braces: 0 });
                    i += 1;
                }
                _ => {}
            },
            Some(Mode::Interp { braces }) => match bytes[i] {
                b'{' => *braces += 1,
                b'}' if *braces == 0 => {
                    modes.pop();
                }
                b'}' => *braces -= 1,
                b'"' => modes.push(Mode::Str),
                b'/' if next == Some(b'/') => {
                    while i < bytes.len() && bytes[i] != b'\n' {
                        i += 1;
                    }
                    continue;
                }
                _ => {}
            },
            None => break,
        }
        i += 1;
    }
    (bytes.len(), StrEnd::Open)
}

/// Output of [`split`].
pub(crate) struct SplitString {
    pub token: StrToken,
    pub errors: Vec<LexError>,
    pub comments: Vec<Comment>,
}

/// Split a string body into pieces. `base` is the absolute offset of the
/// body and `depth` the interpolation level the literal itself sits at.
pub(crate) fn split(body: &str, base: usize, depth: usize) -> SplitString {
    let mut splitter = Splitter {
        body,
        base,
        depth,
        pieces: Vec::new(),
        errors: Vec::new(),
        comments: Vec::new(),
        text_start: 0,
    };
    let multiline = splitter.run();
    SplitString {
        token: StrToken { multiline, pieces: splitter.pieces },
        errors: splitter.errors,
        comments: splitter.comments,
    }
}

struct Splitter<'a> {
    body: &'a str,
    base: usize,
    depth: usize,
    pieces: Vec<StrPiece>,
    errors: Vec<LexError>,
    comments: Vec<Comment>,
    /// Start of the pending text run.
    text_start: usize,
}

impl<'a> Splitter<'a> {
    fn run(&mut self) -> bool {
        let body = self.body;
        let bytes = body.as_bytes();
        let lead = bytes
            .iter()
            .take_while(|b| matches!(b, b' ' | b'\t' | b'\r'))
            .count();
        let multiline = bytes.get(lead) == Some(&b'\n');

        let (start, end) = if multiline {
            let start = lead + 1;
            // Drop the final line break and the indentation before the quote
            let end = match body.rfind('\n') {
                Some(nl) if body[nl + 1..].bytes().all(|b| matches!(b, b' ' | b'\t' | b'\r')) => {
                    nl.max(start)
                }
                _ => bytes.len(),
            };
            (start, end)
        } else {
            (0, bytes.len())
        };

        self.text_start = start;
        let mut i = start;
        let mut line_start = multiline;
        while i < end {
            if line_start {
                line_start = false;
                if let Some(len) = indent_marker(&body[i..end]) {
                    self.flush_text(i);
                    self.pieces.push(StrPiece::Indent { span: self.span(i, i + len) });
                    i += len;
                    self.text_start = i;
                    continue;
                }
            }
            match bytes[i] {
                b'\\' => {
                    self.flush_text(i);
                    i = self.escape(i, end);
                    self.text_start = i;
                }
                b'$' if bytes.get(i + 1) == Some(&b'{') && i + 1 < end => {
                    self.flush_text(i);
                    i = self.interpolation(i, end);
                    self.text_start = i;
                }
                b'\n' => {
                    line_start = multiline;
                    i += 1;
                }
                _ => i += 1,
            }
        }
        self.flush_text(end);
        multiline
    }

    fn span(&self, start: usize, end: usize) -> Span {
        Span::new(self.base + start, self.base + end)
    }

    fn flush_text(&mut self, end: usize) {
        let body = self.body;
        if end > self.text_start {
            self.pieces.push(StrPiece::Text {
                text: body[self.text_start..end].to_string(),
                span: self.span(self.text_start, end),
            });
        }
        self.text_start = end;
    }

    /// Decode the escape at `start` (the backslash). Returns the offset after it.
    fn escape(&mut self, start: usize, end: usize) -> usize {
        let body = self.body;
        let rest = &body[start + 1..end];
        let Some(c) = rest.chars().next() else {
            let span = self.span(start, start + 1);
            self.errors.push(LexError::invalid_escape("\\", span));
            self.pieces.push(StrPiece::Escape { value: '\\', span });
            return start + 1;
        };
        let simple = match c {
            '"' => Some('"'),
            '\\' => Some('\\'),
            '/' => Some('/'),
            'b' => Some('\u{8}'),
            'f' => Some('\u{c}'),
            'n' => Some('\n'),
            'r' => Some('\r'),
            't' => Some('\t'),
            '$' => Some('$'),
            '0' => Some('\0'),
            _ => None,
        };
        let (value, len) = match simple {
            Some(value) => (Some(value), 1),
            None if c == 'u' => match unicode_escape(&rest[1..]) {
                Some((value, len)) => (Some(value), 1 + len),
                None => (None, 1),
            },
            None => (None, c.len_utf8()),
        };
        let stop = start + 1 + len;
        let span = self.span(start, stop);
        let value = value.unwrap_or_else(|| {
            self.errors
                .push(LexError::invalid_escape(&body[start..stop], span));
            c
        });
        self.pieces.push(StrPiece::Escape { value, span });
        stop
    }

    /// Re-lex the `${ ... }` at `start`. Returns the offset after the closing brace.
    fn interpolation(&mut self, start: usize, end: usize) -> usize {
        let body = self.body;
        let inner_start = start + 2;
        let (inner_end, stop) = match closing_brace(&body[inner_start..end]) {
            Some(len) => (inner_start + len, inner_start + len + 1),
            None => (end, end),
        };
        let span = self.span(start, stop);

        if self.depth + 1 > MAX_INTERPOLATION_DEPTH {
            self.errors.push(LexError::nesting_too_deep(span));
            return stop;
        }

        let inner = &body[inner_start..inner_end];
        let mut nested = Lexer::nested(inner, self.base + inner_start, self.depth + 1);
        let result = nested.tokenize();
        self.errors.extend(result.errors);
        self.comments.extend(result.comments);
        self.pieces.push(StrPiece::Interpolation { tokens: result.tokens, span });
        stop
    }
}

/// Length of a leading `[ \t]*|` marker plus the single space after it.
/// A bare `|` at the end of a line also counts.
fn indent_marker(line: &str) -> Option<usize> {
    let bytes = line.as_bytes();
    let ws = bytes.iter().take_while(|b| matches!(b, b' ' | b'\t')).count();
    if bytes.get(ws) != Some(&b'|') {
        return None;
    }
    match bytes.get(ws + 1) {
        Some(b' ') => Some(ws + 2),
        None | Some(b'\n') | Some(b'\r') => Some(ws + 1),
        Some(_) => None,
    }
}

/// `{1-6 hex}` or exactly four hex digits. Returns the char and bytes used.
fn unicode_escape(rest: &str) -> Option<(char, usize)> {
    let (hex, len) = if let Some(braced) = rest.strip_prefix('{') {
        let close = braced.find('}')?;
        let hex = &braced[..close];
        if hex.is_empty() || hex.len() > 6 {
            return None;
        }
        (hex, close + 2)
    } else {
        let hex = rest.get(..4)?;
        (hex, 4)
    };
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let code = u32::from_str_radix(hex, 16).ok()?;
    char::from_u32(code).map(|c| (c, len))
}

/// Offset of the `}` closing an interpolation whose contents start `inner`.
fn closing_brace(inner: &str) -> Option<usize> {
    let bytes = inner.as_bytes();
    let mut braces = 0usize;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'{' => braces += 1,
            b'}' if braces == 0 => return Some(i),
            b'}' => braces -= 1,
            b'"' => {
                // Nested string: reuse the literal scanner
                let (len, end) = scan(&inner[i + 1..]);
                if end == StrEnd::Open {
                    return None;
                }
                i += len;
            }
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
                continue;
            }
            _ => {}
        }
        i += 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use crate::{LexErrorKind, Lexer};
    use juice_ast::token::{StrPiece, StrToken, TokenKind};
    use juice_ast::Span;
    use pretty_assertions::assert_eq;

    fn string_token(source: &str) -> StrToken {
        let result = Lexer::new(source).tokenize();
        assert!(result.is_ok(), "unexpected errors: {:?}", result.errors);
        match &result.tokens[0].kind {
            TokenKind::Str(token) => token.clone(),
            other => panic!("expected a string, got {other:?}"),
        }
    }

    fn text(text: &str, start: usize) -> StrPiece {
        StrPiece::Text { text: text.to_string(), span: Span::new(start, start + text.len()) }
    }

    #[test]
    fn interpolation_tokens_use_absolute_offsets() {
        let token = string_token(r#""a${1+1}b""#);
        assert!(!token.multiline);
        assert_eq!(token.pieces.len(), 3);
        assert_eq!(token.pieces[0], text("a", 1));
        assert_eq!(token.pieces[2], text("b", 8));
        let StrPiece::Interpolation { tokens, span } = &token.pieces[1] else {
            panic!("expected an interpolation");
        };
        assert_eq!(*span, Span::new(2, 8));
        let spans: Vec<_> = tokens.iter().map(|t| t.span).collect();
        assert_eq!(
            spans,
            vec![Span::new(4, 5), Span::new(5, 6), Span::new(6, 7), Span::point(7)]
        );
    }

    #[test]
    fn braces_and_strings_inside_interpolation() {
        let result = Lexer::new(r#"x := "a${ f("}") }b" y"#).tokenize();
        assert!(result.is_ok());
        let kinds: Vec<_> = result.tokens.iter().map(|t| t.kind.display_name()).collect();
        assert_eq!(kinds, vec!["a name", "':='", "a string", "a name", "end of file"]);
        let TokenKind::Str(token) = &result.tokens[2].kind else {
            panic!("expected a string");
        };
        let StrPiece::Interpolation { tokens, .. } = &token.pieces[1] else {
            panic!("expected an interpolation");
        };
        assert_eq!(tokens.len(), 5);
    }

    #[test]
    fn escapes() {
        let token = string_token(r#""\n\u{41}\u0042\$\/""#);
        let values: Vec<_> = token
            .pieces
            .iter()
            .map(|p| match p {
                StrPiece::Escape { value, .. } => *value,
                other => panic!("expected an escape, got {other:?}"),
            })
            .collect();
        assert_eq!(values, vec!['\n', 'A', 'B', '$', '/']);
        assert_eq!(token.pieces[1].span(), Span::new(3, 9));
    }

    #[test]
    fn invalid_escape_is_reported_and_kept() {
        let result = Lexer::new(r#""a\qb""#).tokenize();
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].kind, LexErrorKind::InvalidEscape("\\q".to_string()));
        assert_eq!(result.errors[0].span, Span::new(2, 4));
        let TokenKind::Str(token) = &result.tokens[0].kind else {
            panic!("expected a string");
        };
        assert_eq!(token.pieces.len(), 3);
        assert_eq!(token.pieces[1], StrPiece::Escape { value: 'q', span: Span::new(2, 4) });
    }

    #[test]
    fn lone_dollar_is_text() {
        let token = string_token(r#""costs $5""#);
        assert_eq!(token.pieces, vec![text("costs $5", 1)]);
    }

    #[test]
    fn unterminated_string_spans_to_end() {
        let result = Lexer::new("x := \"abc").tokenize();
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].kind, LexErrorKind::UnterminatedString);
        assert_eq!(result.errors[0].span, Span::new(5, 9));
        assert_eq!(result.tokens.len(), 4);
    }

    #[test]
    fn multiline_markers() {
        let source = "\"\n  | hello\n  | world\n  \"";
        let token = string_token(source);
        assert!(token.multiline);
        assert_eq!(
            token.pieces,
            vec![
                StrPiece::Indent { span: Span::new(2, 6) },
                text("hello\n", 6),
                StrPiece::Indent { span: Span::new(12, 16) },
                text("world", 16),
            ]
        );
    }

    #[test]
    fn multiline_unmarked_lines_stay_verbatim() {
        let token = string_token("\"\n  | a\n    b\n\"");
        assert_eq!(
            token.pieces,
            vec![
                StrPiece::Indent { span: Span::new(2, 6) },
                text("a\n    b", 6),
            ]
        );
    }

    #[test]
    fn interpolation_nesting_is_bounded() {
        let mut source = "1".to_string();
        for _ in 0..80 {
            source = format!("\"${{{source}}}\"");
        }
        let result = Lexer::new(&source).tokenize();
        assert!(result
            .errors
            .iter()
            .any(|e| e.kind == LexErrorKind::NestingTooDeep));
    }
}
