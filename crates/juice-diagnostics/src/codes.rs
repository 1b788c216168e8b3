// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Error code registry.
//!
//! Maps error codes (E0001, E0101, etc.) to titles, categories and a short
//! explanation. Used by `juice explain <code>` and for error display.

use std::collections::HashMap;

/// Registry of all known error codes.
pub struct ErrorCodeRegistry {
    codes: HashMap<&'static str, ErrorCodeInfo>,
}

/// Information about a single error code.
pub struct ErrorCodeInfo {
    pub code: &'static str,
    pub title: &'static str,
    pub category: ErrorCategory,
    pub explanation: &'static str,
}

/// Error category for grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Lexical,
    Syntax,
    Structural,
    Limit,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Lexical => write!(f, "Lexical"),
            ErrorCategory::Syntax => write!(f, "Syntax"),
            ErrorCategory::Structural => write!(f, "Structural"),
            ErrorCategory::Limit => write!(f, "Limit"),
        }
    }
}

macro_rules! register_codes {
    ($($code:literal => ($title:literal, $cat:expr, $why:literal)),* $(,)?) => {{
        let mut map = HashMap::new();
        $(
            map.insert($code, ErrorCodeInfo {
                code: $code,
                title: $title,
                category: $cat,
                explanation: $why,
            });
        )*
        map
    }};
}

impl Default for ErrorCodeRegistry {
    fn default() -> Self {
        use ErrorCategory::*;

        Self {
            codes: register_codes! {
                // Lexer errors (E00xx)
                "E0001" => ("unexpected character", Lexical,
                    "The character cannot start any token. Juice has no ';' separators and strings use double quotes."),
                "E0002" => ("unterminated string literal", Lexical,
                    "A string was opened with '\"' but the file ended before it was closed."),
                "E0003" => ("invalid escape sequence", Lexical,
                    "Only \\\" \\\\ \\/ \\b \\f \\n \\r \\t \\$ \\0 and \\u escapes are recognised."),
                "E0004" => ("malformed number", Lexical,
                    "A number literal has a prefix without digits or digits outside its radix."),
                "E0005" => ("number overflow", Lexical,
                    "Integer literals must fit in an unsigned 64-bit value."),
                "E0006" => ("interpolation nested too deeply", Lexical,
                    "String interpolations inside string interpolations are limited in depth."),

                // Syntax errors (E01xx)
                "E0100" => ("unexpected token", Syntax,
                    "The parser found a token that cannot appear here."),
                "E0101" => ("missing token", Syntax,
                    "A closing delimiter or separator is missing."),
                "E0102" => ("ambiguous braces", Syntax,
                    "A '{' in value position reads neither as a record literal nor as a block."),
                "E0103" => ("reserved keyword", Syntax,
                    "'loop' and 'await' are reserved and cannot be used yet."),
                "E0104" => ("export without declaration", Syntax,
                    "'export' must be followed by a function, type or variable declaration."),

                // Structural errors (E02xx)
                "E0200" => ("mixed constructor styles", Structural,
                    "A type body is either all fields ('name: Type') or all constructors ('Name(params)')."),
                "E0201" => ("single-element tuple", Structural,
                    "Tuples need at least two elements; drop the trailing comma to group a single value."),

                // Limits (E03xx)
                "E0300" => ("nesting too deep", Limit,
                    "The input nests deeper than the parser's depth limit; parsing stopped."),
                "E0301" => ("too many errors", Limit,
                    "The error limit was reached; parsing stopped."),
            },
        }
    }
}

impl ErrorCodeRegistry {
    pub fn get(&self, code: &str) -> Option<&ErrorCodeInfo> {
        self.codes.get(code)
    }

    /// All codes in ascending order.
    pub fn all(&self) -> Vec<&ErrorCodeInfo> {
        let mut all: Vec<_> = self.codes.values().collect();
        all.sort_by_key(|info| info.code);
        all
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranges_match_categories() {
        let registry = ErrorCodeRegistry::default();
        for info in registry.all() {
            let expected = match &info.code[..3] {
                "E00" => ErrorCategory::Lexical,
                "E01" => ErrorCategory::Syntax,
                "E02" => ErrorCategory::Structural,
                "E03" => ErrorCategory::Limit,
                other => panic!("unexpected range {other}"),
            };
            assert_eq!(info.category, expected, "{}", info.code);
        }
        assert_eq!(registry.get("E0102").map(|i| i.title), Some("ambiguous braces"));
        assert!(registry.get("E9999").is_none());
    }
}
