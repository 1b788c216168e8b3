// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Error hints - suggestions for fixing common mistakes.
//!
//! Kept separate from the main parser to avoid clutter.

use juice_ast::token::TokenKind;

/// Get a hint for an "expected X" error based on context.
pub fn for_expected(expected: &str, found: &TokenKind) -> Option<&'static str> {
    match (expected, found) {
        // Declaration hints
        ("':=', ':' or '='", TokenKind::LParen) => {
            Some("calls are only allowed inside function bodies")
        }
        ("':=', ':' or '='", _) => Some("declare with 'name := value' or assign with 'name = value'"),
        ("a declaration", TokenKind::MacroIdent(_)) => {
            Some("macro calls are only allowed inside function bodies")
        }
        ("a declaration", _) => Some("start with 'fn', 'type', 'impl', 'import' or 'name :='"),

        // Block hints
        ("'{'", _) => Some("blocks start with '{'"),
        ("'}'", _) => Some("every '{' needs a matching '}'"),

        // Parentheses hints
        ("')'", TokenKind::Eof) => Some("add ')' to close the parenthesis"),
        ("']'", TokenKind::Eof) => Some("add ']' to close the bracket"),

        // Colon hints
        ("'='", TokenKind::ColonEq) => Some("with a type annotation, write 'name: Type = value'"),

        // Macro hints
        ("'(' or '{' after a macro name", TokenKind::LBrace) => {
            Some("a macro body is not allowed here; wrap the call in parentheses")
        }
        ("'(' or '{' after a macro name", _) => Some("call a macro with 'name!(args)' or 'name!{ body }'"),

        // Expression hints
        ("expression", TokenKind::LBrace) => {
            Some("a '{' here starts a body; wrap record literals in parentheses")
        }
        ("expression", TokenKind::Eq) => Some("put the value after '='"),
        ("expression", TokenKind::Eof) => Some("the expression is incomplete"),
        ("expression", _) => Some("try a value, variable, or function call"),

        // Name hints
        ("a name", TokenKind::Int { .. }) => Some("names can't start with a number"),
        ("a name", TokenKind::TypeIdent(_)) => Some("value names start with a lowercase letter"),
        ("a name", _) => Some("names start with a lowercase letter or '_'"),
        ("a type name", TokenKind::Ident(_)) => {
            Some("type names start with an uppercase letter, or use the 'type' keyword")
        }

        // Type hints
        ("type", TokenKind::LBrace) => Some("record literals cannot be used as types"),
        ("type", _) => Some("try a type like 'int', 'string', or a type name"),

        // Impl hints
        ("'fn'", _) => Some("impl bodies may only contain functions"),

        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn call_at_root_hint() {
        assert_eq!(
            for_expected("':=', ':' or '='", &TokenKind::LParen),
            Some("calls are only allowed inside function bodies")
        );
        assert_eq!(for_expected("')'", &TokenKind::Comma), None);
    }
}
