// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Type expressions.

use juice_ast::token::TokenKind;
use juice_ast::ty::{BuiltinType, TypeArg, TypeExpr, TypeExprKind, TypeOp};
use juice_ast::Span;

use crate::error::ParseError;
use crate::parser::{Parser, Position};

impl<'t> Parser<'t> {
    /// `A | B & C`, folded left to right.
    pub(crate) fn parse_type(&mut self) -> Result<TypeExpr, ParseError> {
        self.nested(|p| {
            let mut left = p.parse_type_atom()?;
            loop {
                let op = match p.current_kind() {
                    TokenKind::Pipe => TypeOp::Union,
                    TokenKind::Amp => TypeOp::Intersection,
                    _ => break,
                };
                p.advance();
                let right = p.parse_type_atom()?;
                let span = left.span.to(right.span);
                left = TypeExpr::new(
                    TypeExprKind::Binary { op, left: Box::new(left), right: Box::new(right) },
                    span,
                );
            }
            Ok(left)
        })
    }

    fn parse_type_atom(&mut self) -> Result<TypeExpr, ParseError> {
        let token = self.current();
        let span = token.span;

        match &token.kind {
            TokenKind::Ident(name) | TokenKind::TypeIdent(name)
                if matches!(self.peek(1), TokenKind::LParen) =>
            {
                self.advance();
                self.parse_type_call(name, span)
            }
            TokenKind::Ident(name) => {
                self.advance();
                let kind = match BuiltinType::from_name(name) {
                    Some(builtin) => TypeExprKind::Builtin(builtin),
                    None => TypeExprKind::Ident(name.clone()),
                };
                Ok(TypeExpr::new(kind, span))
            }
            TokenKind::TypeIdent(name) => {
                self.advance();
                Ok(TypeExpr::new(TypeExprKind::Named(name.clone()), span))
            }
            TokenKind::Int { .. }
            | TokenKind::Float(_)
            | TokenKind::Str(_)
            | TokenKind::Bool(_)
            | TokenKind::LBracket => {
                let literal = self.parse_primary(Position::Value)?;
                let span = literal.span;
                Ok(TypeExpr::new(TypeExprKind::Literal(Box::new(literal)), span))
            }
            TokenKind::LParen => self.parse_type_paren(),
            _ => Err(self.error_expected("type")),
        }
    }

    /// `name(label: T, U)`.
    fn parse_type_call(&mut self, callee: &str, callee_span: Span) -> Result<TypeExpr, ParseError> {
        self.expect(&TokenKind::LParen)?;
        let mut args = Vec::new();

        while !self.check(&TokenKind::RParen) {
            let start = self.current().span;
            let label = self.parse_arg_label();
            let value = self.parse_type()?;
            args.push(TypeArg { label, span: start.to(value.span), value });
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }

        let close = self.expect(&TokenKind::RParen)?.span;
        Ok(TypeExpr::new(
            TypeExprKind::Call { callee: callee.to_string(), callee_span, args },
            callee_span.to(close),
        ))
    }

    /// `(T)` groups, `(T, U, ...)` is a tuple.
    fn parse_type_paren(&mut self) -> Result<TypeExpr, ParseError> {
        let open = self.expect(&TokenKind::LParen)?.span;
        if self.check(&TokenKind::RParen) {
            return Err(self.error_expected("type").with_hint("use 'unit' for the empty type"));
        }

        let first = self.parse_type()?;
        if !self.match_token(&TokenKind::Comma) {
            let close = self.expect(&TokenKind::RParen)?.span;
            return Ok(TypeExpr::new(TypeExprKind::Group(Box::new(first)), open.to(close)));
        }

        if self.check(&TokenKind::RParen) {
            let span = open.to(self.advance().span);
            self.record_error(ParseError::single_element_tuple(span));
            return Ok(TypeExpr::new(TypeExprKind::Group(Box::new(first)), span));
        }

        let mut items = vec![first];
        loop {
            items.push(self.parse_type()?);
            if !self.match_token(&TokenKind::Comma) || self.check(&TokenKind::RParen) {
                break;
            }
        }

        let close = self.expect(&TokenKind::RParen)?.span;
        Ok(TypeExpr::new(TypeExprKind::Tuple(items), open.to(close)))
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::{errors_of, program};
    use crate::ParseErrorKind;
    use pretty_assertions::assert_eq;

    fn alias(ty: &str) -> String {
        program(&format!("type T := {ty}"))
            .trim_start_matches("(type T ")
            .trim_end_matches(')')
            .to_string()
    }

    #[test]
    fn grouping_and_tuples() {
        assert_eq!(program("type T := (int)"), "(type T (tgroup int))");
        assert_eq!(program("type T := (int, float)"), "(type T (ttuple int float))");
        assert_eq!(program("type T := (int, float,)"), "(type T (ttuple int float))");
    }

    #[test]
    fn operators_fold_left() {
        assert_eq!(program("type T := int | string & Foo"), "(type T (& (| int string) Foo))");
    }

    #[test]
    fn calls_names_and_literals() {
        assert_eq!(
            program("type T := Map(key: string, List(int))"),
            "(type T (tcall Map (: key string) (tcall List int)))"
        );
        assert_eq!(program("type T := list(of: int)"), "(type T (tcall list (: of int)))");
        assert_eq!(program("type T := 1 | \"a\" | [true]"), "(type T (| (| 1 (str (text \"a\"))) (list true)))");
        assert_eq!(alias("custom"), "custom");
        assert_eq!(alias("unit"), "unit");
    }

    #[test]
    fn single_element_type_tuple() {
        let errors = errors_of("type T := (int,)");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ParseErrorKind::SingleElementTuple);
    }

    #[test]
    fn records_are_not_types() {
        let errors = errors_of("x: { a } = 1");
        assert_eq!(errors[0].hint.as_deref(), Some("record literals cannot be used as types"));
    }
}
