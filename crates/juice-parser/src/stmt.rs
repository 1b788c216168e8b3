// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Blocks and the statements inside them.

use juice_ast::stmt::{Assign, Block, ForIter, ForLoop, Stmt, StmtKind, VarDecl};
use juice_ast::token::TokenKind;

use crate::error::ParseError;
use crate::parser::{Parser, Position};

impl<'t> Parser<'t> {
    /// Parse `{ stmt* }`. Statement errors are recorded and skipped.
    pub(crate) fn parse_block(&mut self) -> Result<Block, ParseError> {
        self.nested(|p| p.parse_block_inner())
    }

    fn parse_block_inner(&mut self) -> Result<Block, ParseError> {
        let open = self.expect(&TokenKind::LBrace)?.span;
        let mut stmts = Vec::new();

        while !self.check(&TokenKind::RBrace) && !self.at_end() && !self.halted() {
            let start = self.pos();
            match self.parse_stmt() {
                Ok(stmt) => stmts.push(stmt),
                Err(e) => {
                    self.record_error(e);
                    self.recover(start, Self::synchronize_in_block);
                }
            }
        }

        if self.check(&TokenKind::RBrace) {
            let close = self.advance().span;
            return Ok(Block { stmts, span: open.to(close) });
        }
        let err = ParseError::missing(&TokenKind::RBrace, self.current_kind(), self.current().span);
        if self.at_end() && !self.halted() {
            // Keep what was parsed; the missing brace is reported once.
            self.record_error(err);
            let end = self.current().span;
            return Ok(Block { stmts, span: open.to(end) });
        }
        Err(err)
    }

    pub(crate) fn parse_stmt(&mut self) -> Result<Stmt, ParseError> {
        let start = self.current().span;

        let kind = match self.current_kind() {
            TokenKind::Return => {
                self.advance();
                let value = if self.can_start_expr() && !self.starts_assignment() {
                    Some(self.parse_expr(Position::Value)?)
                } else {
                    None
                };
                StmtKind::Return(value)
            }
            TokenKind::Break => {
                self.advance();
                StmtKind::Break
            }
            TokenKind::Continue => {
                self.advance();
                StmtKind::Continue
            }
            TokenKind::For => StmtKind::For(self.parse_for()?),
            TokenKind::Fn | TokenKind::Static => StmtKind::Fn(self.parse_fn_decl()?),
            TokenKind::LBrace => StmtKind::Block(self.parse_block()?),
            TokenKind::Ident(_) if self.starts_declaration() => {
                StmtKind::VarDecl(self.parse_var_decl()?)
            }
            TokenKind::Ident(_) if matches!(self.peek(1), TokenKind::Eq) => {
                StmtKind::Assign(self.parse_assign()?)
            }
            kind @ (TokenKind::Loop | TokenKind::Await) => {
                return Err(ParseError::reserved_keyword(kind, start));
            }
            kind @ (TokenKind::Import
            | TokenKind::Foreign
            | TokenKind::Type
            | TokenKind::Impl
            | TokenKind::Export) => {
                return Err(self
                    .error_expected("a statement")
                    .with_hint(format!("{} is only allowed at the top level", kind.display_name())));
            }
            TokenKind::TypeIdent(_) if matches!(self.peek(1), TokenKind::ColonEq) => {
                return Err(self
                    .error_expected("a statement")
                    .with_hint("type declarations are only allowed at the top level"));
            }
            _ => StmtKind::Expr(self.parse_expr(Position::Statement)?),
        };

        Ok(Stmt { kind, span: self.span_from(start) })
    }

    /// `name := value` or `name: Type = value`.
    pub(crate) fn parse_var_decl(&mut self) -> Result<VarDecl, ParseError> {
        let (name, name_span) = self.expect_ident()?;
        let ty = if self.match_token(&TokenKind::Colon) {
            let ty = self.parse_type()?;
            if !self.check(&TokenKind::Eq) {
                return Err(self.error_expected("'='"));
            }
            self.advance();
            Some(ty)
        } else {
            self.expect(&TokenKind::ColonEq)?;
            None
        };
        let value = self.parse_expr(Position::Value)?;
        Ok(VarDecl { name, name_span, ty, value })
    }

    /// `name = value`.
    pub(crate) fn parse_assign(&mut self) -> Result<Assign, ParseError> {
        let (name, name_span) = self.expect_ident()?;
        self.expect(&TokenKind::Eq)?;
        let value = self.parse_expr(Position::Value)?;
        Ok(Assign { name, name_span, value })
    }

    /// `for { }`, `for cond { }`, `for x of iter { }` or `for a..b { }`.
    fn parse_for(&mut self) -> Result<ForLoop, ParseError> {
        self.expect(&TokenKind::For)?;

        if self.check(&TokenKind::LBrace) {
            let body = self.parse_block()?;
            return Ok(ForLoop { binding: None, iter: None, body });
        }

        let binding = match (self.current_kind(), self.peek(1)) {
            (TokenKind::Ident(name), TokenKind::Of) => {
                self.advance();
                self.advance();
                Some(name.clone())
            }
            _ => None,
        };

        let first = self.parse_expr(Position::Head)?;
        let iter = if self.match_token(&TokenKind::DotDot) {
            let end = self.parse_expr(Position::Head)?;
            ForIter::Range { start: first, end }
        } else {
            ForIter::Expr(first)
        };

        let body = self.parse_block()?;
        Ok(ForLoop { binding, iter: Some(iter), body })
    }

    /// `name =` at the current token.
    fn starts_assignment(&self) -> bool {
        self.starts_declaration()
            || (matches!(self.current_kind(), TokenKind::Ident(_))
                && matches!(self.peek(1), TokenKind::Eq))
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::{body, errors_of};
    use pretty_assertions::assert_eq;

    #[test]
    fn declarations_and_assignments() {
        assert_eq!(body("x := 1 y: int = 2 x = y"), "(:= x 1) (: y int 2) (= x y)");
    }

    #[test]
    fn control_statements() {
        assert_eq!(
            body("for { break } for x of xs { continue } for 0..10 { return }"),
            "(for (block (break))) (for-of x xs (block (continue))) (for (.. 0 10) (block (return)))"
        );
        assert_eq!(body("for i < 3 { i = i + 1 }"), "(for (< i 3) (block (= i (+ i 1))))");
    }

    #[test]
    fn return_value_is_optional() {
        assert_eq!(body("return x := 1"), "(return) (:= x 1)");
        assert_eq!(body("return 1 + 2"), "(return (+ 1 2))");
    }

    #[test]
    fn nested_functions_and_blocks() {
        assert_eq!(
            body("fn inner(a) { a } { b := 2 }"),
            "(fn inner (params a) (block a)) (block (:= b 2))"
        );
    }

    #[test]
    fn top_level_only_statements() {
        let errors = errors_of("fn f() { import foo x := 1 }");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].hint.as_deref(), Some("'import' is only allowed at the top level"));
    }

    #[test]
    fn recovery_inside_block() {
        let out = crate::parse("fn f() { x := ) y := 2 }");
        assert_eq!(out.errors.len(), 1);
        assert_eq!(
            juice_ast::sexpr::to_sexpr(&out.program),
            "(fn f (params) (block (:= y 2)))"
        );
    }

    #[test]
    fn unclosed_block_keeps_statements() {
        let out = crate::parse("fn f() { x := 1");
        assert_eq!(out.errors.len(), 1);
        assert_eq!(out.errors[0].message, "Unclosed '{' - missing '}'");
        assert_eq!(juice_ast::sexpr::to_sexpr(&out.program), "(fn f (params) (block (:= x 1)))");
    }
}
