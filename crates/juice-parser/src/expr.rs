// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Expressions: precedence climbing, postfix chains, atoms, and the
//! record-or-block decision for `{`.

use juice_ast::expr::{
    Arg, BinOp, Expr, ExprKind, MacroBody, MacroCall, MatchArm, MatchPattern, RecordField,
    StrLayout, StrLit, StrSegment, StrSegmentKind, UnaryOp,
};
use juice_ast::stmt::Block;
use juice_ast::token::{StrPiece, StrToken, Token, TokenKind};
use juice_ast::Span;
use tracing::trace;

use crate::error::ParseError;
use crate::parser::{Parser, Position};

/// Lowest level a prefix operator's operand absorbs.
const UNARY_OPERAND_LEVEL: u8 = 2;

impl<'t> Parser<'t> {
    pub(crate) fn parse_expr(&mut self, pos: Position) -> Result<Expr, ParseError> {
        self.nested(|p| p.parse_binary(BinOp::MIN_LEVEL, pos))
    }

    /// Precedence climbing over operators of level `min_level` and up.
    /// Pending left operands wait on a stack and fold left to right, so a
    /// long chain never recurses.
    fn parse_binary(&mut self, min_level: u8, pos: Position) -> Result<Expr, ParseError> {
        let mut current = self.parse_unary(pos)?;
        let mut pending: Vec<(Expr, BinOp)> = Vec::new();

        while let Some(op) = BinOp::from_token(self.current_kind()).filter(|op| op.level() >= min_level)
        {
            self.advance();
            while pending.last().is_some_and(|(_, top)| top.level() >= op.level()) {
                if let Some((left, top)) = pending.pop() {
                    current = binary(left, top, current);
                }
            }
            pending.push((current, op));
            current = self.parse_unary(pos.operand())?;
        }

        while let Some((left, op)) = pending.pop() {
            current = binary(left, op, current);
        }
        Ok(current)
    }

    fn parse_unary(&mut self, pos: Position) -> Result<Expr, ParseError> {
        let op = match self.current_kind() {
            TokenKind::Bang => UnaryOp::Not,
            TokenKind::Minus => UnaryOp::Neg,
            _ => return self.parse_postfix(pos),
        };
        let start = self.advance().span;
        let operand = self.nested(|p| p.parse_binary(UNARY_OPERAND_LEVEL, pos.operand()))?;
        let span = start.to(operand.span);
        Ok(Expr::new(ExprKind::Unary { op, operand: Box::new(operand) }, span))
    }

    fn parse_postfix(&mut self, pos: Position) -> Result<Expr, ParseError> {
        let mut expr = self.parse_primary(pos)?;
        let pos = pos.operand();

        loop {
            match self.current_kind() {
                TokenKind::LParen => {
                    let (args, close) = self.parse_args()?;
                    let span = expr.span.to(close);
                    expr = Expr::new(ExprKind::Call { callee: Box::new(expr), args }, span);
                }
                TokenKind::Dot => {
                    self.advance();
                    let member = self.parse_access_chain(pos)?;
                    let span = expr.span.to(member.span);
                    expr = Expr::new(
                        ExprKind::Member { object: Box::new(expr), member: Box::new(member) },
                        span,
                    );
                }
                TokenKind::ColonColon => {
                    self.advance();
                    let member = self.parse_primary(pos)?;
                    expr = type_access(expr, member);
                }
                TokenKind::Question => {
                    if matches!(expr.kind, ExprKind::Try(_)) {
                        return Err(self
                            .error_expected("an operator")
                            .with_hint("'?' can only be applied once"));
                    }
                    if !accepts_try(&expr.kind) {
                        return Err(self.error_expected("an operator").with_hint(
                            "'?' only follows a literal, name, call, tuple or member access",
                        ));
                    }
                    let end = self.advance().span;
                    let span = expr.span.to(end);
                    expr = Expr::new(ExprKind::Try(Box::new(expr)), span);
                }
                _ => break,
            }
        }

        Ok(expr)
    }

    /// Right-hand side of `.`: an atom plus any `::` accesses, which bind
    /// tighter than the member access itself.
    fn parse_access_chain(&mut self, pos: Position) -> Result<Expr, ParseError> {
        let mut member = self.parse_primary(pos)?;
        while self.match_token(&TokenKind::ColonColon) {
            let next = self.parse_primary(pos)?;
            member = type_access(member, next);
        }
        Ok(member)
    }

    pub(crate) fn parse_primary(&mut self, pos: Position) -> Result<Expr, ParseError> {
        let token = self.current();
        let span = token.span;

        let kind = match &token.kind {
            TokenKind::Int { value, radix } => ExprKind::Int { value: *value, radix: *radix },
            TokenKind::Float(value) => ExprKind::Float(*value),
            TokenKind::Bool(value) => ExprKind::Bool(*value),
            TokenKind::Ident(name) => ExprKind::Ident(name.clone()),
            TokenKind::TypeIdent(name) => ExprKind::TypeName(name.clone()),
            TokenKind::Str(string) => {
                self.advance();
                return self.parse_string(string, span);
            }
            TokenKind::MacroIdent(name) => return self.parse_macro_call(name, pos),
            TokenKind::LBracket => return self.parse_list(),
            TokenKind::LParen => return self.parse_paren(),
            TokenKind::LBrace => {
                return match pos {
                    Position::Statement => {
                        let block = self.parse_block()?;
                        let span = block.span;
                        Ok(Expr::new(ExprKind::Block(block), span))
                    }
                    Position::Value => self.parse_brace_value(),
                    Position::Head => Err(self.error_expected("expression")),
                };
            }
            TokenKind::Fn | TokenKind::Static => {
                let decl = self.parse_fn_decl()?;
                let span = decl.span;
                return Ok(Expr::new(ExprKind::Fn(Box::new(decl)), span));
            }
            TokenKind::If => return self.parse_if(),
            TokenKind::Match => return self.parse_match(),
            kind @ (TokenKind::Loop | TokenKind::Await) => {
                return Err(ParseError::reserved_keyword(kind, span));
            }
            _ => return Err(self.error_expected("expression")),
        };

        self.advance();
        Ok(Expr::new(kind, span))
    }

    /// True if the current token can begin an expression.
    pub(crate) fn can_start_expr(&self) -> bool {
        matches!(
            self.current_kind(),
            TokenKind::Int { .. }
                | TokenKind::Float(_)
                | TokenKind::Str(_)
                | TokenKind::Bool(_)
                | TokenKind::Ident(_)
                | TokenKind::TypeIdent(_)
                | TokenKind::MacroIdent(_)
                | TokenKind::LBracket
                | TokenKind::LParen
                | TokenKind::LBrace
                | TokenKind::Fn
                | TokenKind::Static
                | TokenKind::If
                | TokenKind::Match
                | TokenKind::Minus
                | TokenKind::Bang
        )
    }

    // =========================================================================
    // Delimited Atoms
    // =========================================================================

    fn parse_list(&mut self) -> Result<Expr, ParseError> {
        let open = self.expect(&TokenKind::LBracket)?.span;
        let mut items = Vec::new();

        while !self.check(&TokenKind::RBracket) {
            items.push(self.parse_expr(Position::Value)?);
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }

        let close = self.expect(&TokenKind::RBracket)?.span;
        Ok(Expr::new(ExprKind::List(items), open.to(close)))
    }

    /// `(a)` groups, `(a, b, ...)` is a tuple.
    fn parse_paren(&mut self) -> Result<Expr, ParseError> {
        let open = self.expect(&TokenKind::LParen)?.span;
        if self.check(&TokenKind::RParen) {
            return Err(self
                .error_expected("expression")
                .with_hint("'()' is not a value; tuples need at least two elements"));
        }

        let first = self.parse_expr(Position::Value)?;
        if !self.match_token(&TokenKind::Comma) {
            let close = self.expect(&TokenKind::RParen)?.span;
            return Ok(Expr::new(ExprKind::Group(Box::new(first)), open.to(close)));
        }

        if self.check(&TokenKind::RParen) {
            let span = open.to(self.advance().span);
            self.record_error(ParseError::single_element_tuple(span));
            return Ok(Expr::new(ExprKind::Group(Box::new(first)), span));
        }

        let mut items = vec![first];
        loop {
            items.push(self.parse_expr(Position::Value)?);
            if !self.match_token(&TokenKind::Comma) || self.check(&TokenKind::RParen) {
                break;
            }
        }

        let close = self.expect(&TokenKind::RParen)?.span;
        Ok(Expr::new(ExprKind::Tuple(items), open.to(close)))
    }

    /// `( [label:] expr, ... )`, returning the span of the closing paren.
    pub(crate) fn parse_args(&mut self) -> Result<(Vec<Arg>, Span), ParseError> {
        self.expect(&TokenKind::LParen)?;
        let mut args = Vec::new();

        while !self.check(&TokenKind::RParen) {
            let start = self.current().span;
            let label = self.parse_arg_label();
            let value = self.parse_expr(Position::Value)?;
            args.push(Arg { label, span: start.to(value.span), value });
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }

        let close = self.expect(&TokenKind::RParen)?.span;
        Ok((args, close))
    }

    // =========================================================================
    // Macro Calls
    // =========================================================================

    fn parse_macro_call(&mut self, name: &str, pos: Position) -> Result<Expr, ParseError> {
        let name_span = self.advance().span;
        let mut end = name_span;

        let (args, parenthesized) = if self.check(&TokenKind::LParen) {
            let (args, close) = self.parse_args()?;
            end = close;
            (args, true)
        } else {
            (Vec::new(), false)
        };

        let body = if self.check(&TokenKind::LBrace) && pos != Position::Head {
            let body = self.parse_macro_body()?;
            end = body.span;
            Some(body)
        } else {
            None
        };

        if !parenthesized && body.is_none() {
            return Err(self.error_expected("'(' or '{' after a macro name"));
        }

        let call = MacroCall { name: name.to_string(), name_span, parenthesized, args, body };
        Ok(Expr::new(ExprKind::MacroCall(call), name_span.to(end)))
    }

    /// Collect the tokens up to the matching `}` without parsing them.
    fn parse_macro_body(&mut self) -> Result<MacroBody, ParseError> {
        let open = self.expect(&TokenKind::LBrace)?.span;
        let mut tokens: Vec<Token> = Vec::new();
        let mut brace_depth = 0usize;

        loop {
            match self.current_kind() {
                TokenKind::Eof => {
                    return Err(ParseError::missing(&TokenKind::RBrace, &TokenKind::Eof, self.current().span)
                        .with_hint("the macro body is never closed"));
                }
                TokenKind::LBrace => brace_depth += 1,
                TokenKind::RBrace if brace_depth == 0 => break,
                TokenKind::RBrace => brace_depth -= 1,
                _ => {}
            }
            tokens.push(self.advance().clone());
        }

        let close = self.advance().span;
        let inner = Span::new(open.end, close.start);
        self.note_macro_body(inner);
        let text = self.source_text(inner).trim().to_string();
        Ok(MacroBody { span: open.to(close), inner, text, tokens })
    }

    // =========================================================================
    // Strings
    // =========================================================================

    fn parse_string(&mut self, token: &'t StrToken, span: Span) -> Result<Expr, ParseError> {
        let mut segments = Vec::new();
        let mut markers = Vec::new();

        for piece in &token.pieces {
            match piece {
                StrPiece::Text { text, span } => segments.push(StrSegment {
                    kind: StrSegmentKind::Text(text.clone()),
                    span: *span,
                }),
                StrPiece::Escape { value, span } => segments.push(StrSegment {
                    kind: StrSegmentKind::Escape {
                        value: *value,
                        raw: self.source_text(*span).to_string(),
                    },
                    span: *span,
                }),
                StrPiece::Interpolation { tokens, span } => {
                    let expr = self.parse_interpolation(tokens, *span)?;
                    segments.push(StrSegment {
                        kind: StrSegmentKind::Interpolation(Box::new(expr)),
                        span: *span,
                    });
                }
                StrPiece::Indent { span } => markers.push(*span),
            }
        }

        let layout = if token.multiline { StrLayout::MultiLine { markers } } else { StrLayout::Inline };
        Ok(Expr::new(ExprKind::Str(StrLit { segments, layout }), span))
    }

    /// Parse the re-lexed tokens of one `${ ... }`.
    fn parse_interpolation(&mut self, tokens: &'t [Token], span: Span) -> Result<Expr, ParseError> {
        if tokens.iter().all(|t| matches!(t.kind, TokenKind::Eof)) {
            return Err(ParseError::expected("expression", &TokenKind::RBrace, span)
                .with_hint("'${}' needs an expression inside"));
        }
        self.with_tokens(tokens, |p| {
            let expr = p.parse_expr(Position::Value)?;
            if !p.at_end() {
                return Err(p
                    .error_expected("'}' to close the interpolation")
                    .with_hint("an interpolation holds a single expression"));
            }
            Ok(expr)
        })
    }

    // =========================================================================
    // Control Flow
    // =========================================================================

    /// `if c { } else if d { } else { }`, built without recursing per branch.
    fn parse_if(&mut self) -> Result<Expr, ParseError> {
        let first = self.parse_if_branch()?;
        let mut rest = Vec::new();
        let mut tail: Option<Expr> = None;

        while self.match_token(&TokenKind::Else) {
            if self.check(&TokenKind::If) {
                rest.push(self.parse_if_branch()?);
                continue;
            }
            let block = self.parse_block()?;
            let span = block.span;
            tail = Some(Expr::new(ExprKind::Block(block), span));
            break;
        }

        for branch in rest.into_iter().rev() {
            tail = Some(branch.into_expr(tail));
        }
        Ok(first.into_expr(tail))
    }

    fn parse_if_branch(&mut self) -> Result<IfBranch, ParseError> {
        let start = self.expect(&TokenKind::If)?.span;
        let cond = self.parse_expr(Position::Head)?;
        let then_block = self.parse_block()?;
        Ok(IfBranch { start, cond, then_block })
    }

    fn parse_match(&mut self) -> Result<Expr, ParseError> {
        let start = self.expect(&TokenKind::Match)?.span;
        let scrutinee = self.parse_expr(Position::Head)?;
        self.expect(&TokenKind::LBrace)?;
        let mut arms = Vec::new();

        while !self.check(&TokenKind::RBrace) && !self.at_end() && !self.halted() {
            let arm_start = self.pos();
            match self.parse_arm() {
                Ok(arm) => arms.push(arm),
                Err(e) => {
                    self.record_error(e);
                    self.recover(arm_start, Self::synchronize_arm);
                }
            }
        }

        let close = self.expect(&TokenKind::RBrace)?.span;
        Ok(Expr::new(
            ExprKind::Match { scrutinee: Box::new(scrutinee), arms },
            start.to(close),
        ))
    }

    fn parse_arm(&mut self) -> Result<MatchArm, ParseError> {
        let value = self.speculate(|p| {
            let expr = p.parse_expr(Position::Head)?;
            if p.check(&TokenKind::Arrow) {
                Ok(expr)
            } else {
                Err(p.error_expected("'->'"))
            }
        })?;
        let pattern = match value {
            Some(expr) => MatchPattern::Value(expr),
            None => {
                trace!(at = %self.current().span, "arm pattern is not a value, reading a type");
                MatchPattern::Type(self.parse_type()?)
            }
        };

        self.expect(&TokenKind::Arrow)?;
        let body = self.parse_arm_body()?;
        let span = pattern.span().to(body.span);
        Ok(MatchArm { pattern, body, span })
    }

    /// Skip to the end of the current arm, or stop before the match's `}`.
    fn synchronize_arm(&mut self) {
        let mut brace_depth = 0;

        while !self.at_end() {
            match self.current_kind() {
                TokenKind::LBrace => {
                    brace_depth += 1;
                    self.advance();
                }
                TokenKind::RBrace => {
                    if brace_depth == 0 {
                        return;
                    }
                    brace_depth -= 1;
                    self.advance();
                    if brace_depth == 0 {
                        return;
                    }
                }
                _ => {
                    self.advance();
                }
            }
        }
    }

    // =========================================================================
    // Records and Blocks
    // =========================================================================

    /// `{` in a value slot: a record literal if it reads as one, else a block.
    fn parse_brace_value(&mut self) -> Result<Expr, ParseError> {
        if !self.looks_like_record() {
            return self.parse_block_expr();
        }
        let offset = self.current().span.start;

        if !self.failed_records.contains(&offset) {
            if let Some(record) = self.speculate(|p| p.parse_record())? {
                return Ok(record);
            }
            trace!(offset, "not a record literal, trying a block");
            self.failed_records.insert(offset);
        }
        if !self.failed_blocks.contains(&offset) {
            if let Some(block) = self.speculate(|p| p.parse_block_expr())? {
                return Ok(block);
            }
            self.failed_blocks.insert(offset);
        }
        Ok(self.unresolvable_brace())
    }

    /// The result of a match arm: a block if it reads as one, else a record.
    fn parse_arm_body(&mut self) -> Result<Expr, ParseError> {
        if !self.check(&TokenKind::LBrace) {
            return Err(self.error_expected("'{'"));
        }
        let offset = self.current().span.start;

        if !self.failed_blocks.contains(&offset) {
            if let Some(block) = self.speculate(|p| p.parse_block_expr())? {
                return Ok(block);
            }
            trace!(offset, "arm body is not a block, trying a record literal");
            self.failed_blocks.insert(offset);
        }
        if !self.looks_like_record() {
            // Report the block's own errors.
            return self.parse_block_expr();
        }
        if !self.failed_records.contains(&offset) {
            if let Some(record) = self.speculate(|p| p.parse_record())? {
                return Ok(record);
            }
            self.failed_records.insert(offset);
        }
        Ok(self.unresolvable_brace())
    }

    fn parse_block_expr(&mut self) -> Result<Expr, ParseError> {
        let block = self.parse_block()?;
        let span = block.span;
        Ok(Expr::new(ExprKind::Block(block), span))
    }

    /// `{}`, `{ name,` / `{ name }` or `{ name =`.
    fn looks_like_record(&self) -> bool {
        match (self.peek(1), self.peek(2)) {
            (TokenKind::RBrace, _) => true,
            (TokenKind::Ident(_), TokenKind::Comma | TokenKind::RBrace | TokenKind::Eq) => true,
            _ => false,
        }
    }

    fn parse_record(&mut self) -> Result<Expr, ParseError> {
        self.nested(|p| {
            let open = p.expect(&TokenKind::LBrace)?.span;
            let mut fields = Vec::new();

            while !p.check(&TokenKind::RBrace) {
                let (name, name_span) = p.expect_ident()?;
                let field = if p.match_token(&TokenKind::Eq) {
                    let value = p.parse_expr(Position::Value)?;
                    RecordField { name, span: name_span.to(value.span), value: Some(value) }
                } else {
                    RecordField { name, value: None, span: name_span }
                };
                fields.push(field);

                if !p.match_token(&TokenKind::Comma)
                    && !matches!(p.current_kind(), TokenKind::Ident(_) | TokenKind::RBrace)
                {
                    return Err(p.error_expected("',' or '}'"));
                }
            }

            let close = p.advance().span;
            Ok(Expr::new(ExprKind::Record(fields), open.to(close)))
        })
    }

    /// Report a `{` that is neither shape and step over it.
    fn unresolvable_brace(&mut self) -> Expr {
        let span = self.skip_braces();
        trace!(%span, "brace is neither a record nor a block");
        self.record_error(ParseError::unresolvable(span));
        Expr::new(ExprKind::Block(Block { stmts: Vec::new(), span }), span)
    }
}

struct IfBranch {
    start: Span,
    cond: Expr,
    then_block: Block,
}

impl IfBranch {
    fn into_expr(self, else_branch: Option<Expr>) -> Expr {
        let end = else_branch.as_ref().map_or(self.then_block.span, |e| e.span);
        Expr::new(
            ExprKind::If {
                cond: Box::new(self.cond),
                then_block: self.then_block,
                else_branch: else_branch.map(Box::new),
            },
            self.start.to(end),
        )
    }
}

/// Operands `?` may follow. Parenthesised groups, control flow and
/// function values are excluded.
fn accepts_try(kind: &ExprKind) -> bool {
    matches!(
        kind,
        ExprKind::Int { .. }
            | ExprKind::Float(_)
            | ExprKind::Str(_)
            | ExprKind::Bool(_)
            | ExprKind::Ident(_)
            | ExprKind::TypeName(_)
            | ExprKind::List(_)
            | ExprKind::Record(_)
            | ExprKind::Tuple(_)
            | ExprKind::Call { .. }
            | ExprKind::MacroCall(_)
            | ExprKind::Member { .. }
            | ExprKind::TypeAccess { .. }
    )
}

fn binary(left: Expr, op: BinOp, right: Expr) -> Expr {
    let span = left.span.to(right.span);
    Expr::new(ExprKind::Binary { op, left: Box::new(left), right: Box::new(right) }, span)
}

fn type_access(base: Expr, member: Expr) -> Expr {
    let span = base.span.to(member.span);
    Expr::new(ExprKind::TypeAccess { base: Box::new(base), member: Box::new(member) }, span)
}

#[cfg(test)]
mod tests {
    use crate::test_support::{body, expr, expr_errors};
    use crate::ParseErrorKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn precedence_table() {
        assert_eq!(expr("1 + 2 * 3"), "(+ 1 (* 2 3))");
        assert_eq!(expr("1 << 2 + 3"), "(+ (<< 1 2) 3)");
        assert_eq!(expr("a == b + 1"), "(+ (== a b) 1)");
        assert_eq!(expr("a - b - c"), "(- (- a b) c)");
        assert_eq!(expr("a * b + c * d"), "(+ (* a b) (* c d))");
        assert_eq!(expr("a && b || c"), "(|| (&& a b) c)");
    }

    #[test]
    fn prefix_operators() {
        assert_eq!(expr("-a * b"), "(- (* a b))");
        assert_eq!(expr("-a + b"), "(+ (- a) b)");
        assert_eq!(expr("!a == b"), "(! (== a b))");
        assert_eq!(expr("- -a"), "(- (- a))");
    }

    #[test]
    fn postfix_chains() {
        assert_eq!(expr("a.b.c"), "(. (. a b) c)");
        assert_eq!(expr("a.b::c"), "(. a (:: b c))");
        assert_eq!(expr("a::b.c"), "(. (:: a b) c)");
        assert_eq!(expr("a.b(1)?"), "(? (call (. a b) 1))");
        assert_eq!(expr("a.(b + c)"), "(. a (group (+ b c)))");
        assert_eq!(expr("f(x: 1, Y: 2,)"), "(call f (: x 1) (: Y 2))");
        assert_eq!(expr("f()"), "(call f)");
        assert_eq!(expr("map(of: xs, as: Text)"), "(call map (: of xs) (: as Text))");
    }

    #[test]
    fn try_applies_once() {
        assert_eq!(expr("a? + b"), "(+ (? a) b)");
        let errors = expr_errors("a??");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].hint.as_deref(), Some("'?' can only be applied once"));
    }

    #[test]
    fn try_needs_a_base_value() {
        assert_eq!(expr("(a, b)?"), "(? (tuple a b))");
        assert_eq!(expr("m!(x)?"), "(? (macro m (args x)))");
        for src in ["(a + b)?", "if a { b } else { c }?", "match a { 1 -> { b } }?", "fn () { }?"] {
            let errors = expr_errors(src);
            assert_eq!(errors.len(), 1, "{src}");
            assert_eq!(
                errors[0].hint.as_deref(),
                Some("'?' only follows a literal, name, call, tuple or member access"),
                "{src}"
            );
        }

        let errors = crate::parse("fn f() { if a { b } else { c } ? }").errors;
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ParseErrorKind::UnexpectedToken);
    }

    #[test]
    fn atoms() {
        assert_eq!(expr("[1, 2.5, true,]"), "(list 1 2.5 true)");
        assert_eq!(expr("(a, b,)"), "(tuple a b)");
        assert_eq!(expr("(a)"), "(group a)");
        assert_eq!(expr("0xff + Foo"), "(+ 0xff Foo)");
        assert_eq!(expr("fn (x: int) -> int { x }"), "(fn (params (: x int)) (ret int) (block x))");
    }

    #[test]
    fn single_element_tuple_is_reported_once() {
        let errors = expr_errors("(a,)");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ParseErrorKind::SingleElementTuple);
    }

    #[test]
    fn macro_forms() {
        assert_eq!(expr("foo!(1, 2)"), "(macro foo (args 1 2))");
        assert_eq!(expr("foo!{ raw text }"), "(macro foo (body \"raw text\"))");
        assert_eq!(expr("foo!(x: 1){ body }"), "(macro foo (args (: x 1)) (body \"body\"))");
        assert_eq!(expr("foo!{ a { b } \"}\" }"), "(macro foo (body \"a { b } \\\"}\\\"\"))");
    }

    #[test]
    fn macro_needs_args_or_body() {
        let errors = expr_errors("foo! + 1");
        assert_eq!(errors[0].message, "Expected '(' or '{' after a macro name, found '+'");
    }

    #[test]
    fn macro_body_not_taken_in_heads() {
        assert_eq!(body("if ok!(x) { y }"), "(if (macro ok (args x)) (block y))");
    }

    #[test]
    fn string_segments() {
        assert_eq!(expr("\"a${1+1}b\""), "(str (text \"a\") (interp (+ 1 1)) (text \"b\"))");
        assert_eq!(expr("\"x\\ny\""), "(str (text \"x\") (esc \"\\\\n\") (text \"y\"))");
        assert_eq!(expr("\"${ {a = 1} }\""), "(str (interp (record (= a 1))))");
    }

    #[test]
    fn empty_interpolation() {
        let errors = expr_errors("\"${}\"");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "Expected expression, found '}'");
    }

    #[test]
    fn if_chains() {
        assert_eq!(
            body("if a { 1 } else if b { 2 } else { 3 }"),
            "(if a (block 1) (if b (block 2) (block 3)))"
        );
        assert_eq!(body("x := if a { 1 }"), "(:= x (if a (block 1)))");
    }

    #[test]
    fn match_arms() {
        assert_eq!(
            body("match x { 1 -> { a } Foo(int) -> { b = 2 } y -> { c, d } }"),
            "(match x (arm 1 (block a)) (arm (call Foo int) (block (= b 2))) (arm y (record c d)))"
        );
    }

    #[test]
    fn records_and_blocks() {
        assert_eq!(body("x = { a = 1 }"), "(= x (record (= a 1)))");
        assert_eq!(body("{ a = 1 }"), "(block (= a 1))");
        assert_eq!(body("x := {}"), "(:= x (record))");
        assert_eq!(body("x := { a, b = 2 c }"), "(:= x (record a (= b 2) c))");
        assert_eq!(body("x := { a = 1 f() }"), "(:= x (block (= a 1) (call f)))");
        assert_eq!(body("x := { y := 2 y }"), "(:= x (block (:= y 2) y))");
    }

    #[test]
    fn braces_in_heads_belong_to_the_body() {
        assert_eq!(body("if a { b }"), "(if a (block b))");
        assert_eq!(body("for x of xs { }"), "(for-of x xs (block))");
    }

    #[test]
    fn structural_errors_inside_records_are_kept() {
        let out = crate::parse_expression("{ a = (b,) }");
        assert_eq!(out.errors.len(), 1);
        assert_eq!(out.errors[0].kind, ParseErrorKind::SingleElementTuple);
        assert_eq!(
            out.expr.as_ref().map(juice_ast::sexpr::expr_to_sexpr).as_deref(),
            Some("(record (= a (group b)))")
        );
    }

    #[test]
    fn unresolvable_brace() {
        let errors = expr_errors("{ a = 1 ) }");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ParseErrorKind::Unresolvable);
        assert_eq!(errors[0].span, juice_ast::Span::new(0, 11));
    }

    #[test]
    fn reserved_keywords() {
        let errors = expr_errors("loop");
        assert_eq!(errors[0].kind, ParseErrorKind::ReservedKeyword);
    }
}
