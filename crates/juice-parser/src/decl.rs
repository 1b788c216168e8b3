// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Root statements: imports, functions, types, impls and top-level bindings.

use juice_ast::decl::{
    Constructor, Exposed, FieldShorthand, FnDecl, FnName, ImplDecl, ImportDecl, Item, ItemKind,
    Param, TypeBody, TypeConstructors, TypeDecl, TypeParam,
};
use juice_ast::token::TokenKind;
use tracing::trace;

use crate::error::ParseError;
use crate::parser::Parser;

/// One entry of a constructors block, before the style check.
enum ConstructorItem {
    Field(FieldShorthand),
    Full(Constructor),
}

impl ConstructorItem {
    fn into_constructors(self) -> TypeConstructors {
        match self {
            ConstructorItem::Field(field) => TypeConstructors::Shorthand(vec![field]),
            ConstructorItem::Full(ctor) => TypeConstructors::Full(vec![ctor]),
        }
    }
}

impl<'t> Parser<'t> {
    pub(crate) fn parse_item(&mut self) -> Result<Item, ParseError> {
        let start = self.current().span;
        let exported = self.match_token(&TokenKind::Export);
        if exported && !self.starts_exportable() {
            let span = start.to(self.current().span);
            return Err(ParseError::export_not_declaration(self.current_kind(), span));
        }

        let kind = match self.current_kind() {
            TokenKind::Import | TokenKind::Foreign => ItemKind::Import(self.parse_import()?),
            TokenKind::Fn | TokenKind::Static => ItemKind::Fn(self.parse_fn_decl()?),
            TokenKind::Type => ItemKind::Type(self.parse_type_decl()?),
            TokenKind::TypeIdent(_) if matches!(self.peek(1), TokenKind::ColonEq | TokenKind::LParen) => {
                ItemKind::Type(self.parse_type_decl()?)
            }
            TokenKind::Impl => ItemKind::Impl(self.parse_impl()?),
            TokenKind::Ident(_) => match self.peek(1) {
                TokenKind::ColonEq | TokenKind::Colon => ItemKind::VarDecl(self.parse_var_decl()?),
                TokenKind::Eq => ItemKind::Assign(self.parse_assign()?),
                found => {
                    return Err(ParseError::expected("':=', ':' or '='", found, self.peek_span(1)));
                }
            },
            kind @ (TokenKind::Loop | TokenKind::Await) => {
                return Err(ParseError::reserved_keyword(kind, self.current().span));
            }
            _ => {
                return Err(self
                    .error_expected("a declaration")
                    .with_expected(&["'import'", "'fn'", "'type'", "'impl'", "a name"]));
            }
        };

        Ok(Item { kind, exported, span: self.span_from(start) })
    }

    /// What may follow `export`.
    fn starts_exportable(&self) -> bool {
        match self.current_kind() {
            TokenKind::Fn | TokenKind::Static | TokenKind::Type => true,
            TokenKind::TypeIdent(_) => matches!(self.peek(1), TokenKind::ColonEq | TokenKind::LParen),
            TokenKind::Ident(_) => self.starts_declaration(),
            _ => false,
        }
    }

    // =========================================================================
    // Imports
    // =========================================================================

    /// `[foreign] import [.]a.b.c [as alias] [(x, y!)]`
    fn parse_import(&mut self) -> Result<ImportDecl, ParseError> {
        let foreign = self.match_token(&TokenKind::Foreign);
        self.expect(&TokenKind::Import)?;
        let relative = self.match_token(&TokenKind::Dot);

        let mut path = vec![self.expect_any_ident()?.0];
        while self.match_token(&TokenKind::Dot) {
            path.push(self.expect_any_ident()?.0);
        }

        let alias = if self.match_token(&TokenKind::As) {
            Some(self.expect_any_ident()?.0)
        } else {
            None
        };

        let mut expose = Vec::new();
        if self.match_token(&TokenKind::LParen) {
            while !self.check(&TokenKind::RParen) {
                let token = self.current();
                let (name, is_macro) = match &token.kind {
                    TokenKind::Ident(name) | TokenKind::TypeIdent(name) => (name.clone(), false),
                    TokenKind::MacroIdent(name) => (name.clone(), true),
                    _ => return Err(self.error_expected("a name")),
                };
                self.advance();
                expose.push(Exposed { name, is_macro, span: token.span });
                if !self.match_token(&TokenKind::Comma) {
                    break;
                }
            }
            self.expect(&TokenKind::RParen)?;
        }

        Ok(ImportDecl { foreign, relative, path, alias, expose })
    }

    // =========================================================================
    // Functions
    // =========================================================================

    /// `[static] fn [name | name!] [(params)] [-> Type] { body }`
    pub(crate) fn parse_fn_decl(&mut self) -> Result<FnDecl, ParseError> {
        let start = self.current().span;
        let is_static = self.match_token(&TokenKind::Static);
        self.expect(&TokenKind::Fn)?;

        let name = match self.current_kind() {
            TokenKind::Ident(name) => {
                let span = self.advance().span;
                Some(FnName { name: name.clone(), is_macro: false, span })
            }
            TokenKind::MacroIdent(name) => {
                let span = self.advance().span;
                Some(FnName { name: name.clone(), is_macro: true, span })
            }
            _ => None,
        };

        let params = if self.check(&TokenKind::LParen) { self.parse_params()? } else { Vec::new() };

        let ret_ty = if self.match_token(&TokenKind::Arrow) {
            Some(self.parse_type()?)
        } else {
            None
        };

        let body = self.parse_block()?;
        Ok(FnDecl { is_static, name, params, ret_ty, body, span: self.span_from(start) })
    }

    /// `(name, name: Type, ...)`
    fn parse_params(&mut self) -> Result<Vec<Param>, ParseError> {
        self.expect(&TokenKind::LParen)?;
        let mut params = Vec::new();

        while !self.check(&TokenKind::RParen) {
            let (name, span) = self.expect_ident()?;
            let ty = if self.match_token(&TokenKind::Colon) { Some(self.parse_type()?) } else { None };
            let span = match &ty {
                Some(ty) => span.to(ty.span),
                None => span,
            };
            params.push(Param { name, ty, span });
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }

        self.expect(&TokenKind::RParen)?;
        Ok(params)
    }

    // =========================================================================
    // Types
    // =========================================================================

    /// `[type] Name [(params)] := Type | { constructors }`
    fn parse_type_decl(&mut self) -> Result<TypeDecl, ParseError> {
        let has_keyword = self.match_token(&TokenKind::Type);
        let (name, name_span) = if has_keyword {
            self.expect_any_ident()?
        } else {
            match self.current_kind() {
                TokenKind::TypeIdent(name) => {
                    let span = self.advance().span;
                    (name.clone(), span)
                }
                _ => return Err(self.error_expected("a type name")),
            }
        };

        let mut params = Vec::new();
        if self.match_token(&TokenKind::LParen) {
            while !self.check(&TokenKind::RParen) {
                let (name, span) = self.expect_any_ident()?;
                let ty = if self.match_token(&TokenKind::Colon) { Some(self.parse_type()?) } else { None };
                let span = ty.as_ref().map_or(span, |ty| span.to(ty.span));
                params.push(TypeParam { name, ty, span });
                if !self.match_token(&TokenKind::Comma) {
                    break;
                }
            }
            self.expect(&TokenKind::RParen)?;
        }

        self.expect(&TokenKind::ColonEq)?;
        let body = if self.check(&TokenKind::LBrace) {
            TypeBody::Constructors(self.parse_constructors()?)
        } else {
            TypeBody::Alias(self.parse_type()?)
        };

        Ok(TypeDecl { has_keyword, name, name_span, params, body })
    }

    /// `{ field: Type ... }` or `{ Name(params) ... }`; the first item fixes
    /// the style for the rest of the block.
    fn parse_constructors(&mut self) -> Result<TypeConstructors, ParseError> {
        self.expect(&TokenKind::LBrace)?;
        let mut constructors: Option<TypeConstructors> = None;

        while !self.check(&TokenKind::RBrace) {
            let item = self.parse_constructor_item()?;
            match (constructors.as_mut(), item) {
                (Some(TypeConstructors::Shorthand(fields)), ConstructorItem::Field(field)) => {
                    fields.push(field);
                }
                (Some(TypeConstructors::Full(ctors)), ConstructorItem::Full(ctor)) => {
                    ctors.push(ctor);
                }
                (Some(TypeConstructors::Shorthand(_)), ConstructorItem::Full(ctor)) => {
                    trace!(name = %ctor.name, "dropping constructor mixed into fields");
                    self.record_error(ParseError::mixed_constructors(ctor.span, true));
                }
                (Some(TypeConstructors::Full(_)), ConstructorItem::Field(field)) => {
                    trace!(name = %field.name, "dropping field mixed into constructors");
                    self.record_error(ParseError::mixed_constructors(field.span, false));
                }
                (None, item) => constructors = Some(item.into_constructors()),
            }
            self.match_token(&TokenKind::Comma);
        }

        self.expect(&TokenKind::RBrace)?;
        Ok(constructors.unwrap_or(TypeConstructors::Shorthand(Vec::new())))
    }

    fn parse_constructor_item(&mut self) -> Result<ConstructorItem, ParseError> {
        let token = self.current();
        match (&token.kind, self.peek(1)) {
            (TokenKind::Ident(name) | TokenKind::TypeIdent(name), TokenKind::Colon) => {
                self.advance();
                self.advance();
                let ty = self.parse_type()?;
                let span = token.span.to(ty.span);
                Ok(ConstructorItem::Field(FieldShorthand { name: name.clone(), ty, span }))
            }
            (TokenKind::TypeIdent(name), next) => {
                self.advance();
                let params = if matches!(next, TokenKind::LParen) {
                    self.parse_params()?
                } else {
                    Vec::new()
                };
                let span = self.span_from(token.span);
                Ok(ConstructorItem::Full(Constructor { name: name.clone(), params, span }))
            }
            _ => Err(self
                .error_expected("a field or constructor")
                .with_hint("write fields as 'name: Type' and constructors as 'Name(params)'")),
        }
    }

    // =========================================================================
    // Impls
    // =========================================================================

    /// `impl Type { fns }` or `impl Trait for Type { fns }`
    fn parse_impl(&mut self) -> Result<ImplDecl, ParseError> {
        self.expect(&TokenKind::Impl)?;
        let first = self.parse_type()?;
        let (trait_ty, self_ty) = if self.match_token(&TokenKind::For) {
            (Some(first), self.parse_type()?)
        } else {
            (None, first)
        };

        self.expect(&TokenKind::LBrace)?;
        let mut fns = Vec::new();

        while !self.check(&TokenKind::RBrace) && !self.at_end() && !self.halted() {
            let start = self.pos();
            if !matches!(self.current_kind(), TokenKind::Fn | TokenKind::Static) {
                let err = self.error_expected("'fn'");
                self.record_error(err);
                self.recover(start, Self::synchronize_impl);
                continue;
            }
            match self.parse_fn_decl() {
                Ok(f) => fns.push(f),
                Err(e) => {
                    self.record_error(e);
                    self.recover(start, Self::synchronize_impl);
                }
            }
        }

        self.expect(&TokenKind::RBrace)?;
        Ok(ImplDecl { trait_ty, self_ty, fns })
    }

    /// Skip to the next `fn`/`static`, or stop before the impl's `}`.
    fn synchronize_impl(&mut self) {
        let mut brace_depth = 0usize;

        while !self.at_end() {
            match self.current_kind() {
                TokenKind::Fn | TokenKind::Static if brace_depth == 0 => return,
                TokenKind::RBrace if brace_depth == 0 => return,
                TokenKind::LBrace => brace_depth += 1,
                TokenKind::RBrace => brace_depth -= 1,
                _ => {}
            }
            self.advance();
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::{errors_of, program};
    use crate::ParseErrorKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn imports() {
        assert_eq!(
            program("import .foo.bar as baz (qux, quux!)"),
            "(import relative (path foo bar) (as baz) (expose qux quux!))"
        );
        assert_eq!(program("foreign import c.Stdio"), "(import foreign (path c Stdio))");
    }

    #[test]
    fn functions() {
        assert_eq!(
            program("fn add(a: int, b,) -> int { return a + b }"),
            "(fn add (params (: a int) b) (ret int) (block (return (+ a b))))"
        );
        assert_eq!(program("static fn now { }"), "(fn static now (params) (block))");
        assert_eq!(program("fn trace!() { }"), "(fn trace! (params) (block))");
    }

    #[test]
    fn type_declarations() {
        assert_eq!(program("Point := { x: int, y: int }"), "(type Point (fields (: x int) (: y int)))");
        assert_eq!(
            program("type Option(t) := { None Some(value: t) }"),
            "(type Option (params t) (ctors (None) (Some (: value t))))"
        );
        assert_eq!(program("type id := int"), "(type id int)");
        assert_eq!(program("Empty := {}"), "(type Empty (fields))");
    }

    #[test]
    fn mixed_constructors_keep_first_style() {
        let out = crate::parse("Shape := { Circle(r: float) side: int Square(s: float) }");
        assert_eq!(out.errors.len(), 1);
        assert_eq!(out.errors[0].kind, ParseErrorKind::MixedConstructors);
        assert_eq!(
            juice_ast::sexpr::to_sexpr(&out.program),
            "(type Shape (ctors (Circle (: r float)) (Square (: s float))))"
        );
    }

    #[test]
    fn impls() {
        assert_eq!(
            program("impl Show for Point { fn show(self) { } static fn make { } }"),
            "(impl Show (for Point) (fn show (params self) (block)) (fn static make (params) (block)))"
        );
        let out = crate::parse("impl Point { x := 1 fn ok() { } }");
        assert_eq!(out.errors.len(), 1);
        assert_eq!(juice_ast::sexpr::to_sexpr(&out.program), "(impl Point (fn ok (params) (block)))");
    }

    #[test]
    fn exports() {
        assert_eq!(program("export fn main() { }"), "(export (fn main (params) (block)))");
        assert_eq!(program("export x := 1"), "(export (:= x 1))");
        let errors = errors_of("export x = 1");
        assert_eq!(errors[0].kind, ParseErrorKind::ExportNotDeclaration);
    }

    #[test]
    fn root_rejects_bare_calls() {
        let errors = errors_of("print(1)");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].hint.as_deref(), Some("calls are only allowed inside function bodies"));
    }

    #[test]
    fn later_statements_survive_errors() {
        let out = crate::parse("fn broken( { } x := 1 fn ok() { }");
        assert_eq!(out.errors.len(), 1);
        assert!(out.errors[0].skipped.is_some());
        assert_eq!(
            juice_ast::sexpr::to_sexpr(&out.program),
            "(:= x 1)\n(fn ok (params) (block))"
        );
    }
}
