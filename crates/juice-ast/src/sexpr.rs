// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Span-free S-expression dump of the syntax tree.
//!
//! Two trees are structurally identical iff their dumps are equal, which is
//! what tests and the `parse` command compare.

use crate::decl::{
    FnDecl, ImplDecl, ImportDecl, Item, ItemKind, Param, Program, TypeBody, TypeConstructors,
    TypeDecl,
};
use crate::expr::{Arg, Expr, ExprKind, MatchArm, MatchPattern, StrLayout, StrLit, StrSegmentKind};
use crate::stmt::{Block, ForIter, Stmt, StmtKind};
use crate::token::Radix;
use crate::ty::{TypeExpr, TypeExprKind};

/// One line per root item.
pub fn to_sexpr(program: &Program) -> String {
    program.items.iter().map(item_to_sexpr).collect::<Vec<_>>().join("\n")
}

pub fn item_to_sexpr(item: &Item) -> String {
    let inner = match &item.kind {
        ItemKind::Import(import) => import_sexpr(import),
        ItemKind::Fn(f) => fn_sexpr(f),
        ItemKind::Type(t) => type_decl_sexpr(t),
        ItemKind::VarDecl(v) => var_decl_sexpr(&v.name, v.ty.as_ref(), &v.value),
        ItemKind::Assign(a) => format!("(= {} {})", a.name, expr_to_sexpr(&a.value)),
        ItemKind::Impl(i) => impl_sexpr(i),
    };
    if item.exported {
        format!("(export {inner})")
    } else {
        inner
    }
}

pub fn stmt_to_sexpr(stmt: &Stmt) -> String {
    match &stmt.kind {
        StmtKind::VarDecl(v) => var_decl_sexpr(&v.name, v.ty.as_ref(), &v.value),
        StmtKind::Assign(a) => format!("(= {} {})", a.name, expr_to_sexpr(&a.value)),
        StmtKind::Fn(f) => fn_sexpr(f),
        StmtKind::For(f) => {
            let mut parts = vec![];
            match &f.binding {
                Some(binding) => {
                    parts.push("for-of".to_string());
                    parts.push(binding.clone());
                }
                None => parts.push("for".to_string()),
            }
            match &f.iter {
                Some(ForIter::Expr(e)) => parts.push(expr_to_sexpr(e)),
                Some(ForIter::Range { start, end }) => {
                    parts.push(format!("(.. {} {})", expr_to_sexpr(start), expr_to_sexpr(end)))
                }
                None => {}
            }
            parts.push(block_sexpr(&f.body));
            list(parts)
        }
        StmtKind::Return(Some(e)) => format!("(return {})", expr_to_sexpr(e)),
        StmtKind::Return(None) => "(return)".to_string(),
        StmtKind::Break => "(break)".to_string(),
        StmtKind::Continue => "(continue)".to_string(),
        StmtKind::Block(b) => block_sexpr(b),
        StmtKind::Expr(e) => expr_to_sexpr(e),
    }
}

pub fn expr_to_sexpr(expr: &Expr) -> String {
    match &expr.kind {
        ExprKind::Int { value, radix } => match radix {
            Radix::Decimal => value.to_string(),
            Radix::Binary => format!("{value:#b}"),
            Radix::Octal => format!("{value:#o}"),
            Radix::Hex => format!("{value:#x}"),
        },
        ExprKind::Float(f) => format!("{f:?}"),
        ExprKind::Str(s) => str_sexpr(s),
        ExprKind::Bool(b) => b.to_string(),
        ExprKind::Ident(name) | ExprKind::TypeName(name) => name.clone(),
        ExprKind::List(items) => tagged("list", items.iter().map(expr_to_sexpr)),
        ExprKind::Record(fields) => tagged(
            "record",
            fields.iter().map(|f| match &f.value {
                Some(v) => format!("(= {} {})", f.name, expr_to_sexpr(v)),
                None => f.name.clone(),
            }),
        ),
        ExprKind::Tuple(items) => tagged("tuple", items.iter().map(expr_to_sexpr)),
        ExprKind::Group(inner) => format!("(group {})", expr_to_sexpr(inner)),
        ExprKind::Unary { op, operand } => format!("({} {})", op.symbol(), expr_to_sexpr(operand)),
        ExprKind::Binary { op, left, right } => {
            format!("({} {} {})", op.symbol(), expr_to_sexpr(left), expr_to_sexpr(right))
        }
        ExprKind::Try(inner) => format!("(? {})", expr_to_sexpr(inner)),
        ExprKind::Member { object, member } => {
            format!("(. {} {})", expr_to_sexpr(object), expr_to_sexpr(member))
        }
        ExprKind::TypeAccess { base, member } => {
            format!("(:: {} {})", expr_to_sexpr(base), expr_to_sexpr(member))
        }
        ExprKind::Call { callee, args } => {
            let mut parts = vec!["call".to_string(), expr_to_sexpr(callee)];
            parts.extend(args.iter().map(arg_sexpr));
            list(parts)
        }
        ExprKind::MacroCall(call) => {
            let mut parts = vec!["macro".to_string(), call.name.clone()];
            if call.parenthesized {
                parts.push(tagged("args", call.args.iter().map(arg_sexpr)));
            }
            if let Some(body) = &call.body {
                parts.push(format!("(body {:?})", body.text));
            }
            list(parts)
        }
        ExprKind::Fn(f) => fn_sexpr(f),
        ExprKind::If { cond, then_block, else_branch } => {
            let mut parts = vec!["if".to_string(), expr_to_sexpr(cond), block_sexpr(then_block)];
            if let Some(e) = else_branch {
                parts.push(expr_to_sexpr(e));
            }
            list(parts)
        }
        ExprKind::Match { scrutinee, arms } => {
            let mut parts = vec!["match".to_string(), expr_to_sexpr(scrutinee)];
            parts.extend(arms.iter().map(arm_sexpr));
            list(parts)
        }
        ExprKind::Block(b) => block_sexpr(b),
    }
}

pub fn type_to_sexpr(ty: &TypeExpr) -> String {
    match &ty.kind {
        TypeExprKind::Builtin(b) => b.name().to_string(),
        TypeExprKind::Ident(name) | TypeExprKind::Named(name) => name.clone(),
        TypeExprKind::Literal(e) => expr_to_sexpr(e),
        TypeExprKind::Call { callee, args, .. } => {
            let mut parts = vec!["tcall".to_string(), callee.clone()];
            parts.extend(args.iter().map(|a| match &a.label {
                Some(label) => format!("(: {label} {})", type_to_sexpr(&a.value)),
                None => type_to_sexpr(&a.value),
            }));
            list(parts)
        }
        TypeExprKind::Tuple(items) => tagged("ttuple", items.iter().map(type_to_sexpr)),
        TypeExprKind::Group(inner) => format!("(tgroup {})", type_to_sexpr(inner)),
        TypeExprKind::Binary { op, left, right } => {
            format!("({} {} {})", op.symbol(), type_to_sexpr(left), type_to_sexpr(right))
        }
    }
}

fn list(parts: Vec<String>) -> String {
    format!("({})", parts.join(" "))
}

fn tagged(tag: &str, items: impl Iterator<Item = String>) -> String {
    let mut parts = vec![tag.to_string()];
    parts.extend(items);
    list(parts)
}

fn block_sexpr(block: &Block) -> String {
    tagged("block", block.stmts.iter().map(stmt_to_sexpr))
}

fn arg_sexpr(arg: &Arg) -> String {
    match &arg.label {
        Some(label) => format!("(: {label} {})", expr_to_sexpr(&arg.value)),
        None => expr_to_sexpr(&arg.value),
    }
}

fn param_sexpr(param: &Param) -> String {
    match &param.ty {
        Some(ty) => format!("(: {} {})", param.name, type_to_sexpr(ty)),
        None => param.name.clone(),
    }
}

fn var_decl_sexpr(name: &str, ty: Option<&TypeExpr>, value: &Expr) -> String {
    match ty {
        Some(ty) => format!("(: {name} {} {})", type_to_sexpr(ty), expr_to_sexpr(value)),
        None => format!("(:= {name} {})", expr_to_sexpr(value)),
    }
}

fn str_sexpr(lit: &StrLit) -> String {
    let tag = match lit.layout {
        StrLayout::Inline => "str",
        StrLayout::MultiLine { .. } => "mstr",
    };
    tagged(
        tag,
        lit.segments.iter().map(|seg| match &seg.kind {
            StrSegmentKind::Text(text) => format!("(text {text:?})"),
            StrSegmentKind::Escape { raw, .. } => format!("(esc {raw:?})"),
            StrSegmentKind::Interpolation(e) => format!("(interp {})", expr_to_sexpr(e)),
        }),
    )
}

fn arm_sexpr(arm: &MatchArm) -> String {
    let pattern = match &arm.pattern {
        MatchPattern::Value(e) => expr_to_sexpr(e),
        MatchPattern::Type(t) => format!("(type {})", type_to_sexpr(t)),
    };
    format!("(arm {pattern} {})", expr_to_sexpr(&arm.body))
}

fn fn_sexpr(f: &FnDecl) -> String {
    let mut parts = vec!["fn".to_string()];
    if f.is_static {
        parts.push("static".to_string());
    }
    match &f.name {
        Some(name) if name.is_macro => parts.push(format!("{}!", name.name)),
        Some(name) => parts.push(name.name.clone()),
        None => {}
    }
    parts.push(tagged("params", f.params.iter().map(param_sexpr)));
    if let Some(ret) = &f.ret_ty {
        parts.push(format!("(ret {})", type_to_sexpr(ret)));
    }
    parts.push(block_sexpr(&f.body));
    list(parts)
}

fn import_sexpr(import: &ImportDecl) -> String {
    let mut parts = vec!["import".to_string()];
    if import.foreign {
        parts.push("foreign".to_string());
    }
    if import.relative {
        parts.push("relative".to_string());
    }
    parts.push(tagged("path", import.path.iter().cloned()));
    if let Some(alias) = &import.alias {
        parts.push(format!("(as {alias})"));
    }
    if !import.expose.is_empty() {
        parts.push(tagged(
            "expose",
            import
                .expose
                .iter()
                .map(|e| if e.is_macro { format!("{}!", e.name) } else { e.name.clone() }),
        ));
    }
    list(parts)
}

fn type_decl_sexpr(decl: &TypeDecl) -> String {
    let mut parts = vec!["type".to_string(), decl.name.clone()];
    if !decl.params.is_empty() {
        parts.push(tagged(
            "params",
            decl.params.iter().map(|p| match &p.ty {
                Some(ty) => format!("(: {} {})", p.name, type_to_sexpr(ty)),
                None => p.name.clone(),
            }),
        ));
    }
    parts.push(match &decl.body {
        TypeBody::Alias(ty) => type_to_sexpr(ty),
        TypeBody::Constructors(TypeConstructors::Shorthand(fields)) => tagged(
            "fields",
            fields.iter().map(|f| format!("(: {} {})", f.name, type_to_sexpr(&f.ty))),
        ),
        TypeBody::Constructors(TypeConstructors::Full(ctors)) => tagged(
            "ctors",
            ctors.iter().map(|c| {
                let mut ctor = vec![c.name.clone()];
                ctor.extend(c.params.iter().map(param_sexpr));
                list(ctor)
            }),
        ),
    });
    list(parts)
}

fn impl_sexpr(decl: &ImplDecl) -> String {
    let mut parts = vec!["impl".to_string()];
    match &decl.trait_ty {
        Some(trait_ty) => {
            parts.push(type_to_sexpr(trait_ty));
            parts.push(format!("(for {})", type_to_sexpr(&decl.self_ty)));
        }
        None => parts.push(type_to_sexpr(&decl.self_ty)),
    }
    parts.extend(decl.fns.iter().map(fn_sexpr));
    list(parts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{BinOp, MacroBody, MacroCall};
    use crate::ty::BuiltinType;
    use crate::Span;

    fn e(kind: ExprKind) -> Expr {
        Expr::new(kind, Span::default())
    }

    fn int(value: u64) -> Expr {
        e(ExprKind::Int { value, radix: Radix::Decimal })
    }

    #[test]
    fn binary_and_radix() {
        let tree = e(ExprKind::Binary {
            op: BinOp::Add,
            left: Box::new(int(1)),
            right: Box::new(e(ExprKind::Int { value: 255, radix: Radix::Hex })),
        });
        assert_eq!(expr_to_sexpr(&tree), "(+ 1 0xff)");
    }

    #[test]
    fn macro_forms() {
        let body = MacroBody {
            span: Span::default(),
            inner: Span::default(),
            text: "raw text".to_string(),
            tokens: vec![],
        };
        let call = e(ExprKind::MacroCall(MacroCall {
            name: "foo".to_string(),
            name_span: Span::default(),
            parenthesized: false,
            args: vec![],
            body: Some(body),
        }));
        assert_eq!(expr_to_sexpr(&call), "(macro foo (body \"raw text\"))");
    }

    #[test]
    fn type_tuple() {
        let int_ty = TypeExpr::new(TypeExprKind::Builtin(BuiltinType::Int), Span::default());
        let float_ty = TypeExpr::new(TypeExprKind::Builtin(BuiltinType::Float), Span::default());
        let tuple = TypeExpr::new(TypeExprKind::Tuple(vec![int_ty, float_ty]), Span::default());
        assert_eq!(type_to_sexpr(&tuple), "(ttuple int float)");
    }
}
