#![allow(dead_code)]

use lazyscript_ast::ast::{Expr, ExprKind, Pattern, PatternKind};
use lazyscript_ast::span::Span;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn sp() -> Span {
    Span::new(0, 0)
}

fn e(kind: ExprKind) -> Expr {
    Expr::new(kind, sp())
}

fn p(kind: PatternKind) -> Pattern {
    Pattern::new(kind, sp())
}

pub fn int_expr(n: i64) -> Expr {
    e(ExprKind::Int(n))
}

pub fn str_expr(s: &str) -> Expr {
    e(ExprKind::Str(s.into()))
}

pub fn sym_expr(s: &str) -> Expr {
    e(ExprKind::Symbol(s.into()))
}

pub fn ctor_expr(name: &str) -> Expr {
    e(ExprKind::Ctor(name.into()))
}

pub fn ref_expr(name: &str) -> Expr {
    e(ExprKind::Ref(name.into()))
}

pub fn unit_expr() -> Expr {
    e(ExprKind::Unit)
}

pub fn apply_expr(func: Expr, args: Vec<Expr>) -> Expr {
    args.into_iter()
        .fold(func, |f, a| e(ExprKind::Apply { func: Box::new(f), arg: Box::new(a) }))
}

/// `~name a b ...`
pub fn call(name: &str, args: Vec<Expr>) -> Expr {
    apply_expr(ref_expr(name), args)
}

pub fn lambda_expr(param: Pattern, body: Expr) -> Expr {
    e(ExprKind::Lambda { param, body: Box::new(body) })
}

pub fn alt_expr(left: Expr, right: Expr) -> Expr {
    e(ExprKind::AltLambda { left: Box::new(left), right: Box::new(right) })
}

pub fn or_else_expr(left: Expr, right: Expr) -> Expr {
    e(ExprKind::OrElse { left: Box::new(left), right: Box::new(right) })
}

pub fn catch_expr(left: Expr, right: Expr) -> Expr {
    e(ExprKind::Catch { left: Box::new(left), right: Box::new(right) })
}

pub fn raise_expr(inner: Expr) -> Expr {
    e(ExprKind::Raise(Box::new(inner)))
}

pub fn tuple_expr(xs: Vec<Expr>) -> Expr {
    e(ExprKind::Tuple(xs))
}

pub fn list_expr(xs: Vec<Expr>) -> Expr {
    e(ExprKind::List(xs))
}

pub fn let_expr(bindings: Vec<(Pattern, Expr)>, body: Expr) -> Expr {
    e(ExprKind::LetGroup { bindings, body: Box::new(body) })
}

pub fn var_pat(name: &str) -> Pattern {
    p(PatternKind::Var(name.into()))
}

pub fn wild_pat() -> Pattern {
    p(PatternKind::Wildcard)
}

pub fn int_pat(n: i64) -> Pattern {
    p(PatternKind::Int(n))
}

pub fn str_pat(s: &str) -> Pattern {
    p(PatternKind::Str(s.into()))
}

pub fn tuple_pat(xs: Vec<Pattern>) -> Pattern {
    p(PatternKind::Tuple(xs))
}

pub fn ctor_pat(name: &str, args: Vec<Pattern>) -> Pattern {
    p(PatternKind::Ctor { name: name.into(), args })
}

pub fn list_pat(xs: Vec<Pattern>) -> Pattern {
    p(PatternKind::List(xs))
}

pub fn cons_pat(h: Pattern, t: Pattern) -> Pattern {
    p(PatternKind::Cons(Box::new(h), Box::new(t)))
}

pub fn or_pat(a: Pattern, b: Pattern) -> Pattern {
    p(PatternKind::Or(Box::new(a), Box::new(b)))
}

pub fn caret_pat(inner: Pattern) -> Pattern {
    p(PatternKind::Caret(Box::new(inner)))
}

pub fn as_pat(name: &str, inner: Pattern) -> Pattern {
    p(PatternKind::As { name: name.into(), pat: Box::new(inner) })
}
