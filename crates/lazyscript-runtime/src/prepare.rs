//! Static preparation: AST to [`Code`].
//!
//! Every reference is checked against the local scope stack and the base
//! environment chain, let groups and patterns are checked for duplicate
//! binders, and or-patterns for matching name sets. Each problem is reported
//! once; evaluation only ever sees code that passed.

use crate::env::{EnvArena, EnvId};
use crate::error::{Diagnostics, PrepareError};
use crate::intern::{IStr, Interner};
use crate::pattern::{Pat, CONS_TAG, LIST_TAG, TUPLE_TAG, UNIT_TAG};
use crate::thunk::ChoiceKind;
use ahash::{AHashMap, AHashSet};
use lazyscript_ast::ast::{Expr, ExprKind, Pattern, PatternKind};
use lazyscript_ast::span::Span;
use std::rc::Rc;

/// Prepared expression, instantiated into thunks once per environment.
#[derive(Debug)]
pub enum Code {
    Int(i64),
    Str(IStr),
    Symbol(IStr),
    Alge { constr: IStr, args: Vec<Rc<Code>> },
    Ref { name: IStr, span: Span },
    Apply { func: Rc<Code>, args: Vec<Rc<Code>>, span: Span },
    Lambda { param: Rc<Pat>, body: Rc<Code>, span: Span },
    Let { bindings: Vec<LetCode>, body: Rc<Code> },
    Choice { kind: ChoiceKind, left: Rc<Code>, right: Rc<Code> },
    Raise { payload: Rc<Code>, span: Span },
}

#[derive(Debug)]
pub struct LetCode {
    pub pat: Rc<Pat>,
    pub rhs: Rc<Code>,
    pub names: Vec<IStr>,
}

type Binders = Vec<(IStr, Span)>;

pub struct Preparer<'a> {
    interner: &'a mut Interner,
    envs: &'a EnvArena,
    base: EnvId,
    scopes: Vec<AHashMap<IStr, Span>>,
    diags: Diagnostics,
}

impl<'a> Preparer<'a> {
    pub fn new(interner: &'a mut Interner, envs: &'a EnvArena, base: EnvId) -> Self {
        Self { interner, envs, base, scopes: Vec::new(), diags: Diagnostics::new() }
    }

    pub fn finish(self) -> Diagnostics {
        self.diags
    }

    fn is_visible(&self, name: &IStr) -> bool {
        self.scopes.iter().rev().any(|s| s.contains_key(name))
            || self.envs.lookup(self.base, name).is_some()
    }

    pub fn expr(&mut self, e: &Expr) -> Rc<Code> {
        let code = match &e.kind {
            ExprKind::Unit => Code::Alge { constr: self.interner.intern(UNIT_TAG), args: vec![] },
            ExprKind::Int(n) => Code::Int(*n),
            ExprKind::Str(s) => Code::Str(self.interner.intern(s)),
            ExprKind::Symbol(s) => Code::Symbol(self.interner.intern(s)),
            ExprKind::Ctor(name) => Code::Alge { constr: self.interner.intern(name), args: vec![] },
            ExprKind::Ref(n) => {
                let name = self.interner.intern(n);
                if !self.is_visible(&name) {
                    self.diags.error(PrepareError::UndefinedRef { name: n.clone(), span: e.span });
                }
                Code::Ref { name, span: e.span }
            }
            ExprKind::Lambda { param, body } => {
                let mut binders = Binders::new();
                let pat = self.pattern(param, &mut binders);
                for (name, span) in &binders {
                    if self.scopes.iter().any(|s| s.contains_key(name)) {
                        self.diags.warning(format!("~{name} shadows an outer binding"), *span);
                    }
                }
                self.scopes.push(binders.into_iter().collect());
                let body = self.expr(body);
                self.scopes.pop();
                Code::Lambda { param: Rc::new(pat), body, span: e.span }
            }
            ExprKind::Apply { .. } => {
                // Flatten the curried spine so one application carries every argument.
                let mut spine = Vec::new();
                let mut head = e;
                while let ExprKind::Apply { func, arg } = &head.kind {
                    spine.push(arg.as_ref());
                    head = func.as_ref();
                }
                let func = self.expr(head);
                let args = spine.into_iter().rev().map(|a| self.expr(a)).collect();
                Code::Apply { func, args, span: e.span }
            }
            ExprKind::Tuple(xs) => self.alge(TUPLE_TAG, xs),
            ExprKind::List(xs) => self.alge(LIST_TAG, xs),
            ExprKind::LetGroup { bindings, body } => {
                let mut group: AHashMap<IStr, Span> = AHashMap::new();
                let mut pats = Vec::with_capacity(bindings.len());
                for (p, _) in bindings {
                    let mut binders = Binders::new();
                    let pat = self.pattern(p, &mut binders);
                    let mut names = Vec::with_capacity(binders.len());
                    for (name, span) in binders {
                        if let Some(first) = group.get(&name) {
                            self.diags.error(PrepareError::DuplicateBinding {
                                name: name.to_string(),
                                span,
                                first: *first,
                            });
                            continue;
                        }
                        group.insert(name.clone(), span);
                        names.push(name);
                    }
                    pats.push((Rc::new(pat), names));
                }
                self.scopes.push(group);
                let bindings = pats
                    .into_iter()
                    .zip(bindings)
                    .map(|((pat, names), (_, rhs))| LetCode { pat, rhs: self.expr(rhs), names })
                    .collect();
                let body = self.expr(body);
                self.scopes.pop();
                Code::Let { bindings, body }
            }
            ExprKind::Raise(inner) => Code::Raise { payload: self.expr(inner), span: e.span },
            ExprKind::AltLambda { left, right } => self.choice(ChoiceKind::Lambda, left, right),
            ExprKind::OrElse { left, right } => self.choice(ChoiceKind::Expr, left, right),
            ExprKind::Catch { left, right } => self.choice(ChoiceKind::Catch, left, right),
        };
        Rc::new(code)
    }

    fn alge(&mut self, tag: &str, xs: &[Expr]) -> Code {
        let constr = self.interner.intern(tag);
        Code::Alge { constr, args: xs.iter().map(|x| self.expr(x)).collect() }
    }

    fn choice(&mut self, kind: ChoiceKind, left: &Expr, right: &Expr) -> Code {
        Code::Choice { kind, left: self.expr(left), right: self.expr(right) }
    }

    fn add_binder(&mut self, name: IStr, span: Span, out: &mut Binders) {
        if let Some((_, first)) = out.iter().find(|(n, _)| *n == name) {
            self.diags.error(PrepareError::DuplicateBinding {
                name: name.to_string(),
                span,
                first: *first,
            });
            return;
        }
        out.push((name, span));
    }

    pub fn pattern(&mut self, p: &Pattern, out: &mut Binders) -> Pat {
        match &p.kind {
            PatternKind::Wildcard => Pat::Wildcard,
            PatternKind::Var(n) => {
                let name = self.interner.intern(n);
                self.add_binder(name.clone(), p.span, out);
                Pat::Ref { name }
            }
            PatternKind::Unit => Pat::Alge { constr: self.interner.intern(UNIT_TAG), args: vec![] },
            PatternKind::Tuple(ps) => self.alge_pattern(TUPLE_TAG, ps, out),
            PatternKind::Ctor { name, args } => self.alge_pattern(name, args, out),
            PatternKind::Int(n) => Pat::Int(*n),
            PatternKind::Str(s) => Pat::Str(self.interner.intern(s)),
            PatternKind::As { name, pat } => {
                let inner = self.pattern(pat, out);
                let name = self.interner.intern(name);
                self.add_binder(name.clone(), p.span, out);
                Pat::As { name, inner: Box::new(inner) }
            }
            PatternKind::List(ps) => self.alge_pattern(LIST_TAG, ps, out),
            PatternKind::Cons(h, t) => {
                let constr = self.interner.intern(CONS_TAG);
                let h = self.pattern(h, out);
                let t = self.pattern(t, out);
                Pat::Alge { constr, args: vec![h, t] }
            }
            PatternKind::Or(a, b) => {
                let (mut lb, mut rb) = (Binders::new(), Binders::new());
                let left = self.pattern(a, &mut lb);
                let right = self.pattern(b, &mut rb);
                let lset: AHashSet<&IStr> = lb.iter().map(|(n, _)| n).collect();
                let rset: AHashSet<&IStr> = rb.iter().map(|(n, _)| n).collect();
                if lset != rset {
                    let names = |bs: &Binders| {
                        bs.iter().map(|(n, _)| n.to_string()).collect::<Vec<_>>().join(", ")
                    };
                    self.diags.error(PrepareError::OrPatternMismatch {
                        left: names(&lb),
                        right: names(&rb),
                        span: p.span,
                    });
                }
                for (name, span) in lb {
                    self.add_binder(name, span, out);
                }
                Pat::Or { left: Box::new(left), right: Box::new(right) }
            }
            PatternKind::Caret(inner) => Pat::Caret(Box::new(self.pattern(inner, out))),
        }
    }

    fn alge_pattern(&mut self, tag: &str, ps: &[Pattern], out: &mut Binders) -> Pat {
        let constr = self.interner.intern(tag);
        Pat::Alge { constr, args: ps.iter().map(|x| self.pattern(x, out)).collect() }
    }
}
