//! WHNF reduction and application.

mod choice;
mod matcher;

pub use matcher::Delta;

use crate::env::{BindId, BindState, EnvId, Target};
use crate::intern::IStr;
use crate::pattern::Pat;
use crate::prepare::Code;
use crate::thunk::{Bottom, ThunkId, ThunkKind, Whnf, CYCLE_DETECTED, DEPTH_EXCEEDED, NO_MATCH, RAISED};
use crate::Runtime;
use lazyscript_ast::span::Span;
use std::rc::Rc;

const RED_ZONE: usize = 100 * 1024;
const STACK_PER_RECURSION: usize = 1024 * 1024;

#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub(crate) fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

#[inline]
#[cfg(target_arch = "wasm32")]
pub(crate) fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

impl Runtime {
    /// Reduces `t` to weak head normal form.
    ///
    /// The result is cached on `t` exactly once; later calls return the same
    /// thunk without reducing again. Re-entering a thunk that is still being
    /// reduced yields a "cycle detected" Bottom.
    pub fn force(&mut self, t: ThunkId) -> ThunkId {
        match self.thunks.get(t).whnf {
            Whnf::Done(v) => return v,
            Whnf::Forcing => {
                tracing::trace!(thunk = t.0, "cycle");
                let span = self.span_of(t);
                return self.new_bottom(Bottom::new(CYCLE_DETECTED).at(span).related(vec![t]));
            }
            Whnf::Pending => {}
        }
        if self.depth >= self.config().max_depth {
            let span = self.span_of(t);
            return self.new_bottom(Bottom::new(DEPTH_EXCEEDED).at(span).related(vec![t]));
        }
        self.thunks.set_whnf(t, Whnf::Forcing);
        self.depth += 1;
        let v = ensure_sufficient_stack(|| self.reduce(t));
        self.depth -= 1;
        self.thunks.set_whnf(t, Whnf::Done(v));
        v
    }

    /// Applies `func` to `args` and reduces the result.
    pub fn apply(&mut self, func: ThunkId, args: &[ThunkId]) -> ThunkId {
        if args.is_empty() {
            return self.force(func);
        }
        let t = self.defer_apply(func, args.to_vec());
        self.force(t)
    }

    /// Builds the application without reducing it.
    pub fn defer_apply(&mut self, func: ThunkId, args: Vec<ThunkId>) -> ThunkId {
        self.thunks.alloc(ThunkKind::Appl { func, args, span: None })
    }

    fn span_of(&self, t: ThunkId) -> Option<Span> {
        match self.kind(t) {
            ThunkKind::Ref { span, .. } | ThunkKind::Lambda { span, .. } => Some(*span),
            ThunkKind::Appl { span, .. } => *span,
            ThunkKind::Bottom(b) => b.span,
            _ => None,
        }
    }

    fn reduce(&mut self, t: ThunkId) -> ThunkId {
        match self.kind(t).clone() {
            ThunkKind::Ref { name, env, span } => {
                tracing::trace!(thunk = t.0, name = %name, "resolve");
                let target = self.resolve_ref(env, &name, span);
                self.force(target)
            }
            ThunkKind::Appl { func, args, span } => {
                let f = self.force(func);
                self.dispatch(f, args, span)
            }
            _ => t,
        }
    }

    fn resolve_ref(&mut self, env: EnvId, name: &IStr, span: Span) -> ThunkId {
        match self.envs.lookup(env, name).cloned() {
            Some(Target::Param(t)) | Some(Target::Thunk(t)) => t,
            Some(Target::Bind { binding, name }) => self.resolve_binding(binding, &name, span),
            None => self.new_bottom(
                Bottom::new(format!("undefined reference: ~{name}")).at(Some(span)),
            ),
        }
    }

    /// Matches a let binding's pattern on first use and serves `name` from it.
    fn resolve_binding(&mut self, id: BindId, name: &IStr, span: Span) -> ThunkId {
        match self.envs.binding(id).state.clone() {
            BindState::Matched(delta) => match delta.iter().find(|(n, _)| n == name) {
                Some((_, t)) => *t,
                None => self.new_bottom(
                    Bottom::new(format!("undefined reference: ~{name}")).at(Some(span)),
                ),
            },
            BindState::Failed(b) => b,
            BindState::Matching => {
                self.new_bottom(Bottom::new(CYCLE_DETECTED).at(Some(span)))
            }
            BindState::Unmatched => {
                self.envs.set_bind_state(id, BindState::Matching);
                let (pat, rhs) = {
                    let b = self.envs.binding(id);
                    (Rc::clone(&b.pat), b.rhs)
                };
                let mut delta = Vec::new();
                let state = if self.match_pat(&pat, rhs, &mut delta) {
                    BindState::Matched(delta)
                } else if self.is_bottom(rhs) {
                    BindState::Failed(self.whnf_of(rhs))
                } else {
                    let b = Bottom::new(NO_MATCH).at(Some(span)).related(vec![rhs]);
                    BindState::Failed(self.new_bottom(b))
                };
                self.envs.set_bind_state(id, state);
                self.resolve_binding(id, name, span)
            }
        }
    }

    /// Applies an already reduced function to `args`.
    fn dispatch(&mut self, f: ThunkId, args: Vec<ThunkId>, span: Option<Span>) -> ThunkId {
        if args.is_empty() {
            // A nullary builtin runs when its deferred call is forced.
            if let ThunkKind::Builtin(b) = self.kind(f) {
                if b.arity == 0 {
                    let func = Rc::clone(&b.func);
                    let r = func(self, &[]);
                    return self.force(r);
                }
            }
            return f;
        }
        match self.kind(f).clone() {
            ThunkKind::Alge { constr, args: mut held } => {
                held.extend(args);
                self.thunks.alloc(ThunkKind::Alge { constr, args: held })
            }
            ThunkKind::Lambda { param, body, env, span: at } => {
                let arg = args[0];
                let rest = args[1..].to_vec();
                let Some(delta) = self.match_pattern(&param, arg) else {
                    if self.is_bottom(arg) {
                        return self.whnf_of(arg);
                    }
                    return self.new_bottom(Bottom::new(NO_MATCH).at(Some(at)).related(vec![arg]));
                };
                let scope = self.envs.alloc(Some(env));
                for (name, t) in delta {
                    self.envs.bind(scope, name, Target::Param(t));
                }
                let body = self.instantiate(&body, scope);
                let v = self.force(body);
                self.dispatch(v, rest, span)
            }
            ThunkKind::Builtin(b) => {
                if args.len() < b.arity {
                    return self.thunks.alloc_partial(f, args);
                }
                tracing::trace!(builtin = %b.name, "call");
                let rest = args[b.arity..].to_vec();
                let r = (b.func)(self, &args[..b.arity]);
                let v = self.force(r);
                self.dispatch(v, rest, span)
            }
            // Only partial builtin applications are applications in WHNF.
            ThunkKind::Appl { func, args: mut held, .. } => {
                held.extend(args);
                self.dispatch(func, held, span)
            }
            ThunkKind::Choice { kind, left, right } => self.apply_choice(kind, left, right, args),
            ThunkKind::Bottom(_) => f,
            other @ (ThunkKind::Int(_) | ThunkKind::Str(_) | ThunkKind::Symbol(_) | ThunkKind::Ref { .. }) => {
                let b = Bottom::new(format!("cannot apply {}", other.describe()))
                    .at(span)
                    .related(vec![f]);
                self.new_bottom(b)
            }
        }
    }

    /// Materializes prepared code as thunks living in `env`.
    pub(crate) fn instantiate(&mut self, code: &Rc<Code>, env: EnvId) -> ThunkId {
        ensure_sufficient_stack(|| self.instantiate_inner(code, env))
    }

    fn instantiate_inner(&mut self, code: &Rc<Code>, env: EnvId) -> ThunkId {
        match &**code {
            Code::Int(n) => self.thunks.alloc(ThunkKind::Int(*n)),
            Code::Str(s) => self.thunks.alloc(ThunkKind::Str(s.clone())),
            Code::Symbol(s) => self.thunks.alloc(ThunkKind::Symbol(s.clone())),
            Code::Alge { constr, args } => {
                let args = args.iter().map(|c| self.instantiate(c, env)).collect();
                self.thunks.alloc(ThunkKind::Alge { constr: constr.clone(), args })
            }
            Code::Ref { name, span } => {
                self.thunks.alloc(ThunkKind::Ref { name: name.clone(), env, span: *span })
            }
            Code::Apply { func, args, span } => {
                let func = self.instantiate(func, env);
                let args = args.iter().map(|c| self.instantiate(c, env)).collect();
                self.thunks.alloc(ThunkKind::Appl { func, args, span: Some(*span) })
            }
            Code::Lambda { param, body, span } => self.thunks.alloc(ThunkKind::Lambda {
                param: Rc::clone(param),
                body: Rc::clone(body),
                env,
                span: *span,
            }),
            Code::Let { bindings, body } => {
                let scope = self.envs.alloc(Some(env));
                for b in bindings {
                    let rhs = self.instantiate(&b.rhs, scope);
                    let id = self.envs.add_binding(Rc::clone(&b.pat), rhs);
                    for name in &b.names {
                        let target = Target::Bind { binding: id, name: name.clone() };
                        self.envs.bind(scope, name.clone(), target);
                    }
                }
                self.instantiate(body, scope)
            }
            Code::Choice { kind, left, right } => {
                let left = self.instantiate(left, env);
                let right = self.instantiate(right, env);
                self.thunks.alloc(ThunkKind::Choice { kind: *kind, left, right })
            }
            Code::Raise { payload, span } => {
                let p = self.instantiate(payload, env);
                let mut b = Bottom::new(RAISED).at(Some(*span)).related(vec![p]);
                b.payload = Some(p);
                self.new_bottom(b)
            }
        }
    }

    /// The value a caret pattern or a `^|` handler receives for Bottom `b`.
    ///
    /// A raised Bottom hands over its payload; any other Bottom is rebuilt as
    /// `Bottom <message> [related...]`.
    pub fn caught(&mut self, b: ThunkId) -> ThunkId {
        let Some(bottom) = self.bottom(b).cloned() else {
            return b;
        };
        if let Some(p) = bottom.payload {
            return p;
        }
        let message = self.str(bottom.message.as_bytes());
        let related = self.list(bottom.related);
        self.ctor(crate::pattern::BOTTOM_TAG, vec![message, related])
    }

    /// Matches `pat` against `t`; bindings are returned only on success.
    pub fn match_pattern(&mut self, pat: &Pat, t: ThunkId) -> Option<Delta> {
        let mut delta = Vec::new();
        self.match_pat(pat, t, &mut delta).then_some(delta)
    }
}
