//! Lazy graph-reduction core for LazyScript.
//!
//! A [`Runtime`] owns every arena the evaluator needs: interned strings,
//! scopes, let bindings and thunks. Thunks and scopes refer to each other by
//! index only, so cyclic programs need no ownership tricks. Failures are
//! [`Bottom`] values flowing through the graph like any other value.

pub mod config;
pub mod display;
pub mod effects;
pub mod env;
pub mod error;
pub mod eval;
pub mod intern;
pub mod pattern;
pub mod prelude;
pub mod prepare;
pub mod thunk;

pub use config::RuntimeConfig;
pub use display::BottomReport;
pub use effects::EffectGuard;
pub use env::{EnvId, Target};
pub use error::{CompileError, Diagnostic, Diagnostics, EnvError, PrepareError, RunError, Severity};
pub use intern::{IStr, Interner};
pub use thunk::{Bottom, ChoiceKind, Thunk, ThunkId, ThunkKind, Whnf};

use env::EnvArena;
use lazyscript_ast::ast::Expr;
use pattern::{LIST_TAG, UNIT_TAG};
use prepare::Preparer;
use thunk::{Builtin, ThunkArena};
use std::rc::Rc;

#[derive(Debug, Default)]
enum Output {
    #[default]
    Stdout,
    Captured(String),
}

/// One evaluation context: arenas, effect guard, diagnostics and config.
#[derive(Debug)]
pub struct Runtime {
    interner: Interner,
    pub(crate) thunks: ThunkArena,
    pub(crate) envs: EnvArena,
    effects: EffectGuard,
    diagnostics: Diagnostics,
    config: RuntimeConfig,
    root: EnvId,
    pub(crate) depth: usize,
    output: Output,
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new(RuntimeConfig::default())
    }
}

impl Runtime {
    pub fn new(config: RuntimeConfig) -> Self {
        let mut envs = EnvArena::default();
        let root = envs.alloc(None);
        Self {
            interner: Interner::new(),
            thunks: ThunkArena::default(),
            envs,
            effects: EffectGuard::new(config.strict_effects),
            diagnostics: Diagnostics::new(),
            config,
            root,
            depth: 0,
            output: Output::Stdout,
        }
    }

    /// Runtime whose root scope holds the core builtins.
    pub fn with_prelude(config: RuntimeConfig) -> Self {
        let mut rt = Self::new(config);
        prelude::install(&mut rt);
        rt
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn effects(&self) -> &EffectGuard {
        &self.effects
    }

    pub fn effects_mut(&mut self) -> &mut EffectGuard {
        &mut self.effects
    }

    /// Every diagnostic reported by [`Runtime::compile`] so far.
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn intern<S: AsRef<[u8]>>(&mut self, s: S) -> IStr {
        self.interner.intern(s)
    }

    // ---- environments ----

    pub fn root_env(&self) -> EnvId {
        self.root
    }

    pub fn new_env(&mut self, parent: EnvId) -> EnvId {
        self.envs.alloc(Some(parent))
    }

    pub fn lookup(&mut self, env: EnvId, name: &str) -> Option<Target> {
        let name = self.interner.intern(name);
        self.envs.lookup(env, &name).cloned()
    }

    pub fn grant_write(&mut self, env: EnvId) {
        self.envs.set_writable(env, true);
    }

    pub fn revoke_write(&mut self, env: EnvId) {
        self.envs.set_writable(env, false);
    }

    pub fn insert(&mut self, env: EnvId, name: &str, value: ThunkId) -> Result<(), EnvError> {
        let name = self.interner.intern(name);
        self.envs.insert(env, name, Target::Thunk(value))
    }

    /// Copies the members bound directly in `from` into `into`.
    pub fn import_members(&mut self, into: EnvId, from: EnvId) -> Result<usize, EnvError> {
        let members: Vec<_> =
            self.envs.scope(from).entries().map(|(k, v)| (k.clone(), v.clone())).collect();
        let n = members.len();
        for (name, target) in members {
            self.envs.insert(into, name, target)?;
        }
        tracing::debug!(members = n, "imported namespace members");
        Ok(n)
    }

    /// Binds `name` in `env` to a builtin and returns the bound thunk.
    ///
    /// With arity 0 the name is bound to a deferred call instead, so the
    /// builtin runs once, on first force.
    pub fn install_builtin<F>(&mut self, env: EnvId, name: &str, arity: usize, func: F) -> ThunkId
    where
        F: Fn(&mut Runtime, &[ThunkId]) -> ThunkId + 'static,
    {
        let name = self.interner.intern(name);
        let mut t = self.thunks.alloc(ThunkKind::Builtin(Builtin {
            name: name.clone(),
            arity,
            func: Rc::new(func),
        }));
        if arity == 0 {
            t = self.defer_apply(t, vec![]);
        }
        self.envs.bind(env, name, Target::Thunk(t));
        t
    }

    // ---- compilation ----

    /// Prepares `expr` against `env` and instantiates it there.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn compile(&mut self, expr: &Expr, env: EnvId) -> Result<ThunkId, CompileError> {
        let mut prep = Preparer::new(&mut self.interner, &self.envs, env);
        let code = prep.expr(expr);
        let diags = prep.finish();
        let errors = diags.error_count();
        tracing::debug!(errors, warnings = diags.warning_count(), "prepared expression");
        let snapshot = diags.clone().into_vec();
        self.diagnostics.extend(diags);
        if errors > 0 {
            return Err(CompileError::Aborted { errors, diagnostics: snapshot });
        }
        Ok(self.instantiate(&code, env))
    }

    /// Outermost evaluation: collapses choices and reports an uncaught Bottom.
    pub fn evaluate(&mut self, t: ThunkId) -> Result<ThunkId, BottomReport> {
        let v = self.resolve(t);
        if self.is_bottom(v) {
            let report = self.report(v);
            tracing::debug!(message = report.message.as_str(), "uncaught bottom");
            return Err(report);
        }
        Ok(v)
    }

    /// Compiles `expr` in the root scope and evaluates it.
    pub fn run(&mut self, expr: &Expr) -> Result<ThunkId, RunError> {
        let t = self.compile(expr, self.root)?;
        Ok(self.evaluate(t)?)
    }

    // ---- thunk construction & inspection ----

    pub fn thunk(&self, t: ThunkId) -> &Thunk {
        self.thunks.get(t)
    }

    pub fn kind(&self, t: ThunkId) -> &ThunkKind {
        &self.thunks.get(t).kind
    }

    /// The settled value of `t`, or `t` itself while it is unforced.
    pub fn whnf_of(&self, t: ThunkId) -> ThunkId {
        match self.thunks.get(t).whnf {
            Whnf::Done(v) => v,
            Whnf::Pending | Whnf::Forcing => t,
        }
    }

    pub fn is_bottom(&self, t: ThunkId) -> bool {
        self.bottom(t).is_some()
    }

    /// Message, span and related values of a settled Bottom.
    pub fn bottom(&self, t: ThunkId) -> Option<&Bottom> {
        match self.kind(self.whnf_of(t)) {
            ThunkKind::Bottom(b) => Some(b),
            _ => None,
        }
    }

    pub fn new_bottom(&mut self, bottom: Bottom) -> ThunkId {
        self.thunks.alloc(ThunkKind::Bottom(bottom))
    }

    pub fn int(&mut self, n: i64) -> ThunkId {
        self.thunks.alloc(ThunkKind::Int(n))
    }

    pub fn str<S: AsRef<[u8]>>(&mut self, s: S) -> ThunkId {
        let s = self.interner.intern(s);
        self.thunks.alloc(ThunkKind::Str(s))
    }

    pub fn symbol(&mut self, name: &str) -> ThunkId {
        let s = self.interner.intern(name);
        self.thunks.alloc(ThunkKind::Symbol(s))
    }

    pub fn ctor(&mut self, name: &str, args: Vec<ThunkId>) -> ThunkId {
        let constr = self.interner.intern(name);
        self.thunks.alloc(ThunkKind::Alge { constr, args })
    }

    pub fn unit(&mut self) -> ThunkId {
        self.ctor(UNIT_TAG, vec![])
    }

    pub fn list(&mut self, items: Vec<ThunkId>) -> ThunkId {
        self.ctor(LIST_TAG, items)
    }

    pub fn bool(&mut self, b: bool) -> ThunkId {
        self.ctor(if b { "True" } else { "False" }, vec![])
    }

    pub fn int_of(&self, t: ThunkId) -> Option<i64> {
        match self.kind(self.whnf_of(t)) {
            ThunkKind::Int(n) => Some(*n),
            _ => None,
        }
    }

    // ---- output sink ----

    /// Routes effect output into a buffer instead of stdout.
    pub fn capture_output(&mut self) {
        self.output = Output::Captured(String::new());
    }

    pub fn take_output(&mut self) -> String {
        match &mut self.output {
            Output::Captured(buf) => std::mem::take(buf),
            Output::Stdout => String::new(),
        }
    }

    pub fn write_out(&mut self, text: &str) {
        match &mut self.output {
            Output::Stdout => print!("{text}"),
            Output::Captured(buf) => buf.push_str(text),
        }
    }
}
