//! The thunk arena.

use crate::env::EnvId;
use crate::intern::IStr;
use crate::pattern::Pat;
use crate::prepare::Code;
use crate::Runtime;
use lazyscript_ast::span::Span;
use std::fmt;
use std::rc::Rc;

pub const CYCLE_DETECTED: &str = "cycle detected";
pub const NO_MATCH: &str = "no match";
pub const RAISED: &str = "raised";
pub const DEPTH_EXCEEDED: &str = "recursion limit exceeded";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ThunkId(pub(crate) usize);

impl ThunkId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Single-assignment WHNF cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Whnf {
    Pending,
    Forcing,
    Done(ThunkId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChoiceKind {
    /// `|`
    Lambda,
    /// `||`
    Expr,
    /// `^|`
    Catch,
}

pub type BuiltinFn = Rc<dyn Fn(&mut Runtime, &[ThunkId]) -> ThunkId>;

#[derive(Clone)]
pub struct Builtin {
    pub name: IStr,
    pub arity: usize,
    pub func: BuiltinFn,
}

impl fmt::Debug for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Builtin").field("name", &self.name).field("arity", &self.arity).finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bottom {
    pub message: String,
    pub span: Option<Span>,
    pub related: Vec<ThunkId>,
    /// Value carried by `^(e)`; handed to caret patterns and `^|` handlers as is.
    pub payload: Option<ThunkId>,
}

impl Bottom {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into(), span: None, related: Vec::new(), payload: None }
    }
    pub fn at(mut self, span: Option<Span>) -> Self {
        self.span = span;
        self
    }
    pub fn related(mut self, related: Vec<ThunkId>) -> Self {
        self.related = related;
        self
    }
}

#[derive(Debug, Clone)]
pub enum ThunkKind {
    Appl { func: ThunkId, args: Vec<ThunkId>, span: Option<Span> },
    Alge { constr: IStr, args: Vec<ThunkId> },
    Int(i64),
    Str(IStr),
    Symbol(IStr),
    Lambda { param: Rc<Pat>, body: Rc<Code>, env: EnvId, span: Span },
    Ref { name: IStr, env: EnvId, span: Span },
    Choice { kind: ChoiceKind, left: ThunkId, right: ThunkId },
    Builtin(Builtin),
    Bottom(Bottom),
}

impl ThunkKind {
    fn starts_in_whnf(&self) -> bool {
        !matches!(self, ThunkKind::Appl { .. } | ThunkKind::Ref { .. })
    }

    pub fn describe(&self) -> &'static str {
        match self {
            ThunkKind::Appl { .. } => "application",
            ThunkKind::Alge { .. } => "constructor",
            ThunkKind::Int(_) => "int",
            ThunkKind::Str(_) => "string",
            ThunkKind::Symbol(_) => "symbol",
            ThunkKind::Lambda { .. } => "lambda",
            ThunkKind::Ref { .. } => "reference",
            ThunkKind::Choice { .. } => "choice",
            ThunkKind::Builtin(_) => "builtin",
            ThunkKind::Bottom(_) => "bottom",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Thunk {
    pub kind: ThunkKind,
    pub whnf: Whnf,
}

#[derive(Debug, Default)]
pub struct ThunkArena {
    thunks: Vec<Thunk>,
}

impl ThunkArena {
    pub fn alloc(&mut self, kind: ThunkKind) -> ThunkId {
        let id = ThunkId(self.thunks.len());
        let whnf = if kind.starts_in_whnf() { Whnf::Done(id) } else { Whnf::Pending };
        self.thunks.push(Thunk { kind, whnf });
        id
    }

    /// A partially applied builtin: an application that is its own WHNF.
    pub fn alloc_partial(&mut self, func: ThunkId, args: Vec<ThunkId>) -> ThunkId {
        let id = ThunkId(self.thunks.len());
        self.thunks.push(Thunk { kind: ThunkKind::Appl { func, args, span: None }, whnf: Whnf::Done(id) });
        id
    }

    pub fn get(&self, id: ThunkId) -> &Thunk {
        &self.thunks[id.index()]
    }

    pub(crate) fn set_whnf(&mut self, id: ThunkId, whnf: Whnf) {
        self.thunks[id.index()].whnf = whnf;
    }

    pub fn len(&self) -> usize {
        self.thunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.thunks.is_empty()
    }
}
