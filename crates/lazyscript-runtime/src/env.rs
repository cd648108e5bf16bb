//! Lexical scopes addressed by index.

use crate::error::EnvError;
use crate::intern::IStr;
use crate::pattern::Pat;
use crate::thunk::ThunkId;
use ahash::AHashMap;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EnvId(pub(crate) usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BindId(pub(crate) usize);

/// Where a name was bound.
#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    /// Entry of a let group; resolved by matching the binding on first use.
    Bind { binding: BindId, name: IStr },
    /// Piece of a lambda argument bound by a successful match.
    Param(ThunkId),
    /// Installed by the host or by a granted builtin.
    Thunk(ThunkId),
}

#[derive(Debug, Clone, PartialEq)]
pub enum BindState {
    Unmatched,
    Matching,
    Matched(Vec<(IStr, ThunkId)>),
    Failed(ThunkId),
}

#[derive(Debug, Clone)]
pub struct Binding {
    pub pat: Rc<Pat>,
    pub rhs: ThunkId,
    pub state: BindState,
}

#[derive(Debug, Default)]
pub struct Scope {
    parent: Option<EnvId>,
    entries: AHashMap<IStr, Target>,
    writable: bool,
}

impl Scope {
    pub fn parent(&self) -> Option<EnvId> {
        self.parent
    }
    pub fn is_writable(&self) -> bool {
        self.writable
    }
    pub fn get(&self, name: &IStr) -> Option<&Target> {
        self.entries.get(name)
    }
    pub fn entries(&self) -> impl Iterator<Item = (&IStr, &Target)> {
        self.entries.iter()
    }
    pub fn len(&self) -> usize {
        self.entries.len()
    }
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct EnvArena {
    scopes: Vec<Scope>,
    bindings: Vec<Binding>,
}

impl EnvArena {
    pub fn alloc(&mut self, parent: Option<EnvId>) -> EnvId {
        let id = EnvId(self.scopes.len());
        self.scopes.push(Scope { parent, ..Scope::default() });
        id
    }

    pub fn scope(&self, env: EnvId) -> &Scope {
        &self.scopes[env.0]
    }

    fn scope_mut(&mut self, env: EnvId) -> &mut Scope {
        &mut self.scopes[env.0]
    }

    /// Searches `env`, then its ancestors.
    pub fn lookup(&self, env: EnvId, name: &IStr) -> Option<&Target> {
        let mut cur = Some(env);
        while let Some(id) = cur {
            let scope = self.scope(id);
            if let Some(t) = scope.entries.get(name) {
                return Some(t);
            }
            cur = scope.parent;
        }
        None
    }

    /// Binds into `env` itself. Last write wins.
    pub fn bind(&mut self, env: EnvId, name: IStr, target: Target) {
        self.scope_mut(env).entries.insert(name, target);
    }

    pub fn set_writable(&mut self, env: EnvId, writable: bool) {
        self.scope_mut(env).writable = writable;
    }

    /// Controlled insertion used after construction.
    pub fn insert(&mut self, env: EnvId, name: IStr, target: Target) -> Result<(), EnvError> {
        let scope = self.scope_mut(env);
        if !scope.writable {
            return Err(EnvError::ReadOnly);
        }
        scope.entries.insert(name, target);
        Ok(())
    }

    pub fn add_binding(&mut self, pat: Rc<Pat>, rhs: ThunkId) -> BindId {
        let id = BindId(self.bindings.len());
        self.bindings.push(Binding { pat, rhs, state: BindState::Unmatched });
        id
    }

    pub fn binding(&self, id: BindId) -> &Binding {
        &self.bindings[id.0]
    }

    pub(crate) fn set_bind_state(&mut self, id: BindId, state: BindState) {
        self.bindings[id.0].state = state;
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }
}
