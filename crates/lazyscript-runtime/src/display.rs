use crate::eval::ensure_sufficient_stack;
use crate::pattern::{CONS_TAG, LIST_TAG, TUPLE_TAG, UNIT_TAG};
use crate::thunk::{ThunkId, ThunkKind};
use crate::Runtime;
use lazyscript_ast::span::Span;
use std::fmt;

const CYCLE_MARK: &str = "...";

/// An uncaught Bottom as seen by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BottomReport {
    pub message: String,
    pub span: Option<Span>,
    pub related: Vec<String>,
}

impl fmt::Display for BottomReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bottom: {}", self.message)?;
        if let Some(sp) = self.span {
            write!(f, " at {}..{}", sp.offset, sp.offset + sp.len)?;
        }
        for r in &self.related {
            write!(f, "\n  related: {r}")?;
        }
        Ok(())
    }
}

impl std::error::Error for BottomReport {}

impl Runtime {
    /// Renders a value for output; strings at the top level print raw.
    ///
    /// A value reached again through itself prints as `...`.
    pub fn render(&mut self, t: ThunkId) -> String {
        self.render_value(t, true, &mut Vec::new())
    }

    pub fn report(&mut self, t: ThunkId) -> BottomReport {
        let v = self.whnf_of(t);
        let Some(b) = self.bottom(v).cloned() else {
            return BottomReport { message: self.render(v), span: None, related: vec![] };
        };
        let related =
            b.related.iter().map(|&r| self.render_value(r, false, &mut Vec::new())).collect();
        BottomReport { message: b.message, span: b.span, related }
    }

    fn render_value(&mut self, t: ThunkId, top: bool, path: &mut Vec<ThunkId>) -> String {
        let v = self.resolve(t);
        if path.contains(&v) {
            return CYCLE_MARK.into();
        }
        path.push(v);
        let out = ensure_sufficient_stack(|| self.render_node(v, top, path));
        path.pop();
        out
    }

    fn render_node(&mut self, v: ThunkId, top: bool, path: &mut Vec<ThunkId>) -> String {
        match self.kind(v).clone() {
            ThunkKind::Int(n) => n.to_string(),
            ThunkKind::Str(s) if top => s.to_string(),
            ThunkKind::Str(s) => format!("\"{}\"", s.as_str_lossy().escape_default()),
            ThunkKind::Symbol(s) => format!(".{s}"),
            ThunkKind::Alge { constr, args } => {
                if constr == UNIT_TAG && args.is_empty() {
                    "()".into()
                } else if constr == TUPLE_TAG {
                    format!("({})", self.render_all(&args, path))
                } else if constr == LIST_TAG {
                    format!("[{}]", self.render_all(&args, path))
                } else if constr == CONS_TAG && args.len() == 2 {
                    self.render_cons(args[0], args[1], path)
                } else if args.is_empty() {
                    constr.to_string()
                } else {
                    format!("{}({})", constr, self.render_all(&args, path))
                }
            }
            ThunkKind::Lambda { .. } | ThunkKind::Appl { .. } => "<fun>".into(),
            ThunkKind::Builtin(b) => format!("<builtin {}>", b.name),
            ThunkKind::Bottom(b) => format!("^({})", b.message),
            ThunkKind::Choice { .. } | ThunkKind::Ref { .. } => "<thunk>".into(),
        }
    }

    fn render_all(&mut self, items: &[ThunkId], path: &mut Vec<ThunkId>) -> String {
        items.iter().map(|&x| self.render_value(x, false, path)).collect::<Vec<_>>().join(", ")
    }

    /// A cons chain ending in a list prints as one list.
    fn render_cons(&mut self, head: ThunkId, tail: ThunkId, path: &mut Vec<ThunkId>) -> String {
        let mark = path.len();
        let mut items = vec![head];
        let mut rest = self.resolve(tail);
        let out = loop {
            if path.contains(&rest) {
                break self.render_open_cons(&items, CYCLE_MARK.into(), path);
            }
            match self.kind(rest).clone() {
                ThunkKind::Alge { constr, args } if constr == CONS_TAG && args.len() == 2 => {
                    path.push(rest);
                    items.push(args[0]);
                    rest = self.resolve(args[1]);
                }
                ThunkKind::Alge { constr, args } if constr == LIST_TAG => {
                    items.extend(args);
                    break format!("[{}]", self.render_all(&items, path));
                }
                _ => {
                    let tail = self.render_value(rest, false, path);
                    break self.render_open_cons(&items, tail, path);
                }
            }
        };
        path.truncate(mark);
        out
    }

    fn render_open_cons(
        &mut self,
        items: &[ThunkId],
        tail: String,
        path: &mut Vec<ThunkId>,
    ) -> String {
        let heads = items
            .iter()
            .map(|&x| self.render_value(x, false, path))
            .collect::<Vec<_>>()
            .join(" : ");
        format!("{heads} : {tail}")
    }
}
