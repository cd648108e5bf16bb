//! Compiled patterns.
//!
//! Surface sugar is gone by the time a [`Pat`] exists: tuples, lists, cons
//! cells and unit are all algebraic patterns over the tags below.

use crate::intern::IStr;

pub const TUPLE_TAG: &str = ",";
pub const LIST_TAG: &str = "[]";
pub const CONS_TAG: &str = ":";
pub const UNIT_TAG: &str = "()";
pub const BOTTOM_TAG: &str = "Bottom";

#[derive(Debug, Clone, PartialEq)]
pub enum Pat {
    Alge { constr: IStr, args: Vec<Pat> },
    As { name: IStr, inner: Box<Pat> },
    Int(i64),
    Str(IStr),
    Wildcard,
    Or { left: Box<Pat>, right: Box<Pat> },
    Caret(Box<Pat>),
    /// Binder leaf. A successful match records the scrutinee under `name`.
    Ref { name: IStr },
}

impl Pat {
    /// Names bound by this pattern, in first-occurrence order.
    ///
    /// Or-patterns contribute their left side only; both sides are known to
    /// bind the same set once preparation has accepted the pattern.
    pub fn binders(&self) -> Vec<IStr> {
        let mut out = Vec::new();
        self.collect_binders(&mut out);
        out
    }

    fn collect_binders(&self, out: &mut Vec<IStr>) {
        match self {
            Pat::Ref { name } => out.push(name.clone()),
            Pat::As { name, inner } => {
                inner.collect_binders(out);
                out.push(name.clone());
            }
            Pat::Alge { args, .. } => args.iter().for_each(|p| p.collect_binders(out)),
            Pat::Or { left, .. } => left.collect_binders(out),
            Pat::Caret(inner) => inner.collect_binders(out),
            Pat::Int(_) | Pat::Str(_) | Pat::Wildcard => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intern::Interner;

    #[test]
    fn binders_follow_source_order() {
        let mut i = Interner::new();
        let (x, y, all) = (i.intern("x"), i.intern("y"), i.intern("all"));
        let p = Pat::As {
            name: all.clone(),
            inner: Box::new(Pat::Alge {
                constr: i.intern(TUPLE_TAG),
                args: vec![
                    Pat::Ref { name: x.clone() },
                    Pat::Or {
                        left: Box::new(Pat::Ref { name: y.clone() }),
                        right: Box::new(Pat::Caret(Box::new(Pat::Ref { name: y.clone() }))),
                    },
                ],
            }),
        };
        assert_eq!(p.binders(), vec![x, y, all]);
    }

    #[test]
    fn literals_bind_nothing() {
        let mut i = Interner::new();
        let p = Pat::Alge { constr: i.intern(UNIT_TAG), args: vec![Pat::Int(0), Pat::Wildcard] };
        assert!(p.binders().is_empty());
    }
}
