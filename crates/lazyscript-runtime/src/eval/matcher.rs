//! Transactional pattern matching.
//!
//! Bindings accumulate in a [`Delta`]; a failing sub-match truncates back to
//! where it started, so nothing from a failed attempt leaks out. Scrutinees
//! are forced only as deep as the pattern looks.

use super::ensure_sufficient_stack;
use crate::intern::IStr;
use crate::pattern::{Pat, CONS_TAG, LIST_TAG};
use crate::thunk::{ChoiceKind, ThunkId, ThunkKind};
use crate::Runtime;

pub type Delta = Vec<(IStr, ThunkId)>;

impl Runtime {
    pub(crate) fn match_pat(&mut self, pat: &Pat, t: ThunkId, delta: &mut Delta) -> bool {
        let mark = delta.len();
        let ok = ensure_sufficient_stack(|| self.match_step(pat, t, delta));
        if !ok {
            delta.truncate(mark);
        }
        ok
    }

    fn match_step(&mut self, pat: &Pat, t: ThunkId, delta: &mut Delta) -> bool {
        match pat {
            Pat::Wildcard => true,
            Pat::Ref { name } => {
                delta.push((name.clone(), t));
                true
            }
            Pat::As { name, inner } => {
                if !self.match_pat(inner, t, delta) {
                    return false;
                }
                delta.push((name.clone(), t));
                true
            }
            Pat::Or { left, right } => {
                self.match_pat(left, t, delta) || self.match_pat(right, t, delta)
            }
            Pat::Caret(_) | Pat::Int(_) | Pat::Str(_) | Pat::Alge { .. } => {
                let v = self.force(t);
                if let ThunkKind::Choice { kind, left, right } = self.kind(v).clone() {
                    // A caret sees the choice only when every alternative failed.
                    if let Pat::Caret(_) = pat {
                        let r = self.resolve(v);
                        return self.match_shape(pat, r, delta);
                    }
                    return self.match_choice(pat, kind, left, right, delta);
                }
                self.match_shape(pat, v, delta)
            }
        }
    }

    fn match_choice(
        &mut self,
        pat: &Pat,
        kind: ChoiceKind,
        left: ThunkId,
        right: ThunkId,
        delta: &mut Delta,
    ) -> bool {
        match kind {
            ChoiceKind::Lambda | ChoiceKind::Expr => {
                self.match_pat(pat, left, delta) || self.match_pat(pat, right, delta)
            }
            ChoiceKind::Catch => {
                let l = self.resolve(left);
                if !self.is_bottom(l) {
                    return self.match_pat(pat, l, delta);
                }
                let caught = self.caught(l);
                let handled = self.apply(right, &[caught]);
                self.match_pat(pat, handled, delta)
            }
        }
    }

    fn match_shape(&mut self, pat: &Pat, v: ThunkId, delta: &mut Delta) -> bool {
        match (pat, self.kind(v).clone()) {
            (Pat::Caret(inner), ThunkKind::Bottom(_)) => {
                let caught = self.caught(v);
                self.match_pat(inner, caught, delta)
            }
            (Pat::Caret(_), _) | (_, ThunkKind::Bottom(_)) => false,
            (Pat::Int(n), ThunkKind::Int(m)) => *n == m,
            (Pat::Str(s), ThunkKind::Str(x)) => *s == x,
            (Pat::Alge { constr, args }, ThunkKind::Alge { constr: tag, args: fields }) => {
                self.match_alge(constr, args, &tag, &fields, delta)
            }
            (Pat::Alge { constr, args }, ThunkKind::Str(s)) => {
                self.match_string_view(constr, args, &s, delta)
            }
            _ => false,
        }
    }

    fn match_all(&mut self, pats: &[Pat], fields: &[ThunkId], delta: &mut Delta) -> bool {
        pats.iter().zip(fields).all(|(p, &f)| self.match_pat(p, f, delta))
    }

    fn match_alge(
        &mut self,
        constr: &IStr,
        args: &[Pat],
        tag: &IStr,
        fields: &[ThunkId],
        delta: &mut Delta,
    ) -> bool {
        if constr == tag {
            return args.len() == fields.len() && self.match_all(args, fields, delta);
        }
        // `h : t` against a non-empty n-ary list.
        if constr == CONS_TAG && tag == LIST_TAG && args.len() == 2 && !fields.is_empty() {
            let tail = self.list(fields[1..].to_vec());
            return self.match_pat(&args[0], fields[0], delta)
                && self.match_pat(&args[1], tail, delta);
        }
        // `[p, ...]` against a cons chain.
        if constr == LIST_TAG && tag == CONS_TAG && fields.len() == 2 && !args.is_empty() {
            if !self.match_pat(&args[0], fields[0], delta) {
                return false;
            }
            let rest = Pat::Alge { constr: constr.clone(), args: args[1..].to_vec() };
            return self.match_pat(&rest, fields[1], delta);
        }
        false
    }

    /// Strings match list and cons patterns byte by byte.
    fn match_string_view(
        &mut self,
        constr: &IStr,
        args: &[Pat],
        s: &IStr,
        delta: &mut Delta,
    ) -> bool {
        let bytes = s.as_bytes();
        if constr == CONS_TAG && args.len() == 2 && !bytes.is_empty() {
            let head = self.int(i64::from(bytes[0]));
            let tail = self.str(&bytes[1..]);
            return self.match_pat(&args[0], head, delta) && self.match_pat(&args[1], tail, delta);
        }
        if constr == LIST_TAG && args.len() == bytes.len() {
            let items: Vec<ThunkId> = bytes.iter().map(|&b| self.int(i64::from(b))).collect();
            return self.match_all(args, &items, delta);
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use crate::pattern::{Pat, CONS_TAG, LIST_TAG, TUPLE_TAG};
    use crate::thunk::Bottom;
    use crate::Runtime;
    use pretty_assertions::assert_eq;

    #[test]
    fn failed_tuple_match_leaves_no_bindings() {
        let mut rt = Runtime::default();
        let (x, comma) = (rt.intern("x"), rt.intern(TUPLE_TAG));
        let pat = Pat::Alge { constr: comma, args: vec![Pat::Ref { name: x }, Pat::Int(9)] };
        let (a, b) = (rt.int(1), rt.int(2));
        let tup = rt.ctor(TUPLE_TAG, vec![a, b]);
        let mut delta = vec![];
        assert!(!rt.match_pat(&pat, tup, &mut delta));
        assert!(delta.is_empty());
    }

    #[test]
    fn unforced_sibling_stays_pending() {
        let mut rt = Runtime::default();
        let (x, comma) = (rt.intern("x"), rt.intern(TUPLE_TAG));
        let pat = Pat::Alge { constr: comma, args: vec![Pat::Ref { name: x }, Pat::Wildcard] };
        let one = rt.int(1);
        let pending = rt.defer_apply(one, vec![one]);
        let tup = rt.ctor(TUPLE_TAG, vec![one, pending]);
        let delta = rt.match_pattern(&pat, tup).unwrap();
        assert_eq!(delta.len(), 1);
        assert_eq!(rt.thunk(pending).whnf, crate::Whnf::Pending);
    }

    #[test]
    fn cons_pattern_sees_list_and_string() {
        let mut rt = Runtime::default();
        let (h, t, cons) = (rt.intern("h"), rt.intern("t"), rt.intern(CONS_TAG));
        let pat = Pat::Alge {
            constr: cons,
            args: vec![Pat::Ref { name: h }, Pat::Ref { name: t }],
        };
        let (a, b) = (rt.int(10), rt.int(20));
        let list = rt.list(vec![a, b]);
        let delta = rt.match_pattern(&pat, list).unwrap();
        assert_eq!(delta[0].1, a);
        let tail = rt.render(delta[1].1);
        assert_eq!(tail, "[20]");

        let s = rt.str("hi");
        let delta = rt.match_pattern(&pat, s).unwrap();
        assert_eq!(rt.int_of(delta[0].1), Some(i64::from(b'h')));
        assert_eq!(rt.render(delta[1].1), "i");

        let empty = rt.list(vec![]);
        assert!(rt.match_pattern(&pat, empty).is_none());
    }

    #[test]
    fn list_pattern_walks_cons_chain() {
        let mut rt = Runtime::default();
        let (x, list_tag) = (rt.intern("x"), rt.intern(LIST_TAG));
        let pat = Pat::Alge { constr: list_tag, args: vec![Pat::Int(1), Pat::Ref { name: x }] };
        let (one, two) = (rt.int(1), rt.int(2));
        let nil = rt.list(vec![]);
        let inner = rt.ctor(CONS_TAG, vec![two, nil]);
        let chain = rt.ctor(CONS_TAG, vec![one, inner]);
        let delta = rt.match_pattern(&pat, chain).unwrap();
        assert_eq!(delta.len(), 1);
        assert_eq!(delta[0].1, two);
    }

    #[test]
    fn caret_matches_bottom_only() {
        let mut rt = Runtime::default();
        let m = rt.intern("m");
        let bottom_tag = rt.intern("Bottom");
        let pat = Pat::Caret(Box::new(Pat::Alge {
            constr: bottom_tag,
            args: vec![Pat::Ref { name: m }, Pat::Wildcard],
        }));
        let b = rt.new_bottom(Bottom::new("boom"));
        let delta = rt.match_pattern(&pat, b).unwrap();
        assert_eq!(rt.render(delta[0].1), "boom");
        let fine = rt.int(3);
        assert!(rt.match_pattern(&pat, fine).is_none());
    }

    #[test]
    fn bottom_fails_structural_patterns() {
        let mut rt = Runtime::default();
        let b = rt.new_bottom(Bottom::new("boom"));
        assert!(rt.match_pattern(&Pat::Int(1), b).is_none());
        assert!(rt.match_pattern(&Pat::Wildcard, b).is_some());
    }
}
