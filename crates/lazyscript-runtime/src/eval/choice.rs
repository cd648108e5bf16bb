use crate::thunk::{ChoiceKind, ThunkId, ThunkKind};
use crate::Runtime;

impl Runtime {
    /// Applies both alternatives of a choice.
    ///
    /// The left side runs now. If it fails the right side decides; otherwise
    /// the right application stays deferred inside a new choice, except for
    /// `^|`, whose handler only ever sees failures.
    pub(crate) fn apply_choice(
        &mut self,
        kind: ChoiceKind,
        left: ThunkId,
        right: ThunkId,
        args: Vec<ThunkId>,
    ) -> ThunkId {
        let l = self.apply(left, &args);
        if self.is_bottom(l) {
            return match kind {
                ChoiceKind::Catch => {
                    let caught = self.caught(l);
                    self.apply(right, &[caught])
                }
                ChoiceKind::Lambda | ChoiceKind::Expr => self.apply(right, &args),
            };
        }
        match kind {
            ChoiceKind::Catch => l,
            ChoiceKind::Lambda | ChoiceKind::Expr => {
                let r = self.defer_apply(right, args);
                self.thunks.alloc(ThunkKind::Choice { kind, left: l, right: r })
            }
        }
    }

    /// Forces `t` and collapses any choice, first success wins.
    ///
    /// The result is never a choice. It is Bottom only when every
    /// alternative failed; the last failure is the one returned.
    pub fn resolve(&mut self, t: ThunkId) -> ThunkId {
        let v = self.force(t);
        let ThunkKind::Choice { kind, left, right } = self.kind(v).clone() else {
            return v;
        };
        let l = self.resolve(left);
        if !self.is_bottom(l) {
            return l;
        }
        match kind {
            ChoiceKind::Catch => {
                let caught = self.caught(l);
                let handled = self.apply(right, &[caught]);
                self.resolve(handled)
            }
            ChoiceKind::Lambda | ChoiceKind::Expr => self.resolve(right),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::thunk::{Bottom, ChoiceKind, ThunkKind};
    use crate::Runtime;

    #[test]
    fn expression_choice_prefers_left() {
        let mut rt = Runtime::default();
        let (a, b) = (rt.int(1), rt.int(2));
        let c = rt.thunks.alloc(ThunkKind::Choice { kind: ChoiceKind::Expr, left: a, right: b });
        assert_eq!(rt.force(c), c);
        let r = rt.resolve(c);
        assert_eq!(rt.int_of(r), Some(1));
    }

    #[test]
    fn failing_left_falls_through() {
        let mut rt = Runtime::default();
        let bad = rt.new_bottom(Bottom::new("nope"));
        let b = rt.int(2);
        let c = rt.thunks.alloc(ThunkKind::Choice { kind: ChoiceKind::Expr, left: bad, right: b });
        let r = rt.resolve(c);
        assert_eq!(rt.int_of(r), Some(2));
    }

    #[test]
    fn both_failing_propagates_right_bottom() {
        let mut rt = Runtime::default();
        let l = rt.new_bottom(Bottom::new("left"));
        let r = rt.new_bottom(Bottom::new("right"));
        let c = rt.thunks.alloc(ThunkKind::Choice { kind: ChoiceKind::Expr, left: l, right: r });
        let v = rt.resolve(c);
        assert_eq!(rt.bottom(v).map(|b| b.message.as_str()), Some("right"));
    }
}
