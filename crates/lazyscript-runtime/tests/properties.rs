mod common;

use common::*;
use lazyscript_ast::ast::Pattern;
use lazyscript_runtime::{Runtime, RuntimeConfig, ThunkId};
use proptest::prelude::*;
use std::cell::Cell;
use std::rc::Rc;

const NAMES: [&str; 3] = ["a", "b", "c"];

/// Tuple pattern binding the selected names, wildcards elsewhere.
fn selective_tuple(select: &[bool]) -> Pattern {
    tuple_pat(
        select
            .iter()
            .zip(NAMES)
            .map(|(&on, n)| if on { var_pat(n) } else { wild_pat() })
            .collect(),
    )
}

proptest! {
    #[test]
    fn forcing_is_idempotent_and_runs_once(a in -1000i64..1000, b in -1000i64..1000, n in 1usize..5) {
        let mut rt = Runtime::with_prelude(RuntimeConfig::default());
        let count = Rc::new(Cell::new(0));
        let seen = Rc::clone(&count);
        let root = rt.root_env();
        rt.install_builtin(root, "tick", 1, move |_rt, args: &[ThunkId]| {
            seen.set(seen.get() + 1);
            args[0]
        });
        let e = call("add", vec![call("tick", vec![int_expr(a)]), int_expr(b)]);
        let t = rt.compile(&e, root).unwrap();
        let first = rt.force(t);
        for _ in 0..n {
            prop_assert_eq!(rt.force(t), first);
        }
        prop_assert_eq!(rt.int_of(first), Some(a + b));
        prop_assert_eq!(count.get(), 1);
    }

    #[test]
    fn earliest_matching_clause_wins(x in -3i64..3, first in -3i64..3, third in -3i64..3) {
        let mut rt = Runtime::with_prelude(RuntimeConfig::default());
        let clauses = alt_expr(
            lambda_expr(int_pat(first), str_expr("c1")),
            alt_expr(
                lambda_expr(int_pat(100), str_expr("c2")),
                lambda_expr(int_pat(third), str_expr("c3")),
            ),
        );
        let e = apply_expr(clauses, vec![int_expr(x)]);
        let expected = if x == first {
            Some("c1")
        } else if x == third {
            Some("c3")
        } else {
            None
        };
        match (rt.run(&e), expected) {
            (Ok(v), Some(want)) => prop_assert_eq!(rt.render(v), want),
            (Err(_), None) => {}
            (got, want) => prop_assert!(false, "got {:?}, expected {:?}", got.is_ok(), want),
        }
    }

    #[test]
    fn or_pattern_accepted_iff_name_sets_agree(
        left in proptest::collection::vec(any::<bool>(), 3),
        right in proptest::collection::vec(any::<bool>(), 3),
    ) {
        let mut rt = Runtime::default();
        let e = lambda_expr(
            or_pat(selective_tuple(&left), selective_tuple(&right)),
            unit_expr(),
        );
        let root = rt.root_env();
        let compiled = rt.compile(&e, root);
        prop_assert_eq!(compiled.is_ok(), left == right);
    }
}
