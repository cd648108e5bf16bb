//! Core builtins installed into the root scope.

use crate::effects::{eff_guard, eff_print, eff_println};
use crate::pattern::{CONS_TAG, LIST_TAG};
use crate::thunk::{Bottom, ThunkId, ThunkKind};
use crate::Runtime;

pub fn install(rt: &mut Runtime) {
    let root = rt.root_env();

    // sequencing: the first argument is forced inside an effect region
    rt.install_builtin(root, "seq", 2, |rt, args| {
        let first = in_effect_region(rt, args[0]);
        if rt.is_bottom(first) {
            return first;
        }
        args[1]
    });
    rt.install_builtin(root, "chain", 2, |rt, args| {
        let action = in_effect_region(rt, args[0]);
        if rt.is_bottom(action) {
            return action;
        }
        let unit = rt.unit();
        rt.defer_apply(args[1], vec![unit])
    });
    rt.install_builtin(root, "bind", 2, |rt, args| {
        let value = in_effect_region(rt, args[0]);
        if rt.is_bottom(value) {
            return value;
        }
        rt.defer_apply(args[1], vec![value])
    });
    rt.install_builtin(root, "return", 1, |_rt, args| args[0]);

    rt.install_builtin(root, "print", 1, eff_print);
    rt.install_builtin(root, "println", 1, eff_println);

    // def : Symbol -> a -> (), writes into the root scope when granted
    rt.install_builtin(root, "def", 2, |rt, args| {
        if let Err(b) = eff_guard(rt, "def") {
            return b;
        }
        let key = rt.resolve(args[0]);
        let name = match rt.kind(key) {
            ThunkKind::Symbol(s) => s.to_string(),
            ThunkKind::Bottom(_) => return key,
            _ => return expected(rt, "def", "Symbol", &[key]),
        };
        let root = rt.root_env();
        match rt.insert(root, &name, args[1]) {
            Ok(()) => rt.unit(),
            Err(e) => rt.new_bottom(Bottom::new(format!("def: {e}")).related(vec![key])),
        }
    });

    rt.install_builtin(root, "add", 2, |rt, args| match int_pair(rt, "add", args) {
        Ok((a, b)) => match a.checked_add(b) {
            Some(n) => rt.int(n),
            None => rt.new_bottom(Bottom::new("add: overflow")),
        },
        Err(b) => b,
    });
    rt.install_builtin(root, "sub", 2, |rt, args| match int_pair(rt, "sub", args) {
        Ok((a, b)) => match a.checked_sub(b) {
            Some(n) => rt.int(n),
            None => rt.new_bottom(Bottom::new("sub: overflow")),
        },
        Err(b) => b,
    });
    rt.install_builtin(root, "lt", 2, |rt, args| match int_pair(rt, "lt", args) {
        Ok((a, b)) => rt.bool(a < b),
        Err(b) => b,
    });
    rt.install_builtin(root, "eq", 2, |rt, args| {
        let a = rt.resolve(args[0]);
        if rt.is_bottom(a) {
            return a;
        }
        let b = rt.resolve(args[1]);
        if rt.is_bottom(b) {
            return b;
        }
        let same = match (rt.kind(a), rt.kind(b)) {
            (ThunkKind::Int(x), ThunkKind::Int(y)) => x == y,
            (ThunkKind::Str(x), ThunkKind::Str(y)) | (ThunkKind::Symbol(x), ThunkKind::Symbol(y)) => {
                x == y
            }
            _ => return expected(rt, "eq", "two Ints, Strs or Symbols", &[a, b]),
        };
        rt.bool(same)
    });

    rt.install_builtin(root, "to_str", 1, |rt, args| {
        let v = rt.resolve(args[0]);
        if rt.is_bottom(v) {
            return v;
        }
        let text = rt.render(v);
        rt.str(text)
    });
    rt.install_builtin(root, "head", 1, |rt, args| {
        let v = rt.resolve(args[0]);
        match rt.kind(v).clone() {
            ThunkKind::Bottom(_) => v,
            ThunkKind::Alge { constr, args } if constr == CONS_TAG && args.len() == 2 => args[0],
            ThunkKind::Alge { constr, args } if constr == LIST_TAG && !args.is_empty() => args[0],
            ThunkKind::Str(s) if !s.is_empty() => rt.int(i64::from(s.as_bytes()[0])),
            _ => expected(rt, "head", "a non-empty list", &[v]),
        }
    });

    tracing::debug!("installed core prelude");
}

fn in_effect_region(rt: &mut Runtime, t: ThunkId) -> ThunkId {
    rt.effects_mut().begin();
    let v = rt.resolve(t);
    rt.effects_mut().end();
    v
}

fn expected(rt: &mut Runtime, op: &str, what: &str, related: &[ThunkId]) -> ThunkId {
    rt.new_bottom(Bottom::new(format!("{op}: expected {what}")).related(related.to_vec()))
}

fn int_pair(rt: &mut Runtime, op: &str, args: &[ThunkId]) -> Result<(i64, i64), ThunkId> {
    let a = rt.resolve(args[0]);
    if rt.is_bottom(a) {
        return Err(a);
    }
    let b = rt.resolve(args[1]);
    if rt.is_bottom(b) {
        return Err(b);
    }
    match (rt.int_of(a), rt.int_of(b)) {
        (Some(x), Some(y)) => Ok((x, y)),
        _ => Err(expected(rt, op, "Int", &[a, b])),
    }
}
