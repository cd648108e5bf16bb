use crate::thunk::{Bottom, ThunkId};
use crate::Runtime;

/// Nesting counter for regions opened by sequencing builtins.
#[derive(Debug, Clone, Default)]
pub struct EffectGuard {
    strict: bool,
    depth: usize,
}

impl EffectGuard {
    pub fn new(strict: bool) -> Self {
        Self { strict, depth: 0 }
    }
    pub fn begin(&mut self) {
        self.depth += 1;
    }
    pub fn end(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
    pub fn allowed(&self) -> bool {
        !self.strict || self.depth > 0
    }
    pub fn is_strict(&self) -> bool {
        self.strict
    }
    pub fn depth(&self) -> usize {
        self.depth
    }
}

/// Bottom for an effect attempted in a pure context.
pub fn eff_guard(rt: &mut Runtime, op: &str) -> Result<(), ThunkId> {
    if rt.effects().allowed() {
        Ok(())
    } else {
        Err(rt.new_bottom(Bottom::new(format!(
            "{op}: effect used in pure context (enable seq/chain)"
        ))))
    }
}

pub fn eff_print(rt: &mut Runtime, args: &[ThunkId]) -> ThunkId {
    write_effect(rt, "print", args[0], false)
}

pub fn eff_println(rt: &mut Runtime, args: &[ThunkId]) -> ThunkId {
    write_effect(rt, "println", args[0], true)
}

fn write_effect(rt: &mut Runtime, op: &str, arg: ThunkId, newline: bool) -> ThunkId {
    if let Err(b) = eff_guard(rt, op) {
        return b;
    }
    let v = rt.resolve(arg);
    if rt.is_bottom(v) {
        return v;
    }
    let mut text = rt.render(v);
    if newline {
        text.push('\n');
    }
    rt.write_out(&text);
    rt.unit()
}
