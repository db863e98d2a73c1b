// syn.txt -- a text based synthesizer and audio workstation
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Scope stack and symbol table: global values, global block scopes, and per-function frames
//! each holding their own `params`/`local`/block scopes.
//!
//! A single struct owns all of that state, rather than spreading it across several loosely
//! coupled globals, and exposes the handful of operations described below.

use std::collections::HashMap;

use log::{trace, warn};

use crate::lang::errors::{AlreadyExistsSnafu, EvalError, NotDefinedSnafu};
use crate::lang::value::Value;
use snafu::ensure;

pub type Bindings = HashMap<String, Value>;

#[derive(Debug, Default)]
struct Frame {
    /// Scope name (in push order, innermost last) -> bindings. Always contains `params` and,
    /// once the body starts executing, `local`; plus any nested block scopes.
    scopes: Vec<(String, Bindings)>,
}

impl Frame {
    fn new() -> Self {
        Frame {
            scopes: vec![("params".to_string(), Bindings::new())],
        }
    }
}

/// The evaluator's whole mutable symbol-table state.
#[derive(Debug, Default)]
pub struct ScopeStack {
    /// Top-level name -> value map, including stored function definitions keyed by mangled name.
    global_values: Bindings,
    /// Top-level block scopes (if/while/for/switch/case/default appearing outside any function).
    global_scopes: Vec<(String, Bindings)>,
    /// Live function call frames, innermost (top of call stack) last.
    frames: Vec<Frame>,
}

impl ScopeStack {
    pub fn new() -> Self {
        ScopeStack::default()
    }

    fn scopes_mut(&mut self) -> &mut Vec<(String, Bindings)> {
        match self.frames.last_mut() {
            Some(frame) => &mut frame.scopes,
            None => &mut self.global_scopes,
        }
    }

    fn scopes(&self) -> &[(String, Bindings)] {
        match self.frames.last() {
            Some(frame) => &frame.scopes,
            None => &self.global_scopes,
        }
    }

    /// Smallest non-negative integer N such that `<kind>N` is not already an active scope name
    /// anywhere in the currently-visible stack.
    pub fn fresh_scope_name(&self, kind: &str) -> String {
        let mut n = 0usize;
        loop {
            let candidate = format!("{}{}", kind, n);
            if !self.scopes().iter().any(|(name, _)| name == &candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    pub fn push_block_scope(&mut self, kind: &str) -> String {
        let name = self.fresh_scope_name(kind);
        trace!("push block scope {}", name);
        self.scopes_mut().push((name.clone(), Bindings::new()));
        name
    }

    pub fn pop_block_scope(&mut self, name: &str) {
        let scopes = self.scopes_mut();
        match scopes.last() {
            Some((top, _)) if top == name => {
                scopes.pop();
                trace!("pop block scope {}", name);
            }
            Some((top, _)) => {
                warn!(
                    "popping scope '{}' but top of stack is '{}'; forcing pop",
                    name, top
                );
                scopes.pop();
            }
            None => warn!("popping scope '{}' but scope stack is empty", name),
        }
    }

    /// Pushes the synthetic `local` scope a function body executes its own top-level
    /// declarations into. Distinct from `params`, pushed earlier by `push_func_frame`.
    pub fn push_local_scope(&mut self) {
        self.scopes_mut().push(("local".to_string(), Bindings::new()));
    }

    pub fn pop_local_scope(&mut self) {
        self.scopes_mut().pop();
    }

    pub fn push_func_frame(&mut self) {
        self.frames.push(Frame::new());
    }

    pub fn pop_func_frame(&mut self) {
        self.frames.pop();
    }

    pub fn in_function(&self) -> bool {
        !self.frames.is_empty()
    }

    /// Current function's `params` bindings, if any (used by recursive-call seeding and by
    /// math-backend substitution to detect "is this name a parameter").
    pub fn current_params(&self) -> Option<&Bindings> {
        self.frames
            .last()?
            .scopes
            .iter()
            .find(|(name, _)| name == "params")
            .map(|(_, b)| b)
    }

    pub fn current_params_mut(&mut self) -> Option<&mut Bindings> {
        self.frames
            .last_mut()?
            .scopes
            .iter_mut()
            .find(|(name, _)| name == "params")
            .map(|(_, b)| b)
    }

    /// Index of the frame that will be pushed next (i.e. the index the about-to-be-pushed
    /// frame will occupy). Callers use this right after `push_func_frame` to remember "this is
    /// frame `_0` for function X" so a later recursive call can seed from it specifically,
    /// rather than from whichever frame happens to be innermost at call time.
    pub fn next_frame_index(&self) -> usize {
        self.frames.len()
    }

    pub fn params_at(&self, frame_index: usize) -> Option<&Bindings> {
        self.frames
            .get(frame_index)?
            .scopes
            .iter()
            .find(|(name, _)| name == "params")
            .map(|(_, b)| b)
    }

    fn visible_anywhere(&self, name: &str) -> bool {
        if self.global_values.contains_key(name) {
            return true;
        }
        self.scopes().iter().any(|(_, b)| b.contains_key(name))
    }

    /// Declaration. Fails if `name` is visible anywhere in the global map or the current
    /// in-scope frame chain.
    pub fn define(&mut self, name: &str, value: Value) -> Result<(), EvalError> {
        ensure!(
            !self.visible_anywhere(name),
            AlreadyExistsSnafu {
                name: name.to_string()
            }
        );
        if self.scopes().is_empty() && !self.in_function() {
            self.global_values.insert(name.to_string(), value);
        } else {
            let scopes = self.scopes_mut();
            let (_, bindings) = scopes.last_mut().expect("checked non-empty above");
            bindings.insert(name.to_string(), value);
        }
        Ok(())
    }

    /// Binds `name` in the current innermost scope unconditionally, bypassing the
    /// already-visible check `define` performs. Used only by `for` loops to rebind their
    /// iteration variable on each pass through a scope that outlives the whole loop.
    pub fn rebind_in_current_scope(&mut self, name: &str, value: Value) {
        let scopes = self.scopes_mut();
        let (_, bindings) = scopes
            .last_mut()
            .expect("for-loop scope must be pushed before rebinding its variable");
        bindings.insert(name.to_string(), value);
    }

    /// Reassignment: writes to the innermost frame already holding `name`.
    pub fn assign(&mut self, name: &str, value: Value) -> Result<(), EvalError> {
        for (_, bindings) in self.scopes_mut().iter_mut().rev() {
            if let Some(slot) = bindings.get_mut(name) {
                *slot = value;
                return Ok(());
            }
        }
        if let Some(slot) = self.global_values.get_mut(name) {
            *slot = value;
            return Ok(());
        }
        NotDefinedSnafu {
            name: name.to_string(),
        }
        .fail()
    }

    /// Innermost-first lookup. Inside a function, searches the current frame's scope chain,
    /// then falls back to the global value map -- never the caller's scopes.
    pub fn lookup(&self, name: &str) -> Result<Value, EvalError> {
        for (_, bindings) in self.scopes().iter().rev() {
            if let Some(value) = bindings.get(name) {
                return Ok(value.clone());
            }
        }
        if let Some(value) = self.global_values.get(name) {
            return Ok(value.clone());
        }
        NotDefinedSnafu {
            name: name.to_string(),
        }
        .fail()
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn define_then_lookup() {
        let mut s = ScopeStack::new();
        s.define("x", Value::Int(5)).unwrap();
        assert_eq!(s.lookup("x").unwrap(), Value::Int(5));
    }

    #[test]
    fn redefine_fails() {
        let mut s = ScopeStack::new();
        s.define("x", Value::Int(5)).unwrap();
        assert!(s.define("x", Value::Int(6)).is_err());
    }

    #[test]
    fn assign_innermost_wins() {
        let mut s = ScopeStack::new();
        s.define("x", Value::Int(1)).unwrap();
        let scope = s.push_block_scope("if");
        // x is visible from the outer global scope, so re-declaring inside the if must fail...
        assert!(s.define("x", Value::Int(2)).is_err());
        // ...but assign finds and updates the existing (outer) binding.
        s.assign("x", Value::Int(9)).unwrap();
        s.pop_block_scope(&scope);
        assert_eq!(s.lookup("x").unwrap(), Value::Int(9));
    }

    #[test]
    fn pop_scope_removes_visibility() {
        let mut s = ScopeStack::new();
        let scope = s.push_block_scope("if");
        s.define("y", Value::Int(1)).unwrap();
        s.pop_block_scope(&scope);
        assert!(s.lookup("y").is_err());
        // now the name is free again at the outer level
        s.define("y", Value::Int(2)).unwrap();
    }

    #[test]
    fn scope_names_reuse_smallest_free_index() {
        let mut s = ScopeStack::new();
        let a = s.push_block_scope("if");
        assert_eq!(a, "if0");
        let b = s.push_block_scope("if");
        assert_eq!(b, "if1");
        s.pop_block_scope(&b);
        let c = s.push_block_scope("if");
        assert_eq!(c, "if1");
    }

    #[test]
    fn function_frame_isolates_locals_but_sees_globals() {
        let mut s = ScopeStack::new();
        s.define("g", Value::Int(10)).unwrap();
        s.push_func_frame();
        s.current_params_mut()
            .unwrap()
            .insert("n".to_string(), Value::Int(3));
        assert_eq!(s.lookup("n").unwrap(), Value::Int(3));
        assert_eq!(s.lookup("g").unwrap(), Value::Int(10));
        s.pop_func_frame();
        assert!(s.lookup("n").is_err());
    }
}
