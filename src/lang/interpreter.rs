// syn.txt -- a text based synthesizer and audio workstation
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! The evaluator: expression evaluation (C3), statement execution (C4), and the function
//! subsystem (C5), built on top of `ScopeStack` (C2).

use log::{debug, warn};

use crate::lang::ast::{
    BinOp, BoolOp, CaseArm, CmpOp, Literal, MathActionNode, Node, NodeList,
};
use crate::lang::builtins;
use crate::lang::control::ControlFlow;
use crate::lang::errors::{EvalError, IndexSnafu, NotDefinedSnafu, SyntaxSnafu, TypeSnafu};
use crate::lang::math::{function_to_value, MathAction, MathBackend, StdMathBackend};
use crate::lang::scope::ScopeStack;
use crate::lang::value::{SliceSpec, Value};

/// Owns the whole of the evaluator's mutable state: the symbol table/scope stack and the
/// math backend. Constructing a fresh `Interpreter` per program run keeps state from leaking
/// between independent evaluations (no process-wide globals).
pub struct Interpreter<M: MathBackend = StdMathBackend> {
    scopes: ScopeStack,
    math: M,
    /// `Value` has no variant for a callable AST, so function definitions live in their own
    /// table keyed by declared id rather than in the global value map the reference stores
    /// them in under a mangled name; the mangled `func_<id>_<K>` naming scheme survives as the
    /// keys of `active_call_depth` below, which tracks how many recursive calls of a given
    /// function are currently live.
    func_bodies: std::collections::HashMap<String, FuncDef>,
    active_call_depth: std::collections::HashMap<String, u32>,
    /// Frame-stack index of each currently-live function's `_0` call, used to seed recursive
    /// calls' `params` from exactly that frame (see `call_func`).
    base_frame_index: std::collections::HashMap<String, usize>,
}

impl Default for Interpreter<StdMathBackend> {
    fn default() -> Self {
        Interpreter {
            scopes: ScopeStack::new(),
            math: StdMathBackend,
            func_bodies: Default::default(),
            active_call_depth: Default::default(),
            base_frame_index: Default::default(),
        }
    }
}

impl<M: MathBackend> Interpreter<M> {
    pub fn with_backend(math: M) -> Self {
        Interpreter {
            scopes: ScopeStack::new(),
            math,
            func_bodies: Default::default(),
            active_call_depth: Default::default(),
            base_frame_index: Default::default(),
        }
    }

    /// Runs a top-level program to completion. A `ReturnStmt`/`BreakStmt` reaching here (outside
    /// any function/switch) is a logic error in the supplied AST, not a recoverable condition;
    /// it is logged and treated as falling off the end of the program.
    pub fn run(&mut self, program: &NodeList) -> Result<(), EvalError> {
        match self.exec_block(program)? {
            ControlFlow::Normal(_) => Ok(()),
            ControlFlow::Returned(_) => {
                warn!("top-level return outside any function call; ignoring");
                Ok(())
            }
            ControlFlow::Broken => {
                warn!("top-level break outside any switch; ignoring");
                Ok(())
            }
        }
    }

    fn exec_block(&mut self, stmts: &NodeList) -> Result<ControlFlow, EvalError> {
        for stmt in stmts {
            let flow = self.exec_stmt(stmt)?;
            if !matches!(flow, ControlFlow::Normal(_)) {
                return Ok(flow);
            }
        }
        Ok(ControlFlow::Normal(Value::None))
    }

    /// Runs `body` inside a freshly pushed block scope of the given `kind`, always popping the
    /// scope before returning -- even when `body` produced an error or a short-circuiting
    /// `ControlFlow`.
    fn exec_scoped_block(&mut self, kind: &str, body: &NodeList) -> Result<ControlFlow, EvalError> {
        let scope = self.scopes.push_block_scope(kind);
        let result = self.exec_block(body);
        self.scopes.pop_block_scope(&scope);
        result
    }

    // ---- statement execution (C4) ----

    fn exec_stmt(&mut self, node: &Node) -> Result<ControlFlow, EvalError> {
        match node {
            Node::Print(args) => {
                let values: Result<Vec<Value>, EvalError> =
                    args.iter().map(|a| self.eval_expr(a)).collect();
                let values = values?;
                let rendered: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                println!("{}", rendered.join(" "));
                Ok(ControlFlow::Normal(Value::None))
            }

            Node::IfElseBlock { if_stmt, else_stmt } => {
                let (flow, taken) = self.exec_if(if_stmt)?;
                if taken {
                    return Ok(flow);
                }
                match else_stmt {
                    Some(else_node) => self.exec_else(else_node),
                    None => Ok(ControlFlow::Normal(Value::None)),
                }
            }
            Node::IfStmt { .. } => Ok(self.exec_if(node)?.0),
            Node::ElseStmt { .. } => self.exec_else(node),

            Node::ForStmt { var, range, body } => self.exec_for(var, range, body),
            Node::WhileStmt { cond, body } => self.exec_while(cond, body),

            Node::SwitchStmt { expr, cases, default } => self.exec_switch(expr, cases, default),

            Node::BreakStmt => Ok(ControlFlow::Broken),
            Node::ReturnStmt(expr) => {
                let value = match expr {
                    Some(e) => self.eval_expr(e)?,
                    None => Value::None,
                };
                Ok(ControlFlow::Returned(value))
            }

            Node::FuncDecl { id, params, body } => {
                self.declare_func(id, params, body)?;
                Ok(ControlFlow::Normal(Value::None))
            }

            // Any expression node used in statement position: evaluate for side effects,
            // surface the value as a `Normal` result.
            other => Ok(ControlFlow::Normal(self.eval_expr(other)?)),
        }
    }

    /// Returns `(flow, taken)` where `taken` says whether the condition was true (and thus the
    /// body ran). `IfStmt` and `ElseStmt` agree on exactly the same `ControlFlow` protocol; only
    /// this wrapper needs the extra `taken` bit to decide whether to run the paired `ElseStmt`.
    fn exec_if(&mut self, node: &Node) -> Result<(ControlFlow, bool), EvalError> {
        let (cond, body) = match node {
            Node::IfStmt { cond, body } => (cond, body),
            _ => unreachable!("exec_if called on non-IfStmt node"),
        };
        if self.eval_expr(cond)?.truthy() {
            Ok((self.exec_scoped_block("if", body)?, true))
        } else {
            Ok((ControlFlow::Normal(Value::None), false))
        }
    }

    fn exec_else(&mut self, node: &Node) -> Result<ControlFlow, EvalError> {
        let body = match node {
            Node::ElseStmt { body } => body,
            _ => unreachable!("exec_else called on non-ElseStmt node"),
        };
        self.exec_scoped_block("else", body)
    }

    fn exec_for(&mut self, var: &str, range: &Node, body: &NodeList) -> Result<ControlFlow, EvalError> {
        let items = self.eval_expr(range)?;
        let items = items.as_list()?.to_vec();
        let scope = self.scopes.push_block_scope("for_loop");
        let mut outcome = ControlFlow::Normal(Value::None);
        for item in items {
            self.scopes.rebind_in_current_scope(var, item);
            match self.exec_block(body) {
                Ok(ControlFlow::Normal(_)) => continue,
                Ok(ControlFlow::Broken) => break,
                Ok(returned) => {
                    outcome = returned;
                    break;
                }
                Err(e) => {
                    self.scopes.pop_block_scope(&scope);
                    return Err(e);
                }
            }
        }
        self.scopes.pop_block_scope(&scope);
        Ok(outcome)
    }

    fn exec_while(&mut self, cond: &Node, body: &NodeList) -> Result<ControlFlow, EvalError> {
        loop {
            if !self.eval_expr(cond)?.truthy() {
                return Ok(ControlFlow::Normal(Value::None));
            }
            let flow = self.exec_scoped_block("while_loop", body)?;
            match flow {
                ControlFlow::Normal(_) => continue,
                ControlFlow::Broken => return Ok(ControlFlow::Normal(Value::None)),
                returned => return Ok(returned),
            }
        }
    }

    fn exec_switch(
        &mut self,
        expr: &Node,
        cases: &[CaseArm],
        default: &Option<NodeList>,
    ) -> Result<ControlFlow, EvalError> {
        let value = self.eval_expr(expr)?;
        let scope = self.scopes.push_block_scope("switch");
        let result = (|| {
            for case in cases {
                let label = self.eval_expr(&case.match_expr)?;
                if label == value {
                    return self.exec_case_body("case", &case.body);
                }
            }
            if let Some(default_body) = default {
                return self.exec_case_body("default", default_body);
            }
            Ok(ControlFlow::Normal(Value::None))
        })();
        self.scopes.pop_block_scope(&scope);
        result
    }

    /// Runs a matched case/default body in its own nested scope. Stops as soon as a `BreakStmt`
    /// fires (translating `Broken` into ordinary completion of the switch); a body that runs to
    /// the end without ever breaking is a syntax error.
    fn exec_case_body(&mut self, kind: &str, body: &NodeList) -> Result<ControlFlow, EvalError> {
        let scope = self.scopes.push_block_scope(kind);
        let result = (|| {
            for stmt in body {
                match self.exec_stmt(stmt)? {
                    ControlFlow::Normal(_) => continue,
                    ControlFlow::Broken => return Ok(ControlFlow::Normal(Value::None)),
                    returned => return Ok(returned),
                }
            }
            SyntaxSnafu {
                message: "case/default body must end with break".to_string(),
            }
            .fail()
        })();
        self.scopes.pop_block_scope(&scope);
        result
    }

    // ---- expression evaluation (C3) ----

    fn eval_expr(&mut self, node: &Node) -> Result<Value, EvalError> {
        match node {
            Node::Literal(lit) => Ok(literal_value(lit)),
            Node::List(items) => {
                let values: Result<Vec<Value>, EvalError> =
                    items.iter().map(|n| self.eval_expr(n)).collect();
                Ok(Value::List(values?))
            }

            Node::Range { start, end, step } => self.eval_range(start, end, step),
            Node::Slice { start, end, step } => {
                let start = self.eval_expr(start)?.as_int()?;
                let end = self.eval_expr(end)?.as_int()?;
                let step = self.eval_expr(step)?.as_int()?;
                Ok(Value::Slice(SliceSpec { start, end, step }))
            }

            Node::VariableGet(name) => self.scopes.lookup(name),
            Node::VariableAssign { name, expr } => {
                let value = self.eval_expr(expr)?;
                self.scopes.define(name, value.clone())?;
                Ok(value)
            }
            Node::VariableReassign { name, expr } => {
                let value = self.eval_expr(expr)?;
                self.scopes.assign(name, value)?;
                Ok(Value::None)
            }
            Node::VariableReassignGet { name, expr } => {
                let value = self.eval_expr(expr)?;
                self.scopes.assign(name, value.clone())?;
                Ok(value)
            }

            Node::BinaryOp { lhs, op, rhs } => {
                let lhs = self.eval_expr(lhs)?;
                let rhs = self.eval_expr(rhs)?;
                apply_binop(&lhs, *op, &rhs)
            }
            Node::Compare { lhs, op, rhs } => {
                let lhs = self.eval_expr(lhs)?;
                let rhs = self.eval_expr(rhs)?;
                apply_cmp(&lhs, *op, &rhs)
            }

            Node::Not(operand) => Ok(Value::Bool(!self.eval_expr(operand)?.truthy())),
            Node::BoolChain { first, rest } => self.eval_bool_chain(first, rest),

            Node::VariableBinopReassign { name, op, expr } => {
                let current = self.scopes.lookup(name)?;
                let rhs = self.eval_expr(expr)?;
                let updated = apply_binop(&current, *op, &rhs)?;
                self.scopes.assign(name, updated.clone())?;
                Ok(updated)
            }
            Node::VariableIncrDecr { name, delta } => {
                let current = self.scopes.lookup(name)?;
                let updated = current.add(&Value::Int(*delta))?;
                self.scopes.assign(name, updated.clone())?;
                Ok(updated)
            }

            Node::ListGet { name, indices } => {
                let base = self.scopes.lookup(name)?;
                self.list_get(base, indices)
            }
            Node::ListAssign { name, indices, expr } => {
                let value = self.eval_expr(expr)?;
                let mut base = self.scopes.lookup(name)?;
                self.list_assign(&mut base, indices, value.clone())?;
                self.scopes.assign(name, base)?;
                Ok(value)
            }

            Node::FuncCall { id, args } => self.call_func(id, args),
            Node::MathCall { action, args } => self.call_math(*action, args),
            Node::Builtin { name, args } => {
                let values: Result<Vec<Value>, EvalError> =
                    args.iter().map(|a| self.eval_expr(a)).collect();
                builtins::dispatch(name, &values?)
            }

            // Statement-shaped nodes occasionally visited as expressions (e.g. a bare
            // `ReturnStmt`/control node never reaches here in a well-formed program); anything
            // left over is a logic error in the supplied AST.
            other => TypeSnafu {
                message: format!("{:?} cannot be evaluated as an expression", other),
            }
            .fail(),
        }
    }

    fn eval_range(&mut self, start: &Node, end: &Node, step: &Node) -> Result<Value, EvalError> {
        let start = self.eval_expr(start)?.as_int()?;
        let end = self.eval_expr(end)?.as_int()?;
        let step = self.eval_expr(step)?.as_int()?;
        ensure_nonzero_step(step)?;
        Ok(Value::List(materialize_range(start, end, step)))
    }

    fn eval_bool_chain(
        &mut self,
        first: &Node,
        rest: &[crate::lang::ast::BoolChainLink],
    ) -> Result<Value, EvalError> {
        let mut acc = self.eval_expr(first)?.truthy();
        for link in rest {
            match link.op {
                BoolOp::And => {
                    if !acc {
                        continue; // short-circuit: operand never evaluated
                    }
                    acc = self.eval_expr(&link.operand)?.truthy();
                }
                BoolOp::Or => {
                    if acc {
                        continue;
                    }
                    acc = self.eval_expr(&link.operand)?.truthy();
                }
            }
        }
        Ok(Value::Bool(acc))
    }

    fn list_get(&mut self, base: Value, indices: &NodeList) -> Result<Value, EvalError> {
        let mut current = base;
        for index_node in indices {
            let idx = self.eval_expr(index_node)?;
            current = index_into(&current, &idx)?;
        }
        Ok(current)
    }

    fn list_assign(&mut self, base: &mut Value, indices: &NodeList, value: Value) -> Result<(), EvalError> {
        let (last, init) = indices.split_last().expect("list assignment needs at least one index");
        let mut target = base;
        for index_node in init {
            let idx = self.eval_expr(index_node)?.as_int()?;
            target = match target {
                Value::List(items) => {
                    let len = items.len() as i64;
                    let pos = normalize_index(idx, len)?;
                    &mut items[pos]
                }
                other => {
                    return TypeSnafu {
                        message: format!("cannot index into {}", other.type_name()),
                    }
                    .fail()
                }
            };
        }
        let idx = self.eval_expr(last)?.as_int()?;
        match target {
            Value::List(items) => {
                let len = items.len() as i64;
                let pos = normalize_index(idx, len)?;
                items[pos] = value;
                Ok(())
            }
            other => TypeSnafu {
                message: format!("cannot index into {}", other.type_name()),
            }
            .fail(),
        }
    }

    // ---- function subsystem (C5) ----

    fn declare_func(&mut self, id: &str, params: &[String], body: &NodeList) -> Result<(), EvalError> {
        // Validate parameter declarations the same way any other declaration would be
        // validated: a function's own frame must not already expose a name that collides with
        // one of its parameters.
        self.scopes.push_func_frame();
        let declare_result = (|| {
            for param in params {
                self.scopes.define(param, Value::Int(0))?;
            }
            Ok(())
        })();
        self.scopes.pop_func_frame();
        declare_result?;
        self.func_bodies.insert(
            id.to_string(),
            FuncDef {
                params: params.to_vec(),
                body: body.clone(),
            },
        );
        debug!("declared function '{}' with {} parameter(s)", id, params.len());
        Ok(())
    }

    fn call_func(&mut self, id: &str, args: &NodeList) -> Result<Value, EvalError> {
        let def = self
            .func_bodies
            .get(id)
            .cloned()
            .ok_or_else(|| NotDefinedSnafu { name: id.to_string() }.build())?;

        if def.params.len() != args.len() {
            return TypeSnafu {
                message: format!(
                    "{}() takes {} argument(s) but {} were given",
                    id,
                    def.params.len(),
                    args.len()
                ),
            }
            .fail();
        }

        // Argument expressions are evaluated in the caller's own scope, before the callee's
        // frame is pushed -- see the note on argument-evaluation ordering.
        let arg_values: Result<Vec<Value>, EvalError> =
            args.iter().map(|a| self.eval_expr(a)).collect();
        let arg_values = arg_values?;

        // Recursive calls seed their fresh `params` map from frame `_0`'s *current* bindings --
        // not from whatever frame happens to be innermost at call time, which for a deeply
        // recursive call would be some other, already-shadowing `_K` frame. `base_frame_index`
        // remembers where `_0` lives on the frame stack for the duration of the outermost call.
        let recursive = self.active_call_depth.contains_key(id);
        let seed = if recursive {
            let base_index = self.base_frame_index[id];
            self.scopes.params_at(base_index).cloned()
        } else {
            None
        };
        *self.active_call_depth.entry(id.to_string()).or_insert(0) += 1;

        let new_frame_index = self.scopes.next_frame_index();
        self.scopes.push_func_frame();
        if !recursive {
            self.base_frame_index.insert(id.to_string(), new_frame_index);
        }
        if let Some(seed) = seed {
            *self.scopes.current_params_mut().unwrap() = seed;
        }
        for (param, value) in def.params.iter().zip(arg_values) {
            self.scopes.current_params_mut().unwrap().insert(param.clone(), value);
        }

        self.scopes.push_local_scope();
        let result = self.exec_block(&def.body);
        self.scopes.pop_local_scope();
        self.scopes.pop_func_frame();

        let depth = self.active_call_depth.get_mut(id).unwrap();
        *depth -= 1;
        if *depth == 0 {
            self.active_call_depth.remove(id);
            self.base_frame_index.remove(id);
        }

        match result? {
            ControlFlow::Returned(value) => Ok(value),
            ControlFlow::Normal(_) => Ok(Value::None),
            ControlFlow::Broken => {
                warn!("break escaped function '{}' body outside any switch; ignoring", id);
                Ok(Value::None)
            }
        }
    }

    fn call_math(&mut self, action: MathActionNode, args: &NodeList) -> Result<Value, EvalError> {
        let values: Result<Vec<Value>, EvalError> = args.iter().map(|a| self.eval_expr(a)).collect();
        let values = values?;
        let backend_action = match action {
            MathActionNode::TrigInv => MathAction::TrigInv,
            MathActionNode::TrigAngle => MathAction::TrigAngle,
            MathActionNode::DefInt => MathAction::DefInt,
            MathActionNode::IndefInt => MathAction::IndefInt,
            MathActionNode::Deriv => MathAction::Deriv,
        };

        // For integral/deriv calls made from inside a function body where the last argument is
        // the differentiation variable's *name* and it matches a current parameter, substitute
        // that parameter's value and evaluate numerically instead of returning a symbolic form.
        let mut values = values;
        if matches!(backend_action, MathAction::DefInt | MathAction::IndefInt | MathAction::Deriv) {
            if values.len() == 3 {
                if let Value::Str(var_name) = &values[1] {
                    if let Some(params) = self.scopes.current_params() {
                        if let Some(Value::Int(n)) = params.get(var_name) {
                            values.push(Value::Float(*n as f64));
                        } else if let Some(Value::Float(f)) = params.get(var_name) {
                            values.push(Value::Float(*f));
                        }
                    }
                }
            }
        }

        let result = self.math.exec(backend_action, &values)?;
        let append_plus_c = matches!(backend_action, MathAction::IndefInt) && values.len() < 4;
        Ok(function_to_value(result, append_plus_c))
    }
}

#[derive(Debug, Clone)]
struct FuncDef {
    params: Vec<String>,
    body: NodeList,
}

fn literal_value(lit: &Literal) -> Value {
    match lit {
        Literal::Int(i) => Value::Int(*i),
        Literal::Float(f) => Value::Float(*f),
        Literal::Str(s) => Value::Str(s.clone()),
        Literal::Bool(b) => Value::Bool(*b),
        Literal::None => Value::None,
    }
}

fn apply_binop(lhs: &Value, op: BinOp, rhs: &Value) -> Result<Value, EvalError> {
    match op {
        BinOp::Add => lhs.add(rhs),
        BinOp::Sub => lhs.sub(rhs),
        BinOp::Mul => lhs.mul(rhs),
        BinOp::Div => lhs.div(rhs),
        BinOp::Mod => lhs.rem(rhs),
        BinOp::Pow => lhs.pow(rhs),
    }
}

fn apply_cmp(lhs: &Value, op: CmpOp, rhs: &Value) -> Result<Value, EvalError> {
    match op {
        CmpOp::Eq => Ok(Value::Bool(lhs == rhs)),
        CmpOp::Ne => Ok(Value::Bool(lhs != rhs)),
        CmpOp::Lt => Ok(Value::Bool(lhs.ordered_cmp(rhs)? == std::cmp::Ordering::Less)),
        CmpOp::Le => Ok(Value::Bool(lhs.ordered_cmp(rhs)? != std::cmp::Ordering::Greater)),
        CmpOp::Gt => Ok(Value::Bool(lhs.ordered_cmp(rhs)? == std::cmp::Ordering::Greater)),
        CmpOp::Ge => Ok(Value::Bool(lhs.ordered_cmp(rhs)? != std::cmp::Ordering::Less)),
    }
}

fn ensure_nonzero_step(step: i64) -> Result<(), EvalError> {
    if step == 0 {
        IndexSnafu {
            message: "range/slice step must not be zero".to_string(),
        }
        .fail()
    } else {
        Ok(())
    }
}

fn materialize_range(start: i64, end: i64, step: i64) -> Vec<Value> {
    let mut out = Vec::new();
    let mut i = start;
    if step > 0 {
        while i < end {
            out.push(Value::Int(i));
            i += step;
        }
    } else {
        while i > end {
            out.push(Value::Int(i));
            i += step;
        }
    }
    out
}

fn normalize_index(idx: i64, len: i64) -> Result<usize, EvalError> {
    let pos = if idx < 0 { idx + len } else { idx };
    if pos < 0 || pos >= len {
        IndexSnafu {
            message: format!("index {} out of range for length {}", idx, len),
        }
        .fail()
    } else {
        Ok(pos as usize)
    }
}

fn index_into(value: &Value, idx: &Value) -> Result<Value, EvalError> {
    match (value, idx) {
        (Value::List(items), Value::Slice(s)) => {
            ensure_nonzero_step(s.step)?;
            validate_slice_bounds(items.len() as i64, s)?;
            Ok(Value::List(slice_items(items, s)))
        }
        (Value::Str(s), Value::Slice(spec)) => {
            ensure_nonzero_step(spec.step)?;
            let chars: Vec<char> = s.chars().collect();
            validate_slice_bounds(chars.len() as i64, spec)?;
            let values: Vec<Value> = slice_indices(chars.len() as i64, spec)
                .into_iter()
                .map(|i| Value::Str(chars[i as usize].to_string()))
                .collect();
            Ok(Value::Str(values.into_iter().map(|v| v.to_string()).collect()))
        }
        (Value::List(items), idx) => {
            let i = idx.as_int()?;
            let pos = normalize_index(i, items.len() as i64)?;
            Ok(items[pos].clone())
        }
        (Value::Str(s), idx) => {
            let i = idx.as_int()?;
            let chars: Vec<char> = s.chars().collect();
            let pos = normalize_index(i, chars.len() as i64)?;
            Ok(Value::Str(chars[pos].to_string()))
        }
        (other, _) => TypeSnafu {
            message: format!("cannot index into {}", other.type_name()),
        }
        .fail(),
    }
}

/// Rejects a slice whose `start`/`end` fall outside `[0, len]`, the same bound `normalize_index`
/// enforces for a single index.
fn validate_slice_bounds(len: i64, spec: &SliceSpec) -> Result<(), EvalError> {
    if spec.start < 0 || spec.start > len || spec.end < 0 || spec.end > len {
        IndexSnafu {
            message: format!(
                "slice {}:{}:{} out of range for length {}",
                spec.start, spec.end, spec.step, len
            ),
        }
        .fail()
    } else {
        Ok(())
    }
}

fn slice_indices(len: i64, spec: &SliceSpec) -> Vec<i64> {
    let mut out = Vec::new();
    let mut i = spec.start;
    if spec.step > 0 {
        while i < spec.end && i < len {
            out.push(i);
            i += spec.step;
        }
    } else {
        while i > spec.end && i >= 0 {
            out.push(i);
            i += spec.step;
        }
    }
    out
}

fn slice_items(items: &[Value], spec: &SliceSpec) -> Vec<Value> {
    slice_indices(items.len() as i64, spec)
        .into_iter()
        .map(|i| items[i as usize].clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::ast::BoolChainLink;

    fn lit_int(i: i64) -> Node {
        Node::Literal(Literal::Int(i))
    }

    #[test]
    fn assignment_and_lookup() {
        let mut interp = Interpreter::default();
        interp
            .run(&vec![Node::VariableAssign {
                name: "x".to_string(),
                expr: Box::new(lit_int(5)),
            }])
            .unwrap();
        assert_eq!(interp.scopes.lookup("x").unwrap(), Value::Int(5));
    }

    #[test]
    fn for_range_sum() {
        let mut interp = Interpreter::default();
        let program = vec![
            Node::VariableAssign {
                name: "s".to_string(),
                expr: Box::new(lit_int(0)),
            },
            Node::ForStmt {
                var: "i".to_string(),
                range: Box::new(Node::Range {
                    start: Box::new(lit_int(1)),
                    end: Box::new(lit_int(5)),
                    step: Box::new(lit_int(1)),
                }),
                body: vec![Node::VariableBinopReassign {
                    name: "s".to_string(),
                    op: BinOp::Add,
                    expr: Box::new(Node::VariableGet("i".to_string())),
                }],
            },
        ];
        interp.run(&program).unwrap();
        assert_eq!(interp.scopes.lookup("s").unwrap(), Value::Int(10));
    }

    #[test]
    fn recursive_factorial() {
        let mut interp = Interpreter::default();
        let program = vec![
            Node::FuncDecl {
                id: "fact".to_string(),
                params: vec!["n".to_string()],
                body: vec![
                    Node::IfElseBlock {
                        if_stmt: Box::new(Node::IfStmt {
                            cond: Box::new(Node::Compare {
                                lhs: Box::new(Node::VariableGet("n".to_string())),
                                op: CmpOp::Le,
                                rhs: Box::new(lit_int(1)),
                            }),
                            body: vec![Node::ReturnStmt(Some(Box::new(lit_int(1))))],
                        }),
                        else_stmt: None,
                    },
                    Node::ReturnStmt(Some(Box::new(Node::BinaryOp {
                        lhs: Box::new(Node::VariableGet("n".to_string())),
                        op: BinOp::Mul,
                        rhs: Box::new(Node::FuncCall {
                            id: "fact".to_string(),
                            args: vec![Node::BinaryOp {
                                lhs: Box::new(Node::VariableGet("n".to_string())),
                                op: BinOp::Sub,
                                rhs: Box::new(lit_int(1)),
                            }],
                        }),
                    }))),
                ],
            },
            Node::VariableAssign {
                name: "result".to_string(),
                expr: Box::new(Node::FuncCall {
                    id: "fact".to_string(),
                    args: vec![lit_int(5)],
                }),
            },
        ];
        interp.run(&program).unwrap();
        assert_eq!(interp.scopes.lookup("result").unwrap(), Value::Int(120));
    }

    #[test]
    fn nested_scope_redeclaration() {
        let mut interp = Interpreter::default();
        // y declared inside an if, then redeclared at top level after the if completes: ok.
        let program = vec![
            Node::IfElseBlock {
                if_stmt: Box::new(Node::IfStmt {
                    cond: Box::new(Node::Literal(Literal::Bool(true))),
                    body: vec![Node::VariableAssign {
                        name: "y".to_string(),
                        expr: Box::new(lit_int(1)),
                    }],
                }),
                else_stmt: None,
            },
            Node::VariableAssign {
                name: "y".to_string(),
                expr: Box::new(lit_int(2)),
            },
        ];
        interp.run(&program).unwrap();
        assert_eq!(interp.scopes.lookup("y").unwrap(), Value::Int(2));
    }

    #[test]
    fn redeclaration_while_visible_is_name_error() {
        let mut interp = Interpreter::default();
        interp
            .run(&vec![Node::VariableAssign {
                name: "y".to_string(),
                expr: Box::new(lit_int(1)),
            }])
            .unwrap();
        let err = interp
            .scopes
            .define("y", Value::Int(2))
            .expect_err("redeclaring a visible name must fail");
        assert!(matches!(err, EvalError::AlreadyExists { .. }));
    }

    #[test]
    fn list_slicing() {
        let mut interp = Interpreter::default();
        let program = vec![Node::VariableAssign {
            name: "a".to_string(),
            expr: Box::new(Node::List(vec![
                lit_int(10),
                lit_int(20),
                lit_int(30),
                lit_int(40),
                lit_int(50),
            ])),
        }];
        interp.run(&program).unwrap();
        let sliced = interp
            .eval_expr(&Node::ListGet {
                name: "a".to_string(),
                indices: vec![Node::Slice {
                    start: Box::new(lit_int(1)),
                    end: Box::new(lit_int(4)),
                    step: Box::new(lit_int(1)),
                }],
            })
            .unwrap();
        assert_eq!(
            sliced,
            Value::List(vec![Value::Int(20), Value::Int(30), Value::Int(40)])
        );
    }

    #[test]
    fn switch_dispatches_to_matching_case() {
        let mut interp = Interpreter::default();
        let switch = Node::SwitchStmt {
            expr: Box::new(lit_int(2)),
            cases: vec![
                CaseArm {
                    match_expr: lit_int(1),
                    body: vec![
                        Node::Print(vec![Node::Literal(Literal::Str("a".to_string()))]),
                        Node::BreakStmt,
                    ],
                },
                CaseArm {
                    match_expr: lit_int(2),
                    body: vec![
                        Node::VariableAssign {
                            name: "hit".to_string(),
                            expr: Box::new(Node::Literal(Literal::Str("b".to_string()))),
                        },
                        Node::BreakStmt,
                    ],
                },
            ],
            default: Some(vec![Node::BreakStmt]),
        };
        interp.run(&vec![switch]).unwrap();
        assert_eq!(
            interp.scopes.lookup("hit").unwrap(),
            Value::Str("b".to_string())
        );
    }

    #[test]
    fn case_without_break_is_syntax_error() {
        let mut interp = Interpreter::default();
        let switch = Node::SwitchStmt {
            expr: Box::new(lit_int(1)),
            cases: vec![CaseArm {
                match_expr: lit_int(1),
                body: vec![Node::Print(vec![])],
            }],
            default: None,
        };
        let err = interp.run(&vec![switch]).unwrap_err();
        assert!(matches!(err, EvalError::Syntax { .. }));
    }

    #[test]
    fn bool_chain_short_circuits() {
        let mut interp = Interpreter::default();
        let expr = Node::BoolChain {
            first: Box::new(Node::Literal(Literal::Bool(false))),
            rest: vec![BoolChainLink {
                op: BoolOp::And,
                // if short-circuiting worked this would never be evaluated; a lookup of an
                // undefined name would otherwise surface as a NotDefined error.
                operand: Node::VariableGet("undefined".to_string()),
            }],
        };
        assert_eq!(interp.eval_expr(&expr).unwrap(), Value::Bool(false));
    }

    #[test]
    fn division_always_promotes_to_float() {
        let mut interp = Interpreter::default();
        let expr = Node::BinaryOp {
            lhs: Box::new(lit_int(4)),
            op: BinOp::Div,
            rhs: Box::new(lit_int(2)),
        };
        assert_eq!(interp.eval_expr(&expr).unwrap(), Value::Float(2.0));
    }

    #[test]
    fn division_by_zero_is_zero_division_error() {
        let mut interp = Interpreter::default();
        let expr = Node::BinaryOp {
            lhs: Box::new(lit_int(4)),
            op: BinOp::Div,
            rhs: Box::new(lit_int(0)),
        };
        assert!(matches!(
            interp.eval_expr(&expr),
            Err(EvalError::ZeroDivision)
        ));
    }
}
