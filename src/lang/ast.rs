// syn.txt -- a text based synthesizer and audio workstation
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! AST node types. The lexer/parser that produces a tree of these is out of scope for this
//! crate; `Node` only needs to be constructible (by tests, or by deserializing a driver's
//! program file) and walkable by the evaluator.

use serde::{Deserialize, Serialize};

pub type NodeList = Vec<Node>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoolOp {
    And,
    Or,
}

/// One link of a `BoolOp` chain: the operator joining the previous value to `operand`. The
/// first link's `op` is unused (there is nothing to its left).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoolChainLink {
    pub op: BoolOp,
    pub operand: Node,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Literal {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
    None,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Node {
    /// A literal scalar, or a literal list whose elements are themselves evaluated.
    Literal(Literal),
    List(NodeList),

    Range {
        start: Box<Node>,
        end: Box<Node>,
        step: Box<Node>,
    },

    /// `start:end:step`, evaluated to a `Value::Slice`.
    Slice {
        start: Box<Node>,
        end: Box<Node>,
        step: Box<Node>,
    },

    Print(NodeList),

    VariableGet(String),
    VariableAssign {
        name: String,
        expr: Box<Node>,
    },
    VariableReassign {
        name: String,
        expr: Box<Node>,
    },
    /// Reassigns and evaluates to the new value (used by compound-assignment desugaring).
    VariableReassignGet {
        name: String,
        expr: Box<Node>,
    },

    BinaryOp {
        lhs: Box<Node>,
        op: BinOp,
        rhs: Box<Node>,
    },
    Compare {
        lhs: Box<Node>,
        op: CmpOp,
        rhs: Box<Node>,
    },

    Not(Box<Node>),
    BoolChain {
        first: Box<Node>,
        rest: Vec<BoolChainLink>,
    },

    /// `name <op>= expr` desugars at evaluation time to `name = name <op> expr`.
    VariableBinopReassign {
        name: String,
        op: BinOp,
        expr: Box<Node>,
    },
    /// `name++` / `name--`.
    VariableIncrDecr {
        name: String,
        delta: i64,
    },

    ListGet {
        name: String,
        indices: NodeList,
    },
    ListAssign {
        name: String,
        indices: NodeList,
        expr: Box<Node>,
    },

    IfElseBlock {
        if_stmt: Box<Node>,
        else_stmt: Option<Box<Node>>,
    },
    IfStmt {
        cond: Box<Node>,
        body: NodeList,
    },
    ElseStmt {
        body: NodeList,
    },

    ForStmt {
        var: String,
        range: Box<Node>,
        body: NodeList,
    },
    WhileStmt {
        cond: Box<Node>,
        body: NodeList,
    },

    SwitchStmt {
        expr: Box<Node>,
        cases: Vec<CaseArm>,
        default: Option<NodeList>,
    },

    BreakStmt,
    ReturnStmt(Option<Box<Node>>),

    FuncDecl {
        id: String,
        params: Vec<String>,
        body: NodeList,
    },
    FuncCall {
        id: String,
        args: NodeList,
    },
    MathCall {
        action: MathActionNode,
        args: NodeList,
    },
    Builtin {
        name: String,
        args: NodeList,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseArm {
    pub match_expr: Node,
    pub body: NodeList,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MathActionNode {
    TrigInv,
    TrigAngle,
    DefInt,
    IndefInt,
    Deriv,
}
