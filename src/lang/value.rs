// syn.txt -- a text based synthesizer and audio workstation
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! The dynamically-typed value every expression in the language reduces to.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::lang::errors::{EvalError, TypeSnafu, ZeroDivisionSnafu};
use snafu::ensure;

/// A materialized `start:end:step` triple, used both for list/string slicing and for
/// `for`-loop ranges before they are expanded into a `List`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SliceSpec {
    pub start: i64,
    pub end: i64,
    pub step: i64,
}

/// An opaque handle produced by the math backend. Supports substitution and numeric
/// evaluation but is otherwise inert data as far as the evaluator is concerned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Symbolic {
    pub text: String,
}

impl fmt::Display for Symbolic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Value {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
    List(Vec<Value>),
    Slice(SliceSpec),
    Symbolic(Symbolic),
    None,
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::Bool(_) => "bool",
            Value::List(_) => "list",
            Value::Slice(_) => "slice",
            Value::Symbolic(_) => "symbolic",
            Value::None => "none",
        }
    }

    /// Falsy: `0`, `0.0`, `""`, `[]`, `None`, `false`. Everything else is truthy.
    pub fn truthy(&self) -> bool {
        match self {
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::Bool(b) => *b,
            Value::List(l) => !l.is_empty(),
            Value::None => false,
            Value::Slice(_) | Value::Symbolic(_) => true,
        }
    }

    pub fn as_int(&self) -> Result<i64, EvalError> {
        match self {
            Value::Int(i) => Ok(*i),
            Value::Bool(b) => Ok(*b as i64),
            other => TypeSnafu {
                message: format!("expected int, found {}", other.type_name()),
            }
            .fail(),
        }
    }

    pub fn as_f64(&self) -> Result<f64, EvalError> {
        match self {
            Value::Int(i) => Ok(*i as f64),
            Value::Float(f) => Ok(*f),
            Value::Bool(b) => Ok(*b as i64 as f64),
            other => TypeSnafu {
                message: format!("expected a number, found {}", other.type_name()),
            }
            .fail(),
        }
    }

    pub fn as_list(&self) -> Result<&[Value], EvalError> {
        match self {
            Value::List(items) => Ok(items),
            other => TypeSnafu {
                message: format!("expected list, found {}", other.type_name()),
            }
            .fail(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Str(s) => write!(f, "{}", s),
            Value::Bool(b) => write!(f, "{}", if *b { "true" } else { "false" }),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Slice(s) => write!(f, "{}:{}:{}", s.start, s.end, s.step),
            Value::Symbolic(sym) => write!(f, "{}", sym),
            Value::None => write!(f, "none"),
        }
    }
}

/// Python-style default equality: cross-type comparisons never raise, just compare unequal.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => *a as f64 == *b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::None, Value::None) => true,
            (Value::Slice(a), Value::Slice(b)) => a == b,
            _ => false,
        }
    }
}

fn numeric_binop(
    lhs: &Value,
    rhs: &Value,
    int_op: impl Fn(i64, i64) -> Option<i64>,
    float_op: impl Fn(f64, f64) -> f64,
) -> Result<Value, EvalError> {
    match (lhs, rhs) {
        (Value::Int(a), Value::Int(b)) => match int_op(*a, *b) {
            Some(v) => Ok(Value::Int(v)),
            None => Ok(Value::Float(float_op(*a as f64, *b as f64))),
        },
        _ => {
            let a = lhs.as_f64()?;
            let b = rhs.as_f64()?;
            Ok(Value::Float(float_op(a, b)))
        }
    }
}

impl Value {
    pub fn add(&self, other: &Value) -> Result<Value, EvalError> {
        match (self, other) {
            (Value::Str(a), Value::Str(b)) => Ok(Value::Str(format!("{}{}", a, b))),
            (Value::List(a), Value::List(b)) => {
                let mut out = a.clone();
                out.extend(b.iter().cloned());
                Ok(Value::List(out))
            }
            _ => numeric_binop(self, other, |a, b| a.checked_add(b), |a, b| a + b),
        }
    }

    pub fn sub(&self, other: &Value) -> Result<Value, EvalError> {
        numeric_binop(self, other, |a, b| a.checked_sub(b), |a, b| a - b)
    }

    pub fn mul(&self, other: &Value) -> Result<Value, EvalError> {
        match (self, other) {
            (Value::Str(s), Value::Int(n)) | (Value::Int(n), Value::Str(s)) => {
                Ok(Value::Str(s.repeat((*n).max(0) as usize)))
            }
            (Value::List(items), Value::Int(n)) | (Value::Int(n), Value::List(items)) => {
                let mut out = Vec::with_capacity(items.len() * (*n).max(0) as usize);
                for _ in 0..(*n).max(0) {
                    out.extend(items.iter().cloned());
                }
                Ok(Value::List(out))
            }
            _ => numeric_binop(self, other, |a, b| a.checked_mul(b), |a, b| a * b),
        }
    }

    /// `/` always promotes to `Float`, matching the language's true-division semantics.
    pub fn div(&self, other: &Value) -> Result<Value, EvalError> {
        let b = other.as_f64()?;
        ensure!(b != 0.0, ZeroDivisionSnafu);
        let a = self.as_f64()?;
        Ok(Value::Float(a / b))
    }

    /// Floored modulo: the result takes the sign of the divisor, e.g. `7 % -3 == -2`. `rem_euclid`
    /// would give `1` here, which is Euclidean, not floored, and diverges whenever the divisor is
    /// negative.
    pub fn rem(&self, other: &Value) -> Result<Value, EvalError> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => {
                ensure!(*b != 0, ZeroDivisionSnafu);
                let r = a % b;
                let r = if r != 0 && (r < 0) != (*b < 0) { r + b } else { r };
                Ok(Value::Int(r))
            }
            _ => {
                let a = self.as_f64()?;
                let b = other.as_f64()?;
                ensure!(b != 0.0, ZeroDivisionSnafu);
                let r = a % b;
                let r = if r != 0.0 && (r < 0.0) != (b < 0.0) { r + b } else { r };
                Ok(Value::Float(r))
            }
        }
    }

    /// `^` stays `Int` for `Int ^ Int` with a non-negative exponent, else promotes to `Float`.
    pub fn pow(&self, other: &Value) -> Result<Value, EvalError> {
        if let (Value::Int(a), Value::Int(b)) = (self, other) {
            if *b >= 0 {
                if let Ok(exp) = u32::try_from(*b) {
                    return Ok(Value::Int(a.pow(exp)));
                }
            }
        }
        let a = self.as_f64()?;
        let b = other.as_f64()?;
        Ok(Value::Float(a.powf(b)))
    }

    pub fn ordered_cmp(&self, other: &Value) -> Result<std::cmp::Ordering, EvalError> {
        match (self, other) {
            (Value::Str(a), Value::Str(b)) => Ok(a.cmp(b)),
            (Value::Int(_) | Value::Float(_) | Value::Bool(_), Value::Int(_) | Value::Float(_) | Value::Bool(_)) => {
                let a = self.as_f64()?;
                let b = other.as_f64()?;
                a.partial_cmp(&b).ok_or_else(|| {
                    TypeSnafu {
                        message: "cannot order NaN".to_string(),
                    }
                    .build()
                })
            }
            _ => TypeSnafu {
                message: format!(
                    "unorderable types: {} and {}",
                    self.type_name(),
                    other.type_name()
                ),
            }
            .fail(),
        }
    }
}
