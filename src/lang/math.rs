// syn.txt -- a text based synthesizer and audio workstation
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! The boundary to the external symbolic-math collaborator (trig, derivatives, integrals).
//!
//! `MathBackend` is the trait the evaluator calls through; `StdMathBackend` is this crate's own
//! modest stand-in (`std::f64` trig, single-variable monomial calculus via the power rule) for
//! the real computer-algebra system this interface is meant to delegate to.

use crate::lang::errors::{EvalError, TypeSnafu};
use crate::lang::value::{Symbolic, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathAction {
    TrigInv,
    TrigAngle,
    DefInt,
    IndefInt,
    Deriv,
}

/// A symbolic expression in one variable: `coefficient * var^power`. Enough to demonstrate
/// `deriv`/`indef_int`/`def_int` dispatch end to end without a real CAS.
#[derive(Debug, Clone, PartialEq)]
pub struct Monomial {
    pub coefficient: f64,
    pub var: String,
    pub power: i32,
}

impl Monomial {
    pub fn subs(&self, var: &str, value: f64) -> f64 {
        if self.var == var {
            self.coefficient * value.powi(self.power)
        } else {
            self.coefficient
        }
    }

    pub fn derivative(&self) -> Monomial {
        Monomial {
            coefficient: self.coefficient * self.power as f64,
            var: self.var.clone(),
            power: self.power - 1,
        }
    }

    /// Indefinite integral, power rule; omits the `+ C` (the caller decides whether to append
    /// it based on whether the result is substituted immediately or surfaced symbolically).
    pub fn antiderivative(&self) -> Monomial {
        let new_power = self.power + 1;
        Monomial {
            coefficient: self.coefficient / new_power as f64,
            var: self.var.clone(),
            power: new_power,
        }
    }

    pub fn evalf(&self, at: f64) -> f64 {
        self.coefficient * at.powi(self.power)
    }
}

impl std::fmt::Display for Monomial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}*{}^{}", self.coefficient, self.var, self.power)
    }
}

pub enum MathResult {
    Numeric(f64),
    Function(Monomial),
}

pub trait MathBackend {
    fn exec(&self, action: MathAction, args: &[Value]) -> Result<MathResult, EvalError>;
}

/// Default `MathBackend`: real trig via `std::f64`, single-variable monomial calculus for
/// deriv/integral. Arguments for the monomial actions are `(coefficient, var_name, power, x)`
/// where `var_name` is passed as a string value and `x` is the evaluation point.
pub struct StdMathBackend;

fn monomial_from_args(args: &[Value]) -> Result<(Monomial, Option<f64>), EvalError> {
    if args.len() < 3 {
        return TypeSnafu {
            message: "expected (coefficient, var, power[, x])".to_string(),
        }
        .fail();
    }
    let coefficient = args[0].as_f64()?;
    let var = match &args[1] {
        Value::Str(s) => s.clone(),
        other => {
            return TypeSnafu {
                message: format!("expected variable name string, found {}", other.type_name()),
            }
            .fail()
        }
    };
    let power = args[2].as_f64()? as i32;
    let at = match args.get(3) {
        Some(v) => Some(v.as_f64()?),
        None => None,
    };
    Ok((Monomial { coefficient, var, power }, at))
}

impl MathBackend for StdMathBackend {
    fn exec(&self, action: MathAction, args: &[Value]) -> Result<MathResult, EvalError> {
        match action {
            MathAction::TrigAngle => {
                let (name, x) = trig_args(args)?;
                let v = match name.as_str() {
                    "sin" => x.sin(),
                    "cos" => x.cos(),
                    "tan" => x.tan(),
                    _ => {
                        return TypeSnafu {
                            message: format!("unknown trig function '{}'", name),
                        }
                        .fail()
                    }
                };
                Ok(MathResult::Numeric(v))
            }
            MathAction::TrigInv => {
                let (name, x) = trig_args(args)?;
                let v = match name.as_str() {
                    "asin" => x.asin(),
                    "acos" => x.acos(),
                    "atan" => x.atan(),
                    _ => {
                        return TypeSnafu {
                            message: format!("unknown inverse trig function '{}'", name),
                        }
                        .fail()
                    }
                };
                Ok(MathResult::Numeric(v))
            }
            MathAction::Deriv => {
                let (m, at) = monomial_from_args(args)?;
                let d = m.derivative();
                match at {
                    Some(x) => Ok(MathResult::Numeric(d.evalf(x))),
                    None => Ok(MathResult::Function(d)),
                }
            }
            MathAction::IndefInt | MathAction::DefInt => {
                let (m, at) = monomial_from_args(args)?;
                let anti = m.antiderivative();
                match at {
                    Some(x) => Ok(MathResult::Numeric(anti.evalf(x))),
                    None => Ok(MathResult::Function(anti)),
                }
            }
        }
    }
}

fn trig_args(args: &[Value]) -> Result<(String, f64), EvalError> {
    if args.len() != 2 {
        return TypeSnafu {
            message: "expected (function_name, angle)".to_string(),
        }
        .fail();
    }
    let name = match &args[0] {
        Value::Str(s) => s.clone(),
        other => {
            return TypeSnafu {
                message: format!("expected function name string, found {}", other.type_name()),
            }
            .fail()
        }
    };
    let x = args[1].as_f64()?;
    Ok((name, x))
}

pub fn function_to_value(result: MathResult, append_plus_c: bool) -> Value {
    match result {
        MathResult::Numeric(n) => Value::Float(n),
        MathResult::Function(m) => {
            let text = if append_plus_c {
                format!("{} + C", m)
            } else {
                m.to_string()
            };
            Value::Symbolic(Symbolic { text })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trig_angle() {
        let backend = StdMathBackend;
        let result = backend
            .exec(
                MathAction::TrigAngle,
                &[Value::Str("sin".into()), Value::Float(0.0)],
            )
            .unwrap();
        match result {
            MathResult::Numeric(v) => assert!((v - 0.0).abs() < 1e-9),
            _ => panic!("expected numeric"),
        }
    }

    #[test]
    fn derivative_power_rule() {
        let backend = StdMathBackend;
        // d/dx (3 * x^2) = 6x
        let result = backend
            .exec(
                MathAction::Deriv,
                &[Value::Float(3.0), Value::Str("x".into()), Value::Int(2)],
            )
            .unwrap();
        match result {
            MathResult::Function(m) => assert_eq!(m, Monomial { coefficient: 6.0, var: "x".into(), power: 1 }),
            _ => panic!("expected function"),
        }
    }

    #[test]
    fn indefinite_integral_appends_plus_c() {
        let m = Monomial { coefficient: 2.0, var: "x".into(), power: 1 };
        let anti = m.antiderivative();
        let v = function_to_value(MathResult::Function(anti), true);
        assert_eq!(v.to_string(), "1*x^2 + C");
    }
}
