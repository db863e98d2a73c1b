// syn.txt -- a text based synthesizer and audio workstation
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Builtin functions (C6): `len`, `min`/`max`, the typecasts, and `type`.

use crate::lang::errors::{EvalError, TypeSnafu};
use crate::lang::value::Value;

pub fn len(args: &[Value]) -> Result<Value, EvalError> {
    match args {
        [Value::List(items)] => Ok(Value::Int(items.len() as i64)),
        [Value::Str(s)] => Ok(Value::Int(s.chars().count() as i64)),
        [other] => TypeSnafu {
            message: format!("object of type {} has no len()", other.type_name()),
        }
        .fail(),
        _ => TypeSnafu {
            message: "len() takes exactly one argument".to_string(),
        }
        .fail(),
    }
}

/// Flattens a single list argument one level; otherwise treats the argument list itself as the
/// candidate set. `min`/`max` share this shape, differing only in the comparison direction.
fn flatten_variadic(args: &[Value]) -> Vec<Value> {
    if let [Value::List(items)] = args {
        items.clone()
    } else {
        args.to_vec()
    }
}

pub fn min(args: &[Value]) -> Result<Value, EvalError> {
    let items = flatten_variadic(args);
    reduce_extreme(&items, std::cmp::Ordering::Less)
}

pub fn max(args: &[Value]) -> Result<Value, EvalError> {
    let items = flatten_variadic(args);
    reduce_extreme(&items, std::cmp::Ordering::Greater)
}

fn reduce_extreme(items: &[Value], want: std::cmp::Ordering) -> Result<Value, EvalError> {
    let mut iter = items.iter();
    let mut best = match iter.next() {
        Some(v) => v.clone(),
        None => {
            return TypeSnafu {
                message: "min/max expected at least one argument".to_string(),
            }
            .fail()
        }
    };
    for item in iter {
        if item.ordered_cmp(&best)? == want {
            best = item.clone();
        }
    }
    Ok(best)
}

pub fn int(args: &[Value]) -> Result<Value, EvalError> {
    match args {
        [Value::Int(i)] => Ok(Value::Int(*i)),
        [Value::Float(f)] => Ok(Value::Int(*f as i64)),
        [Value::Bool(b)] => Ok(Value::Int(*b as i64)),
        [Value::Str(s)] => s.trim().parse::<i64>().map(Value::Int).map_err(|_| {
            TypeSnafu {
                message: format!("invalid literal for int(): '{}'", s),
            }
            .build()
        }),
        _ => TypeSnafu {
            message: "int() takes exactly one argument".to_string(),
        }
        .fail(),
    }
}

pub fn float(args: &[Value]) -> Result<Value, EvalError> {
    match args {
        [Value::Int(i)] => Ok(Value::Float(*i as f64)),
        [Value::Float(f)] => Ok(Value::Float(*f)),
        [Value::Bool(b)] => Ok(Value::Float(*b as i64 as f64)),
        [Value::Str(s)] => s.trim().parse::<f64>().map(Value::Float).map_err(|_| {
            TypeSnafu {
                message: format!("invalid literal for float(): '{}'", s),
            }
            .build()
        }),
        _ => TypeSnafu {
            message: "float() takes exactly one argument".to_string(),
        }
        .fail(),
    }
}

pub fn str(args: &[Value]) -> Result<Value, EvalError> {
    match args {
        [v] => Ok(Value::Str(format!("'{}'", v))),
        _ => TypeSnafu {
            message: "str() takes exactly one argument".to_string(),
        }
        .fail(),
    }
}

pub fn list(args: &[Value]) -> Result<Value, EvalError> {
    match args {
        [Value::List(items)] => Ok(Value::List(items.clone())),
        [Value::Str(s)] => Ok(Value::List(
            s.chars().map(|c| Value::Str(c.to_string())).collect(),
        )),
        [scalar @ (Value::Int(_) | Value::Float(_) | Value::Bool(_))] => {
            Ok(Value::List(vec![scalar.clone()]))
        }
        [other] => TypeSnafu {
            message: format!("'{}' object is not iterable", other.type_name()),
        }
        .fail(),
        _ => TypeSnafu {
            message: "list() takes exactly one argument".to_string(),
        }
        .fail(),
    }
}

pub fn type_of(args: &[Value]) -> Result<Value, EvalError> {
    match args {
        [v] => Ok(Value::Str(v.type_name().to_string())),
        _ => TypeSnafu {
            message: "type() takes exactly one argument".to_string(),
        }
        .fail(),
    }
}

pub fn dispatch(name: &str, args: &[Value]) -> Result<Value, EvalError> {
    match name {
        "len" => len(args),
        "min" => min(args),
        "max" => max(args),
        "int" => int(args),
        "float" => float(args),
        "str" => str(args),
        "list" => list(args),
        "type" => type_of(args),
        other => TypeSnafu {
            message: format!("unknown builtin '{}'", other),
        }
        .fail(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn len_of_list_and_string() {
        assert_eq!(
            len(&[Value::List(vec![Value::Int(1), Value::Int(2)])]).unwrap(),
            Value::Int(2)
        );
        assert_eq!(len(&[Value::Str("abc".into())]).unwrap(), Value::Int(3));
    }

    #[test]
    fn len_of_number_is_type_error() {
        assert!(len(&[Value::Int(1)]).is_err());
    }

    #[test]
    fn min_max_flatten_single_list_arg() {
        let items = Value::List(vec![Value::Int(3), Value::Int(1), Value::Int(2)]);
        assert_eq!(min(&[items.clone()]).unwrap(), Value::Int(1));
        assert_eq!(max(&[items]).unwrap(), Value::Int(3));
    }

    #[test]
    fn min_max_variadic() {
        assert_eq!(
            min(&[Value::Int(3), Value::Int(1), Value::Int(2)]).unwrap(),
            Value::Int(1)
        );
    }

    #[test]
    fn empty_min_max_is_type_error() {
        assert!(min(&[]).is_err());
    }

    #[test]
    fn list_of_string_splits_chars() {
        let result = list(&[Value::Str("ab".into())]).unwrap();
        assert_eq!(
            result,
            Value::List(vec![Value::Str("a".into()), Value::Str("b".into())])
        );
    }
}
