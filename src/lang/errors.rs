// syn.txt -- a text based synthesizer and audio workstation
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Evaluator error taxonomy. One variant per error kind in the language's contract; every
//! evaluation function returns `Result<_, EvalError>` and propagates with `?`.

use snafu::Snafu;

#[derive(Debug, Snafu, PartialEq)]
#[snafu(visibility(pub))]
pub enum EvalError {
    #[snafu(display("name '{}' is not defined", name))]
    NotDefined { name: String },

    #[snafu(display("name '{}' already exists in this scope", name))]
    AlreadyExists { name: String },

    #[snafu(display("{}", message))]
    Type { message: String },

    #[snafu(display("{}", message))]
    Index { message: String },

    #[snafu(display("division or modulo by zero"))]
    ZeroDivision,

    #[snafu(display("{}", message))]
    Syntax { message: String },
}

pub type EvalResult<T> = Result<T, EvalError>;
