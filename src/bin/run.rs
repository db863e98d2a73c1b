// syn.txt -- a text based synthesizer and audio workstation
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! `run` executes a program already expressed as a JSON-serialized AST (the lexer/parser that
//! would produce one from source text is out of scope of this crate).

use std::path::PathBuf;
use std::process;

use structopt::StructOpt;

use scriptlang::lang::ast::NodeList;
use scriptlang::lang::evaluate;

#[derive(Debug, StructOpt)]
#[structopt(name = "run", about = "Evaluate a serialized program AST")]
struct Opt {
    #[structopt(short = "v", long = "verbose")]
    verbose: bool,

    /// Path to a JSON file containing the program's `Vec<Node>` AST.
    #[structopt(parse(from_os_str))]
    program: PathBuf,
}

fn main() {
    let opt = Opt::from_args();

    let level = if opt.verbose {
        log::Level::Trace
    } else {
        log::Level::Info
    };
    simple_logger::init_with_level(level).unwrap();

    let source = match std::fs::read_to_string(&opt.program) {
        Ok(source) => source,
        Err(err) => {
            log::error!("could not read {}: {}", opt.program.display(), err);
            process::exit(1);
        }
    };

    let program: NodeList = match serde_json::from_str(&source) {
        Ok(program) => program,
        Err(err) => {
            log::error!("could not parse {}: {}", opt.program.display(), err);
            process::exit(1);
        }
    };

    process::exit(evaluate(&program));
}
