use std::io::{self, Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::{fs, process};

use encoding_rs::UTF_8;
use encoding_rs_io::DecodeReaderBytesBuilder;

use crate::environment::{Env, Environment};
use crate::evaluator::eval_program;
use crate::lexer::Lexer;
use crate::parser::Parser;

pub static HAD_ERROR: AtomicBool = AtomicBool::new(false);
pub static HAD_RUNTIME_ERROR: AtomicBool = AtomicBool::new(false);

/// Runs a script file to completion against a fresh global environment.
/// Exits with sysexits.h-style codes: 65 on parser diagnostics, 70 if the
/// final value is a runtime `Error`.
pub fn run_file(path: &str) {
    let file = fs::File::open(path).unwrap_or_else(|err| {
        eprintln!("Failed to open {}: {}", path, err);
        process::exit(66); // EX_NOINPUT
    });

    let mut decoder = DecodeReaderBytesBuilder::new().encoding(Some(UTF_8)).build(file);
    let mut source = String::new();
    decoder
        .read_to_string(&mut source)
        .unwrap_or_else(|err| {
            eprintln!("Failed to read {}: {}", path, err);
            process::exit(66);
        });

    let env = Environment::new();
    run(&source, &env);

    if HAD_ERROR.load(Ordering::Relaxed) {
        process::exit(65); // EX_DATAERR
    }
    if HAD_RUNTIME_ERROR.load(Ordering::Relaxed) {
        process::exit(70); // EX_SOFTWARE
    }
}

/// A minimal read-eval-print loop. Every line shares one global environment,
/// so `let` bindings and function definitions persist across lines.
pub fn run_prompt() {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let env = Environment::new();

    loop {
        print!(">> ");
        stdout.flush().unwrap();

        let mut line = String::new();
        let bytes_read = stdin.read_line(&mut line).unwrap();
        if bytes_read == 0 {
            break; // EOF (Control-D)
        }

        run(&line, &env);
        HAD_ERROR.store(false, Ordering::Relaxed);
        HAD_RUNTIME_ERROR.store(false, Ordering::Relaxed);
    }
}

fn run(source: &str, env: &Env) {
    let lexer = Lexer::new(source);
    let mut parser = Parser::new(lexer);
    let program = parser.parse_program();

    let errors = parser.errors();
    if !errors.is_empty() {
        HAD_ERROR.store(true, Ordering::Relaxed);
        for message in errors {
            println!("\t{}", message);
        }
        return;
    }

    let value = eval_program(&program, env);
    if value.is_error() {
        HAD_RUNTIME_ERROR.store(true, Ordering::Relaxed);
    }
    println!("{}", value.inspect());
}
