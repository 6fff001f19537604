use std::fs::File;
use std::io::BufReader;
use std::io::Read;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process;

use lox_interpreter as lox;

use clap::Parser as ClapParser;

use lox::interpreter::Interpreter;
use lox::parser::Parser;
use lox::resolver::Resolver;
use lox::scanner::Scanner;
use lox::token::Token;

#[derive(ClapParser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Lox script to run; starts an interactive prompt when omitted
    scripts: Vec<PathBuf>,
}

/// How a single run of the pipeline ended; batch mode maps these to the
/// conventional exit codes (65 for static errors, 70 for runtime errors).
enum Outcome {
    Clean,
    StaticError,
    RuntimeError,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args: Cli = Cli::parse();

    match args.scripts.as_slice() {
        [] => run_prompt()?,

        [script] => run_file(script)?,

        _ => {
            eprintln!("Usage: lox [script]");
            process::exit(64);
        }
    }

    Ok(())
}

fn run_file(path: &PathBuf) -> anyhow::Result<()> {
    let mut buf: Vec<u8> = Vec::new();
    let mut reader: BufReader<File> = BufReader::new(File::open(path)?);
    reader.read_to_end(&mut buf)?;

    let mut interpreter: Interpreter = Interpreter::new();

    match run(&mut interpreter, &buf) {
        Outcome::Clean => Ok(()),
        Outcome::StaticError => process::exit(65),
        Outcome::RuntimeError => process::exit(70),
    }
}

fn run_prompt() -> anyhow::Result<()> {
    let mut interpreter: Interpreter = Interpreter::new();
    interpreter.set_repl(true);

    let stdin = io::stdin();
    let mut line: String = String::new();

    loop {
        print!("> ");
        io::stdout().flush()?;

        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        // Diagnostics never end the session; error state is per line.
        let _ = run(&mut interpreter, line.as_bytes());
    }

    Ok(())
}

fn run(interpreter: &mut Interpreter, source: &[u8]) -> Outcome {
    let scanner: Scanner = Scanner::new(source);

    let mut tokens: Vec<Token> = Vec::new();
    let mut had_error = false;

    for item in scanner {
        match item {
            Ok(token) => tokens.push(token),

            Err(e) => {
                had_error = true;
                eprintln!("{}", e);
            }
        }
    }

    let (statements, parse_errors) = Parser::new(tokens).parse();

    for e in &parse_errors {
        eprintln!("{}", e);
    }

    if had_error || !parse_errors.is_empty() {
        return Outcome::StaticError;
    }

    let resolve_errors = Resolver::new(interpreter).resolve(&statements);

    for e in &resolve_errors {
        eprintln!("{}", e);
    }

    if !resolve_errors.is_empty() {
        return Outcome::StaticError;
    }

    match interpreter.interpret(&statements) {
        Ok(()) => Outcome::Clean,

        Err(e) => {
            eprintln!("{}", e);
            Outcome::RuntimeError
        }
    }
}
