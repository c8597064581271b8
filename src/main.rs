mod builtins;
mod config;
mod env;
mod error;
mod eval;
mod printer;
mod reader;
mod value;

use builtins::register_builtins;
use clap::Parser;
use env::Environment;
use eval::eval;
use reader::read_expr;
use rustyline::error::ReadlineError;
use rustyline::{Config, DefaultEditor};
use std::path::PathBuf;
use std::rc::Rc;

/// A small Scheme interpreter
#[derive(Parser, Debug)]
#[command(name = "schemer")]
#[command(version = config::VERSION)]
#[command(about = "A small Scheme interpreter")]
struct CliArgs {
    /// Source files evaluated in order before the interactive prompt
    #[arg(value_name = "FILE")]
    files: Vec<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Files and the interactive loop share one root environment
    let env = Environment::new();
    register_builtins(&env);

    for path in &args.files {
        match std::fs::read_to_string(path) {
            Ok(source) => run_source(&source, &env),
            Err(e) => eprintln!("error: cannot open {}: {}", path.display(), e),
        }
    }

    repl(&env)
}

/// Evaluates every top-level expression in `source`, reporting errors
/// on stderr without halting.
fn run_source(source: &str, env: &Rc<Environment>) {
    let mut remaining = source;
    loop {
        match read_expr(remaining) {
            Ok(None) => break,
            Ok(Some((expr, rest))) => {
                remaining = rest;
                if let Err(e) = eval(&expr, env) {
                    eprintln!("error: {}", e);
                }
            }
            Err(e) => {
                // The reader cannot resynchronize, so skip the rest of
                // the file.
                eprintln!("error: {}", e);
                break;
            }
        }
    }
}

/// The interactive loop: prompt, read, evaluate, print. Ends with
/// status 0 at end of input.
fn repl(env: &Rc<Environment>) -> Result<(), Box<dyn std::error::Error>> {
    let rl_config = Config::builder().auto_add_history(true).build();
    let mut rl = DefaultEditor::with_config(rl_config)?;
    let _ = rl.load_history(config::HISTORY_FILE);

    loop {
        match rl.readline(config::PROMPT) {
            Ok(line) => {
                let mut remaining = line.as_str();
                loop {
                    match read_expr(remaining) {
                        Ok(None) => break,
                        Ok(Some((expr, rest))) => {
                            remaining = rest;
                            match eval(&expr, env) {
                                Ok(result) => println!("{}", result),
                                Err(e) => eprintln!("error: {}", e),
                            }
                        }
                        Err(e) => {
                            eprintln!("error: {}", e);
                            break;
                        }
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("error: {}", err);
                break;
            }
        }
    }

    let _ = rl.save_history(config::HISTORY_FILE);
    Ok(())
}
