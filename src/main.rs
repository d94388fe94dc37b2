use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use staq::{interpret, new_environment, Value};

const PROMPT: &str = ">> ";

/// The StaQ programming language.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Script file to run. Without it, an interactive session starts.
    script: Option<PathBuf>,
}

fn main() -> ExitCode {
    let args = Args::parse();

    match args.script {
        Some(path) => run_file(&path),
        None => run_repl(),
    }
}

fn run_file(path: &PathBuf) -> ExitCode {
    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("failed to read '{}': {}", path.display(), err);
            return ExitCode::FAILURE;
        }
    };

    let env = new_environment();
    let result = interpret(&source, &env);
    println!("{result}");

    if matches!(result, Value::Error(_)) {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

// Line-oriented loop over the core: read, interpret against one
// persistent environment, print the value's display form. EOF exits.
fn run_repl() -> ExitCode {
    println!("The StaQ Programming Language");
    println!("Version {}", env!("CARGO_PKG_VERSION"));
    if let Ok(user) = std::env::var("USER") {
        println!("Welcome, {user}!");
    }

    let env = new_environment();
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{PROMPT}");
        if stdout.flush().is_err() {
            return ExitCode::FAILURE;
        }

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }

        if line.trim().is_empty() {
            continue;
        }

        println!("{}", interpret(&line, &env));
    }

    ExitCode::SUCCESS
}
