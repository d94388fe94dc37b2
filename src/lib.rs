//! Tree-walking interpreter for StaQ, a small dynamically-typed,
//! expression-oriented scripting language.
//!
//! The pipeline is lexer → Pratt parser → recursive evaluator over a
//! chained lexical environment. [`interpret`] runs the whole pipeline on
//! a source fragment; every failure mode comes back as a [`Value`] so a
//! host can print results and errors through one display contract.
//!
//! ```
//! use staq::{interpret, new_environment};
//!
//! let env = new_environment();
//! assert_eq!(interpret("let x = 5; x * 2;", &env).to_string(), "10");
//! // Bindings persist through the shared environment.
//! assert_eq!(interpret("x + 1;", &env).to_string(), "11");
//! ```

pub mod ast;
pub mod environment;
pub mod evaluator;
pub mod lexer;
pub mod parser;

pub use environment::Environment;
pub use evaluator::Value;

/// A fresh top-level environment with no bindings.
pub fn new_environment() -> Environment {
    Environment::new()
}

/// Lexes, parses, and evaluates a source fragment against `env`.
///
/// Parse diagnostics are folded into a single `Value::Error` whose
/// message joins every collected parser error; runtime failures become a
/// `Value::Error` carrying the evaluator's message. The environment is
/// shared with the caller, so successive calls see earlier bindings.
pub fn interpret(source: &str, env: &Environment) -> Value {
    let tokens = lexer::tokenize(source);

    let program = match parser::Parser::new(tokens).parse_program() {
        Ok(program) => program,
        Err(errors) => {
            let message = errors
                .iter()
                .map(|err| err.kind.to_string())
                .collect::<Vec<_>>()
                .join("\n");
            return Value::Error(message);
        }
    };

    let mut evaluator = evaluator::Evaluator::with_env(env.clone());
    match evaluator.eval_program(&program) {
        Ok(value) => value,
        Err(err) => Value::Error(err.to_string()),
    }
}
