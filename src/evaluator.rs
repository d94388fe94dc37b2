use std::fmt;
use std::rc::Rc;

use thiserror::Error;

use crate::ast::{Block, Expr, InfixOp, PrefixOp, Program, Stmt};
use crate::environment::Environment;

mod builtins;

pub use builtins::BuiltinFunction;

/// A runtime value. Arrays and functions are shared behind `Rc`, so
/// environment lookups clone handles rather than structures, and value
/// identity (used by cross-kind equality) is pointer identity.
#[derive(Debug, Clone)]
pub enum Value {
    Integer(i64),
    Float(f64),
    Boolean(bool),
    String(String),
    Null,
    Array(Rc<Vec<Value>>),
    Function(Rc<FunctionValue>),
    Builtin(BuiltinFunction),
    // Internal unwind marker: blocks pass it up untouched, program and
    // call boundaries unwrap it. User code never observes one.
    ReturnValue(Box<Value>),
    Error(String),
}

/// A closure: parameter list, body, and the scope it was created in.
#[derive(Debug)]
pub struct FunctionValue {
    pub params: Vec<String>,
    pub body: Block,
    pub env: Environment,
}

impl Value {
    /// Kind name as it appears in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Integer(_) => "INTEGER",
            Value::Float(_) => "FLOAT",
            Value::Boolean(_) => "BOOLEAN",
            Value::String(_) => "STRING",
            Value::Null => "NULL",
            Value::Array(_) => "ARRAY",
            Value::Function(_) => "FUNCTION",
            Value::Builtin(_) => "BUILTIN",
            Value::ReturnValue(_) => "RETURN_VALUE",
            Value::Error(_) => "ERROR",
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Null, Value::Null) => true,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Builtin(a), Value::Builtin(b)) => a == b,
            (Value::ReturnValue(a), Value::ReturnValue(b)) => a == b,
            (Value::Error(a), Value::Error(b)) => a == b,
            _ => false,
        }
    }
}

// Display is the REPL's `inspect` contract.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(value) => write!(f, "{value}"),
            Value::Float(value) => write!(f, "{value:.6}"),
            Value::Boolean(value) => write!(f, "{value}"),
            Value::String(value) => write!(f, "{value}"),
            Value::Null => write!(f, "null"),
            Value::Array(elements) => {
                let rendered = elements
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "[{rendered}]")
            }
            Value::Function(function) => {
                write!(f, "fn({}) {{ {} }}", function.params.join(", "), function.body)
            }
            Value::Builtin(_) => write!(f, "builtin function"),
            Value::ReturnValue(value) => write!(f, "{value}"),
            Value::Error(message) => write!(f, "ERROR: {message}"),
        }
    }
}

/// `null` and `false` are falsy; everything else, including zero and
/// empty collections, is truthy.
pub fn is_truthy(value: &Value) -> bool {
    !matches!(value, Value::Null | Value::Boolean(false))
}

// Identity comparison for cross-kind `==`/`!=`: the singleton kinds
// compare by payload, shared structures by pointer, and heterogeneous
// pairs are never equal. Same-kind numbers and strings never reach this
// (the typed dispatch handles them by value).
fn values_identical(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Null, Value::Null) => true,
        (Value::Boolean(a), Value::Boolean(b)) => a == b,
        (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b),
        (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
        (Value::Builtin(a), Value::Builtin(b)) => a == b,
        _ => false,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    #[error("identifier not found: {0}")]
    IdentifierNotFound(String),
    #[error("type mismatch: {left} {op} {right}")]
    TypeMismatch {
        left: &'static str,
        op: InfixOp,
        right: &'static str,
    },
    #[error("unknown operator: {op}{right}")]
    UnknownPrefixOperator {
        op: PrefixOp,
        right: &'static str,
    },
    #[error("unknown operator: {left} {op} {right}")]
    UnknownInfixOperator {
        left: &'static str,
        op: InfixOp,
        right: &'static str,
    },
    #[error("not a function: {0}")]
    NotAFunction(&'static str),
    #[error("index operator not supported: {0}")]
    IndexNotSupported(&'static str),
    #[error("division by zero")]
    DivisionByZero,
    #[error("negative shift amount: {0}")]
    NegativeShift(i64),
    #[error("wrong number of arguments. got={got}, want={want}")]
    WrongArgumentCount { got: usize, want: usize },
    #[error("argument to `{name}` must be {expected}, got {got}")]
    BuiltinArgument {
        name: &'static str,
        expected: &'static str,
        got: &'static str,
    },
    #[error("argument to `len` not supported, got {0}")]
    LenArgument(&'static str),
    #[error("maximum call depth exceeded ({0})")]
    CallDepthExceeded(usize),
}

// Deep enough for any reasonable recursion; hit before the host stack is.
const MAX_CALL_DEPTH: usize = 1024;

/// Walks an AST, reducing nodes to values against a scope chain. Errors
/// short-circuit through the `Result` channel at every composition
/// point; `return` travels in-band as a `ReturnValue` marker.
pub struct Evaluator {
    env: Environment,
    call_depth: usize,
}

impl Evaluator {
    pub fn new() -> Self {
        Self {
            env: Environment::new(),
            call_depth: 0,
        }
    }

    /// Evaluates against an existing environment, shared with the
    /// caller. A REPL hands the same environment back in every line to
    /// keep bindings across inputs.
    pub fn with_env(env: Environment) -> Self {
        Self { env, call_depth: 0 }
    }

    /// Evaluates top-level statements in order. A `return` ends the
    /// program early with its unwrapped value; otherwise the result is
    /// the last statement's value.
    pub fn eval_program(&mut self, program: &Program) -> Result<Value, RuntimeError> {
        let mut result = Value::Null;

        for stmt in &program.statements {
            match self.eval_stmt(stmt)? {
                Value::ReturnValue(value) => return Ok(*value),
                value => result = value,
            }
        }

        Ok(result)
    }

    fn eval_stmt(&mut self, stmt: &Stmt) -> Result<Value, RuntimeError> {
        match stmt {
            Stmt::Let { name, value } | Stmt::Const { name, value } => {
                let evaluated = self.eval_expr(value)?;
                self.env.set(name.clone(), evaluated);
                Ok(Value::Null)
            }
            Stmt::Return(value) => {
                let evaluated = self.eval_expr(value)?;
                Ok(Value::ReturnValue(Box::new(evaluated)))
            }
            Stmt::Expr(expr) => self.eval_expr(expr),
        }
    }

    // Unlike eval_program, a ReturnValue is passed through unwrapped so
    // the enclosing function call can unwrap it at its own boundary.
    fn eval_block(&mut self, block: &Block) -> Result<Value, RuntimeError> {
        let mut result = Value::Null;

        for stmt in &block.statements {
            result = self.eval_stmt(stmt)?;
            if matches!(result, Value::ReturnValue(_)) {
                return Ok(result);
            }
        }

        Ok(result)
    }

    fn eval_expr(&mut self, expr: &Expr) -> Result<Value, RuntimeError> {
        match expr {
            Expr::Identifier(name) => self.eval_identifier(name),
            Expr::IntegerLiteral(value) => Ok(Value::Integer(*value)),
            Expr::FloatLiteral(value) => Ok(Value::Float(*value)),
            Expr::StringLiteral(raw) => self.eval_string_literal(raw),
            Expr::BooleanLiteral(value) => Ok(Value::Boolean(*value)),
            Expr::NullLiteral => Ok(Value::Null),
            Expr::ArrayLiteral(elements) => {
                let mut evaluated = Vec::with_capacity(elements.len());
                for element in elements {
                    evaluated.push(self.eval_expr(element)?);
                }
                Ok(Value::Array(Rc::new(evaluated)))
            }
            Expr::Prefix { op, right } => {
                let right = self.eval_expr(right)?;
                eval_prefix(*op, right)
            }
            Expr::Infix { left, op, right } => {
                let left = self.eval_expr(left)?;
                let right = self.eval_expr(right)?;
                eval_infix(left, *op, right)
            }
            Expr::If {
                condition,
                consequence,
                alternative,
            } => {
                let condition = self.eval_expr(condition)?;
                if is_truthy(&condition) {
                    self.eval_block(consequence)
                } else if let Some(alternative) = alternative {
                    self.eval_block(alternative)
                } else {
                    Ok(Value::Null)
                }
            }
            Expr::FunctionLiteral { params, body } => {
                Ok(Value::Function(Rc::new(FunctionValue {
                    params: params.clone(),
                    body: body.clone(),
                    env: self.env.clone(),
                })))
            }
            Expr::Call { callee, args } => {
                let callee = self.eval_expr(callee)?;
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    values.push(self.eval_expr(arg)?);
                }
                self.apply_function(callee, values)
            }
            Expr::Index { left, index } => {
                let left = self.eval_expr(left)?;
                let index = self.eval_expr(index)?;
                eval_index(left, index)
            }
        }
    }

    fn eval_identifier(&self, name: &str) -> Result<Value, RuntimeError> {
        if let Some(value) = self.env.get(name) {
            return Ok(value);
        }
        if let Some(builtin) = builtins::lookup(name) {
            return Ok(Value::Builtin(builtin));
        }
        Err(RuntimeError::IdentifierNotFound(name.to_string()))
    }

    // Interpolation pass over a raw string literal: `{`..`}` spans name
    // an identifier whose display form is spliced in. Lookup hits the
    // environment only, and there is no escape for literal braces.
    fn eval_string_literal(&self, raw: &str) -> Result<Value, RuntimeError> {
        let mut out = String::new();
        let mut in_braces = false;
        let mut identifier = String::new();

        for c in raw.chars() {
            if c == '{' {
                in_braces = true;
                continue;
            }
            if c == '}' {
                in_braces = false;
                let value = self
                    .env
                    .get(&identifier)
                    .ok_or_else(|| RuntimeError::IdentifierNotFound(identifier.clone()))?;
                out.push_str(&value.to_string());
                identifier.clear();
                continue;
            }
            if in_braces {
                identifier.push(c);
                continue;
            }
            out.push(c);
        }

        Ok(Value::String(out))
    }

    /// Calls a function or builtin value with already-evaluated
    /// arguments. User functions run their body in a fresh scope
    /// enclosed by the *captured* environment, not the caller's, and a
    /// `ReturnValue` coming out of the body is unwrapped here.
    fn apply_function(&mut self, callee: Value, args: Vec<Value>) -> Result<Value, RuntimeError> {
        match callee {
            Value::Function(function) => {
                // Surplus arguments are ignored; missing ones are an
                // explicit error rather than an unbound parameter.
                if args.len() < function.params.len() {
                    return Err(RuntimeError::WrongArgumentCount {
                        got: args.len(),
                        want: function.params.len(),
                    });
                }

                if self.call_depth >= MAX_CALL_DEPTH {
                    return Err(RuntimeError::CallDepthExceeded(MAX_CALL_DEPTH));
                }

                let call_env = Environment::new_enclosed(function.env.clone());
                for (param, arg) in function.params.iter().zip(args.into_iter()) {
                    call_env.set(param.clone(), arg);
                }

                self.call_depth += 1;
                let outer_env = std::mem::replace(&mut self.env, call_env);
                let result = self.eval_block(&function.body);
                self.env = outer_env;
                self.call_depth -= 1;

                match result? {
                    Value::ReturnValue(value) => Ok(*value),
                    value => Ok(value),
                }
            }
            Value::Builtin(builtin) => self.eval_builtin_call(builtin, args),
            other => Err(RuntimeError::NotAFunction(other.type_name())),
        }
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

fn eval_prefix(op: PrefixOp, right: Value) -> Result<Value, RuntimeError> {
    match op {
        PrefixOp::Not => Ok(Value::Boolean(!is_truthy(&right))),
        PrefixOp::Negate => match right {
            Value::Integer(value) => Ok(Value::Integer(value.wrapping_neg())),
            Value::Float(value) => Ok(Value::Float(-value)),
            other => Err(RuntimeError::UnknownPrefixOperator {
                op,
                right: other.type_name(),
            }),
        },
        PrefixOp::BitNot => match right {
            Value::Integer(value) => Ok(Value::Integer(!value)),
            _ => Ok(Value::Null),
        },
        // Prefix ++/-- produce the successor value; they never write
        // back to the operand's binding.
        PrefixOp::Increment => match right {
            Value::Integer(value) => Ok(Value::Integer(value.wrapping_add(1))),
            Value::Float(value) => Ok(Value::Float(value + 1.0)),
            _ => Ok(Value::Null),
        },
        PrefixOp::Decrement => match right {
            Value::Integer(value) => Ok(Value::Integer(value.wrapping_sub(1))),
            Value::Float(value) => Ok(Value::Float(value - 1.0)),
            _ => Ok(Value::Null),
        },
    }
}

// Dispatch on the operand kind pair, in this order: matching numeric and
// string pairs get their typed tables (an integer widens to float when
// mixed); whatever falls through is handled by identity equality and
// truthiness logic, then reported as a mismatch or unknown operator.
fn eval_infix(left: Value, op: InfixOp, right: Value) -> Result<Value, RuntimeError> {
    match (left, right) {
        (Value::Integer(l), Value::Integer(r)) => eval_integer_infix(op, l, r),
        (Value::Float(l), Value::Float(r)) => eval_float_infix(op, l, r),
        (Value::Integer(l), Value::Float(r)) => eval_float_infix(op, l as f64, r),
        (Value::Float(l), Value::Integer(r)) => eval_float_infix(op, l, r as f64),
        (Value::String(l), Value::String(r)) => eval_string_infix(op, l, r),
        (left, right) => match op {
            InfixOp::Eq => Ok(Value::Boolean(values_identical(&left, &right))),
            InfixOp::NotEq => Ok(Value::Boolean(!values_identical(&left, &right))),
            InfixOp::And => Ok(Value::Boolean(is_truthy(&left) && is_truthy(&right))),
            InfixOp::Or => Ok(Value::Boolean(is_truthy(&left) || is_truthy(&right))),
            _ if left.type_name() != right.type_name() => Err(RuntimeError::TypeMismatch {
                left: left.type_name(),
                op,
                right: right.type_name(),
            }),
            _ => Err(RuntimeError::UnknownInfixOperator {
                left: left.type_name(),
                op,
                right: right.type_name(),
            }),
        },
    }
}

fn eval_integer_infix(op: InfixOp, left: i64, right: i64) -> Result<Value, RuntimeError> {
    match op {
        InfixOp::Add => Ok(Value::Integer(left.wrapping_add(right))),
        InfixOp::Subtract => Ok(Value::Integer(left.wrapping_sub(right))),
        InfixOp::Multiply => Ok(Value::Integer(left.wrapping_mul(right))),
        // `/` and `//` are both truncating division on integers.
        InfixOp::Divide | InfixOp::IntDivide => {
            if right == 0 {
                return Err(RuntimeError::DivisionByZero);
            }
            Ok(Value::Integer(left.wrapping_div(right)))
        }
        InfixOp::Modulo => {
            if right == 0 {
                return Err(RuntimeError::DivisionByZero);
            }
            Ok(Value::Integer(left.wrapping_rem(right)))
        }
        InfixOp::Power => Ok(Value::Integer(int_pow(left, right))),
        InfixOp::Shl => {
            if right < 0 {
                return Err(RuntimeError::NegativeShift(right));
            }
            if right >= 64 {
                return Ok(Value::Integer(0));
            }
            Ok(Value::Integer(left << right))
        }
        InfixOp::Shr => {
            if right < 0 {
                return Err(RuntimeError::NegativeShift(right));
            }
            // Arithmetic shift: counts past the width saturate to the
            // sign fill.
            Ok(Value::Integer(left >> right.min(63)))
        }
        InfixOp::BitAnd => Ok(Value::Integer(left & right)),
        InfixOp::BitOr => Ok(Value::Integer(left | right)),
        InfixOp::BitXor => Ok(Value::Integer(left ^ right)),
        InfixOp::Eq => Ok(Value::Boolean(left == right)),
        InfixOp::NotEq => Ok(Value::Boolean(left != right)),
        InfixOp::Lt => Ok(Value::Boolean(left < right)),
        InfixOp::Gt => Ok(Value::Boolean(left > right)),
        InfixOp::LtEq => Ok(Value::Boolean(left <= right)),
        InfixOp::GtEq => Ok(Value::Boolean(left >= right)),
        InfixOp::And | InfixOp::Or => Err(RuntimeError::UnknownInfixOperator {
            left: "INTEGER",
            op,
            right: "INTEGER",
        }),
    }
}

fn eval_float_infix(op: InfixOp, left: f64, right: f64) -> Result<Value, RuntimeError> {
    match op {
        InfixOp::Add => Ok(Value::Float(left + right)),
        InfixOp::Subtract => Ok(Value::Float(left - right)),
        InfixOp::Multiply => Ok(Value::Float(left * right)),
        InfixOp::Divide | InfixOp::IntDivide => Ok(Value::Float(left / right)),
        InfixOp::Power => Ok(Value::Float(left.powf(right))),
        // Integral operators have no float meaning here; they quietly
        // produce null instead of an error.
        InfixOp::Modulo
        | InfixOp::Shl
        | InfixOp::Shr
        | InfixOp::BitAnd
        | InfixOp::BitOr
        | InfixOp::BitXor => Ok(Value::Null),
        InfixOp::Eq => Ok(Value::Boolean(left == right)),
        InfixOp::NotEq => Ok(Value::Boolean(left != right)),
        InfixOp::Lt => Ok(Value::Boolean(left < right)),
        InfixOp::Gt => Ok(Value::Boolean(left > right)),
        InfixOp::LtEq => Ok(Value::Boolean(left <= right)),
        InfixOp::GtEq => Ok(Value::Boolean(left >= right)),
        InfixOp::And | InfixOp::Or => Err(RuntimeError::UnknownInfixOperator {
            left: "FLOAT",
            op,
            right: "FLOAT",
        }),
    }
}

fn eval_string_infix(op: InfixOp, left: String, right: String) -> Result<Value, RuntimeError> {
    match op {
        InfixOp::Add => Ok(Value::String(left + &right)),
        InfixOp::Eq => Ok(Value::Boolean(left == right)),
        InfixOp::NotEq => Ok(Value::Boolean(left != right)),
        _ => Err(RuntimeError::UnknownInfixOperator {
            left: "STRING",
            op,
            right: "STRING",
        }),
    }
}

/// Array indexing. A negative index counts from the end (`-1` is the
/// last element); anything out of range evaluates to null rather than
/// an error.
fn eval_index(left: Value, index: Value) -> Result<Value, RuntimeError> {
    match (&left, &index) {
        (Value::Array(elements), Value::Integer(index)) => {
            let max = elements.len() as i64 - 1;
            let idx = if *index < 0 { max + 1 + index } else { *index };
            if idx < 0 || idx > max {
                return Ok(Value::Null);
            }
            Ok(elements[idx as usize].clone())
        }
        _ => Err(RuntimeError::IndexNotSupported(left.type_name())),
    }
}

// Exponentiation by repeated multiplication. Exponents below zero fall
// through the loop and yield the base, matching the reference behavior.
fn int_pow(base: i64, exponent: i64) -> i64 {
    if exponent == 0 {
        return 1;
    }
    if exponent == 1 {
        return base;
    }
    let mut result = base;
    let mut i = 2;
    while i <= exponent {
        result = result.wrapping_mul(base);
        i += 1;
    }
    result
}
