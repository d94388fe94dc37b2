use std::rc::Rc;

use super::{is_truthy, Evaluator, RuntimeError, Value};

/// The native functions of the language. The set is closed and
/// registered process-wide: identifier lookup consults it after the
/// environment chain misses, so any of these names can be shadowed by a
/// user binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinFunction {
    Len,
    First,
    Last,
    Rest,
    Push,
    Pop,
    ForEach,
    Map,
    Filter,
    Reduce,
}

pub(super) fn lookup(name: &str) -> Option<BuiltinFunction> {
    let builtin = match name {
        "len" => BuiltinFunction::Len,
        "first" => BuiltinFunction::First,
        "last" => BuiltinFunction::Last,
        "rest" => BuiltinFunction::Rest,
        "push" => BuiltinFunction::Push,
        "pop" => BuiltinFunction::Pop,
        "forEach" => BuiltinFunction::ForEach,
        "map" => BuiltinFunction::Map,
        "filter" => BuiltinFunction::Filter,
        "reduce" => BuiltinFunction::Reduce,
        _ => return None,
    };
    Some(builtin)
}

impl Evaluator {
    pub(super) fn eval_builtin_call(
        &mut self,
        builtin: BuiltinFunction,
        args: Vec<Value>,
    ) -> Result<Value, RuntimeError> {
        match builtin {
            BuiltinFunction::Len => eval_builtin_len(args),
            BuiltinFunction::First => eval_builtin_first(args),
            BuiltinFunction::Last => eval_builtin_last(args),
            BuiltinFunction::Rest => eval_builtin_rest(args),
            BuiltinFunction::Push => eval_builtin_push(args),
            BuiltinFunction::Pop => eval_builtin_pop(args),
            BuiltinFunction::ForEach => self.eval_builtin_for_each(args),
            BuiltinFunction::Map => self.eval_builtin_map(args),
            BuiltinFunction::Filter => self.eval_builtin_filter(args),
            BuiltinFunction::Reduce => self.eval_builtin_reduce(args),
        }
    }

    fn eval_builtin_for_each(&mut self, args: Vec<Value>) -> Result<Value, RuntimeError> {
        let [array, callback] = take_args::<2>(args)?;
        let elements = expect_array("forEach", &array)?;
        expect_function("forEach", &callback)?;

        for element in elements.iter() {
            self.apply_function(callback.clone(), vec![element.clone()])?;
        }

        Ok(Value::Null)
    }

    fn eval_builtin_map(&mut self, args: Vec<Value>) -> Result<Value, RuntimeError> {
        let [array, callback] = take_args::<2>(args)?;
        let elements = expect_array("map", &array)?;
        expect_function("map", &callback)?;

        let mut mapped = Vec::with_capacity(elements.len());
        for element in elements.iter() {
            mapped.push(self.apply_function(callback.clone(), vec![element.clone()])?);
        }

        Ok(Value::Array(Rc::new(mapped)))
    }

    fn eval_builtin_filter(&mut self, args: Vec<Value>) -> Result<Value, RuntimeError> {
        let [array, callback] = take_args::<2>(args)?;
        let elements = expect_array("filter", &array)?;
        expect_function("filter", &callback)?;

        let mut kept = Vec::new();
        for element in elements.iter() {
            let verdict = self.apply_function(callback.clone(), vec![element.clone()])?;
            if is_truthy(&verdict) {
                kept.push(element.clone());
            }
        }

        Ok(Value::Array(Rc::new(kept)))
    }

    // The accumulator seed is restricted to the numeric kinds; the
    // callback receives (accumulator, element) and its result threads
    // into the next iteration.
    fn eval_builtin_reduce(&mut self, args: Vec<Value>) -> Result<Value, RuntimeError> {
        let [array, callback, seed] = take_args::<3>(args)?;
        let elements = expect_array("reduce", &array)?;
        expect_function("reduce", &callback)?;
        if !matches!(seed, Value::Integer(_) | Value::Float(_)) {
            return Err(RuntimeError::BuiltinArgument {
                name: "reduce",
                expected: "INTEGER or FLOAT",
                got: seed.type_name(),
            });
        }

        let mut accumulator = seed;
        for element in elements.iter() {
            accumulator =
                self.apply_function(callback.clone(), vec![accumulator, element.clone()])?;
        }

        Ok(accumulator)
    }
}

fn eval_builtin_len(args: Vec<Value>) -> Result<Value, RuntimeError> {
    let [value] = take_args::<1>(args)?;
    match &value {
        Value::Array(elements) => Ok(Value::Integer(elements.len() as i64)),
        Value::String(text) => Ok(Value::Integer(text.len() as i64)),
        other => Err(RuntimeError::LenArgument(other.type_name())),
    }
}

fn eval_builtin_first(args: Vec<Value>) -> Result<Value, RuntimeError> {
    let [value] = take_args::<1>(args)?;
    let elements = expect_array("first", &value)?;
    Ok(elements.first().cloned().unwrap_or(Value::Null))
}

fn eval_builtin_last(args: Vec<Value>) -> Result<Value, RuntimeError> {
    let [value] = take_args::<1>(args)?;
    let elements = expect_array("last", &value)?;
    Ok(elements.last().cloned().unwrap_or(Value::Null))
}

// rest/push/pop never touch the argument array: each builds a fresh one.
fn eval_builtin_rest(args: Vec<Value>) -> Result<Value, RuntimeError> {
    let [value] = take_args::<1>(args)?;
    let elements = expect_array("rest", &value)?;
    if elements.is_empty() {
        return Ok(Value::Null);
    }
    Ok(Value::Array(Rc::new(elements[1..].to_vec())))
}

fn eval_builtin_push(args: Vec<Value>) -> Result<Value, RuntimeError> {
    let [value, appended] = take_args::<2>(args)?;
    let elements = expect_array("push", &value)?;
    let mut fresh = elements.as_ref().clone();
    fresh.push(appended);
    Ok(Value::Array(Rc::new(fresh)))
}

fn eval_builtin_pop(args: Vec<Value>) -> Result<Value, RuntimeError> {
    let [value] = take_args::<1>(args)?;
    let elements = expect_array("pop", &value)?;
    if elements.is_empty() {
        return Ok(Value::Null);
    }
    Ok(Value::Array(Rc::new(elements[..elements.len() - 1].to_vec())))
}

fn take_args<const N: usize>(args: Vec<Value>) -> Result<[Value; N], RuntimeError> {
    let got = args.len();
    args.try_into()
        .map_err(|_| RuntimeError::WrongArgumentCount { got, want: N })
}

fn expect_array(name: &'static str, value: &Value) -> Result<Rc<Vec<Value>>, RuntimeError> {
    match value {
        Value::Array(elements) => Ok(elements.clone()),
        other => Err(RuntimeError::BuiltinArgument {
            name,
            expected: "ARRAY",
            got: other.type_name(),
        }),
    }
}

fn expect_function(name: &'static str, value: &Value) -> Result<(), RuntimeError> {
    match value {
        Value::Function(_) => Ok(()),
        other => Err(RuntimeError::BuiltinArgument {
            name,
            expected: "FUNCTION",
            got: other.type_name(),
        }),
    }
}
