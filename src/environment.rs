use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::evaluator::Value;

/// A lexical scope: a name-to-value map with an optional outer scope.
///
/// The handle is a cheap clone sharing the underlying map, which is what
/// lets closures keep their defining scope alive after the call that
/// created it has returned. Scopes only ever point outward, so the
/// reference graph stays acyclic.
#[derive(Debug, Clone)]
pub struct Environment {
    inner: Rc<RefCell<EnvironmentData>>,
}

#[derive(Debug)]
struct EnvironmentData {
    values: HashMap<String, Value>,
    outer: Option<Environment>,
}

impl Environment {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(EnvironmentData {
                values: HashMap::new(),
                outer: None,
            })),
        }
    }

    /// A fresh scope nested inside `outer`. Function calls use this to
    /// bind parameters without touching the captured scope.
    pub fn new_enclosed(outer: Environment) -> Self {
        Self {
            inner: Rc::new(RefCell::new(EnvironmentData {
                values: HashMap::new(),
                outer: Some(outer),
            })),
        }
    }

    /// Lookup walks the chain outward: innermost binding wins.
    pub fn get(&self, name: &str) -> Option<Value> {
        let outer = {
            let borrowed = self.inner.borrow();
            if let Some(value) = borrowed.values.get(name) {
                return Some(value.clone());
            }
            borrowed.outer.clone()
        };

        outer.and_then(|scope| scope.get(name))
    }

    /// Binds a name in this scope, shadowing any outer binding of the
    /// same name. Never writes through to an outer scope.
    pub fn set(&self, name: impl Into<String>, value: Value) {
        self.inner.borrow_mut().values.insert(name.into(), value);
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}
