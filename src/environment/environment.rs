use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::object::Value;

/// A lexically nested name→value mapping. Lookup walks outward through
/// `outer`; `define` always writes into the innermost frame.
///
/// Environments are shared, not copied: a closure captures `Rc<RefCell<Environment>>`
/// rather than owning a snapshot, so a `let` executed later in an outer scope
/// is visible to every closure that already captured it. Frames themselves are
/// never rebound once created — an inner frame's `outer` is fixed at creation
/// and always strictly shallower — so the environment graph is a DAG with no
/// possibility of a cycle.
#[derive(Debug, Default)]
pub struct Environment {
    store: HashMap<String, Value>,
    outer: Option<Env>,
}

pub type Env = Rc<RefCell<Environment>>;

impl Environment {
    /// Create the top-level (global) environment.
    pub fn new() -> Env {
        Rc::new(RefCell::new(Environment {
            store: HashMap::new(),
            outer: None,
        }))
    }

    /// Create a nested environment whose `outer` is `enclosing`, shared by
    /// reference rather than copied.
    pub fn new_enclosed(enclosing: &Env) -> Env {
        Rc::new(RefCell::new(Environment {
            store: HashMap::new(),
            outer: Some(Rc::clone(enclosing)),
        }))
    }

    pub fn define(&mut self, name: impl Into<String>, value: Value) {
        self.store.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.store.get(name) {
            return Some(value.clone());
        }
        self.outer.as_ref().and_then(|outer| outer.borrow().get(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_walks_outward_through_enclosing_frames() {
        let global = Environment::new();
        global.borrow_mut().define("x", Value::Integer(1));

        let inner = Environment::new_enclosed(&global);
        assert_eq!(inner.borrow().get("x"), Some(Value::Integer(1)));
    }

    #[test]
    fn define_only_writes_into_the_innermost_frame() {
        let global = Environment::new();
        global.borrow_mut().define("x", Value::Integer(1));

        let inner = Environment::new_enclosed(&global);
        inner.borrow_mut().define("x", Value::Integer(2));

        assert_eq!(inner.borrow().get("x"), Some(Value::Integer(2)));
        assert_eq!(global.borrow().get("x"), Some(Value::Integer(1)));
    }

    #[test]
    fn a_closures_captured_environment_is_mutable_after_capture() {
        // Simulates what `Value::Function` does: hold on to an `Env` created
        // before a later `let` is evaluated in that same frame.
        let global = Environment::new();
        let captured = Rc::clone(&global);

        global.borrow_mut().define("x", Value::Integer(10));

        assert_eq!(captured.borrow().get("x"), Some(Value::Integer(10)));
    }

    #[test]
    fn unbound_name_is_not_found() {
        let global = Environment::new();
        assert_eq!(global.borrow().get("missing"), None);
    }
}
