use std::fmt;
use std::rc::Rc;

use crate::environment::Env;
use crate::parser::ast::{BlockStatement, Identifier};

/*
The runtime value model is a closed tagged union, the same way the AST is: one
`Value` enum, matched exhaustively at every evaluation site rather than
dispatched through a trait object. `Boolean` and `Null` are not interned as
singletons the way the source language does it (there is nowhere to hang a
shared `&'static` behind a plain enum variant without extra indirection); `==`
and `!=` on them compare structurally instead, which spec.md's design notes
call out as an acceptable substitute for implementations that can't share
references.
*/

/// A user-defined function value: parameters, body, and the environment in
/// effect when the `fn` literal was evaluated (its closure).
#[derive(Debug)]
pub struct FunctionValue {
    pub parameters: Vec<Identifier>,
    pub body: BlockStatement,
    pub env: Env,
}

pub type BuiltinFn = fn(&[Value]) -> Value;

#[derive(Debug, Clone)]
pub enum Value {
    Integer(i64),
    Boolean(bool),
    Str(String),
    Null,
    /// Short-lived wrapper produced by `return`. Never escapes a function
    /// application; it is unwrapped at the nearest function boundary or, at
    /// the program root, becomes the top-level result.
    ReturnValue(Box<Value>),
    /// Sentinel that short-circuits evaluation. Propagates unchanged through
    /// every evaluation form once produced.
    Error(String),
    Function(Rc<FunctionValue>),
    Builtin(BuiltinFn),
}

impl Value {
    pub const TRUE: Value = Value::Boolean(true);
    pub const FALSE: Value = Value::Boolean(false);
    pub const NULL: Value = Value::Null;

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Integer(_) => "INTEGER",
            Value::Boolean(_) => "BOOLEAN",
            Value::Str(_) => "STRING",
            Value::Null => "NULL",
            Value::ReturnValue(_) => "RETURN_VALUE",
            Value::Error(_) => "ERROR",
            Value::Function(_) => "FUNCTION",
            Value::Builtin(_) => "BUILTIN",
        }
    }

    /// Any value other than the canonical `FALSE` and `NULL` is truthy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Boolean(false) | Value::Null)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }

    pub fn error(message: impl Into<String>) -> Value {
        Value::Error(message.into())
    }

    /// The byte output an external REPL or `puts` would print for this value.
    pub fn inspect(&self) -> String {
        match self {
            Value::Integer(n) => n.to_string(),
            Value::Boolean(b) => b.to_string(),
            Value::Str(s) => s.clone(),
            Value::Null => "null".to_string(),
            Value::ReturnValue(inner) => inner.inspect(),
            Value::Error(message) => format!("ERROR: {}", message),
            Value::Function(func) => {
                let params: Vec<String> = func.parameters.iter().map(|p| p.to_string()).collect();
                format!("fn({}) {{\n{}\n}}", params.join(", "), func.body)
            }
            Value::Builtin(_) => "builtin function".to_string(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.inspect())
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Null, Value::Null) => true,
            (Value::ReturnValue(a), Value::ReturnValue(b)) => a == b,
            (Value::Error(a), Value::Error(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Builtin(a), Value::Builtin(b)) => std::ptr::eq(*a as *const (), *b as *const ()),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truthiness_matches_spec_definition() {
        assert!(Value::Integer(0).is_truthy());
        assert!(Value::Boolean(true).is_truthy());
        assert!(!Value::Boolean(false).is_truthy());
        assert!(!Value::Null.is_truthy());
    }

    #[test]
    fn inspect_matches_the_documented_table() {
        assert_eq!(Value::Integer(5).inspect(), "5");
        assert_eq!(Value::Boolean(true).inspect(), "true");
        assert_eq!(Value::Str("hi".to_string()).inspect(), "hi");
        assert_eq!(Value::Null.inspect(), "null");
        assert_eq!(Value::error("boom").inspect(), "ERROR: boom");
    }
}
