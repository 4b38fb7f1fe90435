use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::object::{BuiltinFn, Value};

/// Host-provided callables, consulted when an identifier lookup misses every
/// environment frame. Registered the same way the lexer registers its
/// keyword table: a lazily built static map keyed by name.
static BUILTINS: Lazy<HashMap<&'static str, BuiltinFn>> = Lazy::new(|| {
    let mut m: HashMap<&'static str, BuiltinFn> = HashMap::new();
    m.insert("len", len);
    m.insert("puts", puts);
    m
});

pub fn lookup_builtin(name: &str) -> Option<BuiltinFn> {
    BUILTINS.get(name).copied()
}

fn len(args: &[Value]) -> Value {
    if args.len() != 1 {
        return Value::error(format!("wrong number of arguments. got={}, want=1", args.len()));
    }
    match &args[0] {
        Value::Str(s) => Value::Integer(s.len() as i64),
        other => Value::error(format!("argument to `len` not supported, got {}", other.type_name())),
    }
}

fn puts(args: &[Value]) -> Value {
    for arg in args {
        println!("{}", arg.inspect());
    }
    Value::Null
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn len_reports_string_byte_length() {
        assert_eq!(len(&[Value::Str("hello".to_string())]), Value::Integer(5));
    }

    #[test]
    fn len_rejects_wrong_arity() {
        assert_eq!(
            len(&[]),
            Value::error("wrong number of arguments. got=0, want=1")
        );
    }

    #[test]
    fn len_rejects_unsupported_types() {
        assert_eq!(
            len(&[Value::Integer(5)]),
            Value::error("argument to `len` not supported, got INTEGER")
        );
    }
}
