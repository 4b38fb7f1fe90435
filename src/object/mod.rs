mod object;

pub use object::{BuiltinFn, FunctionValue, Value};
