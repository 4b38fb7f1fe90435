use crate::environment::{Env, Environment};
use crate::evaluator::builtins::lookup_builtin;
use crate::object::{FunctionValue, Value};
use crate::parser::ast::{BlockStatement, Expression, Program, Statement};
use std::rc::Rc;

/*
`eval` dispatches on the AST tag the same way the parser dispatches on token
kind: one function per node shape, no `Visitor`/`accept` double dispatch. The
only wrinkle is `ReturnValue`: a block must let it bubble up wrapped so an
outer block doesn't mistake an inner `return` for its own last statement,
while the program root (and a function call boundary) must unwrap it. See
`eval_block_statement` vs `eval_program` below.
*/

pub fn eval_program(program: &Program, env: &Env) -> Value {
    let mut result = Value::Null;
    for statement in &program.statements {
        result = eval_statement(statement, env);
        match result {
            Value::ReturnValue(inner) => return *inner,
            Value::Error(_) => return result,
            _ => {}
        }
    }
    result
}

fn eval_block_statement(block: &BlockStatement, env: &Env) -> Value {
    let mut result = Value::Null;
    for statement in &block.statements {
        result = eval_statement(statement, env);
        if matches!(result, Value::ReturnValue(_) | Value::Error(_)) {
            return result;
        }
    }
    result
}

fn eval_statement(statement: &Statement, env: &Env) -> Value {
    match statement {
        Statement::Let { name, value, .. } => {
            let value = eval_expression(value, env);
            if value.is_error() {
                return value;
            }
            env.borrow_mut().define(name.value.clone(), value);
            Value::Null
        }
        Statement::Return { value, .. } => {
            let value = eval_expression(value, env);
            if value.is_error() {
                return value;
            }
            Value::ReturnValue(Box::new(value))
        }
        Statement::Expression { value, .. } => eval_expression(value, env),
        Statement::Block(block) => eval_block_statement(block, env),
    }
}

fn eval_expression(expression: &Expression, env: &Env) -> Value {
    match expression {
        Expression::IntegerLiteral { value, .. } => Value::Integer(*value),
        Expression::StringLiteral { value, .. } => Value::Str(value.clone()),
        Expression::BooleanLiteral { value, .. } => native_bool(*value),
        Expression::Identifier(ident) => eval_identifier(&ident.value, env),
        Expression::Prefix { operator, operand, .. } => {
            let operand = eval_expression(operand, env);
            if operand.is_error() {
                return operand;
            }
            eval_prefix_expression(operator, operand)
        }
        Expression::Infix {
            left,
            operator,
            right,
            ..
        } => {
            let left = eval_expression(left, env);
            if left.is_error() {
                return left;
            }
            let right = eval_expression(right, env);
            if right.is_error() {
                return right;
            }
            eval_infix_expression(operator, left, right)
        }
        Expression::If {
            condition,
            consequence,
            alternative,
            ..
        } => eval_if_expression(condition, consequence, alternative.as_ref(), env),
        Expression::FunctionLiteral(func) => Value::Function(Rc::new(FunctionValue {
            parameters: func.parameters.clone(),
            body: func.body.clone(),
            env: Rc::clone(env),
        })),
        Expression::Call { callee, arguments, .. } => {
            let function = eval_expression(callee, env);
            if function.is_error() {
                return function;
            }
            let arguments = match eval_expressions(arguments, env) {
                Ok(args) => args,
                Err(err) => return err,
            };
            apply_function(function, arguments)
        }
    }
}

fn native_bool(value: bool) -> Value {
    if value {
        Value::TRUE
    } else {
        Value::FALSE
    }
}

fn eval_identifier(name: &str, env: &Env) -> Value {
    if let Some(value) = env.borrow().get(name) {
        return value;
    }
    if let Some(builtin) = lookup_builtin(name) {
        return Value::Builtin(builtin);
    }
    Value::error(format!("identifier not found: {}", name))
}

fn eval_prefix_expression(operator: &str, operand: Value) -> Value {
    match operator {
        "!" => native_bool(!operand.is_truthy()),
        "-" => match operand {
            Value::Integer(n) => Value::Integer(-n),
            other => Value::error(format!("unknown operator: -{}", other.type_name())),
        },
        other => Value::error(format!("unknown operator: {}{}", other, operand.type_name())),
    }
}

fn eval_infix_expression(operator: &str, left: Value, right: Value) -> Value {
    match (&left, &right) {
        (Value::Integer(l), Value::Integer(r)) => eval_integer_infix_expression(operator, *l, *r),
        (Value::Str(l), Value::Str(r)) => eval_string_infix_expression(operator, l, r),
        _ if left.type_name() != right.type_name() => Value::error(format!(
            "type mismatch: {} {} {}",
            left.type_name(),
            operator,
            right.type_name()
        )),
        _ => match operator {
            "==" => native_bool(left == right),
            "!=" => native_bool(left != right),
            _ => Value::error(format!(
                "unknown operator: {} {} {}",
                left.type_name(),
                operator,
                right.type_name()
            )),
        },
    }
}

fn eval_integer_infix_expression(operator: &str, left: i64, right: i64) -> Value {
    match operator {
        "+" => Value::Integer(left.wrapping_add(right)),
        "-" => Value::Integer(left.wrapping_sub(right)),
        "*" => Value::Integer(left.wrapping_mul(right)),
        "/" if right == 0 => Value::error("division by zero"),
        "/" => Value::Integer(left.wrapping_div(right)),
        "<" => native_bool(left < right),
        ">" => native_bool(left > right),
        "==" => native_bool(left == right),
        "!=" => native_bool(left != right),
        _ => Value::error(format!("unknown operator: INTEGER {} INTEGER", operator)),
    }
}

fn eval_string_infix_expression(operator: &str, left: &str, right: &str) -> Value {
    match operator {
        "+" => Value::Str(format!("{}{}", left, right)),
        _ => Value::error(format!("unknown operator: STRING {} STRING", operator)),
    }
}

fn eval_if_expression(
    condition: &Expression,
    consequence: &BlockStatement,
    alternative: Option<&BlockStatement>,
    env: &Env,
) -> Value {
    let condition = eval_expression(condition, env);
    if condition.is_error() {
        return condition;
    }
    if condition.is_truthy() {
        eval_block_statement(consequence, env)
    } else if let Some(alternative) = alternative {
        eval_block_statement(alternative, env)
    } else {
        Value::Null
    }
}

fn eval_expressions(expressions: &[Expression], env: &Env) -> Result<Vec<Value>, Value> {
    let mut values = Vec::with_capacity(expressions.len());
    for expression in expressions {
        let value = eval_expression(expression, env);
        if value.is_error() {
            return Err(value);
        }
        values.push(value);
    }
    Ok(values)
}

fn apply_function(function: Value, arguments: Vec<Value>) -> Value {
    match function {
        Value::Function(func) => {
            let call_env = extend_function_env(&func, arguments);
            let evaluated = eval_block_statement(&func.body, &call_env);
            unwrap_return_value(evaluated)
        }
        Value::Builtin(builtin) => builtin(&arguments),
        other => Value::error(format!("not a function: {}", other.type_name())),
    }
}

/// Binds parameters positionally; extra arguments are ignored and missing
/// ones are simply never defined, surfacing later as "identifier not found".
fn extend_function_env(func: &FunctionValue, arguments: Vec<Value>) -> Env {
    let call_env = Environment::new_enclosed(&func.env);
    for (parameter, argument) in func.parameters.iter().zip(arguments) {
        call_env.borrow_mut().define(parameter.value.clone(), argument);
    }
    call_env
}

fn unwrap_return_value(value: Value) -> Value {
    match value {
        Value::ReturnValue(inner) => *inner,
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;
    use crate::parser::Parser;

    fn eval_source(input: &str) -> Value {
        let lexer = Lexer::new(input);
        let mut parser = Parser::new(lexer);
        let program = parser.parse_program();
        assert!(parser.errors().is_empty(), "parser errors: {:?}", parser.errors());
        let env = Environment::new();
        eval_program(&program, &env)
    }

    #[test]
    fn integer_arithmetic_follows_operator_precedence() {
        assert_eq!(eval_source("5 + 5 * 2"), Value::Integer(15));
    }

    #[test]
    fn boolean_infix_expressions_compare_by_value() {
        assert_eq!(eval_source("(1 < 2) == true"), Value::Boolean(true));
    }

    #[test]
    fn if_else_picks_the_alternative_when_condition_is_falsy() {
        assert_eq!(eval_source("if (1 > 2) { 10 } else { 20 }"), Value::Integer(20));
    }

    #[test]
    fn function_application_binds_parameters_and_evaluates_the_body() {
        assert_eq!(
            eval_source("let add = fn(a, b) { a + b; }; add(3, 4);"),
            Value::Integer(7)
        );
    }

    #[test]
    fn closures_capture_their_defining_environment_by_reference() {
        assert_eq!(
            eval_source(
                "let newAdder = fn(x) { fn(y) { x + y }; }; let addTwo = newAdder(2); addTwo(3);"
            ),
            Value::Integer(5)
        );
    }

    #[test]
    fn unbound_identifier_is_a_runtime_error() {
        assert_eq!(eval_source("foobar"), Value::error("identifier not found: foobar"));
    }

    #[test]
    fn division_by_zero_is_a_runtime_error_not_a_panic() {
        assert_eq!(eval_source("10 / 0;"), Value::error("division by zero"));
    }

    #[test]
    fn mismatched_operand_types_are_a_runtime_error() {
        assert_eq!(
            eval_source("5 + true;"),
            Value::error("type mismatch: INTEGER + BOOLEAN")
        );
    }

    #[test]
    fn len_builtin_reports_string_byte_length() {
        assert_eq!(eval_source(r#"len("hello")"#), Value::Integer(5));
    }

    #[test]
    fn a_return_inside_nested_blocks_stops_at_the_function_boundary() {
        let source = "let f = fn(x) { if (x > 0) { return 1; } return 0; }; f(5);";
        assert_eq!(eval_source(source), Value::Integer(1));
    }

    #[test]
    fn mutating_an_environment_after_closure_creation_is_visible_inside_it() {
        let env = Environment::new();
        let lexer = Lexer::new("let f = fn() { x; };");
        let mut parser = Parser::new(lexer);
        let program = parser.parse_program();
        eval_program(&program, &env);

        env.borrow_mut().define("x", Value::Integer(99));

        let Some(Value::Function(func)) = env.borrow().get("f") else {
            panic!("expected f to be bound to a function");
        };
        let call_env = extend_function_env(&func, vec![]);
        assert_eq!(eval_block_statement(&func.body, &call_env), Value::Integer(99));
    }
}
