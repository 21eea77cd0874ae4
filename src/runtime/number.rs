//! Number operators and members.

use crate::ast::BinaryOperator;
use crate::runtime::error::RuntimeError;
use crate::runtime::object::Object;

pub(crate) fn render(value: f64) -> String {
    if value == 0.0 {
        // Avoid printing "-0".
        return "0".to_string();
    }
    value.to_string()
}

pub(crate) fn binary(lhs: f64, op: BinaryOperator, rhs: f64) -> Result<Object, RuntimeError> {
    let result = match op {
        BinaryOperator::Add => Object::number(lhs + rhs),
        BinaryOperator::Sub => Object::number(lhs - rhs),
        BinaryOperator::Mul => Object::number(lhs * rhs),
        BinaryOperator::Div => {
            if rhs == 0.0 {
                return Err(RuntimeError::DivisionByZero);
            }
            Object::number(lhs / rhs)
        }
        BinaryOperator::Mod => {
            if rhs == 0.0 {
                return Err(RuntimeError::DivisionByZero);
            }
            Object::number(lhs % rhs)
        }
        BinaryOperator::Equal => Object::boolean(lhs == rhs),
        BinaryOperator::NotEqual => Object::boolean(lhs != rhs),
        BinaryOperator::Less => Object::boolean(lhs < rhs),
        BinaryOperator::LessEqual => Object::boolean(lhs <= rhs),
        BinaryOperator::Greater => Object::boolean(lhs > rhs),
        BinaryOperator::GreaterEqual => Object::boolean(lhs >= rhs),
    };
    Ok(result)
}

pub(crate) fn call_member(
    value: f64,
    name: &str,
    args: Vec<Object>,
) -> Result<Object, RuntimeError> {
    let result = match name {
        "floor" => value.floor(),
        "ceil" => value.ceil(),
        "round" => value.round(),
        "abs" => value.abs(),
        "to_string" => {
            RuntimeError::expect_arity(name, 0, args.len())?;
            return Ok(Object::string(render(value)));
        }
        _ => {
            return Err(RuntimeError::UnknownMember {
                member: name.to_string(),
                type_name: "Number".to_string(),
            });
        }
    };
    RuntimeError::expect_arity(name, 0, args.len())?;
    Ok(Object::number(result))
}

/// Extracts a Number argument for `operation`.
pub(crate) fn expect_number(operation: &str, arg: &Object) -> Result<f64, RuntimeError> {
    arg.as_number()
        .ok_or_else(|| RuntimeError::InvalidArgumentType {
            operation: operation.to_string(),
            expected: "Number".to_string(),
            got: arg.type_name(),
        })
}
