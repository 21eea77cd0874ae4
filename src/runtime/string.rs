//! String operators and members. Indices count characters, not bytes.

use crate::ast::BinaryOperator;
use crate::runtime::array::to_index;
use crate::runtime::error::RuntimeError;
use crate::runtime::number::expect_number;
use crate::runtime::object::Object;

pub(crate) fn binary(lhs: &str, op: BinaryOperator, rhs: &str) -> Result<Object, RuntimeError> {
    let result = match op {
        BinaryOperator::Add => Object::string(format!("{lhs}{rhs}")),
        BinaryOperator::Equal => Object::boolean(lhs == rhs),
        BinaryOperator::NotEqual => Object::boolean(lhs != rhs),
        BinaryOperator::Less => Object::boolean(lhs < rhs),
        BinaryOperator::LessEqual => Object::boolean(lhs <= rhs),
        BinaryOperator::Greater => Object::boolean(lhs > rhs),
        BinaryOperator::GreaterEqual => Object::boolean(lhs >= rhs),
        BinaryOperator::Sub | BinaryOperator::Mul | BinaryOperator::Div | BinaryOperator::Mod => {
            return Err(RuntimeError::UnsupportedOperator {
                operator: op.symbol(),
                left: "String".to_string(),
                right: "String".to_string(),
            });
        }
    };
    Ok(result)
}

pub(crate) fn char_at(value: &str, index: &Object) -> Result<Object, RuntimeError> {
    let index = to_index(index)?;
    value
        .chars()
        .nth(index)
        .map(|ch| Object::string(ch.to_string()))
        .ok_or(RuntimeError::IndexOutOfBounds {
            index,
            len: value.chars().count(),
        })
}

pub(crate) fn call_member(
    value: &mut String,
    name: &str,
    args: Vec<Object>,
) -> Result<Object, RuntimeError> {
    match name {
        "length" => {
            RuntimeError::expect_arity(name, 0, args.len())?;
            Ok(Object::number(value.chars().count() as f64))
        }
        "upper" => {
            RuntimeError::expect_arity(name, 0, args.len())?;
            Ok(Object::string(value.to_uppercase()))
        }
        "lower" => {
            RuntimeError::expect_arity(name, 0, args.len())?;
            Ok(Object::string(value.to_lowercase()))
        }
        "substring" => {
            RuntimeError::expect_arity(name, 2, args.len())?;
            let len = value.chars().count();
            let start = to_index(&args[0])?;
            let end = to_index(&args[1])?;
            if end > len {
                return Err(RuntimeError::IndexOutOfBounds { index: end, len });
            }
            if start > end {
                return Err(RuntimeError::IndexOutOfBounds {
                    index: start,
                    len: end,
                });
            }
            Ok(Object::string(
                value.chars().skip(start).take(end - start).collect::<String>(),
            ))
        }
        "contains" => {
            RuntimeError::expect_arity(name, 1, args.len())?;
            let needle = expect_string(name, &args[0])?;
            Ok(Object::boolean(value.contains(needle.as_str())))
        }
        "index_of" => {
            RuntimeError::expect_arity(name, 1, args.len())?;
            let needle = expect_string(name, &args[0])?;
            let position = value
                .find(needle.as_str())
                .map(|byte| value[..byte].chars().count() as f64)
                .unwrap_or(-1.0);
            Ok(Object::number(position))
        }
        "char_at" => {
            RuntimeError::expect_arity(name, 1, args.len())?;
            expect_number(name, &args[0])?;
            char_at(value, &args[0])
        }
        _ => Err(RuntimeError::UnknownMember {
            member: name.to_string(),
            type_name: "String".to_string(),
        }),
    }
}

fn expect_string(operation: &str, arg: &Object) -> Result<String, RuntimeError> {
    arg.as_string()
        .ok_or_else(|| RuntimeError::InvalidArgumentType {
            operation: operation.to_string(),
            expected: "String".to_string(),
            got: arg.type_name(),
        })
}
