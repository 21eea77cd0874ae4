//! Array operators and members.
//!
//! Elements are stored as independent values: everything pushed, inserted
//! or appended is duplicated first, and everything handed back out is a copy.

use crate::runtime::error::RuntimeError;
use crate::runtime::number::{expect_number, render};
use crate::runtime::object::Object;

/// `array + value`: a new array with a copy of `value` appended.
pub(crate) fn append(items: &[Object], value: &Object) -> Object {
    let mut copy: Vec<Object> = items.iter().map(Object::duplicate).collect();
    copy.push(value.duplicate());
    Object::array(copy)
}

/// Converts a script value into a non-negative whole index.
pub(crate) fn to_index(index: &Object) -> Result<usize, RuntimeError> {
    let value = expect_number("[]", index)?;
    if value.fract() != 0.0 || !value.is_finite() {
        return Err(RuntimeError::InvalidIndex {
            index: render(value),
        });
    }
    if value < 0.0 {
        return Err(RuntimeError::NegativeIndex {
            index: value as i64,
        });
    }
    Ok(value as usize)
}

/// Borrowed element at `index`; callers decide whether to share or copy it.
pub(crate) fn element<'a>(items: &'a [Object], index: &Object) -> Result<&'a Object, RuntimeError> {
    let index = to_index(index)?;
    items.get(index).ok_or(RuntimeError::IndexOutOfBounds {
        index,
        len: items.len(),
    })
}

pub(crate) fn call_member(
    items: &mut Vec<Object>,
    name: &str,
    args: Vec<Object>,
) -> Result<Object, RuntimeError> {
    match name {
        "size" => {
            RuntimeError::expect_arity(name, 0, args.len())?;
            Ok(Object::number(items.len() as f64))
        }
        "push" => {
            RuntimeError::expect_arity(name, 1, args.len())?;
            items.extend(args.iter().map(Object::duplicate));
            Ok(Object::none())
        }
        "pop" => {
            RuntimeError::expect_arity(name, 0, args.len())?;
            items
                .pop()
                .ok_or(RuntimeError::IndexOutOfBounds { index: 0, len: 0 })
        }
        "insert" => {
            RuntimeError::expect_arity(name, 2, args.len())?;
            let index = to_index(&args[0])?;
            if index > items.len() {
                return Err(RuntimeError::IndexOutOfBounds {
                    index,
                    len: items.len(),
                });
            }
            items.insert(index, args[1].duplicate());
            Ok(Object::none())
        }
        "remove" => {
            RuntimeError::expect_arity(name, 1, args.len())?;
            let index = to_index(&args[0])?;
            if index >= items.len() {
                return Err(RuntimeError::IndexOutOfBounds {
                    index,
                    len: items.len(),
                });
            }
            Ok(items.remove(index))
        }
        "clear" => {
            RuntimeError::expect_arity(name, 0, args.len())?;
            items.clear();
            Ok(Object::none())
        }
        "contains" => {
            RuntimeError::expect_arity(name, 1, args.len())?;
            let position = position_of(items, &args[0])?;
            Ok(Object::boolean(position.is_some()))
        }
        "index_of" => {
            RuntimeError::expect_arity(name, 1, args.len())?;
            let position = position_of(items, &args[0])?;
            Ok(Object::number(position.map_or(-1.0, |index| index as f64)))
        }
        _ => Err(RuntimeError::UnknownMember {
            member: name.to_string(),
            type_name: "Array".to_string(),
        }),
    }
}

fn position_of(items: &[Object], needle: &Object) -> Result<Option<usize>, RuntimeError> {
    for (index, item) in items.iter().enumerate() {
        if item.equals(needle)? {
            return Ok(Some(index));
        }
    }
    Ok(None)
}
