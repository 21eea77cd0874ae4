//! Value handles and payloads.
//!
//! An [`Object`] is a handle to a shared [`InternalObject`] payload. Values
//! have copy semantics: every binding, argument, return value and operator
//! result owns a fresh payload. The only handles that share a payload are
//! lvalue slots, produced by variable references and by subscripting an
//! lvalue, which is how assignment and in-place member calls reach the stored
//! value.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::ast::{BinaryOperator, UnaryOperator};
use crate::runtime::error::RuntimeError;
use crate::runtime::{array, boolean, number, string};

/// Extension point for host-defined types.
///
/// Every capability except naming, cloning and downcasting has a default that
/// fails with a typed error, so a host type only implements what it supports.
pub trait HostObject: fmt::Debug {
    fn type_name(&self) -> &str;

    /// Deep copy used when the value is bound, passed or returned.
    fn clone_object(&self) -> Box<dyn HostObject>;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Receives the arguments of `new TypeName(args)` after default construction.
    fn initialize(&mut self, args: Vec<Object>) -> Result<(), RuntimeError> {
        RuntimeError::expect_arity(self.type_name(), 0, args.len())
    }

    /// Binary operators, including `==` and `!=` (which must yield a Boolean).
    fn binary(&self, op: BinaryOperator, rhs: &Object) -> Result<Object, RuntimeError> {
        Err(RuntimeError::UnsupportedOperator {
            operator: op.symbol(),
            left: self.type_name().to_string(),
            right: rhs.type_name(),
        })
    }

    fn unary(&self, op: UnaryOperator) -> Result<Object, RuntimeError> {
        Err(RuntimeError::UnsupportedOperation {
            operation: unary_symbol(op),
            type_name: self.type_name().to_string(),
        })
    }

    fn subscript(&self, _index: &Object) -> Result<Object, RuntimeError> {
        Err(RuntimeError::UnsupportedOperation {
            operation: "[]",
            type_name: self.type_name().to_string(),
        })
    }

    fn is_truthy(&self) -> bool {
        true
    }

    fn to_output(&self) -> String {
        format!("<{}>", self.type_name())
    }

    fn call_member(&mut self, name: &str, _args: Vec<Object>) -> Result<Object, RuntimeError> {
        Err(RuntimeError::UnknownMember {
            member: name.to_string(),
            type_name: self.type_name().to_string(),
        })
    }
}

#[derive(Debug)]
pub enum InternalObject {
    None,
    Boolean(bool),
    Number(f64),
    String(String),
    Array(Vec<Object>),
    Host(Box<dyn HostObject>),
}

impl Clone for InternalObject {
    fn clone(&self) -> Self {
        match self {
            Self::None => Self::None,
            Self::Boolean(value) => Self::Boolean(*value),
            Self::Number(value) => Self::Number(*value),
            Self::String(value) => Self::String(value.clone()),
            Self::Array(items) => Self::Array(items.iter().map(Object::duplicate).collect()),
            Self::Host(host) => Self::Host(host.clone_object()),
        }
    }
}

impl InternalObject {
    pub fn type_name(&self) -> &str {
        match self {
            Self::None => "None",
            Self::Boolean(_) => "Boolean",
            Self::Number(_) => "Number",
            Self::String(_) => "String",
            Self::Array(_) => "Array",
            Self::Host(host) => host.type_name(),
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Self::None => false,
            Self::Boolean(value) => *value,
            Self::Number(value) => *value != 0.0,
            Self::String(value) => !value.is_empty(),
            Self::Array(items) => !items.is_empty(),
            Self::Host(host) => host.is_truthy(),
        }
    }

    pub fn to_output(&self) -> String {
        match self {
            Self::None => "none".to_string(),
            Self::Boolean(value) => value.to_string(),
            Self::Number(value) => number::render(*value),
            Self::String(value) => value.clone(),
            Self::Array(items) => {
                let rendered = items
                    .iter()
                    .map(Object::to_output)
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{{{rendered}}}")
            }
            Self::Host(host) => host.to_output(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Object {
    lvalue: bool,
    payload: Rc<RefCell<InternalObject>>,
}

impl Object {
    pub fn new(internal: InternalObject) -> Self {
        Self {
            lvalue: false,
            payload: Rc::new(RefCell::new(internal)),
        }
    }

    pub fn none() -> Self {
        Self::new(InternalObject::None)
    }

    pub fn boolean(value: bool) -> Self {
        Self::new(InternalObject::Boolean(value))
    }

    pub fn number(value: f64) -> Self {
        Self::new(InternalObject::Number(value))
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::new(InternalObject::String(value.into()))
    }

    pub fn array(items: Vec<Object>) -> Self {
        Self::new(InternalObject::Array(items))
    }

    pub fn host(object: Box<dyn HostObject>) -> Self {
        Self::new(InternalObject::Host(object))
    }

    /// Assignable handle sharing this object's payload.
    pub(crate) fn slot(&self) -> Self {
        Self {
            lvalue: true,
            payload: Rc::clone(&self.payload),
        }
    }

    pub fn is_lvalue(&self) -> bool {
        self.lvalue
    }

    /// Fresh, independent copy of the value.
    pub fn duplicate(&self) -> Self {
        Self::new(self.payload.borrow().clone())
    }

    pub fn type_name(&self) -> String {
        self.payload.borrow().type_name().to_string()
    }

    pub fn is_none(&self) -> bool {
        matches!(*self.payload.borrow(), InternalObject::None)
    }

    pub fn is_truthy(&self) -> bool {
        self.payload.borrow().is_truthy()
    }

    pub fn to_output(&self) -> String {
        self.payload.borrow().to_output()
    }

    pub fn as_number(&self) -> Option<f64> {
        match *self.payload.borrow() {
            InternalObject::Number(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match *self.payload.borrow() {
            InternalObject::Boolean(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<String> {
        match &*self.payload.borrow() {
            InternalObject::String(value) => Some(value.clone()),
            _ => None,
        }
    }

    /// Runs `f` against the host payload when it is of type `T`.
    pub fn with_host<T: 'static, R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        match &*self.payload.borrow() {
            InternalObject::Host(host) => host.as_any().downcast_ref::<T>().map(f),
            _ => None,
        }
    }

    pub fn binary(&self, op: BinaryOperator, rhs: &Object) -> Result<Object, RuntimeError> {
        match op {
            BinaryOperator::Equal => return self.equals(rhs).map(Object::boolean),
            BinaryOperator::NotEqual => {
                return self.equals(rhs).map(|equal| Object::boolean(!equal));
            }
            _ => {}
        }
        let left = self.payload.borrow();
        let right = rhs.payload.borrow();
        match (&*left, &*right) {
            (InternalObject::Number(a), InternalObject::Number(b)) => number::binary(*a, op, *b),
            (InternalObject::String(a), InternalObject::String(b)) => string::binary(a, op, b),
            (InternalObject::Array(items), _) if op == BinaryOperator::Add => {
                Ok(array::append(items, rhs))
            }
            (InternalObject::Host(host), _) => host.binary(op, rhs),
            (left, right) => Err(RuntimeError::UnsupportedOperator {
                operator: op.symbol(),
                left: left.type_name().to_string(),
                right: right.type_name().to_string(),
            }),
        }
    }

    /// `==` semantics: values of different types are never equal; arrays
    /// compare length, then elements pairwise.
    pub fn equals(&self, rhs: &Object) -> Result<bool, RuntimeError> {
        let left = self.payload.borrow();
        let right = rhs.payload.borrow();
        match (&*left, &*right) {
            (InternalObject::None, InternalObject::None) => Ok(true),
            (InternalObject::Boolean(a), InternalObject::Boolean(b)) => Ok(a == b),
            (InternalObject::Number(a), InternalObject::Number(b)) => Ok(a == b),
            (InternalObject::String(a), InternalObject::String(b)) => Ok(a == b),
            (InternalObject::Array(a), InternalObject::Array(b)) => {
                if a.len() != b.len() {
                    return Ok(false);
                }
                for (left, right) in a.iter().zip(b) {
                    if !left.equals(right)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            (InternalObject::Host(host), _) => {
                let result = host.binary(BinaryOperator::Equal, rhs)?;
                result
                    .as_bool()
                    .ok_or_else(|| RuntimeError::InvalidArgumentType {
                        operation: "==".to_string(),
                        expected: "Boolean".to_string(),
                        got: result.type_name(),
                    })
            }
            _ => Ok(false),
        }
    }

    pub fn unary(&self, op: UnaryOperator) -> Result<Object, RuntimeError> {
        match (&*self.payload.borrow(), op) {
            (InternalObject::Number(value), UnaryOperator::Negate) => Ok(Object::number(-value)),
            (InternalObject::Boolean(value), UnaryOperator::Not) => Ok(Object::boolean(!value)),
            (InternalObject::Host(host), op) => host.unary(op),
            (other, op) => Err(RuntimeError::UnsupportedOperation {
                operation: unary_symbol(op),
                type_name: other.type_name().to_string(),
            }),
        }
    }

    /// Element access. Subscripting an lvalue array yields an lvalue slot for
    /// the element; every other case yields a copy.
    pub fn subscript(&self, index: &Object) -> Result<Object, RuntimeError> {
        match &*self.payload.borrow() {
            InternalObject::Array(items) => {
                let element = array::element(items, index)?;
                Ok(if self.lvalue {
                    element.slot()
                } else {
                    element.duplicate()
                })
            }
            InternalObject::String(value) => string::char_at(value, index),
            InternalObject::Host(host) => host.subscript(index),
            other => Err(RuntimeError::UnsupportedOperation {
                operation: "[]",
                type_name: other.type_name().to_string(),
            }),
        }
    }

    pub fn call_member(&self, name: &str, args: Vec<Object>) -> Result<Object, RuntimeError> {
        match &mut *self.payload.borrow_mut() {
            InternalObject::None => Err(RuntimeError::UnknownMember {
                member: name.to_string(),
                type_name: "None".to_string(),
            }),
            InternalObject::Boolean(value) => boolean::call_member(*value, name, args),
            InternalObject::Number(value) => number::call_member(*value, name, args),
            InternalObject::String(value) => string::call_member(value, name, args),
            InternalObject::Array(items) => array::call_member(items, name, args),
            InternalObject::Host(host) => host.call_member(name, args),
        }
    }

    /// Stores a copy of `value` into this slot. A slot holding None accepts
    /// any type; otherwise the type must match.
    pub fn assign(&self, value: &Object) -> Result<(), RuntimeError> {
        if !self.lvalue {
            return Err(RuntimeError::NotAssignable {
                type_name: self.type_name(),
            });
        }
        let replacement = value.payload.borrow().clone();
        let mut slot = self.payload.borrow_mut();
        if !matches!(*slot, InternalObject::None) && slot.type_name() != replacement.type_name() {
            return Err(RuntimeError::TypeMismatch {
                expected: slot.type_name().to_string(),
                got: replacement.type_name().to_string(),
            });
        }
        *slot = replacement;
        Ok(())
    }

    /// Applies `new TypeName(args)` arguments to a default-constructed value.
    pub(crate) fn initialize(&self, args: Vec<Object>) -> Result<(), RuntimeError> {
        let mut payload = self.payload.borrow_mut();
        let type_name = payload.type_name().to_string();
        match &mut *payload {
            InternalObject::None => RuntimeError::expect_arity(&type_name, 0, args.len()),
            InternalObject::Array(items) => {
                *items = args;
                Ok(())
            }
            InternalObject::Host(host) => host.initialize(args),
            scalar => {
                if args.len() > 1 {
                    return Err(RuntimeError::ArityMismatch {
                        name: type_name,
                        expected: 1,
                        found: args.len(),
                    });
                }
                let Some(arg) = args.into_iter().next() else {
                    return Ok(());
                };
                let value = arg.payload.borrow().clone();
                if value.type_name() != type_name {
                    return Err(RuntimeError::InvalidArgumentType {
                        operation: format!("new {type_name}"),
                        expected: type_name,
                        got: value.type_name().to_string(),
                    });
                }
                *scalar = value;
                Ok(())
            }
        }
    }
}

pub(crate) fn unary_symbol(op: UnaryOperator) -> &'static str {
    match op {
        UnaryOperator::Negate => "-",
        UnaryOperator::Not => "!",
    }
}
