use tracing::trace;

use super::signal::{Exec, Signal};
use super::{Interpreter, MAX_CALL_DEPTH};
use crate::ast::{BinaryOperator, Expression, FunctionDecl, Literal, LogicalOperator, StepOperator};
use crate::runtime::callable::Callable;
use crate::runtime::environment::EnvStack;
use crate::runtime::error::RuntimeError;
use crate::runtime::object::Object;
use crate::stack;

impl Interpreter<'_> {
    /// Evaluates to a value or, for variables and subscripts of them, an
    /// assignable slot.
    pub(super) fn eval_expression(
        &mut self,
        expression: &Expression,
        env: &mut EnvStack,
    ) -> Exec<Object> {
        stack::ensure_sufficient_stack(|| self.eval_node(expression, env))
    }

    fn eval_node(&mut self, expression: &Expression, env: &mut EnvStack) -> Exec<Object> {
        match expression {
            Expression::Literal(literal) => Ok(match literal {
                Literal::Number(value) => Object::number(*value),
                Literal::String(value) => Object::string(value.clone()),
                Literal::Boolean(value) => Object::boolean(*value),
            }),
            Expression::Variable(name) => Ok(env.get(name)?),
            Expression::Array(elements) => Ok(Object::array(self.eval_arguments(elements, env)?)),
            Expression::Unary { op, operand } => {
                let operand = self.eval_expression(operand, env)?;
                Ok(operand.unary(*op)?)
            }
            Expression::Binary { left, op, right } => {
                let left = self.eval_expression(left, env)?;
                let right = self.eval_expression(right, env)?;
                Ok(left.binary(*op, &right)?)
            }
            Expression::Logical { left, op, right } => {
                let left = self.eval_expression(left, env)?.is_truthy();
                let result = match (op, left) {
                    (LogicalOperator::And, false) => false,
                    (LogicalOperator::Or, true) => true,
                    _ => self.eval_expression(right, env)?.is_truthy(),
                };
                Ok(Object::boolean(result))
            }
            Expression::Assign {
                target,
                mode,
                value,
            } => {
                let slot = self.eval_expression(target, env)?;
                let value = self.eval_expression(value, env)?;
                let value = match mode.operator() {
                    Some(op) => slot.binary(op, &value)?,
                    None => value,
                };
                slot.assign(&value)?;
                Ok(slot)
            }
            Expression::Step {
                target,
                op,
                postfix,
            } => {
                let slot = self.eval_expression(target, env)?;
                let previous = slot.duplicate();
                let op = match op {
                    StepOperator::Increment => BinaryOperator::Add,
                    StepOperator::Decrement => BinaryOperator::Sub,
                };
                let next = slot.binary(op, &Object::number(1.0))?;
                slot.assign(&next)?;
                Ok(if *postfix { previous } else { next })
            }
            Expression::Index { object, index } => {
                let object = self.eval_expression(object, env)?;
                let index = self.eval_value(index, env)?;
                Ok(object.subscript(&index)?)
            }
            Expression::Member { object, name, args } => {
                let object = self.eval_expression(object, env)?;
                let args = match args {
                    Some(args) => self.eval_arguments(args, env)?,
                    None => Vec::new(),
                };
                Ok(object.call_member(name, args)?)
            }
            Expression::Call { name, args } => {
                let callable = env.get_function(name)?;
                let args = self.eval_arguments(args, env)?;
                match callable {
                    Callable::Script(decl) => self.call_function(&decl, args, env),
                    Callable::Host(function) => {
                        trace!(function = %name, args = args.len(), "host call");
                        Ok(function.call(env, args)?)
                    }
                }
            }
            Expression::New { type_name, args } => {
                let args = self.eval_arguments(args, env)?;
                Ok(self.types.construct(type_name, args)?)
            }
        }
    }

    /// Evaluates to an independent value, never a slot.
    pub(super) fn eval_value(
        &mut self,
        expression: &Expression,
        env: &mut EnvStack,
    ) -> Exec<Object> {
        let value = self.eval_expression(expression, env)?;
        Ok(if value.is_lvalue() {
            value.duplicate()
        } else {
            value
        })
    }

    /// Left to right, each argument copied before the call sees it.
    pub(super) fn eval_arguments(
        &mut self,
        args: &[Expression],
        env: &mut EnvStack,
    ) -> Exec<Vec<Object>> {
        args.iter()
            .map(|arg| self.eval_value(arg, env))
            .collect()
    }

    fn call_function(
        &mut self,
        decl: &FunctionDecl,
        args: Vec<Object>,
        env: &mut EnvStack,
    ) -> Exec<Object> {
        RuntimeError::expect_arity(&decl.name, decl.params.len(), args.len())?;
        if self.call_depth >= MAX_CALL_DEPTH {
            return Err(Signal::from(RuntimeError::StackOverflow {
                limit: MAX_CALL_DEPTH,
            }));
        }
        trace!(function = %decl.name, depth = self.call_depth, "call");
        self.call_depth += 1;
        let result = stack::ensure_sufficient_stack(|| {
            env.function_scoped(|env| {
                for (param, arg) in decl.params.iter().zip(&args) {
                    env.declare(param, arg)?;
                }
                self.exec_block(&decl.body.statements, env)
            })
        });
        self.call_depth -= 1;
        match result {
            Ok(()) => Ok(Object::none()),
            Err(Signal::Return(value, _)) => Ok(value),
            Err(signal) => Err(signal.escaped_loop()),
        }
    }
}
