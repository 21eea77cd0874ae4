use std::rc::Rc;

use tracing::trace;

use super::Interpreter;
use super::format;
use super::signal::{Exec, Signal};
use crate::ast::{Block, Expression, Statement, StatementKind};
use crate::runtime::callable::Callable;
use crate::runtime::environment::EnvStack;
use crate::runtime::error::RuntimeError;
use crate::runtime::object::Object;
use crate::stack;
use crate::token::Span;

/// What a loop does after one pass over its body.
enum LoopStep {
    Next,
    Stop,
}

impl Interpreter<'_> {
    pub(super) fn exec_block(&mut self, statements: &[Statement], env: &mut EnvStack) -> Exec<()> {
        for statement in statements {
            self.exec_statement(statement, env)?;
        }
        Ok(())
    }

    fn exec_statement(&mut self, statement: &Statement, env: &mut EnvStack) -> Exec<()> {
        stack::ensure_sufficient_stack(|| self.exec_kind(&statement.kind, statement.span, env))
            .map_err(|signal| signal.located(statement.span))
    }

    fn exec_kind(&mut self, kind: &StatementKind, span: Span, env: &mut EnvStack) -> Exec<()> {
        match kind {
            StatementKind::Expr(expression) => {
                self.eval_expression(expression, env)?;
                Ok(())
            }
            StatementKind::Declare { name, initializer } => {
                let value = match initializer {
                    Some(expression) => self.eval_expression(expression, env)?,
                    None => Object::none(),
                };
                env.declare(name, &value)?;
                Ok(())
            }
            StatementKind::Block(block) => self.exec_scoped(block, env),
            StatementKind::If {
                branches,
                else_block,
            } => {
                for (condition, block) in branches {
                    if self.eval_expression(condition, env)?.is_truthy() {
                        return self.exec_scoped(block, env);
                    }
                }
                match else_block {
                    Some(block) => self.exec_scoped(block, env),
                    None => Ok(()),
                }
            }
            StatementKind::While { condition, body } => env.scoped(|env| {
                while self.eval_expression(condition, env)?.is_truthy() {
                    if let LoopStep::Stop = self.exec_loop_body(body, env)? {
                        break;
                    }
                }
                Ok(())
            }),
            StatementKind::For {
                init,
                test,
                update,
                body,
            } => env.scoped(|env| {
                if let Some(init) = init {
                    self.exec_statement(init, env)?;
                }
                loop {
                    if let Some(test) = test
                        && !self.eval_expression(test, env)?.is_truthy()
                    {
                        break;
                    }
                    if let LoopStep::Stop = self.exec_loop_body(body, env)? {
                        break;
                    }
                    if let Some(update) = update {
                        self.eval_expression(update, env)?;
                    }
                }
                Ok(())
            }),
            StatementKind::Break => Err(Signal::Break(span)),
            StatementKind::Continue => Err(Signal::Continue(span)),
            StatementKind::Return(value) => {
                let value = self.eval_optional(value.as_ref(), env)?;
                Err(Signal::Return(value, span))
            }
            StatementKind::Exit(value) => {
                let value = self.eval_optional(value.as_ref(), env)?;
                trace!(value = %value.to_output(), "exit");
                Err(Signal::Exit(value))
            }
            StatementKind::Print { format, args } => {
                let args = self.eval_arguments(args, env)?;
                let line = format::render(format, &args)?;
                writeln!(self.output, "{line}").map_err(|error| RuntimeError::Output {
                    message: error.to_string(),
                })?;
                Ok(())
            }
            StatementKind::Function(decl) => {
                env.declare_function(&decl.name, Callable::Script(Rc::clone(decl)))?;
                Ok(())
            }
        }
    }

    fn exec_scoped(&mut self, block: &Block, env: &mut EnvStack) -> Exec<()> {
        env.scoped(|env| self.exec_block(&block.statements, env))
    }

    /// One iteration in its own scope. Break and continue stop here; every
    /// other signal keeps unwinding.
    fn exec_loop_body(&mut self, body: &Block, env: &mut EnvStack) -> Exec<LoopStep> {
        match self.exec_scoped(body, env) {
            Ok(()) | Err(Signal::Continue(_)) => Ok(LoopStep::Next),
            Err(Signal::Break(_)) => Ok(LoopStep::Stop),
            Err(signal) => Err(signal),
        }
    }

    fn eval_optional(&mut self, value: Option<&Expression>, env: &mut EnvStack) -> Exec<Object> {
        match value {
            Some(expression) => self.eval_value(expression, env),
            None => Ok(Object::none()),
        }
    }
}
