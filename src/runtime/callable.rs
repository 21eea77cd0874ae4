use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use crate::ast::FunctionDecl;
use crate::runtime::environment::EnvStack;
use crate::runtime::error::RuntimeError;
use crate::runtime::object::Object;

/// A native function a host exposes to scripts under a name.
///
/// Arguments arrive already evaluated, left to right, as independent copies.
pub trait HostFunction: Send + Sync {
    fn call(&self, env: &mut EnvStack, args: Vec<Object>) -> Result<Object, RuntimeError>;
}

impl<F> HostFunction for F
where
    F: Fn(&mut EnvStack, Vec<Object>) -> Result<Object, RuntimeError> + Send + Sync,
{
    fn call(&self, env: &mut EnvStack, args: Vec<Object>) -> Result<Object, RuntimeError> {
        self(env, args)
    }
}

/// Entry in an environment's function namespace.
#[derive(Clone)]
pub enum Callable {
    Script(Rc<FunctionDecl>),
    Host(Arc<dyn HostFunction>),
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Callable::Script(decl) => {
                write!(f, "<function {}({})>", decl.name, decl.params.join(", "))
            }
            Callable::Host(_) => f.write_str("<host function>"),
        }
    }
}
