//! Object model shared by the interpreter and embedding hosts.

pub(crate) mod array;
pub(crate) mod boolean;
pub mod callable;
pub mod environment;
pub mod error;
pub(crate) mod number;
pub mod object;
pub mod registry;
pub(crate) mod string;

pub use callable::{Callable, HostFunction};
pub use environment::EnvStack;
pub use error::RuntimeError;
pub use object::{HostObject, InternalObject, Object};
pub use registry::{ObjectFactory, TypeRegistry, host_factory};
