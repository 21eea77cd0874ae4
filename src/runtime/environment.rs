//! Scope frames and the stack that manages them.
//!
//! Frames live in a flat vector and refer to their parent by index. Block
//! scopes chain to the frame below them; function frames chain straight to
//! the global frame, so a function body sees globals and its own parameters
//! but never its caller's locals.

use rustc_hash::FxHashMap;
use tracing::trace;

use crate::runtime::callable::Callable;
use crate::runtime::error::RuntimeError;
use crate::runtime::object::Object;

const GLOBAL_FRAME: usize = 0;

#[derive(Debug, Default)]
pub(crate) struct Environment {
    variables: FxHashMap<String, Object>,
    functions: FxHashMap<String, Callable>,
    parent: Option<usize>,
}

impl Environment {
    fn with_parent(parent: usize) -> Self {
        Self {
            parent: Some(parent),
            ..Self::default()
        }
    }
}

#[derive(Debug)]
pub struct EnvStack {
    frames: Vec<Environment>,
}

impl Default for EnvStack {
    fn default() -> Self {
        Self::new()
    }
}

impl EnvStack {
    pub fn new() -> Self {
        Self {
            frames: vec![Environment::default()],
        }
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn enter_scope(&mut self) {
        let parent = self.top_index();
        self.frames.push(Environment::with_parent(parent));
        trace!(depth = self.depth(), "enter scope");
    }

    pub fn enter_function_scope(&mut self) {
        self.frames.push(Environment::with_parent(GLOBAL_FRAME));
        trace!(depth = self.depth(), "enter function scope");
    }

    /// Pops the top frame. The global frame is never popped.
    pub fn exit_scope(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
        }
        trace!(depth = self.depth(), "exit scope");
    }

    /// Runs `f` inside a fresh block scope, exiting it on every path.
    pub fn scoped<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.enter_scope();
        let result = f(self);
        self.exit_scope();
        result
    }

    /// Runs `f` inside a fresh function frame rooted at the global frame.
    pub fn function_scoped<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.enter_function_scope();
        let result = f(self);
        self.exit_scope();
        result
    }

    /// Binds a copy of `value` to `name` in the current frame.
    pub fn declare(&mut self, name: &str, value: &Object) -> Result<(), RuntimeError> {
        let frame = self.top_mut();
        if frame.variables.contains_key(name) {
            return Err(RuntimeError::Redeclaration {
                kind: "variable",
                name: name.to_string(),
            });
        }
        frame.variables.insert(name.to_string(), value.duplicate());
        Ok(())
    }

    /// Assignable handle to the nearest binding of `name`.
    pub fn get(&self, name: &str) -> Result<Object, RuntimeError> {
        self.lookup(|frame| frame.variables.get(name))
            .map(Object::slot)
            .ok_or_else(|| RuntimeError::UndefinedVariable {
                name: name.to_string(),
            })
    }

    pub fn has(&self, name: &str) -> bool {
        self.lookup(|frame| frame.variables.get(name)).is_some()
    }

    pub fn declare_function(&mut self, name: &str, callable: Callable) -> Result<(), RuntimeError> {
        let frame = self.top_mut();
        if frame.functions.contains_key(name) {
            return Err(RuntimeError::Redeclaration {
                kind: "function",
                name: name.to_string(),
            });
        }
        frame.functions.insert(name.to_string(), callable);
        Ok(())
    }

    /// Binds `callable` in the global frame, replacing an earlier binding.
    pub(crate) fn define_global_function(&mut self, name: &str, callable: Callable) {
        self.frames[GLOBAL_FRAME]
            .functions
            .insert(name.to_string(), callable);
    }

    pub fn get_function(&self, name: &str) -> Result<Callable, RuntimeError> {
        self.lookup(|frame| frame.functions.get(name))
            .cloned()
            .ok_or_else(|| RuntimeError::UndefinedFunction {
                name: name.to_string(),
            })
    }

    pub fn has_function(&self, name: &str) -> bool {
        self.lookup(|frame| frame.functions.get(name)).is_some()
    }

    fn lookup<'a, T>(&'a self, find: impl Fn(&'a Environment) -> Option<&'a T>) -> Option<&'a T> {
        let mut index = Some(self.top_index());
        while let Some(current) = index {
            let frame = self.frames.get(current)?;
            if let Some(found) = find(frame) {
                return Some(found);
            }
            index = frame.parent;
        }
        None
    }

    fn top_index(&self) -> usize {
        self.frames.len().saturating_sub(1)
    }

    fn top_mut(&mut self) -> &mut Environment {
        let index = self.top_index();
        &mut self.frames[index]
    }
}
