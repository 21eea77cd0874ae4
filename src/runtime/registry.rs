//! Named type factories backing `new TypeName(args)`.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::runtime::error::RuntimeError;
use crate::runtime::object::{HostObject, InternalObject, Object};

/// Builds the default value of one named type.
pub trait ObjectFactory: Send + Sync {
    fn create(&self) -> InternalObject;
}

impl<F> ObjectFactory for F
where
    F: Fn() -> InternalObject + Send + Sync,
{
    fn create(&self) -> InternalObject {
        self()
    }
}

/// Factory for a host type constructed from its `Default` value.
pub fn host_factory<T>() -> impl ObjectFactory
where
    T: HostObject + Default + 'static,
{
    || InternalObject::Host(Box::new(T::default()))
}

#[derive(Clone)]
pub struct TypeRegistry {
    factories: FxHashMap<String, Arc<dyn ObjectFactory>>,
}

impl TypeRegistry {
    fn empty() -> Self {
        Self {
            factories: FxHashMap::default(),
        }
    }

    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        let builtins: [(&str, fn() -> InternalObject); 5] = [
            ("None", || InternalObject::None),
            ("Boolean", || InternalObject::Boolean(false)),
            ("Number", || InternalObject::Number(0.0)),
            ("String", || InternalObject::String(String::new())),
            ("Array", || InternalObject::Array(Vec::new())),
        ];
        for (name, factory) in builtins {
            registry
                .factories
                .insert(name.to_string(), Arc::new(factory));
        }
        registry
    }

    pub fn register(
        &mut self,
        name: impl Into<String>,
        factory: impl ObjectFactory + 'static,
    ) -> Result<(), RuntimeError> {
        let name = name.into();
        if self.factories.contains_key(&name) {
            return Err(RuntimeError::Redeclaration { kind: "type", name });
        }
        self.factories.insert(name, Arc::new(factory));
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Default-constructs `name`, then hands `args` to the new value.
    pub fn construct(&self, name: &str, args: Vec<Object>) -> Result<Object, RuntimeError> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| RuntimeError::UnknownType {
                name: name.to_string(),
            })?;
        let object = Object::new(factory.create());
        object.initialize(args)?;
        Ok(object)
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl std::fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&str> = self.names().collect();
        names.sort_unstable();
        f.debug_struct("TypeRegistry").field("types", &names).finish()
    }
}
