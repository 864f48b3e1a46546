//! Request-scoped value store.
//!
//! # Responsibilities
//! - Carry path captures and endpoint context values to handlers
//! - Let middleware push values for everything downstream
//!
//! # Design Decisions
//! - Persistent linked list: `with` returns a new scope, parents are shared
//!   and never mutated, so clones are cheap and safe across tasks
//! - Lookups walk from the newest binding; a newer binding shadows older
//!   ones with the same name
//! - Travels in `Request::extensions`

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Type-erased value held in a [`Scope`].
pub type ScopeValue = Arc<dyn Any + Send + Sync>;

struct Binding {
    name: Box<str>,
    value: ScopeValue,
    parent: Option<Arc<Binding>>,
}

/// Immutable, append-only map of named values.
#[derive(Clone, Default)]
pub struct Scope {
    head: Option<Arc<Binding>>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a scope that adds `name = value` on top of this one.
    pub fn with<T: Any + Send + Sync>(&self, name: impl Into<Box<str>>, value: T) -> Self {
        self.with_shared(name, Arc::new(value))
    }

    /// Like [`Scope::with`] for a value that is already shared.
    pub fn with_shared(&self, name: impl Into<Box<str>>, value: ScopeValue) -> Self {
        Self {
            head: Some(Arc::new(Binding {
                name: name.into(),
                value,
                parent: self.head.clone(),
            })),
        }
    }

    /// The newest value bound to `name`, if it has type `T`.
    pub fn get<T: Any>(&self, name: &str) -> Option<&T> {
        self.lookup(name)?.downcast_ref::<T>()
    }

    /// A captured path parameter (or any value stored as a `String`).
    pub fn param(&self, name: &str) -> Option<&str> {
        self.get::<String>(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    fn lookup(&self, name: &str) -> Option<&(dyn Any + Send + Sync)> {
        self.bindings()
            .find(|binding| &*binding.name == name)
            .map(|binding| &*binding.value)
    }

    fn bindings(&self) -> impl Iterator<Item = &Binding> {
        std::iter::successors(self.head.as_deref(), |binding| binding.parent.as_deref())
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.bindings().map(|binding| &*binding.name))
            .finish()
    }
}
