//! Method implementations.

use std::{fmt, sync::Arc};

use super::{error::Error, object::Object, value::Value};

/// The signature every method implementation is erased to.
///
/// The first parameter is the receiver (`self`); the slice holds the explicit arguments.
pub type RawMethod = dyn Fn(&Object, &[Value]) -> Result<Value, Error> + Send + Sync;

/// The number of explicit arguments a method accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arity {
    /// Exactly this many arguments, not counting `self`.
    Fixed(u16),
    /// Any number of arguments.
    Varargs,
}

impl Arity {
    /// Returns whether a call with `count` explicit arguments is acceptable.
    pub fn accepts(self, count: usize) -> bool {
        match self {
            Arity::Fixed(n) => usize::from(n) == count,
            Arity::Varargs => true,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Fixed(n) => write!(f, "{n}"),
            Arity::Varargs => f.write_str("..."),
        }
    }
}

/// A callable bound into a method table.
///
/// Cloning a method is cheap; clones share the implementation.
#[derive(Clone)]
pub struct Method {
    arity: Arity,
    function: Arc<RawMethod>,
}

impl Method {
    /// Creates a method from a raw implementation.
    ///
    /// The dispatcher checks the argument count against `arity` before `f` is entered, so `f`
    /// can index into its argument slice for fixed arities.
    pub fn new<F>(arity: Arity, f: F) -> Self
    where
        F: Fn(&Object, &[Value]) -> Result<Value, Error> + Send + Sync + 'static,
    {
        Self { arity, function: Arc::new(f) }
    }

    /// Returns the method's arity.
    pub fn arity(&self) -> Arity {
        self.arity
    }

    /// Returns whether two methods share the same implementation.
    pub fn ptr_eq(&self, other: &Method) -> bool {
        Arc::ptr_eq(&self.function, &other.function)
    }

    /// Calls the implementation without checking the arity.
    pub(crate) fn call_unchecked(
        &self,
        this: &Object,
        arguments: &[Value],
    ) -> Result<Value, Error> {
        (self.function)(this, arguments)
    }
}

impl fmt::Debug for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Method").field("arity", &self.arity).finish_non_exhaustive()
    }
}
