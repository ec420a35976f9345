//! Object instances.

use std::{fmt, sync::Arc};

use parking_lot::RwLock;

use super::{
    error::Error,
    table::{Class, VarIndex},
    value::Value,
};

/// An instance of a [`Class`].
///
/// Objects own their instance variables and share their class' method table. Methods receive the
/// object they were invoked on as `self`, through which they can reach sibling methods.
pub struct Object {
    class: Class,
    variables: RwLock<Box<[Value]>>,
}

impl Object {
    /// Creates a new object of the given class, with all instance variables set to `Nil`.
    pub fn new(class: &Class) -> Self {
        Self { class: class.clone(), variables: RwLock::new(Self::fresh_variables(class)) }
    }

    /// Creates an object of the given class, reusing `preallocated` if it's provided.
    ///
    /// A reused object is rebound to `class` in place and its instance variables are reset, so
    /// the result is indistinguishable from a freshly allocated object.
    pub fn create_opt(preallocated: Option<Object>, class: &Class) -> Self {
        match preallocated {
            Some(mut object) => {
                object.reinitialize(class);
                object
            }
            None => Self::new(class),
        }
    }

    fn fresh_variables(class: &Class) -> Box<[Value]> {
        vec![Value::Nil; class.variable_count()].into_boxed_slice()
    }

    fn reinitialize(&mut self, class: &Class) {
        let variables = self.variables.get_mut();
        if variables.len() == class.variable_count() {
            variables.fill(Value::Nil);
        } else {
            *variables = Self::fresh_variables(class);
        }
        self.class = class.clone();
    }

    /// Returns the class of this object.
    pub fn class(&self) -> &Class {
        &self.class
    }

    /// Returns the value of an instance variable.
    pub fn get_variable(&self, index: VarIndex) -> Result<Value, Error> {
        self.variables
            .read()
            .get(index.to_usize())
            .cloned()
            .ok_or_else(|| self.variable_out_of_bounds(index))
    }

    /// Sets the value of an instance variable.
    pub fn set_variable(&self, index: VarIndex, value: Value) -> Result<(), Error> {
        let mut variables = self.variables.write();
        match variables.get_mut(index.to_usize()) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(self.variable_out_of_bounds(index)),
        }
    }

    fn variable_out_of_bounds(&self, index: VarIndex) -> Error {
        Error::VariableOutOfBounds {
            class: Arc::clone(self.class.name()),
            index: index.to_usize(),
        }
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Object")
            .field("class", &self.class.name())
            .field("variables", &*self.variables.read())
            .finish()
    }
}
