//! Method resolution and invocation.
//!
//! Dispatch is structural: an object responds to a label if and only if its class has a method
//! bound to that label. There is no class hierarchy to walk; a failed lookup is a
//! [`MethodNotFound`][Error::MethodNotFound] error.

use std::sync::Arc;

#[cfg(feature = "trace-calls")]
use tracing::trace;

use super::{
    error::Error,
    label::Label,
    method::{Arity, Method},
    object::Object,
    table::Class,
    tag::Tag,
    value::Value,
};

/// The key a method is invoked with: either a label, or the tag of a public method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Selector {
    Label(Label),
    Tag(Tag),
}

impl Selector {
    /// Resolves the selector against a class, returning the label and the method bound to it.
    pub fn resolve(self, class: &Class) -> Result<(Label, &Method), Error> {
        let label = match self {
            Selector::Label(label) => label,
            Selector::Tag(tag) => class.find_public(tag).ok_or_else(|| {
                Error::PublicMethodNotFound { class: Arc::clone(class.name()), tag }
            })?,
        };
        resolve(class, label).map(|method| (label, method))
    }
}

impl From<Label> for Selector {
    fn from(label: Label) -> Self {
        Self::Label(label)
    }
}

impl From<Tag> for Selector {
    fn from(tag: Tag) -> Self {
        Self::Tag(tag)
    }
}

/// Returns the method bound to `label` in `class`.
pub fn resolve(class: &Class, label: Label) -> Result<&Method, Error> {
    class.method(label).ok_or_else(|| Error::MethodNotFound {
        class: Arc::clone(class.name()),
        label,
        name: class.labels().name(label),
    })
}

/// Calls a resolved method with `this` as the receiver, checking the argument count first.
pub(crate) fn call(
    this: &Object,
    label: Label,
    method: &Method,
    arguments: &[Value],
) -> Result<Value, Error> {
    if let Arity::Fixed(expected) = method.arity() {
        if usize::from(expected) != arguments.len() {
            return Err(Error::ArityMismatch {
                method: this.class().qualified_name(label),
                expected,
                got: arguments.len(),
            });
        }
    }
    #[cfg(feature = "trace-calls")]
    {
        trace!(
            method = %this.class().qualified_name(label),
            argc = arguments.len(),
            "call"
        );
    }
    method.call_unchecked(this, arguments)
}

impl Object {
    /// Invokes the method bound to `label`, passing this object as `self`.
    ///
    /// This is also how methods call their siblings: the receiver they get is the same object,
    /// so `this.invoke(other_label, ...)` re-enters dispatch on it.
    pub fn invoke(&self, label: Label, arguments: &[Value]) -> Result<Value, Error> {
        let method = resolve(self.class(), label)?;
        call(self, label, method, arguments)
    }

    /// Invokes the public method with the given tag.
    pub fn invoke_public(&self, tag: Tag, arguments: &[Value]) -> Result<Value, Error> {
        self.invoke_selector(Selector::Tag(tag), arguments)
    }

    /// Invokes a method by label or tag.
    pub fn invoke_selector(&self, selector: Selector, arguments: &[Value]) -> Result<Value, Error> {
        let (label, method) = selector.resolve(self.class())?;
        call(self, label, method, arguments)
    }

    /// Invokes a method by name.
    ///
    /// The name is resolved through the allocator the class was built with, allocating a label
    /// if the name was never seen. Prefer resolving labels once and using [`Object::invoke`] on
    /// hot paths.
    pub fn send(&self, name: &str, arguments: &[Value]) -> Result<Value, Error> {
        let label = self.class().labels().get_label(name);
        self.invoke(label, arguments)
    }
}
