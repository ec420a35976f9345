//! Error reporting.

use std::{borrow::Cow, sync::Arc};

use super::{label::Label, tag::Tag};

/// An error raised while building classes or dispatching methods.
///
/// None of these are transient: each one points at a malformed class definition or a caller bug,
/// and is returned to the caller as soon as it's detected.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The class has no method bound to the label.
    #[error("method {} ({label}) does not exist on {class}", display_name(.name))]
    MethodNotFound {
        /// The name of the class the method was looked up in.
        class: Arc<str>,
        /// The label that failed to resolve.
        label: Label,
        /// The name the label was allocated for, if it's known.
        name: Option<Arc<str>>,
    },

    /// The class has no public method with the tag.
    #[error("public method with tag {tag} does not exist on {class}")]
    PublicMethodNotFound {
        /// The name of the class the method was looked up in.
        class: Arc<str>,
        /// The tag that failed to resolve.
        tag: Tag,
    },

    /// A method was called with the wrong number of arguments.
    #[error("{method} expects {expected} arguments, but got {got}")]
    ArityMismatch {
        /// The qualified name of the method (`Class.method`).
        method: Arc<str>,
        /// The number of arguments the method declares, not counting `self`.
        expected: u16,
        /// The number of arguments passed, not counting `self`.
        got: usize,
    },

    /// A varargs method was passed an unexpected number of arguments.
    #[error("{expected} arguments expected but got {got}")]
    ArgumentCount {
        /// The number of arguments the method wanted.
        expected: usize,
        /// The number of arguments passed.
        got: usize,
    },

    /// A value had a different type than expected.
    #[error("type mismatch, expected {expected} but got {got}")]
    TypeMismatch {
        /// The name of the expected type.
        expected: Cow<'static, str>,
        /// The name of the actual type obtained.
        got: Cow<'static, str>,
    },

    /// A method argument had a different type than expected.
    #[error("type mismatch at argument {}, expected {expected} but got {got}", .index + 1)]
    ArgumentTypeMismatch {
        /// Which argument had a type mismatch.
        index: usize,
        /// The name of the expected type.
        expected: Cow<'static, str>,
        /// The name of the actual type obtained.
        got: Cow<'static, str>,
    },

    /// An instance variable index was out of bounds for the object's class.
    #[error("instance variable {index} is out of bounds for {class}")]
    VariableOutOfBounds {
        /// The name of the object's class.
        class: Arc<str>,
        /// The offending index.
        index: usize,
    },

    /// Two public methods of one class hash to the same tag.
    #[error("public methods {first} and {second} of {class} have the same tag")]
    TagCollision {
        /// The name of the class being initialized.
        class: Arc<str>,
        /// The method that claimed the tag first.
        first: Arc<str>,
        /// The method whose tag collided.
        second: Arc<str>,
    },

    /// An error raised by a method's implementation.
    #[error("{0}")]
    User(Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    /// Wraps an arbitrary error raised from inside a method.
    pub fn user(error: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::User(error.into())
    }
}

fn display_name(name: &Option<Arc<str>>) -> &str {
    name.as_deref().unwrap_or("<unnamed>")
}
