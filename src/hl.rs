//! The safe, typed, high-level API.

mod class_builder;
mod function;
mod runtime;
mod value;

pub use class_builder::*;
pub use function::*;
pub use runtime::*;
pub use value::*;
