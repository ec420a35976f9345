use std::{fmt::Display, sync::Arc};

use ducktable::{ll::label::LabelAllocator, Runtime};

mod stress;
mod value;

pub trait RevealResultExt<T> {
    /// Basically the same as `unwrap()` but `Display`s the error instead of `Debug`ging it.
    fn reveal(self) -> T;
}

impl<T, E> RevealResultExt<T> for Result<T, E>
where
    E: Display,
{
    fn reveal(self) -> T {
        match self {
            Ok(ok) => ok,
            Err(error) => {
                panic!("Err result revealed:\n\n{error}\n\n");
            }
        }
    }
}

/// Creates a runtime with its own label allocator, so that tests don't observe each other's
/// labels.
fn create_runtime() -> Runtime {
    Runtime::with_labels(Arc::new(LabelAllocator::new()))
}
