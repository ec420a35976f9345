use std::{borrow::Cow, sync::Arc};

use crate::{Error, Value};

/// Implemented by types that can be constructed from [`Value`]s.
pub trait TryFromValue
where
    Self: Sized,
{
    /// Tries to perform the conversion, returning an [`Error`] on failure.
    fn try_from_value(value: &Value) -> Result<Self, Error>;
}

fn type_mismatch(expected: impl Into<Cow<'static, str>>, got: &Value) -> Error {
    Error::TypeMismatch { expected: expected.into(), got: got.type_name().into() }
}

impl TryFromValue for Value {
    fn try_from_value(value: &Value) -> Result<Self, Error> {
        Ok(value.clone())
    }
}

impl TryFromValue for () {
    fn try_from_value(value: &Value) -> Result<Self, Error> {
        if let Value::Nil = value {
            Ok(())
        } else {
            Err(type_mismatch("Nil", value))
        }
    }
}

impl TryFromValue for bool {
    fn try_from_value(value: &Value) -> Result<Self, Error> {
        match value {
            Value::Boolean(b) => Ok(*b),
            _ => Err(type_mismatch("Boolean", value)),
        }
    }
}

macro_rules! try_from_value_int {
    ($T:ty) => {
        impl TryFromValue for $T {
            fn try_from_value(value: &Value) -> Result<Self, Error> {
                match value {
                    Value::Int(x) => <$T>::try_from(*x).map_err(|_| Error::TypeMismatch {
                        expected: concat!("Int in range of ", stringify!($T)).into(),
                        got: format!("Int {x}").into(),
                    }),
                    _ => Err(type_mismatch("Int", value)),
                }
            }
        }
    };
}

try_from_value_int!(u8);
try_from_value_int!(u16);
try_from_value_int!(u32);
try_from_value_int!(u64);
try_from_value_int!(usize);

try_from_value_int!(i8);
try_from_value_int!(i16);
try_from_value_int!(i32);
try_from_value_int!(i64);
try_from_value_int!(isize);

/// Integers are widened to floats.
impl TryFromValue for f64 {
    fn try_from_value(value: &Value) -> Result<Self, Error> {
        match value {
            Value::Float(x) => Ok(*x),
            Value::Int(x) => Ok(*x as f64),
            _ => Err(type_mismatch("Float", value)),
        }
    }
}

impl TryFromValue for Arc<str> {
    fn try_from_value(value: &Value) -> Result<Self, Error> {
        if let Value::String(s) = value {
            Ok(Arc::clone(s))
        } else {
            Err(type_mismatch("String", value))
        }
    }
}

impl TryFromValue for String {
    fn try_from_value(value: &Value) -> Result<Self, Error> {
        <Arc<str>>::try_from_value(value).map(|s| s.to_string())
    }
}

impl<T> TryFromValue for Option<T>
where
    T: TryFromValue,
{
    fn try_from_value(value: &Value) -> Result<Self, Error> {
        match value {
            Value::Nil => Ok(None),
            _ => Ok(Some(T::try_from_value(value).map_err(|error| {
                if let Error::TypeMismatch { expected, got } = error {
                    Error::TypeMismatch { expected: format!("{expected} or Nil").into(), got }
                } else {
                    error
                }
            })?)),
        }
    }
}
