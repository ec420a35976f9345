use crate::{
    ll::method::{Arity, Method},
    Error, Object, TryFromValue, Value,
};

/// Arguments passed to a varargs method.
///
/// This is a wrapper that does things like type-checking and arity-checking.
#[derive(Debug, Clone, Copy)]
pub struct Arguments<'a> {
    inner: &'a [Value],
}

impl<'a> Arguments<'a> {
    pub(crate) fn new(raw_arguments: &'a [Value]) -> Self {
        Self { inner: raw_arguments }
    }

    /// Returns the number of arguments passed to the method.
    pub fn count(&self) -> usize {
        self.inner.len()
    }

    /// Raises an error if there weren't exactly `n` arguments passed to the method.
    pub fn expect_exactly(&self, n: usize) -> Result<(), Error> {
        if self.count() != n {
            Err(Error::ArgumentCount { expected: n, got: self.count() })
        } else {
            Ok(())
        }
    }

    /// Raises an error if there weren't at least `n` arguments passed to the method.
    pub fn expect_at_least(&self, n: usize) -> Result<(), Error> {
        if self.count() < n {
            Err(Error::ArgumentCount { expected: n, got: self.count() })
        } else {
            Ok(())
        }
    }

    /// Returns the `n`th argument, or `None` if the argument is not present.
    pub fn nth(&self, n: usize) -> Option<&'a Value> {
        self.inner.get(n)
    }

    /// Returns the `n`th argument converted into the given type. Missing arguments are treated
    /// as `Nil`.
    pub fn get<T>(&self, n: usize) -> Result<T, Error>
    where
        T: TryFromValue,
    {
        let value = self.inner.get(n).cloned().unwrap_or_default();
        T::try_from_value(&value).map_err(|error| {
            if let Error::TypeMismatch { expected, got } = error {
                Error::ArgumentTypeMismatch { index: n, expected, got }
            } else {
                error
            }
        })
    }

    /// Returns the raw array of arguments.
    pub fn array(&self) -> &'a [Value] {
        self.inner
    }
}

/// A Rust closure that can be bound as a method.
///
/// Every method receives the object it was invoked on as its first parameter. The supported
/// signatures are:
/// - `Fn(&Object, A, B, C, ...) -> R` where each argument is [`TryFromValue`] and `R` is
///   `Into<Value>`
/// - `Fn(&Object, A, B, C, ...) -> Result<R, E>`, additionally with `E: Into<Error>`
/// - `Fn(&Object, Arguments) -> R` and `Fn(&Object, Arguments) -> Result<R, E>`, for methods
///   that accept any number of arguments
///
/// Up to six typed arguments are supported; beyond that, use the varargs forms.
///
/// The generic parameter `V` is not used inside the trait. Its only purpose is to allow for
/// multiple overlapping implementations of the trait for the same type; see [`mvariants`].
pub trait IntoMethod<V> {
    /// The number of arguments the method accepts, not counting `self`.
    const ARITY: Arity;

    /// Erases the closure into a [`Method`].
    fn into_method(self) -> Method;
}

/// Variants of [`IntoMethod`].
///
/// Each implementation has a corresponding marker type in this module, such that eg. the traits
/// `IntoMethod<Fallible<(i64,)>>` and `IntoMethod<Infallible<(i64,)>>` are different, but can
/// both be matched by using a generic parameter.
pub mod mvariants {
    use std::marker::PhantomData;

    // The argument types must appear somewhere in the trait for the implementations to be
    // accepted, so they're carried here. The private PhantomData prevents construction.

    /// A fallible method with typed arguments.
    pub struct Fallible<Args>(PhantomData<Args>);
    /// An infallible method with typed arguments.
    pub struct Infallible<Args>(PhantomData<Args>);
    /// A fallible varargs method.
    pub enum VarargsFallible {}
    /// An infallible varargs method.
    pub enum VarargsInfallible {}
}

macro_rules! count {
    () => { 0 };
    ($head:ident $($tail:ident)*) => { 1 + count!($($tail)*) };
}

macro_rules! impl_into_method {
    ($($types:ident),*) => {
        impl<Fun, Ret, Err, $($types),*> IntoMethod<mvariants::Fallible<($($types,)*)>> for Fun
        where
            Fun: Fn(&Object, $($types),*) -> Result<Ret, Err> + Send + Sync + 'static,
            Ret: Into<Value>,
            Err: Into<Error>,
            $($types: TryFromValue + 'static,)*
        {
            const ARITY: Arity = Arity::Fixed(count!($($types)*));

            fn into_method(self) -> Method {
                let arity = <Self as IntoMethod<mvariants::Fallible<($($types,)*)>>>::ARITY;
                Method::new(arity, move |this, arguments| {
                    #[allow(unused_variables)]
                    let arguments = Arguments::new(arguments);
                    let _n = 0;
                    $(
                        #[allow(non_snake_case)]
                        let $types = arguments.get::<$types>(_n)?;
                        #[allow(unused)]
                        let _n = _n + 1;
                    )*
                    self(this, $($types),*).map(Into::into).map_err(Into::into)
                })
            }
        }

        impl<Fun, Ret, $($types),*> IntoMethod<mvariants::Infallible<($($types,)*)>> for Fun
        where
            Fun: Fn(&Object, $($types),*) -> Ret + Send + Sync + 'static,
            Ret: Into<Value>,
            $($types: TryFromValue + 'static,)*
        {
            const ARITY: Arity = Arity::Fixed(count!($($types)*));

            fn into_method(self) -> Method {
                let arity = <Self as IntoMethod<mvariants::Infallible<($($types,)*)>>>::ARITY;
                Method::new(arity, move |this, arguments| {
                    #[allow(unused_variables)]
                    let arguments = Arguments::new(arguments);
                    let _n = 0;
                    $(
                        #[allow(non_snake_case)]
                        let $types = arguments.get::<$types>(_n)?;
                        #[allow(unused)]
                        let _n = _n + 1;
                    )*
                    Ok(self(this, $($types),*).into())
                })
            }
        }
    };
}

impl_into_method!();
impl_into_method!(A);
impl_into_method!(A, B);
impl_into_method!(A, B, C);
impl_into_method!(A, B, C, D);
impl_into_method!(A, B, C, D, E);
impl_into_method!(A, B, C, D, E, F);

impl<Fun, Ret, Err> IntoMethod<mvariants::VarargsFallible> for Fun
where
    Fun: Fn(&Object, Arguments<'_>) -> Result<Ret, Err> + Send + Sync + 'static,
    Ret: Into<Value>,
    Err: Into<Error>,
{
    const ARITY: Arity = Arity::Varargs;

    fn into_method(self) -> Method {
        let arity = <Self as IntoMethod<mvariants::VarargsFallible>>::ARITY;
        Method::new(arity, move |this, arguments| {
            self(this, Arguments::new(arguments)).map(Into::into).map_err(Into::into)
        })
    }
}

impl<Fun, Ret> IntoMethod<mvariants::VarargsInfallible> for Fun
where
    Fun: Fn(&Object, Arguments<'_>) -> Ret + Send + Sync + 'static,
    Ret: Into<Value>,
{
    const ARITY: Arity = Arity::Varargs;

    fn into_method(self) -> Method {
        let arity = <Self as IntoMethod<mvariants::VarargsInfallible>>::ARITY;
        Method::new(arity, move |this, arguments| {
            Ok(self(this, Arguments::new(arguments)).into())
        })
    }
}

/// Values that can be passed as the arguments of a method call.
///
/// Implemented for tuples of up to six `Into<Value>` elements, and for `Vec<Value>`.
pub trait IntoArguments {
    /// Converts `self` into a vector of values.
    fn into_arguments(self) -> Vec<Value>;
}

impl IntoArguments for Vec<Value> {
    fn into_arguments(self) -> Vec<Value> {
        self
    }
}

macro_rules! impl_into_arguments {
    ($($types:ident),*) => {
        impl<$($types),*> IntoArguments for ($($types,)*)
        where
            $($types: Into<Value>,)*
        {
            fn into_arguments(self) -> Vec<Value> {
                #[allow(non_snake_case)]
                let ($($types,)*) = self;
                vec![$($types.into()),*]
            }
        }
    };
}

impl_into_arguments!();
impl_into_arguments!(A);
impl_into_arguments!(A, B);
impl_into_arguments!(A, B, C);
impl_into_arguments!(A, B, C, D);
impl_into_arguments!(A, B, C, D, E);
impl_into_arguments!(A, B, C, D, E, F);
