use std::sync::Arc;

use crate::{
    ll::{
        method::{Arity, Method},
        table::Class,
    },
    Error, IntoMethod, Object, Runtime, Value,
};

struct MethodDescriptor {
    name: Arc<str>,
    public: bool,
    method: Method,
}

/// A builder for classes whose methods are Rust closures.
///
/// This drives the [`Table`][crate::ll::table::Table] protocol in one go: the public names are
/// declared, labels are requested for every method in the order they were added, the methods are
/// bound, and the table is initialized.
///
/// # Examples
/// ```
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use ducktable::{ClassBuilder, Object, Runtime};
///
/// let runtime = Runtime::new();
/// let hi = runtime.get_label("hi");
/// let class = ClassBuilder::new("Greeter")
///     .add_method("hi", |_: &Object, x: i64, y: i64| x + y)
///     .add_method("hello", move |this: &Object, z: i64| this.call::<i64>(hi, (10, z)))
///     .build(&runtime)?;
/// let greeter = runtime.create_object_opt(None, &class);
/// let hello = runtime.get_label("hello");
/// assert_eq!(runtime.call::<i64>(&greeter, hello, (3,))?, 13);
/// # Ok(())
/// # }
/// ```
pub struct ClassBuilder {
    name: Arc<str>,
    methods: Vec<MethodDescriptor>,
    variables: Vec<Arc<str>>,
}

impl ClassBuilder {
    /// Creates a new, empty class builder.
    ///
    /// The name is only used for diagnostics.
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self { name: name.into(), methods: Vec::new(), variables: Vec::new() }
    }

    fn push(mut self, name: &str, public: bool, method: Method) -> Self {
        self.methods.push(MethodDescriptor { name: Arc::from(name), public, method });
        self
    }

    /// Adds a public method, reachable both by label and by tag.
    ///
    /// Adding a method with the same name twice replaces the earlier one.
    pub fn add_method<F, V>(self, name: &str, f: F) -> Self
    where
        F: IntoMethod<V>,
    {
        self.push(name, true, f.into_method())
    }

    /// Adds a private method, reachable by label but left out of the public index.
    pub fn add_private_method<F, V>(self, name: &str, f: F) -> Self
    where
        F: IntoMethod<V>,
    {
        self.push(name, false, f.into_method())
    }

    /// Adds a public method operating on raw values.
    ///
    /// The argument count is checked against `arity` before `f` is called.
    pub fn add_raw_method<F>(self, name: &str, arity: Arity, f: F) -> Self
    where
        F: Fn(&Object, &[Value]) -> Result<Value, Error> + Send + Sync + 'static,
    {
        self.push(name, true, Method::new(arity, f))
    }

    /// Declares an instance variable. Objects of the class start with it set to `Nil`.
    pub fn add_variable(mut self, name: &str) -> Self {
        self.variables.push(Arc::from(name));
        self
    }

    /// Builds the class against the runtime's label allocator.
    pub fn build(self, runtime: &Runtime) -> Result<Class, Error> {
        let ClassBuilder { name, methods, variables } = self;
        let public = methods.iter().filter(|method| method.public).map(|method| &method.name);
        let mut table = runtime.create_table(public).with_name(name);
        let labels = table.get_method_labels(methods.iter().map(|method| &method.name));
        table.set_methods(labels.into_iter().zip(methods.into_iter().map(|method| method.method)));
        for variable in &variables {
            table.new_variable(variable);
        }
        table.init_class()
    }
}
