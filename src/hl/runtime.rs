use std::sync::Arc;

use tracing::debug;

use crate::{
    ll::{
        cache::{CacheId, CacheStats, CallSite, CallSites},
        dispatch::Selector,
        label::{Label, LabelAllocator},
        table::{Class, Table},
    },
    Error, IntoArguments, Object, TryFromValue, Value,
};

/// Options controlling how a [`Runtime`] dispatches.
#[derive(Debug, Clone, Copy)]
pub struct RuntimeOptions {
    /// Set to `false` to make cached invocations resolve the method every time. Results are the
    /// same either way.
    pub inline_caching: bool,
    /// The number of call sites the registry has room for before it grows. Sites themselves are
    /// only created when a cache id is first used.
    pub call_site_capacity: usize,
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        Self { inline_caching: true, call_site_capacity: 16 }
    }
}

/// **Start here!** A runtime. Owns the label allocator classes are built against and the call
/// sites cached invocations go through.
#[derive(Debug)]
pub struct Runtime {
    labels: Arc<LabelAllocator>,
    call_sites: CallSites,
    options: RuntimeOptions,
}

impl Runtime {
    /// Creates a new runtime using the process-wide label allocator.
    ///
    /// # Examples
    /// ```
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// use ducktable::{ClassBuilder, Object, Runtime};
    ///
    /// let runtime = Runtime::new();
    /// let class = ClassBuilder::new("Point").add_method("x", |_: &Object| 3_i64).build(&runtime)?;
    /// let point = runtime.create_object_opt(None, &class);
    /// let x = runtime.get_label("x");
    /// assert_eq!(runtime.call::<i64>(&point, x, ())?, 3);
    /// # Ok(())
    /// # }
    /// ```
    pub fn new() -> Self {
        Self::with_labels(LabelAllocator::global())
    }

    /// Creates a new runtime drawing labels from the given allocator.
    ///
    /// Classes built by runtimes sharing an allocator agree on labels, so objects can be passed
    /// between them.
    pub fn with_labels(labels: Arc<LabelAllocator>) -> Self {
        Self::with_options(labels, Default::default())
    }

    /// Creates a new runtime with specific options.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use ducktable::{ll::label::LabelAllocator, Runtime, RuntimeOptions};
    ///
    /// // A runtime that never caches, for comparing against one that does.
    /// let runtime = Runtime::with_options(Arc::new(LabelAllocator::new()), RuntimeOptions {
    ///     inline_caching: false,
    ///     ..Default::default()
    /// });
    /// ```
    pub fn with_options(labels: Arc<LabelAllocator>, options: RuntimeOptions) -> Self {
        debug!(?options, "creating runtime");
        Self { labels, call_sites: CallSites::with_capacity(options.call_site_capacity), options }
    }

    /// Returns the options this runtime was created with.
    pub fn options(&self) -> &RuntimeOptions {
        &self.options
    }

    /// Returns the label allocator of this runtime.
    pub fn labels(&self) -> &Arc<LabelAllocator> {
        &self.labels
    }

    /// Returns the label for `name`, allocating it if needed.
    pub fn get_label(&self, name: &str) -> Label {
        self.labels.get_label(name)
    }

    /// Creates a table for a class exposing the given public method names.
    pub fn create_table<I, S>(&self, names: I) -> Table
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Table::new(Arc::clone(&self.labels), names)
    }

    /// Returns the label for `name` and records it in `table`.
    pub fn get_method_label(&self, table: &mut Table, name: &str) -> Label {
        table.get_method_label(name)
    }

    /// Returns the labels for a batch of names and records them in `table`, in the order given.
    pub fn get_method_labels<I, S>(&self, table: &mut Table, names: I) -> Vec<Label>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        table.get_method_labels(names)
    }

    /// Creates an object of `class`, reusing `preallocated` if it's provided.
    pub fn create_object_opt(&self, preallocated: Option<Object>, class: &Class) -> Object {
        Object::create_opt(preallocated, class)
    }

    /// Invokes a method on `this` without going through a call site.
    pub fn invoke(
        &self,
        this: &Object,
        selector: impl Into<Selector>,
        arguments: &[Value],
    ) -> Result<Value, Error> {
        this.invoke_selector(selector.into(), arguments)
    }

    /// Invokes a method on `this` through the call site with the given id.
    ///
    /// With [`inline_caching`][RuntimeOptions::inline_caching] turned off, this is the same as
    /// [`Runtime::invoke`].
    pub fn invoke_cached(
        &self,
        cache_id: CacheId,
        selector: impl Into<Selector>,
        this: &Object,
        arguments: &[Value],
    ) -> Result<Value, Error> {
        if self.options.inline_caching {
            self.call_sites.site(cache_id).invoke(selector, this, arguments)
        } else {
            self.invoke(this, selector, arguments)
        }
    }

    /// Calls a method with typed arguments, converting its result to `R`.
    pub fn call<R>(
        &self,
        this: &Object,
        selector: impl Into<Selector>,
        arguments: impl IntoArguments,
    ) -> Result<R, Error>
    where
        R: TryFromValue,
    {
        let result = self.invoke(this, selector, &arguments.into_arguments())?;
        R::try_from_value(&result)
    }

    /// Calls a method with typed arguments through the call site with the given id.
    pub fn call_cached<R>(
        &self,
        cache_id: CacheId,
        selector: impl Into<Selector>,
        this: &Object,
        arguments: impl IntoArguments,
    ) -> Result<R, Error>
    where
        R: TryFromValue,
    {
        let result = self.invoke_cached(cache_id, selector, this, &arguments.into_arguments())?;
        R::try_from_value(&result)
    }

    /// Returns the call site with the given id, creating it if needed.
    pub fn call_site(&self, cache_id: CacheId) -> Arc<CallSite> {
        self.call_sites.site(cache_id)
    }

    /// Returns the hit and miss counters of all call sites added together.
    pub fn cache_stats(&self) -> CacheStats {
        self.call_sites.stats()
    }

    /// Forgets the cached resolutions of every call site.
    pub fn invalidate_caches(&self) {
        self.call_sites.invalidate_all();
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

impl Object {
    /// Calls a method on this object with typed arguments, converting its result to `R`.
    ///
    /// This is the typed counterpart of [`Object::invoke_selector`], and the usual way for a
    /// method to call its siblings through `self`.
    pub fn call<R>(
        &self,
        selector: impl Into<Selector>,
        arguments: impl IntoArguments,
    ) -> Result<R, Error>
    where
        R: TryFromValue,
    {
        let result = self.invoke_selector(selector.into(), &arguments.into_arguments())?;
        R::try_from_value(&result)
    }
}
