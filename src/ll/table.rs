//! Method tables and the classes they freeze into.
//!
//! Classes are built in two phases. A [`Table`] is created from the list of public method
//! names, labels are requested through it, and methods are bound to those labels. Then
//! [`Table::init_class`] compacts the table into an immutable [`Class`] that can be shared by any
//! number of objects and threads.

use std::{
    fmt,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use hashbrown::{HashMap, HashSet};
use tracing::{debug, warn};

use super::{
    error::Error,
    label::{Label, LabelAllocator},
    method::Method,
    tag::Tag,
};

/// The process-unique identity of a class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct ClassId(u64);

static NEXT_CLASS_ID: AtomicU64 = AtomicU64::new(0);

impl ClassId {
    fn next() -> Self {
        Self::next_from(&NEXT_CLASS_ID)
    }

    fn next_from(counter: &AtomicU64) -> Self {
        Self(counter.fetch_add(1, Ordering::Relaxed))
    }

    pub fn to_u64(self) -> u64 {
        self.0
    }
}

/// The index of an instance variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct VarIndex(u16);

impl VarIndex {
    pub fn to_usize(self) -> usize {
        usize::from(self.0)
    }
}

/// A method table under construction.
#[derive(Debug)]
pub struct Table {
    name: Arc<str>,
    labels: Arc<LabelAllocator>,
    /// The public method names the table was created with, in declaration order.
    public: Vec<Arc<str>>,
    /// Labels requested through this table.
    by_name: HashMap<Arc<str>, Label>,
    /// Methods, indexed by label.
    methods: Vec<Option<Method>>,
    /// Instance variable names, indexed by [`VarIndex`].
    variables: Vec<Arc<str>>,
    variable_indices: HashMap<Arc<str>, VarIndex>,
}

impl Table {
    /// Creates an empty table for a class exposing the given public method names.
    ///
    /// Storage is reserved for the distinct names; duplicates are ignored.
    pub fn new<I, S>(labels: Arc<LabelAllocator>, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let mut public: Vec<Arc<str>> = Vec::new();
        for name in names {
            let name: Arc<str> = Arc::from(name.as_ref());
            if seen.insert(Arc::clone(&name)) {
                public.push(name);
            }
        }
        Self {
            name: Arc::from("<anonymous>"),
            labels,
            by_name: HashMap::with_capacity(public.len()),
            methods: Vec::new(),
            variables: Vec::new(),
            variable_indices: HashMap::new(),
            public,
        }
    }

    /// Sets the name the class is referred to by in error messages and logs.
    pub fn with_name(mut self, name: impl Into<Arc<str>>) -> Self {
        self.name = name.into();
        self
    }

    /// Returns the name of the class being built.
    pub fn name(&self) -> &Arc<str> {
        &self.name
    }

    /// Returns the allocator this table draws labels from.
    pub fn labels(&self) -> &Arc<LabelAllocator> {
        &self.labels
    }

    /// Returns the label for `name`, allocating it if needed, and records it in this table.
    pub fn get_method_label(&mut self, name: &str) -> Label {
        let label = self.labels.get_label(name);
        self.remember(name, label);
        label
    }

    /// Returns the labels for a batch of names, in the order given.
    ///
    /// See [`LabelAllocator::get_labels`] for how new labels are numbered.
    pub fn get_method_labels<I, S>(&mut self, names: I) -> Vec<Label>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names: Vec<S> = names.into_iter().collect();
        let labels = self.labels.get_labels(names.iter().map(|name| AsRef::<str>::as_ref(name)));
        for (name, &label) in names.iter().zip(&labels) {
            self.remember(name.as_ref(), label);
        }
        labels
    }

    fn remember(&mut self, name: &str, label: Label) {
        if !self.by_name.contains_key(name) {
            self.by_name.insert(Arc::from(name), label);
        }
    }

    /// Binds a method to a label, replacing any method bound to it before.
    pub fn set_method(&mut self, label: Label, method: Method) {
        let index = label.to_usize();
        if index >= self.methods.len() {
            self.methods.resize(index + 1, None);
        }
        self.methods[index] = Some(method);
    }

    /// Binds many methods at once. Later pairs win over earlier ones with the same label.
    pub fn set_methods<I>(&mut self, methods: I)
    where
        I: IntoIterator<Item = (Label, Method)>,
    {
        for (label, method) in methods {
            self.set_method(label, method);
        }
    }

    /// Declares an instance variable and returns its index. Declaring a name twice returns the
    /// same index.
    ///
    /// # Panics
    /// Panics if the class declares more than [`u16::MAX`] variables.
    pub fn new_variable(&mut self, name: &str) -> VarIndex {
        if let Some(&index) = self.variable_indices.get(name) {
            return index;
        }
        let index = match u16::try_from(self.variables.len()) {
            Ok(index) => VarIndex(index),
            Err(_) => panic!("too many instance variables in {}", self.name),
        };
        let name: Arc<str> = Arc::from(name);
        self.variables.push(Arc::clone(&name));
        self.variable_indices.insert(name, index);
        index
    }

    /// Finalizes the table into a class.
    ///
    /// Method storage is compacted and the public methods are sorted by tag. Public names that
    /// were declared but never bound are left out of the public index.
    pub fn init_class(self) -> Result<Class, Error> {
        let Table { name, labels, public, by_name, mut methods, variables, variable_indices } =
            self;

        while let Some(None) = methods.last() {
            methods.pop();
        }

        let mut public_index: Vec<(Tag, Label, Arc<str>)> = Vec::with_capacity(public.len());
        for method_name in public {
            let label = by_name.get(&method_name).copied().or_else(|| labels.find(&method_name));
            let bound = label.filter(|label| {
                methods.get(label.to_usize()).map_or(false, |slot| slot.is_some())
            });
            match bound {
                Some(label) => public_index.push((Tag::of(&method_name), label, method_name)),
                None => warn!(class = %name, method = %method_name, "public method is never bound"),
            }
        }
        public_index.sort_by_key(|&(tag, _, _)| tag);
        for pair in public_index.windows(2) {
            if pair[0].0 == pair[1].0 {
                return Err(Error::TagCollision {
                    class: name,
                    first: Arc::clone(&pair[0].2),
                    second: Arc::clone(&pair[1].2),
                });
            }
        }

        let class = Class(Arc::new(ClassData {
            id: ClassId::next(),
            name,
            labels,
            methods: methods.into_boxed_slice(),
            public: public_index.into_iter().map(|(tag, label, _)| (tag, label)).collect(),
            by_name,
            variables: variables.into_boxed_slice(),
            variable_indices,
        }));
        debug!(
            class = %class.name(),
            id = class.id().to_u64(),
            methods = class.method_count(),
            "class initialized"
        );
        Ok(class)
    }
}

struct ClassData {
    id: ClassId,
    name: Arc<str>,
    labels: Arc<LabelAllocator>,
    /// Methods, indexed by label.
    methods: Box<[Option<Method>]>,
    /// Public methods, sorted by tag.
    public: Box<[(Tag, Label)]>,
    by_name: HashMap<Arc<str>, Label>,
    variables: Box<[Arc<str>]>,
    variable_indices: HashMap<Arc<str>, VarIndex>,
}

/// An initialized, immutable method table.
///
/// Cloning a class is cheap; clones refer to the same table.
#[derive(Clone)]
pub struct Class(Arc<ClassData>);

impl Class {
    /// Returns the identity of this class.
    pub fn id(&self) -> ClassId {
        self.0.id
    }

    /// Returns the name of this class.
    pub fn name(&self) -> &Arc<str> {
        &self.0.name
    }

    /// Returns the allocator this class' labels come from.
    pub fn labels(&self) -> &Arc<LabelAllocator> {
        &self.0.labels
    }

    /// Returns the method bound to `label`, if any.
    pub fn method(&self, label: Label) -> Option<&Method> {
        self.0.methods.get(label.to_usize()).and_then(Option::as_ref)
    }

    /// Returns whether a method is bound to `label`.
    pub fn responds_to(&self, label: Label) -> bool {
        self.method(label).is_some()
    }

    /// Returns the label of a public method with the given tag.
    pub fn find_public(&self, tag: Tag) -> Option<Label> {
        let public = &self.0.public;
        public.binary_search_by_key(&tag, |&(tag, _)| tag).ok().map(|index| public[index].1)
    }

    /// Returns the label that was requested for `name` while the class was being built.
    pub fn label_of(&self, name: &str) -> Option<Label> {
        self.0.by_name.get(name).copied()
    }

    /// Returns the labels of all bound methods, in increasing order.
    pub fn method_labels(&self) -> impl Iterator<Item = Label> + '_ {
        self.0
            .methods
            .iter()
            .enumerate()
            .filter(|(_, method)| method.is_some())
            .map(|(index, _)| Label::from_u32(index as u32))
    }

    /// Returns the number of bound methods.
    pub fn method_count(&self) -> usize {
        self.0.methods.iter().filter(|method| method.is_some()).count()
    }

    /// Returns the number of public methods reachable by tag.
    pub fn public_method_count(&self) -> usize {
        self.0.public.len()
    }

    /// Returns the number of instance variables objects of this class carry.
    pub fn variable_count(&self) -> usize {
        self.0.variables.len()
    }

    /// Returns the index of the instance variable called `name`.
    pub fn variable_index(&self, name: &str) -> Option<VarIndex> {
        self.0.variable_indices.get(name).copied()
    }

    /// Returns whether two handles refer to the same class.
    pub fn ptr_eq(&self, other: &Class) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Renders the name of a method for diagnostics, as `Class.method`.
    pub(crate) fn qualified_name(&self, label: Label) -> Arc<str> {
        match self.0.labels.name(label) {
            Some(method) => Arc::from(format!("{}.{}", self.0.name, method)),
            None => Arc::from(format!("{}.{}", self.0.name, label)),
        }
    }
}

impl fmt::Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Class")
            .field("id", &self.0.id)
            .field("name", &self.0.name)
            .field("methods", &self.method_count())
            .finish_non_exhaustive()
    }
}
