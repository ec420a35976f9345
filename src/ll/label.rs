//! Method labels and the allocator that hands them out.

use std::{fmt, sync::Arc};

use hashbrown::HashMap;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use tracing::trace;

/// The label of a method name.
///
/// Labels are dense: the `n`th distinct name seen by an allocator receives label `n`. Two classes
/// built against the same allocator share labels for methods with the same name, which is what
/// makes dispatch structural.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Label(u32);

impl Label {
    pub(crate) fn from_u32(x: u32) -> Self {
        Self(x)
    }

    pub fn to_u32(self) -> u32 {
        self.0
    }

    pub(crate) fn to_usize(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Default)]
struct Labels {
    /// Mapping from method names to labels.
    by_name: HashMap<Arc<str>, Label>,
    /// Mapping from labels to method names.
    names: Vec<Arc<str>>,
}

impl Labels {
    fn get_or_create(&mut self, name: &str) -> Label {
        // Don't use `entry` here to avoid allocating the key on every hit.
        if let Some(&label) = self.by_name.get(name) {
            return label;
        }
        let label = match u32::try_from(self.names.len()) {
            Ok(index) => Label(index),
            Err(_) => panic!("label space exhausted"),
        };
        let name: Arc<str> = Arc::from(name);
        self.by_name.insert(Arc::clone(&name), label);
        trace!(%label, %name, "allocated label");
        self.names.push(name);
        label
    }
}

/// Assigns labels to method names.
///
/// All methods take `&self`; the mapping lives behind a read-write lock, so an allocator can be
/// shared between threads. Lookups of names that were already seen only take the read lock.
#[derive(Debug, Default)]
pub struct LabelAllocator {
    labels: RwLock<Labels>,
}

static GLOBAL: Lazy<Arc<LabelAllocator>> = Lazy::new(|| Arc::new(LabelAllocator::new()));

impl LabelAllocator {
    /// Creates a new allocator with no labels.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the process-wide allocator.
    ///
    /// It is created on first use and lives until the process exits.
    pub fn global() -> Arc<LabelAllocator> {
        Arc::clone(&GLOBAL)
    }

    /// Returns the label for `name`, allocating the next one if the name hasn't been seen yet.
    ///
    /// # Panics
    /// Panics if more than [`u32::MAX`] distinct names are requested from one allocator.
    pub fn get_label(&self, name: &str) -> Label {
        if let Some(label) = self.find(name) {
            return label;
        }
        self.labels.write().get_or_create(name)
    }

    /// Returns the labels for a batch of names, in the order the names were given.
    ///
    /// Names that haven't been seen yet receive new labels in increasing order as they are
    /// encountered in `names`, so the request order (not the order in which a class declared
    /// its methods) determines the numeric values. The whole batch is allocated under one lock.
    pub fn get_labels<I, S>(&self, names: I) -> Vec<Label>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut labels = self.labels.write();
        names.into_iter().map(|name| labels.get_or_create(name.as_ref())).collect()
    }

    /// Looks up the label of `name` without allocating one.
    pub fn find(&self, name: &str) -> Option<Label> {
        self.labels.read().by_name.get(name).copied()
    }

    /// Returns the name a label was allocated for, or `None` if this allocator never handed it out.
    pub fn name(&self, label: Label) -> Option<Arc<str>> {
        self.labels.read().names.get(label.to_usize()).cloned()
    }

    /// Returns the number of labels allocated so far.
    pub fn len(&self) -> usize {
        self.labels.read().names.len()
    }

    /// Returns whether no labels have been allocated yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
