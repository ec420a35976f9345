//! Call-site caches.
//!
//! A [`CallSite`] remembers which method the last invocation through it resolved to, keyed by the
//! receiver's class and the selector. Classes never change after initialization, so a cached
//! resolution stays valid for as long as the same class keeps showing up; when a different class
//! or selector arrives, the site resolves from scratch and replaces its entry. One fallback entry
//! is kept so that sites alternating between two classes don't thrash.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use hashbrown::HashMap;
use parking_lot::RwLock;
use tracing::debug;
#[cfg(feature = "trace-cache")]
use tracing::trace;

use super::{
    dispatch::{self, Selector},
    error::Error,
    label::Label,
    method::Method,
    object::Object,
    table::ClassId,
    value::Value,
};

#[derive(Debug, Clone)]
struct CacheEntry {
    class: ClassId,
    selector: Selector,
    label: Label,
    method: Method,
}

impl CacheEntry {
    fn matches(&self, class: ClassId, selector: Selector) -> bool {
        self.class == class && self.selector == selector
    }
}

#[derive(Debug, Default)]
struct Entries {
    primary: Option<CacheEntry>,
    fallback: Option<CacheEntry>,
}

enum Probe {
    Hit(Label, Method),
    /// The fallback entry matched; it should be promoted.
    FallbackHit(Label, Method),
    Empty,
    /// An entry exists, but for a different class or selector.
    Inconsistent,
}

/// Hit and miss counters of a call site.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Invocations that reused a cached resolution.
    pub hits: u64,
    /// Invocations that had to resolve the method.
    pub misses: u64,
}

impl CacheStats {
    /// Returns the fraction of invocations that hit the cache, between 0 and 1.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

impl std::ops::Add for CacheStats {
    type Output = CacheStats;

    fn add(self, rhs: CacheStats) -> CacheStats {
        CacheStats { hits: self.hits + rhs.hits, misses: self.misses + rhs.misses }
    }
}

/// An inline cache for one call site.
#[derive(Debug, Default)]
pub struct CallSite {
    entries: RwLock<Entries>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl CallSite {
    /// Creates an empty call site.
    pub fn new() -> Self {
        Self::default()
    }

    /// Invokes a method on `this` through this call site.
    ///
    /// Results are always the same as those of [`Object::invoke_selector`]; the cache only
    /// avoids resolving the selector again.
    pub fn invoke(
        &self,
        selector: impl Into<Selector>,
        this: &Object,
        arguments: &[Value],
    ) -> Result<Value, Error> {
        let selector = selector.into();
        let (label, method) = self.lookup(selector, this)?;
        dispatch::call(this, label, &method, arguments)
    }

    fn probe(&self, class: ClassId, selector: Selector) -> Probe {
        let entries = self.entries.read();
        match (&entries.primary, &entries.fallback) {
            (Some(entry), _) if entry.matches(class, selector) => {
                Probe::Hit(entry.label, entry.method.clone())
            }
            (_, Some(entry)) if entry.matches(class, selector) => {
                Probe::FallbackHit(entry.label, entry.method.clone())
            }
            (None, None) => Probe::Empty,
            _ => Probe::Inconsistent,
        }
    }

    fn lookup(&self, selector: Selector, this: &Object) -> Result<(Label, Method), Error> {
        let class = this.class();
        let probe = self.probe(class.id(), selector);
        #[cfg(feature = "trace-cache")]
        {
            let outcome = match &probe {
                Probe::Hit(..) => "hit",
                Probe::FallbackHit(..) => "fallback hit",
                Probe::Empty => "empty",
                Probe::Inconsistent => "inconsistent",
            };
            trace!(class = %class.name(), ?selector, outcome, "call site probe");
        }
        match probe {
            Probe::Hit(label, method) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Ok((label, method))
            }
            Probe::FallbackHit(label, method) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                let mut entries = self.entries.write();
                let Entries { primary, fallback } = &mut *entries;
                std::mem::swap(primary, fallback);
                Ok((label, method))
            }
            Probe::Empty | Probe::Inconsistent => {
                if let Probe::Inconsistent = probe {
                    debug!(class = %class.name(), ?selector, "call site cache miss, re-resolving");
                }
                self.misses.fetch_add(1, Ordering::Relaxed);
                let (label, method) = selector.resolve(class)?;
                let method = method.clone();
                let entry =
                    CacheEntry { class: class.id(), selector, label, method: method.clone() };
                let mut entries = self.entries.write();
                entries.fallback = entries.primary.take();
                entries.primary = Some(entry);
                Ok((label, method))
            }
        }
    }

    /// Forgets all cached resolutions.
    pub fn invalidate(&self) {
        let mut entries = self.entries.write();
        if entries.primary.is_some() {
            debug!("call site invalidated");
        }
        entries.primary = None;
        entries.fallback = None;
    }

    /// Returns the class the primary entry was cached for.
    pub fn cached_class(&self) -> Option<ClassId> {
        self.entries.read().primary.as_ref().map(|entry| entry.class)
    }

    /// Returns the hit and miss counters of this call site.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

/// The identifier of a call site, assigned once per static call expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct CacheId(u32);

impl CacheId {
    pub fn from_u32(x: u32) -> Self {
        Self(x)
    }

    pub fn to_u32(self) -> u32 {
        self.0
    }
}

/// A registry of call sites keyed by [`CacheId`].
///
/// Ids are sparse, so only the sites that were asked for exist. Looking up an existing site only
/// takes a read lock.
#[derive(Debug, Default)]
pub struct CallSites {
    sites: RwLock<HashMap<CacheId, Arc<CallSite>>>,
}

impl CallSites {
    /// Creates an empty registry with room for `capacity` sites before it reallocates.
    pub fn with_capacity(capacity: usize) -> Self {
        Self { sites: RwLock::new(HashMap::with_capacity(capacity)) }
    }

    /// Returns the call site with the given id, creating it if needed.
    pub fn site(&self, id: CacheId) -> Arc<CallSite> {
        if let Some(site) = self.sites.read().get(&id) {
            return Arc::clone(site);
        }
        Arc::clone(self.sites.write().entry(id).or_default())
    }

    /// Forgets the cached resolutions of every site.
    pub fn invalidate_all(&self) {
        for site in self.sites.read().values() {
            site.invalidate();
        }
    }

    /// Returns the counters of all sites added together.
    pub fn stats(&self) -> CacheStats {
        let sites = self.sites.read();
        sites.values().map(|site| site.stats()).fold(CacheStats::default(), |a, b| a + b)
    }

    /// Returns the number of sites in the registry.
    pub fn len(&self) -> usize {
        self.sites.read().len()
    }

    /// Returns whether the registry has no sites.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
