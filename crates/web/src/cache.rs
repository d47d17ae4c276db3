//! Per schema cache of derived dependencies.
//!
//! Deriving a dependency inspects the schema's fields and checks them, which is wasted work when
//! repeated on every request. The cache keeps one [`Dependency`] per schema type. Reads are a
//! lock-free load of the current map; a miss derives the dependency and publishes a new map.

use arc_swap::ArcSwap;
use micro_qp::{derive_dependency, Dependency, QueryParams, SchemaError};
use once_cell::sync::Lazy;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

type Entries = HashMap<TypeId, Arc<dyn Any + Send + Sync>>;

static DEPENDENCIES: Lazy<DependencyCache> = Lazy::new(DependencyCache::new);

/// Derived dependencies keyed by schema type.
pub struct DependencyCache {
    entries: ArcSwap<Entries>,
}

impl DependencyCache {
    /// An empty cache, independent of [`DependencyCache::global`].
    pub fn new() -> Self {
        Self { entries: ArcSwap::from_pointee(HashMap::new()) }
    }

    /// The process wide cache used by the [`Query`](crate::extract::Query) extractor.
    pub fn global() -> &'static Self {
        &DEPENDENCIES
    }

    /// Returns the cached dependency of `S`, deriving and caching it on first use.
    ///
    /// A malformed schema is not cached; every call reports the error again.
    pub fn get_or_derive<S>(&self) -> Result<Arc<Dependency<S>>, SchemaError>
    where
        S: QueryParams + 'static,
    {
        if let Some(dependency) = self.get::<S>() {
            return Ok(dependency);
        }

        let derived = Arc::new(derive_dependency::<S>()?);
        self.entries.rcu(|entries| {
            let mut entries = Entries::clone(entries);
            entries.entry(TypeId::of::<S>()).or_insert_with(|| Arc::clone(&derived) as Arc<dyn Any + Send + Sync>);
            entries
        });
        debug!(dependency = derived.name(), "cached query dependency");

        // another thread may have won the race, hand out the published one
        Ok(self.get::<S>().unwrap_or(derived))
    }

    /// The dependency of `S` if it was derived through this cache before.
    pub fn get<S>(&self) -> Option<Arc<Dependency<S>>>
    where
        S: QueryParams + 'static,
    {
        let entry = self.entries.load().get(&TypeId::of::<S>()).cloned()?;
        entry.downcast::<Dependency<S>>().ok()
    }

    /// Number of schema types with a cached dependency.
    pub fn len(&self) -> usize {
        self.entries.load().len()
    }

    /// Whether nothing has been derived through this cache yet.
    pub fn is_empty(&self) -> bool {
        self.entries.load().is_empty()
    }
}

impl Default for DependencyCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DependencyCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DependencyCache").field("len", &self.len()).finish()
    }
}
