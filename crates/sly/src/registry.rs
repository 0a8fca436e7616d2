//! Registries for frontend extensions.
//!
//! Plugins teach the frontend new markup attributes; filters rewrite
//! expressions while the raw command stream is generated. The core
//! optimizer is agnostic to both; the compiler service only needs to
//! hand consistent, priority-ordered snapshots to the frontend
//! factory whenever the set changes.

use std::sync::{Arc, Mutex};

/// Common surface of frontend extensions: a unique name and a
/// priority deciding application order (higher runs first).
pub trait Extension: Send + Sync {
    fn name(&self) -> &str;
    fn priority(&self) -> i32;
}

/// A markup-attribute plugin consulted by the frontend.
pub trait Plugin: Extension {}

/// An expression filter consulted by the frontend.
pub trait Filter: Extension {}

/// A mutex-guarded, snapshot-based extension registry.
///
/// Mutations are serialized by the internal lock; readers take a
/// priority-sorted snapshot and never hold the lock across a compile.
pub struct ExtensionRegistry<T: Extension + ?Sized> {
    entries: Mutex<Vec<Arc<T>>>,
}

pub type PluginRegistry = ExtensionRegistry<dyn Plugin>;
pub type FilterRegistry = ExtensionRegistry<dyn Filter>;

impl<T: Extension + ?Sized> ExtensionRegistry<T> {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
        }
    }

    /// Register an extension. A second registration under the same
    /// name replaces the first.
    pub fn register(&self, extension: Arc<T>) {
        let mut entries = self.entries.lock().expect("extension registry poisoned");
        entries.retain(|existing| existing.name() != extension.name());
        entries.push(extension);
    }

    /// Remove the extension with the given name. Returns whether
    /// anything was removed.
    pub fn unregister(&self, name: &str) -> bool {
        let mut entries = self.entries.lock().expect("extension registry poisoned");
        let before = entries.len();
        entries.retain(|existing| existing.name() != name);
        entries.len() != before
    }

    /// A consistent snapshot, sorted by descending priority with name
    /// as tie-breaker.
    pub fn snapshot(&self) -> Vec<Arc<T>> {
        let entries = self.entries.lock().expect("extension registry poisoned");
        let mut snapshot = entries.clone();
        snapshot.sort_by(|a, b| {
            b.priority()
                .cmp(&a.priority())
                .then_with(|| a.name().cmp(b.name()))
        });
        snapshot
    }

    pub fn len(&self) -> usize {
        self.entries.lock().expect("extension registry poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Extension + ?Sized> Default for ExtensionRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}
