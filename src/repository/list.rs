//! Generic identity-keyed collection safe for concurrent use.
//!
//! Readers iterate snapshots while writers add and remove entries from
//! other threads. A single `RwLock` guards structural mutation; iteration
//! clones the current contents under a short read lock and never holds the
//! lock across the caller's loop, so mutation mid-iteration can neither
//! fault a reader nor tear the collection.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::RwLock;

/// An item that carries its own identity key.
pub trait RepositoryItem: Clone + Send + Sync + 'static {
    type Key: Eq + Hash + Clone + Send + Sync;

    /// The key used to deduplicate and match items.
    fn key(&self) -> Self::Key;
}

/// Identity-keyed collection with snapshot iteration.
///
/// Cloning the repository is cheap and yields another handle to the same
/// underlying collection.
pub struct ListRepository<T: RepositoryItem> {
    items: Arc<RwLock<HashMap<T::Key, T>>>,
}

impl<T: RepositoryItem> std::fmt::Debug for ListRepository<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListRepository")
            .field("len", &self.len())
            .finish()
    }
}

impl<T: RepositoryItem> Clone for ListRepository<T> {
    fn clone(&self) -> Self {
        Self { items: Arc::clone(&self.items) }
    }
}

impl<T: RepositoryItem> Default for ListRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: RepositoryItem> ListRepository<T> {
    pub fn new() -> Self {
        Self { items: Arc::new(RwLock::new(HashMap::new())) }
    }

    /// Inserts or replaces the item with the same identity. Idempotent.
    pub fn add(&self, item: T) {
        self.items.write().insert(item.key(), item);
    }

    /// Removes the item with the same identity if present.
    ///
    /// Returns whether an item was removed; absence is not an error.
    pub fn remove(&self, item: &T) -> bool {
        self.items.write().remove(&item.key()).is_some()
    }

    /// Removes the item with the given key if present.
    pub fn remove_by_key(&self, key: &T::Key) -> bool {
        self.items.write().remove(key).is_some()
    }

    /// Whether an item with the same identity is present.
    pub fn contains(&self, item: &T) -> bool {
        self.items.read().contains_key(&item.key())
    }

    /// Whether an item with the given key is present.
    pub fn contains_key(&self, key: &T::Key) -> bool {
        self.items.read().contains_key(key)
    }

    /// Atomically replaces the whole contents. Readers observe either the
    /// old or the new contents, never a partially-replaced state.
    pub fn set(&self, items: impl IntoIterator<Item = T>) {
        let replacement: HashMap<T::Key, T> =
            items.into_iter().map(|item| (item.key(), item)).collect();
        *self.items.write() = replacement;
    }

    /// A consistent copy of the current contents.
    pub fn snapshot(&self) -> Vec<T> {
        self.items.read().values().cloned().collect()
    }

    /// Iterates a fresh snapshot. Concurrent add/remove/set never fault the
    /// returned iterator.
    pub fn iter(&self) -> impl Iterator<Item = T> {
        self.snapshot().into_iter()
    }

    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    impl RepositoryItem for String {
        type Key = String;

        fn key(&self) -> String {
            self.clone()
        }
    }

    #[test]
    fn contains_after_add() {
        let repository = ListRepository::new();
        repository.add("newItem".to_string());
        assert!(repository.contains(&"newItem".to_string()));
    }

    #[test]
    fn contains_after_remove() {
        let repository = ListRepository::new();
        repository.add("originalItem".to_string());
        assert!(repository.remove(&"originalItem".to_string()));
        assert!(!repository.contains(&"originalItem".to_string()));
    }

    #[test]
    fn add_is_idempotent() {
        let repository = ListRepository::new();
        repository.add("item".to_string());
        repository.add("item".to_string());
        assert_eq!(repository.len(), 1);
    }

    #[test]
    fn remove_absent_is_noop() {
        let repository = ListRepository::new();
        repository.add("item".to_string());
        assert!(!repository.remove(&"missing".to_string()));
        assert_eq!(repository.len(), 1);
    }

    #[test]
    fn set_replaces_contents() {
        let repository = ListRepository::new();
        repository.add("old".to_string());
        repository.set(vec!["a".to_string(), "b".to_string()]);
        assert_eq!(repository.len(), 2);
        assert!(!repository.contains(&"old".to_string()));
    }

    #[test]
    fn add_does_not_fault_concurrent_iteration() {
        let repository = ListRepository::new();
        let num_items = 1000;
        for i in 0..num_items {
            repository.add(format!("OriginalItem_{i}"));
        }

        let readers: Vec<_> = (0..2)
            .map(|_| {
                let repository = repository.clone();
                thread::spawn(move || {
                    for _ in 0..10_000 {
                        for _item in repository.iter() {
                            // keep iterating
                        }
                    }
                })
            })
            .collect();

        let writers: Vec<_> = (0..2)
            .map(|w| {
                let repository = repository.clone();
                thread::spawn(move || {
                    for i in 0..num_items {
                        repository.add(format!("NewItem_{w}_{i}"));
                    }
                })
            })
            .collect();

        for handle in readers.into_iter().chain(writers) {
            handle.join().unwrap();
        }
        assert_eq!(repository.len(), 3 * num_items);
    }

    #[test]
    fn remove_does_not_fault_concurrent_iteration() {
        let repository = ListRepository::new();
        let num_items = 1000;
        for i in 0..num_items {
            repository.add(format!("OriginalItem_{i}"));
        }

        let reader = {
            let repository = repository.clone();
            thread::spawn(move || {
                for _ in 0..10_000 {
                    for _item in repository.iter() {
                        // keep iterating
                    }
                }
            })
        };

        let remover = {
            let repository = repository.clone();
            thread::spawn(move || {
                for i in 0..num_items {
                    repository.remove(&format!("OriginalItem_{i}"));
                }
            })
        };

        reader.join().unwrap();
        remover.join().unwrap();
        assert!(repository.is_empty());
    }

    #[test]
    fn set_yields_old_or_new_contents_to_concurrent_readers() {
        let repository = ListRepository::new();
        let old: Vec<String> = (0..100).map(|i| format!("old_{i}")).collect();
        let new: Vec<String> = (0..100).map(|i| format!("new_{i}")).collect();
        repository.set(old.clone());

        let reader = {
            let repository = repository.clone();
            thread::spawn(move || {
                for _ in 0..1000 {
                    let snapshot = repository.snapshot();
                    let old_count =
                        snapshot.iter().filter(|s| s.starts_with("old_")).count();
                    // Every snapshot is entirely pre-set or entirely post-set.
                    assert!(old_count == 0 || old_count == snapshot.len());
                    assert_eq!(snapshot.len(), 100);
                }
            })
        };

        let swapper = {
            let repository = repository.clone();
            thread::spawn(move || {
                for i in 0..1000 {
                    if i % 2 == 0 {
                        repository.set(new.clone());
                    } else {
                        repository.set(old.clone());
                    }
                }
            })
        };

        reader.join().unwrap();
        swapper.join().unwrap();
    }
}
