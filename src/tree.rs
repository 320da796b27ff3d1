// Module ``tree`` implement a thread safe handle over [RbTree].
//
// All operations are serialized on a single reader/writer lock held at
// whole-tree granularity. insert() and update() hold the write lock for
// the entire walk, fixup and mutation, readers proceed concurrently and
// exclude writers while they hold the lock. Callers block indefinitely
// waiting for the lock, there are no timeouts.
//
// Cloning a [Tree] is cheap and the clone refers to the same index, use
// this to share an index between threads.

use log::debug;
use parking_lot::RwLock;

use std::sync::Arc;

use crate::{RbTree, Result};

/// Tree type for thread-safe, concurrent reads and serialized writes.
pub struct Tree<V> {
    inner: Arc<RwLock<RbTree<V>>>,
}

impl<V> Clone for Tree<V> {
    fn clone(&self) -> Tree<V> {
        Tree {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V> Default for Tree<V> {
    fn default() -> Tree<V> {
        Tree::new()
    }
}

impl<V> Tree<V> {
    /// Create an empty tree.
    pub fn new() -> Tree<V> {
        Tree {
            inner: Arc::new(RwLock::new(RbTree::new())),
        }
    }

    /// Create an empty tree, pre-allocating room for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Tree<V> {
        debug!("new tree with capacity {}", capacity);
        Tree {
            inner: Arc::new(RwLock::new(RbTree::with_capacity(capacity))),
        }
    }
}

impl<V> Tree<V> {
    /// Return number of entries in this instance.
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// Return whether index is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Return the number of levels in the tree. Walks the whole tree.
    pub fn height(&self) -> usize {
        self.inner.read().height()
    }

    /// Validate the red-black properties of this index, refer to
    /// [RbTree::validate].
    pub fn validate(&self) -> Result<()> {
        self.inner.read().validate()
    }
}

impl<V> Tree<V> {
    /// Insert `key`, `value` into index. Fail with DuplicateKey if `key`
    /// is already present.
    pub fn insert<K>(&self, key: K, value: V) -> Result<()>
    where
        K: Into<Vec<u8>>,
    {
        self.inner.write().insert(key, value)
    }

    /// Replace the value of an existing `key`. Fail with KeyNotFound
    /// if `key` is missing.
    pub fn update(&self, key: &[u8], value: V) -> Result<()> {
        self.inner.write().update(key, value)
    }

    /// Always fail with NotImplemented.
    pub fn delete(&self, key: &[u8]) -> Result<()> {
        self.inner.write().delete(key)
    }
}

impl<V> Tree<V> {
    /// Get the value for key.
    pub fn find(&self, key: &[u8]) -> Option<V>
    where
        V: Clone,
    {
        self.inner.read().find(key).cloned()
    }

    /// Call `visit` for every entry in sorted key order. The read lock
    /// is held until the walk completes, `visit` must not write into
    /// this same tree.
    pub fn inorder<F>(&self, visit: F)
    where
        F: FnMut(&[u8], &V),
    {
        self.inner.read().inorder(visit)
    }

    /// Return a snapshot of all entries, in sorted key order.
    pub fn iter(&self) -> Vec<(Vec<u8>, V)>
    where
        V: Clone,
    {
        let inner = self.inner.read();
        inner.iter().map(|(k, v)| (k.to_vec(), v.clone())).collect()
    }
}

#[cfg(test)]
#[path = "tree_test.rs"]
mod tree_test;
