//! Module provide the balancing engine, implemented by [RbTree] type.
//!
//! RbTree is a classic [red-black][wiki-rbt] tree with parent links.
//! Nodes are kept in an arena and refer to each other by [NodeId],
//! rotations and recoloring are index re-assignments.
//!
//! - Each entry in RbTree instance correspond to a {Key, Value} pair.
//! - Keys are byte-strings, ordered lexicographically.
//! - Parametrised over `value-type`.
//! - Insert, find, update via insert(), find(), update() api.
//! - Full table scan, via inorder() and iter().
//! - No Durability guarantee.
//! - Not thread safe, refer to [crate::Tree] for that.
//!
//! [wiki-rbt]: https://en.wikipedia.org/wiki/Red%E2%80%93black_tree

use log::{debug, trace, warn};

use std::{cmp::Ordering, collections::VecDeque};

use crate::{
    node::{self, Node, NodeId},
    Error, Result,
};

/// RbTree manage a single instance of in-memory index using
/// [red-black][rbt] tree.
///
/// [rbt]: https://en.wikipedia.org/wiki/Red%E2%80%93black_tree
pub struct RbTree<V> {
    nodes: Vec<Node<V>>, // arena, nodes are never removed.
    root: Option<NodeId>,
    n_count: usize, // number of entries in the tree.
}

impl<V> Default for RbTree<V> {
    fn default() -> RbTree<V> {
        RbTree::new()
    }
}

impl<V> RbTree<V> {
    /// Create an empty instance of RbTree.
    pub fn new() -> RbTree<V> {
        RbTree {
            nodes: Vec::default(),
            root: None,
            n_count: Default::default(),
        }
    }

    /// Create an empty instance, with arena pre-allocated for `capacity`
    /// entries.
    pub fn with_capacity(capacity: usize) -> RbTree<V> {
        RbTree {
            nodes: Vec::with_capacity(capacity),
            root: None,
            n_count: Default::default(),
        }
    }
}

/// Maintenance API.
impl<V> RbTree<V> {
    /// Return number of entries in this instance.
    #[inline]
    pub fn len(&self) -> usize {
        self.n_count
    }

    /// Check whether this index is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.n_count == 0
    }

    /// Return the number of levels in the tree, counted breadth-first.
    /// An empty tree has height ZERO.
    pub fn height(&self) -> usize {
        let mut height = 0;
        let mut queue: VecDeque<NodeId> = self.root.into_iter().collect();

        while !queue.is_empty() {
            for _ in 0..queue.len() {
                if let Some(id) = queue.pop_front() {
                    queue.extend(self.nodes[id].left);
                    queue.extend(self.nodes[id].right);
                }
            }
            height += 1;
        }

        height
    }

    /// Validate tree with following rules:
    ///
    /// * Root node, if present, is black.
    /// * From root to any leaf, no consecutive reds allowed in its path.
    /// * Number of blacks should be same under left child and right child.
    /// * Children point back to their parent.
    /// * Make sure keys are in sorted order.
    pub fn validate(&self) -> Result<()> {
        if let Some(root) = self.root {
            let node = &self.nodes[root];
            if node.is_red() {
                return err_at!(Fatal, msg: "red root key:{:?}", node.key);
            }
            if node.parent.is_some() {
                return err_at!(Fatal, msg: "root with parent key:{:?}", node.key);
            }
        }

        let mut n_count = 0;
        self.validate_tree(self.root, false, 0, &mut n_count)?;
        if n_count != self.n_count {
            return err_at!(Fatal, msg: "mismatch in count {} != {}", n_count, self.n_count);
        }

        let mut prev: Option<&[u8]> = None;
        for (key, _) in self.iter() {
            match prev {
                Some(pkey) if pkey >= key => {
                    return err_at!(Fatal, msg: "sort key:{:?} prev:{:?}", key, pkey);
                }
                _ => prev = Some(key),
            }
        }

        Ok(())
    }
}

impl<V> RbTree<V> {
    /// Insert a new entry for key. If an entry already exists for `key`
    /// fail with [Error::DuplicateKey], leaving the index untouched.
    pub fn insert<K>(&mut self, key: K, value: V) -> Result<()>
    where
        K: Into<Vec<u8>>,
    {
        let id = self.bst_insert(key.into(), value)?;
        self.insert_fixup(id);
        Ok(())
    }

    /// Replace the value for an existing key. Colors and shape of the
    /// tree are not touched.
    pub fn update(&mut self, key: &[u8], value: V) -> Result<()> {
        match self.find_node(key) {
            Some(id) => {
                self.nodes[id].set_value(value);
                Ok(())
            }
            None => err_at!(KeyNotFound, msg: "update key:{:?}", key),
        }
    }

    /// Delete is not supported, always fail with [Error::NotImplemented].
    pub fn delete(&mut self, key: &[u8]) -> Result<()> {
        warn!("delete key:{:?} is not supported", key);
        err_at!(NotImplemented, msg: "delete key:{:?}", key)
    }
}

impl<V> RbTree<V> {
    /// Get a reference to the value for key.
    pub fn find(&self, key: &[u8]) -> Option<&V> {
        self.find_node(key).map(|id| &self.nodes[id].value)
    }

    /// Visit every entry in sorted key order.
    pub fn inorder<F>(&self, mut visit: F)
    where
        F: FnMut(&[u8], &V),
    {
        for (key, value) in self.iter() {
            visit(key, value)
        }
    }

    /// Return an iterator over all entries in this instance, in sorted
    /// key order.
    pub fn iter(&self) -> Iter<V> {
        let mut paths = Vec::default();
        build_iter(&self.nodes, self.root, &mut paths);

        Iter {
            nodes: &self.nodes,
            paths,
        }
    }

    fn find_node(&self, key: &[u8]) -> Option<NodeId> {
        let mut curr = self.root;
        while let Some(id) = curr {
            let node = &self.nodes[id];
            curr = match key.cmp(node.as_key()) {
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
                Ordering::Equal => return Some(id),
            };
        }
        None
    }
}

impl<V> RbTree<V> {
    // Plain binary-search-tree insertion, the new node is linked in red,
    // black if it becomes the root.
    fn bst_insert(&mut self, key: Vec<u8>, value: V) -> Result<NodeId> {
        let (mut parent, mut curr, mut is_left) = (None, self.root, false);

        while let Some(id) = curr {
            parent = Some(id);
            let node = &self.nodes[id];
            curr = match key.as_slice().cmp(node.as_key()) {
                Ordering::Less => {
                    is_left = true;
                    node.left
                }
                Ordering::Greater => {
                    is_left = false;
                    node.right
                }
                Ordering::Equal => {
                    debug!("insert rejected duplicate key:{:?}", key);
                    return err_at!(DuplicateKey, msg: "key:{:?}", key);
                }
            };
        }

        let id = self.nodes.len();
        let mut node = Node::new(key, value, parent);
        match parent {
            None => {
                node.set_black();
                self.root = Some(id);
            }
            Some(p) if is_left => self.nodes[p].left = Some(id),
            Some(p) => self.nodes[p].right = Some(id),
        }
        self.nodes.push(node);
        self.n_count += 1;

        Ok(id)
    }

    // Restore red-black properties, walking up from the freshly inserted
    // node `id`.
    fn insert_fixup(&mut self, id: NodeId) {
        let mut curr = id;
        loop {
            // Case 1: root node, paint it black.
            let parent = match self.nodes[curr].parent {
                Some(parent) => parent,
                None => {
                    self.nodes[curr].set_black();
                    break;
                }
            };

            // Case 2: black parent, nothing to do.
            if self.nodes[parent].is_black() {
                break;
            }

            // red parent is never the root, unless the root was left red.
            let grandparent = match self.nodes[parent].parent {
                Some(grandparent) => grandparent,
                None => {
                    self.nodes[parent].set_black();
                    break;
                }
            };

            // Case 3: red parent and red uncle, push the violation upward.
            let uncle = node::uncle(&self.nodes, curr);
            if let Some(uncle) = uncle.filter(|u| self.nodes[*u].is_red()) {
                trace!("fixup recolor at key:{:?}", self.nodes[grandparent].key);
                self.nodes[parent].set_black();
                self.nodes[uncle].set_black();
                self.nodes[grandparent].set_red();
                curr = grandparent;
                continue;
            }

            // Case 4: red parent and black uncle. Turn an inner grandchild
            // into an outer one, after that `top` is the red child of
            // grandparent on the same side as `curr`.
            let parent_is_left = self.nodes[grandparent].left == Some(parent);
            let curr_is_left = self.nodes[parent].left == Some(curr);
            let top = match (parent_is_left, curr_is_left) {
                (true, false) => {
                    self.rotate_left(parent);
                    curr
                }
                (false, true) => {
                    self.rotate_right(parent);
                    curr
                }
                _ => parent,
            };

            trace!("fixup rotate at key:{:?}", self.nodes[grandparent].key);
            if parent_is_left {
                self.rotate_right(grandparent);
            } else {
                self.rotate_left(grandparent);
            }
            self.nodes[top].set_black();
            self.nodes[grandparent].set_red();
            break;
        }
    }

    //              (p)                       (p)
    //               |                         |
    //              node                       y
    //              /  \                      / \
    //             /    \                    /   \
    //            /      \                  /     \
    //          left      y              node      yr
    //                   / \             /  \
    //                 yl   yr       left    yl
    //
    fn rotate_left(&mut self, node: NodeId) {
        let y = match self.nodes[node].right {
            Some(y) => y,
            None => panic!("rotate_left(): no right child ? Call the programmer"),
        };

        let yl = self.nodes[y].left;
        self.nodes[node].right = yl;
        if let Some(yl) = yl {
            self.nodes[yl].parent = Some(node);
        }

        let parent = self.nodes[node].parent;
        self.nodes[y].parent = parent;
        self.replace_child(parent, node, y);

        self.nodes[y].left = Some(node);
        self.nodes[node].parent = Some(y);
    }

    //              (p)                       (p)
    //               |                         |
    //              node                       y
    //              /  \                      / \
    //             /    \                    /   \
    //            /      \                  /     \
    //           y      right             yl      node
    //          / \                               / \
    //        yl   yr                           yr   right
    //
    fn rotate_right(&mut self, node: NodeId) {
        let y = match self.nodes[node].left {
            Some(y) => y,
            None => panic!("rotate_right(): no left child ? Call the programmer"),
        };

        let yr = self.nodes[y].right;
        self.nodes[node].left = yr;
        if let Some(yr) = yr {
            self.nodes[yr].parent = Some(node);
        }

        let parent = self.nodes[node].parent;
        self.nodes[y].parent = parent;
        self.replace_child(parent, node, y);

        self.nodes[y].right = Some(node);
        self.nodes[node].parent = Some(y);
    }

    // Point parent's link, or the tree's root when parent is None, from
    // `old` to `new`.
    fn replace_child(&mut self, parent: Option<NodeId>, old: NodeId, new: NodeId) {
        match parent {
            None => self.root = Some(new),
            Some(p) if self.nodes[p].left == Some(old) => self.nodes[p].left = Some(new),
            Some(p) => self.nodes[p].right = Some(new),
        }
    }

    fn validate_tree(
        &self,
        id: Option<NodeId>,
        fromred: bool,
        mut n_blacks: usize,
        n_count: &mut usize,
    ) -> Result<usize> {
        let id = match id {
            Some(id) => id,
            None => return Ok(n_blacks),
        };
        let node = &self.nodes[id];
        *n_count += 1;

        let red = node.is_red();
        if fromred && red {
            return err_at!(Fatal, msg: "consecutive reds key:{:?}", node.key);
        }
        if !red {
            n_blacks += 1;
        }

        for child in [node.left, node.right].iter().flatten() {
            if self.nodes[*child].parent != Some(id) {
                return err_at!(Fatal, msg: "broken parent link key:{:?}", node.key);
            }
        }
        if let Some(left) = node.left {
            if self.nodes[left].key >= node.key {
                let lkey = &self.nodes[left].key;
                return err_at!(Fatal, msg: "sort lkey:{:?} parent:{:?}", lkey, node.key);
            }
        }
        if let Some(right) = node.right {
            if self.nodes[right].key <= node.key {
                let rkey = &self.nodes[right].key;
                return err_at!(Fatal, msg: "sort rkey:{:?} parent:{:?}", rkey, node.key);
            }
        }

        let lblacks = self.validate_tree(node.left, red, n_blacks, n_count)?;
        let rblacks = self.validate_tree(node.right, red, n_blacks, n_count)?;
        if lblacks != rblacks {
            return err_at!(Fatal, msg: "unbalanced blacks {} {}", lblacks, rblacks);
        }

        Ok(lblacks)
    }
}

/// Iterator over entries of [RbTree], in sorted key order.
pub struct Iter<'a, V> {
    nodes: &'a [Node<V>],
    paths: Vec<NodeId>,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (&'a [u8], &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let (nodes, id) = (self.nodes, self.paths.pop()?);
        let node = &nodes[id];
        build_iter(nodes, node.right, &mut self.paths);
        Some((node.as_key(), &node.value))
    }
}

// push `id` and its chain of left children.
fn build_iter<V>(nodes: &[Node<V>], mut id: Option<NodeId>, paths: &mut Vec<NodeId>) {
    while let Some(nid) = id {
        paths.push(nid);
        id = nodes[nid].left;
    }
}

#[cfg(test)]
#[path = "rbt_test.rs"]
mod rbt_test;
