// Node corresponds to a single entry in RbTree instance. Nodes live in an
// arena owned by the tree and refer to each other by index.

/// Index of a node within the tree's arena.
pub type NodeId = usize;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Color {
    Red,
    Black,
}

#[derive(Clone)]
pub struct Node<V> {
    pub key: Vec<u8>,
    pub value: V,
    pub color: Color,
    pub parent: Option<NodeId>, // store: back-reference, None for root
    pub left: Option<NodeId>,   // store: left child
    pub right: Option<NodeId>,  // store: right child
}

impl<V> Node<V> {
    pub fn new(key: Vec<u8>, value: V, parent: Option<NodeId>) -> Node<V> {
        Node {
            key,
            value,
            color: Color::Red,
            parent,
            left: None,
            right: None,
        }
    }

    #[inline]
    pub fn set_value(&mut self, value: V) {
        self.value = value
    }

    #[inline]
    pub fn set_red(&mut self) {
        self.color = Color::Red
    }

    #[inline]
    pub fn set_black(&mut self) {
        self.color = Color::Black
    }

    #[inline]
    pub fn is_black(&self) -> bool {
        self.color == Color::Black
    }

    #[inline]
    pub fn is_red(&self) -> bool {
        self.color == Color::Red
    }

    #[inline]
    pub fn as_key(&self) -> &[u8] {
        &self.key
    }
}

/// Family lookups over the arena, navigating through parent links.
pub fn grandparent<V>(nodes: &[Node<V>], id: NodeId) -> Option<NodeId> {
    nodes[id].parent.and_then(|p| nodes[p].parent)
}

pub fn sibling<V>(nodes: &[Node<V>], id: NodeId) -> Option<NodeId> {
    let parent = &nodes[nodes[id].parent?];
    if parent.left == Some(id) {
        parent.right
    } else {
        parent.left
    }
}

pub fn uncle<V>(nodes: &[Node<V>], id: NodeId) -> Option<NodeId> {
    grandparent(nodes, id)?;
    sibling(nodes, nodes[id].parent?)
}

#[cfg(test)]
#[path = "node_test.rs"]
mod node_test;
