use core::borrow::Borrow;
use core::mem;

use smallvec::SmallVec;

use super::handle::Handle;
use super::splice;

/// A B-tree node: sorted key/value pairs plus, for internal nodes, one more
/// child handle than there are keys.
///
/// Keys and values live in parallel arrays so searches only touch keys.
/// Child arrays may momentarily hold `ORDER + 1` handles during a split and spill
/// to the heap for that instant.
#[derive(Clone)]
pub(crate) struct Node<K, V, const ORDER: usize> {
    // Navigation only. The arena owns every node.
    parent: Option<Handle>,
    // Index among the parent's children. Meaningless for the root.
    position: usize,
    keys: SmallVec<[K; ORDER]>,
    values: SmallVec<[V; ORDER]>,
    children: SmallVec<[Handle; ORDER]>,
}

/// Result of searching for a key in a node.
pub(crate) enum SearchResult {
    /// Key was found at the given index.
    Found(usize),
    /// Key was not found; index is where it would be inserted, and the child to descend into.
    NotFound(usize),
}

impl<K, V, const ORDER: usize> Node<K, V, ORDER> {
    /// Creates a new empty, parentless leaf.
    pub(crate) fn new() -> Self {
        Self {
            parent: None,
            position: 0,
            keys: SmallVec::new(),
            values: SmallVec::new(),
            children: SmallVec::new(),
        }
    }

    pub(crate) fn parent(&self) -> Option<Handle> {
        self.parent
    }

    pub(crate) fn position(&self) -> usize {
        self.position
    }

    /// Records where this node hangs in the tree.
    pub(crate) fn set_parent(&mut self, parent: Option<Handle>, position: usize) {
        self.parent = parent;
        self.position = position;
    }

    pub(crate) fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub(crate) fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub(crate) fn key_count(&self) -> usize {
        self.keys.len()
    }

    pub(crate) fn child_count(&self) -> usize {
        self.children.len()
    }

    #[inline]
    pub(crate) fn key(&self, index: usize) -> &K {
        &self.keys[index]
    }

    #[cfg(test)]
    pub(crate) fn keys(&self) -> &[K] {
        &self.keys
    }

    #[inline]
    pub(crate) fn value(&self, index: usize) -> &V {
        &self.values[index]
    }

    #[inline]
    pub(crate) fn value_mut(&mut self, index: usize) -> &mut V {
        &mut self.values[index]
    }

    #[inline]
    pub(crate) fn child(&self, index: usize) -> Handle {
        self.children[index]
    }

    #[cfg(test)]
    pub(crate) fn children(&self) -> &[Handle] {
        &self.children
    }

    /// Binary search for `key`, returning the lower bound among this node's keys.
    #[inline]
    pub(crate) fn search<Q>(&self, key: &Q) -> SearchResult
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        match self.keys.binary_search_by(|k| k.borrow().cmp(key)) {
            Ok(idx) => SearchResult::Found(idx),
            Err(idx) => SearchResult::NotFound(idx),
        }
    }

    pub(crate) fn insert_pair(&mut self, index: usize, key: K, value: V) {
        self.keys.insert(index, key);
        self.values.insert(index, value);
    }

    pub(crate) fn remove_pair(&mut self, index: usize) -> (K, V) {
        (self.keys.remove(index), self.values.remove(index))
    }

    /// Swaps a new pair into `index`, returning the old one.
    pub(crate) fn replace_pair(&mut self, index: usize, key: K, value: V) -> (K, V) {
        (
            mem::replace(&mut self.keys[index], key),
            mem::replace(&mut self.values[index], value),
        )
    }

    pub(crate) fn push_pair(&mut self, key: K, value: V) {
        self.keys.push(key);
        self.values.push(value);
    }

    pub(crate) fn pop_pair(&mut self) -> Option<(K, V)> {
        let key = self.keys.pop()?;
        let value = self.values.pop()?;
        Some((key, value))
    }

    pub(crate) fn insert_child(&mut self, index: usize, child: Handle) {
        self.children.insert(index, child);
    }

    pub(crate) fn remove_child(&mut self, index: usize) -> Handle {
        self.children.remove(index)
    }

    pub(crate) fn push_child(&mut self, child: Handle) {
        self.children.push(child);
    }

    pub(crate) fn pop_child(&mut self) -> Option<Handle> {
        self.children.pop()
    }

    /// Splits an overflowing node around its middle pair.
    ///
    /// Everything after the median (pairs, and children if internal) moves to the
    /// returned right node. The median is removed and returned for promotion. The
    /// right node inherits this node's parent; the caller links it in and re-parents
    /// its children.
    pub(crate) fn split_off(&mut self) -> ((K, V), Self) {
        let mid = self.keys.len() / 2;

        let keys = splice::split_tail(&mut self.keys, mid + 1);
        let values = splice::split_tail(&mut self.values, mid + 1);
        let children = if self.is_leaf() {
            SmallVec::new()
        } else {
            let children = splice::split_tail(&mut self.children, mid + 1);
            // Back inline now that the transient extra child is gone.
            self.children.shrink_to_fit();
            children
        };

        let median = self.pop_pair().expect("`Node::split_off()` - node has no median!");
        let right = Self {
            parent: self.parent,
            position: self.position + 1,
            keys,
            values,
            children,
        };
        (median, right)
    }

    /// Moves all pairs and children into a new parentless node, leaving this one empty.
    pub(crate) fn take_contents(&mut self) -> Self {
        Self {
            parent: None,
            position: 0,
            keys: mem::take(&mut self.keys),
            values: mem::take(&mut self.values),
            children: mem::take(&mut self.children),
        }
    }

    /// Replaces pairs and children with those of `other`, keeping this node's place in the tree.
    pub(crate) fn adopt_contents(&mut self, other: Self) {
        self.keys = other.keys;
        self.values = other.values;
        self.children = other.children;
    }

    /// Absorbs `separator` and then every pair and child of the right sibling `right`.
    ///
    /// Returns the index of the first child taken from `right`, so the caller can
    /// re-parent from there.
    pub(crate) fn merge_with_right(&mut self, separator: (K, V), mut right: Self) -> usize {
        self.push_pair(separator.0, separator.1);
        splice::append(&mut right.keys, &mut self.keys);
        splice::append(&mut right.values, &mut self.values);
        let offset = self.children.len();
        splice::append(&mut right.children, &mut self.children);
        offset
    }
}
