use core::borrow::Borrow;
use core::mem;
use core::sync::atomic::{AtomicU64, Ordering};

use super::arena::Arena;
use super::handle::Handle;
use super::limits::Limits;
use super::node::{Node, SearchResult};
use crate::tracing_helpers::{debug_log, trace_log};

/// Epoch source shared by every tree. Each tree and each structural change
/// draws a fresh value, so no two trees ever hold the same epoch.
static EPOCHS: AtomicU64 = AtomicU64::new(0);

fn next_epoch() -> u64 {
    EPOCHS.fetch_add(1, Ordering::Relaxed)
}

/// The core B-tree implementation backing `BTree`.
///
/// Every node lives in one arena. Parents own children through child handles;
/// a child's parent handle and position are back-links used for sibling lookup
/// and upward traversal, never for ownership.
pub(crate) struct RawBTree<K, V, const ORDER: usize> {
    /// Arena storing all tree nodes.
    nodes: Arena<Node<K, V, ORDER>>,
    /// The root slot. It stays the same node for the tree's lifetime; only its contents change.
    root: Handle,
    /// Total number of key-value pairs in the tree.
    len: usize,
    /// Replaced on every structural change, so detached cursors can tell they are
    /// stale or belong to another tree.
    epoch: u64,
}

impl<K: Clone, V: Clone, const ORDER: usize> Clone for RawBTree<K, V, ORDER> {
    fn clone(&self) -> Self {
        Self {
            nodes: self.nodes.clone(),
            root: self.root,
            len: self.len,
            epoch: next_epoch(),
        }
    }
}

impl<K, V, const ORDER: usize> RawBTree<K, V, ORDER> {
    /// Creates a new tree holding a single empty root leaf.
    pub(crate) fn new() -> Self {
        let () = Limits::<ORDER>::ASSERT;
        let mut nodes = Arena::new();
        let root = nodes.alloc(Node::new());
        Self {
            nodes,
            root,
            len: 0,
            epoch: next_epoch(),
        }
    }

    /// Returns the number of key-value pairs in the tree.
    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the root holds no keys.
    pub(crate) fn is_empty(&self) -> bool {
        self.nodes.get(self.root).key_count() == 0
    }

    pub(crate) const fn epoch(&self) -> u64 {
        self.epoch
    }

    fn touch(&mut self) {
        self.epoch = next_epoch();
    }

    /// Drops every node and starts over with an empty root.
    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.root = self.nodes.alloc(Node::new());
        self.len = 0;
        self.touch();
    }

    /// Number of levels; zero for an empty tree.
    pub(crate) fn height(&self) -> usize {
        if self.is_empty() {
            return 0;
        }
        let mut height = 1;
        let mut current = self.nodes.get(self.root);
        while !current.is_leaf() {
            current = self.nodes.get(current.child(0));
            height += 1;
        }
        height
    }

    pub(crate) fn node(&self, handle: Handle) -> &Node<K, V, ORDER> {
        self.nodes.get(handle)
    }

    /// Returns the node behind `handle` if it is still alive.
    pub(crate) fn try_node(&self, handle: Handle) -> Option<&Node<K, V, ORDER>> {
        self.nodes.try_get(handle)
    }

    pub(crate) fn try_node_mut(&mut self, handle: Handle) -> Option<&mut Node<K, V, ORDER>> {
        self.nodes.try_get_mut(handle)
    }

    fn leftmost_leaf(&self, mut handle: Handle) -> Handle {
        loop {
            let node = self.nodes.get(handle);
            if node.is_leaf() {
                return handle;
            }
            handle = node.child(0);
        }
    }

    fn rightmost_leaf(&self, mut handle: Handle) -> Handle {
        loop {
            let node = self.nodes.get(handle);
            if node.is_leaf() {
                return handle;
            }
            handle = node.child(node.child_count() - 1);
        }
    }

    /// Position of the smallest key, if any.
    pub(crate) fn first(&self) -> Option<(Handle, usize)> {
        if self.is_empty() {
            return None;
        }
        Some((self.leftmost_leaf(self.root), 0))
    }

    /// Position of the largest key, if any.
    pub(crate) fn last(&self) -> Option<(Handle, usize)> {
        if self.is_empty() {
            return None;
        }
        let leaf = self.rightmost_leaf(self.root);
        Some((leaf, self.nodes.get(leaf).key_count() - 1))
    }

    /// Returns the in-order successor of the pair at `(handle, slot)`.
    ///
    /// Walks down from an internal node, or up through parent links from an
    /// exhausted leaf. `None` once the root is exhausted.
    pub(crate) fn successor(&self, handle: Handle, slot: usize) -> Option<(Handle, usize)> {
        let node = self.nodes.get(handle);
        if !node.is_leaf() {
            // The right subtree of the pair just visited comes next.
            return Some((self.leftmost_leaf(node.child(slot + 1)), 0));
        }

        let mut current = handle;
        let mut slot = slot + 1;
        loop {
            let node = self.nodes.get(current);
            if slot < node.key_count() {
                return Some((current, slot));
            }
            let parent = node.parent()?;
            slot = node.position();
            current = parent;
        }
    }

    /// Points the children of `parent` from index `from` onward back at it.
    fn adopt_children(&mut self, parent: Handle, from: usize) {
        let count = self.nodes.get(parent).child_count();
        for position in from..count {
            let child = self.nodes.get(parent).child(position);
            self.nodes.get_mut(child).set_parent(Some(parent), position);
        }
    }

    /// Splits `handle` if it reached `KEY_UPPER` keys, cascading toward the root.
    fn split(&mut self, handle: Handle) {
        let node = self.nodes.get_mut(handle);
        if node.key_count() < Limits::<ORDER>::KEY_UPPER {
            return;
        }

        let parent = node.parent();
        let position = node.position();
        let ((key, value), right) = node.split_off();
        let right = self.nodes.alloc(right);
        self.adopt_children(right, 0);
        trace_log!(node = ?handle, right = ?right, "split node");

        let Some(parent) = parent else {
            // The root keeps its slot: its remaining contents move into a new left
            // child and it becomes a two-child node around the median.
            let left = self.nodes.get_mut(handle).take_contents();
            let left = self.nodes.alloc(left);
            self.adopt_children(left, 0);

            let root = self.nodes.get_mut(handle);
            root.push_pair(key, value);
            root.push_child(left);
            root.push_child(right);
            self.adopt_children(handle, 0);
            debug_log!(height = self.height(), "root split, tree grew a level");
            return;
        };

        let parent_node = self.nodes.get_mut(parent);
        parent_node.insert_pair(position, key, value);
        parent_node.insert_child(position + 1, right);
        self.adopt_children(parent, position + 1);
        self.split(parent);
    }

    /// Repairs `handle` after it lost a key: rotate from a sibling if one can
    /// spare a key, otherwise merge and continue with the parent.
    fn rebalance(&mut self, handle: Handle) {
        let node = self.nodes.get(handle);
        let Some(parent) = node.parent() else {
            return;
        };
        if node.key_count() >= Limits::<ORDER>::KEY_LOWER {
            return;
        }

        if self.rotate_left(handle) || self.rotate_right(handle) {
            return;
        }

        // A non-root node always has at least one sibling.
        let position = self.nodes.get(handle).position();
        let separator = if position < self.nodes.get(parent).key_count() {
            position
        } else {
            position - 1
        };
        self.merge(parent, separator);

        let parent_node = self.nodes.get(parent);
        if parent_node.is_root() && parent_node.key_count() == 0 {
            self.collapse_root();
            return;
        }
        self.rebalance(parent);
    }

    /// Borrows the first pair (and first child) of the right sibling through the parent separator.
    fn rotate_left(&mut self, handle: Handle) -> bool {
        let node = self.nodes.get(handle);
        let Some(parent) = node.parent() else {
            return false;
        };
        let position = node.position();
        let parent_node = self.nodes.get(parent);
        if position >= parent_node.key_count() {
            return false;
        }

        let sibling = parent_node.child(position + 1);
        let sibling_node = self.nodes.get_mut(sibling);
        if sibling_node.key_count() <= Limits::<ORDER>::KEY_LOWER {
            return false;
        }

        let (key, value) = sibling_node.remove_pair(0);
        let moved = if sibling_node.is_leaf() {
            None
        } else {
            Some(sibling_node.remove_child(0))
        };
        debug_assert!(sibling_node.key_count() >= Limits::<ORDER>::KEY_LOWER);
        debug_assert!(sibling_node.is_leaf() || sibling_node.child_count() >= Limits::<ORDER>::SUB_LOWER);
        if moved.is_some() {
            self.adopt_children(sibling, 0);
        }

        let (key, value) = self.nodes.get_mut(parent).replace_pair(position, key, value);
        let node = self.nodes.get_mut(handle);
        node.push_pair(key, value);
        if let Some(child) = moved {
            node.push_child(child);
            let last = node.child_count() - 1;
            self.nodes.get_mut(child).set_parent(Some(handle), last);
        }
        trace_log!(node = ?handle, donor = ?sibling, "rotated left");
        true
    }

    /// Borrows the last pair (and last child) of the left sibling through the parent separator.
    fn rotate_right(&mut self, handle: Handle) -> bool {
        let node = self.nodes.get(handle);
        let Some(parent) = node.parent() else {
            return false;
        };
        let position = node.position();
        if position == 0 {
            return false;
        }

        let sibling = self.nodes.get(parent).child(position - 1);
        let sibling_node = self.nodes.get_mut(sibling);
        if sibling_node.key_count() <= Limits::<ORDER>::KEY_LOWER {
            return false;
        }

        let (key, value) = sibling_node.pop_pair().expect("`RawBTree::rotate_right()` - donor is empty!");
        let moved = if sibling_node.is_leaf() {
            None
        } else {
            sibling_node.pop_child()
        };
        debug_assert!(sibling_node.key_count() >= Limits::<ORDER>::KEY_LOWER);

        let (key, value) = self.nodes.get_mut(parent).replace_pair(position - 1, key, value);
        let node = self.nodes.get_mut(handle);
        node.insert_pair(0, key, value);
        if let Some(child) = moved {
            node.insert_child(0, child);
            self.adopt_children(handle, 0);
        }
        trace_log!(node = ?handle, donor = ?sibling, "rotated right");
        true
    }

    /// Merges child `separator + 1` of `parent` into child `separator`,
    /// pulling the separator pair down between them.
    fn merge(&mut self, parent: Handle, separator: usize) {
        let parent_node = self.nodes.get_mut(parent);
        debug_assert!(separator + 1 < parent_node.child_count());
        let (key, value) = parent_node.remove_pair(separator);
        let right = parent_node.remove_child(separator + 1);
        let left = parent_node.child(separator);
        self.adopt_children(parent, separator + 1);

        let right_node = self.nodes.take(right);
        let offset = self.nodes.get_mut(left).merge_with_right((key, value), right_node);
        self.adopt_children(left, offset);
        debug_assert!(self.nodes.get(left).key_count() < Limits::<ORDER>::KEY_UPPER);
        debug_assert!(self.nodes.get(left).child_count() < Limits::<ORDER>::SUB_UPPER);
        trace_log!(left = ?left, right = ?right, "merged siblings");
    }

    /// Replaces a key-less root with the contents of its only child.
    fn collapse_root(&mut self) {
        let root = self.root;
        let root_node = self.nodes.get(root);
        debug_assert_eq!(root_node.child_count(), 1);
        let child = root_node.child(0);

        let contents = self.nodes.take(child);
        self.nodes.get_mut(root).adopt_contents(contents);
        self.adopt_children(root, 0);
        debug_log!(height = self.height(), "root collapsed, tree shrank a level");
    }

    /// Removes the pair at `(handle, index)` and restores the occupancy bounds.
    ///
    /// An internal pair is replaced by the minimum of its right subtree, which is
    /// detached from its leaf before that leaf is rebalanced.
    fn remove_at(&mut self, handle: Handle, index: usize) -> (K, V) {
        self.len -= 1;
        self.touch();

        let node = self.nodes.get_mut(handle);
        if node.is_leaf() {
            let removed = node.remove_pair(index);
            self.rebalance(handle);
            return removed;
        }

        let right = node.child(index + 1);
        let (leaf, (key, value)) = self.detach_min(right);
        let removed = self.nodes.get_mut(handle).replace_pair(index, key, value);
        self.rebalance(leaf);
        removed
    }

    /// Removes the smallest pair of the subtree at `handle` without rebalancing.
    fn detach_min(&mut self, handle: Handle) -> (Handle, (K, V)) {
        let leaf = self.leftmost_leaf(handle);
        (leaf, self.nodes.get_mut(leaf).remove_pair(0))
    }

    /// Removes the smallest pair of the subtree at `handle`, then rebalances its leaf.
    fn pop_min_key(&mut self, handle: Handle) -> (K, V) {
        let (leaf, pair) = self.detach_min(handle);
        self.rebalance(leaf);
        pair
    }

    /// Removes the largest pair of the subtree at `handle`, then rebalances its leaf.
    fn pop_max_key(&mut self, handle: Handle) -> (K, V) {
        let leaf = self.rightmost_leaf(handle);
        let pair = self
            .nodes
            .get_mut(leaf)
            .pop_pair()
            .expect("`RawBTree::pop_max_key()` - leaf is empty!");
        self.rebalance(leaf);
        pair
    }

    /// Removes and returns the smallest pair.
    pub(crate) fn pop_first(&mut self) -> Option<(K, V)> {
        if self.is_empty() {
            return None;
        }
        self.len -= 1;
        self.touch();
        Some(self.pop_min_key(self.root))
    }

    /// Removes and returns the largest pair.
    pub(crate) fn pop_last(&mut self) -> Option<(K, V)> {
        if self.is_empty() {
            return None;
        }
        self.len -= 1;
        self.touch();
        Some(self.pop_max_key(self.root))
    }
}

impl<K: Ord, V, const ORDER: usize> RawBTree<K, V, ORDER> {
    /// Descends from the root and returns the position of `key`, if present.
    pub(crate) fn search<Q>(&self, key: &Q) -> Option<(Handle, usize)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut current = self.root;
        loop {
            let node = self.nodes.get(current);
            match node.search(key) {
                SearchResult::Found(idx) => return Some((current, idx)),
                SearchResult::NotFound(_) if node.is_leaf() => return None,
                SearchResult::NotFound(idx) => current = node.child(idx),
            }
        }
    }

    pub(crate) fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let (handle, idx) = self.search(key)?;
        let node = self.nodes.get(handle);
        Some((node.key(idx), node.value(idx)))
    }

    pub(crate) fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let (handle, idx) = self.search(key)?;
        Some(self.nodes.get_mut(handle).value_mut(idx))
    }

    /// Inserts a pair, overwriting the value in place if the key exists.
    /// Returns the old value if the key was already present.
    pub(crate) fn insert(&mut self, key: K, value: V) -> Option<V> {
        let mut current = self.root;
        loop {
            let node = self.nodes.get_mut(current);
            match node.search(&key) {
                SearchResult::Found(idx) => {
                    return Some(mem::replace(node.value_mut(idx), value));
                }
                SearchResult::NotFound(idx) if node.is_leaf() => {
                    node.insert_pair(idx, key, value);
                    break;
                }
                SearchResult::NotFound(idx) => current = node.child(idx),
            }
        }

        self.len += 1;
        self.touch();
        self.split(current);
        None
    }

    /// Removes a key from the tree and returns the key-value pair.
    pub(crate) fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let (handle, idx) = self.search(key)?;
        Some(self.remove_at(handle, idx))
    }
}
