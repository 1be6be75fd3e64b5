use core::borrow::Borrow;
use core::fmt;
use core::ops::Index;

use crate::error::CursorError;
use crate::raw::RawBTree;

mod cursor;
mod iter;

pub use cursor::Cursor;
pub use iter::{Iter, Keys, Values};

/// Branching factor used by [`BTree::new`].
pub const DEFAULT_ORDER: usize = 16;

/// An ordered map based on a [B-Tree] whose nodes link back to their parents.
///
/// Keys are kept sorted. Every node, internal or leaf, stores key-value pairs;
/// a non-root node holds between `(ORDER - 1) / 2` and `ORDER - 1` of them, and
/// a node that fills up to `ORDER` keys is split around its median. Removals
/// borrow from a sibling or merge with it, so all leaves stay at the same depth.
///
/// Besides borrowing iterators, the map hands out detached [`Cursor`]s from
/// [`find`], [`begin`] and [`end`]. A cursor holds no borrow of the map; any
/// structural change (an insert of a new key, or a removal) makes existing
/// cursors stale, and using one then returns [`CursorError::Stale`].
///
/// `ORDER` must be at least 3; smaller values are rejected at compile time.
///
/// # Examples
///
/// ```
/// use mbtree::BTree;
///
/// let mut planets = BTree::new();
/// planets.insert("Mercury", 0.39);
/// planets.insert("Venus", 0.72);
/// planets.insert("Earth", 1.0);
///
/// assert_eq!(planets.get("Venus"), Some(&0.72));
/// assert_eq!(planets.len(), 3);
///
/// let order: Vec<_> = planets.keys().copied().collect();
/// assert_eq!(order, ["Earth", "Mercury", "Venus"]);
///
/// planets.erase("Mercury");
/// assert!(planets.find("Mercury").is_end());
/// ```
///
/// A small order makes the tree grow quickly:
///
/// ```
/// use mbtree::BTree;
///
/// let mut tree = BTree::<u32, (), 3>::with_order();
/// for key in 0..7 {
///     tree.insert(key, ());
/// }
/// assert_eq!(tree.height(), 3);
/// ```
///
/// [B-Tree]: https://en.wikipedia.org/wiki/B-tree
/// [`find`]: BTree::find
/// [`begin`]: BTree::begin
/// [`end`]: BTree::end
pub struct BTree<K, V, const ORDER: usize = DEFAULT_ORDER> {
    raw: RawBTree<K, V, ORDER>,
}

impl<K, V> BTree<K, V> {
    /// Makes a new, empty `BTree` with the [`DEFAULT_ORDER`].
    ///
    /// # Complexity
    ///
    /// O(1)
    ///
    /// # Examples
    ///
    /// ```
    /// use mbtree::BTree;
    ///
    /// let mut map = BTree::new();
    ///
    /// // entries can now be inserted into the empty map
    /// map.insert(1, "a");
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::with_order()
    }
}

impl<K, V, const ORDER: usize> BTree<K, V, ORDER> {
    /// Makes a new, empty `BTree` with the branching factor given by `ORDER`.
    ///
    /// # Examples
    ///
    /// ```
    /// use mbtree::BTree;
    ///
    /// let mut map = BTree::<&str, i32, 5>::with_order();
    /// map.insert("a", 1);
    /// assert_eq!(map.len(), 1);
    /// ```
    #[must_use]
    pub fn with_order() -> Self {
        Self { raw: RawBTree::new() }
    }

    /// Returns the number of elements in the map.
    ///
    /// # Complexity
    ///
    /// O(1)
    ///
    /// # Examples
    ///
    /// ```
    /// use mbtree::BTree;
    ///
    /// let mut a = BTree::new();
    /// assert_eq!(a.len(), 0);
    /// a.insert(1, "a");
    /// assert_eq!(a.len(), 1);
    /// ```
    #[must_use]
    pub const fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns `true` if the map contains no elements.
    ///
    /// # Complexity
    ///
    /// O(1)
    ///
    /// # Examples
    ///
    /// ```
    /// use mbtree::BTree;
    ///
    /// let mut a = BTree::new();
    /// assert!(a.is_empty());
    /// a.insert(1, "a");
    /// assert!(!a.is_empty());
    /// ```
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Clears the map, removing all elements. Invalidates every cursor.
    ///
    /// # Complexity
    ///
    /// O(n)
    ///
    /// # Examples
    ///
    /// ```
    /// use mbtree::BTree;
    ///
    /// let mut a = BTree::new();
    /// a.insert(1, "a");
    /// a.clear();
    /// assert!(a.is_empty());
    /// ```
    pub fn clear(&mut self) {
        self.raw.clear();
    }

    /// Returns the number of levels in the tree, or 0 if it is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use mbtree::BTree;
    ///
    /// let mut map = BTree::<i32, i32, 3>::with_order();
    /// assert_eq!(map.height(), 0);
    /// map.insert(1, 1);
    /// assert_eq!(map.height(), 1);
    /// ```
    #[must_use]
    pub fn height(&self) -> usize {
        self.raw.height()
    }

    /// Returns the first key-value pair in the map.
    /// The key in this pair is the minimum key in the map.
    ///
    /// # Examples
    ///
    /// ```
    /// use mbtree::BTree;
    ///
    /// let mut map = BTree::new();
    /// assert_eq!(map.first_key_value(), None);
    /// map.insert(1, "b");
    /// map.insert(2, "a");
    /// assert_eq!(map.first_key_value(), Some((&1, &"b")));
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        let (handle, slot) = self.raw.first()?;
        let node = self.raw.node(handle);
        Some((node.key(slot), node.value(slot)))
    }

    /// Returns the last key-value pair in the map.
    /// The key in this pair is the maximum key in the map.
    ///
    /// # Examples
    ///
    /// ```
    /// use mbtree::BTree;
    ///
    /// let mut map = BTree::new();
    /// map.insert(1, "b");
    /// map.insert(2, "a");
    /// assert_eq!(map.last_key_value(), Some((&2, &"a")));
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        let (handle, slot) = self.raw.last()?;
        let node = self.raw.node(handle);
        Some((node.key(slot), node.value(slot)))
    }

    /// Removes and returns the first element in the map.
    /// The key of this element is the minimum key that was in the map.
    ///
    /// # Examples
    ///
    /// ```
    /// use mbtree::BTree;
    ///
    /// let mut map = BTree::new();
    /// map.insert(1, "a");
    /// map.insert(2, "b");
    /// while let Some((key, _val)) = map.pop_first() {
    ///     assert!(map.iter().all(|(k, _v)| *k > key));
    /// }
    /// assert!(map.is_empty());
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn pop_first(&mut self) -> Option<(K, V)> {
        self.raw.pop_first()
    }

    /// Removes and returns the last element in the map.
    /// The key of this element is the maximum key that was in the map.
    ///
    /// # Examples
    ///
    /// ```
    /// use mbtree::BTree;
    ///
    /// let mut map = BTree::new();
    /// map.insert(1, "a");
    /// map.insert(2, "b");
    /// while let Some((key, _val)) = map.pop_last() {
    ///     assert!(map.iter().all(|(k, _v)| *k < key));
    /// }
    /// assert!(map.is_empty());
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn pop_last(&mut self) -> Option<(K, V)> {
        self.raw.pop_last()
    }

    /// Returns a cursor at the smallest key, or [`end`](BTree::end) if the map is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use mbtree::BTree;
    ///
    /// let mut map = BTree::new();
    /// assert_eq!(map.begin(), map.end());
    ///
    /// map.insert(2, "b");
    /// map.insert(1, "a");
    /// assert_eq!(map.begin().key(&map), Ok(&1));
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn begin(&self) -> Cursor {
        Cursor::new(self.raw.first(), self.raw.epoch())
    }

    /// Returns the end sentinel, the position one past the largest key.
    #[must_use]
    pub fn end(&self) -> Cursor {
        Cursor::new(None, self.raw.epoch())
    }

    /// Returns a mutable reference to the value under `cursor`.
    ///
    /// # Errors
    ///
    /// [`CursorError::End`] if `cursor` is the end sentinel, and
    /// [`CursorError::Stale`] if the map changed structurally since the cursor was made.
    ///
    /// # Examples
    ///
    /// ```
    /// use mbtree::BTree;
    ///
    /// let mut map = BTree::from([(1, 10), (2, 20)]);
    /// let cursor = map.find(&2);
    /// *map.value_mut_at(cursor).unwrap() += 1;
    /// assert_eq!(map[&2], 21);
    /// ```
    pub fn value_mut_at(&mut self, cursor: Cursor) -> Result<&mut V, CursorError> {
        let (handle, slot) = cursor.locate(&self.raw)?;
        self.raw
            .try_node_mut(handle)
            .map(|node| node.value_mut(slot))
            .ok_or(CursorError::Stale)
    }

    /// Gets an iterator over the entries of the map, sorted by key.
    ///
    /// # Examples
    ///
    /// ```
    /// use mbtree::BTree;
    ///
    /// let mut map = BTree::new();
    /// map.insert(3, "c");
    /// map.insert(2, "b");
    /// map.insert(1, "a");
    ///
    /// for (key, value) in map.iter() {
    ///     println!("{key}: {value}");
    /// }
    ///
    /// let (first_key, first_value) = map.iter().next().unwrap();
    /// assert_eq!((*first_key, *first_value), (1, "a"));
    /// ```
    pub fn iter(&self) -> Iter<'_, K, V, ORDER> {
        Iter::new(&self.raw)
    }

    /// Gets an iterator over the keys of the map, in sorted order.
    ///
    /// # Examples
    ///
    /// ```
    /// use mbtree::BTree;
    ///
    /// let mut a = BTree::new();
    /// a.insert(2, "b");
    /// a.insert(1, "a");
    ///
    /// let keys: Vec<_> = a.keys().cloned().collect();
    /// assert_eq!(keys, [1, 2]);
    /// ```
    pub fn keys(&self) -> Keys<'_, K, V, ORDER> {
        Keys::new(self.iter())
    }

    /// Gets an iterator over the values of the map, in order by key.
    ///
    /// # Examples
    ///
    /// ```
    /// use mbtree::BTree;
    ///
    /// let mut a = BTree::new();
    /// a.insert(1, "hello");
    /// a.insert(2, "goodbye");
    ///
    /// let values: Vec<&str> = a.values().cloned().collect();
    /// assert_eq!(values, ["hello", "goodbye"]);
    /// ```
    pub fn values(&self) -> Values<'_, K, V, ORDER> {
        Values::new(self.iter())
    }
}

impl<K: Ord, V, const ORDER: usize> BTree<K, V, ORDER> {
    /// Returns a reference to the value corresponding to the key.
    ///
    /// The key may be any borrowed form of the map's key type, but the ordering
    /// on the borrowed form *must* match the ordering on the key type.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use mbtree::BTree;
    ///
    /// let mut map = BTree::new();
    /// map.insert(1, "a");
    /// assert_eq!(map.get(&1), Some(&"a"));
    /// assert_eq!(map.get(&2), None);
    /// ```
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.get_key_value(key).map(|(_, value)| value)
    }

    /// Returns the key-value pair corresponding to the supplied key.
    ///
    /// # Examples
    ///
    /// ```
    /// use mbtree::BTree;
    ///
    /// let mut map = BTree::new();
    /// map.insert(1, "a");
    /// assert_eq!(map.get_key_value(&1), Some((&1, &"a")));
    /// assert_eq!(map.get_key_value(&2), None);
    /// ```
    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.get_key_value(key)
    }

    /// Returns a mutable reference to the value corresponding to the key.
    ///
    /// # Examples
    ///
    /// ```
    /// use mbtree::BTree;
    ///
    /// let mut map = BTree::new();
    /// map.insert(1, "a");
    /// if let Some(x) = map.get_mut(&1) {
    ///     *x = "b";
    /// }
    /// assert_eq!(map[&1], "b");
    /// ```
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.get_mut(key)
    }

    /// Returns `true` if the map contains a value for the specified key.
    ///
    /// # Examples
    ///
    /// ```
    /// use mbtree::BTree;
    ///
    /// let mut map = BTree::new();
    /// map.insert(1, "a");
    /// assert!(map.contains_key(&1));
    /// assert!(!map.contains_key(&2));
    /// ```
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.search(key).is_some()
    }

    /// Inserts a key-value pair into the map.
    ///
    /// If the map did not have this key present, `None` is returned and the tree
    /// may split nodes on the way back up; existing cursors become stale.
    ///
    /// If the map did have this key present, the value is updated in place and
    /// the old value is returned. The key is not updated, and cursors stay valid.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use mbtree::BTree;
    ///
    /// let mut map = BTree::new();
    /// assert_eq!(map.insert(37, "a"), None);
    /// assert_eq!(map.is_empty(), false);
    ///
    /// map.insert(37, "b");
    /// assert_eq!(map.insert(37, "c"), Some("b"));
    /// assert_eq!(map[&37], "c");
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.raw.insert(key, value)
    }

    /// Removes a key from the map, returning the value at the key if the key
    /// was previously in the map.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use mbtree::BTree;
    ///
    /// let mut map = BTree::new();
    /// map.insert(1, "a");
    /// assert_eq!(map.remove(&1), Some("a"));
    /// assert_eq!(map.remove(&1), None);
    /// ```
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.remove_entry(key).map(|(_, value)| value)
    }

    /// Removes a key from the map, returning the stored key and value if the key
    /// was previously in the map.
    ///
    /// # Examples
    ///
    /// ```
    /// use mbtree::BTree;
    ///
    /// let mut map = BTree::new();
    /// map.insert(1, "a");
    /// assert_eq!(map.remove_entry(&1), Some((1, "a")));
    /// assert_eq!(map.remove_entry(&1), None);
    /// ```
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.remove_entry(key)
    }

    /// Removes a key from the map if present. Erasing an absent key does nothing.
    ///
    /// # Examples
    ///
    /// ```
    /// use mbtree::BTree;
    ///
    /// let mut map = BTree::from([(1, "a"), (2, "b")]);
    /// map.erase(&1);
    /// map.erase(&7);
    /// assert_eq!(map.len(), 1);
    /// ```
    pub fn erase<Q>(&mut self, key: &Q)
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.remove_entry(key);
    }

    /// Returns a cursor at `key`, or [`end`](BTree::end) if the key is absent.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use mbtree::BTree;
    ///
    /// let map = BTree::from([(1, "a"), (5, "e")]);
    /// let cursor = map.find(&5);
    /// assert_eq!(cursor.key_value(&map), Ok((&5, &"e")));
    /// assert_eq!(map.find(&3), map.end());
    /// ```
    pub fn find<Q>(&self, key: &Q) -> Cursor
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        Cursor::new(self.raw.search(key), self.raw.epoch())
    }
}

impl<K: Clone, V: Clone, const ORDER: usize> Clone for BTree<K, V, ORDER> {
    fn clone(&self) -> Self {
        BTree { raw: self.raw.clone() }
    }
}

impl<K: PartialEq, V: PartialEq, const ORDER: usize> PartialEq for BTree<K, V, ORDER> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().zip(other.iter()).all(|(a, b)| a == b)
    }
}

impl<K: Eq, V: Eq, const ORDER: usize> Eq for BTree<K, V, ORDER> {}

impl<K: fmt::Debug, V: fmt::Debug, const ORDER: usize> fmt::Debug for BTree<K, V, ORDER> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, const ORDER: usize> Default for BTree<K, V, ORDER> {
    fn default() -> Self {
        Self::with_order()
    }
}

impl<K: Ord, V, const ORDER: usize> FromIterator<(K, V)> for BTree<K, V, ORDER> {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = Self::with_order();
        map.extend(iter);
        map
    }
}

impl<K: Ord, V, const ORDER: usize> Extend<(K, V)> for BTree<K, V, ORDER> {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<'a, K, V, const ORDER: usize> IntoIterator for &'a BTree<K, V, ORDER> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V, ORDER>;

    fn into_iter(self) -> Iter<'a, K, V, ORDER> {
        self.iter()
    }
}

impl<K, Q, V, const ORDER: usize> Index<&Q> for BTree<K, V, ORDER>
where
    K: Borrow<Q> + Ord,
    Q: ?Sized + Ord,
{
    type Output = V;

    /// Returns a reference to the value corresponding to the supplied key.
    ///
    /// # Panics
    ///
    /// Panics if the key is not present in the `BTree`.
    fn index(&self, key: &Q) -> &V {
        self.get(key).expect("no entry found for key")
    }
}

impl<K: Ord, V, const N: usize> From<[(K, V); N]> for BTree<K, V> {
    /// Converts a `[(K, V); N]` into a `BTree` of the default order.
    ///
    /// ```
    /// use mbtree::BTree;
    ///
    /// let map1 = BTree::from([(1, 2), (3, 4)]);
    /// let map2: BTree<_, _> = [(1, 2), (3, 4)].into();
    /// assert_eq!(map1, map2);
    /// ```
    fn from(arr: [(K, V); N]) -> Self {
        arr.into_iter().collect()
    }
}
