use core::fmt;
use core::iter::FusedIterator;

use crate::raw::{Handle, RawBTree};

use super::DEFAULT_ORDER;

/// An iterator over the entries of a `BTree`.
///
/// This `struct` is created by the [`iter`] method on [`BTree`]. See its
/// documentation for more.
///
/// # Examples
///
/// ```
/// use mbtree::BTree;
///
/// let map = BTree::from([(1, "a"), (2, "b")]);
/// let mut iter = map.iter();
/// assert_eq!(iter.len(), 2);
/// assert_eq!(iter.next(), Some((&1, &"a")));
/// assert_eq!(iter.next(), Some((&2, &"b")));
/// assert_eq!(iter.next(), None);
/// ```
///
/// [`iter`]: super::BTree::iter
/// [`BTree`]: super::BTree
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, K, V, const ORDER: usize = DEFAULT_ORDER> {
    tree: &'a RawBTree<K, V, ORDER>,
    front: Option<(Handle, usize)>,
    remaining: usize,
}

impl<'a, K, V, const ORDER: usize> Iter<'a, K, V, ORDER> {
    pub(crate) fn new(tree: &'a RawBTree<K, V, ORDER>) -> Self {
        Self {
            tree,
            front: tree.first(),
            remaining: tree.len(),
        }
    }
}

impl<'a, K, V, const ORDER: usize> Iterator for Iter<'a, K, V, ORDER> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let (handle, slot) = self.front?;
        let node = self.tree.node(handle);
        self.front = self.tree.successor(handle, slot);
        self.remaining -= 1;
        Some((node.key(slot), node.value(slot)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V, const ORDER: usize> ExactSizeIterator for Iter<'_, K, V, ORDER> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<K, V, const ORDER: usize> FusedIterator for Iter<'_, K, V, ORDER> {}

impl<K, V, const ORDER: usize> Clone for Iter<'_, K, V, ORDER> {
    fn clone(&self) -> Self {
        Iter {
            tree: self.tree,
            front: self.front,
            remaining: self.remaining,
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug, const ORDER: usize> fmt::Debug for Iter<'_, K, V, ORDER> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

/// An iterator over the keys of a `BTree`.
///
/// This `struct` is created by the [`keys`] method on [`BTree`].
///
/// [`keys`]: super::BTree::keys
/// [`BTree`]: super::BTree
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Keys<'a, K, V, const ORDER: usize = DEFAULT_ORDER> {
    inner: Iter<'a, K, V, ORDER>,
}

impl<'a, K, V, const ORDER: usize> Keys<'a, K, V, ORDER> {
    pub(crate) fn new(inner: Iter<'a, K, V, ORDER>) -> Self {
        Self { inner }
    }
}

impl<'a, K, V, const ORDER: usize> Iterator for Keys<'a, K, V, ORDER> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V, const ORDER: usize> ExactSizeIterator for Keys<'_, K, V, ORDER> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V, const ORDER: usize> FusedIterator for Keys<'_, K, V, ORDER> {}

impl<K, V, const ORDER: usize> Clone for Keys<'_, K, V, ORDER> {
    fn clone(&self) -> Self {
        Keys {
            inner: self.inner.clone(),
        }
    }
}

impl<K: fmt::Debug, V, const ORDER: usize> fmt::Debug for Keys<'_, K, V, ORDER> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

/// An iterator over the values of a `BTree`.
///
/// This `struct` is created by the [`values`] method on [`BTree`].
///
/// [`values`]: super::BTree::values
/// [`BTree`]: super::BTree
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Values<'a, K, V, const ORDER: usize = DEFAULT_ORDER> {
    inner: Iter<'a, K, V, ORDER>,
}

impl<'a, K, V, const ORDER: usize> Values<'a, K, V, ORDER> {
    pub(crate) fn new(inner: Iter<'a, K, V, ORDER>) -> Self {
        Self { inner }
    }
}

impl<'a, K, V, const ORDER: usize> Iterator for Values<'a, K, V, ORDER> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V, const ORDER: usize> ExactSizeIterator for Values<'_, K, V, ORDER> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V, const ORDER: usize> FusedIterator for Values<'_, K, V, ORDER> {}

impl<K, V, const ORDER: usize> Clone for Values<'_, K, V, ORDER> {
    fn clone(&self) -> Self {
        Values {
            inner: self.inner.clone(),
        }
    }
}

impl<K, V: fmt::Debug, const ORDER: usize> fmt::Debug for Values<'_, K, V, ORDER> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use crate::BTree;
    use alloc::format;
    use alloc::vec::Vec;

    #[test]
    fn lengths_track_consumption() {
        let map: BTree<u32, u32, 3> = (0..25).map(|k| (k, k * k)).collect();
        let mut iter = map.iter();
        assert_eq!(iter.len(), 25);
        iter.next();
        iter.next();
        assert_eq!(iter.len(), 23);
        assert_eq!(iter.count(), 23);
    }

    #[test]
    fn fused_after_exhaustion() {
        let map: BTree<u32, u32, 3> = (0..4).map(|k| (k, k)).collect();
        let mut values = map.values();
        assert_eq!(values.by_ref().copied().collect::<Vec<_>>(), [0, 1, 2, 3]);
        assert_eq!(values.next(), None);
        assert_eq!(values.next(), None);
    }

    #[test]
    fn empty_map_yields_nothing() {
        let map: BTree<u32, u32> = BTree::new();
        assert_eq!(map.iter().next(), None);
        assert_eq!(map.keys().len(), 0);
    }

    #[test]
    fn debug_does_not_consume() {
        let map = BTree::from([(1, 'x'), (2, 'y')]);
        let keys = map.keys();
        assert_eq!(format!("{keys:?}"), "[1, 2]");
        assert_eq!(keys.count(), 2);
    }
}
