use crate::error::CursorError;
use crate::raw::{Handle, RawBTree};

use super::BTree;

/// A detached position in a [`BTree`]: a node and a slot within it, or the end sentinel.
///
/// A cursor borrows nothing, so it can be kept across calls that take the map
/// by `&mut`. Each access validates it against the map. Cursors compare equal
/// when they name the same position; two end sentinels are always equal.
///
/// # Examples
///
/// ```
/// use mbtree::{BTree, CursorError};
///
/// let map = BTree::from([(1, "a"), (2, "b")]);
/// let mut cursor = map.begin();
/// assert_eq!(cursor.key(&map), Ok(&1));
///
/// cursor.advance(&map).unwrap();
/// assert_eq!(cursor.value(&map), Ok(&"b"));
///
/// cursor.advance(&map).unwrap();
/// assert_eq!(cursor, map.end());
/// assert_eq!(cursor.advance(&map), Err(CursorError::End));
/// ```
#[derive(Clone, Copy, Debug)]
pub struct Cursor {
    position: Option<(Handle, usize)>,
    // Structural epoch of the map when this cursor was made.
    epoch: u64,
}

impl Cursor {
    pub(crate) const fn new(position: Option<(Handle, usize)>, epoch: u64) -> Self {
        Self { position, epoch }
    }

    /// Returns `true` if this is the end sentinel.
    #[must_use]
    pub const fn is_end(&self) -> bool {
        self.position.is_none()
    }

    /// Resolves this cursor against `raw`, checking that it is neither the end
    /// sentinel nor stale.
    pub(crate) fn locate<K, V, const ORDER: usize>(
        &self,
        raw: &RawBTree<K, V, ORDER>,
    ) -> Result<(Handle, usize), CursorError> {
        let (handle, slot) = self.position.ok_or(CursorError::End)?;
        if self.epoch != raw.epoch() {
            return Err(CursorError::Stale);
        }
        match raw.try_node(handle) {
            Some(node) if slot < node.key_count() => Ok((handle, slot)),
            _ => Err(CursorError::Stale),
        }
    }

    /// Returns the key and value under the cursor.
    ///
    /// # Errors
    ///
    /// [`CursorError::End`] for the end sentinel, [`CursorError::Stale`] if `map`
    /// changed structurally after the cursor was made.
    pub fn key_value<'a, K, V, const ORDER: usize>(
        &self,
        map: &'a BTree<K, V, ORDER>,
    ) -> Result<(&'a K, &'a V), CursorError> {
        let (handle, slot) = self.locate(&map.raw)?;
        let node = map.raw.node(handle);
        Ok((node.key(slot), node.value(slot)))
    }

    /// Returns the key under the cursor.
    ///
    /// # Errors
    ///
    /// See [`Cursor::key_value`].
    pub fn key<'a, K, V, const ORDER: usize>(&self, map: &'a BTree<K, V, ORDER>) -> Result<&'a K, CursorError> {
        self.key_value(map).map(|(key, _)| key)
    }

    /// Returns the value under the cursor.
    ///
    /// # Errors
    ///
    /// See [`Cursor::key_value`].
    pub fn value<'a, K, V, const ORDER: usize>(&self, map: &'a BTree<K, V, ORDER>) -> Result<&'a V, CursorError> {
        self.key_value(map).map(|(_, value)| value)
    }

    /// Moves to the in-order successor. Advancing from the largest key yields the end sentinel.
    ///
    /// # Errors
    ///
    /// [`CursorError::End`] if the cursor is already at the end, [`CursorError::Stale`]
    /// if `map` changed structurally after the cursor was made. The cursor is left
    /// unchanged on error.
    ///
    /// # Complexity
    ///
    /// O(log n) worst case, amortized O(1) over a full traversal.
    pub fn advance<K, V, const ORDER: usize>(&mut self, map: &BTree<K, V, ORDER>) -> Result<(), CursorError> {
        let (handle, slot) = self.locate(&map.raw)?;
        self.position = map.raw.successor(handle, slot);
        Ok(())
    }
}

impl PartialEq for Cursor {
    fn eq(&self, other: &Self) -> bool {
        self.position == other.position
    }
}

impl Eq for Cursor {}
