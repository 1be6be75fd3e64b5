//! An in-memory B-tree map with parent-linked nodes and checked cursors.
//!
//! This crate provides [`BTree`], an ordered map whose nodes each hold sorted
//! key-value pairs and, when internal, one more child than keys. Nodes record
//! their parent and their position under it, which lets a [`Cursor`] walk the
//! tree in order without a stack and lets rebalancing find siblings directly.
//!
//! # Example
//!
//! ```
//! use mbtree::{BTree, CursorError};
//!
//! let mut tree = BTree::<i32, &str, 3>::with_order();
//! for (key, name) in [(3, "three"), (1, "one"), (2, "two")] {
//!     tree.insert(key, name);
//! }
//!
//! // Cursors are detached positions, validated on every use.
//! let mut cursor = tree.find(&2);
//! assert_eq!(cursor.value(&tree), Ok(&"two"));
//! cursor.advance(&tree).unwrap();
//! assert_eq!(cursor.key(&tree), Ok(&3));
//!
//! // Removing a key changes the structure, so older cursors turn stale.
//! tree.erase(&1);
//! assert_eq!(cursor.key(&tree), Err(CursorError::Stale));
//! assert!(tree.find(&1).is_end());
//! ```
//!
//! # Features
//!
//! - **`no_std` compatible** - Only requires `alloc`, no standard library dependency
//! - **Compile-time order** - The branching factor is a const generic, checked to be at least 3
//! - **Checked cursors** - Using a cursor after a structural change is an error, not undefined behavior
//! - **`tracing`** (optional) - Emits splits, rotations, merges and root changes as `tracing` events
//!
//! # Implementation
//!
//! Nodes live in a generational arena and refer to each other by handle. Parents
//! own their children through child handles; parent handles are navigation only.
//! The root node keeps its handle for the tree's lifetime: a root split moves its
//! contents down into a new left child, and a root collapse pulls its only
//! child's contents up.

#![no_std]
// These forbid rules and lint groups are meant to be very restrictive.
#![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]
// Enable coverage attributes for nightly builds.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

extern crate alloc;

mod error;
mod raw;
mod tracing_helpers;

pub mod tree;

pub use error::CursorError;
pub use tree::{BTree, Cursor, DEFAULT_ORDER, Iter, Keys, Values};
