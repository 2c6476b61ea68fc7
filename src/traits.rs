//! Common contracts for the heap data structures in this crate
//!
//! Three tiers, mirroring what the implementations can actually offer:
//!
//! - [`Heap`]: the minimal key-only contract
//!   (insert/find_min/delete_min/is_empty/len/clear)
//! - [`AddressableHeap`]: adds handles, `decrease_key`, and positional
//!   `delete` for heaps that can address individual elements
//! - [`MergeableHeap`]: adds `meld`, the destructive union of two instances
//!
//! All fallible operations return [`HeapError`]; nothing is retried or
//! recovered internally. Every mutating operation either completes fully or
//! leaves the structure exactly as it was before the call.

use std::fmt;

/// Error type shared by every heap in this crate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeapError {
    /// `find_min`/`delete_min` called on an empty heap
    EmptyHeap,
    /// Attempted key increase via `decrease_key`, or a radix key outside the
    /// constructed range
    InvalidKey,
    /// The handle no longer references a live element (double delete, use
    /// after extraction) or belongs to an unrelated heap instance
    InvalidHandle,
    /// The instance was consumed as a meld donor and may not receive inserts
    /// or participate in further melds until `clear`ed
    StaleHeap,
    /// Meld attempted between heaps with inequivalent ordering policies
    IncompatibleOrdering,
    /// Monotone violation: insert below the last extracted minimum, or a
    /// decrease below the monotone floor
    Monotonicity,
    /// Construction with an invalid key range (`lo > hi`, non-finite bounds)
    InvalidRange,
    /// Mismatched construction arguments (reserved for bulk-construction
    /// collaborators sharing this taxonomy)
    InvalidArgument,
}

impl fmt::Display for HeapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeapError::EmptyHeap => write!(f, "heap is empty"),
            HeapError::InvalidKey => write!(f, "invalid key (keys may only decrease)"),
            HeapError::InvalidHandle => {
                write!(f, "handle is no longer valid (element was removed)")
            }
            HeapError::StaleHeap => {
                write!(f, "heap was consumed by a meld and must be cleared before reuse")
            }
            HeapError::IncompatibleOrdering => {
                write!(f, "heaps have incompatible ordering policies")
            }
            HeapError::Monotonicity => {
                write!(f, "key is below the last extracted minimum (monotone violation)")
            }
            HeapError::InvalidRange => write!(f, "invalid key range"),
            HeapError::InvalidArgument => write!(f, "invalid argument"),
        }
    }
}

impl std::error::Error for HeapError {}

/// A client-held capsule referencing one element of an addressable heap
///
/// Handles are created by `insert`, shrink their key through `decrease_key`,
/// and are permanently invalidated when the element is removed (`delete`, or
/// extraction via `delete_min`). All accessors on an invalidated handle
/// return [`HeapError::InvalidHandle`].
pub trait HeapHandle<K>: Clone {
    /// Returns the element's current key
    fn key(&self) -> Result<K, HeapError>;

    /// Returns true while the referenced element is still in a heap
    fn is_valid(&self) -> bool;
}

/// Minimal heap contract: keys only, no handles
///
/// Implemented by the plain (non-addressable) monotone radix heaps here, and
/// assumed of the array-backed implicit heaps this crate treats as external
/// collaborators.
pub trait Heap<K> {
    /// Inserts a key
    fn insert(&mut self, key: K) -> Result<(), HeapError>;

    /// Returns the minimum key without removing it
    fn find_min(&self) -> Result<K, HeapError>;

    /// Removes and returns the minimum key
    fn delete_min(&mut self) -> Result<K, HeapError>;

    /// Number of live elements
    fn len(&self) -> usize;

    /// True if the heap holds no elements
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes all elements
    fn clear(&mut self);
}

/// Handle-based heap contract with `decrease_key` and positional `delete`
///
/// # Example
///
/// ```rust
/// use addressable_heaps::{AddressableHeap, HeapHandle};
/// use addressable_heaps::pairing::PairingHeap;
///
/// let mut heap = PairingHeap::new();
/// let h = heap.insert(10, "item").unwrap();
/// heap.decrease_key(&h, 5).unwrap();
/// assert_eq!(h.key(), Ok(5));
/// assert_eq!(heap.delete_min(), Ok((5, "item")));
/// ```
pub trait AddressableHeap<K, V> {
    /// The handle type returned by `insert`
    type Handle: HeapHandle<K>;

    /// Inserts an element, returning its handle. O(1) amortized.
    fn insert(&mut self, key: K, value: V) -> Result<Self::Handle, HeapError>;

    /// Returns a handle to the minimum element without removing it. O(1).
    fn find_min(&self) -> Result<Self::Handle, HeapError>;

    /// Removes and returns the minimum element, invalidating its handle.
    /// O(log n) amortized.
    fn delete_min(&mut self) -> Result<(K, V), HeapError>;

    /// Decreases the key of the element referenced by `handle`
    ///
    /// Requires `cmp(new_key, current) <= 0`; an equal key replaces the
    /// stored key without touching the structure. O(1) amortized.
    ///
    /// # Errors
    ///
    /// [`HeapError::InvalidKey`] if the new key compares greater than the
    /// current key, [`HeapError::InvalidHandle`] if the handle was
    /// invalidated or belongs to another instance.
    fn decrease_key(&mut self, handle: &Self::Handle, new_key: K) -> Result<(), HeapError>;

    /// Removes the element referenced by `handle` regardless of its
    /// position. O(log n) amortized.
    fn delete(&mut self, handle: &Self::Handle) -> Result<(K, V), HeapError>;

    /// Number of live elements
    fn len(&self) -> usize;

    /// True if the heap holds no elements
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes all elements and resets a consumed meld donor back to a
    /// usable empty heap. Constant-time apart from deallocation.
    fn clear(&mut self);
}

/// Addressable heaps supporting destructive union
pub trait MergeableHeap<K, V>: AddressableHeap<K, V> {
    /// Moves every element of `other` into `self`, leaving `other`
    /// exhausted (size 0, no root, stale)
    ///
    /// All of `other`'s outstanding handles remain valid and transparently
    /// resolve against `self` afterwards. O(1) amortized; correctness under
    /// cascaded meld chains is preserved via ownership path compression, but
    /// the O(1) bound is not claimed for adversarial chains.
    ///
    /// # Errors
    ///
    /// [`HeapError::IncompatibleOrdering`] if the ordering policies differ,
    /// [`HeapError::StaleHeap`] if either instance was already consumed by a
    /// prior meld.
    fn meld(&mut self, other: &mut Self) -> Result<(), HeapError>;
}
