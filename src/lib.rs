//! Addressable Heap Data Structures for Rust
//!
//! This crate provides pointer-based and bucket-based priority queues with
//! efficient `decrease_key` support, as described in computer science
//! literature. Every element-removing or key-changing operation goes through
//! a client-held handle, and all fallible operations report through one
//! shared [`HeapError`] taxonomy.
//!
//! # Features
//!
//! - **Pairing Heap**: O(1) amortized insert, meld, and decrease_key
//!   (conjectured o(log n)); O(log n) amortized delete-min
//! - **Hollow Heap**: O(1) worst-case insert, meld, and decrease_key;
//!   O(log n) amortized delete-min via lazy deletion
//! - **Monotone Radix Heap**: O(1) amortized operations over a fixed key
//!   range under the monotone extraction constraint, in plain and
//!   addressable variants plus an arbitrary-precision (`BigUint`) variant
//!
//! The comparison-based heaps ([`pairing::PairingHeap`],
//! [`hollow::HollowHeap`]) accept an injected [`OrderingPolicy`] and support
//! destructive `meld` that keeps the donor's outstanding handles valid.
//!
//! # Example
//!
//! ```rust
//! use addressable_heaps::pairing::PairingHeap;
//! use addressable_heaps::{AddressableHeap, MergeableHeap};
//!
//! let mut heap = PairingHeap::new();
//! let handle1 = heap.insert(5, "item1").unwrap();
//! let _handle2 = heap.insert(3, "item2").unwrap();
//! heap.decrease_key(&handle1, 1).unwrap();
//! assert_eq!(heap.delete_min(), Ok((1, "item1")));
//!
//! let mut other = PairingHeap::new();
//! other.insert(2, "item3").unwrap();
//! heap.meld(&mut other).unwrap();
//! assert_eq!(heap.delete_min(), Ok((2, "item3")));
//! ```

pub mod big_radix;
pub mod hollow;
pub mod ordering;
mod ownership;
pub mod pairing;
pub mod radix;
pub mod traits;

// Re-export the main contracts for convenience
pub use ordering::OrderingPolicy;
pub use traits::{AddressableHeap, Heap, HeapError, HeapHandle, MergeableHeap};
