//! Monotone radix heaps
//!
//! Bucketed priority queues that trade generality for speed: construction
//! fixes a closed key range `[lo, hi]`, and every inserted key must be no
//! smaller than the most recently extracted minimum (the *monotone*
//! constraint — naturally satisfied by Dijkstra-style workloads where
//! relaxed distances never fall below the distance just settled).
//!
//! Keys map through an order-preserving unsigned encoding
//! ([`RadixKey::radix_bits`]) and land in the bucket indexed by the
//! bit-length of their XOR distance from the last extracted minimum; bucket
//! 0 holds only keys exactly equal to that minimum. When bucket 0 runs dry,
//! the lowest non-empty bucket is scanned for its true minimum and every
//! element of it is redistributed relative to the new minimum. Each element
//! redistributes to a strictly lower bucket index, so lifetime
//! redistribution work is O(n·B) for B buckets — O(1) amortized per
//! operation at a fixed bit width.
//!
//! Two variants share the scheme: [`RadixHeap`], a plain key-only queue, and
//! [`AddressableRadixHeap`], which adds handles with `decrease_key` and
//! `delete` through per-bucket positional membership (O(1) splice).
//!
//! Radix heaps use the natural numeric order exclusively (no injected
//! comparator) and do not meld.
//!
//! # Cache behavior
//!
//! Buckets are contiguous vectors and most operations touch one or two of
//! them, so these heaps are markedly faster than pointer-based heaps on
//! monotone workloads.
//!
//! # References
//!
//! - Ahuja, R. K., Mehlhorn, K., Orlin, J. B., & Tarjan, R. E. (1990).
//!   "Faster algorithms for the shortest path problem."
//!   *Journal of the ACM*, 37(2), 213-223.

use crate::traits::{AddressableHeap, Heap, HeapError, HeapHandle};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Keys usable in a fixed-width radix heap
///
/// Implementations must make `radix_bits` strictly order-preserving:
/// `a < b` exactly when `a.radix_bits() < b.radix_bits()`. Provided for the
/// unsigned integers (identity), the signed integers (sign-bit flip), and
/// `f32`/`f64` (sign-fold of the IEEE bit pattern; total over the finite
/// floats).
pub trait RadixKey: Copy + PartialOrd {
    /// Order-preserving mapping into 64-bit unsigned space
    fn radix_bits(self) -> u64;

    /// Whether the value may serve as a range bound (floats exclude
    /// NaN/infinities)
    fn is_valid_bound(self) -> bool {
        true
    }
}

macro_rules! impl_radix_key_unsigned {
    ($($t:ty),+) => {
        $(
            impl RadixKey for $t {
                #[inline]
                fn radix_bits(self) -> u64 {
                    self as u64
                }
            }
        )+
    };
}

impl_radix_key_unsigned!(u8, u16, u32, u64, usize);

macro_rules! impl_radix_key_signed {
    ($($t:ty => $ut:ty),+) => {
        $(
            impl RadixKey for $t {
                #[inline]
                fn radix_bits(self) -> u64 {
                    // Flipping the sign bit shifts the signed line onto the
                    // unsigned one.
                    (self as $ut ^ (1 << (<$ut>::BITS - 1))) as u64
                }
            }
        )+
    };
}

impl_radix_key_signed!(i8 => u8, i16 => u16, i32 => u32, i64 => u64);

impl RadixKey for f32 {
    #[inline]
    fn radix_bits(self) -> u64 {
        let bits = self.to_bits();
        let folded = if bits & 0x8000_0000 != 0 {
            !bits
        } else {
            bits | 0x8000_0000
        };
        folded as u64
    }

    fn is_valid_bound(self) -> bool {
        self.is_finite()
    }
}

impl RadixKey for f64 {
    #[inline]
    fn radix_bits(self) -> u64 {
        let bits = self.to_bits();
        if bits & 0x8000_0000_0000_0000 != 0 {
            !bits
        } else {
            bits | 0x8000_0000_0000_0000
        }
    }

    fn is_valid_bound(self) -> bool {
        self.is_finite()
    }
}

#[inline]
fn bit_len(x: u64) -> usize {
    (u64::BITS - x.leading_zeros()) as usize
}

/// Plain monotone radix heap over a closed key range
///
/// # Example
///
/// ```rust
/// use addressable_heaps::Heap;
/// use addressable_heaps::radix::RadixHeap;
///
/// let mut heap: RadixHeap<u32> = RadixHeap::new(0, 100).unwrap();
/// heap.insert(50).unwrap();
/// heap.insert(30).unwrap();
/// assert_eq!(heap.delete_min(), Ok(30));
/// // 20 is below the extracted minimum now:
/// assert!(heap.insert(20).is_err());
/// ```
pub struct RadixHeap<K: RadixKey> {
    /// Bucket `0` holds keys equal to the last extracted minimum; bucket `i`
    /// holds keys whose encoding differs from it first at bit `i - 1`.
    buckets: Vec<Vec<K>>,
    lo: K,
    hi: K,
    /// Encoding of the last extracted minimum (starts at `lo`)
    last_bits: u64,
    len: usize,
}

impl<K: RadixKey> RadixHeap<K> {
    /// Creates a heap accepting keys in `[lo, hi]`
    ///
    /// # Errors
    ///
    /// [`HeapError::InvalidRange`] if `lo > hi` or a bound is not a valid
    /// key (non-finite float).
    pub fn new(lo: K, hi: K) -> Result<Self, HeapError> {
        if !lo.is_valid_bound() || !hi.is_valid_bound() || !(lo <= hi) {
            return Err(HeapError::InvalidRange);
        }
        let span = lo.radix_bits() ^ hi.radix_bits();
        let buckets = vec![Vec::new(); bit_len(span) + 1];
        Ok(RadixHeap {
            buckets,
            lo,
            hi,
            last_bits: lo.radix_bits(),
            len: 0,
        })
    }

    #[inline]
    fn bucket_index(&self, bits: u64) -> usize {
        bit_len(bits ^ self.last_bits)
    }

    fn check_key(&self, key: K) -> Result<u64, HeapError> {
        if !(key >= self.lo && key <= self.hi) {
            return Err(HeapError::InvalidKey);
        }
        let bits = key.radix_bits();
        if bits < self.last_bits {
            return Err(HeapError::Monotonicity);
        }
        Ok(bits)
    }

    /// Moves the contents of the lowest non-empty bucket down, making its
    /// true minimum the new extraction marker. Every element lands in a
    /// strictly lower bucket than the one it came from.
    fn redistribute(&mut self) {
        let src = (1..self.buckets.len())
            .find(|&i| !self.buckets[i].is_empty())
            .expect("non-empty heap has a non-empty bucket");
        let min_bits = self.buckets[src]
            .iter()
            .map(|k| k.radix_bits())
            .min()
            .expect("bucket is non-empty");
        self.last_bits = min_bits;

        let drained = std::mem::take(&mut self.buckets[src]);
        for key in drained {
            let idx = self.bucket_index(key.radix_bits());
            debug_assert!(idx < src);
            self.buckets[idx].push(key);
        }
    }
}

impl<K: RadixKey> Heap<K> for RadixHeap<K> {
    fn insert(&mut self, key: K) -> Result<(), HeapError> {
        let bits = self.check_key(key)?;
        let idx = self.bucket_index(bits);
        self.buckets[idx].push(key);
        self.len += 1;
        Ok(())
    }

    fn find_min(&self) -> Result<K, HeapError> {
        if self.len == 0 {
            return Err(HeapError::EmptyHeap);
        }
        if let Some(&key) = self.buckets[0].first() {
            return Ok(key);
        }
        // The global minimum always sits in the lowest non-empty bucket.
        let bucket = self
            .buckets
            .iter()
            .find(|b| !b.is_empty())
            .expect("non-empty heap has a non-empty bucket");
        let min = bucket
            .iter()
            .min_by_key(|k| k.radix_bits())
            .expect("bucket is non-empty");
        Ok(*min)
    }

    fn delete_min(&mut self) -> Result<K, HeapError> {
        if self.len == 0 {
            return Err(HeapError::EmptyHeap);
        }
        if self.buckets[0].is_empty() {
            self.redistribute();
        }
        let key = self.buckets[0].pop().expect("redistribution fills bucket 0");
        self.len -= 1;
        Ok(key)
    }

    fn len(&self) -> usize {
        self.len
    }

    fn clear(&mut self) {
        for bucket in &mut self.buckets {
            bucket.clear();
        }
        self.last_bits = self.lo.radix_bits();
        self.len = 0;
    }
}

/// Position of an addressable entry inside the bucket array
#[derive(Clone, Copy)]
struct Position {
    bucket: usize,
    slot: usize,
}

/// Shared element record: the bucket array and the handle both point here.
/// `value` doubles as the liveness flag.
struct Entry<K, V> {
    key: Cell<K>,
    pos: Cell<Position>,
    value: RefCell<Option<V>>,
}

impl<K: RadixKey, V> Entry<K, V> {
    fn is_live(&self) -> bool {
        self.value.borrow().is_some()
    }
}

/// Handle to an element in an [`AddressableRadixHeap`]
pub struct RadixHandle<K: RadixKey, V> {
    entry: Rc<Entry<K, V>>,
}

impl<K: RadixKey, V> Clone for RadixHandle<K, V> {
    fn clone(&self) -> Self {
        RadixHandle {
            entry: Rc::clone(&self.entry),
        }
    }
}

impl<K: RadixKey, V> PartialEq for RadixHandle<K, V> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.entry, &other.entry)
    }
}

impl<K: RadixKey, V> Eq for RadixHandle<K, V> {}

impl<K: RadixKey, V> std::fmt::Debug for RadixHandle<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RadixHandle")
            .field("entry", &Rc::as_ptr(&self.entry))
            .finish()
    }
}

impl<K: RadixKey, V> HeapHandle<K> for RadixHandle<K, V> {
    fn key(&self) -> Result<K, HeapError> {
        if self.entry.is_live() {
            Ok(self.entry.key.get())
        } else {
            Err(HeapError::InvalidHandle)
        }
    }

    fn is_valid(&self) -> bool {
        self.entry.is_live()
    }
}

impl<K: RadixKey, V: Clone> RadixHandle<K, V> {
    /// Returns a clone of the element's value
    pub fn value(&self) -> Result<V, HeapError> {
        self.entry
            .value
            .borrow()
            .clone()
            .ok_or(HeapError::InvalidHandle)
    }
}

/// Addressable monotone radix heap
///
/// Entries carry their current bucket position, so `decrease_key` and
/// `delete` splice them out in O(1) before the usual bucket placement.
///
/// # Example
///
/// ```rust
/// use addressable_heaps::AddressableHeap;
/// use addressable_heaps::radix::AddressableRadixHeap;
///
/// let mut heap: AddressableRadixHeap<u32, &str> =
///     AddressableRadixHeap::new(0, 1000).unwrap();
/// let h = heap.insert(10, "ten").unwrap();
/// heap.insert(5, "five").unwrap();
/// heap.decrease_key(&h, 3).unwrap();
/// assert_eq!(heap.delete_min(), Ok((3, "ten")));
/// assert_eq!(heap.delete_min(), Ok((5, "five")));
/// ```
pub struct AddressableRadixHeap<K: RadixKey, V> {
    buckets: Vec<Vec<Rc<Entry<K, V>>>>,
    lo: K,
    hi: K,
    last_bits: u64,
    len: usize,
}

impl<K: RadixKey, V> AddressableRadixHeap<K, V> {
    /// Creates a heap accepting keys in `[lo, hi]`
    ///
    /// # Errors
    ///
    /// [`HeapError::InvalidRange`] if `lo > hi` or a bound is not a valid
    /// key (non-finite float).
    pub fn new(lo: K, hi: K) -> Result<Self, HeapError> {
        if !lo.is_valid_bound() || !hi.is_valid_bound() || !(lo <= hi) {
            return Err(HeapError::InvalidRange);
        }
        let span = lo.radix_bits() ^ hi.radix_bits();
        let buckets = (0..bit_len(span) + 1).map(|_| Vec::new()).collect();
        Ok(AddressableRadixHeap {
            buckets,
            lo,
            hi,
            last_bits: lo.radix_bits(),
            len: 0,
        })
    }

    #[inline]
    fn bucket_index(&self, bits: u64) -> usize {
        bit_len(bits ^ self.last_bits)
    }

    fn check_key(&self, key: K) -> Result<u64, HeapError> {
        if !(key >= self.lo && key <= self.hi) {
            return Err(HeapError::InvalidKey);
        }
        let bits = key.radix_bits();
        if bits < self.last_bits {
            return Err(HeapError::Monotonicity);
        }
        Ok(bits)
    }

    /// Appends an entry to the bucket its key currently maps to
    fn place(&mut self, entry: Rc<Entry<K, V>>) {
        let idx = self.bucket_index(entry.key.get().radix_bits());
        entry.pos.set(Position {
            bucket: idx,
            slot: self.buckets[idx].len(),
        });
        self.buckets[idx].push(entry);
    }

    /// Splices an entry out of its bucket in O(1), fixing up the position of
    /// whichever entry the swap moved
    fn splice_out(&mut self, pos: Position) -> Rc<Entry<K, V>> {
        let bucket = &mut self.buckets[pos.bucket];
        let entry = bucket.swap_remove(pos.slot);
        if let Some(moved) = bucket.get(pos.slot) {
            moved.pos.set(pos);
        }
        entry
    }

    fn redistribute(&mut self) {
        let src = (1..self.buckets.len())
            .find(|&i| !self.buckets[i].is_empty())
            .expect("non-empty heap has a non-empty bucket");
        let min_bits = self.buckets[src]
            .iter()
            .map(|e| e.key.get().radix_bits())
            .min()
            .expect("bucket is non-empty");
        self.last_bits = min_bits;

        let drained = std::mem::take(&mut self.buckets[src]);
        for entry in drained {
            debug_assert!(self.bucket_index(entry.key.get().radix_bits()) < src);
            self.place(entry);
        }
    }

    fn min_entry(&self) -> Option<&Rc<Entry<K, V>>> {
        if let Some(entry) = self.buckets[0].first() {
            return Some(entry);
        }
        let bucket = self.buckets.iter().find(|b| !b.is_empty())?;
        bucket.iter().min_by_key(|e| e.key.get().radix_bits())
    }

    /// Takes the value out of a removed entry, invalidating its handle
    fn retire(entry: &Rc<Entry<K, V>>) -> (K, V) {
        let value = entry
            .value
            .borrow_mut()
            .take()
            .expect("entry in a bucket is live");
        (entry.key.get(), value)
    }
}

impl<K: RadixKey, V> AddressableHeap<K, V> for AddressableRadixHeap<K, V> {
    type Handle = RadixHandle<K, V>;

    fn insert(&mut self, key: K, value: V) -> Result<Self::Handle, HeapError> {
        self.check_key(key)?;
        let entry = Rc::new(Entry {
            key: Cell::new(key),
            pos: Cell::new(Position { bucket: 0, slot: 0 }),
            value: RefCell::new(Some(value)),
        });
        self.place(Rc::clone(&entry));
        self.len += 1;
        Ok(RadixHandle { entry })
    }

    fn find_min(&self) -> Result<Self::Handle, HeapError> {
        if self.len == 0 {
            return Err(HeapError::EmptyHeap);
        }
        let entry = self.min_entry().expect("non-empty heap has a minimum");
        Ok(RadixHandle {
            entry: Rc::clone(entry),
        })
    }

    fn delete_min(&mut self) -> Result<(K, V), HeapError> {
        if self.len == 0 {
            return Err(HeapError::EmptyHeap);
        }
        if self.buckets[0].is_empty() {
            self.redistribute();
        }
        let entry = self.buckets[0].pop().expect("redistribution fills bucket 0");
        self.len -= 1;
        Ok(Self::retire(&entry))
    }

    fn decrease_key(&mut self, handle: &Self::Handle, new_key: K) -> Result<(), HeapError> {
        if !handle.entry.is_live() {
            return Err(HeapError::InvalidHandle);
        }
        let old_bits = handle.entry.key.get().radix_bits();
        let new_bits = new_key.radix_bits();
        if new_bits > old_bits {
            return Err(HeapError::InvalidKey);
        }
        if new_bits < self.last_bits || !(new_key >= self.lo) {
            // Below the monotone floor.
            return Err(HeapError::Monotonicity);
        }
        if new_bits == old_bits {
            handle.entry.key.set(new_key);
            return Ok(());
        }

        let entry = self.splice_out(handle.entry.pos.get());
        entry.key.set(new_key);
        self.place(entry);
        Ok(())
    }

    fn delete(&mut self, handle: &Self::Handle) -> Result<(K, V), HeapError> {
        if !handle.entry.is_live() {
            return Err(HeapError::InvalidHandle);
        }
        let entry = self.splice_out(handle.entry.pos.get());
        self.len -= 1;
        Ok(Self::retire(&entry))
    }

    fn len(&self) -> usize {
        self.len
    }

    fn clear(&mut self) {
        for bucket in &mut self.buckets {
            // Invalidate outstanding handles before dropping the entries.
            for entry in bucket.iter() {
                entry.value.borrow_mut().take();
            }
            bucket.clear();
        }
        self.last_bits = self.lo.radix_bits();
        self.len = 0;
    }
}
