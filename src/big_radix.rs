//! Monotone radix heap over arbitrary-precision unsigned keys
//!
//! Same bucketing scheme as [`crate::radix::RadixHeap`], with
//! [`num_bigint::BigUint`] keys: the bucket index is the bit-length of the
//! XOR distance from the last extracted minimum, and the bucket count is
//! fixed at construction from the bit-length of `lo ^ hi`. Keys are owned
//! (not `Copy`), so buckets store them by value and redistribution moves
//! rather than copies.
//!
//! Plain (key-only) variant only; handle-based addressing over
//! arbitrary-precision keys has no known consumer and is left out.

use crate::traits::{Heap, HeapError};
use num_bigint::BigUint;

/// Monotone radix heap with `BigUint` keys
///
/// # Example
///
/// ```rust
/// use addressable_heaps::Heap;
/// use addressable_heaps::big_radix::BigRadixHeap;
/// use num_bigint::BigUint;
///
/// let lo = BigUint::from(0u32);
/// let hi = BigUint::from(1u32) << 128;
/// let mut heap = BigRadixHeap::new(lo, hi).unwrap();
/// heap.insert(BigUint::from(7u32)).unwrap();
/// heap.insert(BigUint::from(3u32)).unwrap();
/// assert_eq!(heap.delete_min(), Ok(BigUint::from(3u32)));
/// ```
pub struct BigRadixHeap {
    buckets: Vec<Vec<BigUint>>,
    lo: BigUint,
    hi: BigUint,
    /// The last extracted minimum (starts at `lo`)
    last: BigUint,
    len: usize,
}

impl BigRadixHeap {
    /// Creates a heap accepting keys in `[lo, hi]`
    ///
    /// # Errors
    ///
    /// [`HeapError::InvalidRange`] if `lo > hi`.
    pub fn new(lo: BigUint, hi: BigUint) -> Result<Self, HeapError> {
        if lo > hi {
            return Err(HeapError::InvalidRange);
        }
        let span = (&lo ^ &hi).bits() as usize;
        Ok(BigRadixHeap {
            buckets: vec![Vec::new(); span + 1],
            last: lo.clone(),
            lo,
            hi,
            len: 0,
        })
    }

    #[inline]
    fn bucket_index(&self, key: &BigUint) -> usize {
        (key ^ &self.last).bits() as usize
    }

    fn redistribute(&mut self) {
        let src = (1..self.buckets.len())
            .find(|&i| !self.buckets[i].is_empty())
            .expect("non-empty heap has a non-empty bucket");
        let min = self.buckets[src]
            .iter()
            .min()
            .expect("bucket is non-empty")
            .clone();
        self.last = min;

        let drained = std::mem::take(&mut self.buckets[src]);
        for key in drained {
            let idx = self.bucket_index(&key);
            debug_assert!(idx < src);
            self.buckets[idx].push(key);
        }
    }
}

impl Heap<BigUint> for BigRadixHeap {
    fn insert(&mut self, key: BigUint) -> Result<(), HeapError> {
        if key < self.lo || key > self.hi {
            return Err(HeapError::InvalidKey);
        }
        if key < self.last {
            return Err(HeapError::Monotonicity);
        }
        let idx = self.bucket_index(&key);
        self.buckets[idx].push(key);
        self.len += 1;
        Ok(())
    }

    fn find_min(&self) -> Result<BigUint, HeapError> {
        if self.len == 0 {
            return Err(HeapError::EmptyHeap);
        }
        if let Some(key) = self.buckets[0].first() {
            return Ok(key.clone());
        }
        let bucket = self
            .buckets
            .iter()
            .find(|b| !b.is_empty())
            .expect("non-empty heap has a non-empty bucket");
        Ok(bucket.iter().min().expect("bucket is non-empty").clone())
    }

    fn delete_min(&mut self) -> Result<BigUint, HeapError> {
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
        self.last = self.lo.clone();
        self.len = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn big(x: u64) -> BigUint {
        BigUint::from(x)
    }

    #[test]
    fn test_basic_operations() {
        let mut heap = BigRadixHeap::new(big(0), big(1000)).unwrap();
        assert!(heap.is_empty());
        assert_eq!(heap.delete_min().err(), Some(HeapError::EmptyHeap));

        heap.insert(big(42)).unwrap();
        heap.insert(big(7)).unwrap();
        heap.insert(big(1000)).unwrap();

        assert_eq!(heap.find_min(), Ok(big(7)));
        assert_eq!(heap.delete_min(), Ok(big(7)));
        assert_eq!(heap.delete_min(), Ok(big(42)));
        assert_eq!(heap.delete_min(), Ok(big(1000)));
        assert!(heap.is_empty());
    }

    #[test]
    fn test_invalid_range_and_keys() {
        assert_eq!(
            BigRadixHeap::new(big(10), big(5)).err(),
            Some(HeapError::InvalidRange)
        );

        let mut heap = BigRadixHeap::new(big(10), big(20)).unwrap();
        assert_eq!(heap.insert(big(9)).err(), Some(HeapError::InvalidKey));
        assert_eq!(heap.insert(big(21)).err(), Some(HeapError::InvalidKey));
    }

    #[test]
    fn test_monotonicity_rejection() {
        let mut heap = BigRadixHeap::new(big(0), big(100)).unwrap();
        heap.insert(big(50)).unwrap();
        assert_eq!(heap.delete_min(), Ok(big(50)));
        assert_eq!(heap.insert(big(49)).err(), Some(HeapError::Monotonicity));
        heap.insert(big(50)).unwrap();
        assert_eq!(heap.delete_min(), Ok(big(50)));
    }

    #[test]
    fn test_keys_beyond_machine_width() {
        let lo = BigUint::from(0u32);
        let hi = BigUint::from(1u32) << 200;
        let mut heap = BigRadixHeap::new(lo, hi).unwrap();

        let a: BigUint = BigUint::from(1u32) << 150;
        let b: BigUint = (BigUint::from(1u32) << 150) + big(1);
        let c: BigUint = BigUint::from(1u32) << 199;
        heap.insert(c.clone()).unwrap();
        heap.insert(b.clone()).unwrap();
        heap.insert(a.clone()).unwrap();

        assert_eq!(heap.delete_min(), Ok(a));
        assert_eq!(heap.delete_min(), Ok(b));
        assert_eq!(heap.delete_min(), Ok(c));
    }

    #[test]
    fn test_clear_resets_marker() {
        let mut heap = BigRadixHeap::new(big(0), big(100)).unwrap();
        heap.insert(big(60)).unwrap();
        assert_eq!(heap.delete_min(), Ok(big(60)));
        assert_eq!(heap.insert(big(10)).err(), Some(HeapError::Monotonicity));
        heap.clear();
        heap.insert(big(10)).unwrap();
        assert_eq!(heap.delete_min(), Ok(big(10)));
    }

    #[test]
    fn test_extraction_is_sorted() {
        let mut heap = BigRadixHeap::new(big(0), big(1) << 40).unwrap();
        let keys = [977u64, 14, 654, 14, 0, 1 << 33, 5, 87, 1 << 39, 1024];
        for &k in &keys {
            heap.insert(big(k)).unwrap();
        }
        let mut drained = Vec::new();
        while let Ok(k) = heap.delete_min() {
            drained.push(k);
        }
        let mut expected: Vec<BigUint> = keys.iter().map(|&k| big(k)).collect();
        expected.sort();
        assert_eq!(drained, expected);
    }
}
