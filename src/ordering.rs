//! Ordering policies: natural key order or an injected comparison
//!
//! A policy is fixed for the lifetime of a heap. Two heaps may only be
//! melded when their policies are equivalent: both natural, or the very same
//! injected comparison (identity, not structural equality — closures have no
//! useful notion of the latter).

use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

type CmpFn<K> = dyn Fn(&K, &K) -> Ordering;

/// A total order over keys, either intrinsic (`K: Ord`) or supplied as a
/// three-way comparison function
pub struct OrderingPolicy<K> {
    custom: Option<Rc<CmpFn<K>>>,
}

impl<K> OrderingPolicy<K> {
    /// The natural order of `K`
    pub fn natural() -> Self {
        OrderingPolicy { custom: None }
    }

    /// A policy backed by the given comparison function
    pub fn from_fn<F>(cmp: F) -> Self
    where
        F: Fn(&K, &K) -> Ordering + 'static,
    {
        OrderingPolicy {
            custom: Some(Rc::new(cmp)),
        }
    }

    /// True if this policy uses the natural order of `K`
    pub fn is_natural(&self) -> bool {
        self.custom.is_none()
    }

    /// True if the two policies are equivalent and the heaps using them may
    /// be melded
    pub fn compatible(&self, other: &Self) -> bool {
        match (&self.custom, &other.custom) {
            (None, None) => true,
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl<K: Ord> OrderingPolicy<K> {
    /// Three-way comparison under this policy
    #[inline]
    pub fn compare(&self, a: &K, b: &K) -> Ordering {
        match &self.custom {
            None => a.cmp(b),
            Some(cmp) => cmp(a, b),
        }
    }
}

impl<K> Clone for OrderingPolicy<K> {
    fn clone(&self) -> Self {
        OrderingPolicy {
            custom: self.custom.clone(),
        }
    }
}

impl<K> Default for OrderingPolicy<K> {
    fn default() -> Self {
        Self::natural()
    }
}

impl<K> fmt::Debug for OrderingPolicy<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.custom {
            None => write!(f, "OrderingPolicy::Natural"),
            Some(cmp) => write!(f, "OrderingPolicy::Custom({:p})", Rc::as_ptr(cmp)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn natural_policies_are_compatible() {
        let a: OrderingPolicy<i32> = OrderingPolicy::natural();
        let b: OrderingPolicy<i32> = OrderingPolicy::natural();
        assert!(a.compatible(&b));
        assert!(a.is_natural());
        assert_eq!(a.compare(&1, &2), Ordering::Less);
    }

    #[test]
    fn custom_policies_compare_by_identity() {
        let rev: OrderingPolicy<i32> = OrderingPolicy::from_fn(|a: &i32, b| b.cmp(a));
        let rev2 = rev.clone();
        let other: OrderingPolicy<i32> = OrderingPolicy::from_fn(|a: &i32, b| b.cmp(a));

        assert!(rev.compatible(&rev2));
        assert!(!rev.compatible(&other));
        assert!(!rev.compatible(&OrderingPolicy::natural()));
        assert_eq!(rev.compare(&1, &2), Ordering::Greater);
    }
}
