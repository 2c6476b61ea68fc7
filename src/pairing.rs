//! Pairing heap
//!
//! A self-adjusting heap-ordered multiway tree with:
//! - O(1) amortized insert and meld
//! - O(log n) amortized delete_min and delete
//! - o(log n) amortized decrease_key
//!
//! The pairing heap is simpler than Fibonacci-style heaps while still
//! providing excellent amortized performance for decrease_key workloads.
//!
//! Nodes form a leftmost-child/next-sibling tree. Every non-root node keeps
//! a `prev` back-reference to its parent (if it is the leftmost child) or to
//! its previous sibling, which is what makes O(1) detachment during
//! decrease_key possible. `delete_min` restores balance with the classic
//! two-pass pairing: adjacent siblings are linked left-to-right, then the
//! resulting trees are combined right-to-left — that pass order is what
//! bounds the amortized cost at O(log n).

use crate::ordering::OrderingPolicy;
use crate::ownership::OwnershipToken;
use crate::traits::{AddressableHeap, HeapError, HeapHandle, MergeableHeap};
use std::cell::RefCell;
use std::cmp::Ordering;
use std::rc::{Rc, Weak};

type NodeRef<K, V> = Rc<RefCell<Node<K, V>>>;
type WeakNodeRef<K, V> = Weak<RefCell<Node<K, V>>>;

struct Node<K, V> {
    key: K,
    value: V,
    /// Leftmost child
    child: Option<NodeRef<K, V>>,
    /// Next sibling in the parent's child list
    sibling: Option<NodeRef<K, V>>,
    /// Parent if leftmost child, previous sibling otherwise
    prev: WeakNodeRef<K, V>,
}

/// Handle to an element in a [`PairingHeap`]
///
/// A node and its handle are in a strict 1:1 relationship for the element's
/// lifetime; the handle is invalidated when the element is removed.
pub struct PairingHandle<K, V> {
    node: WeakNodeRef<K, V>,
    token: OwnershipToken,
}

impl<K, V> Clone for PairingHandle<K, V> {
    fn clone(&self) -> Self {
        PairingHandle {
            node: Weak::clone(&self.node),
            token: self.token.clone(),
        }
    }
}

impl<K, V> PartialEq for PairingHandle<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.node.ptr_eq(&other.node)
    }
}

impl<K, V> Eq for PairingHandle<K, V> {}

impl<K, V> std::fmt::Debug for PairingHandle<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PairingHandle")
            .field("node", &self.node.as_ptr())
            .finish()
    }
}

impl<K: Clone, V> HeapHandle<K> for PairingHandle<K, V> {
    fn key(&self) -> Result<K, HeapError> {
        self.node
            .upgrade()
            .map(|node| node.borrow().key.clone())
            .ok_or(HeapError::InvalidHandle)
    }

    fn is_valid(&self) -> bool {
        self.node.upgrade().is_some()
    }
}

impl<K, V: Clone> PairingHandle<K, V> {
    /// Returns a clone of the element's value
    pub fn value(&self) -> Result<V, HeapError> {
        self.node
            .upgrade()
            .map(|node| node.borrow().value.clone())
            .ok_or(HeapError::InvalidHandle)
    }
}

/// Pairing heap: addressable and mergeable
///
/// # Example
///
/// ```rust
/// use addressable_heaps::AddressableHeap;
/// use addressable_heaps::pairing::PairingHeap;
///
/// let mut heap = PairingHeap::new();
/// let h = heap.insert(5, "item").unwrap();
/// heap.decrease_key(&h, 1).unwrap();
/// assert_eq!(heap.delete_min(), Ok((1, "item")));
/// ```
pub struct PairingHeap<K, V> {
    root: Option<NodeRef<K, V>>,
    len: usize,
    policy: OrderingPolicy<K>,
    token: OwnershipToken,
}

impl<K: Ord + Clone, V> PairingHeap<K, V> {
    /// Creates an empty heap using the natural order of `K`
    pub fn new() -> Self {
        Self::with_policy(OrderingPolicy::natural())
    }

    /// Creates an empty heap using the given ordering policy
    pub fn with_policy(policy: OrderingPolicy<K>) -> Self {
        PairingHeap {
            root: None,
            len: 0,
            policy,
            token: OwnershipToken::new(),
        }
    }

    /// The heap's ordering policy
    pub fn comparator(&self) -> &OrderingPolicy<K> {
        &self.policy
    }

    fn ensure_live(&self) -> Result<(), HeapError> {
        if self.token.is_live() {
            Ok(())
        } else {
            Err(HeapError::StaleHeap)
        }
    }

    /// Checks that a handle's creating instance resolves to this one.
    fn check_owner(&self, handle: &PairingHandle<K, V>) -> Result<(), HeapError> {
        if OwnershipToken::ptr_eq(&handle.token.resolve(), &self.token) {
            Ok(())
        } else {
            Err(HeapError::InvalidHandle)
        }
    }

    /// Links two trees; the larger-keyed root becomes the leftmost child of
    /// the smaller. Ties favor `a`.
    fn link(&self, a: NodeRef<K, V>, b: NodeRef<K, V>) -> NodeRef<K, V> {
        let ord = self.policy.compare(&a.borrow().key, &b.borrow().key);
        if ord != Ordering::Greater {
            Self::attach_child(&a, b);
            a
        } else {
            Self::attach_child(&b, a);
            b
        }
    }

    fn attach_child(parent: &NodeRef<K, V>, child: NodeRef<K, V>) {
        let old_first = parent.borrow_mut().child.take();
        if let Some(first) = old_first {
            first.borrow_mut().prev = Rc::downgrade(&child);
            child.borrow_mut().sibling = Some(first);
        }
        child.borrow_mut().prev = Rc::downgrade(parent);
        parent.borrow_mut().child = Some(child);
    }

    /// Two-pass pairing over a child list: pair adjacent siblings
    /// left-to-right, then combine the resulting trees right-to-left.
    fn two_pass_merge(&self, first: NodeRef<K, V>) -> NodeRef<K, V> {
        let mut pairs: Vec<NodeRef<K, V>> = Vec::new();
        let mut current = Some(first);

        while let Some(node) = current {
            let next = node.borrow_mut().sibling.take();
            node.borrow_mut().prev = Weak::new();

            match next {
                Some(sib) => {
                    current = sib.borrow_mut().sibling.take();
                    sib.borrow_mut().prev = Weak::new();
                    pairs.push(self.link(node, sib));
                }
                None => {
                    pairs.push(node);
                    current = None;
                }
            }
        }

        let mut result = pairs.pop().expect("child list is non-empty");
        while let Some(tree) = pairs.pop() {
            result = self.link(tree, result);
        }
        result
    }

    /// Detaches a non-root node (and its subtree) from its parent's child
    /// list via the stored previous-sibling-or-parent link. O(1).
    fn detach(node: &NodeRef<K, V>) {
        let prev = node
            .borrow()
            .prev
            .upgrade()
            .expect("non-root node has a parent or previous sibling");
        let sibling = node.borrow_mut().sibling.take();

        let node_is_first_child = match &prev.borrow().child {
            Some(first) => Rc::ptr_eq(first, node),
            None => false,
        };
        if node_is_first_child {
            prev.borrow_mut().child = sibling.clone();
        } else {
            prev.borrow_mut().sibling = sibling.clone();
        }
        if let Some(sib) = sibling {
            sib.borrow_mut().prev = Rc::downgrade(&prev);
        }
        node.borrow_mut().prev = Weak::new();
    }

    /// Consumes a fully detached node, recovering its key and value.
    fn into_entry(node: NodeRef<K, V>) -> (K, V) {
        let cell = Rc::try_unwrap(node)
            .ok()
            .expect("detached node has no remaining strong references");
        let node = cell.into_inner();
        (node.key, node.value)
    }

    fn is_root(&self, node: &NodeRef<K, V>) -> bool {
        self.root.as_ref().is_some_and(|root| Rc::ptr_eq(root, node))
    }
}

impl<K, V> PairingHeap<K, V> {
    fn release(root: Option<NodeRef<K, V>>) {
        // Iterative teardown; dropping tall trees recursively through the Rc
        // chain would overflow the stack.
        let mut stack: Vec<NodeRef<K, V>> = Vec::new();
        if let Some(root) = root {
            stack.push(root);
        }
        while let Some(node) = stack.pop() {
            let mut n = node.borrow_mut();
            if let Some(child) = n.child.take() {
                stack.push(child);
            }
            if let Some(sibling) = n.sibling.take() {
                stack.push(sibling);
            }
        }
    }
}

impl<K: Ord + Clone, V> AddressableHeap<K, V> for PairingHeap<K, V> {
    type Handle = PairingHandle<K, V>;

    fn insert(&mut self, key: K, value: V) -> Result<Self::Handle, HeapError> {
        self.ensure_live()?;
        let node = Rc::new(RefCell::new(Node {
            key,
            value,
            child: None,
            sibling: None,
            prev: Weak::new(),
        }));
        let handle = PairingHandle {
            node: Rc::downgrade(&node),
            token: self.token.clone(),
        };

        let root = match self.root.take() {
            Some(root) => self.link(root, node),
            None => node,
        };
        self.root = Some(root);
        self.len += 1;
        Ok(handle)
    }

    fn find_min(&self) -> Result<Self::Handle, HeapError> {
        self.root
            .as_ref()
            .map(|root| PairingHandle {
                node: Rc::downgrade(root),
                token: self.token.clone(),
            })
            .ok_or(HeapError::EmptyHeap)
    }

    fn delete_min(&mut self) -> Result<(K, V), HeapError> {
        let root = self.root.take().ok_or(HeapError::EmptyHeap)?;
        let first_child = root.borrow_mut().child.take();
        let new_root = first_child.map(|child| self.two_pass_merge(child));
        self.root = new_root;
        self.len -= 1;
        Ok(Self::into_entry(root))
    }

    fn decrease_key(&mut self, handle: &Self::Handle, new_key: K) -> Result<(), HeapError> {
        self.ensure_live()?;
        self.check_owner(handle)?;
        let node = handle.node.upgrade().ok_or(HeapError::InvalidHandle)?;

        let ord = self.policy.compare(&new_key, &node.borrow().key);
        if ord == Ordering::Greater {
            return Err(HeapError::InvalidKey);
        }
        node.borrow_mut().key = new_key;
        if ord == Ordering::Equal || self.is_root(&node) {
            return Ok(());
        }

        Self::detach(&node);
        let root = self.root.take().expect("non-root node implies a root");
        self.root = Some(self.link(root, node));
        Ok(())
    }

    fn delete(&mut self, handle: &Self::Handle) -> Result<(K, V), HeapError> {
        self.ensure_live()?;
        self.check_owner(handle)?;
        let node = handle.node.upgrade().ok_or(HeapError::InvalidHandle)?;

        if self.is_root(&node) {
            return self.delete_min();
        }

        Self::detach(&node);
        let child = node.borrow_mut().child.take();
        if let Some(child) = child {
            let subtree = self.two_pass_merge(child);
            let root = self.root.take().expect("non-root node implies a root");
            self.root = Some(self.link(root, subtree));
        }
        self.len -= 1;
        Ok(Self::into_entry(node))
    }

    fn len(&self) -> usize {
        self.len
    }

    fn clear(&mut self) {
        Self::release(self.root.take());
        self.len = 0;
        self.token = OwnershipToken::new();
    }
}

impl<K: Ord + Clone, V> MergeableHeap<K, V> for PairingHeap<K, V> {
    fn meld(&mut self, other: &mut Self) -> Result<(), HeapError> {
        self.ensure_live()?;
        if !other.token.is_live() {
            return Err(HeapError::StaleHeap);
        }
        if !self.policy.compatible(&other.policy) {
            return Err(HeapError::IncompatibleOrdering);
        }

        let other_root = other.root.take();
        let root = match (self.root.take(), other_root) {
            (Some(a), Some(b)) => Some(self.link(a, b)),
            (a, b) => a.or(b),
        };
        self.root = root;
        self.len += other.len;
        other.len = 0;
        other.token.forward_to(&self.token);
        Ok(())
    }
}

impl<K: Ord + Clone, V> Default for PairingHeap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Drop for PairingHeap<K, V> {
    fn drop(&mut self) {
        Self::release(self.root.take());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_operations() {
        let mut heap = PairingHeap::new();
        assert!(heap.is_empty());
        assert_eq!(heap.find_min().err(), Some(HeapError::EmptyHeap));
        assert_eq!(heap.delete_min().err(), Some(HeapError::EmptyHeap));

        let _h1 = heap.insert(5, "a").unwrap();
        let _h2 = heap.insert(3, "b").unwrap();
        let _h3 = heap.insert(7, "c").unwrap();

        assert_eq!(heap.len(), 3);
        assert_eq!(heap.find_min().unwrap().key(), Ok(3));

        assert_eq!(heap.delete_min(), Ok((3, "b")));
        assert_eq!(heap.delete_min(), Ok((5, "a")));
        assert_eq!(heap.delete_min(), Ok((7, "c")));
        assert!(heap.is_empty());
    }

    #[test]
    fn test_decrease_key() {
        let mut heap = PairingHeap::new();
        let h1 = heap.insert(10, "a").unwrap();
        let _h2 = heap.insert(20, "b").unwrap();
        let h3 = heap.insert(30, "c").unwrap();

        heap.decrease_key(&h3, 5).unwrap();
        assert_eq!(heap.find_min().unwrap().key(), Ok(5));
        assert_eq!(h3.key(), Ok(5));

        // Equal key is accepted and replaces the stored key.
        heap.decrease_key(&h1, 10).unwrap();
        assert_eq!(h1.key(), Ok(10));

        // Increase is rejected and leaves the heap untouched.
        assert_eq!(heap.decrease_key(&h1, 11), Err(HeapError::InvalidKey));
        assert_eq!(h1.key(), Ok(10));

        assert_eq!(heap.delete_min(), Ok((5, "c")));
        assert_eq!(heap.delete_min(), Ok((10, "a")));
        assert_eq!(heap.delete_min(), Ok((20, "b")));
    }

    #[test]
    fn test_decrease_key_of_root() {
        let mut heap = PairingHeap::new();
        let h = heap.insert(5, "root").unwrap();
        heap.insert(9, "other").unwrap();
        heap.decrease_key(&h, 1).unwrap();
        assert_eq!(heap.delete_min(), Ok((1, "root")));
    }

    #[test]
    fn test_delete_inner_node() {
        let mut heap = PairingHeap::new();
        let mut handles = Vec::new();
        for k in [50, 20, 80, 10, 60, 30] {
            handles.push(heap.insert(k, k).unwrap());
        }

        assert_eq!(heap.delete(&handles[2]), Ok((80, 80)));
        assert_eq!(heap.len(), 5);

        // Deleting again via the same handle is rejected.
        assert_eq!(heap.delete(&handles[2]).err(), Some(HeapError::InvalidHandle));

        let mut drained = Vec::new();
        while let Ok((k, _)) = heap.delete_min() {
            drained.push(k);
        }
        assert_eq!(drained, vec![10, 20, 30, 50, 60]);
    }

    #[test]
    fn test_delete_root() {
        let mut heap = PairingHeap::new();
        let h = heap.insert(1, "min").unwrap();
        heap.insert(2, "next").unwrap();
        assert_eq!(heap.delete(&h), Ok((1, "min")));
        assert_eq!(heap.find_min().unwrap().key(), Ok(2));
        assert!(!h.is_valid());
    }

    #[test]
    fn test_handle_invalidated_by_delete_min() {
        let mut heap = PairingHeap::new();
        let h = heap.insert(1, ()).unwrap();
        heap.delete_min().unwrap();
        assert!(!h.is_valid());
        assert_eq!(h.key().err(), Some(HeapError::InvalidHandle));
        assert!(heap.insert(2, ()).is_ok());
        assert_eq!(heap.decrease_key(&h, 0), Err(HeapError::InvalidHandle));
    }

    #[test]
    fn test_meld() {
        let mut a = PairingHeap::new();
        a.insert(1, 1).unwrap();
        a.insert(3, 3).unwrap();
        a.insert(5, 5).unwrap();

        let mut b = PairingHeap::new();
        let hb = b.insert(2, 2).unwrap();
        b.insert(4, 4).unwrap();
        b.insert(6, 6).unwrap();

        a.meld(&mut b).unwrap();
        assert_eq!(a.len(), 6);
        assert!(b.is_empty());

        // Donor handles keep resolving against the recipient.
        a.decrease_key(&hb, 0).unwrap();
        assert_eq!(a.delete_min(), Ok((0, 2)));

        // The donor is exhausted: no inserts, no further melds.
        assert_eq!(b.insert(9, 9).err(), Some(HeapError::StaleHeap));
        let mut c = PairingHeap::new();
        assert_eq!(c.meld(&mut b).err(), Some(HeapError::StaleHeap));

        let mut drained = Vec::new();
        while let Ok((k, _)) = a.delete_min() {
            drained.push(k);
        }
        assert_eq!(drained, vec![1, 3, 4, 5, 6]);
    }

    #[test]
    fn test_meld_chain_resolves_handles() {
        let mut a = PairingHeap::new();
        let mut b = PairingHeap::new();
        let mut c = PairingHeap::new();
        let mut d = PairingHeap::new();

        let hd = d.insert(40, "d").unwrap();
        c.insert(30, "c").unwrap();
        b.insert(20, "b").unwrap();
        a.insert(10, "a").unwrap();

        // Cascaded chain d -> c -> b -> a.
        c.meld(&mut d).unwrap();
        b.meld(&mut c).unwrap();
        a.meld(&mut b).unwrap();

        assert_eq!(a.len(), 4);
        a.decrease_key(&hd, 1).unwrap();
        assert_eq!(a.delete_min(), Ok((1, "d")));
    }

    #[test]
    fn test_meld_incompatible_ordering() {
        let rev = OrderingPolicy::from_fn(|a: &i32, b: &i32| b.cmp(a));
        let mut a: PairingHeap<i32, ()> = PairingHeap::new();
        let mut b: PairingHeap<i32, ()> = PairingHeap::with_policy(rev);
        a.insert(1, ()).unwrap();
        b.insert(2, ()).unwrap();
        assert_eq!(a.meld(&mut b).err(), Some(HeapError::IncompatibleOrdering));
        assert_eq!(b.len(), 1);
    }

    #[test]
    fn test_custom_policy_orders_extraction() {
        let rev = OrderingPolicy::from_fn(|a: &i32, b: &i32| b.cmp(a));
        let mut heap: PairingHeap<i32, i32> = PairingHeap::with_policy(rev);
        for k in [3, 1, 2] {
            heap.insert(k, k).unwrap();
        }
        assert_eq!(heap.delete_min(), Ok((3, 3)));
        assert_eq!(heap.delete_min(), Ok((2, 2)));
        assert_eq!(heap.delete_min(), Ok((1, 1)));
    }

    #[test]
    fn test_clear_resets_consumed_donor() {
        let mut a = PairingHeap::new();
        let mut b = PairingHeap::new();
        a.insert(1, ()).unwrap();
        b.insert(2, ()).unwrap();
        a.meld(&mut b).unwrap();

        assert_eq!(b.insert(3, ()).err(), Some(HeapError::StaleHeap));
        b.clear();
        b.insert(3, ()).unwrap();
        assert_eq!(b.len(), 1);
        assert_eq!(b.find_min().unwrap().key(), Ok(3));
    }

    #[test]
    fn test_foreign_handle_rejected() {
        let mut a = PairingHeap::new();
        let mut b = PairingHeap::new();
        let ha = a.insert(1, ()).unwrap();
        b.insert(2, ()).unwrap();
        assert_eq!(b.decrease_key(&ha, 0), Err(HeapError::InvalidHandle));
        assert_eq!(ha.key(), Ok(1));
    }

    #[test]
    fn test_clear_on_populated_heap() {
        let mut heap = PairingHeap::new();
        for k in 0..100 {
            heap.insert(k, k).unwrap();
        }
        heap.clear();
        assert!(heap.is_empty());
        assert_eq!(heap.find_min().err(), Some(HeapError::EmptyHeap));
        heap.insert(7, 7).unwrap();
        assert_eq!(heap.delete_min(), Ok((7, 7)));
    }
}
