//! Hollow heap
//!
//! A lazy-deletion multiway structure with the same amortized bounds as
//! Fibonacci-style heaps but a much simpler restructuring story. Two ideas
//! are intertwined:
//!
//! 1. **Lazy deletion**: removing an element marks its node *hollow* (the
//!    item slot is cleared) but leaves the node in place for structural
//!    integrity. Hollow nodes are swept out during the consolidation that
//!    follows a minimum deletion.
//! 2. **Superseding decrease-key**: a decrease never restructures in place
//!    (except at the root). It allocates a new node carrying the item with
//!    the lower key, hollows the old node, and makes the old node a child of
//!    the new one while the old node also keeps its place in its first
//!    parent's child list. That is the one spot where the tree relaxes into
//!    a DAG: a hollow node can have two parents, recorded through the
//!    `second_parent` back-reference.
//!
//! Consolidation merges surviving full roots by *rank*, binomial-style: two
//! roots of equal rank link, the winner's rank grows by one, which bounds
//! the number of surviving roots logarithmically. The superseding node of a
//! decrease starts at `max(old_rank - 2, 0)`; the `-2` pays for the extra
//! consolidation work the shortcut defers.
//!
//! # Time complexity
//!
//! | Operation      | Complexity         |
//! |----------------|--------------------|
//! | `insert`       | O(1)               |
//! | `find_min`     | O(1)               |
//! | `delete_min`   | O(log n) amortized |
//! | `delete`       | O(log n) amortized |
//! | `decrease_key` | O(1) amortized     |
//! | `meld`         | O(1)               |
//!
//! # References
//!
//! - Hansen, T.D., Kaplan, H., Tarjan, R.E., Zwick, U. (2017). "Hollow
//!   Heaps." *ACM Transactions on Algorithms*, 13(3), 42.

use crate::ordering::OrderingPolicy;
use crate::ownership::OwnershipToken;
use crate::traits::{AddressableHeap, HeapError, HeapHandle, MergeableHeap};
use std::cell::RefCell;
use std::cmp::Ordering;
use std::rc::{Rc, Weak};

type NodeRef<K, V> = Rc<RefCell<Node<K, V>>>;
type WeakNodeRef<K, V> = Weak<RefCell<Node<K, V>>>;

/// The logical element, shared between its handle and whichever node
/// currently carries it. `node` is rewritten exactly once per decrease-key;
/// both fields are cleared when the element is removed.
struct Item<K, V> {
    value: RefCell<Option<V>>,
    node: RefCell<WeakNodeRef<K, V>>,
}

struct Node<K, V> {
    key: K,
    /// `None` means the node is hollow: its item was moved or deleted and
    /// the node is retained only for structure.
    item: Option<Rc<Item<K, V>>>,
    /// First child
    child: Option<NodeRef<K, V>>,
    /// Next sibling in the parent's child list
    next: Option<NodeRef<K, V>>,
    /// Second parent, set when a decrease-key supersedes this node. The only
    /// place the structure is not a strict tree; resolved (and cleared)
    /// during consolidation.
    second_parent: WeakNodeRef<K, V>,
    rank: usize,
}

/// Handle to an element in a [`HollowHeap`]
///
/// The element's physical node changes on decrease-key while the handle
/// stays stable: it follows the item, not the node.
pub struct HollowHandle<K, V> {
    item: Rc<Item<K, V>>,
    token: OwnershipToken,
}

impl<K, V> Clone for HollowHandle<K, V> {
    fn clone(&self) -> Self {
        HollowHandle {
            item: Rc::clone(&self.item),
            token: self.token.clone(),
        }
    }
}

impl<K, V> PartialEq for HollowHandle<K, V> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.item, &other.item)
    }
}

impl<K, V> Eq for HollowHandle<K, V> {}

impl<K, V> std::fmt::Debug for HollowHandle<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HollowHandle")
            .field("item", &Rc::as_ptr(&self.item))
            .finish()
    }
}

impl<K: Clone, V> HeapHandle<K> for HollowHandle<K, V> {
    fn key(&self) -> Result<K, HeapError> {
        self.item
            .node
            .borrow()
            .upgrade()
            .map(|node| node.borrow().key.clone())
            .ok_or(HeapError::InvalidHandle)
    }

    fn is_valid(&self) -> bool {
        self.item.node.borrow().upgrade().is_some()
    }
}

impl<K, V: Clone> HollowHandle<K, V> {
    /// Returns a clone of the element's value
    pub fn value(&self) -> Result<V, HeapError> {
        self.item
            .value
            .borrow()
            .clone()
            .ok_or(HeapError::InvalidHandle)
    }
}

/// Hollow heap: addressable and mergeable
///
/// # Example
///
/// ```rust
/// use addressable_heaps::AddressableHeap;
/// use addressable_heaps::hollow::HollowHeap;
///
/// let mut heap = HollowHeap::new();
/// let h = heap.insert(5, "item").unwrap();
/// heap.decrease_key(&h, 1).unwrap();
/// assert_eq!(heap.delete_min(), Ok((1, "item")));
/// ```
pub struct HollowHeap<K, V> {
    /// Root of the structure; never hollow between operations
    root: Option<NodeRef<K, V>>,
    /// Number of live (non-hollow) elements
    len: usize,
    policy: OrderingPolicy<K>,
    token: OwnershipToken,
}

impl<K: Ord + Clone, V> HollowHeap<K, V> {
    /// Creates an empty heap using the natural order of `K`
    pub fn new() -> Self {
        Self::with_policy(OrderingPolicy::natural())
    }

    /// Creates an empty heap using the given ordering policy
    pub fn with_policy(policy: OrderingPolicy<K>) -> Self {
        HollowHeap {
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

    fn check_owner(&self, handle: &HollowHandle<K, V>) -> Result<(), HeapError> {
        if OwnershipToken::ptr_eq(&handle.token.resolve(), &self.token) {
            Ok(())
        } else {
            Err(HeapError::InvalidHandle)
        }
    }

    /// Unranked link: the larger-keyed root becomes the first child of the
    /// smaller; ranks are untouched. Ties favor `a`.
    fn link(&self, a: NodeRef<K, V>, b: NodeRef<K, V>) -> NodeRef<K, V> {
        let ord = self.policy.compare(&a.borrow().key, &b.borrow().key);
        if ord != Ordering::Greater {
            Self::add_child(&a, b);
            a
        } else {
            Self::add_child(&b, a);
            b
        }
    }

    /// Ranked link during consolidation: both sides have equal rank and the
    /// winner's rank grows by one.
    fn ranked_link(&self, a: NodeRef<K, V>, b: NodeRef<K, V>) -> NodeRef<K, V> {
        let ord = self.policy.compare(&a.borrow().key, &b.borrow().key);
        let (winner, loser) = if ord != Ordering::Greater { (a, b) } else { (b, a) };
        Self::add_child(&winner, loser);
        winner.borrow_mut().rank += 1;
        winner
    }

    /// Prepends `child` to `parent`'s child list
    fn add_child(parent: &NodeRef<K, V>, child: NodeRef<K, V>) {
        child.borrow_mut().next = parent.borrow_mut().child.take();
        parent.borrow_mut().child = Some(child);
    }

    fn is_root(&self, node: &NodeRef<K, V>) -> bool {
        self.root.as_ref().is_some_and(|root| Rc::ptr_eq(root, node))
    }

    /// Sweeps hollow nodes and rebuilds the root set after the minimum's
    /// node went hollow. `hollow_root` must already have its item cleared.
    ///
    /// Hollow nodes are retired here, and this is the only place the
    /// second-parent back-references are resolved. A hollow child reached
    /// from its dying parent falls into one of three cases:
    ///
    /// - no second parent: structurally unreachable once this parent goes,
    ///   so it joins the worklist of hollow roots and is discarded after its
    ///   own children are dispersed;
    /// - second parent *is* the dying parent: the child is the terminal
    ///   entry of the dying parent's list (decrease-key placed it there and
    ///   later links only prepend), so the walk stops; the child survives in
    ///   its first parent's list;
    /// - second parent elsewhere: the first parent is dying, so the child's
    ///   sibling link is severed to become the terminal entry of the second
    ///   parent's list.
    ///
    /// Full children are consolidated by rank into `buckets`; survivors are
    /// linked under the minimum, which becomes the new root.
    fn consolidate(&mut self, hollow_root: NodeRef<K, V>) {
        let mut buckets: Vec<Option<NodeRef<K, V>>> = Vec::new();
        let mut hollow_roots = vec![hollow_root];
        let mut i = 0;

        while i < hollow_roots.len() {
            let parent = hollow_roots[i].clone();
            i += 1;

            let mut walk = parent.borrow_mut().child.take();
            while let Some(cur) = walk {
                let next = cur.borrow().next.clone();
                let is_hollow = cur.borrow().item.is_none();

                if !is_hollow {
                    cur.borrow_mut().next = None;
                    let mut winner = cur;
                    loop {
                        let rank = winner.borrow().rank;
                        if rank >= buckets.len() {
                            buckets.resize(rank + 1, None);
                        }
                        match buckets[rank].take() {
                            Some(other) => winner = self.ranked_link(winner, other),
                            None => {
                                buckets[rank] = Some(winner);
                                break;
                            }
                        }
                    }
                    walk = next;
                    continue;
                }

                let second = cur.borrow().second_parent.upgrade();
                match second {
                    None => {
                        cur.borrow_mut().next = None;
                        hollow_roots.push(cur);
                        walk = next;
                    }
                    Some(second) if Rc::ptr_eq(&second, &parent) => {
                        // Reached through the second parent; the node keeps
                        // its place (and sibling link) in the first parent's
                        // list and terminates this one.
                        cur.borrow_mut().second_parent = Weak::new();
                        walk = None;
                    }
                    Some(_) => {
                        // First parent is dying; the node stays with its
                        // second parent, where it must be the last entry.
                        cur.borrow_mut().next = None;
                        cur.borrow_mut().second_parent = Weak::new();
                        walk = next;
                    }
                }
            }
        }
        drop(hollow_roots);

        let mut new_root: Option<NodeRef<K, V>> = None;
        let mut rest: Vec<NodeRef<K, V>> = Vec::new();
        for candidate in buckets.into_iter().flatten() {
            match &new_root {
                None => new_root = Some(candidate),
                Some(min) => {
                    let ord = self.policy.compare(&candidate.borrow().key, &min.borrow().key);
                    if ord == Ordering::Less {
                        rest.push(new_root.take().expect("minimum candidate present"));
                        new_root = Some(candidate);
                    } else {
                        rest.push(candidate);
                    }
                }
            }
        }
        if let Some(root) = &new_root {
            for node in rest {
                Self::add_child(root, node);
            }
        }
        self.root = new_root;
    }

    /// Clears the minimum's item slot and hands the node to consolidation.
    fn extract_root(&mut self, root: NodeRef<K, V>) -> (K, V) {
        let (key, value) = {
            let mut node = root.borrow_mut();
            let item = node.item.take().expect("root is never hollow");
            *item.node.borrow_mut() = Weak::new();
            let value = item
                .value
                .borrow_mut()
                .take()
                .expect("live item has a value");
            (node.key.clone(), value)
        };
        self.len -= 1;
        self.consolidate(root);
        (key, value)
    }
}

impl<K: Ord + Clone, V> AddressableHeap<K, V> for HollowHeap<K, V> {
    type Handle = HollowHandle<K, V>;

    fn insert(&mut self, key: K, value: V) -> Result<Self::Handle, HeapError> {
        self.ensure_live()?;
        let item = Rc::new(Item {
            value: RefCell::new(Some(value)),
            node: RefCell::new(Weak::new()),
        });
        let node = Rc::new(RefCell::new(Node {
            key,
            item: Some(Rc::clone(&item)),
            child: None,
            next: None,
            second_parent: Weak::new(),
            rank: 0,
        }));
        *item.node.borrow_mut() = Rc::downgrade(&node);

        let root = match self.root.take() {
            Some(root) => self.link(root, node),
            None => node,
        };
        self.root = Some(root);
        self.len += 1;
        Ok(HollowHandle {
            item,
            token: self.token.clone(),
        })
    }

    fn find_min(&self) -> Result<Self::Handle, HeapError> {
        let root = self.root.as_ref().ok_or(HeapError::EmptyHeap)?;
        let item = root
            .borrow()
            .item
            .clone()
            .expect("root is never hollow");
        Ok(HollowHandle {
            item,
            token: self.token.clone(),
        })
    }

    fn delete_min(&mut self) -> Result<(K, V), HeapError> {
        let root = self.root.take().ok_or(HeapError::EmptyHeap)?;
        Ok(self.extract_root(root))
    }

    fn decrease_key(&mut self, handle: &Self::Handle, new_key: K) -> Result<(), HeapError> {
        self.ensure_live()?;
        self.check_owner(handle)?;
        let node = handle
            .item
            .node
            .borrow()
            .upgrade()
            .ok_or(HeapError::InvalidHandle)?;

        let ord = self.policy.compare(&new_key, &node.borrow().key);
        if ord == Ordering::Greater {
            return Err(HeapError::InvalidKey);
        }
        if ord == Ordering::Equal || self.is_root(&node) {
            node.borrow_mut().key = new_key;
            return Ok(());
        }

        // Supersede: a new node takes over the item, the old node goes
        // hollow in place and becomes the (last) child of the new one while
        // keeping its spot in its first parent's list.
        let (item, old_rank) = {
            let mut old = node.borrow_mut();
            let item = old.item.take().expect("handle resolved to a live node");
            (item, old.rank)
        };
        let new_node = Rc::new(RefCell::new(Node {
            key: new_key,
            item: Some(Rc::clone(&item)),
            child: Some(Rc::clone(&node)),
            next: None,
            second_parent: Weak::new(),
            rank: old_rank.saturating_sub(2),
        }));
        *item.node.borrow_mut() = Rc::downgrade(&new_node);
        node.borrow_mut().second_parent = Rc::downgrade(&new_node);

        let root = self.root.take().expect("non-root node implies a root");
        self.root = Some(self.link(root, new_node));
        Ok(())
    }

    fn delete(&mut self, handle: &Self::Handle) -> Result<(K, V), HeapError> {
        self.ensure_live()?;
        self.check_owner(handle)?;
        let node = handle
            .item
            .node
            .borrow()
            .upgrade()
            .ok_or(HeapError::InvalidHandle)?;

        if self.is_root(&node) {
            let root = self.root.take().expect("node is the root");
            return Ok(self.extract_root(root));
        }

        // Non-root: lazy removal, the node merely goes hollow.
        let (key, value) = {
            let mut n = node.borrow_mut();
            let item = n.item.take().ok_or(HeapError::InvalidHandle)?;
            *item.node.borrow_mut() = Weak::new();
            let value = item
                .value
                .borrow_mut()
                .take()
                .expect("live item has a value");
            (n.key.clone(), value)
        };
        self.len -= 1;
        Ok((key, value))
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

impl<K: Ord + Clone, V> MergeableHeap<K, V> for HollowHeap<K, V> {
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

impl<K, V> HollowHeap<K, V> {
    fn release(root: Option<NodeRef<K, V>>) {
        // Iterative teardown; child/next chains can be arbitrarily long and
        // hollow DAG nodes may be pushed twice, which the refcounts absorb.
        let mut stack: Vec<NodeRef<K, V>> = Vec::new();
        if let Some(root) = root {
            stack.push(root);
        }
        while let Some(node) = stack.pop() {
            let mut n = node.borrow_mut();
            if let Some(child) = n.child.take() {
                stack.push(child);
            }
            if let Some(next) = n.next.take() {
                stack.push(next);
            }
        }
    }
}

impl<K: Ord + Clone, V> Default for HollowHeap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Drop for HollowHeap<K, V> {
    fn drop(&mut self) {
        Self::release(self.root.take());
    }
}
