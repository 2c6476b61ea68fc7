//! Instance ownership tokens for meldable heaps
//!
//! Melding transfers every node of the donor into the recipient without
//! rewriting the donor's outstanding handles. Each heap instance therefore
//! carries an ownership token, and the tokens form a union-find over
//! *instances* (not elements): a live instance points to itself, a consumed
//! donor forwards to the instance that absorbed it. Handles store the token
//! of the instance that created them and resolve it (with path compression)
//! when presented to a heap, so handles minted under a donor keep working
//! against whichever instance now truly owns their nodes.

use std::cell::RefCell;
use std::rc::Rc;

enum Slot {
    Live,
    ForwardsTo(Rc<RefCell<Slot>>),
}

/// Union-find node over heap instances
pub(crate) struct OwnershipToken {
    slot: Rc<RefCell<Slot>>,
}

impl OwnershipToken {
    pub(crate) fn new() -> Self {
        OwnershipToken {
            slot: Rc::new(RefCell::new(Slot::Live)),
        }
    }

    /// True if this token still identifies a live instance
    pub(crate) fn is_live(&self) -> bool {
        matches!(*self.slot.borrow(), Slot::Live)
    }

    /// Marks this token as consumed, forwarding to `target`
    pub(crate) fn forward_to(&self, target: &OwnershipToken) {
        *self.slot.borrow_mut() = Slot::ForwardsTo(Rc::clone(&target.slot));
    }

    /// Follows the forwarding chain to the live token, compressing the path
    /// so cascaded chains resolve in amortized constant time
    pub(crate) fn resolve(&self) -> OwnershipToken {
        let mut root = Rc::clone(&self.slot);
        loop {
            let next = match &*root.borrow() {
                Slot::Live => break,
                Slot::ForwardsTo(next) => Rc::clone(next),
            };
            root = next;
        }

        let mut walk = Rc::clone(&self.slot);
        while !Rc::ptr_eq(&walk, &root) {
            let next = match &*walk.borrow() {
                Slot::Live => break,
                Slot::ForwardsTo(next) => Rc::clone(next),
            };
            *walk.borrow_mut() = Slot::ForwardsTo(Rc::clone(&root));
            walk = next;
        }

        OwnershipToken { slot: root }
    }

    pub(crate) fn ptr_eq(a: &OwnershipToken, b: &OwnershipToken) -> bool {
        Rc::ptr_eq(&a.slot, &b.slot)
    }
}

impl Clone for OwnershipToken {
    fn clone(&self) -> Self {
        OwnershipToken {
            slot: Rc::clone(&self.slot),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_token_is_live_and_self_resolving() {
        let t = OwnershipToken::new();
        assert!(t.is_live());
        assert!(OwnershipToken::ptr_eq(&t.resolve(), &t));
    }

    #[test]
    fn forwarding_chain_resolves_to_live_root() {
        let a = OwnershipToken::new();
        let b = OwnershipToken::new();
        let c = OwnershipToken::new();
        let d = OwnershipToken::new();

        // d -> c -> b -> a
        d.forward_to(&c);
        c.forward_to(&b);
        b.forward_to(&a);

        assert!(!d.is_live());
        assert!(a.is_live());
        assert!(OwnershipToken::ptr_eq(&d.resolve(), &a));

        // After compression the chain is flat: one hop from d.
        match &*d.slot.borrow() {
            Slot::ForwardsTo(next) => assert!(Rc::ptr_eq(next, &a.slot)),
            Slot::Live => panic!("consumed token must forward"),
        };
    }

    #[test]
    fn resolution_follows_later_melds() {
        let a = OwnershipToken::new();
        let b = OwnershipToken::new();
        b.forward_to(&a);

        let handle_token = b.clone();
        assert!(OwnershipToken::ptr_eq(&handle_token.resolve(), &a));

        // a itself is melded away afterwards; old handles follow along.
        let c = OwnershipToken::new();
        a.forward_to(&c);
        assert!(OwnershipToken::ptr_eq(&handle_token.resolve(), &c));
    }
}
