//! Social-graph collaborator interface
//!
//! The ledger's only external dependency: a read-only predicate consulted
//! on the fallback path when a recipient has no live authorization for
//! the sender. Identity-resolution mechanics behind the predicate are out
//! of scope; tests stub it with constant implementations.

use missive_core::IdentityId;

/// Read-only view of the external social graph.
pub trait SocialGraph {
    /// Whether `target` follows `query`.
    ///
    /// The ledger calls this with (recipient, sender): a recipient who
    /// follows the sender has given derived consent to receive from them.
    fn is_following(&self, target: &IdentityId, query: &IdentityId) -> bool;
}

impl<T: SocialGraph + ?Sized> SocialGraph for &T {
    fn is_following(&self, target: &IdentityId, query: &IdentityId) -> bool {
        (**self).is_following(target, query)
    }
}
