//! Authorization registry service
//!
//! Owns the primary record store and both direction indexes. Every
//! mutation updates the record and its index entries in the same call, so
//! the invariant "record exists ⇔ pair present in both indexes" holds at
//! every observable point. All mutating methods take `&mut self`; the
//! exclusive borrow is what rules out re-entrant invocation mid-mutation.

use crate::authorization::{Authorization, ContactCommitment};
use crate::error::RegistryError;
use crate::events::RegistryEvent;
use missive_core::IdentityId;
use std::collections::{BTreeMap, BTreeSet};

/// Registry of live (user, sender) authorizations and their oracle
/// bindings.
#[derive(Debug, Clone, Default)]
pub struct AuthorizationRegistry {
    /// Primary store, keyed by (user, sender)
    records: BTreeMap<(IdentityId, IdentityId), Authorization>,
    /// user → senders that user has authorized
    senders_by_user: BTreeMap<IdentityId, BTreeSet<IdentityId>>,
    /// sender → users who have authorized that sender
    users_by_sender: BTreeMap<IdentityId, BTreeSet<IdentityId>>,
    /// In-order log of observable state changes
    events: Vec<RegistryEvent>,
}

impl AuthorizationRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Grant `sender` permission to message `user`, binding `oracle` as
    /// the identity entitled to confirm delivery.
    ///
    /// # Errors
    /// * `RegistryError::InvalidAddress` if any identity is zero
    /// * `RegistryError::AlreadyGranted` if the pair already has a live
    ///   authorization
    pub fn grant(
        &mut self,
        user: IdentityId,
        sender: IdentityId,
        oracle: IdentityId,
    ) -> Result<(), RegistryError> {
        self.grant_with_commitments(user, sender, oracle, None, None)
    }

    /// Grant with optional contact commitments stored alongside the
    /// record.
    ///
    /// Same validation and effects as [`grant`](Self::grant); the
    /// commitments are opaque caller-computed blobs.
    pub fn grant_with_commitments(
        &mut self,
        user: IdentityId,
        sender: IdentityId,
        oracle: IdentityId,
        email_commitment: Option<ContactCommitment>,
        phone_commitment: Option<ContactCommitment>,
    ) -> Result<(), RegistryError> {
        if user.is_zero() || sender.is_zero() || oracle.is_zero() {
            return Err(RegistryError::InvalidAddress);
        }
        if self.records.contains_key(&(user, sender)) {
            return Err(RegistryError::already_granted(user, sender));
        }

        let record =
            Authorization::new(sender, oracle).with_commitments(email_commitment, phone_commitment);
        self.records.insert((user, sender), record);
        self.senders_by_user.entry(user).or_default().insert(sender);
        self.users_by_sender.entry(sender).or_default().insert(user);
        self.events.push(RegistryEvent::Granted {
            user,
            sender,
            oracle,
        });
        Ok(())
    }

    /// Revoke the authorization from `user` to `sender`.
    ///
    /// Removes the record and prunes both indexes. A later re-grant
    /// starts a fresh record with its message count at zero.
    ///
    /// # Errors
    /// * `RegistryError::NotFound` if no live authorization exists
    pub fn revoke(&mut self, user: IdentityId, sender: IdentityId) -> Result<(), RegistryError> {
        let record = self
            .records
            .remove(&(user, sender))
            .ok_or_else(|| RegistryError::not_found(user, sender))?;

        Self::prune_index(&mut self.senders_by_user, &user, &sender);
        Self::prune_index(&mut self.users_by_sender, &sender, &user);
        self.events.push(RegistryEvent::Revoked {
            user,
            sender,
            oracle: record.oracle,
        });
        Ok(())
    }

    fn prune_index(
        index: &mut BTreeMap<IdentityId, BTreeSet<IdentityId>>,
        key: &IdentityId,
        member: &IdentityId,
    ) {
        if let Some(set) = index.get_mut(key) {
            set.remove(member);
            if set.is_empty() {
                index.remove(key);
            }
        }
    }

    /// Look up the live authorization for a pair, if any.
    pub fn get(&self, user: &IdentityId, sender: &IdentityId) -> Option<&Authorization> {
        self.records.get(&(*user, *sender))
    }

    /// Whether `sender` currently holds authorization from `user`.
    pub fn is_authorized(&self, user: &IdentityId, sender: &IdentityId) -> bool {
        self.get(user, sender).is_some()
    }

    /// The oracle bound for a pair, or the zero identity when no record
    /// exists.
    pub fn oracle_for(&self, user: &IdentityId, sender: &IdentityId) -> IdentityId {
        self.get(user, sender)
            .map(|record| record.oracle)
            .unwrap_or(IdentityId::ZERO)
    }

    /// Increment the message count for a pair after a successful send.
    ///
    /// Called by the message ledger; a no-op when no record exists (the
    /// derived-consent, zero-oracle-bucket case).
    pub fn increment_count(&mut self, user: &IdentityId, sender: &IdentityId) {
        if let Some(record) = self.records.get_mut(&(*user, *sender)) {
            record.message_count += 1;
        }
    }

    /// Authorizations where `user` is the granting side, with the
    /// authorized sender for each.
    pub fn authorizations_as_user(
        &self,
        user: &IdentityId,
    ) -> Vec<(IdentityId, &Authorization)> {
        self.senders_by_user
            .get(user)
            .into_iter()
            .flatten()
            .filter_map(|sender| self.get(user, sender).map(|record| (*sender, record)))
            .collect()
    }

    /// Authorizations where `sender` is the authorized side, with the
    /// granting user for each.
    pub fn authorizations_as_sender(
        &self,
        sender: &IdentityId,
    ) -> Vec<(IdentityId, &Authorization)> {
        self.users_by_sender
            .get(sender)
            .into_iter()
            .flatten()
            .filter_map(|user| self.get(user, sender).map(|record| (*user, record)))
            .collect()
    }

    /// Authorizations whose bound oracle is `oracle`, as (user, sender,
    /// record) triples.
    pub fn authorizations_as_oracle(
        &self,
        oracle: &IdentityId,
    ) -> Vec<(IdentityId, IdentityId, &Authorization)> {
        self.records
            .iter()
            .filter(|(_, record)| record.oracle == *oracle)
            .map(|((user, sender), record)| (*user, *sender, record))
            .collect()
    }

    /// Events recorded so far, in emission order.
    pub fn events(&self) -> &[RegistryEvent] {
        &self.events
    }

    /// Drain and return all recorded events.
    pub fn drain_events(&mut self) -> Vec<RegistryEvent> {
        std::mem::take(&mut self.events)
    }
}
