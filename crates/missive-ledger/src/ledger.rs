//! Message ledger service
//!
//! Owns the message store, the inbox and oracle indexes, the global id
//! nonce, and the authorization registry. `send` is two-phase: every
//! recipient's authorization is resolved before any state changes, so a
//! rejection on one recipient aborts the whole call with nothing
//! committed. All mutations take `&mut self`.

use crate::error::LedgerError;
use crate::events::LedgerEvent;
use crate::message::{AuthorizationBasis, Message, MessageStatus};
use crate::social::SocialGraph;
use missive_core::hash::IncrementalHasher;
use missive_core::{
    EntropySource, IdentityId, MessageId, OsEntropySource, PhysicalTime, SystemTimeSource,
    TimeSource,
};
use missive_registry::{AuthorizationRegistry, ContactCommitment};
use std::collections::{BTreeMap, BTreeSet};

/// Domain separator for message id derivation
const MESSAGE_ID_DOMAIN: &[u8] = b"missive:message-id:v1";

/// Permissioned message ledger over an owned authorization registry.
///
/// Generic over the time and entropy seams; production code uses the
/// defaults, tests pin both for deterministic derivations.
#[derive(Debug)]
pub struct MessageLedger<T = SystemTimeSource, E = OsEntropySource>
where
    T: TimeSource,
    E: EntropySource,
{
    registry: AuthorizationRegistry,
    /// Primary message store, keyed by id
    messages: BTreeMap<MessageId, Message>,
    /// recipient → ids addressed to them
    inbox: BTreeMap<IdentityId, BTreeSet<MessageId>>,
    /// oracle → ids it is entitled to confirm (ZERO bucket for derived
    /// sends with no authorization record)
    oracle_queue: BTreeMap<IdentityId, BTreeSet<MessageId>>,
    /// Strictly increasing nonce fed into id derivation
    nonce: u64,
    time: T,
    entropy: E,
    events: Vec<LedgerEvent>,
}

impl Default for MessageLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageLedger {
    /// Create a ledger over the system clock and OS entropy.
    pub fn new() -> Self {
        Self::with_sources(SystemTimeSource, OsEntropySource)
    }
}

impl<T, E> MessageLedger<T, E>
where
    T: TimeSource,
    E: EntropySource,
{
    /// Create a ledger with explicit time and entropy sources.
    pub fn with_sources(time: T, entropy: E) -> Self {
        Self {
            registry: AuthorizationRegistry::new(),
            messages: BTreeMap::new(),
            inbox: BTreeMap::new(),
            oracle_queue: BTreeMap::new(),
            nonce: 0,
            time,
            entropy,
            events: Vec::new(),
        }
    }

    // ------------------------------------------------------------------
    // Authorization lifecycle (delegated to the owned registry)
    // ------------------------------------------------------------------

    /// Grant `sender` permission to message `user` with `oracle` bound
    /// for delivery confirmation.
    pub fn grant(
        &mut self,
        user: IdentityId,
        sender: IdentityId,
        oracle: IdentityId,
    ) -> Result<(), LedgerError> {
        self.registry.grant(user, sender, oracle)?;
        Ok(())
    }

    /// Grant with optional opaque contact commitments.
    pub fn grant_with_commitments(
        &mut self,
        user: IdentityId,
        sender: IdentityId,
        oracle: IdentityId,
        email_commitment: Option<ContactCommitment>,
        phone_commitment: Option<ContactCommitment>,
    ) -> Result<(), LedgerError> {
        self.registry.grant_with_commitments(
            user,
            sender,
            oracle,
            email_commitment,
            phone_commitment,
        )?;
        Ok(())
    }

    /// Revoke the authorization from `user` to `sender`.
    ///
    /// Messages already sent under the pair remain in the ledger but can
    /// no longer be confirmed: delivery checks the current binding.
    pub fn revoke(&mut self, user: IdentityId, sender: IdentityId) -> Result<(), LedgerError> {
        self.registry.revoke(user, sender)?;
        Ok(())
    }

    /// Read-only view of the owned registry.
    pub fn registry(&self) -> &AuthorizationRegistry {
        &self.registry
    }

    /// Drain the registry's event log.
    pub fn drain_registry_events(&mut self) -> Vec<missive_registry::RegistryEvent> {
        self.registry.drain_events()
    }

    // ------------------------------------------------------------------
    // Send path
    // ------------------------------------------------------------------

    /// Send `subject`/`body` from `sender` to every recipient.
    ///
    /// Resolution per recipient: a live authorization gives explicit
    /// consent; otherwise the social graph is asked whether the recipient
    /// follows the sender (derived consent); otherwise the whole call
    /// fails and nothing is committed.
    ///
    /// Returns the new message ids in recipient order.
    ///
    /// # Errors
    /// * `LedgerError::InvalidAddress` if the sender or any recipient is
    ///   zero, or the recipient list is empty
    /// * `LedgerError::NotAuthorizedToSend` if any recipient has neither
    ///   explicit nor derived consent
    pub fn send<S: SocialGraph>(
        &mut self,
        social: &S,
        sender: IdentityId,
        recipients: &[IdentityId],
        subject: &str,
        body: &str,
    ) -> Result<Vec<MessageId>, LedgerError> {
        if sender.is_zero() || recipients.is_empty() {
            return Err(LedgerError::InvalidAddress);
        }

        // Phase 1: resolve consent for every recipient before touching
        // any store, so a rejection leaves no partial state.
        let mut resolved = Vec::with_capacity(recipients.len());
        for recipient in recipients {
            if recipient.is_zero() {
                return Err(LedgerError::InvalidAddress);
            }
            let basis = if self.registry.is_authorized(recipient, &sender) {
                AuthorizationBasis::Explicit
            } else if social.is_following(recipient, &sender) {
                AuthorizationBasis::Derived
            } else {
                return Err(LedgerError::not_authorized(sender, *recipient));
            };
            resolved.push((*recipient, basis));
        }

        // Phase 2: commit.
        let sent_at = self.time.now();
        let mut ids = Vec::with_capacity(resolved.len());
        for (recipient, basis) in resolved {
            let id = self.derive_message_id(&sender, &recipient, sent_at);
            let oracle = self.registry.oracle_for(&recipient, &sender);

            self.messages.insert(
                id,
                Message {
                    id,
                    sender,
                    recipient,
                    subject: subject.to_string(),
                    body: body.to_string(),
                    sent_at,
                    status: MessageStatus::Sent,
                    basis,
                },
            );
            self.inbox.entry(recipient).or_default().insert(id);
            self.oracle_queue.entry(oracle).or_default().insert(id);
            self.registry.increment_count(&recipient, &sender);
            self.events.push(LedgerEvent::Sent {
                sender,
                recipient,
                id,
            });
            ids.push(id);
        }
        Ok(ids)
    }

    /// Derive a fresh, unpredictable message id.
    ///
    /// The nonce is strictly increasing for the lifetime of the ledger,
    /// so ids are pairwise distinct even under a pinned clock and
    /// entropy source.
    fn derive_message_id(
        &mut self,
        sender: &IdentityId,
        recipient: &IdentityId,
        at: PhysicalTime,
    ) -> MessageId {
        self.nonce += 1;
        let beacon = self.entropy.beacon();

        let mut hasher = IncrementalHasher::new();
        hasher.update(MESSAGE_ID_DOMAIN);
        hasher.update(&at.ts_ms.to_le_bytes());
        hasher.update(&beacon);
        hasher.update(&sender.to_bytes());
        hasher.update(&recipient.to_bytes());
        hasher.update(&self.nonce.to_le_bytes());
        MessageId::from_bytes(hasher.finalize())
    }

    // ------------------------------------------------------------------
    // Delivery state machine
    // ------------------------------------------------------------------

    /// Confirm delivery of a message.
    ///
    /// Only the oracle currently bound for (recipient, sender) may
    /// confirm, and only once.
    ///
    /// # Errors
    /// * `LedgerError::InvalidMessageId` if no such message exists
    /// * `LedgerError::UnauthorizedOracle` if the caller is not the bound
    ///   oracle, regardless of message status (including when no binding
    ///   exists any more)
    /// * `LedgerError::MessageAlreadyDelivered` when the bound oracle
    ///   repeats a confirmation
    pub fn mark_delivered(
        &mut self,
        message_id: &MessageId,
        caller: &IdentityId,
    ) -> Result<(), LedgerError> {
        let (sender, recipient, status) = {
            let message = self
                .messages
                .get(message_id)
                .ok_or(LedgerError::InvalidMessageId(*message_id))?;
            (message.sender, message.recipient, message.status)
        };

        // Identity gate comes before the state check: a non-oracle caller
        // is rejected the same way whether or not the message is already
        // delivered.
        let oracle = self.registry.oracle_for(&recipient, &sender);
        if caller.is_zero() || *caller != oracle {
            return Err(LedgerError::unauthorized_oracle(*message_id, *caller));
        }

        if status == MessageStatus::Delivered {
            return Err(LedgerError::MessageAlreadyDelivered(*message_id));
        }

        if let Some(message) = self.messages.get_mut(message_id) {
            message.status = MessageStatus::Delivered;
        }
        self.events.push(LedgerEvent::Delivered { id: *message_id });
        Ok(())
    }

    // ------------------------------------------------------------------
    // Views
    // ------------------------------------------------------------------

    /// Look up a message by id.
    pub fn message(&self, id: &MessageId) -> Option<&Message> {
        self.messages.get(id)
    }

    /// All messages addressed to `recipient`.
    pub fn inbox(&self, recipient: &IdentityId) -> Vec<&Message> {
        self.indexed_messages(&self.inbox, recipient)
    }

    /// Messages addressed to `recipient` whose consent matched `basis`.
    pub fn inbox_filtered(
        &self,
        recipient: &IdentityId,
        basis: AuthorizationBasis,
    ) -> Vec<&Message> {
        self.inbox(recipient)
            .into_iter()
            .filter(|message| message.basis == basis)
            .collect()
    }

    /// All messages `oracle` is entitled to confirm.
    pub fn oracle_queue(&self, oracle: &IdentityId) -> Vec<&Message> {
        self.indexed_messages(&self.oracle_queue, oracle)
    }

    fn indexed_messages(
        &self,
        index: &BTreeMap<IdentityId, BTreeSet<MessageId>>,
        key: &IdentityId,
    ) -> Vec<&Message> {
        index
            .get(key)
            .into_iter()
            .flatten()
            .filter_map(|id| self.messages.get(id))
            .collect()
    }

    /// Ledger events recorded so far, in emission order.
    pub fn events(&self) -> &[LedgerEvent] {
        &self.events
    }

    /// Drain and return all recorded ledger events.
    pub fn drain_events(&mut self) -> Vec<LedgerEvent> {
        std::mem::take(&mut self.events)
    }

    /// Total number of messages ever recorded.
    pub fn message_count(&self) -> usize {
        self.messages.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use missive_core::{CountingEntropySource, FixedTimeSource};
    use missive_registry::RegistryError;

    struct NoFollows;
    impl SocialGraph for NoFollows {
        fn is_following(&self, _target: &IdentityId, _query: &IdentityId) -> bool {
            false
        }
    }

    struct EveryoneFollows;
    impl SocialGraph for EveryoneFollows {
        fn is_following(&self, _target: &IdentityId, _query: &IdentityId) -> bool {
            true
        }
    }

    fn test_identity(seed: u8) -> IdentityId {
        IdentityId::new_from_entropy([seed; 32])
    }

    fn test_ledger() -> MessageLedger<FixedTimeSource, CountingEntropySource> {
        MessageLedger::with_sources(
            FixedTimeSource::at_ms(1_700_000_000_000),
            CountingEntropySource::new(),
        )
    }

    #[test]
    fn test_send_with_explicit_authorization() {
        let (user, sender, oracle) = (test_identity(1), test_identity(2), test_identity(3));
        let mut ledger = test_ledger();
        ledger.grant(user, sender, oracle).unwrap();

        let ids = ledger
            .send(&NoFollows, sender, &[user], "Subject", "Body")
            .unwrap();
        assert_eq!(ids.len(), 1);

        let message = ledger.message(&ids[0]).unwrap();
        assert_eq!(message.sender, sender);
        assert_eq!(message.recipient, user);
        assert_eq!(message.subject, "Subject");
        assert_eq!(message.body, "Body");
        assert_eq!(message.status, MessageStatus::Sent);
        assert_eq!(message.basis, AuthorizationBasis::Explicit);

        // Counter, inbox, and oracle queue all moved together
        assert_eq!(ledger.registry().get(&user, &sender).unwrap().message_count, 1);
        assert_eq!(ledger.inbox(&user).len(), 1);
        assert_eq!(ledger.oracle_queue(&oracle).len(), 1);
    }

    #[test]
    fn test_send_with_derived_consent_uses_zero_oracle_bucket() {
        let (user, sender) = (test_identity(1), test_identity(2));
        let mut ledger = test_ledger();

        let ids = ledger
            .send(&EveryoneFollows, sender, &[user], "Hi", "There")
            .unwrap();

        let message = ledger.message(&ids[0]).unwrap();
        assert_eq!(message.basis, AuthorizationBasis::Derived);
        assert_eq!(ledger.oracle_queue(&IdentityId::ZERO).len(), 1);
        // No authorization record, so no counter to bump
        assert!(ledger.registry().get(&user, &sender).is_none());
    }

    #[test]
    fn test_send_without_consent_leaves_no_trace() {
        let (user, sender) = (test_identity(1), test_identity(2));
        let mut ledger = test_ledger();

        let result = ledger.send(&NoFollows, sender, &[user], "Subject", "Body");
        assert_matches!(
            result,
            Err(LedgerError::NotAuthorizedToSend { sender: s, recipient: r })
                if s == sender && r == user
        );
        assert_eq!(ledger.message_count(), 0);
        assert!(ledger.inbox(&user).is_empty());
        assert!(ledger.events().is_empty());
    }

    #[test]
    fn test_batch_send_aborts_on_any_unauthorized_recipient() {
        let (granted, ungranted, sender, oracle) = (
            test_identity(1),
            test_identity(2),
            test_identity(3),
            test_identity(4),
        );
        let mut ledger = test_ledger();
        ledger.grant(granted, sender, oracle).unwrap();

        let result = ledger.send(&NoFollows, sender, &[granted, ungranted], "S", "B");
        assert_matches!(result, Err(LedgerError::NotAuthorizedToSend { .. }));

        // The authorized recipient saw no partial commit
        assert!(ledger.inbox(&granted).is_empty());
        assert_eq!(
            ledger.registry().get(&granted, &sender).unwrap().message_count,
            0
        );
        assert!(ledger.events().is_empty());
    }

    #[test]
    fn test_send_rejects_zero_addresses() {
        let (user, sender) = (test_identity(1), test_identity(2));
        let mut ledger = test_ledger();

        assert_matches!(
            ledger.send(&EveryoneFollows, IdentityId::ZERO, &[user], "S", "B"),
            Err(LedgerError::InvalidAddress)
        );
        assert_matches!(
            ledger.send(&EveryoneFollows, sender, &[], "S", "B"),
            Err(LedgerError::InvalidAddress)
        );
        assert_matches!(
            ledger.send(&EveryoneFollows, sender, &[IdentityId::ZERO], "S", "B"),
            Err(LedgerError::InvalidAddress)
        );
    }

    #[test]
    fn test_sending_n_messages_increments_counter_by_n() {
        let (user, sender, oracle) = (test_identity(1), test_identity(2), test_identity(3));
        let mut ledger = test_ledger();
        ledger.grant(user, sender, oracle).unwrap();

        for i in 0..5 {
            ledger
                .send(&NoFollows, sender, &[user], "S", &format!("body {i}"))
                .unwrap();
        }

        assert_eq!(ledger.registry().get(&user, &sender).unwrap().message_count, 5);
        assert_eq!(ledger.inbox(&user).len(), 5);
        assert_eq!(ledger.oracle_queue(&oracle).len(), 5);
    }

    #[test]
    fn test_delivery_happy_path_and_repeat_fails() {
        let (user, sender, oracle) = (test_identity(1), test_identity(2), test_identity(3));
        let mut ledger = test_ledger();
        ledger.grant(user, sender, oracle).unwrap();
        let ids = ledger.send(&NoFollows, sender, &[user], "S", "B").unwrap();

        ledger.mark_delivered(&ids[0], &oracle).unwrap();
        assert!(ledger.message(&ids[0]).unwrap().is_delivered());

        assert_matches!(
            ledger.mark_delivered(&ids[0], &oracle),
            Err(LedgerError::MessageAlreadyDelivered(id)) if id == ids[0]
        );
    }

    #[test]
    fn test_delivery_from_wrong_identity_fails() {
        let (user, sender, oracle, intruder) = (
            test_identity(1),
            test_identity(2),
            test_identity(3),
            test_identity(4),
        );
        let mut ledger = test_ledger();
        ledger.grant(user, sender, oracle).unwrap();
        let ids = ledger.send(&NoFollows, sender, &[user], "S", "B").unwrap();

        assert_matches!(
            ledger.mark_delivered(&ids[0], &intruder),
            Err(LedgerError::UnauthorizedOracle { .. })
        );
        assert_matches!(
            ledger.mark_delivered(&ids[0], &sender),
            Err(LedgerError::UnauthorizedOracle { .. })
        );
        assert!(!ledger.message(&ids[0]).unwrap().is_delivered());
    }

    #[test]
    fn test_wrong_identity_fails_even_after_delivery() {
        let (user, sender, oracle, intruder) = (
            test_identity(1),
            test_identity(2),
            test_identity(3),
            test_identity(4),
        );
        let mut ledger = test_ledger();
        ledger.grant(user, sender, oracle).unwrap();
        let ids = ledger.send(&NoFollows, sender, &[user], "S", "B").unwrap();
        ledger.mark_delivered(&ids[0], &oracle).unwrap();

        // The identity gate holds regardless of message status: a
        // non-oracle caller never learns the message is delivered.
        assert_matches!(
            ledger.mark_delivered(&ids[0], &intruder),
            Err(LedgerError::UnauthorizedOracle { .. })
        );

        // The bound oracle repeating the confirmation still gets the
        // state-conflict error.
        assert_matches!(
            ledger.mark_delivered(&ids[0], &oracle),
            Err(LedgerError::MessageAlreadyDelivered(id)) if id == ids[0]
        );
    }

    #[test]
    fn test_delivery_of_unknown_id_fails() {
        let mut ledger = test_ledger();
        let unknown = MessageId::from_bytes([9u8; 32]);
        assert_matches!(
            ledger.mark_delivered(&unknown, &test_identity(1)),
            Err(LedgerError::InvalidMessageId(id)) if id == unknown
        );
    }

    #[test]
    fn test_derived_message_cannot_be_delivered_by_anyone() {
        let (user, sender) = (test_identity(1), test_identity(2));
        let mut ledger = test_ledger();
        let ids = ledger
            .send(&EveryoneFollows, sender, &[user], "S", "B")
            .unwrap();

        // Bound oracle is ZERO; no real identity matches and the zero
        // identity itself is rejected.
        for caller in [test_identity(3), sender, user, IdentityId::ZERO] {
            assert_matches!(
                ledger.mark_delivered(&ids[0], &caller),
                Err(LedgerError::UnauthorizedOracle { .. })
            );
        }
    }

    #[test]
    fn test_revoke_after_send_locks_out_delivery() {
        let (user, sender, oracle) = (test_identity(1), test_identity(2), test_identity(3));
        let mut ledger = test_ledger();
        ledger.grant(user, sender, oracle).unwrap();
        let ids = ledger.send(&NoFollows, sender, &[user], "S", "B").unwrap();

        ledger.revoke(user, sender).unwrap();
        assert_matches!(
            ledger.mark_delivered(&ids[0], &oracle),
            Err(LedgerError::UnauthorizedOracle { .. })
        );
    }

    #[test]
    fn test_inbox_filter_by_basis() {
        let (user, sender_a, sender_b, oracle) = (
            test_identity(1),
            test_identity(2),
            test_identity(3),
            test_identity(4),
        );
        let mut ledger = test_ledger();
        ledger.grant(user, sender_a, oracle).unwrap();

        ledger.send(&NoFollows, sender_a, &[user], "S", "B").unwrap();
        ledger
            .send(&EveryoneFollows, sender_b, &[user], "S", "B")
            .unwrap();

        assert_eq!(ledger.inbox(&user).len(), 2);
        let explicit = ledger.inbox_filtered(&user, AuthorizationBasis::Explicit);
        assert_eq!(explicit.len(), 1);
        assert_eq!(explicit[0].sender, sender_a);
        let derived = ledger.inbox_filtered(&user, AuthorizationBasis::Derived);
        assert_eq!(derived.len(), 1);
        assert_eq!(derived[0].sender, sender_b);
    }

    #[test]
    fn test_events_exactly_once_per_mutation() {
        let (user, sender, oracle) = (test_identity(1), test_identity(2), test_identity(3));
        let mut ledger = test_ledger();
        ledger.grant(user, sender, oracle).unwrap();
        let ids = ledger.send(&NoFollows, sender, &[user], "S", "B").unwrap();
        ledger.mark_delivered(&ids[0], &oracle).unwrap();
        let _ = ledger.mark_delivered(&ids[0], &oracle);

        assert_eq!(
            ledger.drain_events(),
            vec![
                LedgerEvent::Sent {
                    sender,
                    recipient: user,
                    id: ids[0]
                },
                LedgerEvent::Delivered { id: ids[0] },
            ]
        );
        assert_eq!(ledger.drain_registry_events().len(), 1);
    }

    #[test]
    fn test_registry_errors_surface_through_ledger() {
        let (user, sender, oracle) = (test_identity(1), test_identity(2), test_identity(3));
        let mut ledger = test_ledger();
        ledger.grant(user, sender, oracle).unwrap();

        assert_matches!(
            ledger.grant(user, sender, oracle),
            Err(LedgerError::Registry(RegistryError::AlreadyGranted { .. }))
        );
        assert_matches!(
            ledger.revoke(sender, user),
            Err(LedgerError::Registry(RegistryError::NotFound { .. }))
        );
    }

    #[test]
    fn test_ids_distinct_under_pinned_time_and_entropy() {
        let (user, sender, oracle) = (test_identity(1), test_identity(2), test_identity(3));
        let mut ledger = MessageLedger::with_sources(
            FixedTimeSource::at_ms(1_700_000_000_000),
            CountingEntropySource::new(),
        );
        ledger.grant(user, sender, oracle).unwrap();

        let mut seen = std::collections::BTreeSet::new();
        for _ in 0..100 {
            let ids = ledger.send(&NoFollows, sender, &[user], "S", "B").unwrap();
            assert!(seen.insert(ids[0]));
        }
    }
}
