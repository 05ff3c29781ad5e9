//! Missive Ledger - Permissioned messaging layer
//!
//! This crate owns message records and the rules that govern them:
//!
//! - **Send policy**: a sender may message a recipient only with explicit
//!   authorization from the registry, or failing that, derived consent
//!   from the external social graph. Anything else rejects the whole
//!   call.
//! - **Delivery state machine**: `Sent → Delivered`, terminal, and only
//!   the oracle bound for the (recipient, sender) pair may drive it.
//! - **Indexes**: a per-recipient inbox and a per-oracle confirmation
//!   queue, updated in the same mutation as the message store.
//!
//! # Architecture
//!
//! `MessageLedger` owns the `AuthorizationRegistry` so every mutation
//! flows through one `&mut self` entry point; the exclusive borrow is the
//! structural guarantee that no call re-enters the ledger mid-mutation.
//! The social graph is an external collaborator supplied per call as a
//! read-only predicate.
//!
//! # Example
//!
//! ```
//! use missive_core::IdentityId;
//! use missive_ledger::{MessageLedger, SocialGraph};
//!
//! struct NoFollows;
//! impl SocialGraph for NoFollows {
//!     fn is_following(&self, _target: &IdentityId, _query: &IdentityId) -> bool {
//!         false
//!     }
//! }
//!
//! let user = IdentityId::new_from_entropy([1u8; 32]);
//! let sender = IdentityId::new_from_entropy([2u8; 32]);
//! let oracle = IdentityId::new_from_entropy([3u8; 32]);
//!
//! let mut ledger = MessageLedger::new();
//! ledger.grant(user, sender, oracle).unwrap();
//! let ids = ledger
//!     .send(&NoFollows, sender, &[user], "Subject", "Body")
//!     .unwrap();
//! ledger.mark_delivered(&ids[0], &oracle).unwrap();
//! ```

pub mod error;
pub mod events;
pub mod ledger;
pub mod message;
pub mod social;

pub use error::LedgerError;
pub use events::LedgerEvent;
pub use ledger::MessageLedger;
pub use message::{AuthorizationBasis, Message, MessageStatus};
pub use social::SocialGraph;
