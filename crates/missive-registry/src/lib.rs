//! Missive Registry - Authorization lifecycle layer
//!
//! This crate owns the consent relationship between (user, sender) pairs.
//! Each live `Authorization` binds exactly one oracle entitled to confirm
//! delivery of messages sent under it, and carries a running count of
//! those messages.
//!
//! # Architecture
//!
//! `AuthorizationRegistry` keeps the primary record store and two derived
//! indexes (user → authorized senders, sender → authorizing users) that
//! are updated in the same mutation as the record, so no caller can ever
//! observe a record without its index entries or vice versa.
//!
//! # Example
//!
//! ```
//! use missive_core::IdentityId;
//! use missive_registry::AuthorizationRegistry;
//!
//! let user = IdentityId::new_from_entropy([1u8; 32]);
//! let sender = IdentityId::new_from_entropy([2u8; 32]);
//! let oracle = IdentityId::new_from_entropy([3u8; 32]);
//!
//! let mut registry = AuthorizationRegistry::new();
//! registry.grant(user, sender, oracle).unwrap();
//! assert!(registry.is_authorized(&user, &sender));
//! ```

pub mod authorization;
pub mod error;
pub mod events;
pub mod registry;

pub use authorization::{Authorization, ContactCommitment};
pub use error::RegistryError;
pub use events::RegistryEvent;
pub use registry::AuthorizationRegistry;
