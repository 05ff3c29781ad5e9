//! Registry error types
//!
//! Errors specific to the authorization lifecycle. Every failure is
//! synchronous, permanent, and caller-correctable; a failed call leaves
//! the registry untouched.

use missive_core::IdentityId;
use thiserror::Error;

/// Errors from authorization registry operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// A zero identity was supplied where a real one is required.
    #[error("invalid address: the zero identity cannot participate in an authorization")]
    InvalidAddress,

    /// The (user, sender) pair already has a live authorization.
    #[error("sender {sender} is already authorized by user {user}")]
    AlreadyGranted {
        /// The user who granted
        user: IdentityId,
        /// The sender already authorized
        sender: IdentityId,
    },

    /// No live authorization exists for the (user, sender) pair.
    #[error("no authorization from user {user} for sender {sender}")]
    NotFound {
        /// The user side of the pair
        user: IdentityId,
        /// The sender side of the pair
        sender: IdentityId,
    },
}

impl RegistryError {
    /// Create an already granted error.
    pub fn already_granted(user: IdentityId, sender: IdentityId) -> Self {
        Self::AlreadyGranted { user, sender }
    }

    /// Create a not found error.
    pub fn not_found(user: IdentityId, sender: IdentityId) -> Self {
        Self::NotFound { user, sender }
    }
}
