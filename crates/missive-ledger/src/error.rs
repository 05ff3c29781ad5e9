//! Ledger error types
//!
//! Errors from the send path and the delivery state machine. Every
//! failure is synchronous and permanent for that call; failed calls
//! leave the message store, every index, and both event logs untouched.

use missive_core::{IdentityId, MessageId};
use missive_registry::RegistryError;
use thiserror::Error;

/// Errors from message ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// A zero identity or an empty recipient list was supplied.
    #[error("invalid address: sender and every recipient must be non-zero identities")]
    InvalidAddress,

    /// No explicit authorization and the social-graph fallback declined.
    #[error("sender {sender} is not authorized to message recipient {recipient}")]
    NotAuthorizedToSend {
        /// The sender attempting delivery
        sender: IdentityId,
        /// The recipient who has not consented
        recipient: IdentityId,
    },

    /// No message exists with the given id.
    #[error("unknown message id {0}")]
    InvalidMessageId(MessageId),

    /// The message has already been confirmed delivered.
    #[error("message {0} is already delivered")]
    MessageAlreadyDelivered(MessageId),

    /// The caller is not the oracle bound for the message's pair.
    #[error("identity {caller} is not the oracle entitled to confirm message {message_id}")]
    UnauthorizedOracle {
        /// The message being confirmed
        message_id: MessageId,
        /// The identity that attempted confirmation
        caller: IdentityId,
    },

    /// An authorization lifecycle operation failed.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl LedgerError {
    /// Create a not authorized to send error.
    pub fn not_authorized(sender: IdentityId, recipient: IdentityId) -> Self {
        Self::NotAuthorizedToSend { sender, recipient }
    }

    /// Create an unauthorized oracle error.
    pub fn unauthorized_oracle(message_id: MessageId, caller: IdentityId) -> Self {
        Self::UnauthorizedOracle { message_id, caller }
    }
}
