//! The Message record
//!
//! An immutable-once-created record of a delivery attempt. Only the
//! status field ever changes, and only once: `Sent → Delivered`.

use missive_core::{IdentityId, MessageId, PhysicalTime};
use serde::{Deserialize, Serialize};

/// Delivery state of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageStatus {
    /// Created by a successful send, awaiting confirmation
    Sent,
    /// Confirmed by the bound oracle; terminal
    Delivered,
}

/// How the sender's consent to message the recipient was established.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthorizationBasis {
    /// A live Authorization record existed for (recipient, sender)
    Explicit,
    /// Consent derived from the social-graph fallback predicate
    Derived,
}

/// A single message record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Globally unique, collision-resistant identifier
    pub id: MessageId,
    /// Identity that sent the message
    pub sender: IdentityId,
    /// Identity the message is addressed to
    pub recipient: IdentityId,
    /// Subject line, stored verbatim
    pub subject: String,
    /// Body text, stored verbatim
    pub body: String,
    /// When the send was committed
    pub sent_at: PhysicalTime,
    /// Current delivery state
    pub status: MessageStatus,
    /// Whether consent was explicit or derived
    pub basis: AuthorizationBasis,
}

impl Message {
    /// Whether the bound oracle has confirmed delivery.
    pub fn is_delivered(&self) -> bool {
        self.status == MessageStatus::Delivered
    }

    /// Whether consent for this message came from a live Authorization.
    pub fn is_explicitly_authorized(&self) -> bool {
        self.basis == AuthorizationBasis::Explicit
    }
}
