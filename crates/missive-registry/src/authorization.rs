//! The Authorization record
//!
//! Consent from a user to a sender, naming the oracle entitled to confirm
//! delivery. At most one live record exists per (user, sender) pair.

use missive_core::IdentityId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque commitment of off-band contact data (email or phone).
///
/// Computed by the caller's application layer; stored verbatim for audit
/// and dispute purposes, never interpreted or decrypted here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactCommitment(pub [u8; 32]);

impl ContactCommitment {
    /// Create from raw bytes
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for ContactCommitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "commitment-{}", hex::encode(self.0))
    }
}

/// A live consent record for one (user, sender) pair.
///
/// Existence of the record is the authorization: revoking destroys it, and
/// re-granting after a revoke starts fresh with `message_count` at zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Authorization {
    /// The sender this user has authorized
    pub sender: IdentityId,
    /// The oracle entitled to confirm delivery under this pair
    pub oracle: IdentityId,
    /// Messages sent under this authorization so far
    pub message_count: u64,
    /// Optional commitment of the user's off-band email contact
    pub email_commitment: Option<ContactCommitment>,
    /// Optional commitment of the user's off-band phone contact
    pub phone_commitment: Option<ContactCommitment>,
}

impl Authorization {
    /// Create a fresh record binding `sender` to `oracle`.
    pub fn new(sender: IdentityId, oracle: IdentityId) -> Self {
        Self {
            sender,
            oracle,
            message_count: 0,
            email_commitment: None,
            phone_commitment: None,
        }
    }

    /// Attach contact commitments to a fresh record.
    pub fn with_commitments(
        mut self,
        email: Option<ContactCommitment>,
        phone: Option<ContactCommitment>,
    ) -> Self {
        self.email_commitment = email;
        self.phone_commitment = phone;
        self
    }
}
