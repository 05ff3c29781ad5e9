//! Core identifier types used across the Missive ledger
//!
//! `IdentityId` names a participant (user, sender, or oracle); `MessageId`
//! names a single delivery attempt. Both serialize with serde and
//! round-trip through their `Display` form.

use crate::hash;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Identity of a participant: a user, a sender, or an oracle.
///
/// The zero identity (`IdentityId::ZERO`) is the null sentinel: it is never
/// a valid participant and is rejected wherever an operation requires a
/// real identity. Derived-consent messages with no authorization record on
/// file index under the zero-oracle bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IdentityId(pub Uuid);

impl IdentityId {
    /// The null identity.
    pub const ZERO: IdentityId = IdentityId(Uuid::nil());

    /// Create an identity from caller-provided entropy.
    pub fn new_from_entropy(entropy: [u8; 32]) -> Self {
        let digest = hash::hash(&entropy);
        let mut uuid_bytes = [0u8; 16];
        uuid_bytes.copy_from_slice(&digest[..16]);
        Self(Uuid::from_bytes(uuid_bytes))
    }

    /// Create from a UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    pub fn uuid(&self) -> Uuid {
        self.0
    }

    /// Convert to bytes
    pub fn to_bytes(&self) -> [u8; 16] {
        self.0.into_bytes()
    }

    /// Whether this is the null identity.
    pub fn is_zero(&self) -> bool {
        self.0.is_nil()
    }
}

impl fmt::Display for IdentityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "identity-{}", self.0)
    }
}

impl FromStr for IdentityId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Handle both raw UUIDs and prefixed format
        let uuid_str = s.strip_prefix("identity-").unwrap_or(s);
        Ok(IdentityId(Uuid::parse_str(uuid_str)?))
    }
}

impl From<Uuid> for IdentityId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<IdentityId> for Uuid {
    fn from(identity_id: IdentityId) -> Self {
        identity_id.0
    }
}

/// Unique identifier of a message record.
///
/// Derived by hashing the send timestamp, an entropy beacon, the sender,
/// the recipient, and a strictly increasing global nonce, so ids never
/// collide across the lifetime of the ledger and cannot be predicted by
/// brute force.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MessageId(pub [u8; 32]);

impl MessageId {
    /// The zero id, never assigned to a real message.
    pub const ZERO: MessageId = MessageId([0u8; 32]);

    /// Create from raw bytes
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Whether this is the zero id.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "msg-{}", hex::encode(self.0))
    }
}

impl FromStr for MessageId {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex_str = s.strip_prefix("msg-").unwrap_or(s);
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(hex_str, &mut bytes)?;
        Ok(MessageId(bytes))
    }
}
