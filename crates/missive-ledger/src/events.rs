//! Ledger events
//!
//! Each successful send records one `Sent` event per recipient and each
//! confirmation records one `Delivered` event, in order, in the ledger's
//! in-memory log. The versioned byte encoding matches the registry event
//! scheme.

use missive_core::{IdentityId, MessageId};
use serde::{Deserialize, Serialize};

/// Schema version for ledger event serialization
pub const LEDGER_EVENT_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct VersionedLedgerEvent {
    schema_version: u32,
    event: LedgerEvent,
}

/// Observable message state changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEvent {
    /// A message was created and indexed
    Sent {
        /// The sending identity
        sender: IdentityId,
        /// The recipient the message is addressed to
        recipient: IdentityId,
        /// The new message's id
        id: MessageId,
    },
    /// A message was confirmed delivered by its bound oracle
    Delivered {
        /// The confirmed message's id
        id: MessageId,
    },
}

impl LedgerEvent {
    /// Serialize with a schema version prefix.
    pub fn to_bytes(&self) -> Vec<u8> {
        let versioned = VersionedLedgerEvent {
            schema_version: LEDGER_EVENT_SCHEMA_VERSION,
            event: self.clone(),
        };
        bincode::serialize(&versioned).expect("LedgerEvent must serialize")
    }

    /// Deserialize from the versioned byte encoding.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let versioned: VersionedLedgerEvent = bincode::deserialize(bytes).ok()?;
        if versioned.schema_version != LEDGER_EVENT_SCHEMA_VERSION {
            return None;
        }
        Some(versioned.event)
    }
}
