//! Registry events
//!
//! Each state-mutating registry call records exactly one event in the
//! registry's in-memory log. Events carry a versioned byte encoding so
//! external observers can persist or ship them without depending on this
//! crate's in-memory layout.

use missive_core::IdentityId;
use serde::{Deserialize, Serialize};

/// Schema version for registry event serialization
pub const REGISTRY_EVENT_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct VersionedRegistryEvent {
    schema_version: u32,
    event: RegistryEvent,
}

/// Observable registry state changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegistryEvent {
    /// An authorization was granted
    Granted {
        /// The user granting consent
        user: IdentityId,
        /// The sender being authorized
        sender: IdentityId,
        /// The oracle bound to the pair
        oracle: IdentityId,
    },
    /// An authorization was revoked
    Revoked {
        /// The user withdrawing consent
        user: IdentityId,
        /// The sender losing authorization
        sender: IdentityId,
        /// The oracle that was bound to the pair
        oracle: IdentityId,
    },
}

impl RegistryEvent {
    /// Serialize with a schema version prefix.
    pub fn to_bytes(&self) -> Vec<u8> {
        let versioned = VersionedRegistryEvent {
            schema_version: REGISTRY_EVENT_SCHEMA_VERSION,
            event: self.clone(),
        };
        bincode::serialize(&versioned).expect("RegistryEvent must serialize")
    }

    /// Deserialize from the versioned byte encoding.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let versioned: VersionedRegistryEvent = bincode::deserialize(bytes).ok()?;
        if versioned.schema_version != REGISTRY_EVENT_SCHEMA_VERSION {
            return None;
        }
        Some(versioned.event)
    }
}
