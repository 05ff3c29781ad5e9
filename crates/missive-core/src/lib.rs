//! Missive Core - shared primitives for the Missive messaging ledger
//!
//! This crate provides the foundation types the registry and ledger crates
//! build on:
//!
//! - Identifiers: `IdentityId`, `MessageId`
//! - Time: `PhysicalTime` and the `TimeSource` seam
//! - Entropy: the `EntropySource` seam for unpredictable id derivation
//! - Hashing: a single-algorithm SHA-256 helper for id commitments
//!
//! # Architecture
//!
//! Every operation in the ledger is synchronous and single-writer, so the
//! time and entropy seams are plain synchronous traits. Production code
//! uses `SystemTimeSource` / `OsEntropySource`; tests swap in
//! deterministic implementations.

pub mod entropy;
pub mod hash;
pub mod identifiers;
pub mod time;

pub use entropy::{CountingEntropySource, EntropySource, OsEntropySource};
pub use identifiers::{IdentityId, MessageId};
pub use time::{FixedTimeSource, PhysicalTime, SystemTimeSource, TimeSource};
