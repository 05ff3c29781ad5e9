//! Physical time and the synchronous time seam
//!
//! Message records carry a `PhysicalTime`; the ledger obtains it through
//! the `TimeSource` trait so tests can pin the clock.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// A physical wall-clock timestamp in milliseconds since the Unix epoch.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub struct PhysicalTime {
    /// Milliseconds since the Unix epoch
    pub ts_ms: u64,
}

impl PhysicalTime {
    /// Create a timestamp from milliseconds since the Unix epoch.
    pub fn from_ms(ts_ms: u64) -> Self {
        Self { ts_ms }
    }
}

impl fmt::Display for PhysicalTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t+{}ms", self.ts_ms)
    }
}

/// Synchronous source of physical time.
///
/// Every ledger operation is synchronous, so this is a plain trait rather
/// than an async effect. Production code uses `SystemTimeSource`; tests
/// use `FixedTimeSource` to make timestamps deterministic.
pub trait TimeSource {
    /// Current physical time.
    fn now(&self) -> PhysicalTime;
}

/// System clock time source.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> PhysicalTime {
        let ts_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64;
        PhysicalTime { ts_ms }
    }
}

/// Fixed time source for deterministic tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedTimeSource(pub PhysicalTime);

impl FixedTimeSource {
    /// Pin the clock to the given milliseconds value.
    pub fn at_ms(ts_ms: u64) -> Self {
        Self(PhysicalTime { ts_ms })
    }
}

impl TimeSource for FixedTimeSource {
    fn now(&self) -> PhysicalTime {
        self.0
    }
}
