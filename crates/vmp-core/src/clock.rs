// crates/vmp-core/src/clock.rs
// ============================================================================
// Module: Clock
// Description: Host-supplied wall-clock abstraction.
// Purpose: Keep domain code testable by never calling Utc::now() directly.
// Dependencies: chrono
// ============================================================================

//! ## Overview
//! Domain and service code never reads wall-clock time directly; every
//! timestamp flows from a [`Clock`] supplied by the host. This mirrors the
//! teacher's replay-deterministic `Timestamp` discipline, adapted for a
//! live service: here the clock is swappable rather than values being
//! pre-baked into triggers, since the platform is a synchronous request/
//! response system rather than a replay log.

use std::sync::Arc;
use std::sync::Mutex;

use chrono::DateTime;
use chrono::Utc;

/// Wall-clock source. All persisted times are UTC.
pub trait Clock: Send + Sync {
    /// Returns the current UTC instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock backed by the system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Deterministic clock for tests; advances only when told to.
#[derive(Debug, Clone)]
pub struct FixedClock {
    instant: Arc<Mutex<DateTime<Utc>>>,
}

impl FixedClock {
    /// Creates a fixed clock starting at `instant`.
    #[must_use]
    pub fn new(instant: DateTime<Utc>) -> Self {
        Self {
            instant: Arc::new(Mutex::new(instant)),
        }
    }

    /// Advances the clock by `duration`.
    pub fn advance(&self, duration: chrono::Duration) {
        let mut guard = self.instant.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        *guard += duration;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.instant.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}
