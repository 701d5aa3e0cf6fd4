//! Availability and slot-conflict engine.
//!
//! Both halves share one [`SlotPolicy`], so the availability listing and the
//! reservation path always agree on how long "one slot" is.

pub mod availability;
pub mod clock;
pub mod interval;
pub mod reservation;

use chrono::Duration;
use std::sync::Arc;

use crate::config::SchedulingConfig;
use crate::models::Service;
use crate::services::notifications::Notifier;
use crate::store::Store;

use self::clock::Clock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotPolicy {
    pub buffer: Duration,
}

impl SlotPolicy {
    pub fn new(buffer_minutes: i64) -> Self {
        Self {
            buffer: Duration::minutes(buffer_minutes.max(0)),
        }
    }

    pub fn from_config(config: &SchedulingConfig) -> Self {
        Self::new(config.buffer_minutes)
    }

    /// Length of the interval one booking of `service` occupies.
    pub fn slot_length(&self, service: &Service) -> Duration {
        service.duration() + self.buffer
    }
}

impl Default for SlotPolicy {
    fn default() -> Self {
        Self::new(15)
    }
}

/// Everything one scheduling call needs. Cheap to clone; holds no mutable
/// state of its own, so every call re-reads storage.
#[derive(Clone)]
pub struct Scheduler {
    pub store: Arc<dyn Store>,
    pub notifier: Arc<dyn Notifier>,
    pub clock: Arc<dyn Clock>,
    pub policy: SlotPolicy,
}

impl Scheduler {
    pub fn new(
        store: Arc<dyn Store>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
        policy: SlotPolicy,
    ) -> Self {
        Self {
            store,
            notifier,
            clock,
            policy,
        }
    }
}
