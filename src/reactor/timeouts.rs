//! Per-connection timers (`spec.md` §4.5: "read-idle, write-idle, total-lifetime").

use std::time::{Duration, Instant};

use crate::config::ReactorConfig;

/// The three independent clocks a connection is watched against. Exceeding any one
/// is a protocol-level timeout: the connection is detached and closed, not retried.
#[derive(Debug, Clone, Copy)]
pub struct ConnectionTimeouts {
    pub read_idle: Duration,
    pub write_idle: Duration,
    pub max_lifetime: Duration,
}

impl ConnectionTimeouts {
    pub fn from_config(config: &ReactorConfig) -> Self {
        ConnectionTimeouts {
            read_idle: config.read_idle(),
            write_idle: config.write_idle(),
            max_lifetime: config.max_lifetime(),
        }
    }
}

/// Tracks the instants needed to evaluate [`ConnectionTimeouts`] against a single
/// live connection.
#[derive(Debug, Clone, Copy)]
pub struct TimeoutTracker {
    started_at: Instant,
    last_read_at: Instant,
    last_write_at: Instant,
}

impl TimeoutTracker {
    pub fn new(now: Instant) -> Self {
        TimeoutTracker {
            started_at: now,
            last_read_at: now,
            last_write_at: now,
        }
    }

    pub fn record_read(&mut self, now: Instant) {
        self.last_read_at = now;
    }

    pub fn record_write(&mut self, now: Instant) {
        self.last_write_at = now;
    }

    pub fn read_idle_expired(&self, limits: &ConnectionTimeouts, now: Instant) -> bool {
        now.saturating_duration_since(self.last_read_at) >= limits.read_idle
    }

    pub fn write_idle_expired(&self, limits: &ConnectionTimeouts, now: Instant) -> bool {
        now.saturating_duration_since(self.last_write_at) >= limits.write_idle
    }

    pub fn lifetime_expired(&self, limits: &ConnectionTimeouts, now: Instant) -> bool {
        now.saturating_duration_since(self.started_at) >= limits.max_lifetime
    }
}
