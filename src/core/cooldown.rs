//! In-memory cooldown tracker keyed by `(command, user)`.
//!
//! Cooldowns are rate limits only; they are not persisted and reset on restart.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tracing::trace;

/// Result of a cooldown check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CooldownCheck {
    /// Whether the action may proceed
    pub allowed: bool,
    /// Milliseconds until the action is allowed again (0 when allowed)
    pub remaining_ms: i64,
}

/// Last action timestamps per `(command, user)`.
#[derive(Debug, Default)]
pub struct CooldownTracker {
    entries: Mutex<HashMap<(String, String), DateTime<Utc>>>,
}

fn window_ms(cooldown: Duration) -> i64 {
    i64::try_from(cooldown.as_millis()).unwrap_or(i64::MAX)
}

impl CooldownTracker {
    /// Creates an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn remaining(
        entries: &HashMap<(String, String), DateTime<Utc>>,
        command: &str,
        user_id: &str,
        cooldown: Duration,
        now: DateTime<Utc>,
    ) -> i64 {
        entries
            .get(&(command.to_string(), user_id.to_string()))
            .map_or(0, |last| {
                let elapsed = (now - *last).num_milliseconds();
                (window_ms(cooldown) - elapsed).max(0)
            })
    }

    /// Checks the cooldown without recording anything.
    pub fn check(
        &self,
        command: &str,
        user_id: &str,
        cooldown: Duration,
        now: DateTime<Utc>,
    ) -> CooldownCheck {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let remaining_ms = Self::remaining(&entries, command, user_id, cooldown, now);
        CooldownCheck {
            allowed: remaining_ms == 0,
            remaining_ms,
        }
    }

    /// Checks the cooldown and, if it has elapsed, records `now` in the same step.
    ///
    /// Two calls in a row inside the window: the first is allowed, the second is not.
    pub fn check_and_consume(
        &self,
        command: &str,
        user_id: &str,
        cooldown: Duration,
        now: DateTime<Utc>,
    ) -> CooldownCheck {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let remaining_ms = Self::remaining(&entries, command, user_id, cooldown, now);
        if remaining_ms > 0 {
            trace!("{user_id} is on cooldown for {command}: {remaining_ms} ms left");
            return CooldownCheck {
                allowed: false,
                remaining_ms,
            };
        }
        entries.insert((command.to_string(), user_id.to_string()), now);
        CooldownCheck {
            allowed: true,
            remaining_ms: 0,
        }
    }

    /// Records `now` as the last action unconditionally.
    pub fn record(&self, command: &str, user_id: &str, now: DateTime<Utc>) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((command.to_string(), user_id.to_string()), now);
    }

    /// Forgets every cooldown the user has.
    pub fn reset_user(&self, user_id: &str) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|(_, user), _| user != user_id);
    }
}
