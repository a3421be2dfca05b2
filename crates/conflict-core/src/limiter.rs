//! Rate Limiter
//!
//! Per-key daily counters with optional cooldown windows. Every
//! probabilistic subsystem caps its frequency through this one resource,
//! so the read-then-increment caveat lives in exactly one place. Under the
//! single-threaded schedule the counters are exact; an external store
//! applying these as last-write-wins patches may overshoot a cap by a
//! small margin, which is tolerated.

use bevy_ecs::prelude::*;
use conflict_events::day_of;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One counter, scoped to a calendar day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyCounter {
    pub day: u64,
    pub count: u32,
    /// Timestamp of the last consumed event, for cooldown checks.
    pub last_event: Option<u64>,
}

/// Resource: all daily counters and cooldown markers, keyed by string.
#[derive(Resource, Debug, Default)]
pub struct RateLimiter {
    counters: HashMap<String, DailyCounter>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes one unit for `key` if the daily cap and cooldown both
    /// allow it. The count resets implicitly when the calendar day rolls
    /// over.
    pub fn try_consume(&mut self, key: &str, max_per_day: u32, cooldown_secs: u64, now: u64) -> bool {
        let today = day_of(now);
        let counter = self
            .counters
            .entry(key.to_string())
            .or_insert_with(|| DailyCounter {
                day: today,
                count: 0,
                last_event: None,
            });

        if counter.day != today {
            counter.day = today;
            counter.count = 0;
        }

        if counter.count >= max_per_day {
            return false;
        }
        if cooldown_secs > 0 {
            if let Some(last) = counter.last_event {
                if now < last + cooldown_secs {
                    return false;
                }
            }
        }

        counter.count += 1;
        counter.last_event = Some(now);
        true
    }

    /// Refreshes a pure cooldown marker without counting against any cap.
    pub fn touch(&mut self, key: &str, now: u64) {
        let today = day_of(now);
        let counter = self
            .counters
            .entry(key.to_string())
            .or_insert_with(|| DailyCounter {
                day: today,
                count: 0,
                last_event: None,
            });
        counter.last_event = Some(now);
    }

    /// True while `key` is inside its cooldown window.
    pub fn in_cooldown(&self, key: &str, cooldown_secs: u64, now: u64) -> bool {
        self.counters
            .get(key)
            .and_then(|c| c.last_event)
            .is_some_and(|last| now < last + cooldown_secs)
    }

    /// Today's count for `key`; zero if the day has rolled over.
    pub fn count_today(&self, key: &str, now: u64) -> u32 {
        self.counters
            .get(key)
            .filter(|c| c.day == day_of(now))
            .map_or(0, |c| c.count)
    }
}
