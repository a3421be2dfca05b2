//! Simulation Time Helpers
//!
//! The engine counts simulated seconds from a monotonic clock. Durations
//! in records (heal deadlines, cooldowns, settlement ages) are expressed
//! in these units.

/// Seconds per minute.
pub const MINUTE: u64 = 60;

/// Seconds per hour.
pub const HOUR: u64 = 3_600;

/// Seconds per calendar day; daily counters reset on this boundary.
pub const SECS_PER_DAY: u64 = 86_400;

/// Returns the calendar day index for a timestamp.
pub fn day_of(now: u64) -> u64 {
    now / SECS_PER_DAY
}
