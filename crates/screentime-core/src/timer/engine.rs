//! Countdown engine.
//!
//! A wall-clock-anchored state machine over the timer fields of a
//! [`DailyRecord`]. It owns no clock and no thread: every operation takes
//! `now` explicitly and returns the next record, so the caller decides when
//! to tick and when to persist.
//!
//! ## State Transitions
//!
//! ```text
//! Idle --start--> Running --pause--> Paused --start--> Running
//!                    |                                    |
//!                    +--tick reaches 0--> Alarming <------+
//!  any --finish--> Finished (remaining 0, not alarming)
//! ```
//!
//! ## Drift
//!
//! `tick` moves the anchor forward by the whole seconds it consumed instead
//! of resetting it to `now`. The sub-second remainder stays on the clock, so
//! irregular, late or coalesced ticks (a suspended laptop, a throttled
//! background tab) still add up to exactly the elapsed wall time.

use chrono::{DateTime, Duration, Utc};

use crate::record::DailyRecord;

/// Countdown transitions. All functions are pure.
pub struct CountdownEngine;

impl CountdownEngine {
    /// Seconds the next `start` would run for.
    pub fn effective_remaining(record: &DailyRecord, allocation_minutes: u32) -> u64 {
        record
            .remaining_seconds
            .unwrap_or_else(|| u64::from(allocation_minutes) * 60 + record.carry_in_seconds)
    }

    pub fn can_start(record: &DailyRecord, allocation_minutes: u32) -> bool {
        !record.running && Self::effective_remaining(record, allocation_minutes) > 0
    }

    /// Start or resume the countdown.
    ///
    /// `allocation_minutes` is only used (and locked for the day) when no
    /// allocation is locked yet. Returns `None` when already running or
    /// nothing is left to spend.
    pub fn start(
        record: &DailyRecord,
        allocation_minutes: u32,
        now: DateTime<Utc>,
    ) -> Option<DailyRecord> {
        let allocation = record.locked_allocation_minutes.unwrap_or(allocation_minutes);
        if !Self::can_start(record, allocation) {
            return None;
        }

        let mut next = record.clone();
        if next.locked_allocation_minutes.is_none() {
            next.locked_allocation_minutes = Some(allocation);
        }
        next.remaining_seconds = Some(Self::effective_remaining(record, allocation));
        next.running = true;
        next.alarming = false;
        next.anchor = Some(now);
        Some(next)
    }

    /// Account for the time elapsed since the anchor.
    ///
    /// Returns `None` when not running or no whole second has passed. When the
    /// countdown reaches zero the record stops and starts alarming.
    pub fn tick(record: &DailyRecord, now: DateTime<Utc>) -> Option<DailyRecord> {
        if !record.running {
            return None;
        }
        let (anchor, remaining) = (record.anchor?, record.remaining_seconds?);
        let elapsed = (now - anchor).num_seconds();
        if elapsed <= 0 {
            return None;
        }

        let mut next = record.clone();
        let left = remaining.saturating_sub(elapsed as u64);
        if left > 0 {
            next.remaining_seconds = Some(left);
            next.anchor = Some(anchor + Duration::seconds(elapsed));
        } else {
            next.remaining_seconds = Some(0);
            next.running = false;
            next.anchor = None;
            next.alarming = true;
        }
        Some(next)
    }

    /// Stop the countdown, keeping what is left.
    ///
    /// Reaching zero here is a plain stop: pause never raises the alarm.
    pub fn pause(record: &DailyRecord, now: DateTime<Utc>) -> Option<DailyRecord> {
        if !record.running {
            return None;
        }
        let mut next = record.clone();
        if let (Some(anchor), Some(remaining)) = (record.anchor, record.remaining_seconds) {
            let elapsed = (now - anchor).num_seconds().max(0) as u64;
            next.remaining_seconds = Some(remaining.saturating_sub(elapsed));
        }
        next.running = false;
        next.alarming = false;
        next.anchor = None;
        Some(next)
    }

    /// End the day's countdown immediately and silence any alarm.
    ///
    /// A day finished without ever starting still locks what it would have
    /// earned.
    pub fn finish(record: &DailyRecord, allocation_minutes: u32) -> DailyRecord {
        let mut next = record.clone();
        if next.locked_allocation_minutes.is_none() {
            next.locked_allocation_minutes = Some(allocation_minutes);
        }
        next.remaining_seconds = Some(0);
        next.running = false;
        next.alarming = false;
        next.anchor = None;
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::DateKey;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 10, 15, 0, 0).unwrap()
    }

    fn secs(n: i64) -> Duration {
        Duration::seconds(n)
    }

    fn fresh(carry_in: u64) -> DailyRecord {
        DailyRecord::new(DateKey::from_ymd(2024, 6, 10).unwrap(), carry_in)
    }

    fn running_with(remaining: u64) -> DailyRecord {
        let mut record = fresh(0);
        record.locked_allocation_minutes = Some(1);
        record.remaining_seconds = Some(remaining);
        record.running = true;
        record.anchor = Some(t0());
        record
    }

    #[test]
    fn start_locks_allocation_and_adds_carry_in() {
        let record = CountdownEngine::start(&fresh(90), 45, t0()).unwrap();
        assert_eq!(record.locked_allocation_minutes, Some(45));
        assert_eq!(record.remaining_seconds, Some(45 * 60 + 90));
        assert!(record.running);
        assert!(!record.alarming);
        assert_eq!(record.anchor, Some(t0()));
    }

    #[test]
    fn start_uses_locked_allocation_over_argument() {
        let mut record = fresh(0);
        record.locked_allocation_minutes = Some(30);
        let started = CountdownEngine::start(&record, 120, t0()).unwrap();
        assert_eq!(started.locked_allocation_minutes, Some(30));
        assert_eq!(started.remaining_seconds, Some(1800));
    }

    #[test]
    fn start_is_ignored_when_running_or_exhausted() {
        assert!(CountdownEngine::start(&running_with(10), 45, t0()).is_none());

        let mut spent = fresh(0);
        spent.remaining_seconds = Some(0);
        assert!(CountdownEngine::start(&spent, 45, t0()).is_none());
        assert!(!CountdownEngine::can_start(&spent, 45));
    }

    #[test]
    fn ticks_sum_to_elapsed_wall_time() {
        let r = 600;
        let first = CountdownEngine::tick(&running_with(r), t0() + secs(7)).unwrap();
        assert_eq!(first.remaining_seconds, Some(r - 7));
        assert!(first.running);
        assert_eq!(first.anchor, Some(t0() + secs(7)));

        let second = CountdownEngine::tick(&first, t0() + secs(10)).unwrap();
        assert_eq!(second.remaining_seconds, Some(r - 10));
    }

    #[test]
    fn sub_second_remainder_is_not_lost() {
        let record = running_with(100);
        let late = t0() + Duration::milliseconds(1_600);
        let next = CountdownEngine::tick(&record, late).unwrap();
        assert_eq!(next.remaining_seconds, Some(99));
        assert_eq!(next.anchor, Some(t0() + secs(1)));

        // 0.6 s carried + 0.5 s more = one more whole second.
        let next = CountdownEngine::tick(&next, late + Duration::milliseconds(500)).unwrap();
        assert_eq!(next.remaining_seconds, Some(98));
    }

    #[test]
    fn tick_ignores_backdated_or_sub_second_now() {
        let record = running_with(100);
        assert!(CountdownEngine::tick(&record, t0() - secs(5)).is_none());
        assert!(CountdownEngine::tick(&record, t0() + Duration::milliseconds(999)).is_none());
        assert!(CountdownEngine::tick(&fresh(0), t0() + secs(5)).is_none());
    }

    #[test]
    fn expiry_sets_alarm_but_pause_does_not() {
        let expired = CountdownEngine::tick(&running_with(5), t0() + secs(5)).unwrap();
        assert_eq!(expired.remaining_seconds, Some(0));
        assert!(!expired.running);
        assert!(expired.alarming);
        assert!(expired.anchor.is_none());

        let paused = CountdownEngine::pause(&running_with(5), t0() + secs(5)).unwrap();
        assert_eq!(paused.remaining_seconds, Some(0));
        assert!(!paused.running);
        assert!(!paused.alarming);
    }

    #[test]
    fn long_suspension_clamps_at_zero() {
        let expired = CountdownEngine::tick(&running_with(30), t0() + secs(3600)).unwrap();
        assert_eq!(expired.remaining_seconds, Some(0));
        assert!(expired.alarming);
    }

    #[test]
    fn pause_then_start_restores_running_state() {
        let paused = CountdownEngine::pause(&running_with(300), t0() + secs(20)).unwrap();
        assert_eq!(paused.remaining_seconds, Some(280));
        assert!(paused.anchor.is_none());

        let resumed = CountdownEngine::start(&paused, 999, t0() + secs(20)).unwrap();
        assert!(resumed.running);
        assert_eq!(resumed.remaining_seconds, Some(280));
        assert_eq!(resumed.locked_allocation_minutes, Some(1));
    }

    #[test]
    fn finish_zeroes_and_silences_from_any_state() {
        let mut alarming = fresh(0);
        alarming.remaining_seconds = Some(0);
        alarming.alarming = true;
        alarming.locked_allocation_minutes = Some(10);

        for record in [fresh(0), running_with(100), alarming] {
            let done = CountdownEngine::finish(&record, 45);
            assert_eq!(done.remaining_seconds, Some(0));
            assert!(!done.running);
            assert!(!done.alarming);
            assert!(done.anchor.is_none());
            assert!(done.locked_allocation_minutes.is_some());
        }
    }

    #[test]
    fn finish_locks_allocation_for_unstarted_day() {
        let done = CountdownEngine::finish(&fresh(0), 45);
        assert_eq!(done.locked_allocation_minutes, Some(45));
    }
}
