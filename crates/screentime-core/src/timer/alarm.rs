//! Alarm repeat controller.
//!
//! Follows a record's `alarming` flag. The sound fires on the rising edge and
//! then once per [`ALARM_REPEAT_INTERVAL`] until the flag drops, at which
//! point the pending repeat is cancelled.

use chrono::{DateTime, Duration, Utc};

use super::ALARM_REPEAT_INTERVAL;
use crate::storage::{AlarmTone, Settings};

/// A host polling on the repeat period wakes a little early or late; a poll
/// this close to the due time counts as on time.
fn poll_tolerance() -> Duration {
    Duration::milliseconds(50)
}

/// External sound collaborator.
///
/// Fire-and-forget: called repeatedly at the repeat interval, and free to do
/// nothing when the host has no audio.
pub trait AlarmSound {
    fn trigger(&self, tone: AlarmTone, volume: u8);
}

/// Sound sink for hosts without audio.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentAlarm;

impl AlarmSound for SilentAlarm {
    fn trigger(&self, _tone: AlarmTone, _volume: u8) {}
}

impl<T: AlarmSound + ?Sized> AlarmSound for &T {
    fn trigger(&self, tone: AlarmTone, volume: u8) {
        (**self).trigger(tone, volume)
    }
}

/// Holds only the next scheduled repeat.
#[derive(Debug, Default, Clone)]
pub struct AlarmController {
    next_due: Option<DateTime<Utc>>,
}

fn repeat_interval() -> Duration {
    Duration::from_std(ALARM_REPEAT_INTERVAL).unwrap_or_else(|_| Duration::milliseconds(800))
}

impl AlarmController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.next_due.is_some()
    }

    /// When the next repeat is scheduled, if ringing.
    pub fn next_due(&self) -> Option<DateTime<Utc>> {
        self.next_due
    }

    /// Bring the controller in line with `alarming` at `now`.
    ///
    /// Returns `true` when the sound was triggered.
    pub fn sync<A: AlarmSound>(
        &mut self,
        alarming: bool,
        now: DateTime<Utc>,
        settings: &Settings,
        sound: &A,
    ) -> bool {
        if !alarming {
            if self.next_due.take().is_some() {
                tracing::debug!("alarm dismissed, repeat cancelled");
            }
            return false;
        }

        let due = match self.next_due {
            None => true,
            Some(at) => now + poll_tolerance() >= at,
        };
        if !due {
            return false;
        }

        sound.trigger(settings.alarm_tone, settings.alarm_volume);
        self.next_due = Some(match self.next_due {
            None => now + repeat_interval(),
            Some(at) => next_on_grid(at, now),
        });
        true
    }
}

/// First grid point after both `due` and `now`.
///
/// Repeats stay on the fixed period measured from the first trigger; repeats
/// missed while the host was stalled are skipped rather than replayed.
fn next_on_grid(due: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
    let step = repeat_interval().num_milliseconds().max(1);
    let behind = (now - due).num_milliseconds().max(0);
    due + Duration::milliseconds(step * (behind / step + 1))
}
