use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::calendar::DateKey;
use crate::checklist::{Checklist, ChecklistItem};
use crate::storage::AlarmTone;

/// Every accepted state change in a session produces an Event.
/// Hosts print or forward them; ignored commands produce none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    ChecklistToggled {
        date: DateKey,
        item: ChecklistItem,
        checked: bool,
        at: DateTime<Utc>,
    },
    CountdownStarted {
        date: DateKey,
        remaining_secs: u64,
        locked_allocation_min: u32,
        at: DateTime<Utc>,
    },
    CountdownPaused {
        date: DateKey,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    /// The countdown ran out while running; the alarm is now sounding.
    CountdownExpired {
        date: DateKey,
        at: DateTime<Utc>,
    },
    /// Ended on purpose; any alarm is dismissed.
    CountdownFinished {
        date: DateKey,
        locked_allocation_min: u32,
        at: DateTime<Utc>,
    },
    DayRolledOver {
        from: DateKey,
        to: DateKey,
        carry_in_secs: u64,
        at: DateTime<Utc>,
    },
    DayReset {
        date: DateKey,
        carry_in_secs: u64,
        at: DateTime<Utc>,
    },
    AlarmTriggered {
        tone: AlarmTone,
        volume: u8,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        date: DateKey,
        checklist: Checklist,
        allocation_min: u32,
        locked_allocation_min: Option<u32>,
        carry_in_secs: u64,
        remaining_secs: Option<u64>,
        effective_remaining_secs: u64,
        running: bool,
        alarming: bool,
        can_start: bool,
        requires_confirmation: bool,
        at: DateTime<Utc>,
    },
}
