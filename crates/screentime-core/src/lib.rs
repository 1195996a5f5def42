//! # Screentime Core Library
//!
//! Business logic for a daily screen-time allowance: a child earns minutes by
//! completing a fixed checklist, then spends them through a countdown that can
//! be paused, expires into an alarm, and optionally carries unused time into
//! the next day.
//!
//! ## Architecture
//!
//! - **Allocation**: pure checklist + weekday/weekend + settings -> minutes
//! - **Rollover**: materializes one [`DailyRecord`] per calendar date,
//!   applying carry-over from the previous date
//! - **Timer**: a wall-clock-anchored countdown state machine plus the alarm
//!   repeat controller. Neither starts threads; the caller drives them by
//!   calling `tick()` periodically with an explicit `now`
//! - **Storage**: a [`RecordStore`] port with SQLite and in-memory key-value
//!   backends and lenient decoding of persisted payloads
//! - **Session**: the stateful host adapter that persists after every
//!   command and keeps the alarm in sync
//!
//! ## Key Components
//!
//! - [`CountdownEngine`]: countdown transitions over a record's timer fields
//! - [`DailyRecordController`]: checklist edits, start/pause/finish, rollover
//! - [`DayRolloverManager`]: record creation and carry-over
//! - [`Session`]: persistence and alarm side effects around the controller

pub mod allocation;
pub mod calendar;
pub mod checklist;
pub mod controller;
pub mod error;
pub mod events;
pub mod record;
pub mod rollover;
pub mod session;
pub mod storage;
pub mod timer;

pub use allocation::AllocationPolicy;
pub use calendar::{CivilCalendar, DateKey};
pub use checklist::{Checklist, ChecklistItem};
pub use controller::DailyRecordController;
pub use error::{ConfigError, CoreError, StorageError};
pub use events::Event;
pub use record::DailyRecord;
pub use rollover::DayRolloverManager;
pub use session::Session;
pub use storage::{
    AlarmTone, Database, KvBackend, KvRecordStore, MemoryKv, RecordStore, Records, Settings,
};
pub use timer::{
    AlarmController, AlarmSound, CountdownEngine, SilentAlarm, ALARM_REPEAT_INTERVAL,
    ROLLOVER_CHECK_INTERVAL, TICK_INTERVAL,
};
