//! Session: the stateful shell around the pure controller.
//!
//! A session owns the store, the civil calendar, the settings loaded once at
//! open, the single in-flight [`DailyRecord`] and the alarm controller. After
//! every accepted command it writes the record through to the store
//! (best-effort) and re-syncs the alarm.

use chrono::{DateTime, Utc};

use crate::calendar::CivilCalendar;
use crate::checklist::ChecklistItem;
use crate::controller::{persist, DailyRecordController};
use crate::error::{ConfigError, CoreError};
use crate::events::Event;
use crate::record::DailyRecord;
use crate::rollover::DayRolloverManager;
use crate::storage::{RecordStore, Settings};
use crate::timer::{AlarmController, AlarmSound, SilentAlarm};

pub struct Session<S: RecordStore, A: AlarmSound = SilentAlarm> {
    store: S,
    sound: A,
    calendar: CivilCalendar,
    settings: Settings,
    record: DailyRecord,
    alarm: AlarmController,
}

impl<S: RecordStore, A: AlarmSound> Session<S, A> {
    /// Load settings and today's record, creating the record if needed.
    pub fn open(store: S, calendar: CivilCalendar, sound: A, now: DateTime<Utc>) -> Self {
        let settings = store.load_settings().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "failed to read settings, using defaults");
            Settings::default()
        });
        let record = DayRolloverManager::record_for(calendar.date_key(now), &store, &settings);
        persist(&store, &record);

        let mut session = Self {
            store,
            sound,
            calendar,
            settings,
            record,
            alarm: AlarmController::new(),
        };
        session.sync_alarm(now);
        session
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn record(&self) -> &DailyRecord {
        &self.record
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn calendar(&self) -> &CivilCalendar {
        &self.calendar
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn alarm(&self) -> &AlarmController {
        &self.alarm
    }

    pub fn can_start(&self) -> bool {
        DailyRecordController::can_start(&self.record, &self.settings)
    }

    pub fn requires_confirmation(&self) -> bool {
        DailyRecordController::requires_confirmation(&self.record)
    }

    pub fn snapshot(&self, now: DateTime<Utc>) -> Event {
        let record = &self.record;
        Event::StateSnapshot {
            date: record.date,
            checklist: record.checklist,
            allocation_min: DailyRecordController::allocation_for(record, &self.settings),
            locked_allocation_min: record.locked_allocation_minutes,
            carry_in_secs: record.carry_in_seconds,
            remaining_secs: record.remaining_seconds,
            effective_remaining_secs: DailyRecordController::effective_remaining(
                record,
                &self.settings,
            ),
            running: record.running,
            alarming: record.alarming,
            can_start: self.can_start(),
            requires_confirmation: self.requires_confirmation(),
            at: now,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn toggle_check(&mut self, item: ChecklistItem, now: DateTime<Utc>) -> Option<Event> {
        let Some(next) = DailyRecordController::toggle_check(&self.record, item) else {
            tracing::debug!(item = %item, "checklist is locked while running");
            return None;
        };
        let checked = next.checklist.is_checked(item);
        self.apply(next, now);
        Some(Event::ChecklistToggled {
            date: self.record.date,
            item,
            checked,
            at: now,
        })
    }

    pub fn start(&mut self, now: DateTime<Utc>) -> Option<Event> {
        let Some(next) = DailyRecordController::start(&self.record, &self.settings, now) else {
            tracing::debug!(date = %self.record.date, "cannot start countdown");
            return None;
        };
        let remaining_secs = next.remaining_seconds.unwrap_or(0);
        let locked_allocation_min = next.locked_allocation_minutes.unwrap_or(0);
        tracing::info!(date = %next.date, remaining_secs, "countdown started");
        self.apply(next, now);
        Some(Event::CountdownStarted {
            date: self.record.date,
            remaining_secs,
            locked_allocation_min,
            at: now,
        })
    }

    pub fn pause(&mut self, now: DateTime<Utc>) -> Option<Event> {
        let Some(next) = DailyRecordController::pause(&self.record, now) else {
            tracing::debug!(date = %self.record.date, "pause ignored, not running");
            return None;
        };
        let remaining_secs = next.remaining_seconds.unwrap_or(0);
        tracing::info!(date = %next.date, remaining_secs, "countdown paused");
        self.apply(next, now);
        Some(Event::CountdownPaused {
            date: self.record.date,
            remaining_secs,
            at: now,
        })
    }

    /// Advance the countdown. Returns `Some` only when it expires.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Option<Event> {
        let next = DailyRecordController::tick(&self.record, now)?;
        let expired = next.alarming;
        self.apply(next, now);
        if !expired {
            return None;
        }
        tracing::info!(date = %self.record.date, "countdown expired");
        Some(Event::CountdownExpired {
            date: self.record.date,
            at: now,
        })
    }

    pub fn finish(&mut self, now: DateTime<Utc>) -> Event {
        let next = DailyRecordController::finish(&self.record, &self.settings);
        let locked_allocation_min = next.locked_allocation_minutes.unwrap_or(0);
        tracing::info!(date = %next.date, "countdown finished");
        self.apply(next, now);
        Event::CountdownFinished {
            date: self.record.date,
            locked_allocation_min,
            at: now,
        }
    }

    /// Switch to a new record when the civil date has changed.
    pub fn check_rollover(&mut self, now: DateTime<Utc>) -> Option<Event> {
        let from = self.record.date;
        let next = DailyRecordController::check_rollover(
            &self.record,
            now,
            &self.calendar,
            &self.store,
            &self.settings,
        )?;
        self.record = next;
        self.sync_alarm(now);
        Some(Event::DayRolledOver {
            from,
            to: self.record.date,
            carry_in_secs: self.record.carry_in_seconds,
            at: now,
        })
    }

    /// Repeat the alarm sound if one is due.
    pub fn alarm_tick(&mut self, now: DateTime<Utc>) -> Option<Event> {
        if !self.sync_alarm(now) {
            return None;
        }
        Some(Event::AlarmTriggered {
            tone: self.settings.alarm_tone,
            volume: self.settings.alarm_volume,
            at: now,
        })
    }

    /// Rollover check followed by a tick, for hosts that were not running.
    pub fn catch_up(&mut self, now: DateTime<Utc>) -> Vec<Event> {
        let mut events = Vec::new();
        events.extend(self.check_rollover(now));
        events.extend(self.tick(now));
        events
    }

    /// Adopt the stored copy of the current record if another process
    /// changed it. Last writer still wins; this only narrows the window.
    pub fn reload(&mut self, now: DateTime<Utc>) -> bool {
        let stored = match self.store.load_records() {
            Ok(mut records) => records.remove(&self.record.date),
            Err(e) => {
                tracing::warn!(error = %e, "failed to reload records");
                None
            }
        };
        match stored {
            Some(stored) if stored != self.record => {
                tracing::debug!(date = %stored.date, "record changed in storage");
                self.record = stored;
                self.sync_alarm(now);
                true
            }
            _ => false,
        }
    }

    /// Throw away today's record and rebuild it from scratch.
    pub fn reset_today(&mut self, now: DateTime<Utc>) -> Event {
        let date = self.record.date;
        self.record = DayRolloverManager::reset(date, &self.store, &self.settings);
        self.sync_alarm(now);
        Event::DayReset {
            date,
            carry_in_secs: self.record.carry_in_seconds,
            at: now,
        }
    }

    /// PIN-gated settings edit. The change is written through immediately.
    pub fn update_settings(&mut self, pin: &str, key: &str, value: &str) -> Result<(), CoreError> {
        if !self.settings.verify_pin(pin) {
            return Err(ConfigError::PinRejected.into());
        }
        let mut next = self.settings.clone();
        next.set(key, value)?;
        self.store.save_settings(&next)?;
        tracing::info!(key, "settings updated");
        self.settings = next;
        Ok(())
    }

    /// PIN-gated restore of every setting to its default.
    pub fn reset_settings(&mut self, pin: &str) -> Result<(), CoreError> {
        if !self.settings.verify_pin(pin) {
            return Err(ConfigError::PinRejected.into());
        }
        let next = Settings::default();
        self.store.save_settings(&next)?;
        tracing::info!("settings reset to defaults");
        self.settings = next;
        Ok(())
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn apply(&mut self, next: DailyRecord, now: DateTime<Utc>) {
        self.record = next;
        persist(&self.store, &self.record);
        self.sync_alarm(now);
    }

    fn sync_alarm(&mut self, now: DateTime<Utc>) -> bool {
        self.alarm
            .sync(self.record.alarming, now, &self.settings, &self.sound)
    }
}
