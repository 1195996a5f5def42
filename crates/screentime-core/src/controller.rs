//! Daily record controller.
//!
//! Command functions of the form `(record, input, now) -> record'`. Ignored
//! commands return `None` rather than an error so hosts can tell "accepted"
//! from "ignored" without treating either as a failure. Persistence and
//! alarm side effects are left to the caller (see [`Session`](crate::Session)).

use chrono::{DateTime, Utc};

use crate::allocation::AllocationPolicy;
use crate::calendar::CivilCalendar;
use crate::checklist::ChecklistItem;
use crate::record::DailyRecord;
use crate::rollover::{load_or_empty, DayRolloverManager};
use crate::storage::{RecordStore, Settings};
use crate::timer::CountdownEngine;

pub struct DailyRecordController;

impl DailyRecordController {
    /// Allowance for the record's day: the locked value once set, otherwise
    /// what the checklist currently earns.
    pub fn allocation_for(record: &DailyRecord, settings: &Settings) -> u32 {
        record.locked_allocation_minutes.unwrap_or_else(|| {
            AllocationPolicy::compute(&record.checklist, settings, record.date.is_weekend())
        })
    }

    pub fn effective_remaining(record: &DailyRecord, settings: &Settings) -> u64 {
        CountdownEngine::effective_remaining(record, Self::allocation_for(record, settings))
    }

    pub fn can_start(record: &DailyRecord, settings: &Settings) -> bool {
        CountdownEngine::can_start(record, Self::allocation_for(record, settings))
    }

    /// Starting with an incomplete checklist should be confirmed by the UI.
    pub fn requires_confirmation(record: &DailyRecord) -> bool {
        !record.checklist.is_complete()
    }

    /// Flip one checklist item. The checklist is frozen while running.
    pub fn toggle_check(record: &DailyRecord, item: ChecklistItem) -> Option<DailyRecord> {
        if record.running {
            return None;
        }
        let mut next = record.clone();
        next.checklist.toggle(item);
        Some(next)
    }

    pub fn start(
        record: &DailyRecord,
        settings: &Settings,
        now: DateTime<Utc>,
    ) -> Option<DailyRecord> {
        CountdownEngine::start(record, Self::allocation_for(record, settings), now)
    }

    pub fn pause(record: &DailyRecord, now: DateTime<Utc>) -> Option<DailyRecord> {
        CountdownEngine::pause(record, now)
    }

    pub fn tick(record: &DailyRecord, now: DateTime<Utc>) -> Option<DailyRecord> {
        CountdownEngine::tick(record, now)
    }

    pub fn finish(record: &DailyRecord, settings: &Settings) -> DailyRecord {
        CountdownEngine::finish(record, Self::allocation_for(record, settings))
    }

    /// Switch to a new record when the civil date has changed.
    ///
    /// Persists the outgoing record, materializes the record for today via
    /// [`DayRolloverManager::record_for`], persists it and returns it.
    /// Returns `None` while the date is unchanged. Writes are best-effort.
    pub fn check_rollover<S: RecordStore>(
        current: &DailyRecord,
        now: DateTime<Utc>,
        calendar: &CivilCalendar,
        store: &S,
        settings: &Settings,
    ) -> Option<DailyRecord> {
        let today = calendar.date_key(now);
        if today == current.date {
            return None;
        }

        persist(store, current);
        let next = DayRolloverManager::record_for(today, store, settings);
        persist(store, &next);
        tracing::info!(from = %current.date, to = %today, "day rolled over");
        Some(next)
    }
}

/// Read-all, replace one entry, write-all. Failures are logged, not raised.
pub(crate) fn persist<S: RecordStore>(store: &S, record: &DailyRecord) -> bool {
    let mut records = load_or_empty(store);
    records.insert(record.date, record.clone());
    match store.save_records(&records) {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(date = %record.date, error = %e, "failed to persist daily record");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::DateKey;
    use crate::storage::{KvRecordStore, MemoryKv};
    use chrono::{Duration, TimeZone};

    // 2024-06-10 is a Monday, 2024-06-08 a Saturday.
    fn monday() -> DateKey {
        DateKey::from_ymd(2024, 6, 10).unwrap()
    }

    fn settings() -> Settings {
        Settings {
            weekday_full_minutes: 45,
            weekday_fallback_minutes: 15,
            weekend_full_minutes: 90,
            weekend_fallback_minutes: 30,
            ..Settings::default()
        }
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 10, 16, 0, 0).unwrap()
    }

    fn complete(mut record: DailyRecord) -> DailyRecord {
        for item in ChecklistItem::ALL {
            record.checklist.set(item, true);
        }
        record
    }

    #[test]
    fn allocation_uses_weekend_bucket_from_date() {
        let saturday = DailyRecord::new(DateKey::from_ymd(2024, 6, 8).unwrap(), 0);
        assert_eq!(DailyRecordController::allocation_for(&saturday, &settings()), 30);
        assert_eq!(
            DailyRecordController::allocation_for(&complete(saturday), &settings()),
            90
        );
        let weekday = DailyRecord::new(monday(), 0);
        assert_eq!(DailyRecordController::allocation_for(&weekday, &settings()), 15);
    }

    #[test]
    fn checklist_is_frozen_while_running() {
        let record = DailyRecord::new(monday(), 0);
        let started = DailyRecordController::start(&record, &settings(), t0()).unwrap();
        assert!(DailyRecordController::toggle_check(&started, ChecklistItem::Homework).is_none());

        let paused = DailyRecordController::pause(&started, t0() + Duration::seconds(3)).unwrap();
        let toggled =
            DailyRecordController::toggle_check(&paused, ChecklistItem::Homework).unwrap();
        assert!(toggled.checklist.homework);
    }

    #[test]
    fn locked_allocation_survives_checklist_changes() {
        let record = complete(DailyRecord::new(monday(), 0));
        let started = DailyRecordController::start(&record, &settings(), t0()).unwrap();
        assert_eq!(started.locked_allocation_minutes, Some(45));

        let paused = DailyRecordController::pause(&started, t0() + Duration::seconds(60)).unwrap();
        let edited = DailyRecordController::toggle_check(&paused, ChecklistItem::Bedtime).unwrap();
        assert!(!edited.checklist.is_complete());
        assert_eq!(edited.locked_allocation_minutes, Some(45));
        assert_eq!(DailyRecordController::allocation_for(&edited, &settings()), 45);

        let resumed =
            DailyRecordController::start(&edited, &settings(), t0() + Duration::seconds(60))
                .unwrap();
        assert_eq!(resumed.remaining_seconds, Some(45 * 60 - 60));
    }

    #[test]
    fn confirmation_needed_only_for_incomplete_checklist() {
        let record = DailyRecord::new(monday(), 0);
        assert!(DailyRecordController::requires_confirmation(&record));
        assert!(!DailyRecordController::requires_confirmation(&complete(record)));
    }

    #[test]
    fn cannot_start_after_finish() {
        let record = DailyRecord::new(monday(), 0);
        assert!(DailyRecordController::can_start(&record, &settings()));
        let done = DailyRecordController::finish(&record, &settings());
        assert_eq!(done.locked_allocation_minutes, Some(15));
        assert!(!DailyRecordController::can_start(&done, &settings()));
        assert!(DailyRecordController::start(&done, &settings(), t0()).is_none());
    }

    #[test]
    fn rollover_is_noop_on_same_day() {
        let store = KvRecordStore::new(MemoryKv::new());
        let record = DailyRecord::new(monday(), 0);
        let late = Utc.with_ymd_and_hms(2024, 6, 10, 23, 59, 59).unwrap();
        assert!(DailyRecordController::check_rollover(
            &record,
            late,
            &CivilCalendar::utc(),
            &store,
            &settings()
        )
        .is_none());
        assert!(store.load_records().unwrap().is_empty());
    }

    #[test]
    fn rollover_persists_both_days_and_carries_over() {
        let store = KvRecordStore::new(MemoryKv::new());
        let cfg = Settings {
            carry_over_enabled: true,
            ..settings()
        };
        let mut outgoing = DailyRecord::new(monday(), 0);
        outgoing.remaining_seconds = Some(600);
        outgoing.locked_allocation_minutes = Some(15);

        let midnight = Utc.with_ymd_and_hms(2024, 6, 11, 0, 0, 5).unwrap();
        let next = DailyRecordController::check_rollover(
            &outgoing,
            midnight,
            &CivilCalendar::utc(),
            &store,
            &cfg,
        )
        .unwrap();

        assert_eq!(next.date.to_string(), "2024-06-11");
        assert_eq!(next.carry_in_seconds, 600);
        let records = store.load_records().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[&monday()], outgoing);
        assert_eq!(records[&next.date], next);
    }
}
