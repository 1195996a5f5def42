//! Day rollover: one record per civil date, with carry-over.

use crate::calendar::DateKey;
use crate::record::DailyRecord;
use crate::storage::{RecordStore, Records, Settings};

/// Decides whether a date reuses its stored record or gets a fresh one.
pub struct DayRolloverManager;

impl DayRolloverManager {
    /// Seconds inherited from the day before `date`.
    ///
    /// Only the immediately preceding date is consulted, and only when
    /// carry-over is enabled.
    pub fn carry_in_for(date: DateKey, records: &Records, settings: &Settings) -> u64 {
        if !settings.carry_over_enabled {
            return 0;
        }
        date.previous()
            .and_then(|prev| records.get(&prev))
            .and_then(|prev| prev.remaining_seconds)
            .unwrap_or(0)
    }

    /// Build a fresh record for `date` from an in-memory map.
    pub fn materialize(date: DateKey, records: &Records, settings: &Settings) -> DailyRecord {
        DailyRecord::new(date, Self::carry_in_for(date, records, settings))
    }

    /// The stored record for `date`, or a newly materialized one.
    ///
    /// Never writes, and never touches the previous day's record.
    pub fn record_for<S: RecordStore>(
        date: DateKey,
        store: &S,
        settings: &Settings,
    ) -> DailyRecord {
        let records = load_or_empty(store);
        match records.get(&date) {
            Some(existing) => {
                let mut record = existing.clone();
                record.normalize();
                record
            }
            None => {
                let record = Self::materialize(date, &records, settings);
                tracing::info!(
                    date = %date,
                    carry_in_seconds = record.carry_in_seconds,
                    "new daily record"
                );
                record
            }
        }
    }

    /// Discard the record for `date` and rebuild it as if it never existed.
    ///
    /// The rebuilt record is written back (best-effort) and returned.
    pub fn reset<S: RecordStore>(date: DateKey, store: &S, settings: &Settings) -> DailyRecord {
        let mut records = load_or_empty(store);
        records.remove(&date);
        let record = Self::materialize(date, &records, settings);
        records.insert(date, record.clone());
        if let Err(e) = store.save_records(&records) {
            tracing::warn!(date = %date, error = %e, "failed to persist reset record");
        }
        tracing::info!(
            date = %date,
            carry_in_seconds = record.carry_in_seconds,
            "daily record reset"
        );
        record
    }
}

pub(crate) fn load_or_empty<S: RecordStore>(store: &S) -> Records {
    store.load_records().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "failed to read records, treating as empty");
        Records::new()
    })
}
