mod config;
pub mod database;
pub mod memory;

pub use config::{
    AlarmTone, Settings, MAX_ALARM_VOLUME, MAX_ALLOWANCE_MINUTES, MIN_ALLOWANCE_MINUTES,
};
pub use database::Database;
pub use memory::MemoryKv;

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde_json::{Map, Value};

use crate::calendar::DateKey;
use crate::error::StorageError;
use crate::record::DailyRecord;

/// Every persisted daily record, ordered by date.
pub type Records = BTreeMap<DateKey, DailyRecord>;

pub const SETTINGS_KEY: &str = "settings";
pub const RECORDS_KEY: &str = "records";

/// Returns `~/.config/screentime[-dev]/` based on SCREENTIME_ENV.
///
/// Set SCREENTIME_ENV=dev to use the development data directory, or
/// SCREENTIME_DATA_DIR to point somewhere else entirely.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, std::io::Error> {
    let dir = match std::env::var_os("SCREENTIME_DATA_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("SCREENTIME_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("screentime-dev")
            } else {
                base_dir.join("screentime")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Storage port used by the engine.
///
/// Whole-map semantics only: callers read every record, change one, and write
/// every record back. Two sessions sharing a store therefore race and the
/// last writer wins.
pub trait RecordStore {
    fn load_records(&self) -> Result<Records, StorageError>;
    fn save_records(&self, records: &Records) -> Result<(), StorageError>;
    fn load_settings(&self) -> Result<Settings, StorageError>;
    fn save_settings(&self, settings: &Settings) -> Result<(), StorageError>;
}

/// Minimal string key-value capability a [`KvRecordStore`] is built on.
pub trait KvBackend {
    fn kv_get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn kv_set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// [`RecordStore`] over a key-value backend with JSON payloads.
///
/// Decoding is lenient: an unparsable payload reads as empty/default, and a
/// single malformed record is dropped without losing the others.
pub struct KvRecordStore<B> {
    backend: B,
}

impl<B: KvBackend> KvRecordStore<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}

/// Decode the records map, dropping entries that cannot be read.
pub fn decode_records(raw: &str) -> Records {
    let value: Value = match serde_json::from_str(raw) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(error = %e, "records payload unparsable, starting empty");
            return Records::new();
        }
    };
    let Some(entries) = value.as_object() else {
        tracing::warn!("records payload is not an object, starting empty");
        return Records::new();
    };

    let mut records = Records::new();
    for (raw_key, entry) in entries {
        let Ok(key) = raw_key.parse::<DateKey>() else {
            tracing::warn!(key = %raw_key, "dropping record with malformed date key");
            continue;
        };
        let mut entry = entry.clone();
        // The map key is authoritative for the date.
        if let Some(obj) = entry.as_object_mut() {
            obj.insert("date".into(), Value::String(key.to_string()));
        }
        match serde_json::from_value::<DailyRecord>(entry) {
            Ok(mut record) => {
                if record.normalize() {
                    tracing::debug!(date = %key, "repaired inconsistent record on load");
                }
                records.insert(key, record);
            }
            Err(e) => {
                tracing::warn!(date = %key, error = %e, "dropping malformed record");
            }
        }
    }
    records
}

fn encode<T: serde::Serialize>(key: &str, value: &T) -> Result<String, StorageError> {
    serde_json::to_string(value).map_err(|e| StorageError::EncodeFailed {
        key: key.to_string(),
        message: e.to_string(),
    })
}

impl<B: KvBackend> RecordStore for KvRecordStore<B> {
    fn load_records(&self) -> Result<Records, StorageError> {
        Ok(self
            .backend
            .kv_get(RECORDS_KEY)?
            .map(|raw| decode_records(&raw))
            .unwrap_or_default())
    }

    fn save_records(&self, records: &Records) -> Result<(), StorageError> {
        let map: Map<String, Value> = records
            .iter()
            .map(|(key, record)| {
                serde_json::to_value(record)
                    .map(|v| (key.to_string(), v))
                    .map_err(|e| StorageError::EncodeFailed {
                        key: key.to_string(),
                        message: e.to_string(),
                    })
            })
            .collect::<Result<_, _>>()?;
        let raw = encode(RECORDS_KEY, &map)?;
        self.backend.kv_set(RECORDS_KEY, &raw)
    }

    fn load_settings(&self) -> Result<Settings, StorageError> {
        Ok(self
            .backend
            .kv_get(SETTINGS_KEY)?
            .map(|raw| Settings::from_json_str(&raw))
            .unwrap_or_default())
    }

    fn save_settings(&self, settings: &Settings) -> Result<(), StorageError> {
        let raw = encode(SETTINGS_KEY, &settings.normalized())?;
        self.backend.kv_set(SETTINGS_KEY, &raw)
    }
}

impl<T: RecordStore + ?Sized> RecordStore for &T {
    fn load_records(&self) -> Result<Records, StorageError> {
        (**self).load_records()
    }

    fn save_records(&self, records: &Records) -> Result<(), StorageError> {
        (**self).save_records(records)
    }

    fn load_settings(&self) -> Result<Settings, StorageError> {
        (**self).load_settings()
    }

    fn save_settings(&self, settings: &Settings) -> Result<(), StorageError> {
        (**self).save_settings(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> KvRecordStore<MemoryKv> {
        KvRecordStore::new(MemoryKv::new())
    }

    #[test]
    fn empty_store_reads_defaults() {
        let store = store();
        assert!(store.load_records().unwrap().is_empty());
        assert_eq!(store.load_settings().unwrap(), Settings::default());
    }

    #[test]
    fn records_survive_write_and_read() {
        let store = store();
        let key = DateKey::from_ymd(2024, 6, 10).unwrap();
        let mut record = DailyRecord::new(key, 90);
        record.checklist.homework = true;
        record.remaining_seconds = Some(1200);

        let mut records = Records::new();
        records.insert(key, record.clone());
        store.save_records(&records).unwrap();

        let loaded = store.load_records().unwrap();
        assert_eq!(loaded.get(&key), Some(&record));
    }

    #[test]
    fn malformed_entries_are_dropped_individually() {
        let store = store();
        store
            .backend()
            .kv_set(
                RECORDS_KEY,
                r#"{
                    "2024-06-09": {"date": "2024-06-09", "remaining_seconds": 600},
                    "2024-06-10": {"date": "2024-06-10", "remaining_seconds": "lots"},
                    "not-a-date": {"date": "2024-06-11"}
                }"#,
            )
            .unwrap();

        let loaded = store.load_records().unwrap();
        assert_eq!(loaded.len(), 1);
        let key = DateKey::from_ymd(2024, 6, 9).unwrap();
        assert_eq!(loaded[&key].remaining_seconds, Some(600));
    }

    #[test]
    fn non_canonical_keys_do_not_shadow_canonical_ones() {
        let store = store();
        store
            .backend()
            .kv_set(
                RECORDS_KEY,
                r#"{
                    "2024-06-09": {"remaining_seconds": 600},
                    "2024-6-9": {"remaining_seconds": 5}
                }"#,
            )
            .unwrap();

        let loaded = store.load_records().unwrap();
        assert_eq!(loaded.len(), 1);
        let key = DateKey::from_ymd(2024, 6, 9).unwrap();
        assert_eq!(loaded[&key].remaining_seconds, Some(600));
    }

    #[test]
    fn unparsable_payloads_fall_back() {
        let store = store();
        store.backend().kv_set(RECORDS_KEY, "][").unwrap();
        store.backend().kv_set(SETTINGS_KEY, "nope").unwrap();
        assert!(store.load_records().unwrap().is_empty());
        assert_eq!(store.load_settings().unwrap(), Settings::default());
    }

    #[test]
    fn map_key_wins_over_embedded_date() {
        let store = store();
        store
            .backend()
            .kv_set(RECORDS_KEY, r#"{"2024-06-09": {"date": "1999-01-01"}}"#)
            .unwrap();
        let loaded = store.load_records().unwrap();
        let key = DateKey::from_ymd(2024, 6, 9).unwrap();
        assert_eq!(loaded[&key].date, key);
    }
}
