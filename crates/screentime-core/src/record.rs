//! The per-day record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::calendar::DateKey;
use crate::checklist::Checklist;

/// Everything the engine knows about one calendar day.
///
/// Invariants (restored by [`DailyRecord::normalize`] after decoding):
/// - `running` implies `anchor` and `remaining_seconds` are set
/// - `alarming` implies not `running`
/// - `remaining_seconds == Some(0)` implies not `running`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyRecord {
    pub date: DateKey,
    #[serde(flatten)]
    pub checklist: Checklist,
    /// Unused seconds inherited from the previous day. Fixed at creation.
    #[serde(default)]
    pub carry_in_seconds: u64,
    /// Allowance frozen at the first start of the day.
    #[serde(default)]
    pub locked_allocation_minutes: Option<u32>,
    /// `None` until the countdown has been started once.
    #[serde(default)]
    pub remaining_seconds: Option<u64>,
    #[serde(default, deserialize_with = "lenient_flag")]
    pub running: bool,
    #[serde(default, deserialize_with = "lenient_flag")]
    pub alarming: bool,
    /// Instant at which `remaining_seconds` was last exact. Only set while running.
    #[serde(default)]
    pub anchor: Option<DateTime<Utc>>,
}

/// Accept `true`/`false`, `0`/`1`, `"true"`/`"false"` and `null`.
fn lenient_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => s.trim().eq_ignore_ascii_case("true") || s.trim() == "1",
        _ => false,
    })
}

impl DailyRecord {
    /// A fresh, never-started record.
    pub fn new(date: DateKey, carry_in_seconds: u64) -> Self {
        Self {
            date,
            checklist: Checklist::default(),
            carry_in_seconds,
            locked_allocation_minutes: None,
            remaining_seconds: None,
            running: false,
            alarming: false,
            anchor: None,
        }
    }

    pub fn has_started(&self) -> bool {
        self.remaining_seconds.is_some()
    }

    /// Repair a decoded record so that the struct invariants hold.
    ///
    /// Returns `true` if anything had to change.
    pub fn normalize(&mut self) -> bool {
        let before = self.clone();

        if self.running && (self.anchor.is_none() || self.remaining_seconds.is_none()) {
            self.running = false;
        }
        if self.remaining_seconds == Some(0) {
            self.running = false;
        }
        if self.running {
            self.alarming = false;
        } else {
            self.anchor = None;
        }

        *self != before
    }
}
