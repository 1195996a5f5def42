//! Calendar dates and the civil calendar used to resolve "today".
//!
//! Every date decision in the engine (weekend bucket, rollover comparison,
//! carry-over lookup) goes through a single [`CivilCalendar`] so that the
//! date a record belongs to and the date used for its allowance can never
//! disagree.

use chrono::{DateTime, Datelike, FixedOffset, Local, NaiveDate, Offset, Utc, Weekday};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

const KEY_FORMAT: &str = "%Y-%m-%d";

/// Canonical calendar-date identifier (`YYYY-MM-DD`).
///
/// The string form sorts lexicographically in calendar order, so it doubles
/// as the storage key for daily records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateKey(NaiveDate);

impl DateKey {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// The calendar day before this one.
    pub fn previous(&self) -> Option<Self> {
        self.0.pred_opt().map(Self)
    }

    pub fn weekday(&self) -> Weekday {
        self.0.weekday()
    }

    /// Saturday and Sunday use the weekend allowance bucket.
    pub fn is_weekend(&self) -> bool {
        matches!(self.weekday(), Weekday::Sat | Weekday::Sun)
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(KEY_FORMAT))
    }
}

impl FromStr for DateKey {
    type Err = String;

    /// Only the canonical zero-padded form is accepted, so two spellings of
    /// one day can never become two storage keys.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        let key = NaiveDate::parse_from_str(raw, KEY_FORMAT)
            .map(Self)
            .map_err(|e| format!("invalid date key {raw:?}: {e}"))?;
        if key.to_string() != raw {
            return Err(format!("non-canonical date key {raw:?}, expected {key}"));
        }
        Ok(key)
    }
}

impl Serialize for DateKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DateKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// The one calendar that decides which civil date an instant falls on.
///
/// Holds a fixed UTC offset chosen once per session. It is deliberately not
/// part of [`Settings`](crate::Settings): changing preferences must never move
/// the day boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CivilCalendar {
    offset: FixedOffset,
}

impl CivilCalendar {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    pub fn utc() -> Self {
        Self::new(Utc.fix())
    }

    /// Freeze the host's local offset as observed at `now`.
    ///
    /// A DST change during the session does not move the day boundary; the
    /// next session picks up the new offset.
    pub fn local_at(now: DateTime<Utc>) -> Self {
        Self::new(now.with_timezone(&Local).offset().fix())
    }

    /// Parse an offset such as `+09:00`, `-0500` or `Z`.
    pub fn parse_offset(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case("z") || raw.eq_ignore_ascii_case("utc") {
            return Some(Self::utc());
        }
        raw.parse::<FixedOffset>().ok().map(Self::new)
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Date key for the civil day containing `now`.
    pub fn date_key(&self, now: DateTime<Utc>) -> DateKey {
        DateKey(now.with_timezone(&self.offset).date_naive())
    }
}

impl Default for CivilCalendar {
    fn default() -> Self {
        Self::utc()
    }
}
