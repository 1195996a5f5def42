//! Parent-controlled settings.
//!
//! Stores:
//! - Carry-over toggle
//! - Parent PIN guarding edits
//! - Alarm tone and volume
//! - Weekday/weekend allowance minutes (full completion and fallback)
//!
//! Settings are persisted as one flat JSON object under the `settings` key of
//! the record store. Every read goes through [`Settings::from_json_str`],
//! which never fails: missing or malformed fields fall back to their default
//! and out-of-range numbers are clamped.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

pub const MIN_ALLOWANCE_MINUTES: u32 = 1;
pub const MAX_ALLOWANCE_MINUTES: u32 = 180;
pub const MAX_ALARM_VOLUME: u8 = 100;

/// Sound played while the alarm repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlarmTone {
    #[default]
    #[serde(alias = "tone-a")]
    Chime,
    #[serde(alias = "tone-b")]
    Beep,
}

impl fmt::Display for AlarmTone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlarmTone::Chime => f.write_str("chime"),
            AlarmTone::Beep => f.write_str("beep"),
        }
    }
}

impl FromStr for AlarmTone {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chime" | "tone-a" => Ok(AlarmTone::Chime),
            "beep" | "tone-b" => Ok(AlarmTone::Beep),
            other => Err(format!("unknown alarm tone: {other}")),
        }
    }
}

/// Application settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub carry_over_enabled: bool,
    pub parent_pin: String,
    pub alarm_tone: AlarmTone,
    pub alarm_volume: u8,
    pub weekday_full_minutes: u32,
    pub weekday_fallback_minutes: u32,
    pub weekend_full_minutes: u32,
    pub weekend_fallback_minutes: u32,
}

// Default functions
fn default_pin() -> String {
    "0000".into()
}
fn default_volume() -> u8 {
    70
}
fn default_weekday_full() -> u32 {
    60
}
fn default_weekday_fallback() -> u32 {
    30
}
fn default_weekend_full() -> u32 {
    120
}
fn default_weekend_fallback() -> u32 {
    60
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            carry_over_enabled: false,
            parent_pin: default_pin(),
            alarm_tone: AlarmTone::default(),
            alarm_volume: default_volume(),
            weekday_full_minutes: default_weekday_full(),
            weekday_fallback_minutes: default_weekday_fallback(),
            weekend_full_minutes: default_weekend_full(),
            weekend_fallback_minutes: default_weekend_fallback(),
        }
    }
}

pub(crate) fn is_valid_pin(pin: &str) -> bool {
    pin.len() == 4 && pin.chars().all(|c| c.is_ascii_digit())
}

fn lenient_bool(value: Option<&Value>) -> Option<bool> {
    match value? {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_i64().map(|n| n != 0),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn lenient_int(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.round() as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn minutes_or(value: Option<&Value>, default: u32) -> u32 {
    lenient_int(value)
        .map(|n| n.clamp(MIN_ALLOWANCE_MINUTES as i64, MAX_ALLOWANCE_MINUTES as i64) as u32)
        .unwrap_or(default)
}

impl Settings {
    const KEYS: [&'static str; 8] = [
        "carry_over_enabled",
        "parent_pin",
        "alarm_tone",
        "alarm_volume",
        "weekday_full_minutes",
        "weekday_fallback_minutes",
        "weekend_full_minutes",
        "weekend_fallback_minutes",
    ];

    /// Decode a persisted settings payload. Never fails.
    pub fn from_json_str(raw: &str) -> Self {
        match serde_json::from_str::<Value>(raw) {
            Ok(value) => Self::from_value(&value),
            Err(e) => {
                tracing::warn!(error = %e, "settings payload unparsable, using defaults");
                Self::default()
            }
        }
    }

    /// Decode settings field by field, substituting defaults and clamping.
    pub fn from_value(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            tracing::warn!("settings payload is not an object, using defaults");
            return Self::default();
        };
        Self::from_map(obj)
    }

    fn from_map(obj: &Map<String, Value>) -> Self {
        let parent_pin = match obj.get("parent_pin") {
            Some(Value::String(s)) if is_valid_pin(s) => s.clone(),
            Some(Value::Number(n)) if is_valid_pin(&n.to_string()) => n.to_string(),
            _ => default_pin(),
        };
        let alarm_tone = obj
            .get("alarm_tone")
            .and_then(Value::as_str)
            .and_then(|s| s.parse().ok())
            .unwrap_or_default();
        let alarm_volume = lenient_int(obj.get("alarm_volume"))
            .map(|n| n.clamp(0, MAX_ALARM_VOLUME as i64) as u8)
            .unwrap_or_else(default_volume);

        Self {
            carry_over_enabled: lenient_bool(obj.get("carry_over_enabled")).unwrap_or(false),
            parent_pin,
            alarm_tone,
            alarm_volume,
            weekday_full_minutes: minutes_or(
                obj.get("weekday_full_minutes"),
                default_weekday_full(),
            ),
            weekday_fallback_minutes: minutes_or(
                obj.get("weekday_fallback_minutes"),
                default_weekday_fallback(),
            ),
            weekend_full_minutes: minutes_or(
                obj.get("weekend_full_minutes"),
                default_weekend_full(),
            ),
            weekend_fallback_minutes: minutes_or(
                obj.get("weekend_fallback_minutes"),
                default_weekend_fallback(),
            ),
        }
    }

    /// Re-apply the loader rules to an in-memory value.
    pub fn normalized(&self) -> Self {
        serde_json::to_value(self)
            .map(|v| Self::from_value(&v))
            .unwrap_or_default()
    }

    /// Plain string compare against the parent PIN.
    pub fn verify_pin(&self, candidate: &str) -> bool {
        self.parent_pin == candidate.trim()
    }

    /// Minutes for one allowance bucket.
    pub fn allowance_minutes(&self, is_weekend: bool, full: bool) -> u32 {
        match (is_weekend, full) {
            (false, true) => self.weekday_full_minutes,
            (false, false) => self.weekday_fallback_minutes,
            (true, true) => self.weekend_full_minutes,
            (true, false) => self.weekend_fallback_minutes,
        }
    }

    pub fn keys() -> &'static [&'static str] {
        &Self::KEYS
    }

    /// Get a settings value as string by key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        match json.get(key)? {
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a settings value by key.
    ///
    /// Unlike the loader this rejects input that does not parse for the
    /// field, so a typo at the prompt is reported instead of silently reset.
    /// Numbers in range are clamped like on load.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        if !Self::KEYS.contains(&key) {
            return Err(ConfigError::UnknownKey(key.to_string()));
        }
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let new_value = match key {
            "carry_over_enabled" => Value::Bool(
                value
                    .trim()
                    .parse::<bool>()
                    .map_err(|e| invalid(e.to_string()))?,
            ),
            "parent_pin" => {
                if !is_valid_pin(value.trim()) {
                    return Err(invalid("PIN must be exactly 4 digits".into()));
                }
                Value::String(value.trim().to_string())
            }
            "alarm_tone" => {
                let tone: AlarmTone = value.parse().map_err(invalid)?;
                Value::String(tone.to_string())
            }
            _ => {
                let n = value
                    .trim()
                    .parse::<i64>()
                    .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?;
                Value::Number(n.into())
            }
        };

        let mut json = serde_json::to_value(&*self).map_err(|e| invalid(e.to_string()))?;
        if let Some(obj) = json.as_object_mut() {
            obj.insert(key.to_string(), new_value);
        }
        *self = Self::from_value(&json);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn default_roundtrip() {
        let cfg = Settings::default();
        let raw = serde_json::to_string(&cfg).unwrap();
        assert_eq!(Settings::from_json_str(&raw), cfg);
    }

    #[test]
    fn garbage_payload_yields_defaults() {
        assert_eq!(Settings::from_json_str("{not json"), Settings::default());
        assert_eq!(Settings::from_json_str("[1,2,3]"), Settings::default());
        assert_eq!(Settings::from_json_str("{}"), Settings::default());
    }

    #[test]
    fn out_of_range_minutes_are_clamped() {
        let cfg = Settings::from_value(&json!({
            "weekday_full_minutes": 500,
            "weekday_fallback_minutes": 0,
            "weekend_full_minutes": -20,
            "weekend_fallback_minutes": "45",
            "alarm_volume": 250,
        }));
        assert_eq!(cfg.weekday_full_minutes, 180);
        assert_eq!(cfg.weekday_fallback_minutes, 1);
        assert_eq!(cfg.weekend_full_minutes, 1);
        assert_eq!(cfg.weekend_fallback_minutes, 45);
        assert_eq!(cfg.alarm_volume, 100);
    }

    #[test]
    fn malformed_fields_fall_back_individually() {
        let cfg = Settings::from_value(&json!({
            "carry_over_enabled": true,
            "parent_pin": "12a4",
            "alarm_tone": "siren",
            "weekday_full_minutes": "lots",
            "weekend_full_minutes": 90,
        }));
        assert!(cfg.carry_over_enabled);
        assert_eq!(cfg.parent_pin, "0000");
        assert_eq!(cfg.alarm_tone, AlarmTone::Chime);
        assert_eq!(cfg.weekday_full_minutes, 60);
        assert_eq!(cfg.weekend_full_minutes, 90);
    }

    #[test]
    fn tone_accepts_legacy_names() {
        let cfg = Settings::from_value(&json!({ "alarm_tone": "tone-b" }));
        assert_eq!(cfg.alarm_tone, AlarmTone::Beep);
    }

    #[test]
    fn set_updates_and_clamps() {
        let mut cfg = Settings::default();
        cfg.set("weekend_full_minutes", "240").unwrap();
        assert_eq!(cfg.weekend_full_minutes, 180);
        cfg.set("carry_over_enabled", "true").unwrap();
        assert!(cfg.carry_over_enabled);
        cfg.set("alarm_tone", "beep").unwrap();
        assert_eq!(cfg.get("alarm_tone").as_deref(), Some("beep"));
    }

    #[test]
    fn set_rejects_unknown_key_and_bad_values() {
        let mut cfg = Settings::default();
        assert!(matches!(cfg.set("theme", "dark"), Err(ConfigError::UnknownKey(_))));
        assert!(cfg.set("parent_pin", "12345").is_err());
        assert!(cfg.set("alarm_volume", "loud").is_err());
        assert!(cfg.set("carry_over_enabled", "yes please").is_err());
        assert_eq!(cfg, Settings::default());
    }

    #[test]
    fn bucket_lookup() {
        let cfg = Settings::default();
        assert_eq!(cfg.allowance_minutes(false, true), 60);
        assert_eq!(cfg.allowance_minutes(false, false), 30);
        assert_eq!(cfg.allowance_minutes(true, true), 120);
        assert_eq!(cfg.allowance_minutes(true, false), 60);
    }

    #[test]
    fn pin_compare() {
        let cfg = Settings::default();
        assert!(cfg.verify_pin("0000"));
        assert!(!cfg.verify_pin("1234"));
    }
}
