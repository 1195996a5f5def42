mod alarm;
mod engine;

pub use alarm::{AlarmController, AlarmSound, SilentAlarm};
pub use engine::CountdownEngine;

use std::time::Duration;

/// How often the host should call `tick`.
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// How often the host should check whether the civil date changed.
pub const ROLLOVER_CHECK_INTERVAL: Duration = Duration::from_secs(30);

/// Repeat period of the alarm sound while alarming.
pub const ALARM_REPEAT_INTERVAL: Duration = Duration::from_millis(800);
