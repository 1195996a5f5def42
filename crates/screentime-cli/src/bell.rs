//! Terminal bell as the alarm sound.

use std::io::Write;

use screentime_core::{AlarmSound, AlarmTone};

/// Rings the terminal bell on stderr. Silent at volume 0 or when stderr is
/// gone.
pub struct TerminalBell;

impl AlarmSound for TerminalBell {
    fn trigger(&self, tone: AlarmTone, volume: u8) {
        if volume == 0 {
            return;
        }
        let bells: &[u8] = match tone {
            AlarmTone::Chime => b"\x07",
            AlarmTone::Beep => b"\x07\x07",
        };
        let mut err = std::io::stderr();
        let _ = err.write_all(bells).and_then(|_| err.flush());
        tracing::debug!(%tone, volume, "alarm triggered");
    }
}
