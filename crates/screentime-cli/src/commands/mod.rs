pub mod day;
pub mod settings;
pub mod watch;

use chrono::Utc;
use screentime_core::{CivilCalendar, Database, Event, KvRecordStore, Session};

use crate::bell::TerminalBell;

pub type CliSession = Session<KvRecordStore<Database>, TerminalBell>;

/// Open the on-disk store and bring today's record up to date.
///
/// Events produced while catching up (an expiry that happened while nothing
/// was running, a new day) are printed before the command's own output.
pub fn open_session(calendar: CivilCalendar) -> Result<CliSession, Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let now = Utc::now();
    let mut session = Session::open(KvRecordStore::new(db), calendar, TerminalBell, now);
    for event in session.catch_up(now) {
        print_event(&event)?;
    }
    Ok(session)
}

pub fn print_event(event: &Event) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(event)?);
    Ok(())
}
