use chrono::Utc;
use screentime_core::{ChecklistItem, CivilCalendar};

use super::{open_session, print_event};

pub fn status(calendar: CivilCalendar) -> Result<(), Box<dyn std::error::Error>> {
    let session = open_session(calendar)?;
    print_event(&session.snapshot(Utc::now()))
}

pub fn check(
    calendar: CivilCalendar,
    item: ChecklistItem,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = open_session(calendar)?;
    let now = Utc::now();
    match session.toggle_check(item, now) {
        Some(event) => print_event(&event),
        None => {
            eprintln!("checklist is locked while the countdown is running");
            print_event(&session.snapshot(now))
        }
    }
}

pub fn start(calendar: CivilCalendar, confirmed: bool) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = open_session(calendar)?;
    let now = Utc::now();

    // Only the first start of the day picks the allowance; resuming after a
    // pause keeps the locked one and needs no confirmation.
    let first_start = session.record().locked_allocation_minutes.is_none();
    if first_start && session.can_start() && session.requires_confirmation() && !confirmed {
        return Err(
            "checklist is incomplete; re-run with --yes to start with the fallback allowance"
                .into(),
        );
    }

    match session.start(now) {
        Some(event) => print_event(&event),
        None => {
            eprintln!("cannot start: already running or no time left today");
            print_event(&session.snapshot(now))
        }
    }
}

pub fn pause(calendar: CivilCalendar) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = open_session(calendar)?;
    let now = Utc::now();
    match session.pause(now) {
        Some(event) => print_event(&event),
        None => {
            eprintln!("countdown is not running");
            print_event(&session.snapshot(now))
        }
    }
}

pub fn finish(calendar: CivilCalendar) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = open_session(calendar)?;
    print_event(&session.finish(Utc::now()))
}

pub fn reset_today(calendar: CivilCalendar) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = open_session(calendar)?;
    print_event(&session.reset_today(Utc::now()))
}
