use clap::Subcommand;
use screentime_core::{CivilCalendar, Settings};

use super::open_session;

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Get a settings value
    Get {
        /// Settings key (e.g. "weekday_full_minutes", "alarm_tone")
        key: String,
    },
    /// Set a settings value
    Set {
        /// Settings key
        key: String,
        /// New value
        value: String,
        /// Parent PIN
        #[arg(long)]
        pin: String,
    },
    /// List all settings values
    List,
    /// Reset settings to defaults
    Reset {
        /// Parent PIN
        #[arg(long)]
        pin: String,
    },
}

fn masked(settings: &Settings) -> Settings {
    Settings {
        parent_pin: "****".into(),
        ..settings.clone()
    }
}

pub fn run(
    calendar: CivilCalendar,
    action: SettingsAction,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = open_session(calendar)?;

    match action {
        SettingsAction::Get { key } => {
            if key == "parent_pin" {
                return Err("parent_pin cannot be read back".into());
            }
            match session.settings().get(&key) {
                Some(value) => println!("{value}"),
                None => {
                    let known = Settings::keys().join(", ");
                    return Err(format!("unknown key: {key} (known keys: {known})").into());
                }
            }
        }
        SettingsAction::Set { key, value, pin } => {
            session.update_settings(&pin, &key, &value)?;
            println!("ok");
        }
        SettingsAction::List => {
            let json = serde_json::to_string_pretty(&masked(session.settings()))?;
            println!("{json}");
        }
        SettingsAction::Reset { pin } => {
            session.reset_settings(&pin)?;
            println!("settings reset to defaults");
        }
    }
    Ok(())
}
