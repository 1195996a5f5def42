use clap::{Parser, Subcommand};
use screentime_core::{ChecklistItem, CivilCalendar};
use tracing_subscriber::EnvFilter;

mod bell;
mod commands;

#[derive(Parser)]
#[command(name = "screentime", version, about = "Daily screen-time allowance")]
struct Cli {
    /// Fixed UTC offset that decides the civil day (e.g. "+09:00").
    /// Defaults to the local offset at startup.
    #[arg(long, global = true, env = "SCREENTIME_UTC_OFFSET", allow_hyphen_values = true)]
    utc_offset: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print today's record as JSON
    Status,
    /// Toggle a checklist item (preparation, homework, bedtime, departure)
    Check {
        item: ChecklistItem,
    },
    /// Start or resume the countdown
    Start {
        /// Start even though the checklist is incomplete
        #[arg(long)]
        yes: bool,
    },
    /// Pause the countdown
    Pause,
    /// End today's countdown now and dismiss the alarm
    Finish,
    /// Rebuild today's record from scratch
    ResetToday,
    /// Parent settings
    Settings {
        #[command(subcommand)]
        action: commands::settings::SettingsAction,
    },
    /// Keep running: tick, check for a new day, and ring the alarm
    Watch {
        /// Print a snapshot after every tick
        #[arg(long)]
        snapshots: bool,
    },
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_env("SCREENTIME_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn resolve_calendar(raw: Option<&str>) -> Result<CivilCalendar, Box<dyn std::error::Error>> {
    match raw {
        Some(raw) => CivilCalendar::parse_offset(raw)
            .ok_or_else(|| format!("invalid UTC offset: {raw}").into()),
        None => Ok(CivilCalendar::local_at(chrono::Utc::now())),
    }
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = resolve_calendar(cli.utc_offset.as_deref()).and_then(|calendar| {
        match cli.command {
            Commands::Status => commands::day::status(calendar),
            Commands::Check { item } => commands::day::check(calendar, item),
            Commands::Start { yes } => commands::day::start(calendar, yes),
            Commands::Pause => commands::day::pause(calendar),
            Commands::Finish => commands::day::finish(calendar),
            Commands::ResetToday => commands::day::reset_today(calendar),
            Commands::Settings { action } => commands::settings::run(calendar, action),
            Commands::Watch { snapshots } => commands::watch::run(calendar, snapshots),
        }
    });

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
