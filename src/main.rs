use std::path::PathBuf;
use std::process::ExitCode;

use chrono::{Datelike, NaiveDate};
use clap::{Parser, Subcommand};

use flowcast::config::{Config, ConfigError, PASSPHRASE_ENV};
use flowcast::logging::{self, LoggingError};
use flowcast::{
    parse_date, parse_entry, EncryptedFileStore, EntryError, Insights, NotificationKind,
    NotificationSetting, Session, SessionError,
};

#[derive(Parser)]
#[command(
    name = "flowcast",
    version,
    about = "Privacy-first, on-device cycle tracker"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Data directory override
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Passphrase protecting the data file
    #[arg(long, global = true, env = PASSPHRASE_ENV, hide_env_values = true)]
    passphrase: Option<String>,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Create an empty encrypted data file
    Init,
    /// Save the entry for one day, replacing any existing one
    Log {
        /// YYYY-MM-DD
        #[arg(long)]
        date: String,
        /// none, light, medium or heavy
        #[arg(long, default_value = "none")]
        flow: String,
        /// Repeat for several symptoms
        #[arg(long = "symptom", short = 's')]
        symptoms: Vec<String>,
        #[arg(long, default_value = "neutral")]
        mood: String,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Delete the entry for one day
    Delete {
        #[arg(long)]
        date: String,
    },
    /// Print the entry for one day
    Show {
        #[arg(long)]
        date: String,
    },
    /// Print a month of entries and predicted days
    Month {
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        month: Option<u32>,
    },
    /// Print the next period, fertile window and confidence
    Predict,
    /// Print cycle statistics
    Stats,
    /// Print reminders due today
    Notify {
        /// Evaluate as if today were this date (YYYY-MM-DD)
        #[arg(long)]
        today: Option<String>,
    },
    /// Configure a reminder
    Remind {
        /// period, fertile or ovulation
        #[arg(long)]
        kind: String,
        #[arg(long)]
        lead_days: u32,
        #[arg(long)]
        disable: bool,
    },
    /// Print all data as JSON
    Export,
    /// Delete all data permanently
    Wipe {
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Logging(#[from] LoggingError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Entry(#[from] EntryError),
    #[error("a passphrase is required, pass --passphrase or set {}", PASSPHRASE_ENV)]
    MissingPassphrase,
    #[error("refusing to wipe without --yes")]
    WipeNotConfirmed,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("event=command_failed module=cli err={}", e);
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(mut cli: Cli) -> Result<(), CliError> {
    let mut config = Config::from_env()?;
    if let Some(dir) = cli.data_dir.take() {
        config.data_dir = dir;
    }
    let level = if cli.verbose { "debug" } else { config.log_level.as_str() };
    let _logger = logging::init_logging(level, config.log_dir.as_deref())?;

    let passphrase = cli.passphrase.take().ok_or(CliError::MissingPassphrase)?;
    let store = EncryptedFileStore::new(config.data_file(), passphrase);

    if matches!(cli.command, Command::Init) {
        Session::create(store)?;
        println!("Created {}", config.data_file().display());
        return Ok(());
    }

    let mut session = Session::open(store)?;
    match cli.command {
        Command::Init => return Err(SessionError::AlreadyInitialized.into()),
        Command::Log {
            date,
            flow,
            symptoms,
            mood,
            notes,
        } => {
            let entry = parse_entry(&date, &flow, &symptoms, &mood, notes)?;
            session.log_day(entry)?;
            println!("Saved {date}");
        }
        Command::Delete { date } => {
            let date = parse_date(&date)?;
            if session.delete_day(date)? {
                println!("Deleted {date}");
            } else {
                println!("No entry for {date}");
            }
        }
        Command::Show { date } => {
            let date = parse_date(&date)?;
            match session.entry(date) {
                Some(entry) => {
                    let symptoms: Vec<&str> = entry.symptoms.iter().map(|s| s.as_str()).collect();
                    println!("{date}  flow={} mood={}", entry.flow, entry.mood);
                    if !symptoms.is_empty() {
                        println!("  symptoms: {}", symptoms.join(", "));
                    }
                    if let Some(notes) = &entry.notes {
                        println!("  notes: {notes}");
                    }
                }
                None => println!("No entry for {date}"),
            }
        }
        Command::Month { year, month } => {
            let today = today();
            let month = session.month(
                year.unwrap_or_else(|| today.year()),
                month.unwrap_or_else(|| today.month()),
            )?;
            println!("{}-{:02}", month.year, month.month);
            for day in &month.days {
                let mut tags = Vec::new();
                if let Some(flow) = day.flow {
                    tags.push(format!("flow={flow}"));
                }
                if day.predicted_period {
                    tags.push("predicted period".to_string());
                }
                if day.ovulation {
                    tags.push("ovulation".to_string());
                } else if day.fertile {
                    tags.push("fertile".to_string());
                }
                if !tags.is_empty() {
                    println!("  {}  {}", day.date, tags.join(", "));
                }
            }
        }
        Command::Predict => print_prediction(&session.insights()),
        Command::Stats => {
            let stats = session.stats();
            println!("periods logged:        {}", stats.total_periods);
            println!("average cycle length:  {} days", stats.average_cycle_length);
            println!("average period length: {} days", stats.average_period_length);
            if let (Some(shortest), Some(longest)) = (stats.shortest_cycle, stats.longest_cycle) {
                println!("cycle range:           {shortest}-{longest} days");
            }
            let symptoms: Vec<&str> = stats.top_symptoms.iter().map(|s| s.as_str()).collect();
            if !symptoms.is_empty() {
                println!("common symptoms:       {}", symptoms.join(", "));
            }
            if let Some(mood) = stats.dominant_mood {
                println!("common mood:           {mood}");
            }
        }
        Command::Notify { today: when } => {
            let when = match when {
                Some(s) => parse_date(&s)?,
                None => today(),
            };
            let due = session.due_notifications(when);
            if due.is_empty() {
                println!("No reminders due");
            }
            for trigger in due {
                println!("[{}] {}", trigger.kind.as_str(), trigger.message);
            }
        }
        Command::Remind {
            kind,
            lead_days,
            disable,
        } => {
            let kind: NotificationKind = kind.parse()?;
            session.update_notification(NotificationSetting {
                kind,
                lead_days,
                enabled: !disable,
            })?;
            let state = if disable { "disabled" } else { "enabled" };
            println!("{kind} reminder {state}, {lead_days} day(s) ahead");
        }
        Command::Export => println!("{}", session.export_json()?),
        Command::Wipe { yes } => {
            if !yes {
                return Err(CliError::WipeNotConfirmed);
            }
            session.wipe()?;
            println!("All data deleted");
        }
    }
    Ok(())
}

fn print_prediction(insights: &Insights) {
    match &insights.prediction {
        Some(p) => {
            println!("next period:    {}", p.next_period_start);
            println!("ovulation:      {}", p.ovulation_day);
            println!(
                "fertile window: {} to {}",
                p.fertile_window_start, p.fertile_window_end
            );
            println!("confidence:     {}%", p.confidence);
        }
        None => println!(
            "Not enough history yet: log at least two periods ({} so far)",
            insights.periods.len()
        ),
    }
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}
