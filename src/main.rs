mod client;
mod commands;
mod render;
mod source;

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use sartrack_core::config::Config;
use sartrack_core::ingest::parse_date;
use tracing_subscriber::EnvFilter;

use crate::commands::Session;
use crate::source::CaseSource;

#[derive(Parser)]
#[command(name = "sartrack")]
#[command(about = "Keep track of Subject Access Request deadlines")]
struct Cli {
    /// Read cases from this JSON file instead of the configured source
    #[arg(short, long, global = true)]
    file: Option<PathBuf>,

    /// Fetch cases from this backend URL instead of the configured source
    #[arg(long, global = true)]
    api: Option<String>,

    /// Pretend today is this date (YYYY-MM-DD)
    #[arg(long, global = true, value_parser = parse_today)]
    today: Option<NaiveDate>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show a month calendar of deadlines
    Calendar {
        /// Month to show (YYYY-MM), defaults to the current month
        #[arg(value_parser = parse_month)]
        month: Option<(i32, u32)>,

        /// Also show case submissions and reminders
        #[arg(short, long)]
        all: bool,

        /// Add a reminder the day before each open deadline (with --all)
        #[arg(long)]
        auto_reminders: bool,
    },
    /// List deadlines, submissions and reminders in a date range
    Events {
        /// Show events from this date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        from: Option<String>,

        /// Show events until this date (YYYY-MM-DD), defaults to 30 days after --from
        #[arg(long)]
        to: Option<String>,

        /// Add a reminder the day before each open deadline
        #[arg(long)]
        auto_reminders: bool,
    },
    /// Deadlines that are not yet due, soonest first
    Upcoming {
        /// Maximum number of deadlines to show
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Deadlines that have passed
    Overdue,
    /// Open cases due within a window, plus every overdue one
    Deadlines {
        /// Window in days
        #[arg(short, long)]
        days: Option<i64>,
    },
    /// Case counts and the most urgent deadlines
    Dashboard,
    /// Write a commented default config file
    InitConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load().context("Failed to load config")?;

    init_logging(&config.log_filter);

    if let Commands::InitConfig = cli.command {
        return commands::init_config::run();
    }

    let today = match cli.today {
        Some(date) => date,
        None => config.today()?,
    };
    let source = CaseSource::resolve(cli.file, cli.api, &config)?;
    let session = Session { source, config, today };

    match cli.command {
        Commands::Calendar { month, all, auto_reminders } => {
            commands::calendar::run(&session, month, all, auto_reminders).await
        }
        Commands::Events { from, to, auto_reminders } => {
            commands::events::run(&session, from, to, auto_reminders).await
        }
        Commands::Upcoming { limit } => commands::upcoming::run(&session, limit).await,
        Commands::Overdue => commands::overdue::run(&session).await,
        Commands::Deadlines { days } => commands::deadlines::run(&session, days).await,
        Commands::Dashboard => commands::dashboard::run(&session).await,
        Commands::InitConfig => Ok(()),
    }
}

/// Log to stderr; RUST_LOG wins over the configured filter.
fn init_logging(default_filter: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn parse_today(s: &str) -> Result<NaiveDate, String> {
    parse_date(s).map_err(|e| e.to_string())
}

/// Parse YYYY-MM. Range checking is left to the grid builder.
fn parse_month(s: &str) -> Result<(i32, u32), String> {
    let invalid = || format!("Invalid month '{}'. Expected YYYY-MM", s);

    let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
    let year = year.parse::<i32>().map_err(|_| invalid())?;
    let month = month.parse::<u32>().map_err(|_| invalid())?;

    Ok((year, month))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_month() {
        assert_eq!(parse_month("2025-06"), Ok((2025, 6)));
        assert_eq!(parse_month("2025-13"), Ok((2025, 13)));
        assert!(parse_month("June").is_err());
        assert!(parse_month("2025-xx").is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "sartrack",
            "calendar",
            "2025-06",
            "--file",
            "cases.json",
            "--today",
            "2025-06-10",
        ])
        .unwrap();

        assert_eq!(cli.file, Some(PathBuf::from("cases.json")));
        assert_eq!(cli.today, NaiveDate::from_ymd_opt(2025, 6, 10));
        assert!(matches!(cli.command, Commands::Calendar { month: Some((2025, 6)), .. }));
    }
}
