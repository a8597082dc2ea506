mod commands;
mod render;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use printcal_core::Tz;
use printcal_core::config::UserConfig;
use printcal_core::dates::{self, DateRange};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "printcal")]
#[command(about = "Read your .ics calendars and lay them out day by day")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show every occurrence in a date range, grouped by day
    Agenda {
        /// First day to show (YYYY-MM-DD). Defaults to the start of this month
        #[arg(long)]
        from: Option<String>,

        /// Last day to show (YYYY-MM-DD). Defaults to the end of this month
        #[arg(long)]
        to: Option<String>,

        /// Calendar directory (defaults to calendar_dir from config)
        #[arg(long)]
        dir: Option<PathBuf>,
    },
    /// List calendars with their event counts
    Calendars {
        #[arg(long)]
        dir: Option<PathBuf>,
    },
    /// Turn a Google Contacts CSV export into a birthdays calendar
    ImportContacts {
        /// Path to the exported CSV file
        csv: PathBuf,

        /// Name of the calendar to write
        #[arg(short, long)]
        name: String,

        #[arg(long)]
        dir: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = UserConfig::load()?;

    match cli.command {
        Commands::Agenda { from, to, dir } => {
            let zone = Tz::LOCAL;
            let range = DateRange::from_args(from.as_deref(), to.as_deref(), dates::today(&zone))
                .map_err(|e| anyhow::anyhow!(e))?;
            commands::agenda::run(&config, &resolve_dir(&config, dir), range, &zone)
        }
        Commands::Calendars { dir } => commands::calendars::run(&config, &resolve_dir(&config, dir)),
        Commands::ImportContacts { csv, name, dir } => {
            commands::import_contacts::run(&csv, &name, &resolve_dir(&config, dir))
        }
    }
}

fn resolve_dir(config: &UserConfig, dir: Option<PathBuf>) -> PathBuf {
    dir.unwrap_or_else(|| config.data_path())
}
