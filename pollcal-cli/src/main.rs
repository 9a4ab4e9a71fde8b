mod commands;
mod render;

use anyhow::Result;
use clap::{Parser, Subcommand};
use pollcal_core::PollKind;
use pollcal_core::config::PollCalConfig;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pollcal")]
#[command(about = "Plan events whose time and place can be put to a vote")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show a month grid with event markers
    Month {
        /// Month to show (YYYY-MM), defaults to the current month
        #[arg(short, long)]
        month: Option<String>,
    },
    /// Show the timeline of one day
    Day {
        /// Day to show (YYYY-MM-DD)
        date: String,
    },
    /// Create an event
    New {
        /// Day of the event (YYYY-MM-DD)
        #[arg(short, long)]
        date: String,

        #[arg(short, long)]
        title: Option<String>,

        /// Fixed start time (HH:MM)
        #[arg(long, conflicts_with = "slots")]
        start: Option<String>,

        /// Fixed end time (HH:MM)
        #[arg(long, requires = "start")]
        end: Option<String>,

        /// Candidate time range for a poll (HH:MM-HH:MM), repeatable
        #[arg(long = "slot", value_name = "RANGE")]
        slots: Vec<String>,

        /// Fixed location
        #[arg(short, long, conflicts_with = "places")]
        location: Option<String>,

        /// Candidate location for a poll, repeatable
        #[arg(long = "place", value_name = "PLACE")]
        places: Vec<String>,

        #[arg(long)]
        description: Option<String>,

        /// Accent color (#rrggbb)
        #[arg(short, long)]
        color: Option<String>,
    },
    /// Show one event with its poll results
    Show { id: u64 },
    /// Vote for a poll option
    Vote {
        id: u64,
        /// Which poll: time or location
        kind: PollKind,
        option: u64,
    },
    /// Delete one event
    Delete { id: u64 },
    /// Delete every event
    Clear {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = PollCalConfig::load()?;
    tracing::debug!("Using event store at {}", config.store_path().display());

    match cli.command {
        Commands::Month { month } => commands::month::run(&config, month.as_deref()),
        Commands::Day { date } => commands::day::run(&config, &date),
        Commands::New {
            date,
            title,
            start,
            end,
            slots,
            location,
            places,
            description,
            color,
        } => commands::new::run(
            &config,
            commands::new::NewArgs {
                date,
                title,
                start,
                end,
                slots,
                location,
                places,
                description,
                color,
            },
        ),
        Commands::Show { id } => commands::show::run(&config, id),
        Commands::Vote { id, kind, option } => commands::vote::run(&config, id, kind, option),
        Commands::Delete { id } => commands::delete::run(&config, id),
        Commands::Clear { yes } => commands::clear::run(&config, yes),
    }
}
