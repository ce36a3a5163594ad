use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use estimate_board::board::{parse_minutes_per_point, Board};
use estimate_board::codec;
use estimate_board::config::AppConfig;
use estimate_board::storage::{read_board, write_board, write_board_to};

#[derive(Parser)]
#[command(name = "estimate")]
#[command(about = "Story point estimation board with work-duration conversion")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./estimate.toml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Format a minute count as a work duration (e.g. 2950 -> 1w1d1h10m)
    Format {
        /// Total minutes
        minutes: u64,
    },

    /// Parse a work duration (e.g. "1w2d3h10m") into minutes
    Parse {
        /// Duration text; unrecognised parts are ignored
        text: String,
    },

    /// Show point and time totals for a board file
    Summary {
        /// Board JSON file
        #[arg(long)]
        board: PathBuf,

        /// Whole minutes per story point, e.g. 30 (overrides the board file and config)
        #[arg(long)]
        minutes_per_point: Option<String>,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Recompute story minutes for a new minutes-per-point value
    Rescale {
        /// Board JSON file
        #[arg(long)]
        board: PathBuf,

        /// Whole minutes per story point, e.g. 30; fractions are rejected
        #[arg(long)]
        minutes_per_point: String,

        /// Write the result here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("Failed to load config from {:?}", cli.config))?;

    // Initialize tracing
    let log_level = cli.log_level.as_deref().unwrap_or(&config.log_level);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    let registry = tracing_subscriber::registry().with(filter);
    if cli.json_logs {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    tracing::debug!("Starting estimate v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Format { minutes } => {
            println!("{}", display_minutes(minutes));
        }

        Commands::Parse { text } => {
            let duration = codec::string_to_duration(&text);
            let minutes = codec::duration_to_minutes(&duration);
            println!("Minutes:   {}", minutes);
            println!("Duration:  {}", display_minutes(minutes));
            if !duration.is_canonical() {
                tracing::info!("Input {:?} was normalized", text);
            }
        }

        Commands::Summary {
            board: board_path,
            minutes_per_point,
            json,
        } => {
            let mut board = read_board(&board_path)
                .with_context(|| format!("Failed to read board {:?}", board_path))?;

            let factor = match minutes_per_point {
                Some(raw) => Some(parse_minutes_per_point(&raw)?),
                None => board
                    .minutes_per_point()
                    .or(config.estimation.minutes_per_point),
            };
            if let Some(factor) = factor {
                board.set_minutes_per_point(factor)?;
            }

            if board.is_empty() {
                tracing::warn!("Board {:?} has no groups", board_path);
            }
            warn_off_palette(&board, &config.estimation.point_palette);

            let summary = board.summary();
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
                return Ok(());
            }

            println!("\n=== Board Summary ===");
            for group in &summary.groups {
                match group.minutes {
                    Some(minutes) => println!(
                        "{:<24} {:>3} stories {:>5} pts  {} ({} overridden)",
                        group.title,
                        group.stories,
                        group.points,
                        display_minutes(minutes),
                        group.overridden
                    ),
                    None => println!(
                        "{:<24} {:>3} stories {:>5} pts",
                        group.title, group.stories, group.points
                    ),
                }
            }
            println!("\nStory points:     {}", summary.total_points);
            match summary.total_minutes {
                Some(minutes) => println!("Total time:       {}", display_minutes(minutes)),
                None => println!("Total time:       (set --minutes-per-point to estimate)"),
            }
        }

        Commands::Rescale {
            board: board_path,
            minutes_per_point,
            output,
        } => {
            let factor = parse_minutes_per_point(&minutes_per_point)?;
            let mut board = read_board(&board_path)
                .with_context(|| format!("Failed to read board {:?}", board_path))?;
            board.set_minutes_per_point(factor)?;

            match output {
                Some(path) => write_board(&board, &path)
                    .with_context(|| format!("Failed to write board {:?}", path))?,
                None => write_board_to(&board, std::io::stdout().lock())?,
            }
        }
    }

    Ok(())
}

fn display_minutes(minutes: u64) -> String {
    let duration = codec::minutes_to_duration(minutes);
    if duration.is_zero() {
        "0".to_string()
    } else {
        duration.to_string()
    }
}

fn warn_off_palette(board: &Board, palette: &[u32]) {
    for group in board.groups() {
        for story in group.stories() {
            if !story.in_palette(palette) {
                tracing::warn!(
                    "Story {:?} in {:?} has {} points, not in palette {:?}",
                    story.name,
                    group.title,
                    story.points,
                    palette
                );
            }
        }
    }
}
