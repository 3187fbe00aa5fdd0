use anyhow::Result;
use aubade_core::content::Platform;
use aubade_etl::Config;
use clap::Parser;
use std::path::PathBuf;

mod commands;

#[derive(Debug, Parser)]
#[command(name = "aubade", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Data directory (default: ./data, or $DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Debug, clap::Subcommand)]
enum Commands {
    /// Pick the album of the day
    ///
    /// Returns the album already recorded for DATE if there is one.
    /// Otherwise draws an album not yet in the history, avoiding the
    /// previous day's artist, year and single curated list where possible.
    /// When every album has been used, the history is archived as
    /// history.<N>.csv and the draw starts over.
    ///
    /// The selection is appended to history.csv and written to
    /// album-of-the-day/<DATE>.json, keeping any enrichment already there.
    /// The selection is printed as JSON.
    Pick {
        /// Date to pick for, as YYYY-MM-DD
        date: String,
    },
    /// Look up metadata and listening links for an album record
    ///
    /// Fills in genres, description, cover art, MusicBrainz and Spotify IDs,
    /// Wikidata/Wikipedia/Discogs/RateYourMusic links, and streaming links.
    /// Lookups that fail leave their fields untouched. Spotify is skipped
    /// unless SPOTIFY_CLIENT_ID and SPOTIFY_CLIENT_SECRET are set.
    Enrich {
        /// Path to an album-of-the-day/<DATE>.json record
        record: PathBuf,
    },
    /// Print a share caption for an album record
    Caption {
        /// Path to an album-of-the-day/<DATE>.json record
        record: PathBuf,

        /// Target platform: bluesky, reddit or generic
        #[arg(long, default_value_t = Platform::Generic)]
        platform: Platform,

        /// Maximum caption length in characters (default: platform limit)
        #[arg(long)]
        max_chars: Option<usize>,

        /// Album page URL for the "Listen now" line
        #[arg(long)]
        url: Option<String>,

        /// Date shown in the caption (default: taken from the file name)
        #[arg(long)]
        date: Option<String>,
    },
    /// Show catalog and history status
    Status {
        /// Count records dated after today as published
        #[arg(long)]
        include_future: bool,
    },
    /// Inspect or create the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, clap::Subcommand)]
enum ConfigAction {
    /// Show the effective configuration
    Show,
    /// Print the config file path
    Path,
    /// Print an example config file
    Example,
    /// Create the config file if it does not exist
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Commands::Config { action } = &cli.command {
        return match action {
            ConfigAction::Show => commands::config::show_config(cli.data_dir),
            ConfigAction::Path => commands::config::show_path(),
            ConfigAction::Example => commands::config::show_example(),
            ConfigAction::Init => commands::config::init_config(),
        };
    }

    let config = Config::load_with_data_dir(cli.data_dir)?;

    match cli.command {
        Commands::Pick { date } => {
            commands::run_pick(&config, &date)?;
        }
        Commands::Enrich { record } => {
            commands::run_enrich(&config, &record).await?;
        }
        Commands::Caption {
            record,
            platform,
            max_chars,
            url,
            date,
        } => {
            commands::print_caption(
                &record,
                platform,
                max_chars,
                url.as_deref(),
                date.as_deref(),
            )?;
        }
        Commands::Status { include_future } => {
            commands::show_status(&config, include_future)?;
        }
        Commands::Config { .. } => {}
    }

    Ok(())
}
