mod cmd;
mod output;
mod store;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use stride_core::types::Track;

#[derive(Parser)]
#[command(
    name = "stride",
    about = "Workshop step progression — inspect, record, and gate learning progress",
    version,
    propagate_version = true
)]
struct Cli {
    /// Progress file (default: ./progress.json)
    #[arg(long, global = true, env = "STRIDE_FILE", default_value = "progress.json")]
    file: PathBuf,

    /// Workshop track
    #[arg(long, global = true, env = "STRIDE_TRACK", default_value = "ast")]
    track: Track,

    /// Curriculum overlay file (YAML, merged over the built-in catalog)
    #[arg(long, global = true, env = "STRIDE_CATALOG")]
    catalog: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the track's steps with completion and lock status
    Steps,

    /// Show the current progression state
    Show,

    /// Record a video watch-percentage tick
    Video {
        /// Step id (e.g. "1-1")
        step: String,

        /// Watched percentage (0-100)
        percent: f64,
    },

    /// Attempt to complete a step
    Complete {
        /// Step id (e.g. "2-2")
        step: String,

        /// Watched percentage evidence
        #[arg(long)]
        watched: Option<f64>,

        /// Questions answered so far
        #[arg(long)]
        answered: Option<u32>,

        /// Questions the step asks in total
        #[arg(long)]
        required: Option<u32>,

        /// Words selected (flashcard-style steps)
        #[arg(long)]
        words: Option<u32>,

        /// All sliders have been set
        #[arg(long)]
        sliders: bool,

        /// Activity data has been submitted
        #[arg(long)]
        submitted: bool,
    },

    /// Store an assessment result payload for a step
    Assess {
        /// Step id (e.g. "2-2")
        step: String,

        /// Result payload as a JSON document
        #[arg(long)]
        result: String,
    },

    /// Reset progression back to the first step
    Reset,

    /// Push the local progress file to a remote progress store
    Sync {
        /// Remote base URL
        #[arg(long, env = "STRIDE_BASE_URL")]
        base_url: String,

        /// User id the record belongs to
        #[arg(long, env = "STRIDE_USER")]
        user: String,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .init();

    let store = store::Store::new(cli.file, cli.track, cli.catalog.as_deref());

    let result = match cli.command {
        Commands::Steps => cmd::steps::run(&store, cli.json),
        Commands::Show => cmd::show::run(&store, cli.json),
        Commands::Video { step, percent } => cmd::video::run(&store, &step, percent, cli.json),
        Commands::Complete {
            step,
            watched,
            answered,
            required,
            words,
            sliders,
            submitted,
        } => cmd::complete::run(
            &store,
            &step,
            cmd::complete::EvidenceArgs {
                watched,
                answered,
                required,
                words,
                sliders,
                submitted,
            },
            cli.json,
        ),
        Commands::Assess { step, result } => cmd::assess::run(&store, &step, &result, cli.json),
        Commands::Reset => cmd::reset::run(&store, cli.json),
        Commands::Sync { base_url, user } => cmd::sync::run(&store, &base_url, &user, cli.json),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
