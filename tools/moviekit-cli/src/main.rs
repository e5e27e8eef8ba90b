//! moviekit CLI: command-line interface over moviekit edit chains.
//!
//! Usage:
//!   moviekit info <PATH>                 Show clip information
//!   moviekit edit <PATH> -o <OUT> ...    Apply edits and render
//!   moviekit concat <PATH>... -o <OUT>   Join clips end to end
//!   moviekit screenshot <PATH> --at <T>  Grab a single frame
//!   moviekit check                       Check for ffmpeg/ffprobe

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use moviekit_common::config::{config_file_path, AppConfig};

mod commands;

#[derive(Parser)]
#[command(
    name = "moviekit",
    about = "Non-destructive, chainable video edits on top of ffmpeg",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file to use instead of the standard location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show clip information
    Info {
        /// Path to the clip
        path: PathBuf,
    },

    /// Apply edits to a clip and render the result
    Edit {
        /// Path to the clip
        path: PathBuf,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Trim to [START, END] seconds before other edits
        #[arg(long, num_args = 2, value_names = ["START", "END"])]
        trim: Option<Vec<f64>>,

        /// Resize to this width (with --height: exact size, else keep aspect ratio)
        #[arg(long)]
        width: Option<u32>,

        /// Resize to this height, keeping the aspect ratio
        #[arg(long)]
        height: Option<u32>,

        /// Video fade in: START DURATION
        #[arg(long, num_args = 2, value_names = ["START", "DURATION"])]
        fade_in: Option<Vec<f64>>,

        /// Video fade out over the last DURATION seconds
        #[arg(long, value_name = "DURATION")]
        fade_out: Option<f64>,

        /// Audio fade in: START DURATION
        #[arg(long, num_args = 2, value_names = ["START", "DURATION"])]
        audio_fade_in: Option<Vec<f64>>,

        /// Audio fade out over the last DURATION seconds
        #[arg(long, value_name = "DURATION")]
        audio_fade_out: Option<f64>,

        /// Print the engine invocation instead of rendering
        #[arg(long)]
        dry_run: bool,
    },

    /// Concatenate clips in order
    Concat {
        /// Clips to join
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Write a single frame to an image file
    Screenshot {
        /// Path to the clip
        path: PathBuf,

        /// Timestamp in seconds
        #[arg(long, default_value = "0.0")]
        at: f64,

        /// Output image path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Check system capabilities
    Check {
        /// Write the effective config to the config path if no file exists there
        #[arg(long)]
        write_config: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // An explicitly named config must parse; the standard one may be absent or stale.
    let (config_path, mut config) = match cli.config {
        Some(path) => {
            let config = AppConfig::try_load_from(&path)?;
            (path, config)
        }
        None => (config_file_path(), AppConfig::load()),
    };
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    moviekit_common::logging::init_logging(&config.logging);
    tracing::debug!(path = %config_path.display(), "Using config");

    match cli.command {
        Commands::Info { path } => commands::info::run(&config, path),
        Commands::Edit {
            path,
            output,
            trim,
            width,
            height,
            fade_in,
            fade_out,
            audio_fade_in,
            audio_fade_out,
            dry_run,
        } => commands::edit::run(
            &config,
            path,
            output,
            commands::edit::EditPlan {
                trim: trim.map(|v| (v[0], v[1])),
                width,
                height,
                fade_in: fade_in.map(|v| (v[0], v[1])),
                fade_out,
                audio_fade_in: audio_fade_in.map(|v| (v[0], v[1])),
                audio_fade_out,
            },
            dry_run,
        ),
        Commands::Concat { paths, output } => commands::concat::run(&config, paths, output),
        Commands::Screenshot { path, at, output } => {
            commands::screenshot::run(&config, path, at, output)
        }
        Commands::Check { write_config } => {
            commands::check::run(&config, &config_path, write_config)
        }
    }
}
