use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "chorale")]
#[command(
    author,
    version,
    about = "Multi-track session transcription and transcript merging"
)]
#[command(
    long_about = "Transcribe per-speaker audio tracks of one session, align them on the \
shared recording end, and merge everything into one time-ordered transcript"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Transcribe and merge all WAV tracks of a session directory
    Merge {
        /// Directory holding the session's channel WAV files
        session_dir: PathBuf,

        /// Artifact path (default: <session_dir>/output.json)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Failure policy override: fail-fast or best-effort
        #[arg(long)]
        policy: Option<String>,
    },

    /// Transcribe a single channel and print its chunk array as JSON
    Transcribe {
        /// Channel WAV file
        file: PathBuf,

        /// Speaker label (default: resolved from the filename)
        #[arg(short, long)]
        speaker: Option<String>,

        /// Whole-second offset into the shared timeline
        #[arg(long, default_value = "0")]
        offset: u64,

        /// Also write <stem>-off<N>.json into this directory
        #[arg(long)]
        save_dir: Option<PathBuf>,
    },

    /// Render a merged transcript artifact
    Show {
        /// Path to a merged artifact (output.json)
        artifact: PathBuf,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },

    /// Whisper model management
    Models {
        #[command(subcommand)]
        action: ModelCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Print config file path
    Path,
    /// Initialize default configuration
    Init,
}

#[derive(Subcommand)]
pub enum ModelCommands {
    /// List available Whisper models
    List,
    /// Download a Whisper model
    Download {
        /// Model name: tiny, base, small, medium, large-v3, large-v3-turbo
        model: String,
    },
    /// Delete a downloaded model
    Delete { model: String },
}
