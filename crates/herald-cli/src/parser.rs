//! Root CLI structure with global options.

use std::path::PathBuf;

use clap::Parser;

use crate::commands::Commands;

/// Speak declarations over looping atmosphere music.
#[derive(Parser)]
#[command(name = "herald")]
#[command(about = "Play spoken declarations over atmosphere tracks")]
#[command(version)]
pub struct Cli {
    /// Settings file (defaults to the platform config directory)
    #[arg(long = "settings-file", env = "HERALD_SETTINGS_FILE", global = true)]
    pub settings_file: Option<PathBuf>,

    /// Directory holding the bundled `<atmosphere>.mp3` loops
    #[arg(long = "tracks-dir", env = "HERALD_TRACKS_DIR", global = true)]
    pub tracks_dir: Option<PathBuf>,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}
