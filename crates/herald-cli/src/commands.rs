//! Commands enum and subcommand arguments.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};
use herald_core::{Atmosphere, DeclarationCategory, Gender, MaritalStatus, VoiceGender};

#[derive(Subcommand)]
pub enum Commands {
    /// Play a speech file over an atmosphere track
    Play(PlayArgs),

    /// List the available atmospheres
    Atmospheres,

    /// List the declaration categories
    Categories,

    /// View or change persisted settings
    Settings {
        #[command(subcommand)]
        command: SettingsCommand,
    },
}

#[derive(Args)]
pub struct PlayArgs {
    /// Synthesized speech to play (WAV)
    pub file: PathBuf,

    /// Atmosphere to play under the voice (defaults to the saved setting)
    #[arg(short, long)]
    pub atmosphere: Option<Atmosphere>,

    /// Do not draw the progress bar
    #[arg(long)]
    pub no_progress: bool,
}

#[derive(Subcommand)]
pub enum SettingsCommand {
    /// Show all current settings
    Show,
    /// Update settings
    Set(SettingsSetArgs),
    /// Reset settings to defaults, keeping the onboarding state
    Reset,
}

#[derive(Args, Default)]
pub struct SettingsSetArgs {
    /// Enable or disable the daily reminder
    #[arg(long)]
    pub notifications: Option<bool>,

    /// Daily reminder time, HH:MM (24h)
    #[arg(long)]
    pub notification_time: Option<String>,

    /// Atmosphere used when none is given
    #[arg(long)]
    pub atmosphere: Option<Atmosphere>,

    /// Category used when none is given (e.g. "health", "Peace & Rest")
    #[arg(long, value_parser = parse_category)]
    pub category: Option<DeclarationCategory>,

    /// Synthesized voice
    #[arg(long)]
    pub voice: Option<VoiceArg>,

    #[arg(long, conflicts_with = "clear_gender")]
    pub gender: Option<GenderArg>,

    /// Forget the saved gender
    #[arg(long)]
    pub clear_gender: bool,

    #[arg(long, conflicts_with = "clear_marital_status")]
    pub marital_status: Option<MaritalStatusArg>,

    /// Forget the saved marital status
    #[arg(long)]
    pub clear_marital_status: bool,

    #[arg(long)]
    pub onboarding_complete: Option<bool>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum VoiceArg {
    Male,
    Female,
}

impl From<VoiceArg> for VoiceGender {
    fn from(arg: VoiceArg) -> Self {
        match arg {
            VoiceArg::Male => Self::Male,
            VoiceArg::Female => Self::Female,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum GenderArg {
    Male,
    Female,
}

impl From<GenderArg> for Gender {
    fn from(arg: GenderArg) -> Self {
        match arg {
            GenderArg::Male => Self::Male,
            GenderArg::Female => Self::Female,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum MaritalStatusArg {
    Single,
    Married,
}

impl From<MaritalStatusArg> for MaritalStatus {
    fn from(arg: MaritalStatusArg) -> Self {
        match arg {
            MaritalStatusArg::Single => Self::Single,
            MaritalStatusArg::Married => Self::Married,
        }
    }
}

/// Accept a category by display name or by its first word, case-insensitively.
pub fn parse_category(value: &str) -> Result<DeclarationCategory, String> {
    let needle = value.trim().to_lowercase();
    DeclarationCategory::ALL
        .into_iter()
        .find(|c| {
            let name = c.display_name().to_lowercase();
            name == needle || name.split_whitespace().next() == Some(needle.as_str())
        })
        .ok_or_else(|| format!("unknown category '{value}'"))
}
