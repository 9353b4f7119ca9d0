#![doc = include_str!(concat!(env!("OUT_DIR"), "/README_GENERATED.md"))]
#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

// Used by the binary only
use dotenvy as _;
use tracing_subscriber as _;

pub mod commands;
pub mod error;
pub mod handlers;
pub mod parser;
pub mod presentation;
pub mod settings_store;

pub use commands::{Commands, PlayArgs, SettingsCommand};
pub use error::CliError;
pub use parser::Cli;
pub use settings_store::JsonFileSettingsRepository;
