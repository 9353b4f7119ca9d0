//! Settings command handler.

use anyhow::Result;
use herald_core::{Settings, SettingsService, SettingsUpdate};

use crate::commands::{SettingsCommand, SettingsSetArgs};
use crate::error::CliError;
use crate::settings_store::JsonFileSettingsRepository;

pub async fn execute(
    service: &SettingsService,
    repo: &JsonFileSettingsRepository,
    command: SettingsCommand,
) -> Result<()> {
    match command {
        SettingsCommand::Show => {
            let settings = service.get().await.map_err(CliError::from)?;
            print_settings(&settings)?;
            println!("\nStored at: {}", repo.path().display());
        }
        SettingsCommand::Set(args) => {
            let update = build_update(args);
            if is_empty(&update) {
                return Err(CliError::Arguments(
                    "nothing to change; pass at least one option (see --help)".into(),
                )
                .into());
            }
            let settings = service.update(update).await.map_err(CliError::from)?;
            println!("Settings updated.");
            print_settings(&settings)?;
        }
        SettingsCommand::Reset => {
            let settings = service.reset().await.map_err(CliError::from)?;
            println!("Settings reset to defaults.");
            print_settings(&settings)?;
        }
    }
    Ok(())
}

fn print_settings(settings: &Settings) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(settings)?);
    Ok(())
}

/// Turn CLI flags into a partial update. `--clear-*` flags map to `Some(None)`.
pub fn build_update(args: SettingsSetArgs) -> SettingsUpdate {
    let gender = if args.clear_gender {
        Some(None)
    } else {
        args.gender.map(|g| Some(g.into()))
    };
    let marital_status = if args.clear_marital_status {
        Some(None)
    } else {
        args.marital_status.map(|m| Some(m.into()))
    };

    SettingsUpdate {
        notifications_enabled: args.notifications,
        notification_time: args.notification_time,
        default_atmosphere: args.atmosphere,
        default_category: args.category,
        gender,
        marital_status,
        voice_gender: args.voice.map(Into::into),
        onboarding_complete: args.onboarding_complete,
    }
}

fn is_empty(update: &SettingsUpdate) -> bool {
    update.notifications_enabled.is_none()
        && update.notification_time.is_none()
        && update.default_atmosphere.is_none()
        && update.default_category.is_none()
        && update.gender.is_none()
        && update.marital_status.is_none()
        && update.voice_gender.is_none()
        && update.onboarding_complete.is_none()
}
