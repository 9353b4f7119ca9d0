//! Atmospheres command handler.

use std::path::Path;

use herald_core::{Atmosphere, Settings, TrackLibrary};

use crate::presentation::track_state;

/// List the atmospheres with their description and whether the loop is
/// installed under `tracks_dir`.
pub fn execute(settings: &Settings, tracks_dir: &Path) {
    let library = TrackLibrary::from_dir(tracks_dir);

    println!("{:<2}{:<8} {:<10} {:<10} Description", "", "ID", "Label", "Track");
    for atmosphere in Atmosphere::ALL {
        let marker = if atmosphere == settings.default_atmosphere {
            "*"
        } else {
            ""
        };
        println!(
            "{marker:<2}{:<8} {:<10} {:<10} {}",
            atmosphere.id(),
            atmosphere.label(),
            track_state(atmosphere, library.resolve(atmosphere)),
            atmosphere.description()
        );
    }
    println!();
    println!("Tracks directory: {}", tracks_dir.display());
}
