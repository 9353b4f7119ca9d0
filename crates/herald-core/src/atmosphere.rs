//! Atmosphere selection: the looping music bed under a spoken declaration.
//!
//! Every bundled atmosphere maps to a locally packaged audio asset. The
//! `None` sentinel means "voice only": no music handle is ever created.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A named looping background track, or `None` for voice-only sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Atmosphere {
    /// Triumphant orchestral swells with choir pads.
    #[default]
    Glory,
    /// Epic drums and cinematic percussion.
    Warfare,
    /// Gentle piano and ambient strings.
    Peace,
    /// Building motivational crescendo.
    Rise,
    /// Meditative ambient stillness.
    Selah,
    /// Declaration without background music.
    None,
}

impl Atmosphere {
    /// All atmospheres in cycling order.
    pub const ALL: [Self; 6] = [
        Self::Glory,
        Self::Warfare,
        Self::Peace,
        Self::Rise,
        Self::Selah,
        Self::None,
    ];

    /// Stable lowercase identifier (also the asset file stem).
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Glory => "glory",
            Self::Warfare => "warfare",
            Self::Peace => "peace",
            Self::Rise => "rise",
            Self::Selah => "selah",
            Self::None => "none",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Glory => "Glory",
            Self::Warfare => "Warfare",
            Self::Peace => "Peace",
            Self::Rise => "Rise",
            Self::Selah => "Selah",
            Self::None => "Voice Only",
        }
    }

    /// One-line description of the track.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Glory => "Triumphant orchestral swells with choir pads",
            Self::Warfare => "Epic drums and cinematic percussion",
            Self::Peace => "Gentle piano and ambient strings",
            Self::Rise => "Building motivational crescendo",
            Self::Selah => "Meditative ambient stillness",
            Self::None => "Declaration without background music",
        }
    }

    /// Whether this atmosphere plays a music bed at all.
    #[must_use]
    pub const fn has_music(self) -> bool {
        !matches!(self, Self::None)
    }

    /// The next atmosphere in cycling order, wrapping `None` back to `Glory`.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Glory => Self::Warfare,
            Self::Warfare => Self::Peace,
            Self::Peace => Self::Rise,
            Self::Rise => Self::Selah,
            Self::Selah => Self::None,
            Self::None => Self::Glory,
        }
    }
}

impl fmt::Display for Atmosphere {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Error returned when parsing an unknown atmosphere identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown atmosphere '{0}' (expected one of: glory, warfare, peace, rise, selah, none)")]
pub struct UnknownAtmosphere(pub String);

impl FromStr for Atmosphere {
    type Err = UnknownAtmosphere;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|a| a.id() == needle)
            .ok_or_else(|| UnknownAtmosphere(s.to_string()))
    }
}

/// Resolves bundled atmospheres to local audio assets.
///
/// Assets are resolved by the caller layer, never fetched at play time.
#[derive(Debug, Clone, Default)]
pub struct TrackLibrary {
    assets: HashMap<Atmosphere, PathBuf>,
}

impl TrackLibrary {
    /// File extension of the bundled loops.
    pub const TRACK_EXTENSION: &'static str = "mp3";

    /// Library with every bundled atmosphere mapped to `<dir>/<id>.mp3`.
    pub fn from_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        let assets = Atmosphere::ALL
            .into_iter()
            .filter(|a| a.has_music())
            .map(|a| {
                let file = format!("{}.{}", a.id(), Self::TRACK_EXTENSION);
                (a, dir.join(file))
            })
            .collect();
        Self { assets }
    }

    /// Register (or replace) the asset for one atmosphere.
    ///
    /// Registering `Atmosphere::None` is ignored.
    #[must_use]
    pub fn with_asset(mut self, atmosphere: Atmosphere, path: impl Into<PathBuf>) -> Self {
        if atmosphere.has_music() {
            self.assets.insert(atmosphere, path.into());
        }
        self
    }

    /// Path of the looping asset for `atmosphere`, if one is registered.
    #[must_use]
    pub fn resolve(&self, atmosphere: Atmosphere) -> Option<&Path> {
        self.assets.get(&atmosphere).map(PathBuf::as_path)
    }
}
