//! Terminal formatting helpers.

use std::path::Path;

use herald_core::Atmosphere;

/// `installed`, `missing`, or `-` for the silent atmosphere.
pub fn track_state(atmosphere: Atmosphere, asset: Option<&Path>) -> &'static str {
    if !atmosphere.has_music() {
        return "-";
    }
    match asset {
        Some(path) if path.is_file() => "installed",
        _ => "missing",
    }
}

/// Format milliseconds as `m:ss`.
pub fn format_clock(ms: u64) -> String {
    let secs = ms / 1000;
    format!("{}:{:02}", secs / 60, secs % 60)
}
