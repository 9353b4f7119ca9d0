//! Categories command handler.

use herald_core::{DeclarationCategory, Settings};

/// Print every declaration category, marking the saved default.
pub fn execute(settings: &Settings) {
    for category in DeclarationCategory::ALL {
        let marker = if category == settings.default_category {
            "*"
        } else {
            " "
        };
        println!("{marker} {}", category.display_name());
    }
}
