#![doc = include_str!(concat!(env!("OUT_DIR"), "/README_GENERATED.md"))]
#![deny(unused_crate_dependencies)]

pub mod atmosphere;
pub mod declaration;
pub mod ports;
pub mod services;
pub mod settings;

// Re-export commonly used types for convenience
pub use atmosphere::{Atmosphere, TrackLibrary, UnknownAtmosphere};
pub use declaration::{
    DeclarationCategory, DeclarationRequest, Gender, GeneratedDeclaration, MaritalStatus,
    PreparedDeclaration, VoiceGender,
};
pub use ports::{
    CoreError, DeclarationGenerator, GenerationError, RepositoryError, SettingsRepository,
};
pub use services::{DeclarationService, SettingsService};
pub use settings::{
    DEFAULT_NOTIFICATION_TIME, Settings, SettingsError, SettingsUpdate, validate_settings,
};
