//! Application services: orchestration over the ports.
//!
//! Services hold `Arc<dyn Port>` handles and contain no infrastructure code.

mod declaration_service;
mod settings_service;

pub use declaration_service::DeclarationService;
pub use settings_service::SettingsService;
