//! Port definitions (trait abstractions) for external systems.
//!
//! Ports define the interfaces that the core domain expects from infrastructure.
//! They contain no implementation details and use only domain types.
//!
//! # Design Rules
//!
//! - No transport types (HTTP clients, document-store handles) in any signature
//! - Repositories are minimal and CRUD-focused
//! - The generation service is intent-based: "write a declaration", "speak this text"

pub mod generation;
pub mod settings_repository;

use thiserror::Error;

pub use generation::{DeclarationGenerator, GenerationError};
pub use settings_repository::SettingsRepository;

/// Domain-specific errors for repository operations.
///
/// This error type abstracts away storage implementation details and provides
/// a clean interface for services to handle storage failures.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Storage backend error (document store, filesystem, etc.).
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Core error type for semantic domain errors.
///
/// Adapters map this to their own error types (CLI exit codes, UI messages).
#[derive(Debug, Error)]
pub enum CoreError {
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// Settings validation error.
    #[error(transparent)]
    Settings(#[from] crate::settings::SettingsError),

    /// Generation service failed.
    #[error(transparent)]
    Generation(#[from] GenerationError),

    /// Validation error (invalid input).
    #[error("Validation error: {0}")]
    Validation(String),
}
