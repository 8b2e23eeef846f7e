//! Error types for manifest handling.

use thiserror::Error;

/// Errors that can occur when reading or writing alias manifests.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// The manifest is not valid TOML or does not match the alias schema.
    #[error("invalid manifest: {0}")]
    Parse(#[from] toml::de::Error),

    /// The alias could not be rendered as TOML.
    #[error("failed to render manifest: {0}")]
    Render(#[from] toml::ser::Error),

    /// A required identity field is empty.
    #[error("manifest field `{0}` must not be empty")]
    EmptyField(&'static str),
}
