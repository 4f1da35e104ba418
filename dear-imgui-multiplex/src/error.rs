//! Error types for the multi-context integration layer
//!
//! Only construction-time and resource operations return errors. Per-frame
//! paths degrade to no-ops instead (a missing proxy renders nothing, a
//! non-owning surface drops input), so most of the runtime API never sees
//! these types.

use thiserror::Error;

#[cfg(feature = "tracing")]
use tracing::{error, warn};

/// Result type for multiplex operations
pub type MultiplexResult<T> = Result<T, MultiplexError>;

/// Errors that can occur while setting up contexts and their resources
#[derive(Error, Debug)]
pub enum MultiplexError {
    /// The GUI library failed to create a context
    #[error("Failed to create GUI context '{name}': {reason}")]
    ContextCreation { name: String, reason: String },

    /// The shared font atlas could not be built
    #[error("Font atlas build failed: {reason}")]
    FontAtlas { reason: String },

    /// Texture creation or lookup failed
    #[error("Texture operation failed: {operation}")]
    Texture { operation: String },

    /// Invalid settings were supplied
    #[error("Configuration error: {setting}")]
    Configuration { setting: String },

    /// Error reported by the GUI library or a host collaborator
    #[error("Backend error")]
    Backend(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl MultiplexError {
    /// Create a context creation error
    pub fn context_creation(name: impl Into<String>, reason: impl Into<String>) -> Self {
        let name = name.into();
        let reason = reason.into();
        #[cfg(feature = "tracing")]
        error!("Context '{}' creation failed: {}", name, reason);
        Self::ContextCreation { name, reason }
    }

    /// Create a font atlas error
    pub fn font_atlas(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        #[cfg(feature = "tracing")]
        error!("Font atlas build failed: {}", reason);
        Self::FontAtlas { reason }
    }

    /// Create a texture operation error
    pub fn texture(operation: impl Into<String>) -> Self {
        let operation = operation.into();
        #[cfg(feature = "tracing")]
        error!("Texture operation failed: {}", operation);
        Self::Texture { operation }
    }

    /// Create a configuration error
    pub fn configuration(setting: impl Into<String>) -> Self {
        let setting = setting.into();
        #[cfg(feature = "tracing")]
        warn!("Configuration error: {}", setting);
        Self::Configuration { setting }
    }
}

/// Trait for converting collaborator errors to [`MultiplexError`]
pub trait IntoMultiplexError {
    fn into_multiplex_error(self) -> MultiplexError;
}

impl<E> IntoMultiplexError for E
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn into_multiplex_error(self) -> MultiplexError {
        MultiplexError::Backend(Box::new(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_error_creation() {
        let err = MultiplexError::context_creation("Game", "out of memory");
        let text = err.to_string();
        assert!(text.contains("Game"));
        assert!(text.contains("out of memory"));
    }

    #[test]
    fn test_error_chain() {
        let source_err = std::io::Error::new(std::io::ErrorKind::NotFound, "texture missing");
        let err = source_err.into_multiplex_error();
        assert!(err.source().is_some());
    }
}
