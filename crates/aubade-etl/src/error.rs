//! Error types for lookups and enrichment.

use thiserror::Error;

/// Errors that can occur while talking to external sources.
#[derive(Debug, Error)]
pub enum EnrichError {
    /// An external source answered with a non-success status.
    #[error("HTTP error from {source_name}: {message}")]
    Http {
        source_name: String,
        message: String,
    },

    /// The external source returned a rate-limit response.
    #[error("rate limited by {source_name}")]
    RateLimited { source_name: String },

    /// The requested entity was not found at the external source.
    #[error("not found: {entity} at {source_name}")]
    NotFound { entity: String, source_name: String },

    /// A response from an external source could not be parsed.
    #[error("parse error from {source_name}: {message}")]
    Parse {
        source_name: String,
        message: String,
    },

    /// Transport failure propagated from `reqwest`.
    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),

    /// An error propagated from the core domain layer.
    #[error("record error: {0}")]
    Core(#[from] aubade_core::Error),

    /// A credential-gated source was used without credentials.
    #[error("no credentials configured for {source_name}")]
    MissingCredentials { source_name: String },
}

impl EnrichError {
    /// Returns `true` when the operation may succeed if retried.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Http { .. } | Self::RateLimited { .. } | Self::Request(_)
        )
    }

    /// Returns `true` when the error indicates the entity was not found.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Convenience alias for enrichment results.
pub type EnrichResult<T> = std::result::Result<T, EnrichError>;
