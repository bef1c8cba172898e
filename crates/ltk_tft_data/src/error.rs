//! Error types for data fusion.
//!
//! All fallible functions in this crate return [`Result<T>`], which uses [`Error`]
//! as the error type. Unresolvable placeholders and excluded entities are not
//! errors; they are recorded in the [`FusionReport`](crate::FusionReport) instead.

use crate::entity::EntityKind;
use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort a fusion pass.
#[derive(Error, Debug)]
pub enum Error {
    /// A feed does not have the shape fusion needs (e.g. `data` is not an object).
    #[error("Malformed input in {source_name}: {reason}")]
    MalformedInput { source_name: String, reason: String },

    /// A catalog record could not be deserialized.
    #[error("Malformed {kind} record '{id}': {source}")]
    MalformedRecord {
        kind: EntityKind,
        id: String,
        #[source]
        source: serde_json::Error,
    },

    /// A champion declares a trait name that no fused trait carries.
    #[error("Champion '{champion}' declares unknown trait '{trait_name}'")]
    TraitLookup {
        champion: String,
        trait_name: String,
    },

    /// Reading an override rule file failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse JSON (override rules, raw feeds).
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn malformed(source_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedInput {
            source_name: source_name.into(),
            reason: reason.into(),
        }
    }
}
