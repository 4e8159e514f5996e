//! Error taxonomy of the metafield engine

use thiserror::Error;

use crate::enums::MetafieldOwnerType;

/// Errors raised by the registry, the validation engine and the codec.
///
/// Transport failures are not represented here: they belong to whoever talks
/// to the external stores and are passed through untouched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MetafieldError {
    #[error("metafield {namespace}.{key} already exists for {owner_type}")]
    DuplicateKey {
        owner_type: MetafieldOwnerType,
        namespace: String,
        key: String,
    },

    #[error("invalid metafield definition: {0}")]
    InvalidDefinition(String),

    #[error("metafield definition {id} is still used by {value_count} value(s)")]
    DefinitionInUse { id: String, value_count: u64 },

    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    MalformedInput(String),
}

/// Coarse classification used by callers to pick a reaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetafieldErrorKind {
    /// Save-time problem with a definition
    Conflict,
    /// Load-time miss
    NotFound,
    /// Rejected candidate value, recoverable locally
    Validation,
}

impl MetafieldError {
    pub fn kind(&self) -> MetafieldErrorKind {
        match self {
            Self::DuplicateKey { .. } | Self::InvalidDefinition(_) | Self::DefinitionInUse { .. } => {
                MetafieldErrorKind::Conflict
            }
            Self::NotFound(_) => MetafieldErrorKind::NotFound,
            Self::Validation(_) | Self::MalformedInput(_) => MetafieldErrorKind::Validation,
        }
    }

    pub fn is_validation(&self) -> bool {
        self.kind() == MetafieldErrorKind::Validation
    }
}
