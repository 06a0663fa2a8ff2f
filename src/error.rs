//! Error types for pkgpatch modules using thiserror.

use thiserror::Error;

/// Errors from locating and splicing a dependency value.
///
/// Variants fall into two families: structural mismatches (the section or key
/// the descriptor points at is not in the manifest) and value mismatches (the
/// slot exists but does not hold what the descriptor says it should).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatchError {
    #[error("Manifest is not valid JSON at byte {offset}: {reason}")]
    InvalidManifest { offset: usize, reason: String },

    #[error("Section '{0}' not found in manifest")]
    SectionMissing(String),

    #[error("No occurrence #{occurrence} of '{key}' in section '{section}'")]
    KeyMissing {
        section: String,
        key: String,
        occurrence: usize,
    },

    #[error("Value of '{key}' in section '{section}' is not a string")]
    NotAString { section: String, key: String },

    #[error("Value of '{key}' in section '{section}' is '{found}', expected '{expected}'")]
    ValueMismatch {
        section: String,
        key: String,
        expected: String,
        found: String,
    },

    #[error("Raw value '{raw}' does not end with '#{segment}'")]
    InconsistentDescriptor { raw: String, segment: String },
}

impl PatchError {
    /// Whether the error means the targeted section or key is absent.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            PatchError::InvalidManifest { .. }
                | PatchError::SectionMissing(_)
                | PatchError::KeyMissing { .. }
                | PatchError::NotAString { .. }
        )
    }

    /// Whether the error means the manifest drifted from the descriptor.
    pub fn is_value_mismatch(&self) -> bool {
        matches!(
            self,
            PatchError::ValueMismatch { .. } | PatchError::InconsistentDescriptor { .. }
        )
    }
}

/// Errors from version bump computation.
#[derive(Error, Debug)]
pub enum VersionError {
    #[error("Failed to parse version '{0}': {1}")]
    ParseFailed(String, #[source] semver::Error),

    #[error("Version '{0}' cannot be incremented any further")]
    Overflow(String),

    #[error("Unsupported bump policy '{0}'")]
    UnsupportedPolicy(String),

    #[error("Manifest has no string \"version\" field")]
    MissingVersionField,

    #[error("Failed to read manifest: {0}")]
    Manifest(#[source] PatchError),
}

/// Errors from converting a loose upgrade descriptor into a typed one.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DescriptorError {
    #[error("Descriptor for '{dep_name}' is missing required field '{field}'")]
    MissingField {
        dep_name: String,
        field: &'static str,
    },

    #[error("Digest '{0}' is not a 7 to 40 character lowercase hex string")]
    InvalidDigest(String),
}
