//! pkgpatch - Format-preserving patcher for package.json manifests.
//!
//! # Overview
//!
//! pkgpatch rewrites a single dependency's version token inside raw manifest
//! text, mirrors the change into `resolutions`/`overrides` pins, and bumps the
//! manifest's own `version` field. Every other byte of the file is left as
//! it was, so the resulting diff contains only the intended change.

pub mod error;
pub mod manifest;
pub mod patch;
pub mod upgrade;
pub mod version;

// Re-export commonly used types
pub use error::{DescriptorError, PatchError, VersionError};
pub use patch::{patch_dependency, patch_with_tracker, update_dependency};
pub use upgrade::{DepType, OccurrenceTracker, RawUpgrade, Upgrade, UpgradeKind};
pub use version::{BumpPolicy, BumpResult, BumpType, bump_package_version};
