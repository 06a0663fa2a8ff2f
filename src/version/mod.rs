//! Version management and semver bumping.

pub mod bump;
pub mod package;

pub use bump::{BumpPolicy, BumpType, apply_bump_to_version, parse_version};
pub use package::{BumpResult, bump_package_version, try_bump_package_version};
