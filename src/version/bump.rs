//! Bump policies and semantic version increments.

use std::fmt;
use std::str::FromStr;

use semver::{BuildMetadata, Prerelease, Version};

use crate::error::VersionError;

/// Type of semantic version increment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BumpType {
    Prerelease,
    Prepatch,
    Patch,
    Preminor,
    Minor,
    Premajor,
    Major,
}

impl BumpType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BumpType::Prerelease => "prerelease",
            BumpType::Prepatch => "prepatch",
            BumpType::Patch => "patch",
            BumpType::Preminor => "preminor",
            BumpType::Minor => "minor",
            BumpType::Premajor => "premajor",
            BumpType::Major => "major",
        }
    }
}

/// How a manifest's own version advances when its dependencies change.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BumpPolicy {
    /// Increment the caller's current version.
    Increment(BumpType),
    /// Copy the new value of the named dependency from the same batch.
    Mirror(String),
}

impl FromStr for BumpPolicy {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(dep_name) = s.strip_prefix("mirror:") {
            if dep_name.is_empty() {
                return Err(VersionError::UnsupportedPolicy(s.to_string()));
            }
            return Ok(BumpPolicy::Mirror(dep_name.to_string()));
        }

        let bump = match s {
            "major" => BumpType::Major,
            "premajor" => BumpType::Premajor,
            "minor" => BumpType::Minor,
            "preminor" => BumpType::Preminor,
            "patch" => BumpType::Patch,
            "prepatch" => BumpType::Prepatch,
            "prerelease" => BumpType::Prerelease,
            other => return Err(VersionError::UnsupportedPolicy(other.to_string())),
        };
        Ok(BumpPolicy::Increment(bump))
    }
}

impl fmt::Display for BumpPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BumpPolicy::Increment(bump) => f.write_str(bump.as_str()),
            BumpPolicy::Mirror(dep_name) => write!(f, "mirror:{}", dep_name),
        }
    }
}

/// Parse a version, tolerating a leading `v` or `=` as npm does.
pub fn parse_version(input: &str) -> Result<Version, VersionError> {
    let trimmed = input.trim();
    let raw = trimmed
        .strip_prefix('v')
        .or_else(|| trimmed.strip_prefix('='))
        .unwrap_or(trimmed);

    Version::parse(raw).map_err(|e| VersionError::ParseFailed(input.to_string(), e))
}

fn first_prerelease() -> Prerelease {
    Prerelease::new("0").unwrap_or(Prerelease::EMPTY)
}

/// Apply an increment with npm semantics.
///
/// A prerelease of the target release is promoted rather than skipped:
/// `patch` takes `1.2.4-1` to `1.2.4`, `minor` takes `1.3.0-1` to `1.3.0`.
/// Build metadata is always dropped.
pub fn apply_bump_to_version(version: &Version, bump: BumpType) -> Result<Version, VersionError> {
    let mut next = version.clone();
    next.build = BuildMetadata::EMPTY;
    let is_pre = !version.pre.is_empty();

    match bump {
        BumpType::Major => {
            if !(is_pre && version.minor == 0 && version.patch == 0) {
                next.major = increment(version.major, version)?;
            }
            next.minor = 0;
            next.patch = 0;
            next.pre = Prerelease::EMPTY;
        }
        BumpType::Minor => {
            if !(is_pre && version.patch == 0) {
                next.minor = increment(version.minor, version)?;
            }
            next.patch = 0;
            next.pre = Prerelease::EMPTY;
        }
        BumpType::Patch => {
            if !is_pre {
                next.patch = increment(version.patch, version)?;
            }
            next.pre = Prerelease::EMPTY;
        }
        BumpType::Premajor => {
            next = Version::new(increment(version.major, version)?, 0, 0);
            next.pre = first_prerelease();
        }
        BumpType::Preminor => {
            next = Version::new(version.major, increment(version.minor, version)?, 0);
            next.pre = first_prerelease();
        }
        BumpType::Prepatch => {
            next = Version::new(version.major, version.minor, increment(version.patch, version)?);
            next.pre = first_prerelease();
        }
        BumpType::Prerelease => {
            if is_pre {
                next.pre = increment_prerelease(version)?;
            } else {
                next.patch = increment(version.patch, version)?;
                next.pre = first_prerelease();
            }
        }
    }

    Ok(next)
}

fn increment(component: u64, version: &Version) -> Result<u64, VersionError> {
    component
        .checked_add(1)
        .ok_or_else(|| VersionError::Overflow(version.to_string()))
}

/// Increment the last numeric identifier, or append `.0` when there is none.
fn increment_prerelease(version: &Version) -> Result<Prerelease, VersionError> {
    let mut parts: Vec<String> = version.pre.as_str().split('.').map(str::to_string).collect();

    match parts
        .iter()
        .rposition(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit()))
    {
        Some(idx) => {
            let n: u64 = parts[idx]
                .parse()
                .map_err(|_| VersionError::Overflow(version.to_string()))?;
            parts[idx] = increment(n, version)?.to_string();
        }
        None => parts.push("0".to_string()),
    }

    Prerelease::new(&parts.join("."))
        .map_err(|e| VersionError::ParseFailed(version.to_string(), e))
}
