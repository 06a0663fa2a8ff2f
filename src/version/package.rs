//! Bumping the manifest's own `version` field.

use semver::Version;
use tracing::{debug, warn};

use crate::error::VersionError;
use crate::manifest::edit::quote;
use crate::manifest::{Document, Edit, apply_edits};
use crate::upgrade::Upgrade;

use super::bump::{BumpPolicy, apply_bump_to_version, parse_version};

/// Outcome of a version bump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BumpResult {
    pub bumped_content: String,
}

/// Bump the manifest's version, never failing.
///
/// Any error (unparsable versions, unknown policy, missing `version` field)
/// is logged and the content is returned unchanged.
pub fn bump_package_version(
    content: &str,
    current_version: &str,
    policy: &str,
    batch: &[Upgrade],
) -> BumpResult {
    let bumped_content = match try_bump_package_version(content, current_version, policy, batch) {
        Ok(bumped) => bumped,
        Err(e) => {
            warn!(
                current_version = %current_version,
                policy = %policy,
                error = %e,
                "Failed to bump package version"
            );
            content.to_string()
        }
    };

    BumpResult { bumped_content }
}

/// Bump the manifest's version, reporting why a bump could not be computed.
///
/// Returns the content unchanged when the declared version is already at or
/// beyond the computed one. A mirrored dependency's new value comes from the
/// last matching upgrade in `batch`, falling back to the value it is declared
/// with in the manifest; when neither exists the content is left unchanged.
pub fn try_bump_package_version(
    content: &str,
    current_version: &str,
    policy: &str,
    batch: &[Upgrade],
) -> Result<String, VersionError> {
    let policy: BumpPolicy = policy.parse()?;
    let doc = Document::parse(content).map_err(VersionError::Manifest)?;

    let field = doc
        .root_members("version")
        .next()
        .ok_or(VersionError::MissingVersionField)?;
    let declared = field
        .value
        .as_str()
        .ok_or(VersionError::MissingVersionField)?;

    let new_version = match &policy {
        BumpPolicy::Mirror(dep_name) => {
            let Some(mirrored) = mirrored_value(batch, dep_name)
                .or_else(|| declared_dependency(&doc, dep_name))
            else {
                debug!(dep = %dep_name, "Mirrored dependency not found, leaving version as is");
                return Ok(content.to_string());
            };
            if mirrored == declared {
                debug!(version = %declared, "Version already mirrors dependency");
                return Ok(content.to_string());
            }
            mirrored.to_string()
        }
        BumpPolicy::Increment(bump) => {
            let current = parse_version(current_version)?;
            let candidate = apply_bump_to_version(&current, *bump)?;
            let declared_version: Version = parse_version(declared)?;

            if candidate <= declared_version {
                debug!(
                    declared = %declared_version,
                    candidate = %candidate,
                    "Version was already bumped"
                );
                return Ok(content.to_string());
            }
            candidate.to_string()
        }
    };

    debug!(from = %declared, to = %new_version, "Bumping package version");
    Ok(apply_edits(
        doc.text(),
        vec![Edit::new(field.value.span(), quote(&new_version))],
    ))
}

/// Sections consulted when the mirrored dependency is not in the batch.
const MIRROR_SECTIONS: [&str; 4] = [
    "dependencies",
    "devDependencies",
    "optionalDependencies",
    "peerDependencies",
];

/// New value of the last upgrade in `batch` for `dep_name` that has one.
fn mirrored_value<'a>(batch: &'a [Upgrade], dep_name: &str) -> Option<&'a str> {
    batch
        .iter()
        .rev()
        .filter(|u| u.dep_name == dep_name)
        .find_map(|u| u.kind.new_value())
}

/// Value `dep_name` is declared with in the manifest's own dependency sections.
fn declared_dependency<'d>(doc: &'d Document<'_>, dep_name: &str) -> Option<&'d str> {
    MIRROR_SECTIONS
        .iter()
        .find_map(|section| doc.entries(section, dep_name).first().copied())
        .and_then(|member| member.value.as_str())
}
