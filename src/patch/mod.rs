//! Dependency patching.
//!
//! Replaces one dependency's version token in manifest text by splicing the
//! bytes of its value, so everything else in the file (indentation, key
//! order, trailing newline) comes out exactly as it went in.

pub mod resolutions;
pub mod value;

use tracing::{debug, warn};

use crate::error::PatchError;
use crate::manifest::edit::quote;
use crate::manifest::{Document, Edit, Member, Span, apply_edits};
use crate::upgrade::{OccurrenceTracker, Upgrade, UpgradeKind};

pub use value::ValuePlan;

/// Patch a dependency, returning `None` when the manifest does not match.
///
/// Targets the first occurrence of the entry. `Some(text)` identical to the
/// input means the upgrade was already applied. `None` means the section or
/// key is missing or the current value drifted from the descriptor; callers
/// are expected to fall back to another strategy or skip the upgrade.
pub fn update_dependency(content: &str, upgrade: &Upgrade) -> Option<String> {
    match patch_dependency(content, upgrade, 0) {
        Ok(patched) => Some(patched),
        Err(e) => {
            debug!(
                dep = %upgrade.dep_name,
                dep_type = %upgrade.dep_type,
                error = %e,
                "Dependency patch failed"
            );
            None
        }
    }
}

/// Patch the next occurrence of the entry according to `tracker`.
///
/// The tracker advances whether or not the patch succeeds, so a batch of
/// upgrades for a duplicated key walks the duplicates in source order.
pub fn patch_with_tracker(
    content: &str,
    upgrade: &Upgrade,
    tracker: &mut OccurrenceTracker,
) -> Result<String, PatchError> {
    let occurrence = tracker.advance(&upgrade.dep_type, upgrade.primary_key());
    patch_dependency(content, upgrade, occurrence)
}

/// Patch the `occurrence`-th (0-based) entry for the upgrade and any
/// resolutions/overrides entries pinning the same dependency.
pub fn patch_dependency(
    content: &str,
    upgrade: &Upgrade,
    occurrence: usize,
) -> Result<String, PatchError> {
    let doc = Document::parse(content)?;
    let plan = ValuePlan::for_kind(&upgrade.kind)?;
    let section = upgrade.dep_type.as_str();

    let mut edits: Vec<Edit> = Vec::new();
    let mut handled: Vec<Span> = Vec::new();
    let mut satisfied = false;
    let mut primary_error = None;

    if matches!(upgrade.kind, UpgradeKind::ResolutionOnly { .. }) {
        debug!(dep = %upgrade.dep_name, "Resolution-only upgrade, skipping primary entry");
    } else {
        match locate_primary(&doc, upgrade, occurrence) {
            Ok(member) => {
                let found = member.value.as_str().ok_or_else(|| PatchError::NotAString {
                    section: section.to_string(),
                    key: member.key.clone(),
                })?;
                let rename = upgrade
                    .new_name
                    .as_deref()
                    .filter(|name| *name != member.key);

                if found == plan.replacement && rename.is_none() {
                    debug!(
                        dep = %upgrade.dep_name,
                        value = %found,
                        "Dependency already at desired value"
                    );
                    return Ok(content.to_string());
                }

                if found != plan.replacement {
                    edits.push(plan.splice(section, member)?);
                }
                if let Some(name) = rename {
                    debug!(from = %member.key, to = %name, "Renaming dependency key");
                    edits.push(Edit::new(member.key_span, quote(name)));
                }
                handled.push(member.value.span());
            }
            Err(e) => {
                debug!(dep = %upgrade.dep_name, error = %e, "Primary entry not found");
                primary_error = Some(e);
            }
        }
    }

    let mirrors = resolutions::mirror_entries(&doc, upgrade);

    if mirrors.is_empty() && matches!(upgrade.kind, UpgradeKind::ResolutionOnly { .. }) {
        return Err(if resolutions::has_resolution_section(&doc) {
            PatchError::KeyMissing {
                section: section.to_string(),
                key: upgrade.primary_key().to_string(),
                occurrence: 0,
            }
        } else {
            PatchError::SectionMissing(section.to_string())
        });
    }

    let mut mirror_error = None;
    for (mirror_section, member) in mirrors {
        if handled.contains(&member.value.span()) {
            continue;
        }
        handled.push(member.value.span());

        match member.value.as_str() {
            None => {
                debug!(section = mirror_section, key = %member.key, "Skipping nested override");
                continue;
            }
            Some(found) if found == plan.replacement => {
                satisfied = true;
                continue;
            }
            Some(_) => {}
        }

        match plan.splice(mirror_section, member) {
            Ok(edit) => {
                debug!(section = mirror_section, key = %member.key, "Mirroring upgrade");
                edits.push(edit);
            }
            Err(e) => {
                warn!(
                    section = mirror_section,
                    key = %member.key,
                    error = %e,
                    "Skipping mirrored entry that does not match the upgrade"
                );
                mirror_error.get_or_insert(e);
            }
        }
    }

    if edits.is_empty() {
        if satisfied {
            return Ok(content.to_string());
        }
        let error = primary_error
            .or(mirror_error)
            .unwrap_or_else(|| PatchError::KeyMissing {
                section: section.to_string(),
                key: upgrade.primary_key().to_string(),
                occurrence,
            });
        return Err(error);
    }

    Ok(apply_edits(doc.text(), edits))
}

/// Find the primary entry, falling back to the lookup name for aliases.
fn locate_primary<'d>(
    doc: &'d Document<'_>,
    upgrade: &Upgrade,
    occurrence: usize,
) -> Result<&'d Member, PatchError> {
    let section = upgrade.dep_type.as_str();
    if !doc.has_section(section) {
        return Err(PatchError::SectionMissing(section.to_string()));
    }

    let key = upgrade.primary_key();
    let mut entries = doc.entries(section, key);

    if entries.is_empty()
        && let UpgradeKind::Alias { lookup_name, .. } = &upgrade.kind
    {
        entries = doc.entries(section, lookup_name);
    }

    entries
        .get(occurrence)
        .copied()
        .ok_or_else(|| PatchError::KeyMissing {
            section: section.to_string(),
            key: key.to_string(),
            occurrence,
        })
}
