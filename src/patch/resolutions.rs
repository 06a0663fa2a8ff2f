//! Resolutions/overrides mirroring.
//!
//! Yarn `resolutions` and npm `overrides` pin versions of transitive
//! dependencies. When an upgraded dependency is pinned there too, the pin has
//! to move with it or the package manager keeps installing the old version.

use crate::manifest::{Document, Member};
use crate::upgrade::Upgrade;

/// Top-level sections searched for mirrored entries.
pub const RESOLUTION_SECTIONS: [&str; 2] = ["resolutions", "overrides"];

/// Keys a mirrored entry may be declared under, in lookup order.
///
/// Every matching key is patched, so an exact key and its `**/` glob both
/// move when both are present.
pub fn mirror_keys(upgrade: &Upgrade) -> Vec<String> {
    let mut keys = Vec::with_capacity(3);

    let candidates = [
        upgrade.resolution_key.clone(),
        Some(upgrade.dep_name.clone()),
        Some(format!("**/{}", upgrade.dep_name)),
    ];

    for key in candidates.into_iter().flatten() {
        if !keys.contains(&key) {
            keys.push(key);
        }
    }

    keys
}

/// First entry for each mirror key in each resolutions-like section.
pub fn mirror_entries<'d>(
    doc: &'d Document<'_>,
    upgrade: &Upgrade,
) -> Vec<(&'static str, &'d Member)> {
    let keys = mirror_keys(upgrade);
    let mut entries = Vec::new();

    for section in RESOLUTION_SECTIONS {
        for key in &keys {
            if let Some(member) = doc.entries(section, key).first() {
                entries.push((section, *member));
            }
        }
    }

    entries
}

/// Whether any resolutions-like section exists.
pub fn has_resolution_section(doc: &Document<'_>) -> bool {
    RESOLUTION_SECTIONS.iter().any(|s| doc.has_section(s))
}
