//! Upgrade descriptors.
//!
//! An [`Upgrade`] names one dependency slot in a manifest and carries the
//! value expected there now plus its replacement. The value shape is an
//! explicit [`UpgradeKind`] chosen by the caller.

pub mod occurrence;
pub mod raw;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use occurrence::OccurrenceTracker;
pub use raw::{ManagerData, RawUpgrade};

/// A manifest section that holds dependency entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DepType {
    Dependencies,
    DevDependencies,
    OptionalDependencies,
    PeerDependencies,
    Resolutions,
    Overrides,
    Engines,
    /// Any other top-level key.
    Other(String),
}

impl DepType {
    /// The section key as it appears in package.json.
    pub fn as_str(&self) -> &str {
        match self {
            DepType::Dependencies => "dependencies",
            DepType::DevDependencies => "devDependencies",
            DepType::OptionalDependencies => "optionalDependencies",
            DepType::PeerDependencies => "peerDependencies",
            DepType::Resolutions => "resolutions",
            DepType::Overrides => "overrides",
            DepType::Engines => "engines",
            DepType::Other(name) => name,
        }
    }

    /// Sections that force versions onto transitive dependencies.
    pub fn is_resolution_map(&self) -> bool {
        matches!(self, DepType::Resolutions | DepType::Overrides)
    }
}

impl From<&str> for DepType {
    fn from(name: &str) -> Self {
        match name {
            "dependencies" => DepType::Dependencies,
            "devDependencies" => DepType::DevDependencies,
            "optionalDependencies" => DepType::OptionalDependencies,
            "peerDependencies" => DepType::PeerDependencies,
            "resolutions" => DepType::Resolutions,
            "overrides" => DepType::Overrides,
            "engines" => DepType::Engines,
            other => DepType::Other(other.to_string()),
        }
    }
}

impl From<String> for DepType {
    fn from(name: String) -> Self {
        DepType::from(name.as_str())
    }
}

impl From<DepType> for String {
    fn from(dep_type: DepType) -> Self {
        dep_type.as_str().to_string()
    }
}

impl fmt::Display for DepType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The shape of the value being replaced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "kind",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum UpgradeKind {
    /// A version or range such as `^1.2.0`.
    ///
    /// Without `current_value` the whole value present is replaced.
    Plain {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        current_value: Option<String>,
        new_value: String,
    },
    /// `npm:<lookup_name>@<version>`.
    Alias {
        lookup_name: String,
        current_value: String,
        new_value: String,
    },
    /// `owner/repo#tag` or `<git url>#tag`.
    GitTag {
        current_raw_value: String,
        current_value: String,
        new_value: String,
    },
    /// `owner/repo#<commit>` or `<git url>#<commit>`.
    GitDigest {
        current_raw_value: String,
        current_digest: String,
        new_digest: String,
    },
    /// Only the resolutions/overrides entries are patched.
    ResolutionOnly {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        current_value: Option<String>,
        new_value: String,
    },
}

impl UpgradeKind {
    /// The new version this upgrade installs, if it has one.
    ///
    /// Digest upgrades pin a commit rather than a version.
    pub fn new_value(&self) -> Option<&str> {
        match self {
            UpgradeKind::Plain { new_value, .. }
            | UpgradeKind::Alias { new_value, .. }
            | UpgradeKind::GitTag { new_value, .. }
            | UpgradeKind::ResolutionOnly { new_value, .. } => Some(new_value),
            UpgradeKind::GitDigest { .. } => None,
        }
    }
}

/// One dependency upgrade to apply to a manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Upgrade {
    pub dep_type: DepType,
    pub dep_name: String,
    #[serde(flatten)]
    pub kind: UpgradeKind,
    /// Resolutions key to target when it differs from `dep_name`, e.g. a glob.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution_key: Option<String>,
    /// Replacement package name; the primary entry's key is renamed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_name: Option<String>,
}

impl Upgrade {
    pub fn new(
        dep_type: impl Into<DepType>,
        dep_name: impl Into<String>,
        kind: UpgradeKind,
    ) -> Self {
        Self {
            dep_type: dep_type.into(),
            dep_name: dep_name.into(),
            kind,
            resolution_key: None,
            new_name: None,
        }
    }

    /// Plain version upgrade.
    pub fn plain(
        dep_type: impl Into<DepType>,
        dep_name: impl Into<String>,
        current_value: Option<&str>,
        new_value: impl Into<String>,
    ) -> Self {
        Self::new(
            dep_type,
            dep_name,
            UpgradeKind::Plain {
                current_value: current_value.map(str::to_string),
                new_value: new_value.into(),
            },
        )
    }

    pub fn with_resolution_key(mut self, key: impl Into<String>) -> Self {
        self.resolution_key = Some(key.into());
        self
    }

    pub fn with_new_name(mut self, name: impl Into<String>) -> Self {
        self.new_name = Some(name.into());
        self
    }

    /// Key of the entry in the `dep_type` section.
    pub fn primary_key(&self) -> &str {
        match &self.resolution_key {
            Some(key) if self.dep_type.is_resolution_map() => key,
            _ => &self.dep_name,
        }
    }
}
