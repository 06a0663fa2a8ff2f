//! Conversion from the loosely typed descriptor shape.
//!
//! Extraction tooling emits upgrades as flat objects whose optional fields
//! imply the value shape. The rules below pick an [`UpgradeKind`] from those
//! fields and reject combinations that would otherwise need a guess.

use std::sync::LazyLock;

use regex_lite::Regex;
use serde::{Deserialize, Serialize};

use crate::error::DescriptorError;

use super::{DepType, Upgrade, UpgradeKind};

static DIGEST_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9a-f]{7,40}$").expect("Invalid regex"));

/// Manager-specific extras attached to a descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagerData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

/// A flat upgrade descriptor with optional fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawUpgrade {
    pub dep_type: String,
    pub dep_name: String,
    #[serde(default)]
    pub lookup_name: Option<String>,
    #[serde(default)]
    pub npm_package_alias: bool,
    #[serde(default)]
    pub current_value: Option<String>,
    #[serde(default)]
    pub current_digest: Option<String>,
    #[serde(default)]
    pub current_raw_value: Option<String>,
    #[serde(default)]
    pub new_value: Option<String>,
    #[serde(default)]
    pub new_digest: Option<String>,
    #[serde(default)]
    pub new_name: Option<String>,
    #[serde(default)]
    pub manager_data: Option<ManagerData>,
}

impl RawUpgrade {
    fn require(
        &self,
        value: &Option<String>,
        field: &'static str,
    ) -> Result<String, DescriptorError> {
        value.clone().ok_or_else(|| DescriptorError::MissingField {
            dep_name: self.dep_name.clone(),
            field,
        })
    }
}

fn check_digest(digest: &str) -> Result<(), DescriptorError> {
    if DIGEST_RE.is_match(digest) {
        Ok(())
    } else {
        Err(DescriptorError::InvalidDigest(digest.to_string()))
    }
}

impl TryFrom<RawUpgrade> for Upgrade {
    type Error = DescriptorError;

    /// Rules, first match wins:
    /// 1. `npmPackageAlias` -> [`UpgradeKind::Alias`]
    /// 2. `currentRawValue` + `currentDigest` -> [`UpgradeKind::GitDigest`]
    /// 3. `currentRawValue` -> [`UpgradeKind::GitTag`]
    /// 4. `resolutions` section with `managerData.key` -> [`UpgradeKind::ResolutionOnly`]
    /// 5. anything else -> [`UpgradeKind::Plain`]
    fn try_from(raw: RawUpgrade) -> Result<Self, Self::Error> {
        let dep_type = DepType::from(raw.dep_type.as_str());
        let resolution_key = raw.manager_data.as_ref().and_then(|d| d.key.clone());

        let kind = if raw.npm_package_alias {
            UpgradeKind::Alias {
                lookup_name: raw.require(&raw.lookup_name, "lookupName")?,
                current_value: raw.require(&raw.current_value, "currentValue")?,
                new_value: raw.require(&raw.new_value, "newValue")?,
            }
        } else if let Some(current_raw_value) = raw.current_raw_value.clone() {
            if let Some(current_digest) = raw.current_digest.clone() {
                let new_digest = raw.require(&raw.new_digest, "newDigest")?;
                check_digest(&current_digest)?;
                check_digest(&new_digest)?;
                UpgradeKind::GitDigest {
                    current_raw_value,
                    current_digest,
                    new_digest,
                }
            } else {
                UpgradeKind::GitTag {
                    current_raw_value,
                    current_value: raw.require(&raw.current_value, "currentValue")?,
                    new_value: raw.require(&raw.new_value, "newValue")?,
                }
            }
        } else if dep_type == DepType::Resolutions && resolution_key.is_some() {
            UpgradeKind::ResolutionOnly {
                current_value: raw.current_value.clone(),
                new_value: raw.require(&raw.new_value, "newValue")?,
            }
        } else {
            UpgradeKind::Plain {
                current_value: raw.current_value.clone(),
                new_value: raw.require(&raw.new_value, "newValue")?,
            }
        };

        Ok(Upgrade {
            dep_type,
            dep_name: raw.dep_name,
            kind,
            resolution_key,
            new_name: raw.new_name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(json: &str) -> RawUpgrade {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_plain_descriptor() {
        let upgrade = Upgrade::try_from(raw(
            r#"{"depType": "dependencies", "depName": "cheerio", "newValue": "0.22.1"}"#,
        ))
        .unwrap();

        assert_eq!(upgrade.dep_type, DepType::Dependencies);
        assert_eq!(
            upgrade.kind,
            UpgradeKind::Plain {
                current_value: None,
                new_value: "0.22.1".to_string(),
            }
        );
    }

    #[test]
    fn test_alias_descriptor() {
        let upgrade = Upgrade::try_from(raw(
            r#"{"depType": "dependencies", "depName": "hapi", "npmPackageAlias": true,
                "lookupName": "@hapi/hapi", "currentValue": "18.3.0", "newValue": "18.3.1"}"#,
        ))
        .unwrap();

        let UpgradeKind::Alias { lookup_name, .. } = &upgrade.kind else {
            panic!("expected alias, got {:?}", upgrade.kind);
        };
        assert_eq!(lookup_name, "@hapi/hapi");
    }

    #[test]
    fn test_alias_requires_lookup_name() {
        let err = Upgrade::try_from(raw(
            r#"{"depType": "dependencies", "depName": "hapi", "npmPackageAlias": true,
                "currentValue": "18.3.0", "newValue": "18.3.1"}"#,
        ))
        .unwrap_err();

        assert_eq!(
            err,
            DescriptorError::MissingField {
                dep_name: "hapi".to_string(),
                field: "lookupName",
            }
        );
    }

    #[test]
    fn test_digest_descriptor() {
        let upgrade = Upgrade::try_from(raw(
            r#"{"depType": "dependencies", "depName": "gulp", "currentDigest": "abcdef7",
                "currentRawValue": "gulpjs/gulp#abcdef7",
                "newDigest": "0000000000111111111122222222223333333333"}"#,
        ))
        .unwrap();

        assert!(matches!(upgrade.kind, UpgradeKind::GitDigest { .. }));
    }

    #[test]
    fn test_digest_must_be_hex() {
        let err = Upgrade::try_from(raw(
            r#"{"depType": "dependencies", "depName": "gulp", "currentDigest": "v1.0.0",
                "currentRawValue": "gulpjs/gulp#v1.0.0", "newDigest": "abcdef7"}"#,
        ))
        .unwrap_err();

        assert_eq!(err, DescriptorError::InvalidDigest("v1.0.0".to_string()));
    }

    #[test]
    fn test_tag_descriptor() {
        let upgrade = Upgrade::try_from(raw(
            r#"{"depType": "dependencies", "depName": "n", "currentValue": "v1.0.0",
                "currentRawValue": "git+https://github.com/owner/n#v1.0.0", "newValue": "v1.1.0"}"#,
        ))
        .unwrap();

        assert!(matches!(upgrade.kind, UpgradeKind::GitTag { .. }));
    }

    #[test]
    fn test_resolution_only_descriptor() {
        let upgrade = Upgrade::try_from(raw(
            r#"{"depType": "resolutions", "depName": "@angular/cli",
                "managerData": {"key": "**/@angular/cli"}, "newValue": "8.1.0"}"#,
        ))
        .unwrap();

        assert!(matches!(upgrade.kind, UpgradeKind::ResolutionOnly { .. }));
        assert_eq!(upgrade.resolution_key.as_deref(), Some("**/@angular/cli"));
    }

    #[test]
    fn test_missing_new_value() {
        let err = Upgrade::try_from(raw(r#"{"depType": "dependencies", "depName": "x"}"#))
            .unwrap_err();
        assert!(matches!(
            err,
            DescriptorError::MissingField {
                field: "newValue",
                ..
            }
        ));
    }
}
