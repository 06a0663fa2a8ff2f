//! Expected/replacement value reconstruction per upgrade kind.

use crate::error::PatchError;
use crate::manifest::edit::quote;
use crate::manifest::{Edit, Member, Node};
use crate::upgrade::UpgradeKind;

/// What a slot is expected to contain and what replaces it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValuePlan {
    /// Value the slot must currently hold. `None` replaces the whole value
    /// without a drift check.
    pub expected: Option<String>,
    /// The value's content after patching, when it held exactly `expected`.
    pub replacement: String,
}

impl ValuePlan {
    /// Build the plan for an upgrade kind.
    pub fn for_kind(kind: &UpgradeKind) -> Result<Self, PatchError> {
        match kind {
            UpgradeKind::Plain {
                current_value,
                new_value,
            }
            | UpgradeKind::ResolutionOnly {
                current_value,
                new_value,
            } => Ok(Self {
                expected: current_value.clone(),
                replacement: new_value.clone(),
            }),
            UpgradeKind::Alias {
                lookup_name,
                current_value,
                new_value,
            } => Ok(Self {
                expected: Some(format!("npm:{}@{}", lookup_name, current_value)),
                replacement: format!("npm:{}@{}", lookup_name, new_value),
            }),
            UpgradeKind::GitTag {
                current_raw_value,
                current_value,
                new_value,
            } => {
                let prefix = ref_prefix(current_raw_value, current_value)?;
                Ok(Self {
                    expected: Some(current_raw_value.clone()),
                    replacement: format!("{}{}", prefix, new_value),
                })
            }
            UpgradeKind::GitDigest {
                current_raw_value,
                current_digest,
                new_digest,
            } => {
                let prefix = ref_prefix(current_raw_value, current_digest)?;
                // Keep short hashes short.
                let digest = new_digest.get(..current_digest.len()).unwrap_or(new_digest);
                Ok(Self {
                    expected: Some(current_raw_value.clone()),
                    replacement: format!("{}{}", prefix, digest),
                })
            }
        }
    }

    /// Compute the splice that moves `member`'s value to the replacement.
    ///
    /// The decoded value must equal the expectation exactly; the whole string
    /// literal is then rewritten.
    pub fn splice(&self, section: &str, member: &Member) -> Result<Edit, PatchError> {
        let Node::String { span, value } = &member.value else {
            return Err(PatchError::NotAString {
                section: section.to_string(),
                key: member.key.clone(),
            });
        };

        if let Some(expected) = &self.expected
            && value != expected
        {
            return Err(PatchError::ValueMismatch {
                section: section.to_string(),
                key: member.key.clone(),
                expected: expected.clone(),
                found: value.clone(),
            });
        }

        Ok(Edit::new(*span, quote(&self.replacement)))
    }
}

/// Everything up to and including the `#` before `segment`.
fn ref_prefix<'a>(raw: &'a str, segment: &str) -> Result<&'a str, PatchError> {
    match raw.rsplit_once('#') {
        Some((prefix, tail)) if tail == segment => Ok(&raw[..prefix.len() + 1]),
        _ => Err(PatchError::InconsistentDescriptor {
            raw: raw.to_string(),
            segment: segment.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::Document;

    fn tag(raw: &str, current: &str, new: &str) -> UpgradeKind {
        UpgradeKind::GitTag {
            current_raw_value: raw.to_string(),
            current_value: current.to_string(),
            new_value: new.to_string(),
        }
    }

    #[test]
    fn test_alias_plan() {
        let plan = ValuePlan::for_kind(&UpgradeKind::Alias {
            lookup_name: "@hapi/hapi".to_string(),
            current_value: "18.3.0".to_string(),
            new_value: "18.3.1".to_string(),
        })
        .unwrap();

        assert_eq!(plan.expected.as_deref(), Some("npm:@hapi/hapi@18.3.0"));
        assert_eq!(plan.replacement, "npm:@hapi/hapi@18.3.1");
    }

    #[test]
    fn test_tag_plan_keeps_prefix() {
        let plan = ValuePlan::for_kind(&tag(
            "git+https://github.com/owner/n#v1.0.0",
            "v1.0.0",
            "v1.1.0",
        ))
        .unwrap();

        assert_eq!(plan.replacement, "git+https://github.com/owner/n#v1.1.0");
    }

    #[test]
    fn test_tag_plan_rejects_inconsistent_raw_value() {
        let err = ValuePlan::for_kind(&tag("gulpjs/gulp#v3.9.1", "v4.0.0-alpha.2", "v4.0.0"))
            .unwrap_err();
        assert!(err.is_value_mismatch());

        let err = ValuePlan::for_kind(&tag("gulpjs/gulp", "gulp", "v4.0.0")).unwrap_err();
        assert!(matches!(err, PatchError::InconsistentDescriptor { .. }));
    }

    #[test]
    fn test_digest_plan_truncates_to_current_length() {
        let plan = ValuePlan::for_kind(&UpgradeKind::GitDigest {
            current_raw_value: "gulpjs/gulp#abcdef7".to_string(),
            current_digest: "abcdef7".to_string(),
            new_digest: "0000000000111111111122222222223333333333".to_string(),
        })
        .unwrap();

        assert_eq!(plan.replacement, "gulpjs/gulp#0000000");
    }

    #[test]
    fn test_splice_rewrites_whole_literal() {
        let text = r#"{"dependencies": {"a": "file:a\"b-1.0.0"}}"#;
        let doc = Document::parse(text).unwrap();
        let member = doc.entries("dependencies", "a")[0];
        let plan = ValuePlan {
            expected: Some("file:a\"b-1.0.0".to_string()),
            replacement: "file:a\"b-1.1.0".to_string(),
        };

        let edit = plan.splice("dependencies", member).unwrap();
        assert_eq!(edit.span.slice(text), r#""file:a\"b-1.0.0""#);
        assert_eq!(edit.text, r#""file:a\"b-1.1.0""#);
    }

    #[test]
    fn test_splice_rejects_value_containing_expectation() {
        let text = r#"{"dependencies": {"a": "^1.0.0 || 1.0.0"}}"#;
        let doc = Document::parse(text).unwrap();
        let member = doc.entries("dependencies", "a")[0];
        let plan = ValuePlan {
            expected: Some("1.0.0".to_string()),
            replacement: "2.0.0".to_string(),
        };

        let err = plan.splice("dependencies", member).unwrap_err();
        assert!(err.is_value_mismatch());
    }

    #[test]
    fn test_splice_whole_value_without_expectation() {
        let text = r#"{"dependencies": {"a": "1.0.0"}}"#;
        let doc = Document::parse(text).unwrap();
        let member = doc.entries("dependencies", "a")[0];
        let plan = ValuePlan {
            expected: None,
            replacement: "1.2.0".to_string(),
        };

        let edit = plan.splice("dependencies", member).unwrap();
        assert_eq!(edit.span.slice(text), r#""1.0.0""#);
        assert_eq!(edit.text, r#""1.2.0""#);
    }

    #[test]
    fn test_splice_reports_drift() {
        let text = r#"{"dependencies": {"a": "1.0.1"}}"#;
        let doc = Document::parse(text).unwrap();
        let member = doc.entries("dependencies", "a")[0];
        let plan = ValuePlan {
            expected: Some("1.0.0".to_string()),
            replacement: "1.2.0".to_string(),
        };

        let err = plan.splice("dependencies", member).unwrap_err();
        assert_eq!(
            err,
            PatchError::ValueMismatch {
                section: "dependencies".to_string(),
                key: "a".to_string(),
                expected: "1.0.0".to_string(),
                found: "1.0.1".to_string(),
            }
        );
    }

    #[test]
    fn test_splice_rejects_non_string_value() {
        let text = r#"{"overrides": {"a": {"b": "1.0.0"}}}"#;
        let doc = Document::parse(text).unwrap();
        let member = doc.entries("overrides", "a")[0];
        let plan = ValuePlan {
            expected: None,
            replacement: "1.2.0".to_string(),
        };

        let err = plan.splice("overrides", member).unwrap_err();
        assert!(err.is_structural());
    }
}
