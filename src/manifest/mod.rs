//! Manifest text access.
//!
//! Wraps the span-aware scanner with package.json-shaped lookups: top-level
//! sections and the entries inside them, with duplicate keys preserved.

pub mod edit;
pub mod scanner;

pub use edit::{Edit, apply_edits};
pub use scanner::{Member, Node, Span};

use crate::error::PatchError;

/// A parsed manifest that still borrows its source text.
#[derive(Debug, Clone)]
pub struct Document<'a> {
    text: &'a str,
    root: Node,
}

impl<'a> Document<'a> {
    /// Parse manifest text. The root must be a JSON object.
    pub fn parse(text: &'a str) -> Result<Self, PatchError> {
        let root = scanner::scan(text)?;

        if root.members().is_none() {
            return Err(PatchError::InvalidManifest {
                offset: root.span().start,
                reason: "manifest root is not an object".to_string(),
            });
        }

        Ok(Self { text, root })
    }

    /// The source text spans point into.
    pub fn text(&self) -> &'a str {
        self.text
    }

    /// Every top-level member named `name`, in source order.
    pub fn root_members<'s>(&'s self, name: &str) -> impl Iterator<Item = &'s Member> {
        self.root
            .members()
            .unwrap_or_default()
            .iter()
            .filter(move |m| m.key == name)
    }

    /// Whether a top-level object named `section` exists.
    pub fn has_section(&self, section: &str) -> bool {
        self.root_members(section)
            .any(|m| m.value.members().is_some())
    }

    /// Every entry keyed `key` across every top-level `section` object.
    ///
    /// The position in the returned list is the occurrence index used to
    /// disambiguate duplicate keys.
    pub fn entries(&self, section: &str, key: &str) -> Vec<&Member> {
        self.root_members(section)
            .filter_map(|m| m.value.members())
            .flat_map(|members| members.iter().filter(|m| m.key == key))
            .collect()
    }
}
