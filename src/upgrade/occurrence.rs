//! Caller-owned occurrence counters for duplicate keys.

use std::collections::HashMap;

use super::DepType;

/// Tracks which occurrence of a `(section, key)` pair the next patch targets.
///
/// A manifest may declare the same key twice, either inside one section or
/// across repeated sections. Threading one tracker through a batch of patches
/// makes successive patches for the same pair move to the next match instead
/// of hitting the first one again.
#[derive(Debug, Default, Clone)]
pub struct OccurrenceTracker {
    next: HashMap<(DepType, String), usize>,
}

impl OccurrenceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// The occurrence index the next patch for this pair will use.
    pub fn peek(&self, dep_type: &DepType, key: &str) -> usize {
        self.next
            .get(&(dep_type.clone(), key.to_string()))
            .copied()
            .unwrap_or(0)
    }

    /// Return the current index for this pair and move past it.
    pub fn advance(&mut self, dep_type: &DepType, key: &str) -> usize {
        let slot = self
            .next
            .entry((dep_type.clone(), key.to_string()))
            .or_insert(0);
        let current = *slot;
        *slot += 1;
        current
    }

    pub fn reset(&mut self) {
        self.next.clear();
    }
}
