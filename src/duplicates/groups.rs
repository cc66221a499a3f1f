//! Duplicate grouping by fingerprint.
//!
//! # Overview
//!
//! Once the reduction pipeline has tagged every survivor as a duplicate,
//! [`group_duplicates`] partitions them into [`DuplicateGroup`]s keyed by
//! fingerprint. Groups keep traversal order, so the first member of each
//! group is the one retained when sweeping.
//!
//! # Example
//!
//! ```
//! use broom::scanner::{Entry, Group};
//! use broom::duplicates::{estimated_savings, group_duplicates};
//! use std::path::PathBuf;
//!
//! let mut entries = vec![
//!     Entry::new(PathBuf::from("/b.txt"), 100).with_fingerprint("aa"),
//!     Entry::new(PathBuf::from("/c.txt"), 100).with_fingerprint("aa"),
//! ];
//! for entry in &mut entries {
//!     entry.tag(Group::Duplicate).unwrap();
//! }
//!
//! let groups = group_duplicates(&mut entries);
//! assert_eq!(groups.len(), 1);
//! assert_eq!(groups[0].len(), 2);
//! assert_eq!(estimated_savings(&groups), 100);
//! assert!(entries.is_empty());
//! ```

use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;

use crate::scanner::{Entry, Group};

/// Entries of one size sharing one fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateGroup {
    /// Fingerprint shared by every member
    pub fingerprint: String,
    /// Members in traversal order
    pub entries: Vec<Entry>,
}

impl DuplicateGroup {
    /// Create a group with a single member.
    #[must_use]
    pub fn new(fingerprint: String, first: Entry) -> Self {
        Self {
            fingerprint,
            entries: vec![first],
        }
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if this group has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// A group only holds duplicates once it has two or more members.
    #[must_use]
    pub fn is_true_duplicate(&self) -> bool {
        self.entries.len() > 1
    }

    /// The member retained when the group is swept.
    #[must_use]
    pub fn canonical(&self) -> Option<&Entry> {
        self.entries.first()
    }

    /// Members that would be replaced by links to the canonical file.
    #[must_use]
    pub fn redundant(&self) -> &[Entry] {
        self.entries.get(1..).unwrap_or_default()
    }

    /// Size of the canonical member in bytes.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.canonical().map_or(0, |e| e.size)
    }

    /// Estimated bytes freed by sweeping this group.
    ///
    /// This is the canonical size times the number of redundant copies.
    #[must_use]
    pub fn wasted_space(&self) -> u64 {
        self.size() * self.duplicate_count() as u64
    }

    /// Number of redundant copies (members minus the canonical one).
    #[must_use]
    pub fn duplicate_count(&self) -> usize {
        self.entries.len().saturating_sub(1)
    }

    /// Paths of every member.
    #[must_use]
    pub fn paths(&self) -> Vec<PathBuf> {
        self.entries.iter().map(|e| e.path.clone()).collect()
    }
}

/// Partition tagged duplicates into groups keyed by size and fingerprint.
///
/// Drains `entries`. The first time a size and fingerprint pair is seen it
/// opens a new group; later entries with the same pair are appended, so
/// every member of a group has the same size. Groups are
/// returned in first-encounter order. Entries that are not tagged
/// [`Group::Duplicate`] or lack a fingerprint are dropped with a warning.
#[must_use]
pub fn group_duplicates(entries: &mut Vec<Entry>) -> Vec<DuplicateGroup> {
    let mut groups: Vec<DuplicateGroup> = Vec::new();
    let mut index: HashMap<(u64, String), usize> = HashMap::new();

    for entry in entries.drain(..) {
        if entry.group() != Group::Duplicate {
            log::warn!(
                "Refusing to group {} entry: {}",
                entry.group(),
                entry.path.display()
            );
            continue;
        }
        let Some(fingerprint) = entry.fingerprint().map(str::to_owned) else {
            log::warn!("Duplicate without fingerprint: {}", entry.path.display());
            continue;
        };

        let key = (entry.size, fingerprint);
        match index.get(&key) {
            Some(&slot) => groups[slot].entries.push(entry),
            None => {
                let fingerprint = key.1.clone();
                log::trace!("New group {}: {}", fingerprint, entry.path.display());
                index.insert(key, groups.len());
                groups.push(DuplicateGroup::new(fingerprint, entry));
            }
        }
    }

    log::debug!("Grouped duplicates into {} groups", groups.len());
    groups
}

/// Estimated bytes freed by sweeping every true duplicate group.
#[must_use]
pub fn estimated_savings(groups: &[DuplicateGroup]) -> u64 {
    groups.iter().map(DuplicateGroup::wasted_space).sum()
}
