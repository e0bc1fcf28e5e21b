//! Keyed set reconciliation
//!
//! Splits two snapshots into inserted (`new \ old`), updated (`old ∩ new`) and
//! removed (`old \ new`). Pure; timing lives in `transition`.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

/// Items identified by a stable key
pub trait Keyed {
    type Key: Hash + Eq + Clone;

    fn key(&self) -> &Self::Key;
}

/// Partition of two keyed snapshots
#[derive(Debug)]
pub struct Reconciliation<'a, T> {
    /// Only in the new snapshot, in new order
    pub inserted: Vec<&'a T>,
    /// In both, as `(old, new)`, in new order
    pub updated: Vec<(&'a T, &'a T)>,
    /// Only in the old snapshot, in old order
    pub removed: Vec<&'a T>,
}

impl<T: Keyed> Reconciliation<'_, T> {
    pub fn inserted_keys(&self) -> HashSet<T::Key> {
        self.inserted.iter().map(|t| t.key().clone()).collect()
    }

    pub fn updated_keys(&self) -> HashSet<T::Key> {
        self.updated.iter().map(|(_, t)| t.key().clone()).collect()
    }

    pub fn removed_keys(&self) -> HashSet<T::Key> {
        self.removed.iter().map(|t| t.key().clone()).collect()
    }

    pub fn is_unchanged(&self) -> bool {
        self.inserted.is_empty() && self.removed.is_empty()
    }
}

/// Diff two snapshots by key. Duplicate keys within one snapshot keep their first
/// occurrence.
pub fn reconcile<'a, T: Keyed>(old: &'a [T], new: &'a [T]) -> Reconciliation<'a, T> {
    let mut old_by_key: HashMap<&T::Key, &'a T> = HashMap::with_capacity(old.len());
    for item in old {
        old_by_key.entry(item.key()).or_insert(item);
    }

    let mut seen: HashSet<&T::Key> = HashSet::with_capacity(new.len());
    let mut inserted = Vec::new();
    let mut updated = Vec::new();
    for item in new {
        if !seen.insert(item.key()) {
            log::debug!("Duplicate sibling key ignored during reconciliation");
            continue;
        }
        match old_by_key.get(item.key()) {
            Some(previous) => updated.push((*previous, item)),
            None => inserted.push(item),
        }
    }

    let mut removed_seen: HashSet<&T::Key> = HashSet::new();
    let removed = old
        .iter()
        .filter(|item| !seen.contains(item.key()) && removed_seen.insert(item.key()))
        .collect();

    Reconciliation {
        inserted,
        updated,
        removed,
    }
}
