//! Abbreviation dictionary.
//!
//! An insertion-ordered list of `short -> full` entries. Duplicates by
//! `short` are kept; [`AbbreviationDictionary::match_order`] decides which
//! one wins.

use std::cmp::Reverse;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::debug;

use tinnhanh_core::article::AbbreviationEntry;
use tinnhanh_core::ids::EntryId;

/// Entries every new dictionary starts with.
pub const DEFAULT_ENTRIES: [(&str, &str); 12] = [
    ("Cax", "Công an xã"),
    ("Cap", "Công an phường"),
    ("Antt", "an ninh trật tự"),
    ("Ancs", "tham gia bảo vệ an ninh trật tự tại cơ sở"),
    ("CSĐT", "Cảnh sát điều tra"),
    ("Anđt", "An ninh điều tra"),
    ("Gđ", "Giám đốc"),
    ("Sn", "sinh năm"),
    ("Hp", "Hải Phòng"),
    ("Ptp", "Phó Trưởng phòng"),
    ("Catp", "Công an thành phố"),
    ("Pgđ", "Phó Giám đốc"),
];

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AbbreviationDictionary {
    entries: Vec<AbbreviationEntry>,
}

impl AbbreviationDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dictionary seeded with [`DEFAULT_ENTRIES`].
    pub fn with_defaults() -> Self {
        let mut dict = Self::new();
        for (short, full) in DEFAULT_ENTRIES {
            let _ = dict.add(short, full);
        }
        dict
    }

    /// Append an entry. Both sides are trimmed; if either is blank nothing
    /// is added and `None` is returned.
    pub fn add(&mut self, short: &str, full: &str) -> Option<EntryId> {
        let short = short.trim();
        let full = full.trim();
        if short.is_empty() || full.is_empty() {
            return None;
        }
        let id = EntryId::new();
        self.entries.push(AbbreviationEntry {
            id: id.clone(),
            short: short.to_owned(),
            full: full.to_owned(),
        });
        debug!(%id, short, "abbreviation added");
        Some(id)
    }

    /// Remove by id. Returns whether anything was removed.
    pub fn remove(&mut self, id: &EntryId) -> bool {
        match self.entries.iter().position(|e| &e.id == id) {
            Some(index) => {
                let removed = self.entries.remove(index);
                debug!(%id, short = %removed.short, "abbreviation removed");
                true
            }
            None => false,
        }
    }

    pub fn all(&self) -> &[AbbreviationEntry] {
        &self.entries
    }

    pub fn get(&self, id: &EntryId) -> Option<&AbbreviationEntry> {
        self.entries.iter().find(|e| &e.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in the order expansion applies them: longest `short` first
    /// (counted in characters), and among equal lengths the most recently
    /// added first.
    pub fn match_order(&self) -> Vec<&AbbreviationEntry> {
        let mut ordered: Vec<&AbbreviationEntry> = self.entries.iter().rev().collect();
        ordered.sort_by_key(|e| Reverse(e.short.chars().count()));
        ordered
    }
}

/// Shared handle for a dictionary that is edited while pipelines run.
///
/// Pipelines work on a [`snapshot`](Self::snapshot), so each sees the whole
/// dictionary either before or after a concurrent edit.
#[derive(Clone, Debug, Default)]
pub struct SharedDictionary {
    inner: Arc<RwLock<AbbreviationDictionary>>,
}

impl SharedDictionary {
    pub fn new(dictionary: AbbreviationDictionary) -> Self {
        Self {
            inner: Arc::new(RwLock::new(dictionary)),
        }
    }

    pub fn add(&self, short: &str, full: &str) -> Option<EntryId> {
        self.inner.write().add(short, full)
    }

    pub fn remove(&self, id: &EntryId) -> bool {
        self.inner.write().remove(id)
    }

    pub fn snapshot(&self) -> AbbreviationDictionary {
        self.inner.read().clone()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}

impl From<AbbreviationDictionary> for SharedDictionary {
    fn from(dictionary: AbbreviationDictionary) -> Self {
        Self::new(dictionary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shorts(dict: &AbbreviationDictionary) -> Vec<&str> {
        dict.match_order().iter().map(|e| e.short.as_str()).collect()
    }

    #[test]
    fn add_trims_and_appends() {
        let mut dict = AbbreviationDictionary::new();
        let id = dict.add("  Cax ", " Công an xã  ").unwrap();
        assert_eq!(dict.len(), 1);
        let entry = dict.get(&id).unwrap();
        assert_eq!(entry.short, "Cax");
        assert_eq!(entry.full, "Công an xã");
        assert!(id.as_str().starts_with("abbr_"));
    }

    #[test]
    fn add_blank_is_noop() {
        let mut dict = AbbreviationDictionary::new();
        assert!(dict.add("   ", "Công an xã").is_none());
        assert!(dict.add("Cax", "\t").is_none());
        assert!(dict.add("", "").is_none());
        assert!(dict.is_empty());
    }

    #[test]
    fn duplicates_are_kept() {
        let mut dict = AbbreviationDictionary::new();
        let a = dict.add("Hp", "Hải Phòng").unwrap();
        let b = dict.add("Hp", "Hòa Phát").unwrap();
        assert_ne!(a, b);
        assert_eq!(dict.len(), 2);
    }

    #[test]
    fn remove_by_id() {
        let mut dict = AbbreviationDictionary::new();
        let a = dict.add("Cax", "Công an xã").unwrap();
        let b = dict.add("Cap", "Công an phường").unwrap();
        assert!(dict.remove(&a));
        assert!(!dict.remove(&a));
        assert_eq!(dict.all().len(), 1);
        assert_eq!(dict.all()[0].id, b);
    }

    #[test]
    fn remove_unknown_id_is_not_an_error() {
        let mut dict = AbbreviationDictionary::with_defaults();
        assert!(!dict.remove(&EntryId::from_raw("abbr_missing")));
        assert_eq!(dict.len(), DEFAULT_ENTRIES.len());
    }

    #[test]
    fn defaults_preserve_order() {
        let dict = AbbreviationDictionary::with_defaults();
        let seeded: Vec<_> = dict
            .all()
            .iter()
            .map(|e| (e.short.as_str(), e.full.as_str()))
            .collect();
        assert_eq!(seeded, DEFAULT_ENTRIES.to_vec());
    }

    #[test]
    fn match_order_longest_first() {
        let mut dict = AbbreviationDictionary::new();
        let _ = dict.add("Ca", "Công an");
        let _ = dict.add("Catp", "Công an thành phố");
        let _ = dict.add("Cap", "Công an phường");
        assert_eq!(shorts(&dict), vec!["Catp", "Cap", "Ca"]);
    }

    #[test]
    fn match_order_counts_characters() {
        let mut dict = AbbreviationDictionary::new();
        // "Gđ" is 3 bytes but 2 characters.
        let _ = dict.add("Gđ", "Giám đốc");
        let _ = dict.add("Abc", "x");
        assert_eq!(shorts(&dict), vec!["Abc", "Gđ"]);
    }

    #[test]
    fn match_order_latest_duplicate_first() {
        let mut dict = AbbreviationDictionary::new();
        let _ = dict.add("Hp", "Hải Phòng");
        let _ = dict.add("Hp", "Hòa Phát");
        let fulls: Vec<_> = dict.match_order().iter().map(|e| e.full.as_str()).collect();
        assert_eq!(fulls, vec!["Hòa Phát", "Hải Phòng"]);
    }

    #[test]
    fn shared_snapshot_is_isolated() {
        let shared = SharedDictionary::new(AbbreviationDictionary::with_defaults());
        let before = shared.snapshot();
        let id = shared.add("Ubnd", "Ủy ban nhân dân").unwrap();
        assert_eq!(before.len(), DEFAULT_ENTRIES.len());
        assert_eq!(shared.len(), DEFAULT_ENTRIES.len() + 1);
        assert!(shared.remove(&id));
        assert_eq!(shared.snapshot(), before);
    }

    #[test]
    fn serializes_as_list() {
        let mut dict = AbbreviationDictionary::new();
        let _ = dict.add("Sn", "sinh năm");
        let json = serde_json::to_value(&dict).unwrap();
        assert!(json.is_array());
        assert_eq!(json[0]["short"], "Sn");
        assert_eq!(json[0]["full"], "sinh năm");
    }
}
