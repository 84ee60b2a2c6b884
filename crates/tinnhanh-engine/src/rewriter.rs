//! Deterministic abbreviation expansion.
//!
//! Entries are applied one after another in
//! [`AbbreviationDictionary::match_order`]. Each entry replaces every
//! whole-word, case-insensitive occurrence of its `short` in the output of
//! the previous entry. Replaced text is never re-scanned by the same entry,
//! but a later (shorter) entry may match text an earlier expansion produced.

use regex::{NoExpand, Regex};
use serde::Serialize;
use tracing::{debug, warn};

use tinnhanh_core::article::ChangeRecord;

use crate::dictionary::AbbreviationDictionary;

/// Expanded text plus one record per distinct surface form replaced.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Expansion {
    pub text: String,
    pub changes: Vec<ChangeRecord>,
}

pub fn expand(text: &str, dictionary: &AbbreviationDictionary) -> Expansion {
    let mut current = text.to_owned();
    let mut changes: Vec<ChangeRecord> = Vec::new();

    for entry in dictionary.match_order() {
        let pattern = match whole_word_pattern(&entry.short) {
            Ok(pattern) => pattern,
            Err(e) => {
                warn!(short = %entry.short, error = %e, "skipping unmatchable abbreviation");
                continue;
            }
        };

        let mut matched = false;
        for found in pattern.find_iter(&current) {
            matched = true;
            let surface = found.as_str();
            if !changes.iter().any(|c| c.original == surface) {
                changes.push(ChangeRecord::new(surface, entry.full.as_str()));
            }
        }

        if matched {
            current = pattern
                .replace_all(&current, NoExpand(&entry.full))
                .into_owned();
        }
    }

    debug!(changes = changes.len(), "dictionary expansion done");
    Expansion {
        text: current,
        changes,
    }
}

fn whole_word_pattern(short: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(r"(?i)\b{}\b", regex::escape(short)))
}
