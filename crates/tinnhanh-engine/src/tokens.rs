//! Time and date tokens.
//!
//! Times are written `HHhMM'` (two-digit hour and minute), dates
//! `D/M/YYYY` with one- or two-digit day and month. House style drops the
//! leading zero on months 3 to 9 and keeps it on January and February.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use tinnhanh_core::article::ChangeRecord;

/// Stands in for the original token when the refined text has more tokens
/// than the input.
pub const PREVIOUS_FORMAT: &str = "Định dạng cũ";

static TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[0-9]{2}h[0-9]{2}'|[0-9]{1,2}/[0-9]{1,2}/[0-9]{4}").unwrap()
});

static TIME_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]{2}h[0-9]{2}'$").unwrap());

static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{1,2}/[0-9]{1,2}/[0-9]{4}$").unwrap());

// Unanchored like TOKEN_RE, so every date `extract_tokens` reports is
// normalized, including one glued to a word ("ngày20/03/2026").
static DATE_PARTS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9]{1,2})/([0-9]{1,2})/([0-9]{4})").unwrap());

/// All time and date tokens in `text`, in order of appearance.
pub fn extract_tokens(text: &str) -> Vec<&str> {
    TOKEN_RE.find_iter(text).map(|m| m.as_str()).collect()
}

pub fn is_time_token(s: &str) -> bool {
    TIME_RE.is_match(s)
}

pub fn is_date_token(s: &str) -> bool {
    DATE_RE.is_match(s)
}

/// Pair tokens of `before` and `after` by position and report every token
/// of `after` that differs from its counterpart.
///
/// This is a positional alignment, not a diff: one inserted token shifts
/// every later pair.
pub fn detect_token_changes(before: &str, after: &str) -> Vec<ChangeRecord> {
    let old = extract_tokens(before);
    extract_tokens(after)
        .into_iter()
        .enumerate()
        .filter(|(i, fixed)| old.get(*i) != Some(fixed))
        .map(|(i, fixed)| ChangeRecord::new(old.get(i).copied().unwrap_or(PREVIOUS_FORMAT), fixed))
        .collect()
}

/// Rewrite every date so months 3 to 9 have no leading zero and months 1
/// and 2 are written `01` and `02`. Other months, days and years are left
/// as they are.
pub fn enforce_month_convention(text: &str) -> String {
    DATE_PARTS_RE
        .replace_all(text, |caps: &Captures<'_>| {
            let day = &caps[1];
            let month = &caps[2];
            let year = &caps[3];
            match month.parse::<u8>() {
                Ok(m @ 3..=9) => format!("{day}/{m}/{year}"),
                Ok(m @ 1..=2) => format!("{day}/{m:02}/{year}"),
                _ => caps[0].to_string(),
            }
        })
        .into_owned()
}
