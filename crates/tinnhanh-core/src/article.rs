//! Article domain types.
//!
//! [`Topic`], [`Length`] and [`RewriteLength`] are closed sets that drive
//! prompt construction. Their serde / [`FromStr`] spelling is snake_case;
//! [`Topic::label`] and [`Length::label`] give the Vietnamese wording that is
//! shown to the model.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ids::EntryId;

/// Returned by the `FromStr` impls when the input names no known variant.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} `{value}` (expected one of: {expected})")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
    pub expected: &'static str,
}

/// Article topic.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    /// Conferences, meetings, unit activities.
    Conference,
    /// Security and public-order incidents.
    #[default]
    Incident,
    /// Anything else; may carry a user template.
    Other,
}

impl Topic {
    pub const ALL: [Topic; 3] = [Topic::Conference, Topic::Incident, Topic::Other];

    /// Vietnamese label used inside prompts.
    pub fn label(self) -> &'static str {
        match self {
            Self::Conference => "Hội nghị/Hoạt động",
            Self::Incident => "Vụ việc",
            Self::Other => "Khác",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Conference => f.write_str("conference"),
            Self::Incident => f.write_str("incident"),
            Self::Other => f.write_str("other"),
        }
    }
}

impl FromStr for Topic {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "conference" => Ok(Self::Conference),
            "incident" => Ok(Self::Incident),
            "other" => Ok(Self::Other),
            _ => Err(UnknownVariant {
                kind: "topic",
                value: s.to_owned(),
                expected: "conference, incident, other",
            }),
        }
    }
}

/// Target length of a newly synthesized article.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Length {
    #[default]
    Short,
    Medium,
    Long,
}

impl Length {
    pub const ALL: [Length; 3] = [Length::Short, Length::Medium, Length::Long];

    /// Vietnamese label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Short => "Ngắn",
            Self::Medium => "Trung bình",
            Self::Long => "Dài",
        }
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Short => f.write_str("short"),
            Self::Medium => f.write_str("medium"),
            Self::Long => f.write_str("long"),
        }
    }
}

impl FromStr for Length {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "short" => Ok(Self::Short),
            "medium" => Ok(Self::Medium),
            "long" => Ok(Self::Long),
            _ => Err(UnknownVariant {
                kind: "length",
                value: s.to_owned(),
                expected: "short, medium, long",
            }),
        }
    }
}

/// Length directive for a rewrite, relative to the current article.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewriteLength {
    Shorter,
    #[default]
    Equivalent,
    Longer,
}

impl fmt::Display for RewriteLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shorter => f.write_str("shorter"),
            Self::Equivalent => f.write_str("equivalent"),
            Self::Longer => f.write_str("longer"),
        }
    }
}

impl FromStr for RewriteLength {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "shorter" => Ok(Self::Shorter),
            "equivalent" => Ok(Self::Equivalent),
            "longer" => Ok(Self::Longer),
            _ => Err(UnknownVariant {
                kind: "rewrite length",
                value: s.to_owned(),
                expected: "shorter, equivalent, longer",
            }),
        }
    }
}

/// Per-call options for article synthesis.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleConfig {
    /// Reduce the victim's name to dotted initials.
    #[serde(default)]
    pub abbreviate_victim: bool,
    /// Reduce the subject's name to dotted initials.
    #[serde(default)]
    pub abbreviate_subject: bool,
    /// Free-form structure used for [`Topic::Other`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_template: Option<String>,
}

impl ArticleConfig {
    /// The custom template as written, if it has any non-whitespace content.
    pub fn template(&self) -> Option<&str> {
        self.custom_template
            .as_deref()
            .filter(|t| !t.trim().is_empty())
    }
}

/// A complete article as returned by synthesis or rewrite.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedArticle {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl GeneratedArticle {
    pub fn new(title: impl Into<String>, content: impl Into<String>, tags: Vec<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            tags,
        }
    }
}

/// One observed substitution, for the refine report.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChangeRecord {
    pub original: String,
    pub fixed: String,
}

impl ChangeRecord {
    pub fn new(original: impl Into<String>, fixed: impl Into<String>) -> Self {
        Self {
            original: original.into(),
            fixed: fixed.into(),
        }
    }
}

/// A dictionary mapping from an abbreviation to its expansion.
///
/// `short` is matched case-insensitively as a whole word. Both fields are
/// stored trimmed and are never blank; the dictionary enforces this on insert.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbbreviationEntry {
    pub id: EntryId,
    pub short: String,
    pub full: String,
}
