use serde::Deserialize;

use crate::tokens::enforce_month_convention;

/// Article JSON as the model returns it. `tags` may be absent for revisions.
#[derive(Debug, Deserialize)]
pub(crate) struct ArticlePayload {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

impl ArticlePayload {
    /// Parse and normalize: title and content trimmed and non-blank, dates
    /// in house style, blank tags dropped.
    pub fn parse(text: &str) -> Result<Self, String> {
        let raw: Self =
            serde_json::from_str(text.trim()).map_err(|e| format!("invalid article JSON: {e}"))?;

        let title = enforce_month_convention(raw.title.trim());
        let content = enforce_month_convention(raw.content.trim());
        if title.is_empty() {
            return Err("article title is blank".into());
        }
        if content.is_empty() {
            return Err("article content is blank".into());
        }

        let tags = raw.tags.map(|tags| {
            tags.into_iter()
                .map(|t| t.trim().to_owned())
                .filter(|t| !t.is_empty())
                .collect()
        });

        Ok(Self {
            title,
            content,
            tags,
        })
    }
}
