use tracing::{info, instrument, warn};

use tinnhanh_core::article::{GeneratedArticle, RewriteLength};
use tinnhanh_core::provider::{CompletionOptions, TextGenerator};
use tinnhanh_core::schema::ResponseSchema;

use crate::error::DraftError;
use crate::payload::ArticlePayload;
use crate::prompts;

/// Rewrite `current` with the generator's default model.
pub async fn rewrite(
    generator: &dyn TextGenerator,
    current: &GeneratedArticle,
    target_length: RewriteLength,
    custom_instruction: Option<&str>,
) -> Result<GeneratedArticle, DraftError> {
    rewrite_with_model(generator, current, target_length, custom_instruction, None).await
}

/// Produce a revised article or fail without touching `current`.
///
/// The model's tags replace the current ones only when it returns a
/// non-empty list.
#[instrument(skip_all, fields(target = %target_length))]
pub async fn rewrite_with_model(
    generator: &dyn TextGenerator,
    current: &GeneratedArticle,
    target_length: RewriteLength,
    custom_instruction: Option<&str>,
    model: Option<&str>,
) -> Result<GeneratedArticle, DraftError> {
    let options = CompletionOptions::default()
        .with_system_instruction(prompts::rewrite_instruction())
        .with_schema(ResponseSchema::revision())
        .with_model(model);
    let prompt = prompts::rewrite_prompt(current, target_length, custom_instruction);

    let text = generator
        .complete(&prompt, &options)
        .await
        .map_err(DraftError::from_rewrite)?;
    if text.trim().is_empty() {
        warn!("generator returned no text");
        return Err(DraftError::RewriteFailed("empty response".into()));
    }

    let payload = ArticlePayload::parse(&text).map_err(|detail| {
        warn!(%detail, "revision payload rejected");
        DraftError::RewriteFailed(detail)
    })?;

    let tags = match payload.tags {
        Some(tags) if !tags.is_empty() => tags,
        _ => current.tags.clone(),
    };

    info!(
        before_chars = current.content.chars().count(),
        after_chars = payload.content.chars().count(),
        "article rewritten"
    );
    Ok(GeneratedArticle::new(payload.title, payload.content, tags))
}
