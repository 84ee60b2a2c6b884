use tracing::{info, instrument, warn};

use tinnhanh_core::article::{ArticleConfig, GeneratedArticle, Length, Topic};
use tinnhanh_core::provider::{CompletionOptions, TextGenerator};
use tinnhanh_core::schema::ResponseSchema;

use crate::error::DraftError;
use crate::payload::ArticlePayload;
use crate::prompts;

/// Write an article from `brief` with the generator's default model.
pub async fn generate(
    generator: &dyn TextGenerator,
    topic: Topic,
    length: Length,
    brief: &str,
    config: &ArticleConfig,
) -> Result<GeneratedArticle, DraftError> {
    generate_with_model(generator, topic, length, brief, config, None).await
}

/// On success title and content are non-blank and dates follow the month
/// convention. Credential and upstream failures pass through, an empty
/// reply is [`DraftError::EmptyResponse`], anything else is
/// [`DraftError::Unknown`].
#[instrument(skip_all, fields(%topic, %length))]
pub async fn generate_with_model(
    generator: &dyn TextGenerator,
    topic: Topic,
    length: Length,
    brief: &str,
    config: &ArticleConfig,
    model: Option<&str>,
) -> Result<GeneratedArticle, DraftError> {
    let options = CompletionOptions::default()
        .with_system_instruction(prompts::synthesis_instruction())
        .with_schema(ResponseSchema::article())
        .with_model(model);
    let prompt = prompts::synthesis_prompt(topic, length, brief, config);

    let text = generator
        .complete(&prompt, &options)
        .await
        .map_err(DraftError::from_synthesis)?;
    if text.trim().is_empty() {
        warn!("generator returned no text");
        return Err(DraftError::EmptyResponse);
    }

    let payload = ArticlePayload::parse(&text).map_err(|detail| {
        warn!(%detail, "article payload rejected");
        DraftError::Unknown(detail)
    })?;
    let Some(tags) = payload.tags else {
        warn!("article payload has no tags");
        return Err(DraftError::Unknown("missing required field `tags`".into()));
    };

    info!(
        title_chars = payload.title.chars().count(),
        content_chars = payload.content.chars().count(),
        tags = tags.len(),
        "article generated"
    );
    Ok(GeneratedArticle::new(payload.title, payload.content, tags))
}
