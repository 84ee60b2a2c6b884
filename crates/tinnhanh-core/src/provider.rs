use async_trait::async_trait;

use crate::errors::ClientError;
use crate::schema::ResponseSchema;

/// Fast model used for refining short text.
pub const DEFAULT_REFINE_MODEL: &str = "gemini-3-flash-preview";

/// Stronger model used for article synthesis and rewrites.
pub const DEFAULT_ARTICLE_MODEL: &str = "gemini-3-pro-preview";

/// Options for a single completion.
#[derive(Clone, Debug, Default)]
pub struct CompletionOptions {
    /// System instruction sent alongside the prompt.
    pub system_instruction: Option<String>,
    /// When set, the generator must request JSON output of this shape and
    /// fail with [`ClientError::MalformedResponse`] if the text does not conform.
    pub schema: Option<ResponseSchema>,
    /// Per-call model override; the generator's default model otherwise.
    pub model: Option<String>,
}

impl CompletionOptions {
    #[must_use]
    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    #[must_use]
    pub fn with_schema(mut self, schema: ResponseSchema) -> Self {
        self.schema = Some(schema);
        self
    }

    #[must_use]
    pub fn with_model(mut self, model: Option<&str>) -> Self {
        self.model = model.map(str::to_owned);
        self
    }
}

/// A generative text capability: `complete(prompt, options) -> text`.
///
/// Implementations check for a credential before touching the network, never
/// retry internally, and never cache.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Backend identifier (e.g. `"gemini"`, `"mock"`).
    fn name(&self) -> &str;

    /// Default model used when [`CompletionOptions::model`] is `None`.
    fn model(&self) -> &str;

    async fn complete(
        &self,
        prompt: &str,
        options: &CompletionOptions,
    ) -> Result<String, ClientError>;
}
